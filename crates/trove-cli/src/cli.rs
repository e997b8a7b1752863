use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use trove_types::{parse_instant, GraphTag, Instant, TypeError};

#[derive(Parser)]
#[command(
    name = "trove",
    about = "trove: versioned linked-data resource journals",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage configuration (TOML with a [repositories] table)
    #[arg(short, long, global = true, default_value = "trove.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the partition directory of an identifier
    Partition(PartitionArgs),
    /// Print the quads of a resource, now or at an instant
    State(StateArgs),
    /// List the memento ranges of a resource
    Mementos(MementosArgs),
    /// Rebuild the cache files of a resource from its journal
    Materialize(MaterializeArgs),
    /// Append a transaction to a resource journal
    Append(AppendArgs),
}

#[derive(Args)]
pub struct PartitionArgs {
    pub identifier: String,
}

#[derive(Args)]
pub struct StateArgs {
    pub identifier: String,
    /// Reconstruct the state in effect at this RFC 3339 instant
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<Instant>,
    /// Graph categories to print (default: all)
    #[arg(long = "category", value_parser = parse_category)]
    pub categories: Vec<GraphTag>,
}

#[derive(Args)]
pub struct MementosArgs {
    pub identifier: String,
    /// Include the open range of the current state, ending now
    #[arg(long)]
    pub timeline: bool,
}

#[derive(Args)]
pub struct MaterializeArgs {
    pub identifier: String,
}

#[derive(Args)]
pub struct AppendArgs {
    pub identifier: String,
    /// N-Quads file of statements to delete
    #[arg(long)]
    pub delete: Option<PathBuf>,
    /// N-Quads file of statements to add
    #[arg(long)]
    pub add: Option<PathBuf>,
    /// Transaction time (default: now)
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<Instant>,
}

fn parse_category(value: &str) -> Result<GraphTag, TypeError> {
    value.parse()
}
