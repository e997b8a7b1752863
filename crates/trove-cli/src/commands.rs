use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use colored::Colorize;
use tracing::debug;
use trove_cache::ResourceStore;
use trove_codec::NQuadsCodec;
use trove_journal::{partition, repository_key, StorageConfig};
use trove_types::{format_instant, GraphTag, Quad, Triple};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Partition(args) => cmd_partition(&cli.config, args),
        Command::State(args) => cmd_state(&open_store(&cli.config)?, args, format),
        Command::Mementos(args) => cmd_mementos(&open_store(&cli.config)?, args, format),
        Command::Materialize(args) => cmd_materialize(&open_store(&cli.config)?, args),
        Command::Append(args) => cmd_append(&open_store(&cli.config)?, args),
    }
}

fn open_store(config: &Path) -> anyhow::Result<ResourceStore> {
    let storage = StorageConfig::load(config)
        .with_context(|| format!("loading storage config {}", config.display()))?;
    debug!(config = %config.display(), "storage config loaded");
    Ok(ResourceStore::new(storage, NQuadsCodec))
}

fn cmd_partition(config: &Path, args: PartitionArgs) -> anyhow::Result<()> {
    let relative = partition(&args.identifier);
    println!("{}", relative.display());
    // The absolute location is informational; a missing config is fine here.
    if let Ok(storage) = StorageConfig::load(config) {
        let root = storage.root(repository_key(&args.identifier)?)?;
        println!("  {} {}", "directory:".dimmed(), root.join(relative).display());
    }
    Ok(())
}

fn cmd_state(store: &ResourceStore, args: StateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let resource = match args.at {
        Some(at) => store.get_at(&args.identifier, at)?,
        None => store.get(&args.identifier)?,
    };
    let Some(resource) = resource else {
        let when = args.at.map(|at| format!(" at {}", format_instant(&at))).unwrap_or_default();
        eprintln!("{} {} does not exist{}", "✗".red().bold(), args.identifier.yellow(), when);
        return Ok(());
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(resource.snapshot())?);
        return Ok(());
    }

    let categories = if args.categories.is_empty() {
        GraphTag::ALL.to_vec()
    } else {
        args.categories
    };
    let source = if resource.is_cached() { "cache" } else { "journal" };
    eprintln!(
        "{} {} ({})",
        resource.snapshot().interaction_model.cyan(),
        args.identifier.bold(),
        source.dimmed()
    );
    for triple in resource.triples(store.codec(), &categories)? {
        println!("{}", ntriple(&triple));
    }
    Ok(())
}

fn ntriple(triple: &Triple) -> String {
    format!("{} {} {} .", triple.subject, triple.predicate, triple.object)
}

fn cmd_mementos(store: &ResourceStore, args: MementosArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ranges = if args.timeline {
        store.journal(&args.identifier)?.timeline(store.codec(), Utc::now())?
    } else {
        store.mementos(&args.identifier)?
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&ranges)?);
        return Ok(());
    }
    if ranges.is_empty() {
        println!("No mementos.");
    }
    for (i, range) in ranges.iter().enumerate() {
        println!(
            "{} {} {} {}",
            format!("#{}", i + 1).yellow(),
            format_instant(&range.from),
            "→".dimmed(),
            format_instant(&range.until)
        );
    }
    Ok(())
}

fn cmd_materialize(store: &ResourceStore, args: MaterializeArgs) -> anyhow::Result<()> {
    match store.materialize(&args.identifier)? {
        Some(snapshot) => {
            println!("{} Materialized {}", "✓".green().bold(), args.identifier.bold());
            println!("  Interaction model: {}", snapshot.interaction_model.cyan());
            if let Some(modified) = snapshot.modified {
                println!("  Modified: {}", format_instant(&modified));
            }
            println!("  Contains: {}", snapshot.contains.len());
        }
        None => println!("{} has no state; nothing written", args.identifier.yellow()),
    }
    Ok(())
}

fn cmd_append(store: &ResourceStore, args: AppendArgs) -> anyhow::Result<()> {
    let deletes = read_quads(args.delete.as_deref())?;
    let adds = read_quads(args.add.as_deref())?;
    if deletes.is_empty() && adds.is_empty() {
        anyhow::bail!("nothing to append: pass --delete and/or --add");
    }
    let time = args.at.unwrap_or_else(Utc::now);
    let journal = store.journal(&args.identifier)?;
    journal.append(store.codec(), &deletes, &adds, time)?;
    println!(
        "{} Appended to {} at {}: {} deleted, {} added",
        "✓".green().bold(),
        args.identifier.bold(),
        format_instant(&time),
        deletes.len().to_string().red(),
        adds.len().to_string().green()
    );
    Ok(())
}

/// Parse an N-Quads file, failing on the first malformed statement.
fn read_quads(path: Option<&Path>) -> anyhow::Result<Vec<Quad>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_quads(&text).with_context(|| format!("parsing {}", path.display()))
}

fn parse_quads(text: &str) -> anyhow::Result<Vec<Quad>> {
    let codec = NQuadsCodec::new();
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            codec
                .parse(line)
                .with_context(|| format!("line {}", i + 1))
        })
        .collect()
}
