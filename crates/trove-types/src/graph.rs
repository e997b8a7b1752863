use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::vocab::{fedora, ldp, trellis};

/// Provenance category of a quad.
///
/// Every quad in a journal belongs to exactly one of these graphs. A quad
/// without an explicit graph name, or with a graph name the store does not
/// recognize, is user-managed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum GraphTag {
    /// Statements written by clients.
    #[default]
    UserManaged,
    /// Statements the server maintains (interaction model, modification time).
    ServerManaged,
    /// `ldp:contains` statements of a container.
    Containment,
    /// Membership statements derived from a container's configuration.
    Membership,
    /// Statements in other resources that point at this one.
    InboundReferences,
    /// Access-control statements.
    AccessControl,
}

impl GraphTag {
    /// Every category, in declaration order.
    pub const ALL: [GraphTag; 6] = [
        GraphTag::UserManaged,
        GraphTag::ServerManaged,
        GraphTag::Containment,
        GraphTag::Membership,
        GraphTag::InboundReferences,
        GraphTag::AccessControl,
    ];

    /// The graph-name IRI written for this category.
    pub const fn iri(&self) -> &'static str {
        match self {
            Self::UserManaged => trellis::PREFER_USER_MANAGED,
            Self::ServerManaged => trellis::PREFER_SERVER_MANAGED,
            Self::Containment => ldp::PREFER_CONTAINMENT,
            Self::Membership => ldp::PREFER_MEMBERSHIP,
            Self::InboundReferences => fedora::PREFER_INBOUND_REFERENCES,
            Self::AccessControl => trellis::PREFER_ACCESS_CONTROL,
        }
    }

    /// Classify a graph name. Total: absent or unrecognized names map to
    /// [`GraphTag::UserManaged`].
    pub fn classify(graph_name: Option<&str>) -> Self {
        match graph_name {
            Some(trellis::PREFER_SERVER_MANAGED) => Self::ServerManaged,
            Some(ldp::PREFER_CONTAINMENT) => Self::Containment,
            Some(ldp::PREFER_MEMBERSHIP) => Self::Membership,
            Some(fedora::PREFER_INBOUND_REFERENCES) => Self::InboundReferences,
            Some(trellis::PREFER_ACCESS_CONTROL) => Self::AccessControl,
            _ => Self::UserManaged,
        }
    }

    /// Whether a change to this category produces a new memento.
    pub const fn is_versioned(&self) -> bool {
        matches!(self, Self::UserManaged | Self::ServerManaged)
    }

    /// Short name used on the command line and in serialized documents.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UserManaged => "user-managed",
            Self::ServerManaged => "server-managed",
            Self::Containment => "containment",
            Self::Membership => "membership",
            Self::InboundReferences => "inbound-references",
            Self::AccessControl => "access-control",
        }
    }
}

impl fmt::Display for GraphTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GraphTag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| TypeError::UnknownCategory(s.to_string()))
    }
}
