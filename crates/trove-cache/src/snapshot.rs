use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use trove_types::vocab::{acl, dc, ldp, rdf};
use trove_types::{parse_instant, Dataset, GraphTag, Instant, Term};

/// Description of the binary content attached to a non-RDF source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Instant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Named properties of a resource, interpreted from its quads.
///
/// This is the `resource.json` cache document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    pub id: String,
    pub interaction_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Instant>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub types: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub contains: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_member_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_member_of_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_content_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control: Option<String>,
}

impl ResourceSnapshot {
    /// Interpret the quads of `identifier`.
    ///
    /// Server-managed statements supply the interaction model, modification
    /// time and binary description. User-managed statements supply types and
    /// the LDP configuration. Containment comes from the containment graph.
    pub fn interpret(identifier: &str, quads: &Dataset) -> Self {
        let subject = Term::iri(identifier);
        let view = View {
            quads,
            subject: &subject,
        };

        let binary = view.iri(GraphTag::ServerManaged, dc::HAS_PART).map(|id| {
            let part = Term::iri(&id);
            let part_view = View {
                quads,
                subject: &part,
            };
            BinaryDescriptor {
                modified: part_view.latest(GraphTag::ServerManaged, dc::MODIFIED),
                format: part_view.lexical(GraphTag::ServerManaged, dc::FORMAT),
                size: part_view
                    .lexical(GraphTag::ServerManaged, dc::EXTENT)
                    .and_then(|s| s.parse().ok()),
                id,
            }
        });

        let interaction_model = view
            .iri(GraphTag::ServerManaged, rdf::TYPE)
            .unwrap_or_else(|| ldp::RESOURCE.to_string());
        // A direct container's members are always the contained resources.
        let inserted_content_relation = view
            .iri(GraphTag::UserManaged, ldp::INSERTED_CONTENT_RELATION)
            .or_else(|| {
                (interaction_model == ldp::DIRECT_CONTAINER).then(|| ldp::MEMBER_SUBJECT.to_string())
            });

        Self {
            id: identifier.to_string(),
            interaction_model,
            modified: view.latest(GraphTag::ServerManaged, dc::MODIFIED),
            types: view.iris(GraphTag::UserManaged, rdf::TYPE).collect(),
            contains: view.iris(GraphTag::Containment, ldp::CONTAINS).collect(),
            membership_resource: view.iri(GraphTag::UserManaged, ldp::MEMBERSHIP_RESOURCE),
            has_member_relation: view.iri(GraphTag::UserManaged, ldp::HAS_MEMBER_RELATION),
            is_member_of_relation: view.iri(GraphTag::UserManaged, ldp::IS_MEMBER_OF_RELATION),
            inserted_content_relation,
            binary,
            inbox: view.iri(GraphTag::UserManaged, ldp::INBOX),
            access_control: view.iri(GraphTag::UserManaged, acl::ACCESS_CONTROL),
        }
    }

    pub fn is_direct_container(&self) -> bool {
        self.interaction_model == ldp::DIRECT_CONTAINER
    }

    /// Membership relation and target, when both are configured.
    pub fn membership(&self) -> Option<(&str, &str)> {
        Some((
            self.membership_resource.as_deref()?,
            self.has_member_relation.as_deref()?,
        ))
    }
}

struct View<'a> {
    quads: &'a Dataset,
    subject: &'a Term,
}

impl View<'_> {
    fn objects<'b>(&'b self, graph: GraphTag, predicate: &'b str) -> impl Iterator<Item = &'b Term> + 'b {
        self.quads
            .matching(graph, Some(self.subject), None)
            .filter(move |q| q.predicate.is(predicate))
            .map(|q| &q.object)
    }

    fn iris<'b>(&'b self, graph: GraphTag, predicate: &'b str) -> impl Iterator<Item = String> + 'b {
        self.objects(graph, predicate)
            .filter_map(Term::as_iri)
            .map(str::to_string)
    }

    fn iri(&self, graph: GraphTag, predicate: &str) -> Option<String> {
        self.iris(graph, predicate).next()
    }

    fn lexical(&self, graph: GraphTag, predicate: &str) -> Option<String> {
        self.objects(graph, predicate)
            .find_map(Term::as_literal)
            .map(|lit| lit.lexical.clone())
    }

    fn latest(&self, graph: GraphTag, predicate: &str) -> Option<Instant> {
        self.objects(graph, predicate)
            .filter_map(Term::as_literal)
            .filter_map(|lit| parse_instant(&lit.lexical).ok())
            .max()
    }
}
