use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::GraphTag;
use crate::term::Term;

/// An RDF statement without provenance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// An RDF statement tagged with the provenance graph it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: GraphTag,
}

impl Quad {
    pub fn new(subject: Term, predicate: Term, object: Term, graph: GraphTag) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Drop the graph tag.
    pub fn as_triple(&self) -> Triple {
        Triple::new(
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
        )
    }

    pub fn into_triple(self) -> Triple {
        Triple::new(self.subject, self.predicate, self.object)
    }

    /// Same statement, different graph.
    pub fn with_graph(mut self, graph: GraphTag) -> Self {
        self.graph = graph;
        self
    }
}

/// Canonical quad text: `<s> <p> <o> <graph> .`
impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} <{}> .",
            self.subject,
            self.predicate,
            self.object,
            self.graph.iri()
        )
    }
}
