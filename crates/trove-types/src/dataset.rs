use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::GraphTag;
use crate::quad::Quad;
use crate::term::Term;

/// An ordered, duplicate-free set of quads.
///
/// Change events carry their payload as a `Dataset`; the ordering makes
/// iteration (and anything derived from it, such as idempotency keys)
/// deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    quads: BTreeSet<Quad>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the quad was not already present.
    pub fn insert(&mut self, quad: Quad) -> bool {
        self.quads.insert(quad)
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.quads.contains(quad)
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Quads in one provenance graph.
    pub fn graph(&self, tag: GraphTag) -> impl Iterator<Item = &Quad> {
        self.quads.iter().filter(move |q| q.graph == tag)
    }

    /// Quads in `tag` matching the optional subject and predicate.
    pub fn matching<'a>(
        &'a self,
        tag: GraphTag,
        subject: Option<&'a Term>,
        predicate: Option<&'a Term>,
    ) -> impl Iterator<Item = &'a Quad> + 'a {
        self.graph(tag).filter(move |q| {
            subject.map_or(true, |s| &q.subject == s) && predicate.map_or(true, |p| &q.predicate == p)
        })
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

impl Extend<Quad> for Dataset {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        self.quads.extend(iter);
    }
}

impl IntoIterator for Dataset {
    type Item = Quad;
    type IntoIter = std::collections::btree_set::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Quad;
    type IntoIter = std::collections::btree_set::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}
