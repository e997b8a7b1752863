use std::fmt;

use chrono::Utc;
use tracing::{debug, error, trace};
use trove_cache::ResourceStore;
use trove_codec::{NQuadsCodec, QuadCodec};
use trove_journal::Transaction;
use trove_types::vocab::ldp;
use trove_types::{Dataset, GraphTag, Quad, Term};

use crate::config::MaintainerConfig;
use crate::error::IndexResult;
use crate::event::ChangeEvent;

/// The journal-writing transforms, named for idempotency keys and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    AddMembership,
    DeleteMembership,
    AddContainment,
    DeleteContainment,
    AddInbound,
    DeleteInbound,
}

impl Operation {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddMembership => "add-membership",
            Self::DeleteMembership => "delete-membership",
            Self::AddContainment => "add-containment",
            Self::DeleteContainment => "delete-containment",
            Self::AddInbound => "add-inbound",
            Self::DeleteInbound => "delete-inbound",
        }
    }

    const fn is_delete(&self) -> bool {
        matches!(
            self,
            Self::DeleteMembership | Self::DeleteContainment | Self::DeleteInbound
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Idempotency key of one transform's write for one delivery.
///
/// Identical for every redelivery of the same event, distinct across
/// operations and target resources.
pub fn idempotency_key(operation: Operation, delivery_key: &str, target: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in [operation.name(), delivery_key, target] {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Stateless transforms keeping derived quads in step with change events.
///
/// Each transform is invoked once per event by the stream runtime, which
/// orders events per key but not across keys. Transforms never fail: errors
/// are logged and turn into a no-op result.
pub struct IndexMaintainer<C = NQuadsCodec> {
    store: ResourceStore<C>,
    idempotency_window: usize,
}

impl<C: QuadCodec> IndexMaintainer<C> {
    pub fn new(config: MaintainerConfig, codec: C) -> Self {
        Self {
            store: ResourceStore::new(config.storage, codec),
            idempotency_window: config.idempotency_window,
        }
    }

    pub fn store(&self) -> &ResourceStore<C> {
        &self.store
    }

    /// Add membership quads for newly contained resources to the
    /// membership resource's journal.
    ///
    /// Returns the membership resource and the event dataset when quads were
    /// written; otherwise the event key and an empty dataset.
    pub fn add_membership_quads(&self, event: &ChangeEvent) -> (String, Dataset) {
        self.membership(Operation::AddMembership, event)
    }

    /// Remove membership quads for resources no longer contained.
    pub fn delete_membership_quads(&self, event: &ChangeEvent) -> (String, Dataset) {
        self.membership(Operation::DeleteMembership, event)
    }

    /// Append the event's containment and membership quads to the changed
    /// resource's own journal.
    pub fn add_containment_quads(&self, event: &ChangeEvent) -> (String, Dataset) {
        self.containment(Operation::AddContainment, event)
    }

    pub fn delete_containment_quads(&self, event: &ChangeEvent) -> (String, Dataset) {
        self.containment(Operation::DeleteContainment, event)
    }

    /// Rebuild the changed resource's cache files.
    pub fn write_cache_quads(&self, event: &ChangeEvent) -> (String, Dataset) {
        if let Err(e) = self.store.materialize(&event.key) {
            error!(key = %event.key, error = %e, "error writing cache");
        }
        (event.key.clone(), event.dataset.clone())
    }

    /// Record inbound references on the referenced resource's journal.
    pub fn add_inbound_quads(&self, event: &ChangeEvent) {
        self.inbound(Operation::AddInbound, event);
    }

    pub fn delete_inbound_quads(&self, event: &ChangeEvent) {
        self.inbound(Operation::DeleteInbound, event);
    }

    fn membership(&self, operation: Operation, event: &ChangeEvent) -> (String, Dataset) {
        let noop = || (event.key.clone(), Dataset::new());
        let (target, quads) = match self.membership_quads(event) {
            Ok(Some(found)) => found,
            Ok(None) => return noop(),
            Err(e) => {
                error!(key = %event.key, %operation, error = %e, "error resolving LDP membership");
                return noop();
            }
        };
        match self.write(operation, &target, event, quads) {
            Ok(()) => (target, event.dataset.clone()),
            Err(e) => {
                error!(%target, %operation, error = %e, "error writing LDP membership triples");
                noop()
            }
        }
    }

    /// The membership resource and the quads to write to it, if the changed
    /// resource is a fully configured membership container.
    fn membership_quads(&self, event: &ChangeEvent) -> IndexResult<Option<(String, Vec<Quad>)>> {
        let Some(resource) = self.store.get(&event.key)? else {
            return Ok(None);
        };
        let snapshot = resource.snapshot();
        let (Some((target, relation)), Some(inserted)) = (
            snapshot.membership(),
            snapshot.inserted_content_relation.as_deref(),
        ) else {
            return Ok(None);
        };

        let subject = Term::iri(target);
        let predicate = Term::iri(relation);
        let member = |object: Term| {
            Quad::new(subject.clone(), predicate.clone(), object, GraphTag::Membership)
        };
        let member_subject = snapshot.is_direct_container() || inserted == ldp::MEMBER_SUBJECT;
        let inserted = Term::iri(inserted);

        let mut quads = Vec::new();
        for quad in event.dataset.graph(GraphTag::Containment) {
            let Some(contained) = quad.object.as_iri() else {
                trace!(object = %quad.object, "skipping non-IRI containment object");
                continue;
            };
            if member_subject {
                quads.push(member(Term::iri(contained)));
            } else {
                let contained = Term::iri(contained);
                quads.extend(
                    event
                        .dataset
                        .matching(GraphTag::UserManaged, Some(&contained), Some(&inserted))
                        .map(|q| member(q.object.clone())),
                );
            }
        }
        Ok(Some((target.to_string(), quads)))
    }

    fn containment(&self, operation: Operation, event: &ChangeEvent) -> (String, Dataset) {
        let quads = event
            .dataset
            .iter()
            .filter(|q| matches!(q.graph, GraphTag::Containment | GraphTag::Membership))
            .cloned()
            .collect();
        if let Err(e) = self.write(operation, &event.key, event, quads) {
            error!(key = %event.key, %operation, error = %e, "error writing LDP container triples");
        }
        (event.key.clone(), event.dataset.clone())
    }

    fn inbound(&self, operation: Operation, event: &ChangeEvent) {
        let quads = event
            .dataset
            .graph(GraphTag::InboundReferences)
            .cloned()
            .collect();
        if let Err(e) = self.write(operation, &event.key, event, quads) {
            error!(key = %event.key, %operation, error = %e, "error writing inbound reference triples");
        }
    }

    /// Append `quads` to `target`'s journal as additions or deletions,
    /// unless this delivery was already applied there.
    fn write(
        &self,
        operation: Operation,
        target: &str,
        event: &ChangeEvent,
        quads: Vec<Quad>,
    ) -> IndexResult<()> {
        if quads.is_empty() {
            trace!(%target, %operation, "nothing to write");
            return Ok(());
        }
        let journal = self.store.journal(target)?;

        let mut tx = Transaction::new(Utc::now());
        if let Some(delivery) = event.delivery_key.as_deref() {
            let key = idempotency_key(operation, delivery, target);
            if journal.has_transaction(&key, self.idempotency_window)? {
                debug!(%target, %operation, delivery, "delivery already applied");
                return Ok(());
            }
            tx = tx.with_key(key);
        }
        tx = if operation.is_delete() {
            tx.deleting(quads)
        } else {
            tx.adding(quads)
        };
        journal.append_transaction(self.store.codec(), &tx)?;
        debug!(%target, %operation, quads = tx.deletes.len() + tx.adds.len(), "derived quads written");
        Ok(())
    }
}
