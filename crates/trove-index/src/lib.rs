//! Derived-index maintenance for trove.
//!
//! A stream runtime delivers one [`ChangeEvent`] per resource update and
//! calls the transforms on [`IndexMaintainer`]. They propagate the change
//! into the journals of related resources:
//!
//! - containment and membership quads onto the changed container itself;
//! - membership quads onto the container's membership resource, which may
//!   be a different resource;
//! - inbound-reference quads onto the referenced resource;
//! - a cache rebuild of the changed resource.
//!
//! Transforms hold no state between calls. When an event carries a delivery
//! key, each write is tagged with an idempotency key derived from it and
//! skipped if a recent transaction in the target journal already has it, so
//! redelivered events do not grow journals.

pub mod config;
pub mod error;
pub mod event;
pub mod maintainer;

pub use config::{MaintainerConfig, DEFAULT_IDEMPOTENCY_WINDOW};
pub use error::{IndexError, IndexResult};
pub use event::ChangeEvent;
pub use maintainer::{idempotency_key, IndexMaintainer, Operation};
