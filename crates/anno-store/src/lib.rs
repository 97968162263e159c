//! Observable in-memory annotation store.
//!
//! [`AnnotationStore`] is the single authoritative mutable state for an
//! annotation session. It keeps a primary index of annotations and a
//! secondary index of bodies consistent across every mutation, computes a
//! structured diff for each change, and notifies observers with one
//! origin-tagged [`ChangeEvent`] per operation.
//!
//! # Modules
//!
//! - [`store`] -- The store facade, observers, and reads
//! - [`annotations`] -- Add, update, upsert, delete, clear, and bulk variants
//! - [`bodies`] -- Body add, update, delete, and bulk variants
//! - [`targets`] -- Target merge and its bulk variant
//! - [`config`] -- [`StoreConfig`], loadable from TOML
//! - [`error`] -- [`StoreError`] and [`StoreResult`]
//!
//! # Example
//!
//! ```
//! use anno_store::{AnnotationStore, AnnotationDraft, Body, ObserveOptions, Origin, Target};
//!
//! let store = AnnotationStore::new();
//! store.observe(|event| println!("{} change(s)", event.changes.len()), ObserveOptions::default());
//!
//! store.add(
//!     AnnotationDraft::new()
//!         .with_id("a1")
//!         .with_body(Body::new("b1", "").with_value("hello"))
//!         .with_target(Target::new("img1")),
//!     Origin::Local,
//! )?;
//! assert_eq!(store.get_body("b1").unwrap().annotation, "a1");
//! # Ok::<(), anno_store::StoreError>(())
//! ```

pub mod annotations;
pub mod bodies;
pub mod config;
pub mod error;
pub mod store;
pub mod targets;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod testing;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::AnnotationStore;

pub use anno_diff::{BodyChange, TargetChange, Update};
pub use anno_fabric::{ChangeEvent, ChangeKind, ChangeSet, Ignore, ObserveOptions, ObserverId};
pub use anno_index::IntegrityIssue;
pub use anno_types::{
    Annotation, AnnotationDraft, Body, BodyRef, Creator, IdSource, Origin, SequentialIdSource,
    Target, UuidIdSource,
};
