//! Dual index for the annotation store.
//!
//! Keeps two containers consistent with each other: a primary map from
//! annotation id to annotation (insertion ordered) and a secondary map from
//! body id to the id of the annotation that owns the body.
//!
//! # Key Types
//!
//! - [`DualIndex`] -- The two maps plus every structural mutation on them
//! - [`IntegrityIssue`] -- A discrepancy found by [`DualIndex::check_integrity`]

pub mod dual;
pub mod error;
pub mod integrity;

pub use dual::DualIndex;
pub use error::{IndexError, IndexResult};
pub use integrity::IntegrityIssue;
