//! Diff engine for the annotation store.
//!
//! Computes structured deltas between two full snapshots of the same logical
//! annotation. The differ never fetches state itself; callers hand it both
//! sides.
//!
//! # Key Types
//!
//! - [`Update`] -- Old/new annotation plus body and target deltas
//! - [`BodyChange`] -- One body present on both sides with different content
//! - [`TargetChange`] -- Old/new target pair

pub mod update;
pub mod annotation_diff;

pub use annotation_diff::{diff_annotations, diff_bodies, BodyDiff};
pub use update::{BodyChange, TargetChange, Update};
