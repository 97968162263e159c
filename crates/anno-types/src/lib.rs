//! Foundation types for the annotation store.
//!
//! This crate provides the entity shapes shared by every other `anno-*`
//! crate. Entities carry no behaviour beyond construction helpers and the
//! [`sanitize`] normalization step.
//!
//! # Key Types
//!
//! - [`Annotation`] -- Root entity: one [`Target`] plus an ordered list of [`Body`]
//! - [`AnnotationDraft`] -- Partial annotation accepted by the store before sanitization
//! - [`Body`] / [`Creator`] -- Semantic payloads attached to an annotation
//! - [`Target`] -- The subject an annotation refers to
//! - [`Origin`] -- Provenance tag on every mutation (`LOCAL` or `REMOTE`)
//! - [`IdSource`] -- Supplier of fresh annotation identifiers

pub mod entity;
pub mod identity;
pub mod origin;
pub mod sanitize;

pub use entity::{Annotation, AnnotationDraft, Body, BodyRef, Creator, Extensions, Target};
pub use identity::{IdSource, SequentialIdSource, UuidIdSource};
pub use origin::Origin;
pub use sanitize::sanitize;
