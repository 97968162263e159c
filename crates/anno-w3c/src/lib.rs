//! W3C Web Annotation crosswalk.
//!
//! Converts between the store's [`Annotation`](anno_types::Annotation)
//! shape and the W3C Web Annotation data model. W3C bodies may omit their
//! id; the crosswalk then derives one from the body's content, so importing
//! the same record twice yields the same body ids.
//!
//! # Key Types
//!
//! - [`W3cAnnotation`] -- A W3C annotation record as found on the wire
//! - [`W3cBody`] -- A W3C body, with an optional id
//! - [`OneOrMany`] -- W3C fields that hold either a single value or an array

pub mod crosswalk;
pub mod error;
pub mod model;

pub use crosswalk::{
    body_content_id, parse_w3c_annotation, parse_w3c_bodies, parse_w3c_json,
    serialize_w3c_annotation, serialize_w3c_bodies, to_w3c_json,
};
pub use error::{W3cError, W3cResult};
pub use model::{OneOrMany, W3cAnnotation, W3cBody, ANNO_CONTEXT};
