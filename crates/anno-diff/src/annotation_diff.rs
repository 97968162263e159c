//! Annotation-level diff: compare two snapshots of one annotation.
//!
//! Bodies are matched by id. Bodies only in `new` are created, bodies only
//! in `old` are deleted, and bodies present on both sides with different
//! content are updated. The target is compared as a single entry.
//!
//! Back-reference fields (`Body::annotation`, `Target::annotation`) are
//! derived from the owning annotation, so they are left out of content
//! comparison. Renaming an annotation therefore does not mark every body as
//! updated.

use std::collections::HashMap;

use anno_types::{Annotation, Body, Target};

use crate::update::{BodyChange, Update};

/// The body portion of an annotation diff.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyDiff {
    pub created: Vec<Body>,
    pub deleted: Vec<Body>,
    pub updated: Vec<BodyChange>,
}

impl BodyDiff {
    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.created.len() + self.deleted.len() + self.updated.len()
    }
}

/// Compare two body sequences keyed on body id.
///
/// Output order follows the input: created and updated bodies appear in the
/// order of `new`, deleted bodies in the order of `old`.
pub fn diff_bodies(old: &[Body], new: &[Body]) -> BodyDiff {
    let old_by_id: HashMap<&str, &Body> = old.iter().map(|b| (b.id.as_str(), b)).collect();
    let new_by_id: HashMap<&str, &Body> = new.iter().map(|b| (b.id.as_str(), b)).collect();

    let mut diff = BodyDiff::default();

    for body in new {
        match old_by_id.get(body.id.as_str()) {
            Some(old_body) => {
                if !same_body(old_body, body) {
                    diff.updated.push(BodyChange {
                        old_body: (*old_body).clone(),
                        new_body: body.clone(),
                    });
                }
            }
            None => diff.created.push(body.clone()),
        }
    }

    diff.deleted = old
        .iter()
        .filter(|b| !new_by_id.contains_key(b.id.as_str()))
        .cloned()
        .collect();

    diff
}

/// Compute the [`Update`] between two full snapshots of one annotation.
///
/// Both snapshots are required. If `new.id != old.id` the result is still a
/// single update carrying both full objects.
pub fn diff_annotations(old: &Annotation, new: &Annotation) -> Update {
    let bodies = diff_bodies(&old.bodies, &new.bodies);

    let mut update = Update::new(old.clone(), new.clone())
        .with_bodies_created(bodies.created)
        .with_bodies_deleted(bodies.deleted)
        .with_bodies_updated(bodies.updated);

    if !same_target(&old.target, &new.target) {
        update = update.with_target_updated(old.target.clone(), new.target.clone());
    }

    update
}

fn same_body(a: &Body, b: &Body) -> bool {
    a.id == b.id
        && a.body_type == b.body_type
        && a.purpose == b.purpose
        && a.value == b.value
        && a.creator == b.creator
        && a.created == b.created
        && a.extensions == b.extensions
}

fn same_target(a: &Target, b: &Target) -> bool {
    a.source == b.source && a.selector == b.selector && a.extensions == b.extensions
}
