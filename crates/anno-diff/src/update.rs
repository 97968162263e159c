//! The [`Update`] diff artifact.
//!
//! An update is never stored. It travels inside change events so observers
//! can see exactly which parts of an annotation moved.

use serde::{Deserialize, Serialize};

use anno_types::{Annotation, Body, Target};

/// A body whose id exists on both sides but whose content differs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyChange {
    pub old_body: Body,
    pub new_body: Body,
}

/// A target that changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetChange {
    pub old_target: Target,
    pub new_target: Target,
}

/// Structured delta between two full snapshots of one annotation.
///
/// `old_value.id` and `new_value.id` may differ: a rename is still a single
/// logical update, and carrying both full objects lets the store re-key its
/// indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub old_value: Annotation,
    pub new_value: Annotation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bodies_created: Vec<Body>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bodies_deleted: Vec<Body>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bodies_updated: Vec<BodyChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_updated: Option<TargetChange>,
}

impl Update {
    /// An update with no body or target deltas recorded yet.
    pub fn new(old_value: Annotation, new_value: Annotation) -> Self {
        Self {
            old_value,
            new_value,
            bodies_created: Vec::new(),
            bodies_deleted: Vec::new(),
            bodies_updated: Vec::new(),
            target_updated: None,
        }
    }

    pub fn with_bodies_created(mut self, bodies: Vec<Body>) -> Self {
        self.bodies_created = bodies;
        self
    }

    pub fn with_bodies_deleted(mut self, bodies: Vec<Body>) -> Self {
        self.bodies_deleted = bodies;
        self
    }

    pub fn with_bodies_updated(mut self, changes: Vec<BodyChange>) -> Self {
        self.bodies_updated = changes;
        self
    }

    pub fn with_target_updated(mut self, old_target: Target, new_target: Target) -> Self {
        self.target_updated = Some(TargetChange {
            old_target,
            new_target,
        });
        self
    }

    /// The id the annotation had before the change.
    pub fn old_id(&self) -> &str {
        &self.old_value.id
    }

    /// The id the annotation has after the change.
    pub fn new_id(&self) -> &str {
        &self.new_value.id
    }

    pub fn is_rename(&self) -> bool {
        self.old_value.id != self.new_value.id
    }

    pub fn has_body_changes(&self) -> bool {
        !self.bodies_created.is_empty()
            || !self.bodies_deleted.is_empty()
            || !self.bodies_updated.is_empty()
    }

    /// Only bodies changed: no target change, no rename, same extensions.
    pub fn is_body_only(&self) -> bool {
        self.has_body_changes()
            && self.target_updated.is_none()
            && !self.is_rename()
            && self.old_value.extensions == self.new_value.extensions
    }

    /// Only the target changed: no body deltas, no rename, same extensions.
    pub fn is_target_only(&self) -> bool {
        self.target_updated.is_some()
            && !self.has_body_changes()
            && !self.is_rename()
            && self.old_value.extensions == self.new_value.extensions
    }
}
