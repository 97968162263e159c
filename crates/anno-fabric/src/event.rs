use std::fmt;

use serde::{Deserialize, Serialize};

use anno_diff::Update;
use anno_types::{Annotation, Origin};

/// Classification of the changes carried by an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

/// Everything one mutation changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub created: Vec<Annotation>,
    pub updated: Vec<Update>,
    pub deleted: Vec<Annotation>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(annotations: Vec<Annotation>) -> Self {
        Self {
            created: annotations,
            ..Default::default()
        }
    }

    pub fn updated(updates: Vec<Update>) -> Self {
        Self {
            updated: updates,
            ..Default::default()
        }
    }

    pub fn deleted(annotations: Vec<Annotation>) -> Self {
        Self {
            deleted: annotations,
            ..Default::default()
        }
    }

    /// Returns `true` if the set records no change at all.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Total number of entries across the three lists.
    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }

    /// The kinds present in this set, in `created, updated, deleted` order.
    pub fn kinds(&self) -> Vec<ChangeKind> {
        let mut kinds = Vec::with_capacity(3);
        if !self.created.is_empty() {
            kinds.push(ChangeKind::Created);
        }
        if !self.updated.is_empty() {
            kinds.push(ChangeKind::Updated);
        }
        if !self.deleted.is_empty() {
            kinds.push(ChangeKind::Deleted);
        }
        kinds
    }

    /// Returns `true` if any entry concerns annotation `id`, under either
    /// its old or new id for updates.
    pub fn touches(&self, id: &str) -> bool {
        self.created.iter().any(|a| a.id == id)
            || self.deleted.iter().any(|a| a.id == id)
            || self
                .updated
                .iter()
                .any(|u| u.old_id() == id || u.new_id() == id)
    }

    /// Only updates, and every update changes bodies only.
    pub fn is_body_only(&self) -> bool {
        self.created.is_empty()
            && self.deleted.is_empty()
            && !self.updated.is_empty()
            && self.updated.iter().all(Update::is_body_only)
    }

    /// Only updates, and every update changes the target only.
    pub fn is_target_only(&self) -> bool {
        self.created.is_empty()
            && self.deleted.is_empty()
            && !self.updated.is_empty()
            && self.updated.iter().all(Update::is_target_only)
    }
}

/// Notification delivered to observers after a mutation.
///
/// `state` is a full snapshot of every live annotation after the mutation
/// was applied, in store order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub origin: Origin,
    pub changes: ChangeSet,
    pub state: Vec<Annotation>,
}

impl ChangeEvent {
    pub fn new(origin: Origin, changes: ChangeSet, state: Vec<Annotation>) -> Self {
        Self {
            origin,
            changes,
            state,
        }
    }
}
