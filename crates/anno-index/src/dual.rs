//! The [`DualIndex`] structure.
//!
//! Primary map: annotation id -> annotation, in insertion order (re-keying
//! keeps the position). Secondary map: body id -> owning annotation id.
//!
//! All operations are in-memory and validate before they mutate. Readers
//! get shared references; the store is responsible for handing out copies.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use anno_types::{Annotation, Body};

use crate::error::{IndexError, IndexResult};

/// Primary and secondary annotation index, kept consistent as one unit.
#[derive(Clone, Debug, Default)]
pub struct DualIndex {
    pub(crate) annotations: IndexMap<String, Annotation>,
    pub(crate) bodies: HashMap<String, String>,
}

impl DualIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed annotations.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Returns `true` if no annotation is indexed.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Number of entries in the secondary (body) index.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.annotations.contains_key(id)
    }

    pub fn contains_body(&self, body_id: &str) -> bool {
        self.bodies.contains_key(body_id)
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    /// The id of the annotation owning `body_id`, per the secondary index.
    pub fn owner_of(&self, body_id: &str) -> Option<&str> {
        self.bodies.get(body_id).map(String::as_str)
    }

    /// Resolve a body through the secondary index.
    ///
    /// Returns `Ok(None)` when the body id is not indexed, and
    /// [`IndexError::DanglingBody`] when the index names an owner that does
    /// not actually hold the body.
    pub fn get_body(&self, body_id: &str) -> IndexResult<Option<&Body>> {
        let Some(owner) = self.bodies.get(body_id) else {
            return Ok(None);
        };

        self.annotations
            .get(owner)
            .and_then(|a| a.body(body_id))
            .map(Some)
            .ok_or_else(|| IndexError::DanglingBody {
                body: body_id.to_string(),
                owner: owner.clone(),
            })
    }

    /// Iterate annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    pub fn annotation_ids(&self) -> impl Iterator<Item = &str> {
        self.annotations.keys().map(String::as_str)
    }

    /// Iterate `(body id, owner id)` pairs of the secondary index.
    pub fn body_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bodies.iter().map(|(b, a)| (b.as_str(), a.as_str()))
    }

    /// Copy of every annotation, in insertion order.
    pub fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.values().cloned().collect()
    }

    // ---------------------------------------------------------------
    // Structural mutations
    // ---------------------------------------------------------------

    /// Index a new annotation and all of its bodies.
    pub fn insert(&mut self, annotation: Annotation) -> IndexResult<()> {
        if self.annotations.contains_key(&annotation.id) {
            return Err(IndexError::DuplicateAnnotation(annotation.id));
        }
        self.check_body_ids(&annotation, None)?;

        for body in &annotation.bodies {
            self.bodies.insert(body.id.clone(), annotation.id.clone());
        }
        debug!(annotation = %annotation.id, bodies = annotation.bodies.len(), "indexed annotation");
        self.annotations.insert(annotation.id.clone(), annotation);
        Ok(())
    }

    /// Replace the annotation stored under `old_id` with `annotation`.
    ///
    /// If the replacement carries a different id, the entry is re-keyed in
    /// place (its position in iteration order is kept). Bodies of the old
    /// value are purged from the secondary index and bodies of the new value
    /// are indexed under the new id. Returns the previous value.
    pub fn replace(&mut self, old_id: &str, annotation: Annotation) -> IndexResult<Annotation> {
        if !self.annotations.contains_key(old_id) {
            return Err(IndexError::AnnotationNotFound(old_id.to_string()));
        }
        if annotation.id != old_id && self.annotations.contains_key(&annotation.id) {
            return Err(IndexError::DuplicateAnnotation(annotation.id));
        }
        self.check_body_ids(&annotation, Some(old_id))?;

        let previous = if annotation.id == old_id {
            match self.annotations.get_mut(old_id) {
                Some(slot) => std::mem::replace(slot, annotation.clone()),
                None => return Err(IndexError::AnnotationNotFound(old_id.to_string())),
            }
        } else {
            let Some((position, _, previous)) = self.annotations.shift_remove_full(old_id) else {
                return Err(IndexError::AnnotationNotFound(old_id.to_string()));
            };
            debug!(from = %old_id, to = %annotation.id, "re-keyed annotation");
            self.annotations
                .shift_insert(position, annotation.id.clone(), annotation.clone());
            previous
        };

        for body in &previous.bodies {
            self.bodies.remove(&body.id);
        }
        for body in &annotation.bodies {
            self.bodies.insert(body.id.clone(), annotation.id.clone());
        }

        Ok(previous)
    }

    /// Remove an annotation and purge all of its bodies.
    ///
    /// Returns `None` if the id is not indexed.
    pub fn remove(&mut self, id: &str) -> Option<Annotation> {
        let removed = self.annotations.shift_remove(id)?;
        for body in &removed.bodies {
            self.bodies.remove(&body.id);
        }
        debug!(annotation = %id, "removed annotation from index");
        Some(removed)
    }

    /// Empty both maps, returning the previous annotations in order.
    pub fn clear(&mut self) -> Vec<Annotation> {
        self.bodies.clear();
        self.annotations.drain(..).map(|(_, a)| a).collect()
    }

    /// Reject body ids repeated within `annotation` or owned elsewhere.
    ///
    /// Bodies currently owned by `replacing` are allowed, since that
    /// annotation is about to be swapped out.
    fn check_body_ids(&self, annotation: &Annotation, replacing: Option<&str>) -> IndexResult<()> {
        let mut seen = HashSet::new();
        for body in &annotation.bodies {
            if !seen.insert(body.id.as_str()) {
                return Err(IndexError::DuplicateBody {
                    body: body.id.clone(),
                    owner: annotation.id.clone(),
                });
            }
            if let Some(owner) = self.bodies.get(&body.id) {
                if Some(owner.as_str()) != replacing {
                    return Err(IndexError::DuplicateBody {
                        body: body.id.clone(),
                        owner: owner.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
