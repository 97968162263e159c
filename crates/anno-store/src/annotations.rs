//! Annotation-level operations: add, update, upsert, delete, clear, and
//! their bulk variants.

use tracing::{debug, warn};

use anno_diff::{diff_annotations, Update};
use anno_fabric::ChangeSet;
use anno_index::DualIndex;
use anno_types::{sanitize, Annotation, AnnotationDraft, Origin};

use crate::error::{StoreError, StoreResult};
use crate::store::AnnotationStore;

/// Replace the annotation stored under `old_id` with `replacement`.
///
/// Soft failure (`Ok(None)`) if `old_id` is not indexed.
pub(crate) fn update_in(
    index: &mut DualIndex,
    old_id: &str,
    replacement: Annotation,
) -> StoreResult<Option<Update>> {
    let Some(old) = index.get(old_id).cloned() else {
        warn!(annotation = %old_id, "cannot update annotation: does not exist");
        return Ok(None);
    };

    let update = diff_annotations(&old, &replacement);
    index.replace(old_id, replacement)?;
    Ok(Some(update))
}

fn delete_in(index: &mut DualIndex, id: &str) -> Option<Annotation> {
    let removed = index.remove(id);
    if removed.is_none() {
        warn!(annotation = %id, "attempt to delete missing annotation");
    }
    removed
}

impl AnnotationStore {
    /// Sanitize and insert a new annotation, emitting `created`.
    ///
    /// Fails with [`StoreError::DuplicateId`] if the id is taken, or
    /// [`StoreError::DuplicateBodyId`] if one of its body ids is.
    pub fn add(&self, draft: AnnotationDraft, origin: Origin) -> StoreResult<Annotation> {
        self.check_depth()?;
        if let Some(id) = draft.id.as_deref() {
            if self.contains(id) {
                return Err(StoreError::DuplicateId { id: id.to_string() });
            }
        }

        let annotation = sanitize(draft, self.id_source());
        self.index.borrow_mut().insert(annotation.clone())?;

        debug!(annotation = %annotation.id, %origin, "annotation added");
        self.emit(origin, ChangeSet::created(vec![annotation.clone()]));
        Ok(annotation)
    }

    /// Replace an annotation with a full replacement object.
    ///
    /// The replacement's own id names the annotation to replace. Missing
    /// annotations are a soft failure: a warning, no mutation, no event.
    pub fn update(&self, annotation: Annotation, origin: Origin) -> StoreResult<Option<Update>> {
        self.check_depth()?;
        let old_id = annotation.id.clone();
        let replacement = sanitize(annotation.into(), self.id_source());
        self.apply_update(&old_id, replacement, origin)
    }

    /// Replace the annotation stored under `id` with `draft`.
    ///
    /// If the draft carries a different id the annotation is renamed and
    /// both indices are re-keyed; the emitted update has `old_value.id ==
    /// id` and `new_value.id ==` the draft's id. A draft without an id keeps
    /// `id`.
    pub fn update_by_id(
        &self,
        id: &str,
        draft: AnnotationDraft,
        origin: Origin,
    ) -> StoreResult<Option<Update>> {
        self.check_depth()?;
        let draft = AnnotationDraft {
            id: draft.id.or_else(|| Some(id.to_string())),
            ..draft
        };
        let replacement = sanitize(draft, self.id_source());
        self.apply_update(id, replacement, origin)
    }

    fn apply_update(
        &self,
        old_id: &str,
        replacement: Annotation,
        origin: Origin,
    ) -> StoreResult<Option<Update>> {
        let update = update_in(&mut self.index.borrow_mut(), old_id, replacement)?;
        self.emit_single(update, origin, "annotation updated")
    }

    /// Add the draft if its id is unknown, otherwise update in place.
    ///
    /// Returns the annotation as stored afterwards.
    pub fn upsert(&self, draft: AnnotationDraft, origin: Origin) -> StoreResult<Annotation> {
        let exists = draft.id.as_deref().is_some_and(|id| self.contains(id));
        if !exists {
            return self.add(draft, origin);
        }

        let replacement = sanitize(draft, self.id_source());
        let stored = replacement.clone();
        let update = self.update(replacement, origin)?;
        Ok(update.map(|u| u.new_value).unwrap_or(stored))
    }

    /// Insert many annotations with a single event.
    ///
    /// With `replace`, the prior state is dropped first and the event
    /// carries both `created` (the new set) and `deleted` (the prior set).
    /// Without it, any id collision with an existing annotation fails the
    /// whole call with [`StoreError::BulkOverwrite`].
    pub fn bulk_add(
        &self,
        drafts: Vec<AnnotationDraft>,
        replace: bool,
        origin: Origin,
    ) -> StoreResult<Vec<Annotation>> {
        self.check_depth()?;
        let sanitized: Vec<Annotation> = drafts
            .into_iter()
            .map(|d| sanitize(d, self.id_source()))
            .collect();

        let deleted = {
            let mut index = self.index.borrow_mut();
            if replace {
                let mut staged = DualIndex::new();
                for annotation in &sanitized {
                    staged.insert(annotation.clone())?;
                }
                let mut previous = std::mem::replace(&mut *index, staged);
                previous.clear()
            } else {
                let colliding: Vec<String> = sanitized
                    .iter()
                    .filter(|a| index.contains(&a.id))
                    .map(|a| a.id.clone())
                    .collect();
                if !colliding.is_empty() {
                    return Err(StoreError::BulkOverwrite { ids: colliding });
                }

                let mut staged = index.clone();
                for annotation in &sanitized {
                    staged.insert(annotation.clone())?;
                }
                *index = staged;
                Vec::new()
            }
        };

        debug!(
            created = sanitized.len(),
            deleted = deleted.len(),
            replace,
            %origin,
            "bulk add applied"
        );
        self.emit(
            origin,
            ChangeSet {
                created: sanitized.clone(),
                updated: Vec::new(),
                deleted,
            },
        );
        Ok(sanitized)
    }

    /// Apply [`AnnotationStore::update`] to each annotation, with one event.
    ///
    /// Missing annotations are skipped with a warning. A hard failure on any
    /// item leaves the store untouched.
    pub fn bulk_update(
        &self,
        annotations: Vec<Annotation>,
        origin: Origin,
    ) -> StoreResult<Vec<Update>> {
        self.check_depth()?;
        let replacements: Vec<Annotation> = annotations
            .into_iter()
            .map(|a| sanitize(a.into(), self.id_source()))
            .collect();

        let updates = self.stage(|staged| {
            let mut updates = Vec::new();
            for replacement in replacements {
                let old_id = replacement.id.clone();
                if let Some(update) = update_in(staged, &old_id, replacement)? {
                    updates.push(update);
                }
            }
            Ok(updates)
        })?;

        debug!(updated = updates.len(), %origin, "bulk update applied");
        self.emit(origin, ChangeSet::updated(updates.clone()));
        Ok(updates)
    }

    /// Add unknown ids and update known ones, with one event.
    pub fn bulk_upsert(
        &self,
        drafts: Vec<AnnotationDraft>,
        origin: Origin,
    ) -> StoreResult<ChangeSet> {
        self.check_depth()?;
        let sanitized: Vec<Annotation> = drafts
            .into_iter()
            .map(|d| sanitize(d, self.id_source()))
            .collect();

        let changes = self.stage(|staged| {
            let mut changes = ChangeSet::new();
            for annotation in sanitized {
                if staged.contains(&annotation.id) {
                    let old_id = annotation.id.clone();
                    if let Some(update) = update_in(staged, &old_id, annotation)? {
                        changes.updated.push(update);
                    }
                } else {
                    staged.insert(annotation.clone())?;
                    changes.created.push(annotation);
                }
            }
            Ok(changes)
        })?;

        debug!(
            created = changes.created.len(),
            updated = changes.updated.len(),
            %origin,
            "bulk upsert applied"
        );
        self.emit(origin, changes.clone());
        Ok(changes)
    }

    /// Remove an annotation and purge its bodies from the body index.
    ///
    /// Missing ids are a soft failure.
    pub fn delete(&self, id: &str, origin: Origin) -> StoreResult<Option<Annotation>> {
        self.check_depth()?;
        let removed = delete_in(&mut self.index.borrow_mut(), id);

        if let Some(ref annotation) = removed {
            debug!(annotation = %annotation.id, %origin, "annotation deleted");
            self.emit(origin, ChangeSet::deleted(vec![annotation.clone()]));
        }
        Ok(removed)
    }

    /// Delete many annotations with a single event. Missing ids are skipped.
    pub fn bulk_delete<S: AsRef<str>>(
        &self,
        ids: impl IntoIterator<Item = S>,
        origin: Origin,
    ) -> StoreResult<Vec<Annotation>> {
        self.check_depth()?;
        let deleted: Vec<Annotation> = {
            let mut index = self.index.borrow_mut();
            ids.into_iter()
                .filter_map(|id| delete_in(&mut index, id.as_ref()))
                .collect()
        };

        debug!(deleted = deleted.len(), %origin, "bulk delete applied");
        self.emit(origin, ChangeSet::deleted(deleted.clone()));
        Ok(deleted)
    }

    /// Drop every annotation. The event's `deleted` holds the prior set.
    pub fn clear(&self, origin: Origin) -> StoreResult<Vec<Annotation>> {
        self.check_depth()?;
        let deleted = self.index.borrow_mut().clear();

        debug!(deleted = deleted.len(), %origin, "store cleared");
        self.emit(origin, ChangeSet::deleted(deleted.clone()));
        Ok(deleted)
    }
}
