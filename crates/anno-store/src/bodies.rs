//! Body-level operations. Each rewrites the owning annotation as a whole
//! and re-indexes it, so both maps move together.

use tracing::{debug, warn};

use anno_diff::{BodyChange, Update};
use anno_fabric::ChangeSet;
use anno_index::DualIndex;
use anno_types::{Body, BodyRef, Origin};

use crate::error::{StoreError, StoreResult};
use crate::store::AnnotationStore;

fn add_body_in(index: &mut DualIndex, body: Body) -> StoreResult<Option<Update>> {
    let Some(old) = index.get(&body.annotation).cloned() else {
        warn!(annotation = %body.annotation, body = %body.id, "attempt to add body to missing annotation");
        return Ok(None);
    };
    if let Some(owner) = index.owner_of(&body.id) {
        return Err(StoreError::DuplicateBodyId {
            body: body.id.clone(),
            owner: owner.to_string(),
        });
    }

    let mut new = old.clone();
    new.bodies.push(body.clone());
    index.replace(&old.id, new.clone())?;
    Ok(Some(Update::new(old, new).with_bodies_created(vec![body])))
}

fn update_body_in(index: &mut DualIndex, old: &BodyRef, body: Body) -> StoreResult<Option<Update>> {
    if old.annotation != body.annotation {
        return Err(StoreError::IntegrityViolation {
            body: old.id.clone(),
            expected: old.annotation.clone(),
            actual: body.annotation,
        });
    }

    let Some(annotation) = index.get(&old.annotation).cloned() else {
        warn!(annotation = %old.annotation, body = %old.id, "attempt to update body on missing annotation");
        return Ok(None);
    };
    let Some(position) = annotation.bodies.iter().position(|b| b.id == old.id) else {
        warn!(annotation = %old.annotation, body = %old.id, "attempt to update missing body");
        return Ok(None);
    };
    if body.id != old.id {
        if let Some(owner) = index.owner_of(&body.id) {
            return Err(StoreError::DuplicateBodyId {
                body: body.id.clone(),
                owner: owner.to_string(),
            });
        }
    }

    let mut new = annotation.clone();
    let old_body = std::mem::replace(&mut new.bodies[position], body.clone());
    index.replace(&annotation.id, new.clone())?;
    Ok(Some(Update::new(annotation, new).with_bodies_updated(vec![BodyChange {
        old_body,
        new_body: body,
    }])))
}

fn delete_body_in(index: &mut DualIndex, body: &BodyRef) -> StoreResult<Option<Update>> {
    let Some(old) = index.get(&body.annotation).cloned() else {
        warn!(annotation = %body.annotation, body = %body.id, "attempt to delete body from missing annotation");
        return Ok(None);
    };
    let Some(position) = old.bodies.iter().position(|b| b.id == body.id) else {
        warn!(annotation = %body.annotation, body = %body.id, "attempt to delete missing body");
        return Ok(None);
    };

    let mut new = old.clone();
    let removed = new.bodies.remove(position);
    index.replace(&old.id, new.clone())?;
    Ok(Some(Update::new(old, new).with_bodies_deleted(vec![removed])))
}

impl AnnotationStore {
    /// Append a body to the annotation named by its back-reference.
    ///
    /// Soft failure if that annotation does not exist.
    pub fn add_body(&self, body: Body, origin: Origin) -> StoreResult<Option<Update>> {
        self.check_depth()?;
        let update = add_body_in(&mut self.index.borrow_mut(), body)?;
        self.emit_single(update, origin, "body added")
    }

    /// Replace the body identified by `old` with `body`, keeping its
    /// position. If the body id changes, the body index is re-keyed.
    ///
    /// Fails with [`StoreError::IntegrityViolation`] if `body` names a
    /// different annotation than `old`.
    pub fn update_body(&self, old: &BodyRef, body: Body, origin: Origin) -> StoreResult<Option<Update>> {
        self.check_depth()?;
        let update = update_body_in(&mut self.index.borrow_mut(), old, body)?;
        self.emit_single(update, origin, "body updated")
    }

    /// Remove a body from its annotation. Soft failure if either is missing.
    pub fn delete_body(&self, body: &BodyRef, origin: Origin) -> StoreResult<Option<Update>> {
        self.check_depth()?;
        let update = delete_body_in(&mut self.index.borrow_mut(), body)?;
        self.emit_single(update, origin, "body deleted")
    }

    /// Update many bodies in place, with one event.
    ///
    /// Each body is matched by its own id within the annotation its
    /// back-reference names. Bodies that cannot be found are skipped.
    pub fn bulk_update_body(&self, bodies: Vec<Body>, origin: Origin) -> StoreResult<Vec<Update>> {
        self.check_depth()?;
        let updates = self.stage(|staged| {
            let mut updates = Vec::new();
            for body in bodies {
                let old = body.to_ref();
                if let Some(update) = update_body_in(staged, &old, body)? {
                    updates.push(update);
                }
            }
            Ok(updates)
        })?;

        debug!(updated = updates.len(), %origin, "bulk body update applied");
        self.emit(origin, ChangeSet::updated(updates.clone()));
        Ok(updates)
    }

    /// Delete many bodies, with one event. Missing bodies are skipped.
    pub fn bulk_delete_body(&self, bodies: &[BodyRef], origin: Origin) -> StoreResult<Vec<Update>> {
        self.check_depth()?;
        let updates = self.stage(|staged| {
            let mut updates = Vec::new();
            for body in bodies {
                if let Some(update) = delete_body_in(staged, body)? {
                    updates.push(update);
                }
            }
            Ok(updates)
        })?;

        debug!(updated = updates.len(), %origin, "bulk body delete applied");
        self.emit(origin, ChangeSet::updated(updates.clone()));
        Ok(updates)
    }
}
