use tracing::{debug, warn};

use anno_diff::Update;
use anno_fabric::ChangeSet;
use anno_index::DualIndex;
use anno_types::{Origin, Target};

use crate::error::StoreResult;
use crate::store::AnnotationStore;

/// Merge `patch` into the target of the annotation its back-reference names.
fn update_target_in(index: &mut DualIndex, patch: &Target) -> StoreResult<Option<Update>> {
    let Some(old) = index.get(&patch.annotation).cloned() else {
        warn!(annotation = %patch.annotation, "attempt to update target on missing annotation");
        return Ok(None);
    };

    let mut new = old.clone();
    new.target = old.target.merged_with(patch);
    let old_target = old.target.clone();
    let new_target = new.target.clone();
    index.replace(&old.id, new.clone())?;
    Ok(Some(Update::new(old, new).with_target_updated(old_target, new_target)))
}

impl AnnotationStore {
    /// Shallow-merge `target` into the existing target of the annotation
    /// named by `target.annotation`. Fields present on the patch win.
    ///
    /// The emitted update carries the merged target as `new_target`. Soft
    /// failure if the annotation does not exist.
    pub fn update_target(&self, target: Target, origin: Origin) -> StoreResult<Option<Update>> {
        self.check_depth()?;
        let update = update_target_in(&mut self.index.borrow_mut(), &target)?;
        self.emit_single(update, origin, "target updated")
    }

    /// Merge many target patches, with one event. Missing annotations are
    /// skipped.
    pub fn bulk_update_target(&self, targets: &[Target], origin: Origin) -> StoreResult<Vec<Update>> {
        self.check_depth()?;
        let updates = self.stage(|staged| {
            let mut updates = Vec::new();
            for target in targets {
                if let Some(update) = update_target_in(staged, target)? {
                    updates.push(update);
                }
            }
            Ok(updates)
        })?;

        debug!(updated = updates.len(), %origin, "bulk target update applied");
        self.emit(origin, ChangeSet::updated(updates.clone()));
        Ok(updates)
    }
}
