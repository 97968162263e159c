//! The [`AnnotationStore`] facade: state, observers, and read access.
//!
//! Mutating operations live in [`crate::annotations`], [`crate::bodies`]
//! and [`crate::targets`]. All of them follow the same discipline:
//!
//! 1. validate (hard failures return before anything changes),
//! 2. apply the change to both index maps,
//! 3. release the index borrow and emit one [`ChangeEvent`].
//!
//! Because the index is fully updated and no borrow is held when observers
//! run, an observer that mutates the store from its callback always sees a
//! consistent state.

use std::cell::RefCell;
use std::fmt;

use tracing::{debug, error, warn};

use anno_diff::Update;
use anno_fabric::{ChangeEvent, ChangeSet, EventBus, ObserveOptions, ObserverId};
use anno_index::{DualIndex, IndexError, IntegrityIssue};
use anno_types::{Annotation, Body, IdSource, Origin, UuidIdSource};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// In-memory, indexed, observable store of annotations.
///
/// Single-threaded: the store uses interior mutability without locking and
/// is neither `Send` nor `Sync`. Every operation runs to completion,
/// including observer dispatch, before it returns.
///
/// Observers that need to call back into the store should capture a
/// `Weak` reference to it; capturing an `Rc` creates a cycle.
pub struct AnnotationStore {
    pub(crate) index: RefCell<DualIndex>,
    bus: EventBus,
    ids: Box<dyn IdSource>,
    config: StoreConfig,
}

impl AnnotationStore {
    /// Create an empty store with UUID ids and default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            index: RefCell::new(DualIndex::new()),
            bus: EventBus::new(),
            ids: Box::new(UuidIdSource),
            config,
        }
    }

    /// Replace the identifier source used for drafts without an id.
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------

    /// Register an observer. See [`anno_fabric::bus`] for the reentrancy
    /// contract.
    pub fn observe<F>(&self, callback: F, options: ObserveOptions) -> ObserverId
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.bus.subscribe(callback, options)
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ---------------------------------------------------------------
    // Reads (never mutate, never emit, always copy)
    // ---------------------------------------------------------------

    /// Copy of every live annotation, in insertion order.
    pub fn all(&self) -> Vec<Annotation> {
        self.index.borrow().snapshot()
    }

    pub fn len(&self) -> usize {
        self.index.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.borrow().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.borrow().contains(id)
    }

    /// Copy of the annotation with the given id.
    pub fn get_annotation(&self, id: &str) -> Option<Annotation> {
        let found = self.index.borrow().get(id).cloned();
        if found.is_none() {
            debug!(annotation = %id, "annotation not found");
        }
        found
    }

    /// Copy of the body with the given id, resolved via the body index.
    pub fn get_body(&self, id: &str) -> Option<Body> {
        match self.index.borrow().get_body(id) {
            Ok(Some(body)) => Some(body.clone()),
            Ok(None) => {
                warn!(body = %id, "attempt to retrieve missing body");
                None
            }
            Err(IndexError::DanglingBody { body, owner }) => {
                error!(
                    target: "anno_store::integrity",
                    body = %body,
                    owner = %owner,
                    "store integrity error: body in index, but not in annotation"
                );
                None
            }
            Err(other) => {
                error!(target: "anno_store::integrity", error = %other, "body lookup failed");
                None
            }
        }
    }

    /// Re-derive both indices and report every inconsistency.
    pub fn verify_integrity(&self) -> Vec<IntegrityIssue> {
        let issues = self.index.borrow().check_integrity();
        for issue in &issues {
            error!(target: "anno_store::integrity", %issue, "store integrity error");
        }
        issues
    }

    // ---------------------------------------------------------------
    // Mutation plumbing
    // ---------------------------------------------------------------

    /// Reject a mutation attempted from too deep inside observer callbacks.
    pub(crate) fn check_depth(&self) -> StoreResult<()> {
        if let Some(limit) = self.config.max_dispatch_depth {
            let depth = self.bus.depth();
            if depth >= limit {
                error!(depth, limit, "observer reentrancy limit reached");
                return Err(StoreError::ReentrancyLimit { depth, limit });
            }
        }
        Ok(())
    }

    pub(crate) fn id_source(&self) -> &dyn IdSource {
        self.ids.as_ref()
    }

    /// Run `f` against a copy of the index; swap the copy in only if `f`
    /// succeeds.
    pub(crate) fn stage<T>(
        &self,
        f: impl FnOnce(&mut DualIndex) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut index = self.index.borrow_mut();
        let mut staged = index.clone();
        let result = f(&mut staged)?;
        *index = staged;
        Ok(result)
    }

    /// Emit a single-update event if there is an update, and hand it back.
    pub(crate) fn emit_single(
        &self,
        update: Option<Update>,
        origin: Origin,
        action: &str,
    ) -> StoreResult<Option<Update>> {
        if let Some(ref update) = update {
            debug!(annotation = %update.new_id(), %origin, "{action}");
            self.emit(origin, ChangeSet::updated(vec![update.clone()]));
        }
        Ok(update)
    }

    /// Build one event from `changes` and the current state, then dispatch.
    ///
    /// Must be called with no outstanding borrow of the index.
    pub(crate) fn emit(&self, origin: Origin, changes: ChangeSet) {
        if changes.is_empty() && self.config.skip_empty_events {
            return;
        }
        let state = self.index.borrow().snapshot();
        let event = ChangeEvent::new(origin, changes, state);
        self.bus.dispatch(&event);
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnnotationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.index.borrow();
        f.debug_struct("AnnotationStore")
            .field("annotations", &index.len())
            .field("bodies", &index.body_count())
            .field("observers", &self.bus.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, draft, fixture_store, Recorder};
    use anno_types::AnnotationDraft;

    #[test]
    fn get_annotation_returns_a_copy() {
        let store = fixture_store();
        store.add(draft("a1", &["b1"]), Origin::Local).unwrap();

        let mut copy = store.get_annotation("a1").unwrap();
        copy.bodies.clear();
        copy.target.source = Some("tampered".into());

        let stored = store.get_annotation("a1").unwrap();
        assert_eq!(stored.bodies.len(), 1);
        assert_eq!(stored.target.source.as_deref(), Some("img1"));
    }

    #[test]
    fn all_returns_copies_in_insertion_order() {
        let store = fixture_store();
        for id in ["z", "m", "a"] {
            store.add(draft(id, &[]), Origin::Local).unwrap();
        }

        let mut all = store.all();
        assert_eq!(all.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["z", "m", "a"]);
        all.clear();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn reads_never_emit() {
        let store = fixture_store();
        store.add(draft("a1", &["b1"]), Origin::Local).unwrap();
        let recorder = Recorder::attach(&store, ObserveOptions::default());

        store.get_annotation("a1");
        store.get_annotation("missing");
        store.get_body("b1");
        store.all();
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn get_body_missing_warns() {
        let store = fixture_store();
        let (found, logs) = capture_logs(|| store.get_body("nope"));
        assert!(found.is_none());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("attempt to retrieve missing body"));
    }

    #[test]
    fn verify_integrity_clean_after_mutations() {
        let store = fixture_store();
        store.add(draft("a1", &["b1", "b2"]), Origin::Local).unwrap();
        store.add(draft("a2", &["b3"]), Origin::Remote).unwrap();
        store.delete("a1", Origin::Local).unwrap();
        assert!(store.verify_integrity().is_empty());
    }

    #[test]
    fn debug_output_summarizes() {
        let store = fixture_store();
        store
            .add(AnnotationDraft::new().with_id("a1"), Origin::Local)
            .unwrap();
        let out = format!("{store:?}");
        assert!(out.contains("annotations: 1"));
    }
}
