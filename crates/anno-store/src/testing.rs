//! Shared fixtures for store tests.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anno_fabric::{ChangeEvent, ObserveOptions, ObserverId};
use anno_types::{AnnotationDraft, Body, SequentialIdSource, Target};

use crate::store::AnnotationStore;

/// Store with predictable generated ids (`gen-1`, `gen-2`, ...).
pub(crate) fn fixture_store() -> AnnotationStore {
    AnnotationStore::new().with_id_source(SequentialIdSource::new("gen-"))
}

/// Draft with the given id, one textual body per entry, and target `img1`.
pub(crate) fn draft(id: &str, bodies: &[&str]) -> AnnotationDraft {
    AnnotationDraft::new()
        .with_id(id)
        .with_bodies(
            bodies
                .iter()
                .map(|b| Body::new(*b, "").with_type("TextualBody").with_value(format!("text of {b}")))
                .collect(),
        )
        .with_target(Target::new("img1"))
}

/// Observer that records every event it receives.
pub(crate) struct Recorder {
    pub(crate) id: ObserverId,
    events: Rc<RefCell<Vec<ChangeEvent>>>,
}

impl Recorder {
    pub(crate) fn attach(store: &AnnotationStore, options: ObserveOptions) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let id = store.observe(move |e| sink.borrow_mut().push(e.clone()), options);
        Self { id, events }
    }

    pub(crate) fn events(&self) -> Vec<ChangeEvent> {
        self.events.borrow().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.events.borrow().len()
    }

    pub(crate) fn last(&self) -> ChangeEvent {
        self.events
            .borrow()
            .last()
            .cloned()
            .expect("no event recorded")
    }
}

#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that captures formatted log lines.
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buf = SharedBuf(Arc::new(Mutex::new(Vec::new())));
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buf.0.lock().expect("log buffer poisoned")).into_owned();
    (result, logs)
}
