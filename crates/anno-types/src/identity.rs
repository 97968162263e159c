//! Identifier sources.
//!
//! The store never invents identifiers on its own. Whenever a draft arrives
//! without an id, the store asks its [`IdSource`] for a fresh one.

use std::cell::Cell;

/// Supplier of fresh, globally unique annotation identifiers.
pub trait IdSource {
    /// Return an identifier that has never been returned before.
    fn next_id(&self) -> String;
}

/// Default source: time-ordered UUID v7 strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self) -> String {
        uuid::Uuid::now_v7().to_string()
    }
}

/// Deterministic source producing `{prefix}{n}` with `n` counting from 1.
///
/// Intended for tests and fixtures where generated ids must be predictable.
#[derive(Debug)]
pub struct SequentialIdSource {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIdSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}{n}", self.prefix)
    }
}
