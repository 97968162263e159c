//! Event fabric for the annotation store.
//!
//! Observers subscribe with optional filters and receive one
//! [`ChangeEvent`] per store mutation, synchronously, on the thread that
//! performed the mutation. Dispatch is re-entrant: an observer may mutate
//! the store from inside its callback.

pub mod bus;
pub mod event;
pub mod filter;

pub use bus::{EventBus, ObserverId};
pub use event::{ChangeEvent, ChangeKind, ChangeSet};
pub use filter::{Ignore, ObserveOptions};
