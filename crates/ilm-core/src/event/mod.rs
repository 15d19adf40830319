//! Eventos de transición del ejecutor.

pub mod store;
pub mod types;

pub use store::{EventLog, InMemoryEventLog};
pub use types::{LifecycleEvent, LifecycleEventKind};
