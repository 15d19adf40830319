use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use super::{LifecycleEvent, LifecycleEventKind};

/// Registro de eventos append-only, por índice.
pub trait EventLog {
    /// Agrega un evento a partir de su kind y devuelve el evento completo
    /// (con seq y ts).
    fn append_kind(&mut self, index: &str, kind: LifecycleEventKind) -> LifecycleEvent;
    /// Lista eventos de un índice (orden ascendente por seq).
    fn list(&self, index: &str) -> Vec<LifecycleEvent>;
}


pub struct InMemoryEventLog { pub inner: HashMap<String, Vec<LifecycleEvent>> }

impl Default for InMemoryEventLog { fn default() -> Self { Self { inner: HashMap::new() } } }

impl EventLog for InMemoryEventLog {
    fn append_kind(&mut self, index: &str, kind: LifecycleEventKind) -> LifecycleEvent {
        let vec = self.inner.entry(index.to_string()).or_insert_with(Vec::new);
        let seq = vec.len() as u64;
        let ev = LifecycleEvent { id: Uuid::new_v4(),
                                  seq,
                                  index: index.to_string(),
                                  kind,
                                  ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, index: &str) -> Vec<LifecycleEvent> {
        self.inner.get(index).cloned().unwrap_or_default()
    }
}
