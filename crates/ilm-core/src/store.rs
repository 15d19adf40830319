//! Persistencia del estado de ejecución por índice.
//!
//! El ejecutor escribe después de cada transición y lee al arrancar para
//! retomar cada índice exactamente en la clave registrada. La implementación
//! in-memory sirve para tests y para el simulador; la durable vive en
//! `ilm-persistence`.

use std::collections::HashMap;

use crate::errors::LifecycleError;
use crate::execution::LifecycleExecutionState;

pub trait ExecutionStateStore {
    fn load(&self, index: &str) -> Option<LifecycleExecutionState>;
    fn save(&mut self, index: &str, state: &LifecycleExecutionState) -> Result<(), LifecycleError>;
    fn remove(&mut self, index: &str) -> Result<(), LifecycleError>;
    /// Índices con estado registrado (para el barrido de arranque y el tick).
    fn list(&self) -> Vec<String>;
}

pub struct InMemoryStateStore { pub inner: HashMap<String, LifecycleExecutionState> }

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self { inner: HashMap::new() }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionStateStore for InMemoryStateStore {
    fn load(&self, index: &str) -> Option<LifecycleExecutionState> {
        self.inner.get(index).cloned()
    }

    fn save(&mut self, index: &str, state: &LifecycleExecutionState) -> Result<(), LifecycleError> {
        self.inner.insert(index.to_string(), state.clone());
        Ok(())
    }

    fn remove(&mut self, index: &str) -> Result<(), LifecycleError> {
        self.inner.remove(index);
        Ok(())
    }

    fn list(&self) -> Vec<String> {
        self.inner.keys().cloned().collect()
    }
}
