//! Identidad de un paso: la tripleta (fase, acción, nombre).
//!
//! Un `StepKey` funciona a la vez como clave de registro y como puntero
//! persistido a "qué se ejecuta después". La igualdad es estructural y la
//! tripleta es inmutable una vez construida.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Componente reservada del sentinel de finalización.
const COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepKey {
    pub phase: String,
    pub action: String,
    pub name: String,
}

impl StepKey {
    pub fn new(phase: impl Into<String>, action: impl Into<String>, name: impl Into<String>) -> Self {
        StepKey { phase: phase.into(),
                  action: action.into(),
                  name: name.into() }
    }

    /// Sentinel terminal: la política terminó para el índice.
    pub fn completed() -> Self {
        StepKey::new(COMPLETED, COMPLETED, COMPLETED)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == COMPLETED && self.action == COMPLETED && self.name == COMPLETED
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.phase, self.action, self.name)
    }
}
