//! Errores específicos del core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errores observables durante la ejecución de pasos. `Transient` se
/// reintenta con tope; `Terminal` lleva al índice directamente al estado de
/// error.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum LifecycleError {
    #[error("transient step failure: {0}")] Transient(String),
    #[error("terminal step failure: {0}")] Terminal(String),
    #[error("no step registered under key {0}")] UnknownStep(String),
    #[error("no compiled policy named {0}")] UnknownPolicy(String),
    #[error("state persistence failed: {0}")] Persistence(String),
    #[error("internal: {0}")] Internal(String),
}

impl LifecycleError {
    /// Un error terminal no consume presupuesto de reintentos: el índice
    /// entra en estado de error inmediatamente.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleError::Terminal(_) | LifecycleError::UnknownStep(_))
    }
}

/// Errores de compilación de una política a su registro de pasos. Se
/// detectan una sola vez, al compilar; nunca en ejecución.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("policy {0} compiles to no steps")] EmptyPolicy(String),
    #[error("duplicate step key {0}")] DuplicateStepKey(String),
    #[error("step {0} points at itself")] SelfLoop(String),
    #[error("step {0} points at unknown key {1}")] DanglingNextKey(String, String),
    #[error("step {0} is unreachable from the first step")] OrphanStep(String),
}
