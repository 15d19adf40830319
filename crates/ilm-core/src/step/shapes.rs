//! Las cuatro formas de ejecución de un paso.
//!
//! Todas comparten la base `key`/`next_key`; difieren en dónde suspenden:
//! - `ClusterStateActionStep`: función pura y síncrona del snapshot; produce
//!   un delta de settings que el ejecutor envía como actualización.
//! - `ClusterStateWaitStep`: predicado puro sobre el snapshot; se re-evalúa
//!   en cada cambio de estado de clúster hasta cumplirse.
//! - `AsyncActionStep`: emite una petición a un subsistema externo y reporta
//!   su finalización de forma asíncrona.
//! - `AsyncWaitStep`: consulta el estado de un subsistema externo no
//!   derivable del snapshot local.
//!
//! El conjunto es cerrado: el enum `Step` etiqueta la forma de manera
//! explícita y el ejecutor despacha por esa etiqueta.

use async_trait::async_trait;
use std::fmt;

use crate::errors::LifecycleError;
use crate::model::{ClusterState, SettingsUpdate};
use crate::step::StepKey;

/// Resultado de evaluar un predicado de espera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    pub met: bool,
    /// Explicación legible de qué se está esperando (solo cuando `!met`).
    pub explanation: Option<String>,
}

impl WaitResult {
    pub fn met() -> Self {
        WaitResult { met: true, explanation: None }
    }

    pub fn pending(explanation: impl Into<String>) -> Self {
        WaitResult { met: false,
                     explanation: Some(explanation.into()) }
    }
}

/// Acción síncrona y pura sobre el snapshot: calcula el delta de settings
/// deseado. Nunca bloquea; el envío de la actualización es responsabilidad
/// del ejecutor.
pub trait ClusterStateActionStep: Send + Sync {
    fn key(&self) -> &StepKey;
    fn next_key(&self) -> &StepKey;
    fn perform(&self, index: &str, cluster: &ClusterState) -> Result<SettingsUpdate, LifecycleError>;
}

/// Predicado síncrono sin efectos sobre el snapshot actual.
pub trait ClusterStateWaitStep: Send + Sync {
    fn key(&self) -> &StepKey;
    fn next_key(&self) -> &StepKey;
    fn is_condition_met(&self, index: &str, cluster: &ClusterState) -> Result<WaitResult, LifecycleError>;
}

/// Acción contra un subsistema externo; la finalización llega de forma
/// asíncrona. Errores recuperables se reportan como
/// `LifecycleError::Transient`, los definitivos como `Terminal`.
#[async_trait]
pub trait AsyncActionStep: Send + Sync {
    fn key(&self) -> &StepKey;
    fn next_key(&self) -> &StepKey;
    async fn perform(&self, index: &str, cluster: &ClusterState) -> Result<(), LifecycleError>;
}

/// Sondeo asíncrono del estado de un subsistema externo.
#[async_trait]
pub trait AsyncWaitStep: Send + Sync {
    fn key(&self) -> &StepKey;
    fn next_key(&self) -> &StepKey;
    async fn check(&self, index: &str) -> Result<WaitResult, LifecycleError>;
}

/// Etiqueta explícita de la forma de un paso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepShape {
    ClusterStateAction,
    ClusterStateWait,
    AsyncAction,
    AsyncWait,
}

/// Unidad de progreso del ciclo de vida: conoce su clave y la de su sucesor.
pub enum Step {
    ClusterStateAction(Box<dyn ClusterStateActionStep>),
    ClusterStateWait(Box<dyn ClusterStateWaitStep>),
    AsyncAction(Box<dyn AsyncActionStep>),
    AsyncWait(Box<dyn AsyncWaitStep>),
}

impl Step {
    pub fn key(&self) -> &StepKey {
        match self {
            Step::ClusterStateAction(s) => s.key(),
            Step::ClusterStateWait(s) => s.key(),
            Step::AsyncAction(s) => s.key(),
            Step::AsyncWait(s) => s.key(),
        }
    }

    pub fn next_key(&self) -> &StepKey {
        match self {
            Step::ClusterStateAction(s) => s.next_key(),
            Step::ClusterStateWait(s) => s.next_key(),
            Step::AsyncAction(s) => s.next_key(),
            Step::AsyncWait(s) => s.next_key(),
        }
    }

    pub fn shape(&self) -> StepShape {
        match self {
            Step::ClusterStateAction(_) => StepShape::ClusterStateAction,
            Step::ClusterStateWait(_) => StepShape::ClusterStateWait,
            Step::AsyncAction(_) => StepShape::AsyncAction,
            Step::AsyncWait(_) => StepShape::AsyncWait,
        }
    }

    /// Las formas de espera no mutan nada; no consumir presupuesto de
    /// reintentos cuando simplemente "aún no".
    pub fn is_wait(&self) -> bool {
        matches!(self.shape(), StepShape::ClusterStateWait | StepShape::AsyncWait)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step({:?} {} -> {})", self.shape(), self.key(), self.next_key())
    }
}
