//! Tipos de evento de transición y estructura `LifecycleEvent`.
//!
//! Rol: cada decisión del ejecutor sobre un índice emite un evento a un
//! `EventLog` append-only. Los eventos son diagnóstico observable (qué pasó
//! y cuándo); la fuente de verdad sigue siendo el estado de ejecución
//! persistido.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LifecycleError;
use crate::step::StepKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEventKind {
    /// Un índice recibió política: se fija el hash compilado y el primer
    /// paso. Invariante: debe ser el primer evento del índice.
    PolicyAssigned { policy: String, policy_hash: String, first_step: StepKey },
    /// El paso terminó correctamente y el puntero avanzó a `next`.
    StepCompleted { step: StepKey, next: StepKey },
    /// Un predicado de espera aún no se cumple. No es un fallo.
    WaitNotMet { step: StepKey, explanation: Option<String> },
    /// El paso falló; `consecutive_failures` incluye este intento.
    StepFailed {
        step: StepKey,
        error: LifecycleError,
        consecutive_failures: u32,
    },
    /// El fallo fue transitorio y queda presupuesto: se reintentará el
    /// mismo paso en el próximo tick.
    RetryScheduled { step: StepKey, attempt: u32 },
    /// Presupuesto agotado o fallo terminal: el índice queda en error hasta
    /// intervención externa.
    ErrorEntered { step: StepKey },
    /// Orden externa de reintento: se limpia la bandera de error.
    RetryRequested { step: StepKey },
    /// El puntero alcanzó el sentinel terminal.
    LifecycleCompleted,
    /// Estado descartado en silencio (índice o política desaparecidos).
    StateDiscarded { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub id: Uuid,
    pub seq: u64, // asignado por el EventLog (orden append por índice)
    pub index: String,
    pub kind: LifecycleEventKind,
    pub ts: DateTime<Utc>, // metadato, no participa en ningún hash
}
