//! Definiciones relacionadas a Steps.
//!
//! Un paso es la unidad atómica, reanudable y reintentable de progreso de
//! ciclo de vida. Este módulo define:
//! - `StepKey`: identidad estructural (fase, acción, nombre) y puntero de
//!   posición de ejecución.
//! - Las cuatro formas de ejecución y el enum cerrado `Step`.

pub mod key;
pub mod shapes;

pub use key::StepKey;
pub use shapes::{AsyncActionStep, AsyncWaitStep, ClusterStateActionStep, ClusterStateWaitStep, Step, StepShape,
                 WaitResult};
