//! Estado de ejecución de ciclo de vida por índice.
//!
//! Registro persistido junto a los metadatos del índice: paso actual,
//! instante de inicio del paso, contabilidad de fallos y bandera de error.
//! Lo muta exclusivamente el ejecutor como resultado del desenlace de un
//! paso, y sobrevive reinicios del proceso: el índice retoma exactamente en
//! la clave registrada.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::step::StepKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleExecutionState {
    pub current_step: StepKey,
    pub step_started_at: DateTime<Utc>,
    pub failed_step: Option<StepKey>,
    pub consecutive_failures: u32,
    pub is_in_error: bool,
    /// Hash de la política compilada bajo la que se creó/avanzó este estado.
    /// Permite detectar un cambio de política en caliente.
    pub policy_hash: String,
}

impl LifecycleExecutionState {
    /// Estado inicial: puntero al primer paso de la primera fase.
    pub fn new(first_step: StepKey, policy_hash: impl Into<String>) -> Self {
        LifecycleExecutionState { current_step: first_step,
                                  step_started_at: Utc::now(),
                                  failed_step: None,
                                  consecutive_failures: 0,
                                  is_in_error: false,
                                  policy_hash: policy_hash.into() }
    }

    /// Avanza el puntero al sucesor y limpia la contabilidad de fallos.
    pub fn advance(&mut self, next: StepKey) {
        self.current_step = next;
        self.step_started_at = Utc::now();
        self.failed_step = None;
        self.consecutive_failures = 0;
        self.is_in_error = false;
    }

    /// Registra un fallo transitorio del paso actual. Devuelve `true` si el
    /// fallo alcanzó el tope y el índice entró en estado de error; el
    /// puntero no cambia en ningún caso, de modo que un reintento retoma en
    /// el mismo paso.
    pub fn record_failure(&mut self, retry_cap: u32) -> bool {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= retry_cap {
            self.enter_error();
            return true;
        }
        false
    }

    /// Entrada directa al estado de error (fallos terminales).
    pub fn enter_error(&mut self) {
        self.is_in_error = true;
        self.failed_step = Some(self.current_step.clone());
    }

    /// Orden externa de reintento: limpia la bandera dejando el puntero en
    /// el paso fallido.
    pub fn clear_error(&mut self) {
        self.is_in_error = false;
        self.consecutive_failures = 0;
        self.failed_step = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LifecycleExecutionState {
        LifecycleExecutionState::new(StepKey::new("warm", "allocate", "allocate"), "hash-1")
    }

    #[test]
    fn failures_below_cap_keep_pointer_and_flag() {
        let mut st = state();
        for attempt in 1..10 {
            assert!(!st.record_failure(10), "attempt {attempt} must not enter error");
            assert!(!st.is_in_error);
            assert_eq!(st.consecutive_failures, attempt);
            assert_eq!(st.current_step, StepKey::new("warm", "allocate", "allocate"));
        }
    }

    #[test]
    fn cap_th_failure_enters_error_with_failed_step() {
        let mut st = state();
        for _ in 1..10 {
            st.record_failure(10);
        }
        assert!(st.record_failure(10), "10th failure must enter error");
        assert!(st.is_in_error);
        assert_eq!(st.failed_step, Some(st.current_step.clone()));
    }

    #[test]
    fn advance_clears_failure_accounting() {
        let mut st = state();
        st.record_failure(10);
        st.advance(StepKey::new("warm", "allocate", "check-allocation"));
        assert_eq!(st.consecutive_failures, 0);
        assert!(st.failed_step.is_none());
        assert!(!st.is_in_error);
        assert_eq!(st.current_step, StepKey::new("warm", "allocate", "check-allocation"));
    }

    #[test]
    fn clear_error_keeps_pointer_at_failed_step() {
        let mut st = state();
        for _ in 0..10 {
            st.record_failure(10);
        }
        let failed_at = st.current_step.clone();
        st.clear_error();
        assert!(!st.is_in_error);
        assert_eq!(st.current_step, failed_at);
    }

    #[test]
    fn serde_round_trip() {
        let st = state();
        let json = serde_json::to_string(&st).unwrap();
        let back: LifecycleExecutionState = serde_json::from_str(&json).unwrap();
        assert_eq!(st, back);
    }
}
