//! Ejecutor de pasos: reconcilia el estado de ejecución por índice contra
//! el snapshot de clúster vigente.
//!
//! Regla de transición por invocación:
//! 1. localizar el paso registrado bajo `current_step`;
//! 2. si es de espera, evaluar el predicado (no cumplido no es fallo);
//! 3. si es de acción, ejecutarlo; éxito avanza el puntero a `next`,
//!    fallo transitorio consume presupuesto de reintentos y fallo terminal
//!    (o presupuesto agotado) deja el índice en estado de error, con el
//!    puntero intacto para retomar exactamente ahí;
//! 4. un índice en error no avanza solo: requiere `retry` externo o un
//!    cambio de política.
//!
//! La ejecución se divide en `prepare` / `execute_step` / `apply` para que
//! ningún lock del ejecutor quede retenido a través de un await (los pasos
//! asíncronos esperan respuestas externas de duración no acotada).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::DEFAULT_RETRY_CAP;
use crate::errors::LifecycleError;
use crate::event::{EventLog, LifecycleEvent, LifecycleEventKind};
use crate::execution::LifecycleExecutionState;
use crate::model::{ClusterState, SettingsUpdate};
use crate::registry::CompiledPolicy;
use crate::step::{Step, StepKey};
use crate::store::ExecutionStateStore;

/// Canal de envío de actualizaciones de estado de clúster. Puede fallar
/// (red, conflicto); el ejecutor trata ese fallo como transitorio del paso.
#[async_trait]
pub trait ClusterUpdateSubmitter: Send + Sync {
    async fn submit(&self, update: SettingsUpdate) -> Result<(), LifecycleError>;
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Fallos consecutivos tolerados antes de entrar en estado de error.
    pub retry_cap: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig { retry_cap: DEFAULT_RETRY_CAP }
    }
}

/// Desenlace observable de una invocación de reconciliación.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Advanced { from: StepKey, to: StepKey },
    Waiting { step: StepKey, explanation: Option<String> },
    Retrying { step: StepKey, attempt: u32 },
    ErrorState { step: StepKey },
    AlreadyInError { step: StepKey },
    Completed,
    Discarded,
}

/// Resultado crudo de ejecutar un paso, antes de aplicar la transición.
#[derive(Debug)]
pub enum StepOutcome {
    Succeeded,
    NotMet { explanation: Option<String> },
    Failed(LifecycleError),
}

/// Primera mitad de la reconciliación: o bien un paso listo para ejecutar,
/// o bien un desenlace ya decidido sin ejecutar nada.
pub enum PrepareOutcome {
    Run {
        step: Arc<Step>,
        submitter: Arc<dyn ClusterUpdateSubmitter>,
    },
    Done(Progress),
}

pub struct LifecycleExecutor<S: ExecutionStateStore, L: EventLog> {
    policies: HashMap<String, Arc<CompiledPolicy>>,
    state_store: S,
    event_log: L,
    submitter: Arc<dyn ClusterUpdateSubmitter>,
    config: ExecutorConfig,
}

impl<S: ExecutionStateStore, L: EventLog> LifecycleExecutor<S, L> {
    pub fn new(state_store: S,
               event_log: L,
               submitter: Arc<dyn ClusterUpdateSubmitter>,
               config: ExecutorConfig)
               -> Self {
        LifecycleExecutor { policies: HashMap::new(),
                            state_store,
                            event_log,
                            submitter,
                            config }
    }

    pub fn register_policy(&mut self, policy: Arc<CompiledPolicy>) {
        self.policies.insert(policy.name().to_string(), policy);
    }

    /// Índices con estado registrado; al arrancar, el servicio los retoma
    /// exactamente en su clave persistida.
    pub fn managed_indices(&self) -> Vec<String> {
        self.state_store.list()
    }

    pub fn state(&self, index: &str) -> Option<LifecycleExecutionState> {
        self.state_store.load(index)
    }

    pub fn events(&self, index: &str) -> Vec<LifecycleEvent> {
        self.event_log.list(index)
    }

    /// Orden externa de reintento sobre un índice en estado de error:
    /// limpia la bandera dejando el puntero en el paso fallido.
    pub fn retry(&mut self, index: &str) -> Result<(), LifecycleError> {
        let mut state = self.state_store
                            .load(index)
                            .ok_or_else(|| LifecycleError::Internal(format!("no lifecycle state for index {index}")))?;
        if !state.is_in_error {
            return Err(LifecycleError::Internal(format!("index {index} is not in the error state")));
        }
        let step = state.current_step.clone();
        state.clear_error();
        self.state_store.save(index, &state)?;
        self.event_log.append_kind(index, LifecycleEventKind::RetryRequested { step });
        Ok(())
    }

    /// Reconciliación completa de un índice contra un snapshot. Conserva un
    /// `&mut self` a través del await; el servicio usa la forma partida
    /// `prepare`/`execute_step`/`apply` para no retener su lock.
    pub async fn run_once(&mut self, index: &str, cluster: &ClusterState) -> Result<Progress, LifecycleError> {
        match self.prepare(index, cluster)? {
            PrepareOutcome::Done(progress) => Ok(progress),
            PrepareOutcome::Run { step, submitter } => {
                let outcome = execute_step(&step, index, cluster, submitter.as_ref()).await;
                self.apply(index, &step, outcome)
            }
        }
    }

    /// Resuelve política y estado del índice y decide si hay paso que
    /// ejecutar. Crea el estado inicial cuando el índice recibe política
    /// por primera vez (el primer paso se ejecuta en esta misma pasada).
    pub fn prepare(&mut self, index: &str, cluster: &ClusterState) -> Result<PrepareOutcome, LifecycleError> {
        let Some(index_state) = cluster.index(index) else {
            return Ok(PrepareOutcome::Done(self.discard(index, "index no longer part of the cluster")?));
        };
        let Some(policy_name) = index_state.policy.clone() else {
            return Ok(PrepareOutcome::Done(self.discard(index, "no policy assigned to the index")?));
        };
        let Some(policy) = self.policies.get(&policy_name).cloned() else {
            let reason = format!("policy {policy_name} is not registered");
            return Ok(PrepareOutcome::Done(self.discard(index, &reason)?));
        };

        let mut state = match self.state_store.load(index) {
            Some(state) => state,
            None => {
                let state = LifecycleExecutionState::new(policy.first_step().clone(), policy.policy_hash());
                self.state_store.save(index, &state)?;
                self.event_log
                    .append_kind(index,
                                 LifecycleEventKind::PolicyAssigned { policy: policy.name().to_string(),
                                                                      policy_hash: policy.policy_hash().to_string(),
                                                                      first_step: policy.first_step().clone() });
                state
            }
        };

        if state.policy_hash != policy.policy_hash() {
            if state.current_step.is_completed() || policy.contains(&state.current_step) {
                // La política cambió pero el paso actual sigue existiendo:
                // re-anclar el hash y continuar desde donde estaba. El cambio
                // de política cuenta como intervención: levanta el estado de
                // error y se re-ataca el paso fallido.
                state.policy_hash = policy.policy_hash().to_string();
                if state.is_in_error {
                    log::info!("index {index}: policy {policy_name} changed, leaving the error state");
                    let step = state.current_step.clone();
                    state.clear_error();
                    self.event_log.append_kind(index, LifecycleEventKind::RetryRequested { step });
                }
                self.state_store.save(index, &state)?;
            } else {
                log::warn!("index {index}: step {} missing from updated policy {policy_name}; entering error state",
                           state.current_step);
                state.enter_error();
                self.state_store.save(index, &state)?;
                self.event_log
                    .append_kind(index, LifecycleEventKind::ErrorEntered { step: state.current_step.clone() });
                return Ok(PrepareOutcome::Done(Progress::ErrorState { step: state.current_step }));
            }
        }

        if state.is_in_error {
            return Ok(PrepareOutcome::Done(Progress::AlreadyInError { step: state.current_step }));
        }
        if state.current_step.is_completed() {
            return Ok(PrepareOutcome::Done(Progress::Completed));
        }

        match policy.step(&state.current_step) {
            Some(step) => Ok(PrepareOutcome::Run { step,
                                                   submitter: self.submitter.clone() }),
            None => {
                // El hash coincide pero la clave no está: registro corrupto.
                let error = LifecycleError::UnknownStep(state.current_step.to_string());
                state.enter_error();
                self.state_store.save(index, &state)?;
                self.event_log
                    .append_kind(index,
                                 LifecycleEventKind::StepFailed { step: state.current_step.clone(),
                                                                  error,
                                                                  consecutive_failures: state.consecutive_failures });
                self.event_log
                    .append_kind(index, LifecycleEventKind::ErrorEntered { step: state.current_step.clone() });
                Ok(PrepareOutcome::Done(Progress::ErrorState { step: state.current_step }))
            }
        }
    }

    /// Segunda mitad: aplica el desenlace de un paso ya ejecutado. Relee el
    /// estado porque la finalización pudo llegar tarde: si el índice o su
    /// estado desaparecieron, o el puntero ya no es el paso ejecutado, el
    /// desenlace se descarta en silencio.
    pub fn apply(&mut self, index: &str, step: &Step, outcome: StepOutcome) -> Result<Progress, LifecycleError> {
        let Some(mut state) = self.state_store.load(index) else {
            log::debug!("index {index}: discarding completion of {}; state no longer exists", step.key());
            return Ok(Progress::Discarded);
        };
        if state.current_step != *step.key() || state.is_in_error {
            log::debug!("index {index}: discarding stale completion of {}", step.key());
            return Ok(Progress::Discarded);
        }

        match outcome {
            StepOutcome::Succeeded => {
                let from = state.current_step.clone();
                let to = step.next_key().clone();
                state.advance(to.clone());
                self.state_store.save(index, &state)?;
                self.event_log.append_kind(index,
                                           LifecycleEventKind::StepCompleted { step: from.clone(),
                                                                               next: to.clone() });
                if to.is_completed() {
                    self.event_log.append_kind(index, LifecycleEventKind::LifecycleCompleted);
                    Ok(Progress::Completed)
                } else {
                    Ok(Progress::Advanced { from, to })
                }
            }
            StepOutcome::NotMet { explanation } => {
                // No es un fallo: el puntero y la contabilidad quedan igual.
                self.event_log.append_kind(index,
                                           LifecycleEventKind::WaitNotMet { step: state.current_step.clone(),
                                                                            explanation: explanation.clone() });
                Ok(Progress::Waiting { step: state.current_step,
                                       explanation })
            }
            StepOutcome::Failed(error) => self.fail(index, state, error),
        }
    }

    fn fail(&mut self,
            index: &str,
            mut state: LifecycleExecutionState,
            error: LifecycleError)
            -> Result<Progress, LifecycleError> {
        let step = state.current_step.clone();
        if error.is_terminal() {
            state.enter_error();
            self.state_store.save(index, &state)?;
            self.event_log.append_kind(index,
                                       LifecycleEventKind::StepFailed { step: step.clone(),
                                                                        error,
                                                                        consecutive_failures:
                                                                            state.consecutive_failures });
            self.event_log.append_kind(index, LifecycleEventKind::ErrorEntered { step: step.clone() });
            return Ok(Progress::ErrorState { step });
        }

        let entered_error = state.record_failure(self.config.retry_cap);
        let attempt = state.consecutive_failures;
        self.state_store.save(index, &state)?;
        self.event_log.append_kind(index,
                                   LifecycleEventKind::StepFailed { step: step.clone(),
                                                                    error,
                                                                    consecutive_failures: attempt });
        if entered_error {
            self.event_log.append_kind(index, LifecycleEventKind::ErrorEntered { step: step.clone() });
            Ok(Progress::ErrorState { step })
        } else {
            self.event_log.append_kind(index,
                                       LifecycleEventKind::RetryScheduled { step: step.clone(),
                                                                            attempt });
            Ok(Progress::Retrying { step, attempt })
        }
    }

    fn discard(&mut self, index: &str, reason: &str) -> Result<Progress, LifecycleError> {
        if self.state_store.load(index).is_some() {
            self.state_store.remove(index)?;
            self.event_log
                .append_kind(index, LifecycleEventKind::StateDiscarded { reason: reason.to_string() });
            log::debug!("index {index}: lifecycle state discarded ({reason})");
        }
        Ok(Progress::Discarded)
    }
}

/// Ejecuta un paso contra el snapshot sin tocar estado del ejecutor. Las
/// formas síncronas se evalúan en el acto; las asíncronas esperan la
/// respuesta externa.
pub async fn execute_step(step: &Step,
                          index: &str,
                          cluster: &ClusterState,
                          submitter: &dyn ClusterUpdateSubmitter)
                          -> StepOutcome {
    match step {
        Step::ClusterStateAction(s) => match s.perform(index, cluster) {
            Ok(update) => match submitter.submit(update).await {
                Ok(()) => StepOutcome::Succeeded,
                Err(e) => StepOutcome::Failed(e),
            },
            Err(e) => StepOutcome::Failed(e),
        },
        Step::ClusterStateWait(s) => match s.is_condition_met(index, cluster) {
            Ok(result) if result.met => StepOutcome::Succeeded,
            Ok(result) => StepOutcome::NotMet { explanation: result.explanation },
            Err(e) => StepOutcome::Failed(e),
        },
        Step::AsyncAction(s) => match s.perform(index, cluster).await {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::Failed(e),
        },
        Step::AsyncWait(s) => match s.check(index).await {
            Ok(result) if result.met => StepOutcome::Succeeded,
            Ok(result) => StepOutcome::NotMet { explanation: result.explanation },
            Err(e) => StepOutcome::Failed(e),
        },
    }
}
