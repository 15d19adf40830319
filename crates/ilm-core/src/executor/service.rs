//! Servicio de reconciliación: una tarea lógica por índice, disparada por
//! cada snapshot nuevo de clúster y por un tick periódico de seguridad
//! (red de protección contra notificaciones perdidas).
//!
//! Exclusión mutua por índice: un disparo sobre un índice con ejecución en
//! vuelo se descarta sin bloquear (la ejecución en curso re-verá el estado
//! al aplicar su desenlace, y el tick garantiza la re-evaluación). Índices
//! distintos se reconcilian en paralelo. El lock del ejecutor se retiene
//! solo durante `prepare` y `apply`, nunca a través del await de un paso
//! asíncrono.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use crate::event::EventLog;
use crate::executor::core::{execute_step, LifecycleExecutor, PrepareOutcome};
use crate::model::ClusterState;
use crate::store::ExecutionStateStore;

pub struct LifecycleService<S, L>
    where S: ExecutionStateStore + Send + 'static,
          L: EventLog + Send + 'static
{
    executor: Arc<Mutex<LifecycleExecutor<S, L>>>,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    cluster_rx: watch::Receiver<Arc<ClusterState>>,
    tick_interval: Duration,
}

impl<S, L> LifecycleService<S, L>
    where S: ExecutionStateStore + Send + 'static,
          L: EventLog + Send + 'static
{
    pub fn new(executor: LifecycleExecutor<S, L>,
               cluster_rx: watch::Receiver<Arc<ClusterState>>,
               tick_interval: Duration)
               -> Self {
        LifecycleService { executor: Arc::new(Mutex::new(executor)),
                           locks: Arc::new(DashMap::new()),
                           cluster_rx,
                           tick_interval }
    }

    /// Acceso compartido al ejecutor (consultas de estado, `retry` manual).
    pub fn executor(&self) -> Arc<Mutex<LifecycleExecutor<S, L>>> {
        self.executor.clone()
    }

    /// Bucle principal: reconcilia al arrancar (reanudación tras reinicio),
    /// en cada snapshot nuevo y en cada tick. Termina cuando el publicador
    /// de snapshots cierra el canal.
    pub async fn run(&self) {
        let mut rx = self.cluster_rx.clone();
        let mut interval = tokio::time::interval(self.tick_interval);
        let initial = rx.borrow_and_update().clone();
        self.reconcile_all(initial).await;
        loop {
            tokio::select! {
                changed = rx.changed() => match changed {
                    Ok(()) => {
                        let snapshot = rx.borrow_and_update().clone();
                        self.reconcile_all(snapshot).await;
                    }
                    Err(_) => break,
                },
                _ = interval.tick() => {
                    let snapshot = rx.borrow().clone();
                    self.reconcile_all(snapshot).await;
                }
            }
        }
    }

    /// Dispara la reconciliación de todos los índices del snapshot más los
    /// que conservan estado registrado (índices ya desaparecidos descartan
    /// su estado dentro de `prepare`).
    pub async fn reconcile_all(&self, cluster: Arc<ClusterState>) {
        let mut targets: Vec<String> = cluster.indices.keys().cloned().collect();
        let managed = { self.executor.lock().await.managed_indices() };
        for index in managed {
            if !targets.contains(&index) {
                targets.push(index);
            }
        }
        for index in targets {
            self.trigger(index, cluster.clone());
        }
    }

    /// Reconciliación de un índice con exclusión por índice. Si el lock ya
    /// está tomado el disparo se descarta: nunca dos ejecuciones en vuelo
    /// para el mismo índice, nunca espera bloqueante del llamante.
    pub fn trigger(&self, index: String, cluster: Arc<ClusterState>) {
        let lock = self.locks
                       .entry(index.clone())
                       .or_insert_with(|| Arc::new(Mutex::new(())))
                       .clone();
        let Ok(guard) = lock.try_lock_owned() else {
            log::debug!("index {index}: execution already in flight, dropping trigger");
            return;
        };
        let executor = self.executor.clone();
        tokio::spawn(async move {
            let _in_flight = guard;
            let prepared = { executor.lock().await.prepare(&index, &cluster) };
            let (step, submitter) = match prepared {
                Ok(PrepareOutcome::Run { step, submitter }) => (step, submitter),
                Ok(PrepareOutcome::Done(_)) => return,
                Err(e) => {
                    log::warn!("index {index}: reconciliation failed: {e}");
                    return;
                }
            };
            let outcome = execute_step(&step, &index, &cluster, submitter.as_ref()).await;
            if let Err(e) = executor.lock().await.apply(&index, &step, outcome) {
                log::warn!("index {index}: failed to apply step outcome: {e}");
            }
        });
    }
}
