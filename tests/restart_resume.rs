//! Reanudación tras reinicio del proceso: el índice retoma exactamente en
//! la clave de paso persistida, sin saltarse pasos.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use ilm_adapters::{compile_policy, CHECK_ALLOCATION_STEP};
use ilm_core::{ClusterUpdateSubmitter, CompiledPolicy, ExecutorConfig, InMemoryEventLog, LifecycleExecutor,
               Progress, StepKey};
use ilm_domain::parse_policy;
use ilm_persistence::FileStateStore;
use ilmflow_rust::{index_on_nodes, node, SimulatedCluster};

const INDEX: &str = "idx-000001";

fn warm_compiled() -> Arc<CompiledPolicy> {
    let policy = parse_policy(r#"{
        "name": "warm-then-done",
        "phases": [
            { "name": "warm", "actions": [ { "allocate": { "require": { "box_type": "warm" } } } ] }
        ]
    }"#).expect("policy document");
    Arc::new(compile_policy(&policy, None).expect("compile"))
}

fn executor_on(dir: &PathBuf,
               submitter: Arc<dyn ClusterUpdateSubmitter>)
               -> LifecycleExecutor<FileStateStore, InMemoryEventLog> {
    let store = FileStateStore::open(dir).expect("open state dir");
    let mut executor = LifecycleExecutor::new(store, InMemoryEventLog::default(), submitter, ExecutorConfig::default());
    executor.register_policy(warm_compiled());
    executor
}

#[tokio::test]
async fn restart_resumes_at_the_recorded_step() {
    let dir = std::env::temp_dir().join(format!("ilm-e2e-{}", Uuid::new_v4()));
    let sim = SimulatedCluster::new(vec![node("hot-1", &[("box_type", "hot")]),
                                         node("warm-1", &[("box_type", "warm")])],
                                    vec![index_on_nodes(INDEX, "warm-then-done", &["hot-1"])]);

    // Proceso 1: aplica settings y queda en el paso de espera
    {
        let mut executor = executor_on(&dir, sim.clone());
        let progress = executor.run_once(INDEX, &sim.snapshot()).await.expect("tick 1");
        assert!(matches!(progress, Progress::Advanced { .. }));
    }

    // "Reinicio": ejecutor nuevo sobre el mismo directorio de estado
    let mut executor = executor_on(&dir, sim.clone());
    assert_eq!(executor.managed_indices(), vec![INDEX.to_string()]);
    let resumed = executor.state(INDEX).expect("state survives the restart");
    assert_eq!(resumed.current_step, StepKey::new("warm", "allocate", CHECK_ALLOCATION_STEP));

    // Aún reubicando: el mismo paso se re-evalúa, nunca se salta
    let progress = executor.run_once(INDEX, &sim.snapshot()).await.expect("tick 2");
    assert!(matches!(progress, Progress::Waiting { .. }));

    sim.complete_relocations();
    let progress = executor.run_once(INDEX, &sim.snapshot()).await.expect("tick 3");
    assert_eq!(progress, Progress::Completed);

    fs::remove_dir_all(&dir).ok();
}
