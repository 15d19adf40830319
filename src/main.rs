use std::sync::Arc;

use ilm_adapters::{compile_policy, CHECK_ALLOCATION_STEP};
use ilm_core::{ClusterUpdateSubmitter, ExecutorConfig, InMemoryEventLog, InMemoryStateStore, LifecycleExecutor,
               Progress, StepKey};
use ilm_domain::parse_policy;
use ilmflow_rust::{index_on_nodes, node, SimulatedCluster};

/// Validación del escenario warm: una fase con la acción allocate
/// (`require box_type=warm`), dos shards con una copia en un nodo hot.
async fn run_warm_scenario_validation() {
    let index = "idx-000001";
    let sim = SimulatedCluster::new(vec![node("hot-1", &[("box_type", "hot")]),
                                         node("warm-1", &[("box_type", "warm")])],
                                    vec![index_on_nodes(index, "warm-then-done", &["warm-1", "hot-1"])]);

    let policy = parse_policy(r#"{
        "name": "warm-then-done",
        "phases": [
            { "name": "warm", "actions": [ { "allocate": { "require": { "box_type": "warm" } } } ] }
        ]
    }"#).expect("policy document");
    let compiled = compile_policy(&policy, None).expect("policy compiles");

    // Tope de reintentos sobreescribible por entorno (ILM_RETRY_CAP)
    let config = std::env::var("ILM_RETRY_CAP")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(|retry_cap| ExecutorConfig { retry_cap })
        .unwrap_or_default();

    let submitter: Arc<dyn ClusterUpdateSubmitter> = sim.clone();
    let mut executor = LifecycleExecutor::new(InMemoryStateStore::new(),
                                              InMemoryEventLog::default(),
                                              submitter,
                                              config);
    executor.register_policy(Arc::new(compiled));

    // Tick 1: settings aplicados, reubicación iniciada, puntero en el check
    let progress = executor.run_once(index, &sim.snapshot()).await.expect("tick 1");
    assert_eq!(progress,
               Progress::Advanced { from: StepKey::new("warm", "allocate", "allocate"),
                                    to: StepKey::new("warm", "allocate", CHECK_ALLOCATION_STEP) });
    println!("[warm] tick 1 -> {}", executor.state(index).unwrap().current_step);

    // Tick 2: la copia sigue reubicándose hacia warm-1
    let progress = executor.run_once(index, &sim.snapshot()).await.expect("tick 2");
    let Progress::Waiting { explanation, .. } = progress else {
        panic!("tick 2 should still be waiting, got {progress:?}");
    };
    println!("[warm] tick 2 -> waiting: {}", explanation.unwrap_or_default());

    // La reubicación termina sobre el nodo warm; el siguiente tick cierra
    sim.complete_relocations();
    let progress = executor.run_once(index, &sim.snapshot()).await.expect("tick 3");
    assert_eq!(progress, Progress::Completed);
    assert!(executor.state(index).unwrap().current_step.is_completed());
    println!("[warm] tick 3 -> completed");

    // Rastro de eventos de la corrida
    for event in executor.events(index) {
        println!("[warm] event {:>2}: {:?}", event.seq, event.kind);
    }
}

#[tokio::main]
async fn main() {
    run_warm_scenario_validation().await;
    println!("[demo] warm scenario OK");
}
