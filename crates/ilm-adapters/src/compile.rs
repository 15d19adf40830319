//! De documento de política a registro compilado de pasos.

use ilm_core::{CompileError, CompiledPolicy, ClusterState, LifecycleAction, PhasePlan};
use ilm_domain::{ActionConfig, Policy};

use crate::allocate::Allocate;

/// Resuelve cada acción declarada a su capacidad ejecutable.
fn to_lifecycle_action(config: &ActionConfig) -> Box<dyn LifecycleAction> {
    match config {
        ActionConfig::Allocate(action) => Box::new(Allocate::new(action.clone())),
    }
}

/// Compila una política completa: una sola vez, todo-o-nada. Las claves de
/// los pasos quedan encadenadas dentro de cada acción, entre acciones y
/// entre fases, terminando en el sentinel de finalización.
pub fn compile_policy(policy: &Policy, cluster: Option<&ClusterState>) -> Result<CompiledPolicy, CompileError> {
    let phases: Vec<PhasePlan> = policy.phases()
                                       .iter()
                                       .map(|phase| PhasePlan { name: phase.name().to_string(),
                                                                actions: phase.actions()
                                                                              .iter()
                                                                              .map(to_lifecycle_action)
                                                                              .collect() })
                                       .collect();
    CompiledPolicy::compile(policy.name(), &phases, cluster)
}
