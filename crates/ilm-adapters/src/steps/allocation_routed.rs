//! Paso de espera: toda copia de shard del índice reside en nodos que
//! satisfacen las restricciones de atributos.
//!
//! El predicado es puro sobre el snapshot. Copias en reubicación, en
//! inicialización o sin asignar cuentan como "aún no"; lo mismo un índice
//! sin copia alguna en la tabla de ruteo (caída ajena a esta acción): el
//! paso espera en lugar de adivinar la intención.

use ilm_core::errors::LifecycleError;
use ilm_core::{ClusterState, ClusterStateWaitStep, ShardAllocation, StepKey, WaitResult};

use crate::filter::AttributeFilter;

pub struct AllocationRoutedStep {
    key: StepKey,
    next: StepKey,
    filter: AttributeFilter,
}

impl AllocationRoutedStep {
    pub fn new(key: StepKey, next: StepKey, filter: AttributeFilter) -> Self {
        AllocationRoutedStep { key, next, filter }
    }
}

impl ClusterStateWaitStep for AllocationRoutedStep {
    fn key(&self) -> &StepKey { &self.key }
    fn next_key(&self) -> &StepKey { &self.next }

    fn is_condition_met(&self, index: &str, cluster: &ClusterState) -> Result<WaitResult, LifecycleError> {
        let Some(index_state) = cluster.index(index) else {
            return Ok(WaitResult::pending(format!("index {index} not present in cluster state")));
        };
        if index_state.shards.is_empty() {
            return Ok(WaitResult::pending(format!("index {index} has no shard copies in the routing table")));
        }

        for copy in &index_state.shards {
            let label = format!("shard {}[{}]", copy.shard, copy.replica);
            match &copy.allocation {
                ShardAllocation::Assigned { node } => match cluster.node(node) {
                    Some(n) if self.filter.node_conforms(n) => {}
                    Some(_) => {
                        return Ok(WaitResult::pending(format!("{label} is allocated on non-conforming node {node}")));
                    }
                    None => {
                        return Ok(WaitResult::pending(format!("{label} is allocated on unknown node {node}")));
                    }
                },
                ShardAllocation::Relocating { from, to } => {
                    return Ok(WaitResult::pending(format!("{label} is still relocating from {from} to {to}")));
                }
                ShardAllocation::Initializing { node } => {
                    return Ok(WaitResult::pending(format!("{label} is still initializing on {node}")));
                }
                ShardAllocation::Unassigned => {
                    return Ok(WaitResult::pending(format!("{label} is unassigned")));
                }
            }
        }
        Ok(WaitResult::met())
    }
}
