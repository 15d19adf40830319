//! Compilación de la acción `allocate` a su lista ordenada de pasos.
//!
//! Siempre dos pasos, en este orden fijo:
//! 1. `UpdateSettingsStep` (phase, allocate, allocate): reescribe los
//!    settings de ruteo derivados de include/exclude/require.
//! 2. `AllocationRoutedStep` (phase, allocate, check-allocation): espera a
//!    que la consecuencia física de esos settings se materialice.
//!
//! Mutar y esperar nunca se mezclan en un mismo paso.

use indexmap::IndexMap;

use ilm_core::{LifecycleAction, Step, StepKey};
use ilm_domain::{AllocateAction, ALLOCATE_NAME};

use crate::filter::AttributeFilter;
use crate::steps::{AllocationRoutedStep, UpdateSettingsStep};

/// Prefijos de los settings de ruteo por atributo de nodo.
pub const INDEX_ROUTING_INCLUDE_PREFIX: &str = "index.routing.allocation.include.";
pub const INDEX_ROUTING_EXCLUDE_PREFIX: &str = "index.routing.allocation.exclude.";
pub const INDEX_ROUTING_REQUIRE_PREFIX: &str = "index.routing.allocation.require.";

/// Nombre del paso de espera de la acción.
pub const CHECK_ALLOCATION_STEP: &str = "check-allocation";

/// Puente ejecutable de la acción declarativa del dominio.
pub struct Allocate {
    config: AllocateAction,
}

impl Allocate {
    pub fn new(config: AllocateAction) -> Self {
        Allocate { config }
    }

    fn routing_settings(&self) -> IndexMap<String, String> {
        let mut settings = IndexMap::new();
        for (attr, value) in self.config.include() {
            settings.insert(format!("{INDEX_ROUTING_INCLUDE_PREFIX}{attr}"), value.clone());
        }
        for (attr, value) in self.config.exclude() {
            settings.insert(format!("{INDEX_ROUTING_EXCLUDE_PREFIX}{attr}"), value.clone());
        }
        for (attr, value) in self.config.require() {
            settings.insert(format!("{INDEX_ROUTING_REQUIRE_PREFIX}{attr}"), value.clone());
        }
        settings
    }
}

impl LifecycleAction for Allocate {
    fn name(&self) -> &str { ALLOCATE_NAME }

    fn to_steps(&self, _cluster: Option<&ilm_core::ClusterState>, phase: &str, next: &StepKey) -> Vec<Step> {
        let action_key = StepKey::new(phase, ALLOCATE_NAME, ALLOCATE_NAME);
        let check_key = StepKey::new(phase, ALLOCATE_NAME, CHECK_ALLOCATION_STEP);

        vec![Step::ClusterStateAction(Box::new(UpdateSettingsStep::new(action_key,
                                                                       check_key.clone(),
                                                                       self.routing_settings()))),
             Step::ClusterStateWait(Box::new(AllocationRoutedStep::new(check_key,
                                                                       next.clone(),
                                                                       AttributeFilter::from(&self.config))))]
    }
}
