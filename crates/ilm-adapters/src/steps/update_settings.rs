//! Paso de acción puro: reescribe settings declarados de un índice.
//!
//! No inspecciona la ubicación de shards; solo produce el delta de settings
//! deseado. El envío (y su reintento ante fallo) corre por cuenta del
//! ejecutor: una mutación nunca bloquea.

use indexmap::IndexMap;

use ilm_core::errors::LifecycleError;
use ilm_core::{ClusterState, ClusterStateActionStep, SettingsUpdate, StepKey};

pub struct UpdateSettingsStep {
    key: StepKey,
    next: StepKey,
    settings: IndexMap<String, String>,
}

impl UpdateSettingsStep {
    pub fn new(key: StepKey, next: StepKey, settings: IndexMap<String, String>) -> Self {
        UpdateSettingsStep { key, next, settings }
    }

    pub fn settings(&self) -> &IndexMap<String, String> {
        &self.settings
    }
}

impl ClusterStateActionStep for UpdateSettingsStep {
    fn key(&self) -> &StepKey { &self.key }
    fn next_key(&self) -> &StepKey { &self.next }

    fn perform(&self, index: &str, _cluster: &ClusterState) -> Result<SettingsUpdate, LifecycleError> {
        Ok(SettingsUpdate { index: index.to_string(),
                            settings: self.settings.clone() })
    }
}
