//! Compilación de políticas: de acciones declarativas a un registro plano
//! de pasos encadenados.
//!
//! Una acción es una capacidad pura: dada la fase y la clave del paso que
//! debe ejecutarse después de ella, produce su lista ordenada de pasos con
//! los `next` internos bien encadenados. La política se resuelve una sola
//! vez, de atrás hacia adelante, de modo que el último paso de cada acción
//! apunta a la primera de la siguiente (y entre fases igual), y el último
//! paso de la última fase apunta al sentinel terminal.

use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::constants::ENGINE_VERSION;
use crate::errors::CompileError;
use crate::hashing::hash_value;
use crate::model::ClusterState;
use crate::step::{Step, StepKey};

/// Contrato de compilación de una acción. Sin estado; invocable repetidas
/// veces con los mismos inputs produciendo pasos estructuralmente idénticos.
pub trait LifecycleAction: Send + Sync {
    fn name(&self) -> &str;
    /// `cluster` puede no existir aún en tiempo de compilación; las acciones
    /// puras lo ignoran.
    fn to_steps(&self, cluster: Option<&ClusterState>, phase: &str, next: &StepKey) -> Vec<Step>;
}

/// Fase ya resuelta a acciones ejecutables, en orden declarado.
pub struct PhasePlan {
    pub name: String,
    pub actions: Vec<Box<dyn LifecycleAction>>,
}

/// Política compilada: registro inmutable de pasos por clave, más el punto
/// de entrada y el hash estable de la cadena.
#[derive(Debug)]
pub struct CompiledPolicy {
    name: String,
    policy_hash: String,
    first_step: StepKey,
    steps: HashMap<StepKey, Arc<Step>>,
}

impl CompiledPolicy {
    pub fn compile(policy_name: &str,
                   phases: &[PhasePlan],
                   cluster: Option<&ClusterState>)
                   -> Result<Self, CompileError> {
        // Encadenado de atrás hacia adelante: el sucesor inicial es el
        // sentinel terminal.
        let mut ordered: Vec<Step> = Vec::new();
        let mut next = StepKey::completed();
        for phase in phases.iter().rev() {
            for action in phase.actions.iter().rev() {
                let steps = action.to_steps(cluster, &phase.name, &next);
                if let Some(first) = steps.first() {
                    next = first.key().clone();
                }
                let mut rest = std::mem::take(&mut ordered);
                ordered = steps;
                ordered.append(&mut rest);
            }
        }

        if ordered.is_empty() {
            return Err(CompileError::EmptyPolicy(policy_name.to_string()));
        }
        let first_step = ordered[0].key().clone();

        let chain: Vec<serde_json::Value> =
            ordered.iter()
                   .map(|s| json!({ "key": s.key().to_string(), "next": s.next_key().to_string() }))
                   .collect();
        let policy_hash = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "policy": policy_name,
            "chain": chain,
        }));

        let mut steps: HashMap<StepKey, Arc<Step>> = HashMap::with_capacity(ordered.len());
        for step in ordered {
            if step.key() == step.next_key() {
                return Err(CompileError::SelfLoop(step.key().to_string()));
            }
            let key = step.key().clone();
            if steps.insert(key.clone(), Arc::new(step)).is_some() {
                return Err(CompileError::DuplicateStepKey(key.to_string()));
            }
        }

        for (key, step) in &steps {
            let nk = step.next_key();
            if !nk.is_completed() && !steps.contains_key(nk) {
                return Err(CompileError::DanglingNextKey(key.to_string(), nk.to_string()));
            }
        }

        // Recorrido desde el punto de entrada: toda clave no terminal debe
        // ser alcanzable.
        let mut visited: HashSet<StepKey> = HashSet::with_capacity(steps.len());
        let mut cursor = first_step.clone();
        while !cursor.is_completed() && visited.insert(cursor.clone()) {
            cursor = steps[&cursor].next_key().clone();
        }
        if visited.len() != steps.len() {
            let mut orphans: Vec<String> = steps.keys()
                                                .filter(|k| !visited.contains(k))
                                                .map(|k| k.to_string())
                                                .collect();
            orphans.sort();
            return Err(CompileError::OrphanStep(orphans.remove(0)));
        }

        Ok(CompiledPolicy { name: policy_name.to_string(),
                            policy_hash,
                            first_step,
                            steps })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn policy_hash(&self) -> &str { &self.policy_hash }
    pub fn first_step(&self) -> &StepKey { &self.first_step }
    pub fn step_count(&self) -> usize { self.steps.len() }

    pub fn step(&self, key: &StepKey) -> Option<Arc<Step>> {
        self.steps.get(key).cloned()
    }

    pub fn contains(&self, key: &StepKey) -> bool {
        self.steps.contains_key(key)
    }
}
