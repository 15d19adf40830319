//! Documentos declarativos de política: fases ordenadas de acciones
//! ordenadas.
//!
//! El parseo es todo-o-nada: un documento malformado produce un
//! `DomainError::ParseError` descriptivo y nunca una política parcial. Las
//! invariantes estructurales (nombres no vacíos, fases únicas) se validan en
//! el constructor, igual que los parámetros de cada acción.

use serde::{Deserialize, Serialize};

use crate::allocate::{AllocateAction, ALLOCATE_NAME};
use crate::DomainError;

/// Configuración de una acción dentro de una fase. Enum cerrado: el formato
/// del documento es `{"allocate": { ... }}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionConfig {
    Allocate(AllocateAction),
}

impl ActionConfig {
    /// Nombre estable de la acción (segunda componente de sus StepKeys).
    pub fn name(&self) -> &'static str {
        match self {
            ActionConfig::Allocate(_) => ALLOCATE_NAME,
        }
    }
}

/// Fase nombrada (hot/warm/cold/...) con su lista ordenada de acciones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PhaseDoc", into = "PhaseDoc")]
pub struct Phase {
    name: String,
    actions: Vec<ActionConfig>,
}

impl Phase {
    pub fn new(name: impl Into<String>, actions: Vec<ActionConfig>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("phase name must not be empty".to_string()));
        }
        Ok(Phase { name, actions })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn actions(&self) -> &[ActionConfig] { &self.actions }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhaseDoc {
    name: String,
    #[serde(default)]
    actions: Vec<ActionConfig>,
}

impl TryFrom<PhaseDoc> for Phase {
    type Error = DomainError;
    fn try_from(doc: PhaseDoc) -> Result<Self, Self::Error> {
        Phase::new(doc.name, doc.actions)
    }
}

impl From<Phase> for PhaseDoc {
    fn from(p: Phase) -> Self {
        PhaseDoc { name: p.name, actions: p.actions }
    }
}

/// Política completa: fases ordenadas aplicadas a un índice a lo largo de su
/// vida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDoc", into = "PolicyDoc")]
pub struct Policy {
    name: String,
    phases: Vec<Phase>,
}

impl Policy {
    pub fn new(name: impl Into<String>, phases: Vec<Phase>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("policy name must not be empty".to_string()));
        }
        if phases.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "policy {name} must declare at least one phase"
            )));
        }
        for (i, phase) in phases.iter().enumerate() {
            if phases[..i].iter().any(|p| p.name() == phase.name()) {
                return Err(DomainError::ValidationError(format!(
                    "policy {name} declares phase {} more than once",
                    phase.name()
                )));
            }
        }
        Ok(Policy { name, phases })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn phases(&self) -> &[Phase] { &self.phases }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolicyDoc {
    name: String,
    phases: Vec<Phase>,
}

impl TryFrom<PolicyDoc> for Policy {
    type Error = DomainError;
    fn try_from(doc: PolicyDoc) -> Result<Self, Self::Error> {
        Policy::new(doc.name, doc.phases)
    }
}

impl From<Policy> for PolicyDoc {
    fn from(p: Policy) -> Self {
        PolicyDoc { name: p.name, phases: p.phases }
    }
}

/// Parsea un documento JSON de política. Todo-o-nada.
pub fn parse_policy(document: &str) -> Result<Policy, DomainError> {
    serde_json::from_str(document)
        .map_err(|e| DomainError::ParseError(format!("invalid policy document: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::{indexmap, IndexMap};

    fn warm_policy_doc() -> &'static str {
        r#"{
            "name": "warm-then-done",
            "phases": [
                {
                    "name": "warm",
                    "actions": [
                        { "allocate": { "require": { "box_type": "warm" } } }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn parses_a_valid_document() {
        let policy = parse_policy(warm_policy_doc()).expect("valid policy");
        assert_eq!(policy.name(), "warm-then-done");
        assert_eq!(policy.phases().len(), 1);
        let phase = &policy.phases()[0];
        assert_eq!(phase.name(), "warm");
        assert_eq!(phase.actions().len(), 1);
        assert_eq!(phase.actions()[0].name(), "allocate");
    }

    #[test]
    fn malformed_document_fails_whole() {
        // Acción allocate sin atributos: el documento entero se rechaza
        let doc = r#"{
            "name": "broken",
            "phases": [ { "name": "warm", "actions": [ { "allocate": {} } ] } ]
        }"#;
        let err = parse_policy(doc).expect_err("must reject");
        assert!(matches!(err, DomainError::ParseError(_)));
        assert!(err.to_string().contains("invalid policy document"));
    }

    #[test]
    fn duplicate_phase_names_rejected() {
        let action = ActionConfig::Allocate(
            AllocateAction::new(IndexMap::new(),
                                IndexMap::new(),
                                indexmap! { "box_type".into() => "warm".into() }).unwrap(),
        );
        let p1 = Phase::new("warm", vec![action.clone()]).unwrap();
        let p2 = Phase::new("warm", vec![action]).unwrap();
        let err = Policy::new("p", vec![p1, p2]).expect_err("duplicate phases");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn empty_policy_rejected() {
        let err = Policy::new("p", vec![]).expect_err("no phases");
        assert!(err.to_string().contains("at least one phase"));
    }
}
