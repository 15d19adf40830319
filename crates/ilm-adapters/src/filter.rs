//! Predicado de conformidad de nodos frente a restricciones de atributos.
//!
//! Es la vista opaca que consume el paso de espera: dado un nodo, decide si
//! una copia de shard puede residir en él. Semántica:
//! - `require`: el nodo debe tener todos los atributos con el valor exacto;
//! - `exclude`: el nodo no debe tener ninguno de los atributos con ese valor;
//! - `include`: si hay entradas, el nodo debe coincidir con al menos una.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use ilm_core::Node;
use ilm_domain::AllocateAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    include: IndexMap<String, String>,
    exclude: IndexMap<String, String>,
    require: IndexMap<String, String>,
}

impl AttributeFilter {
    pub fn new(include: IndexMap<String, String>,
               exclude: IndexMap<String, String>,
               require: IndexMap<String, String>)
               -> Self {
        AttributeFilter { include, exclude, require }
    }

    pub fn node_conforms(&self, node: &Node) -> bool {
        for (attr, value) in &self.require {
            if node.attr(attr) != Some(value.as_str()) {
                return false;
            }
        }
        for (attr, value) in &self.exclude {
            if node.attr(attr) == Some(value.as_str()) {
                return false;
            }
        }
        if !self.include.is_empty() {
            return self.include
                       .iter()
                       .any(|(attr, value)| node.attr(attr) == Some(value.as_str()));
        }
        true
    }
}

impl From<&AllocateAction> for AttributeFilter {
    fn from(action: &AllocateAction) -> Self {
        AttributeFilter::new(action.include().clone(),
                             action.exclude().clone(),
                             action.require().clone())
    }
}
