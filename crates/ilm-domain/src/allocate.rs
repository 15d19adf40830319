//! Acción `allocate`: restricciones de ubicación de shards por atributos de
//! nodo.
//!
//! La acción se valida al construirse: al menos uno de los tres mapas
//! (`include`, `exclude`, `require`) debe contener atributos. Una acción sin
//! atributos no describe ninguna restricción y se rechaza aquí, nunca en
//! ejecución.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::DomainError;
use std::fmt;

/// Nombre estable de la acción dentro de una fase.
pub const ALLOCATE_NAME: &str = "allocate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AllocateDoc", into = "AllocateDoc")]
pub struct AllocateAction {
    include: IndexMap<String, String>,
    exclude: IndexMap<String, String>,
    require: IndexMap<String, String>,
}

impl AllocateAction {
    // Constructor único: toda instancia pasó por esta validación.
    pub fn new(include: IndexMap<String, String>,
               exclude: IndexMap<String, String>,
               require: IndexMap<String, String>)
               -> Result<Self, DomainError> {
        if include.is_empty() && exclude.is_empty() && require.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "At least one of include, exclude or require must contain attributes for action {}",
                ALLOCATE_NAME
            )));
        }
        Ok(AllocateAction { include, exclude, require })
    }

    pub fn include(&self) -> &IndexMap<String, String> { &self.include }
    pub fn exclude(&self) -> &IndexMap<String, String> { &self.exclude }
    pub fn require(&self) -> &IndexMap<String, String> { &self.require }
}

impl fmt::Display for AllocateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "<allocate include: {}, exclude: {}, require: {}>",
               self.include.len(),
               self.exclude.len(),
               self.require.len())
    }
}

/// Forma serializada del documento. La conversión a `AllocateAction` aplica
/// la validación del constructor, de modo que un documento sin atributos
/// falla el parseo completo.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AllocateDoc {
    #[serde(default)]
    include: IndexMap<String, String>,
    #[serde(default)]
    exclude: IndexMap<String, String>,
    #[serde(default)]
    require: IndexMap<String, String>,
}

impl TryFrom<AllocateDoc> for AllocateAction {
    type Error = DomainError;

    fn try_from(doc: AllocateDoc) -> Result<Self, Self::Error> {
        AllocateAction::new(doc.include, doc.exclude, doc.require)
    }
}

impl From<AllocateAction> for AllocateDoc {
    fn from(a: AllocateAction) -> Self {
        AllocateDoc { include: a.include,
                      exclude: a.exclude,
                      require: a.require }
    }
}
