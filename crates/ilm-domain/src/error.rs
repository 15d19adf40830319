use thiserror::Error;

/// Error del dominio de políticas de ciclo de vida.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("Error de parseo: {0}")]
    ParseError(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::ParseError(e.to_string())
    }
}
