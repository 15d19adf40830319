//! Constantes del motor de ciclo de vida.
//!
//! `ENGINE_VERSION` participa en el cálculo del hash de políticas
//! compiladas: un cambio incompatible del motor invalida los hashes
//! registrados en el estado de ejecución aunque el documento de política no
//! cambie. Mantener estable mientras no haya cambios incompatibles.

/// Versión lógica del motor de pasos.
pub const ENGINE_VERSION: &str = "ILM.1";

/// Tope por defecto de fallos consecutivos de un paso antes de entrar en
/// estado de error.
pub const DEFAULT_RETRY_CAP: u32 = 10;
