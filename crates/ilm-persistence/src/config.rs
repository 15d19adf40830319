//! Carga de configuración del almacén de estado desde variables de entorno.
//! Usa convención `ILM_STATE_DIR` con un valor por defecto relativo.

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct StateDirConfig {
    pub dir: PathBuf,
}

impl StateDirConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let dir = env::var("ILM_STATE_DIR").unwrap_or_else(|_| ".ilm-state".to_string());
        Self { dir: PathBuf::from(dir) }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() { Lazy::force(&DOTENV_LOADED); }
