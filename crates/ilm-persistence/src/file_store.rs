//! Almacén durable del estado de ejecución: un documento JSON por índice.
//!
//! La escritura es write-then-rename para que un corte a mitad de escritura
//! nunca deje un documento truncado: el índice retoma en la última
//! transición persistida completa. Un documento corrupto se reporta por el
//! log y se trata como ausente (el operador decide cómo recuperarlo).

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use ilm_core::{ExecutionStateStore, LifecycleError, LifecycleExecutionState};

use crate::config::StateDirConfig;
use crate::error::PersistenceError;

pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PersistenceError::Io { path: dir.clone(), source })?;
        Ok(FileStateStore { dir })
    }

    /// Abre el almacén en el directorio configurado por `ILM_STATE_DIR`.
    pub fn from_env() -> Result<Self, PersistenceError> {
        Self::open(StateDirConfig::from_env().dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Los nombres de índice no llevan separadores de ruta; el reemplazo es
    // solo una valla.
    fn path_for(&self, index: &str) -> PathBuf {
        let safe: String = index.chars()
                                .map(|c| if c == '/' || c == '\\' { '_' } else { c })
                                .collect();
        self.dir.join(format!("{safe}.json"))
    }

    pub fn load_state(&self, index: &str) -> Result<Option<LifecycleExecutionState>, PersistenceError> {
        let path = self.path_for(index);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(PersistenceError::Io { path, source }),
        };
        let state = serde_json::from_str(&raw).map_err(|source| PersistenceError::Corrupt { path, source })?;
        Ok(Some(state))
    }

    pub fn save_state(&self, index: &str, state: &LifecycleExecutionState) -> Result<(), PersistenceError> {
        let path = self.path_for(index);
        let tmp = path.with_extension("json.tmp");
        let doc = serde_json::to_string_pretty(state)
            .map_err(|source| PersistenceError::Corrupt { path: path.clone(), source })?;
        fs::write(&tmp, doc).map_err(|source| PersistenceError::Io { path: tmp.clone(), source })?;
        fs::rename(&tmp, &path).map_err(|source| PersistenceError::Io { path: path.clone(), source })?;
        debug!("persisted lifecycle state for {index} at step {}", state.current_step);
        Ok(())
    }

    pub fn remove_state(&self, index: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(index);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    pub fn list_states(&self) -> Result<Vec<String>, PersistenceError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| PersistenceError::Io { path: self.dir.clone(),
                                                                                      source })?;
        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::Io { path: self.dir.clone(), source })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                indices.push(stem.to_string());
            }
        }
        indices.sort();
        Ok(indices)
    }
}

impl ExecutionStateStore for FileStateStore {
    fn load(&self, index: &str) -> Option<LifecycleExecutionState> {
        match self.load_state(index) {
            Ok(state) => state,
            Err(e) => {
                warn!("could not read lifecycle state for {index}: {e}");
                None
            }
        }
    }

    fn save(&mut self, index: &str, state: &LifecycleExecutionState) -> Result<(), LifecycleError> {
        self.save_state(index, state)
            .map_err(|e| LifecycleError::Persistence(e.to_string()))
    }

    fn remove(&mut self, index: &str) -> Result<(), LifecycleError> {
        self.remove_state(index)
            .map_err(|e| LifecycleError::Persistence(e.to_string()))
    }

    fn list(&self) -> Vec<String> {
        match self.list_states() {
            Ok(indices) => indices,
            Err(e) => {
                warn!("could not list lifecycle state documents: {e}");
                Vec::new()
            }
        }
    }
}
