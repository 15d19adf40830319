//! Vista estructurada y de solo lectura del estado del clúster.
//!
//! El ejecutor consume snapshots ya materializados: settings por índice y
//! ubicación de cada copia de shard (asignada, en reubicación, sin asignar),
//! lo mínimo para evaluar predicados de espera. La capa de transporte que
//! produce estos snapshots queda fuera del core.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Nodo del clúster con sus atributos declarados (p.ej. `box_type=warm`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub attrs: HashMap<String, String>,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Ubicación actual de una copia de shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardAllocation {
    Assigned { node: String },
    Initializing { node: String },
    Relocating { from: String, to: String },
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardCopy {
    pub shard: u32,
    /// Ordinal de la copia: 0 = primaria.
    pub replica: u32,
    pub allocation: ShardAllocation,
}

/// Estado de un índice dentro del snapshot: settings efectivos, copias de
/// shards y la política asignada (si la hay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexState {
    pub name: String,
    pub settings: IndexMap<String, String>,
    pub shards: Vec<ShardCopy>,
    pub policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterState {
    /// Versión monótona del snapshot (asignada por quien lo publica).
    pub version: u64,
    pub nodes: HashMap<String, Node>,
    pub indices: HashMap<String, IndexState>,
}

impl ClusterState {
    pub fn index(&self, name: &str) -> Option<&IndexState> {
        self.indices.get(name)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }
}

/// Delta de settings que un paso de acción pide aplicar sobre un índice.
/// El canal de envío puede fallar; el ejecutor lo reintenta como fallo
/// transitorio del paso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub index: String,
    pub settings: IndexMap<String, String>,
}
