//! Clúster simulado en memoria para la demo y los tests de extremo a
//! extremo.
//!
//! Hace de canal de envío de actualizaciones y de publicador de snapshots:
//! al aplicar un delta de settings de ruteo, las copias asignadas a nodos
//! que ya no conforman inician una reubicación hacia un nodo conforme (si
//! existe), imitando la reacción del asignador real. La reubicación se
//! asienta explícitamente con `complete_relocations`.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

use ilm_adapters::{AttributeFilter, INDEX_ROUTING_EXCLUDE_PREFIX, INDEX_ROUTING_INCLUDE_PREFIX,
                   INDEX_ROUTING_REQUIRE_PREFIX};
use ilm_core::{ClusterState, ClusterUpdateSubmitter, IndexState, LifecycleError, Node, SettingsUpdate,
               ShardAllocation, ShardCopy};

pub struct SimulatedCluster {
    state: RwLock<ClusterState>,
    tx: watch::Sender<Arc<ClusterState>>,
}

impl SimulatedCluster {
    pub fn new(nodes: Vec<Node>, indices: Vec<IndexState>) -> Arc<Self> {
        let state = ClusterState { version: 1,
                                   nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
                                   indices: indices.into_iter().map(|i| (i.name.clone(), i)).collect() };
        let (tx, _rx) = watch::channel(Arc::new(state.clone()));
        Arc::new(SimulatedCluster { state: RwLock::new(state), tx })
    }

    /// Canal de snapshots para el servicio de reconciliación.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ClusterState>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<ClusterState> {
        Arc::new(self.state.read().unwrap().clone())
    }

    /// Asienta toda reubicación pendiente: la copia queda asignada a su
    /// nodo destino y se publica un snapshot nuevo.
    pub fn complete_relocations(&self) {
        let mut state = self.state.write().unwrap();
        for index in state.indices.values_mut() {
            for copy in &mut index.shards {
                if let ShardAllocation::Relocating { to, .. } = &copy.allocation {
                    copy.allocation = ShardAllocation::Assigned { node: to.clone() };
                }
            }
        }
        state.version += 1;
        let _ = self.tx.send(Arc::new(state.clone()));
    }

    /// Borra un índice del clúster (para ejercitar descartes de estado).
    pub fn delete_index(&self, name: &str) {
        let mut state = self.state.write().unwrap();
        state.indices.remove(name);
        state.version += 1;
        let _ = self.tx.send(Arc::new(state.clone()));
    }
}

/// Reconstruye el filtro de atributos a partir de los settings de ruteo
/// efectivos del índice.
fn filter_from_settings(settings: &IndexMap<String, String>) -> AttributeFilter {
    let mut include = IndexMap::new();
    let mut exclude = IndexMap::new();
    let mut require = IndexMap::new();
    for (key, value) in settings {
        if let Some(attr) = key.strip_prefix(INDEX_ROUTING_INCLUDE_PREFIX) {
            include.insert(attr.to_string(), value.clone());
        } else if let Some(attr) = key.strip_prefix(INDEX_ROUTING_EXCLUDE_PREFIX) {
            exclude.insert(attr.to_string(), value.clone());
        } else if let Some(attr) = key.strip_prefix(INDEX_ROUTING_REQUIRE_PREFIX) {
            require.insert(attr.to_string(), value.clone());
        }
    }
    AttributeFilter::new(include, exclude, require)
}

#[async_trait]
impl ClusterUpdateSubmitter for SimulatedCluster {
    async fn submit(&self, update: SettingsUpdate) -> Result<(), LifecycleError> {
        let mut state = self.state.write().unwrap();
        let nodes = state.nodes.clone();
        let Some(index) = state.indices.get_mut(&update.index) else {
            return Err(LifecycleError::Transient(format!("index {} no longer exists", update.index)));
        };
        for (key, value) in update.settings {
            index.settings.insert(key, value);
        }

        // Reacción del asignador: iniciar reubicaciones hacia un nodo
        // conforme si la copia quedó en uno que ya no lo es
        let filter = filter_from_settings(&index.settings);
        let target = nodes.values().find(|n| filter.node_conforms(n)).map(|n| n.id.clone());
        for copy in &mut index.shards {
            if let ShardAllocation::Assigned { node } = &copy.allocation {
                let conforms = nodes.get(node).is_some_and(|n| filter.node_conforms(n));
                if !conforms {
                    if let Some(target) = &target {
                        if target != node {
                            copy.allocation = ShardAllocation::Relocating { from: node.clone(),
                                                                            to: target.clone() };
                        }
                    }
                }
            }
        }

        state.version += 1;
        let _ = self.tx.send(Arc::new(state.clone()));
        Ok(())
    }
}

pub fn node(id: &str, attrs: &[(&str, &str)]) -> Node {
    Node { id: id.to_string(),
           attrs: attrs.iter()
                       .map(|(k, v)| (k.to_string(), v.to_string()))
                       .collect::<HashMap<_, _>>() }
}

/// Índice con una copia primaria por nodo listado, gobernado por `policy`.
pub fn index_on_nodes(name: &str, policy: &str, nodes: &[&str]) -> IndexState {
    let shards = nodes.iter()
                      .enumerate()
                      .map(|(i, node)| ShardCopy { shard: i as u32,
                                                   replica: 0,
                                                   allocation: ShardAllocation::Assigned { node: node.to_string() } })
                      .collect();
    IndexState { name: name.to_string(),
                 settings: IndexMap::new(),
                 shards,
                 policy: Some(policy.to_string()) }
}
