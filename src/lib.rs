//! ilmflow: automatización declarativa del ciclo de vida de índices.
//!
//! El crate raíz expone el clúster simulado que usan la demo (`main-core`)
//! y los tests de extremo a extremo; el motor vive en `ilm-core` y los
//! puentes de acciones en `ilm-adapters`.

pub mod simulator;

pub use simulator::{index_on_nodes, node, SimulatedCluster};
