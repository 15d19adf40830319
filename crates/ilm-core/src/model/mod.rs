//! Modelo neutral que consume el motor: snapshot de clúster y delta de
//! settings.

pub mod cluster;

pub use cluster::{ClusterState, IndexState, Node, SettingsUpdate, ShardAllocation, ShardCopy};
