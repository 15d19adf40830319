//! ilm-adapters: puentes entre los documentos declarativos del dominio y el
//! motor de pasos del core.

pub mod allocate;
pub mod compile;
pub mod filter;
pub mod steps;

pub use allocate::{Allocate, CHECK_ALLOCATION_STEP, INDEX_ROUTING_EXCLUDE_PREFIX, INDEX_ROUTING_INCLUDE_PREFIX,
                   INDEX_ROUTING_REQUIRE_PREFIX};
pub use compile::compile_policy;
pub use filter::AttributeFilter;
pub use steps::{AllocationRoutedStep, UpdateSettingsStep};
