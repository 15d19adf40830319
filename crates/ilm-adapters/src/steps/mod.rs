//! Pasos concretos producidos por las acciones de este crate.

pub mod allocation_routed;
pub mod update_settings;

pub use allocation_routed::AllocationRoutedStep;
pub use update_settings::UpdateSettingsStep;
