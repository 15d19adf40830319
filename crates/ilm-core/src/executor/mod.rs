//! Motor de ejecución: el ejecutor de pasos y el servicio de
//! reconciliación que lo conduce.

pub mod core;
pub mod service;

pub use self::core::{execute_step, ClusterUpdateSubmitter, ExecutorConfig, LifecycleExecutor, PrepareOutcome,
                     Progress, StepOutcome};
pub use service::LifecycleService;
