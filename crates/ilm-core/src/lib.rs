//! ilm-core: motor de pasos de ciclo de vida de índices
pub mod constants;
pub mod errors;
pub mod event;
pub mod execution;
pub mod executor;
pub mod hashing;
pub mod model;
pub mod registry;
pub mod step;
pub mod store;


pub use errors::{CompileError, LifecycleError};
pub use event::{EventLog, InMemoryEventLog, LifecycleEvent, LifecycleEventKind};
pub use execution::LifecycleExecutionState;
pub use executor::{execute_step, ClusterUpdateSubmitter, ExecutorConfig, LifecycleExecutor, LifecycleService,
                   PrepareOutcome, Progress, StepOutcome};
pub use model::{ClusterState, IndexState, Node, SettingsUpdate, ShardAllocation, ShardCopy};
pub use registry::{CompiledPolicy, LifecycleAction, PhasePlan};
pub use step::{AsyncActionStep, AsyncWaitStep, ClusterStateActionStep, ClusterStateWaitStep, Step, StepKey,
               StepShape, WaitResult};
pub use store::{ExecutionStateStore, InMemoryStateStore};
