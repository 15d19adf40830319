// ilm-infra library entry point
pub mod cleanup;
pub use cleanup::{AdminClient, AdminError, CleanupError, TestStateCleaner};
