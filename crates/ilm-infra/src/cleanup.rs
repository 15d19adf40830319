//! Limpieza de estado administrativo entre corridas de test.
//!
//! Cliente fino y sin estado sobre las APIs administrativas de lectura:
//! lista jobs programados y ejecuciones de ciclo de vida activas, los
//! detiene y borra sus definiciones. Si la detención normal falla se
//! escala a detención forzada; haber necesitado la fuerza es en sí un
//! desenlace anómalo, así que el fallo original se devuelve al llamante
//! (con el fallo secundario adjunto si la forzada también falló).

use log::warn;
use thiserror::Error;

/// Error del cliente administrativo subyacente.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("admin request failed: {0}")]
    Request(String),
}

/// Superficie administrativa mínima que consume la limpieza. Sin singleton:
/// el llamante aporta la sesión/handle concreto.
pub trait AdminClient {
    fn list_scheduled_jobs(&self) -> Result<Vec<String>, AdminError>;
    fn list_running_executions(&self) -> Result<Vec<String>, AdminError>;
    fn stop_all_jobs(&self, force: bool) -> Result<(), AdminError>;
    fn stop_all_executions(&self, force: bool) -> Result<(), AdminError>;
    fn delete_job(&self, id: &str) -> Result<(), AdminError>;
    fn delete_execution(&self, id: &str) -> Result<(), AdminError>;
}

#[derive(Debug, Error)]
pub enum CleanupError {
    /// La detención normal falló y hubo que forzar. `original` es la causa
    /// raíz que se preserva; `secondary` existe si la forzada también falló.
    #[error("had to resort to force-stopping, something went wrong: {original}")]
    ForcedStop {
        #[source]
        original: AdminError,
        secondary: Option<AdminError>,
    },

    #[error(transparent)]
    Admin(#[from] AdminError),
}

pub struct TestStateCleaner<'a, C: AdminClient> {
    client: &'a C,
}

impl<'a, C: AdminClient> TestStateCleaner<'a, C> {
    pub fn new(client: &'a C) -> Self {
        TestStateCleaner { client }
    }

    /// Resetea el estado: detiene y borra jobs programados y ejecuciones
    /// activas. Una lista vacía no es error.
    pub fn clear_lifecycle_state(&self) -> Result<(), CleanupError> {
        self.clear_scheduled_jobs()?;
        self.clear_running_executions()?;
        Ok(())
    }

    fn clear_scheduled_jobs(&self) -> Result<(), CleanupError> {
        let jobs = self.client.list_scheduled_jobs()?;
        if jobs.is_empty() {
            return Ok(());
        }
        self.stop_then_force(|force| self.client.stop_all_jobs(force), "scheduled jobs")?;
        for id in &jobs {
            self.client.delete_job(id)?;
        }
        Ok(())
    }

    fn clear_running_executions(&self) -> Result<(), CleanupError> {
        let executions = self.client.list_running_executions()?;
        if executions.is_empty() {
            return Ok(());
        }
        self.stop_then_force(|force| self.client.stop_all_executions(force), "running executions")?;
        for id in &executions {
            self.client.delete_execution(id)?;
        }
        Ok(())
    }

    fn stop_then_force<F>(&self, stop: F, what: &str) -> Result<(), CleanupError>
        where F: Fn(bool) -> Result<(), AdminError>
    {
        match stop(false) {
            Ok(()) => Ok(()),
            Err(original) => {
                warn!("failed to stop all {what} gracefully, forcing stop: {original}");
                let secondary = match stop(true) {
                    Ok(()) => None,
                    Err(e2) => {
                        warn!("force-stopping all {what} failed: {e2}");
                        Some(e2)
                    }
                };
                Err(CleanupError::ForcedStop { original, secondary })
            }
        }
    }
}
