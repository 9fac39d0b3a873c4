//! Expiry Sweep Task
//!
//! Background task that periodically evicts due exchange rates so memory is
//! reclaimed even when no requests arrive.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::repository::RateRepository;

/// Spawns a background task that periodically purges expired rates.
///
/// Eviction does not depend on this task: every cache call cleans up
/// before doing its own work. The sweep only bounds how long expired
/// entries occupy memory while the service is idle.
///
/// # Arguments
/// * `repository` - shared rate repository
/// * `interval` - time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let repository = Arc::new(RateRepository::default());
/// let cleanup_handle = spawn_cleanup_task(repository.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(repository: Arc<RateRepository>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiry sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = repository.purge_expired().await;

            if removed > 0 {
                info!("Expiry sweep: removed {} expired rates", removed);
            } else {
                debug!("Expiry sweep: no expired rates found");
            }
        }
    })
}
