pub mod forward;
pub mod model;
pub mod survey;

use crate::error::{CliError, Result};
use tracing::warn;
use voxfield::engine::cancel::CancellationToken;
use voxfield::engine::error::EngineError;

/// Runs `job` on the blocking thread pool. Ctrl-C while it runs cancels `token`.
pub(crate) async fn run_cancellable<T, F>(token: CancellationToken, job: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling the running computation.");
            token.cancel();
        }
    });

    let joined = tokio::task::spawn_blocking(job).await;
    watcher.abort();

    let outcome = joined
        .map_err(|e| CliError::Other(anyhow::anyhow!("Computation task failed: {}", e)))?;
    Ok(outcome?)
}
