mod cleanup;

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::state::AppState;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Owns the background cleanup loop. One instance per process; `stop`
/// aborts the loop during graceful shutdown.
pub struct WorkerManager {
    handle: JoinHandle<()>,
}

impl WorkerManager {
    pub fn start(state: AppState) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            // First tick fires immediately; skip it so startup stays quiet.
            interval.tick().await;
            loop {
                interval.tick().await;
                cleanup::run_cycle(&state).await;
            }
        });
        tracing::info!("cleanup worker started");
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
        tracing::info!("cleanup worker stopped");
    }
}
