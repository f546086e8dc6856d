use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};

use crate::services::quiz_token::TokenStore;
use crate::state::AppState;

/// One cleanup pass: expired quiz tokens leave the store, and in-memory
/// sessions idle past the configured threshold are discarded the same way
/// an abandoned tab would discard them.
pub async fn run_cycle(state: &AppState) {
    let start = Instant::now();
    debug!("starting cleanup cycle");

    let expired_tokens = match state.tokens().delete_expired(Utc::now()).await {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!(error = %err, "expired token cleanup failed");
            0
        }
    };

    let max_idle = Duration::from_secs(state.config().session_max_idle_seconds);
    let abandoned_sessions = state.sessions().discard_stale(max_idle);

    if expired_tokens > 0 || abandoned_sessions > 0 {
        info!(
            expired_tokens,
            abandoned_sessions,
            duration_ms = start.elapsed().as_millis() as u64,
            "cleanup cycle completed"
        );
    }
}
