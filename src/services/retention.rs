//! Retention service — background sweep over the snapshot timeline.
//!
//! DESIGN
//! ======
//! Pushes already enforce the retention cap inline, but a long session can
//! sit idle with a full timeline forever; the sweep bounds memory even when
//! nothing new is drawn. Each tick takes the board lock, trims, releases —
//! so a sweep is atomic with respect to message handling and can never
//! interrupt a transition halfway.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::state::AppState;

const DEFAULT_SWEEP_INTERVAL_MS: u64 = 30_000;

/// Parse an environment variable, falling back to a default.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Spawn the periodic retention sweep. Returns a handle for shutdown.
pub fn spawn_retention_task(state: AppState) -> JoinHandle<()> {
    let interval_ms = env_parse("RETENTION_SWEEP_INTERVAL_MS", DEFAULT_SWEEP_INTERVAL_MS);
    info!(interval_ms, "retention sweep configured");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            sweep(&state).await;
        }
    })
}

/// One sweep pass: trim the timeline to the retention cap.
async fn sweep(state: &AppState) {
    let mut board = state.board.lock().await;
    let evicted = board.history.trim_to_cap();
    if evicted > 0 {
        info!(
            evicted,
            entries = board.history.len(),
            state_index = board.history.current_index(),
            "retention sweep evicted snapshots"
        );
    }
}

#[cfg(test)]
#[path = "retention_test.rs"]
mod tests;
