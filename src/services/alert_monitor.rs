use std::time::Duration;
use tokio::time;

use crate::{
    services::engine::{self, PassOutcome},
    AppState,
};

/// Spawn the in-process scheduler: one evaluation pass per tick.
///
/// Converges with the `/tasks/process` webhook on the same
/// `engine::run_pass`, so both entry points share one code path. Passes are
/// not serialized against a concurrently arriving webhook call; the commit
/// filter in the transition manager resolves that race per alert.
pub fn spawn_price_alert_monitor(state: AppState) {
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(state.settings.check_interval_secs));

        loop {
            interval.tick().await;

            match engine::run_pass(&state).await {
                Ok(PassOutcome::Completed { processed, triggered }) => {
                    if processed > 0 {
                        tracing::info!(processed, triggered, "alert pass completed");
                    }
                }
                Ok(PassOutcome::RateLimited { processed, triggered }) => {
                    tracing::warn!(processed, triggered, "alert pass rate-limited, deferring");
                }
                Err(e) => {
                    tracing::error!(error = %e, "alert pass failed");
                }
            }
        }
    });
}
