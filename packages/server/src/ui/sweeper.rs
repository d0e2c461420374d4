//! Periodic removal of idle games.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::usecase::SweepIdleGamesUseCase;

/// Games untouched for this long and without seated players are removed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns a task that runs the sweep every `period` until aborted.
pub fn spawn_sweeper(usecase: Arc<SweepIdleGamesUseCase>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = usecase.execute().await;
            if removed > 0 {
                tracing::info!("Removed {} idle game(s)", removed);
            }
        }
    })
}
