//! Background tickers: the displayed clock and the unattended re-scrape.
//!
//! Each ticker is spawned once and runs until the shutdown channel flips to
//! `true` (or its sender is dropped).

use std::{sync::Arc, time::Duration};

use chrono::Local;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    Result, Scraper,
    app::{self, Delta, SharedState},
};

/// Refreshes `state.date` once per second.
pub fn spawn_clock(state: SharedState, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = time::interval(Duration::from_secs(1));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut shutdown = shutdown;

        loop {
            tokio::select! {
                _ = ticks.tick() => {}
                _ = stopped(&mut shutdown) => break,
            }
            app::lock(&state).apply(app::tick(Local::now()));
        }
    })
}

/// Re-runs [`Scraper::perform_scrape`] every `period` on the state's current
/// URL and grayscale setting.
///
/// The first run happens one full period after the call. Runs are skipped
/// while no URL has been entered. A failing run ends the ticker and its error
/// is returned through the handle. Shutdown also cuts short a run in
/// progress; nothing is recorded for it.
pub fn spawn_periodic_scrape(
    state: SharedState,
    scraper: Arc<Scraper>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<Result<()>> {
    tokio::spawn(run_periodic_scrape(state, scraper, period, shutdown))
}

async fn run_periodic_scrape(
    state: SharedState,
    scraper: Arc<Scraper>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut ticks = time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => {}
            _ = stopped(&mut shutdown) => return Ok(()),
        }

        let current = app::snapshot(&state);
        if current.url.trim().is_empty() {
            tracing::debug!("Scheduled scrape skipped: no URL entered");
            continue;
        }

        tracing::info!("Scheduled scrape of {}", current.url);
        let files = tokio::select! {
            result = scraper.perform_scrape(&current.url, current.grayscale) => {
                result.inspect_err(|e| tracing::error!("Scheduled scrape failed: {e}"))?
            }
            _ = stopped(&mut shutdown) => {
                tracing::warn!("Scheduled scrape of {} abandoned at shutdown", current.url);
                return Ok(());
            }
        };
        app::lock(&state).apply(Delta::Recorded(files));
    }
}

/// Resolves once shutdown has been requested.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender also counts as shutdown.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
