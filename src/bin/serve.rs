//! Serves the interactive scraper and re-scrapes the entered page every hour.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin serve          # Port 8080, or PICTURE_PORT
//! cargo run --bin serve -- 3000  # Custom port
//! ```

use std::{env, error::Error, sync::Arc};

use picture_scraper::{AppState, Config, Scraper, app, schedule, web};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = Config::from_env()?;
    if let Some(port) = env::args().nth(1).and_then(|p| p.parse().ok()) {
        config.port = port;
    }

    let scraper = Arc::new(Scraper::new(&config));
    let existing = scraper.store().load().await?;
    tracing::info!("Loaded {} recorded images", existing.len());
    let state = AppState::new(existing).shared();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let clock = schedule::spawn_clock(state.clone(), shutdown_rx.clone());
    let mut periodic = schedule::spawn_periodic_scrape(
        state.clone(),
        scraper.clone(),
        config.scrape_interval,
        shutdown_rx.clone(),
    );

    let mut server_shutdown = shutdown_rx;
    let server = web::serve(
        config.port,
        web::router(state.clone(), scraper.clone()),
        async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = server_shutdown.wait_for(|stop| *stop) => {}
            }
        },
    );
    println!("Open http://127.0.0.1:{}/ in your browser", config.port);
    println!("Press Ctrl+C to stop");

    // Whichever ends first brings the other down.
    let (served, scheduled) = tokio::select! {
        served = server => (Some(served), None),
        scheduled = &mut periodic => (None, Some(scheduled)),
    };
    let _ = shutdown_tx.send(true);
    let scheduled = match scheduled {
        Some(scheduled) => scheduled,
        None => periodic.await,
    };
    let clocked = clock.await;

    let records = app::snapshot(&state).records;
    scraper.store().save(&records).await?;
    println!("Saved {} records to {}", records.len(), scraper.store().path().display());

    served.unwrap_or(Ok(()))?;
    scheduled??;
    clocked?;
    Ok(())
}
