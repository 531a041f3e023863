//! Scrapes a page once, downloads every image on it and records the filenames.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin scrape -- https://example.com         # Keep colours
//! cargo run --bin scrape -- https://example.com --bw    # Convert to grayscale
//! ```

use std::{env, error::Error};

use picture_scraper::{Config, Scraper};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut url = None;
    let mut grayscale = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--bw" => grayscale = true,
            _ => url = Some(arg),
        }
    }
    let Some(url) = url else {
        return Err("usage: scrape <url> [--bw]".into());
    };

    let config = Config::from_env()?;
    let scraper = Scraper::new(&config);
    let files = scraper.perform_scrape(&url, grayscale).await?;

    println!("\nComplete! Downloaded {} images.", files.len());
    println!("Recorded in {}", scraper.store().path().display());

    Ok(())
}
