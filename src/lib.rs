//! # Picture Scraper
//!
//! A library for collecting the images referenced by a web page.
//!
//! This crate provides three building blocks and a pipeline over them:
//!
//! 1. **Scraping** - Fetch a page and list every `<img>` source, resolved
//!    against the page's origin.
//!
//! 2. **Fetching** - Download an image to a file named after the last segment
//!    of its URL, optionally converting it to grayscale in place.
//!
//! 3. **Recording** - Keep the list of downloaded filenames in a JSON file.
//!
//! The [`app`], [`schedule`] and [`web`] modules wire these into a small
//! local web interface with an hourly unattended re-scrape.
//!
//! ## Example
//!
//! ```no_run
//! use picture_scraper::{Config, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = Scraper::new(&Config::default());
//!     let files = scraper.perform_scrape("https://example.com", false).await?;
//!     println!("Downloaded {} images", files.len());
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

pub mod app;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod schedule;
pub mod scraper;
pub mod store;
pub mod web;

pub use app::{AppState, Delta, Event, SharedState};
pub use config::Config;
pub use error::{Error, Result};
pub use store::DataStore;

/// Runs the scrape, download and record steps against one output directory.
///
/// Every request goes through the same [`reqwest::Client`], so connections are
/// reused across a batch.
#[derive(Debug, Clone)]
pub struct Scraper {
    client: reqwest::Client,
    output_dir: PathBuf,
    store: DataStore,
}

impl Scraper {
    /// Creates a scraper writing to the directories named in `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            &config.output_dir,
            DataStore::new(&config.data_file),
        )
    }

    /// Creates a scraper from an existing client, e.g. one with custom
    /// timeouts or a proxy.
    pub fn with_client(client: reqwest::Client, output_dir: &Path, store: DataStore) -> Self {
        Self {
            client,
            output_dir: output_dir.to_path_buf(),
            store,
        }
    }

    /// Directory downloaded images are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The record that [`Scraper::perform_scrape`] overwrites.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Lists the image URLs on `url`. See [`scraper::scrape_website`].
    pub async fn scrape_website(&self, url: &str) -> Result<Vec<String>> {
        scraper::scrape_website(&self.client, url).await
    }

    /// Downloads one image into the output directory and returns its filename.
    pub async fn download_image(&self, url: &str, grayscale: bool) -> Result<String> {
        fetcher::download_image(&self.client, url, &self.output_dir, grayscale).await
    }

    /// Scrapes `url`, downloads every image found and records the filenames.
    ///
    /// Images are fetched one after another in page order. The record file is
    /// overwritten with this batch only. The first failure aborts the batch
    /// and nothing is recorded.
    ///
    /// # Returns
    ///
    /// The filenames written, in page order.
    pub async fn perform_scrape(&self, url: &str, grayscale: bool) -> Result<Vec<String>> {
        let image_urls = self.scrape_website(url).await?;

        let mut data = Vec::with_capacity(image_urls.len());
        for image_url in &image_urls {
            data.push(self.download_image(image_url, grayscale).await?);
        }
        tracing::info!("  Downloaded {} images", data.len());

        self.store.save(&data).await?;
        Ok(data)
    }
}
