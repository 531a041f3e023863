//! Application state and the events that change it.
//!
//! Handlers never touch the shared state directly. They read a snapshot,
//! perform whatever I/O the event needs and return a list of [`Delta`]s,
//! which the caller applies with [`AppState::apply`].

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{Result, Scraper};

/// Format of the displayed clock.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// State shared between the web surface and the background tickers.
pub type SharedState = Arc<Mutex<AppState>>;

/// Everything the interface displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    /// Page to scrape, both on demand and on the periodic ticker.
    pub url: String,
    pub grayscale: bool,
    /// Image URLs from the last scrape.
    pub images: Vec<String>,
    /// Filename of the last previewed image.
    pub preview: Option<String>,
    /// Filename of the last converted image.
    pub converted: Option<String>,
    pub date: String,
    /// Filenames loaded at startup followed by those downloaded since.
    pub records: Vec<String>,
}

/// Something the user did, or a tick of the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UrlChanged(String),
    GrayscaleToggled(bool),
    /// Scrape the current URL and list its images.
    ScrapeWebsite,
    /// Download an image, honouring the grayscale toggle, and show it.
    PreviewSelected(String),
    /// Download an image as grayscale and show it.
    ConvertSelected(String),
    Tick(DateTime<Local>),
}

/// A single change to [`AppState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    Url(String),
    Grayscale(bool),
    Images(Vec<String>),
    Preview(String),
    Converted(String),
    Date(String),
    /// Filenames downloaded and to be kept in the record.
    Recorded(Vec<String>),
}

impl AppState {
    /// Initial state around the record loaded from disk.
    pub fn new(records: Vec<String>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Wraps the state for sharing between the web handlers and the tickers.
    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Applies one change. [`Delta::Recorded`] appends; every other delta
    /// replaces its field.
    pub fn apply(&mut self, delta: Delta) {
        match delta {
            Delta::Url(url) => self.url = url,
            Delta::Grayscale(grayscale) => self.grayscale = grayscale,
            Delta::Images(images) => self.images = images,
            Delta::Preview(filename) => self.preview = Some(filename),
            Delta::Converted(filename) => self.converted = Some(filename),
            Delta::Date(date) => self.date = date,
            Delta::Recorded(filenames) => self.records.extend(filenames),
        }
    }

    /// Applies `deltas` in order.
    pub fn apply_all(&mut self, deltas: impl IntoIterator<Item = Delta>) {
        for delta in deltas {
            self.apply(delta);
        }
    }
}

/// Locks `state`, recovering the guard if a previous holder panicked.
pub fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clones the current state so it can be read across `.await` points.
pub fn snapshot(state: &SharedState) -> AppState {
    lock(state).clone()
}

/// The clock update for `now`. Needs no I/O, so the clock ticker applies it
/// directly.
pub fn tick(now: DateTime<Local>) -> Delta {
    Delta::Date(now.format(DATE_FORMAT).to_string())
}

/// Computes the changes `event` causes, given the state it was raised in.
///
/// Scrape and download errors are returned as-is; no delta is produced for a
/// failed event.
pub async fn handle(state: &AppState, scraper: &Scraper, event: Event) -> Result<Vec<Delta>> {
    let deltas = match event {
        Event::UrlChanged(url) => vec![Delta::Url(url)],
        Event::GrayscaleToggled(grayscale) => vec![Delta::Grayscale(grayscale)],
        Event::ScrapeWebsite => {
            let images = scraper.scrape_website(&state.url).await?;
            vec![Delta::Images(images)]
        }
        Event::PreviewSelected(image_url) => {
            let filename = scraper.download_image(&image_url, state.grayscale).await?;
            vec![
                Delta::Preview(filename.clone()),
                Delta::Recorded(vec![filename]),
            ]
        }
        Event::ConvertSelected(image_url) => {
            let filename = scraper.download_image(&image_url, true).await?;
            vec![
                Delta::Converted(filename.clone()),
                Delta::Recorded(vec![filename]),
            ]
        }
        Event::Tick(now) => vec![tick(now)],
    };
    Ok(deltas)
}

/// Handles `events` in order against `state`, applying each result before
/// the next event is handled.
///
/// Stops at the first failing event; deltas from earlier events stay applied.
pub async fn dispatch(
    state: &SharedState,
    scraper: &Scraper,
    events: impl IntoIterator<Item = Event>,
) -> Result<()> {
    for event in events {
        let current = snapshot(state);
        let deltas = handle(&current, scraper, event).await?;
        lock(state).apply_all(deltas);
    }
    Ok(())
}
