//! Local web interface over [`AppState`].
//!
//! Renders the Scraping, Date and Image Conversion tabs as one HTML page,
//! turns form posts into [`Event`]s and serves downloaded files for preview.

use std::{
    future::{Future, IntoFuture},
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::oneshot, time};
use tower_http::services::ServeDir;

use crate::{
    AppState, Error, Result, Scraper,
    app::{self, Event, SharedState},
};

/// How long requests still running at shutdown are given to finish.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Characters escaped in a path segment (the WHATWG path set plus `/` and `%`).
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Clone)]
struct WebState {
    state: SharedState,
    scraper: Arc<Scraper>,
}

#[derive(Debug, Deserialize)]
struct ScrapeForm {
    url: String,
    /// Present only when the checkbox is ticked.
    grayscale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewForm {
    image: String,
    grayscale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConvertForm {
    image: String,
}

/// A failed event, reported to the browser instead of ending the server.
struct EventError(Error);

impl From<Error> for EventError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        tracing::error!("Event failed: {}", self.0);
        (StatusCode::BAD_GATEWAY, self.0.to_string()).into_response()
    }
}

/// Builds the router. Downloaded files are served under `/files/`.
pub fn router(state: SharedState, scraper: Arc<Scraper>) -> Router {
    let files = ServeDir::new(scraper.output_dir());

    Router::new()
        .route("/", get(index))
        .route("/state", get(current_state))
        .route("/scrape", post(scrape))
        .route("/preview", post(preview))
        .route("/convert", post(convert))
        .nest_service("/files", files)
        .with_state(WebState { state, scraper })
}

/// Serves `router` on localhost until `shutdown` resolves.
///
/// # Arguments
///
/// * `port` - The port to listen on
pub async fn serve(
    port: u16,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Serving picture scraper at http://{addr}");

    serve_listener(listener, router, shutdown, SHUTDOWN_GRACE).await
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// Once `shutdown` fires, requests still in flight get `grace` to finish.
/// After that they are dropped and this returns anyway.
pub async fn serve_listener(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
    grace: Duration,
) -> Result<()> {
    let (fired_tx, fired_rx) = oneshot::channel();
    let signal = async move {
        shutdown.await;
        let _ = fired_tx.send(());
    };
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .into_future();

    let deadline = async move {
        match fired_rx.await {
            Ok(()) => time::sleep(grace).await,
            // The signal was dropped, so the server has already stopped.
            Err(_) => std::future::pending().await,
        }
    };

    tokio::select! {
        served = server => served?,
        _ = deadline => {
            tracing::warn!("Requests still running after {grace:?}; stopping without them");
        }
    }
    Ok(())
}

async fn index(State(web): State<WebState>) -> Html<String> {
    Html(render(&app::snapshot(&web.state)))
}

async fn current_state(State(web): State<WebState>) -> Json<AppState> {
    Json(app::snapshot(&web.state))
}

async fn scrape(
    State(web): State<WebState>,
    Form(form): Form<ScrapeForm>,
) -> std::result::Result<Redirect, EventError> {
    let events = [
        Event::UrlChanged(form.url),
        Event::GrayscaleToggled(form.grayscale.is_some()),
        Event::ScrapeWebsite,
    ];
    app::dispatch(&web.state, &web.scraper, events).await?;
    Ok(Redirect::to("/"))
}

async fn preview(
    State(web): State<WebState>,
    Form(form): Form<PreviewForm>,
) -> std::result::Result<Redirect, EventError> {
    let events = [
        Event::GrayscaleToggled(form.grayscale.is_some()),
        Event::PreviewSelected(form.image),
    ];
    app::dispatch(&web.state, &web.scraper, events).await?;
    Ok(Redirect::to("/"))
}

async fn convert(
    State(web): State<WebState>,
    Form(form): Form<ConvertForm>,
) -> std::result::Result<Redirect, EventError> {
    app::dispatch(&web.state, &web.scraper, [Event::ConvertSelected(form.image)]).await?;
    Ok(Redirect::to("/#conversion"))
}

/// Renders the whole page for `state`.
pub fn render(state: &AppState) -> String {
    let checked = if state.grayscale { " checked" } else { "" };
    let options = image_options(&state.images);

    let mut page = String::new();
    page.push_str(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\">\
         <title>Website Image Scraper</title></head><body>\n",
    );
    page.push_str(
        "<nav><a href=\"#scraping\">Scraping</a> | <a href=\"#date\">Date</a> | \
         <a href=\"#conversion\">Image Conversion</a></nav>\n",
    );

    page.push_str(&format!(
        "<section id=\"scraping\"><h2>Scraping</h2>\n\
         <form method=\"post\" action=\"/scrape\">\
         <label>Website URL: <input name=\"url\" size=\"60\" value=\"{url}\"></label> \
         <label><input type=\"checkbox\" name=\"grayscale\"{checked}> Convert to Black and White</label> \
         <button>Scrape Website</button></form>\n\
         <form method=\"post\" action=\"/preview\">\
         <select name=\"image\" size=\"10\">{options}</select>\
         <label><input type=\"checkbox\" name=\"grayscale\"{checked}> Convert to Black and White</label> \
         <button>Preview</button></form>\n",
        url = escape(&state.url),
    ));
    if let Some(filename) = &state.preview {
        page.push_str(&image_tag(filename));
    }
    page.push_str("</section>\n");

    page.push_str(&format!(
        "<section id=\"date\"><h2>Date</h2><p>{}</p></section>\n",
        escape(&state.date)
    ));

    page.push_str(&format!(
        "<section id=\"conversion\"><h2>Image Conversion</h2>\n\
         <p>Select an image to convert:</p>\
         <form method=\"post\" action=\"/convert\">\
         <select name=\"image\" size=\"10\">{options}</select>\
         <button>Convert</button></form>\n"
    ));
    if let Some(filename) = &state.converted {
        page.push_str(&image_tag(filename));
    }
    page.push_str("</section>\n</body></html>\n");

    page
}

fn image_options(images: &[String]) -> String {
    images
        .iter()
        .map(|url| {
            let url = escape(url);
            format!("<option value=\"{url}\">{url}</option>")
        })
        .collect()
}

fn image_tag(filename: &str) -> String {
    format!(
        "<p><img src=\"/files/{}\" alt=\"{}\"></p>\n",
        escape(&encode_segment(filename)),
        escape(filename)
    )
}

/// Escapes text for use in HTML content and quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encodes `filename` for use as one URL path segment.
fn encode_segment(filename: &str) -> String {
    utf8_percent_encode(filename, SEGMENT).to_string()
}
