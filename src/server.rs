//! Web dashboard for seatwatch.
//!
//! Serves the controller's document as a page using:
//! - Axum for HTTP server
//! - SSE (Server-Sent Events) pushing the re-rendered page body on every change
//! - HTMX for the SSE swap and the retry buttons

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        Html, IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use crate::client::{ClientConfig, SeatsClient};
use crate::controller::{DEFAULT_REFRESH_SECS, SystemClock, ViewController};
use crate::locale::{BUY_TICKET, FREE_LABEL, TAKEN_LABEL};
use crate::output::ViewSnapshot;
use crate::view::{Document, Element, ElementRef, EventCard, Regions};

/// Controller type served by the dashboard.
pub type Dashboard = ViewController<SeatsClient, SystemClock>;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub refresh_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    controller: Arc<Dashboard>,
}

/// Create the Axum router with all routes.
pub fn create_router(controller: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/stream", get(sse_handler))
        .route("/view", get(view_handler))
        .route("/retry", post(retry_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { controller })
}

/// Start the web server.
pub async fn run_server(config: ServerConfig, client: &ClientConfig) -> anyhow::Result<()> {
    let source = SeatsClient::new(client)?;
    let controller = Arc::new(ViewController::new(
        source,
        SystemClock,
        Document::host_page(),
    )?);

    let refresh = controller.initialize(config.refresh_interval);
    let app = create_router(Arc::clone(&controller));

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("🎟 seatwatch UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresh.cancel();
    tracing::info!("seatwatch UI stopped");
    Ok(())
}

/// Resolve on Ctrl+C; never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Escape text for HTML element content and attribute values.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Opening tag carrying an element's id, class and display.
fn open_tag(tag: &str, el: &Element) -> String {
    format!(
        r#"<{tag} id="{}" class="{}" style="display: {}">"#,
        escape_html(&el.id),
        escape_html(&el.class_name),
        el.display.as_css()
    )
}

/// An element with only its text as content.
fn text_element(tag: &str, doc: &Document, r: ElementRef) -> String {
    let el = doc.element(r);
    format!("{}{}</{tag}>", open_tag(tag, el), escape_html(&el.text))
}

/// Format one event card.
fn format_card_html(card: &EventCard) -> String {
    format!(
        r#"<div class="event-card">
  <div class="event-date">{date}</div>
  <div class="event-stats">
    <div class="event-stat">
      <span class="event-stat-value">{free}</span>
      <div class="event-stat-label">{FREE_LABEL}</div>
    </div>
    <div class="event-stat">
      <span class="event-stat-value">{taken}</span>
      <div class="event-stat-label">{TAKEN_LABEL}</div>
    </div>
  </div>
  <div class="availability-bar">
    <div class="availability-fill" style="width: {percent}%"></div>
  </div>
  <div class="availability-percent">{text}</div>
  <a href="{url}" target="_blank" rel="noopener" class="event-link">{BUY_TICKET}</a>
</div>"#,
        date = escape_html(&card.date_label),
        free = card.free,
        taken = card.taken,
        percent = card.availability_percent,
        text = escape_html(&card.availability_text),
        url = escape_html(&card.url),
    )
}

/// Render every dashboard region.
#[must_use]
pub fn render_app(doc: &Document, regions: &Regions) -> String {
    let r = regions;
    let mut html = String::new();

    html.push_str(&format!(
        r#"{}{}{}<button class="refresh-button" hx-post="/retry" hx-swap="none">Odśwież</button></div>"#,
        open_tag("div", doc.element(r.status_bar)),
        text_element("span", doc, r.status_indicator),
        text_element("span", doc, r.status_text),
    ));

    html.push_str(&format!(
        r#"{}<div class="spinner"></div></div>"#,
        open_tag("div", doc.element(r.loading))
    ));

    html.push_str(&format!(
        r#"{}{}<button class="retry-button" hx-post="/retry" hx-swap="none">Spróbuj ponownie</button></div>"#,
        open_tag("div", doc.element(r.error_message)),
        text_element("p", doc, r.error_text),
    ));

    html.push_str(&open_tag("div", doc.element(r.summary_card)));
    for (slot, label) in [
        (r.total_free, FREE_LABEL),
        (r.total_taken, TAKEN_LABEL),
        (r.total_all, "Łącznie"),
        (r.total_percent, "% wolnych"),
    ] {
        html.push_str(&format!(
            r#"<div class="summary-item">{}<div class="summary-label">{label}</div></div>"#,
            text_element("span", doc, slot)
        ));
    }
    html.push_str("</div>");

    let grid = doc.element(r.events_grid);
    html.push_str(&open_tag("div", grid));
    for card in &grid.cards {
        html.push_str(&format_card_html(card));
    }
    html.push_str("</div>");

    html.push_str(&text_element("div", doc, r.cache_info));
    html
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the page with the current document.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let doc = state.controller.snapshot();
    let body = render_app(&doc, &state.controller.regions());
    Html(INDEX_HTML.replace("{{APP}}", &body))
}

/// SSE stream handler: one `view` event per document change.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let regions = state.controller.regions();
    let stream = WatchStream::new(state.controller.subscribe())
        .map(move |doc| Ok(Event::default().event("view").data(render_app(&doc, &regions))));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Current view as JSON.
async fn view_handler(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let doc = state.controller.snapshot();
    Json(ViewSnapshot::capture(&doc, &state.controller.regions()))
}

/// Retry handler - starts a load and returns immediately.
async fn retry_handler(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("retry requested via UI");
    let controller = Arc::clone(&state.controller);
    tokio::spawn(async move { controller.retry().await });
    StatusCode::ACCEPTED
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="pl">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>seatwatch: dostępność miejsc</title>

    <!-- HTMX + SSE -->
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://unpkg.com/htmx.org@1.9.10/dist/ext/sse.js"></script>

    <style>
        :root {
            --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            --bg: #f8fafc;
            --card: #ffffff;
            --text: #0f172a;
            --muted: #64748b;
            --border: #e2e8f0;
            --success: #10b981;
            --warning: #f59e0b;
            --danger: #ef4444;
            --accent: #6366f1;
            --radius: 12px;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: var(--font); background: var(--bg); color: var(--text); padding: 24px; }
        .main { max-width: 1100px; margin: 0 auto; }
        h1 { font-size: 24px; margin-bottom: 16px; }

        .status-bar { display: flex; align-items: center; gap: 10px; margin-bottom: 20px; }
        .status-bar button, .error-message button {
            margin-left: auto; border: 1px solid var(--border); background: var(--card);
            border-radius: 8px; padding: 6px 12px; cursor: pointer;
        }
        .status-indicator { width: 10px; height: 10px; border-radius: 50%; background: var(--muted); }
        .status-indicator.loading { background: var(--warning); }
        .status-indicator.success { background: var(--success); }
        .status-indicator.error { background: var(--danger); }
        .status-text { color: var(--muted); font-size: 14px; }

        .loading { text-align: center; padding: 48px; }
        .spinner {
            width: 32px; height: 32px; margin: 0 auto; border-radius: 50%;
            border: 3px solid var(--border); border-top-color: var(--accent);
            animation: spin 1s linear infinite;
        }
        @keyframes spin { to { transform: rotate(360deg); } }

        .error-message {
            background: #fef2f2; border: 1px solid #fecaca; color: #991b1b;
            border-radius: var(--radius); padding: 16px; margin-bottom: 20px;
        }
        .error-message button { margin: 12px 0 0 0; }

        .summary-card {
            background: var(--card); border: 1px solid var(--border); border-radius: var(--radius);
            padding: 20px; margin-bottom: 20px;
        }
        .summary-item { display: inline-block; min-width: 24%; text-align: center; }
        .summary-value { font-size: 28px; font-weight: 700; }
        .summary-value.free { color: var(--success); }
        .summary-value.taken { color: var(--danger); }
        .summary-value.percent { color: var(--accent); }
        .summary-label { color: var(--muted); font-size: 13px; }

        .events-grid { grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 16px; }
        .event-card {
            background: var(--card); border: 1px solid var(--border); border-radius: var(--radius);
            padding: 16px;
        }
        .event-date { font-weight: 600; margin-bottom: 12px; text-transform: capitalize; }
        .event-stats { display: flex; gap: 24px; margin-bottom: 12px; }
        .event-stat-value { font-size: 22px; font-weight: 700; }
        .event-stat-label { color: var(--muted); font-size: 12px; }
        .availability-bar { height: 8px; background: var(--border); border-radius: 4px; overflow: hidden; }
        .availability-fill { height: 100%; background: var(--success); }
        .availability-percent { color: var(--muted); font-size: 13px; margin: 8px 0 12px; }
        .event-link {
            display: inline-block; background: var(--accent); color: #fff; text-decoration: none;
            padding: 6px 14px; border-radius: 8px; font-size: 14px;
        }

        .cache-info { color: var(--muted); font-size: 12px; margin-top: 24px; text-align: center; }
    </style>
</head>
<body>
    <main class="main">
        <h1>Dostępność miejsc</h1>
        <div id="app" hx-ext="sse" sse-connect="/stream" sse-swap="view" hx-swap="innerHTML">
{{APP}}
        </div>
    </main>
</body>
</html>
"##;
