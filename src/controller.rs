//! View controller: fetch, state transitions and rendering.
//!
//! The controller drives the load cycle for one document. Each
//! [`ViewController::load_data`] call takes a generation number; only the
//! newest generation may apply its result, so a slow response that
//! resolves after a newer request started is dropped instead of
//! overwriting fresher output.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::client::SeatSource;
use crate::errors::SeatwatchError;
use crate::locale::{self, STATUS_ERROR, STATUS_LOADING, STATUS_SUCCESS};
use crate::models::{EventAvailability, FetchResult};
use crate::view::{Display, Document, EventCard, Regions, ViewState};

/// Default refresh period in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 5 * 60;

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub refresh_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

/// Handle to the periodic refresh task.
///
/// Dropping the handle leaves the task running; call [`cancel`](Self::cancel)
/// to stop it.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the refresh timer. Loads already in flight still complete.
    pub fn cancel(self) {
        self.task.abort();
    }
}

/// Orchestrates the fetch, state and render cycle for one document.
pub struct ViewController<S, C = SystemClock> {
    source: S,
    clock: C,
    document: watch::Sender<Document>,
    regions: Regions,
    generation: AtomicU64,
}

impl<S: SeatSource, C: Clock> ViewController<S, C> {
    /// Bind a controller to `document`.
    ///
    /// # Errors
    ///
    /// Returns [`SeatwatchError::MissingRegion`] if the document lacks any
    /// region the controller renders into.
    pub fn new(source: S, clock: C, document: Document) -> Result<Self, SeatwatchError> {
        let regions = Regions::bind(&document)?;
        let (document, _rx) = watch::channel(document);

        Ok(Self {
            source,
            clock,
            document,
            regions,
            generation: AtomicU64::new(0),
        })
    }

    /// Load once now, then every `period` until the handle is cancelled.
    pub fn initialize(self: &Arc<Self>, period: Duration) -> RefreshHandle {
        let period = period.max(Duration::from_secs(1));
        let controller = Arc::clone(self);

        info!("refreshing every {}s", period.as_secs());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // first tick completes immediately
                ticker.tick().await;
                controller.spawn_load();
            }
        });

        RefreshHandle { task }
    }

    /// Start a load in the background without waiting for it.
    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.load_data().await })
    }

    /// Manually triggered reload.
    pub async fn retry(&self) {
        info!("manual retry requested");
        self.load_data().await;
    }

    /// Fetch the payload and render it, or render the failure.
    pub async fn load_data(&self) {
        // taken under the document lock so generation order matches Loading order
        let mut generation = 0;
        self.document.send_modify(|doc| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.show_loading(doc);
        });

        let outcome = self.source.fetch_seats().await;
        if let Err(e) = &outcome {
            error!(status = e.status(), "error loading data: {e}");
        }
        let now = self.clock.now();

        self.document.send_if_modified(|doc| {
            let latest = self.generation.load(Ordering::SeqCst);
            if latest != generation {
                debug!(generation, latest, "discarding stale response");
                return false;
            }

            match &outcome {
                Ok(result) => {
                    self.display_data(doc, result);
                    self.update_cache_info(doc, result, now);
                    self.show_success(doc, STATUS_SUCCESS);
                }
                Err(e) => self.show_error(doc, &e.to_string()),
            }
            true
        });
    }

    /// Observe every change to the document.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Document> {
        self.document.subscribe()
    }

    /// Copy of the current document.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.document.borrow().clone()
    }

    #[must_use]
    pub fn regions(&self) -> Regions {
        self.regions
    }

    /// Current state of the status indicator.
    #[must_use]
    pub fn state(&self) -> Option<ViewState> {
        self.regions.state(&self.document.borrow())
    }

    fn set_state(&self, doc: &mut Document, state: ViewState, text: &str) {
        doc.element_mut(self.regions.status_indicator).class_name =
            state.indicator_class().to_string();
        doc.element_mut(self.regions.status_text).text = text.to_string();
    }

    fn show_loading(&self, doc: &mut Document) {
        let r = &self.regions;
        doc.element_mut(r.loading).display = Display::Block;
        doc.element_mut(r.summary_card).display = Display::None;
        doc.element_mut(r.events_grid).display = Display::None;
        doc.element_mut(r.error_message).display = Display::None;

        self.set_state(doc, ViewState::Loading, STATUS_LOADING);
    }

    fn show_success(&self, doc: &mut Document, message: &str) {
        self.set_state(doc, ViewState::Success, message);
    }

    fn show_error(&self, doc: &mut Document, message: &str) {
        let r = &self.regions;
        doc.element_mut(r.loading).display = Display::None;
        doc.element_mut(r.summary_card).display = Display::None;
        doc.element_mut(r.events_grid).display = Display::None;
        doc.element_mut(r.error_message).display = Display::Block;

        self.set_state(doc, ViewState::Error, STATUS_ERROR);
        doc.element_mut(r.error_text).text = message.to_string();
    }

    fn display_data(&self, doc: &mut Document, result: &FetchResult) {
        let r = &self.regions;
        let summary = &result.data.summary;

        doc.element_mut(r.loading).display = Display::None;
        doc.element_mut(r.error_message).display = Display::None;
        doc.element_mut(r.summary_card).display = Display::Block;
        doc.element_mut(r.events_grid).display = Display::Grid;

        doc.element_mut(r.total_free).text = summary.free_total.to_string();
        doc.element_mut(r.total_taken).text = summary.taken_total.to_string();
        doc.element_mut(r.total_all).text = summary.all_total.to_string();
        doc.element_mut(r.total_percent).text = summary.percent_label();

        let grid = doc.element_mut(r.events_grid);
        grid.cards.clear();
        grid.cards.extend(result.data.events.iter().map(build_card));
    }

    fn update_cache_info(&self, doc: &mut Document, result: &FetchResult, now: DateTime<Utc>) {
        let Some(raw) = result.cached_at.as_deref() else {
            return;
        };

        let cached = result.cached_at();
        let expires = result.cache_expires_at();
        let minutes = minutes_until_refresh(expires, now);

        debug!(
            cached_at = raw,
            cache_expires_at = result.cache_expires_at.as_deref().unwrap_or("-"),
            now = %now.to_rfc3339(),
            minutes,
            "cache info"
        );

        let last_updated = cached.map_or_else(
            || raw.to_string(),
            |t| locale::format_timestamp(&t.with_timezone(&Local)),
        );
        doc.element_mut(self.regions.cache_info).text =
            locale::cache_info_line(&last_updated, minutes);
    }
}

/// Whole minutes until `expires`, rounded up and never negative.
///
/// A missing expiry counts as already expired.
#[must_use]
pub fn minutes_until_refresh(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(expires) = expires else {
        return 0;
    };
    let millis = (expires - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + 59_999) / 60_000
    }
}

/// Build the card for one event.
#[must_use]
pub fn build_card(event: &EventAvailability) -> EventCard {
    let percent = event.availability_percent();
    EventCard {
        date_label: event
            .date()
            .map_or_else(|| event.date.clone(), locale::format_event_date),
        free: event.free,
        taken: event.taken,
        availability_percent: percent,
        availability_text: locale::availability_line(percent),
        url: event.url.clone(),
    }
}
