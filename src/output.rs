//! Output formatters for the rendered document.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use chrono::Local;
use serde::Serialize;

use crate::locale::{self, BUY_TICKET, FREE_LABEL, TAKEN_LABEL};
use crate::models::{CacheStatus, parse_timestamp};
use crate::view::{Document, EventCard, Regions, ViewState};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const GREEN: &str = "\x1b[92m";
const CYAN: &str = "\x1b[96m";

/// Clear screen and move the cursor home.
pub const CLEAR: &str = "\x1b[2J\x1b[H";

/// Width of the availability bar in cells.
const BAR_WIDTH: u64 = 20;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// Pretty-printed JSON snapshot
    Json,
    /// One compact JSON snapshot per line
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Normalized view of what is currently visible.
///
/// This is the structure emitted in JSON/NDJSON output and by the web
/// dashboard's `/view` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub state: Option<ViewState>,
    pub status_text: String,
    pub loading: bool,
    pub error: Option<String>,
    pub summary: Option<SummarySnapshot>,
    pub events: Vec<EventCard>,
    pub cache_info: Option<String>,
}

/// Summary panel values as displayed.
#[derive(Debug, Clone, Serialize)]
pub struct SummarySnapshot {
    pub free: String,
    pub taken: String,
    pub all: String,
    pub percent: String,
}

impl ViewSnapshot {
    /// Capture the visible parts of `doc`.
    #[must_use]
    pub fn capture(doc: &Document, regions: &Regions) -> Self {
        let text = |r| doc.element(r).text.clone();
        let visible = |r| doc.element(r).display.is_visible();

        let cache_info = text(regions.cache_info);

        Self {
            state: regions.state(doc),
            status_text: text(regions.status_text),
            loading: visible(regions.loading),
            error: visible(regions.error_message).then(|| text(regions.error_text)),
            summary: visible(regions.summary_card).then(|| SummarySnapshot {
                free: text(regions.total_free),
                taken: text(regions.total_taken),
                all: text(regions.total_all),
                percent: text(regions.total_percent),
            }),
            events: if visible(regions.events_grid) {
                doc.element(regions.events_grid).cards.clone()
            } else {
                Vec::new()
            },
            cache_info: (!cache_info.is_empty()).then_some(cache_info),
        }
    }
}

/// Color for the status indicator dot.
fn state_color(state: Option<ViewState>) -> &'static str {
    match state {
        Some(ViewState::Success) => GREEN,
        Some(ViewState::Error) => RED,
        Some(ViewState::Loading) | None => YELLOW,
    }
}

/// Color for an availability percentage.
fn availability_color(percent: u64) -> &'static str {
    match percent {
        50.. => GREEN,
        20..=49 => YELLOW,
        _ => RED,
    }
}

/// Text bar of `BAR_WIDTH` cells filled to `percent`.
fn availability_bar(percent: u64) -> String {
    let filled = ((percent.min(100) * BAR_WIDTH + 50) / 100).min(BAR_WIDTH);
    let filled = usize::try_from(filled).unwrap_or(0);
    let empty = usize::try_from(BAR_WIDTH).unwrap_or(0) - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Write the snapshot in human-readable format with colors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, view: &ViewSnapshot) -> io::Result<()> {
    let color = state_color(view.state);
    writeln!(writer, "{color}●{RESET} {BOLD}{}{RESET}", view.status_text)?;

    if view.loading {
        writeln!(writer, "{DIM}◐ ...{RESET}")?;
    }

    if let Some(error) = &view.error {
        writeln!(writer, "{RED}⚠ {error}{RESET}")?;
    }

    if let Some(summary) = &view.summary {
        writeln!(
            writer,
            "\n{BOLD}{FREE_LABEL}:{RESET} {GREEN}{}{RESET} │ \
             {BOLD}{TAKEN_LABEL}:{RESET} {RED}{}{RESET} │ \
             {BOLD}Łącznie:{RESET} {} │ \
             {CYAN}{}{RESET}",
            summary.free, summary.taken, summary.all, summary.percent
        )?;
    }

    for card in &view.events {
        let color = availability_color(card.availability_percent);
        writeln!(writer, "\n{BOLD}{}{RESET}", card.date_label)?;
        writeln!(
            writer,
            "  {FREE_LABEL} {GREEN}{}{RESET} │ {TAKEN_LABEL} {RED}{}{RESET}",
            card.free, card.taken
        )?;
        writeln!(
            writer,
            "  {color}{}{RESET} {}",
            availability_bar(card.availability_percent),
            card.availability_text
        )?;
        writeln!(writer, "  {DIM}{BUY_TICKET}:{RESET} {}", card.url)?;
    }

    if let Some(info) = &view.cache_info {
        writeln!(writer, "\n{DIM}{info}{RESET}")?;
    }
    Ok(())
}

/// Write the snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, view: &ViewSnapshot) -> io::Result<()> {
    let json = serde_json::to_string_pretty(view)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write the snapshot as a single line of JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, view: &ViewSnapshot) -> io::Result<()> {
    let json = serde_json::to_string(view)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write the snapshot in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_view<W: Write>(writer: &mut W, view: &ViewSnapshot, format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, view),
        Format::Json => write_json(writer, view),
        Format::Ndjson => write_ndjson(writer, view),
    }
}

/// Local display form of a backend timestamp; raw text if unparseable.
fn display_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => "-".to_string(),
        Some(raw) => parse_timestamp(raw).map_or_else(
            || raw.to_string(),
            |t| locale::format_timestamp(&t.with_timezone(&Local)),
        ),
    }
}

/// Write the backend cache status.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_status<W: Write>(writer: &mut W, status: &CacheStatus, format: Format) -> io::Result<()> {
    match format {
        Format::Human => {
            let (color, label) = if status.cache_valid {
                (GREEN, "fresh")
            } else {
                (YELLOW, "stale")
            };
            writeln!(writer, "{color}●{RESET} {BOLD}backend cache {label}{RESET}")?;
            writeln!(
                writer,
                "  {DIM}cached at: {RESET} {}",
                display_timestamp(status.cached_at.as_deref())
            )?;
            writeln!(
                writer,
                "  {DIM}expires at:{RESET} {}",
                display_timestamp(status.cache_expires_at.as_deref())
            )
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(status)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{json}")
        }
        Format::Ndjson => {
            let json = serde_json::to_string(status)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{json}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Display;

    fn rendered_document() -> (Document, Regions) {
        let mut doc = Document::host_page();
        let regions = Regions::bind(&doc).expect("bind");

        doc.element_mut(regions.loading).display = Display::None;
        doc.element_mut(regions.summary_card).display = Display::Block;
        doc.element_mut(regions.events_grid).display = Display::Grid;
        doc.element_mut(regions.status_indicator).class_name =
            ViewState::Success.indicator_class().to_string();
        doc.element_mut(regions.status_text).text = "Dane załadowane pomyślnie".into();
        doc.element_mut(regions.total_free).text = "3".into();
        doc.element_mut(regions.total_taken).text = "7".into();
        doc.element_mut(regions.total_all).text = "10".into();
        doc.element_mut(regions.total_percent).text = "30%".into();
        doc.element_mut(regions.events_grid).cards.push(EventCard {
            date_label: "niedziela, 28 września 2025".into(),
            free: 3,
            taken: 7,
            availability_percent: 30,
            availability_text: "30% dostępne".into(),
            url: "https://tickets.example/1".into(),
        });

        (doc, regions)
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_snapshot_hides_invisible_regions() {
        let (mut doc, regions) = rendered_document();
        doc.element_mut(regions.error_text).text = "old failure".into();

        let view = ViewSnapshot::capture(&doc, &regions);
        assert_eq!(view.state, Some(ViewState::Success));
        assert!(view.error.is_none());
        assert!(!view.loading);
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.summary.as_ref().map(|s| s.percent.as_str()), Some("30%"));
        assert!(view.cache_info.is_none());

        doc.element_mut(regions.events_grid).display = Display::None;
        doc.element_mut(regions.error_message).display = Display::Block;
        let view = ViewSnapshot::capture(&doc, &regions);
        assert!(view.events.is_empty());
        assert_eq!(view.error.as_deref(), Some("old failure"));
    }

    #[test]
    fn test_availability_bar() {
        assert_eq!(availability_bar(0), "░".repeat(20));
        assert_eq!(availability_bar(100), "█".repeat(20));
        assert_eq!(availability_bar(30), format!("{}{}", "█".repeat(6), "░".repeat(14)));
        assert_eq!(availability_bar(250), "█".repeat(20));
    }

    #[test]
    fn test_write_human_contains_cards() {
        let (doc, regions) = rendered_document();
        let view = ViewSnapshot::capture(&doc, &regions);

        let mut out = Vec::new();
        write_human(&mut out, &view).expect("write failed");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("Dane załadowane pomyślnie"));
        assert!(text.contains("niedziela, 28 września 2025"));
        assert!(text.contains("30% dostępne"));
        assert!(text.contains("https://tickets.example/1"));
    }

    #[test]
    fn test_write_status_human() {
        let status = CacheStatus {
            cache_valid: false,
            cached_at: None,
            cache_expires_at: Some("garbage".into()),
        };

        let mut out = Vec::new();
        write_status(&mut out, &status, Format::Human).expect("write failed");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("backend cache stale"));
        assert!(text.contains("cached at: \u{1b}[0m -"));
        assert!(text.contains("garbage"));
    }

    #[test]
    fn test_write_ndjson_is_single_line() {
        let (doc, regions) = rendered_document();
        let view = ViewSnapshot::capture(&doc, &regions);

        let mut out = Vec::new();
        write_ndjson(&mut out, &view).expect("write failed");
        let text = String::from_utf8(out).expect("utf8");

        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["state"], "success");
        assert_eq!(value["events"][0]["availability_percent"], 30);
    }
}
