//! Document model the controller renders into.
//!
//! The document plays the role of the host page: it owns a fixed set of
//! regions addressed by identifier. The controller only changes the
//! contents, visibility and class of regions that already exist, through
//! typed [`Regions`] handles validated once when it binds.

use serde::Serialize;

use crate::errors::SeatwatchError;

/// CSS display mode of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    None,
    Block,
    Grid,
}

impl Display {
    /// Get the CSS value for this display mode.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Block => "block",
            Self::Grid => "grid",
        }
    }

    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Load state reflected by the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    Loading,
    Success,
    Error,
}

impl ViewState {
    const ALL: [Self; 3] = [Self::Loading, Self::Success, Self::Error];

    /// Class list applied to the status indicator in this state.
    #[must_use]
    pub const fn indicator_class(self) -> &'static str {
        match self {
            Self::Loading => "status-indicator loading",
            Self::Success => "status-indicator success",
            Self::Error => "status-indicator error",
        }
    }

    /// Recover the state from an indicator's class list.
    #[must_use]
    pub fn from_indicator_class(class: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.indicator_class() == class)
    }
}

/// Identifiers of the regions the controller requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionId {
    StatusBar,
    StatusIndicator,
    StatusText,
    SummaryCard,
    EventsGrid,
    Loading,
    ErrorMessage,
    ErrorText,
    CacheInfo,
    TotalFree,
    TotalTaken,
    TotalAll,
    TotalPercent,
}

impl RegionId {
    /// Get the element identifier for this region.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusBar => "statusBar",
            Self::StatusIndicator => "statusIndicator",
            Self::StatusText => "statusText",
            Self::SummaryCard => "summaryCard",
            Self::EventsGrid => "eventsGrid",
            Self::Loading => "loading",
            Self::ErrorMessage => "errorMessage",
            Self::ErrorText => "errorText",
            Self::CacheInfo => "cacheInfo",
            Self::TotalFree => "totalFree",
            Self::TotalTaken => "totalTaken",
            Self::TotalAll => "totalAll",
            Self::TotalPercent => "totalPercent",
        }
    }
}

/// One rendered card in the events grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCard {
    pub date_label: String,
    pub free: u64,
    pub taken: u64,
    /// Width of the availability bar, in percent
    pub availability_percent: u64,
    pub availability_text: String,
    /// Purchase link, opened in a new browsing context
    pub url: String,
}

/// A region of the document.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub id: String,
    pub display: Display,
    pub class_name: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<EventCard>,
}

impl Element {
    fn new(id: &str, display: Display, class_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display,
            class_name: class_name.to_string(),
            text: String::new(),
            cards: Vec::new(),
        }
    }
}

/// Handle to an element, valid for the document it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef(usize);

/// The host document: an append-only list of identified regions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region to the document.
    #[must_use]
    pub fn with_region(mut self, id: &str, display: Display, class_name: &str) -> Self {
        self.elements.push(Element::new(id, display, class_name));
        self
    }

    /// The standard dashboard page with every region the controller needs.
    #[must_use]
    pub fn host_page() -> Self {
        Self::new()
            .with_region(RegionId::StatusBar.as_str(), Display::Block, "status-bar")
            .with_region(RegionId::StatusIndicator.as_str(), Display::Block, "status-indicator")
            .with_region(RegionId::StatusText.as_str(), Display::Block, "status-text")
            .with_region(RegionId::Loading.as_str(), Display::Block, "loading")
            .with_region(RegionId::ErrorMessage.as_str(), Display::None, "error-message")
            .with_region(RegionId::ErrorText.as_str(), Display::Block, "error-text")
            .with_region(RegionId::SummaryCard.as_str(), Display::None, "summary-card")
            .with_region(RegionId::TotalFree.as_str(), Display::Block, "summary-value free")
            .with_region(RegionId::TotalTaken.as_str(), Display::Block, "summary-value taken")
            .with_region(RegionId::TotalAll.as_str(), Display::Block, "summary-value")
            .with_region(RegionId::TotalPercent.as_str(), Display::Block, "summary-value percent")
            .with_region(RegionId::EventsGrid.as_str(), Display::None, "events-grid")
            .with_region(RegionId::CacheInfo.as_str(), Display::Block, "cache-info")
    }

    /// Look up a region by identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<ElementRef> {
        self.elements.iter().position(|e| e.id == id).map(ElementRef)
    }

    #[must_use]
    pub fn element(&self, r: ElementRef) -> &Element {
        &self.elements[r.0]
    }

    pub fn element_mut(&mut self, r: ElementRef) -> &mut Element {
        &mut self.elements[r.0]
    }
}

/// Typed handles to every region the controller mutates.
#[derive(Debug, Clone, Copy)]
pub struct Regions {
    pub status_bar: ElementRef,
    pub status_indicator: ElementRef,
    pub status_text: ElementRef,
    pub summary_card: ElementRef,
    pub events_grid: ElementRef,
    pub loading: ElementRef,
    pub error_message: ElementRef,
    pub error_text: ElementRef,
    pub cache_info: ElementRef,
    pub total_free: ElementRef,
    pub total_taken: ElementRef,
    pub total_all: ElementRef,
    pub total_percent: ElementRef,
}

impl Regions {
    /// Resolve every required region in `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`SeatwatchError::MissingRegion`] naming the first region
    /// the document lacks.
    pub fn bind(doc: &Document) -> Result<Self, SeatwatchError> {
        let find = |id: RegionId| {
            doc.find(id.as_str())
                .ok_or_else(|| SeatwatchError::MissingRegion(id.as_str().to_string()))
        };

        Ok(Self {
            status_bar: find(RegionId::StatusBar)?,
            status_indicator: find(RegionId::StatusIndicator)?,
            status_text: find(RegionId::StatusText)?,
            summary_card: find(RegionId::SummaryCard)?,
            events_grid: find(RegionId::EventsGrid)?,
            loading: find(RegionId::Loading)?,
            error_message: find(RegionId::ErrorMessage)?,
            error_text: find(RegionId::ErrorText)?,
            cache_info: find(RegionId::CacheInfo)?,
            total_free: find(RegionId::TotalFree)?,
            total_taken: find(RegionId::TotalTaken)?,
            total_all: find(RegionId::TotalAll)?,
            total_percent: find(RegionId::TotalPercent)?,
        })
    }

    /// Current state as shown by the status indicator.
    ///
    /// `None` before the first load has started.
    #[must_use]
    pub fn state(&self, doc: &Document) -> Option<ViewState> {
        ViewState::from_indicator_class(&doc.element(self.status_indicator).class_name)
    }
}
