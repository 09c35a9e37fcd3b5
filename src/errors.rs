//! Error types for seatwatch.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Message shown when the backend fails without saying why.
pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch data";

/// Errors that can occur in seatwatch operations.
#[derive(Error, Debug)]
pub enum SeatwatchError {
    /// Request could not be completed (connect, DNS, timeout)
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Response body is not valid JSON or has the wrong shape
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    /// Backend answered with a non-2xx status.
    ///
    /// Displays as the bare message so it can be shown to the user verbatim.
    #[error("{message}")]
    Fetch { status: u16, message: String },

    /// Host document lacks a region the controller needs
    #[error("required view region '{0}' is missing from the document")]
    MissingRegion(String),
}

impl SeatwatchError {
    /// Build a fetch error from the server-supplied message, if any.
    #[must_use]
    pub fn fetch(status: u16, message: Option<String>) -> Self {
        Self::Fetch {
            status,
            message: message.unwrap_or_else(|| DEFAULT_FETCH_ERROR.to_string()),
        }
    }

    /// HTTP status behind the error, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::MissingRegion(_) => None,
        }
    }
}
