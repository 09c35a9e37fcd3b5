//! Seat availability API client.
//!
//! Provides async HTTP access to the `/api/seats` and `/api/status`
//! endpoints. Uses reqwest with rustls for TLS.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::SeatwatchError;
use crate::models::{CacheStatus, FetchResult};

/// Default request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// User agent string for API requests.
const USER_AGENT: &str = concat!("seatwatch/", env!("CARGO_PKG_VERSION"));

/// Something that can produce seat availability data.
pub trait SeatSource: Send + Sync + 'static {
    /// Fetch the current availability payload.
    fn fetch_seats(&self) -> impl Future<Output = Result<FetchResult, SeatwatchError>> + Send;
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Client for the seat availability backend.
#[derive(Debug, Clone)]
pub struct SeatsClient {
    client: Client,
    base_url: String,
}

impl SeatsClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, SeatwatchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the backend cache status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn fetch_status(&self) -> Result<CacheStatus, SeatwatchError> {
        self.get_json("/api/status").await
    }

    /// GET `path` and decode the body.
    ///
    /// The body is parsed as JSON before the status is checked, so a
    /// failure response can carry its own `error` message.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SeatwatchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("fetching {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)?;

        if !status.is_success() {
            return Err(SeatwatchError::fetch(status.as_u16(), error_message(&value)));
        }

        Ok(serde_json::from_value(value)?)
    }
}

impl SeatSource for SeatsClient {
    #[instrument(skip(self))]
    async fn fetch_seats(&self) -> Result<FetchResult, SeatwatchError> {
        let result: FetchResult = self.get_json("/api/seats").await?;
        debug!("fetched {} events", result.data.events.len());
        Ok(result)
    }
}

/// Extract a non-empty `error` string from a failure body.
fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::errors::DEFAULT_FETCH_ERROR;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> SeatsClient {
        SeatsClient::new(&ClientConfig {
            base_url,
            timeout: Duration::from_secs(5),
        })
        .expect("failed to build client")
    }

    fn payload() -> Value {
        json!({
            "data": {
                "events": [
                    {"date": "2025-09-28", "free": 3, "taken": 7, "total": 10, "url": "https://t.example/1"},
                    {"date": "2025-10-04", "free": 0, "taken": 0, "total": 0, "url": "https://t.example/2"}
                ],
                "summary": {"free_total": 3, "taken_total": 7, "all_total": 10, "total_percent": 30.0}
            },
            "cached_at": "2025-09-20T12:00:00",
            "cache_expires_at": "2025-09-20T12:15:00"
        })
    }

    #[tokio::test]
    async fn test_fetch_seats_success() {
        let router = Router::new().route("/api/seats", get(|| async { Json(payload()) }));
        // trailing slash is tolerated
        let client = client(format!("{}/", serve(router).await));

        let result = client.fetch_seats().await.expect("fetch failed");
        assert_eq!(result.data.events.len(), 2);
        assert_eq!(result.data.events[1].url, "https://t.example/2");
        assert!(result.cached_at().is_some());
    }

    #[tokio::test]
    async fn test_fetch_seats_uses_server_error_message() {
        let router = Router::new().route(
            "/api/seats",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "no data", "cached_at": null})),
                )
            }),
        );
        let client = client(serve(router).await);

        let err = client.fetch_seats().await.unwrap_err();
        assert!(matches!(err, SeatwatchError::Fetch { status: 500, .. }));
        assert_eq!(err.to_string(), "no data");
    }

    #[tokio::test]
    async fn test_fetch_seats_default_error_message() {
        let router = Router::new().route(
            "/api/seats",
            get(|| async { (StatusCode::BAD_GATEWAY, Json(json!({}))) }),
        );
        let client = client(serve(router).await);

        let err = client.fetch_seats().await.unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_FETCH_ERROR);
    }

    #[tokio::test]
    async fn test_fetch_seats_invalid_json() {
        let router = Router::new().route("/api/seats", get(|| async { "<html>oops</html>" }));
        let client = client(serve(router).await);

        let err = client.fetch_seats().await.unwrap_err();
        assert!(matches!(err, SeatwatchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_seats_failure_status_with_invalid_json_is_parse_error() {
        let router = Router::new().route(
            "/api/seats",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
        );
        let client = client(serve(router).await);

        let err = client.fetch_seats().await.unwrap_err();
        assert!(matches!(err, SeatwatchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_seats_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind");
        let addr = listener.local_addr().expect("no local addr");
        drop(listener);

        let err = client(format!("http://{addr}")).fetch_seats().await.unwrap_err();
        assert!(matches!(err, SeatwatchError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_status() {
        let router = Router::new().route(
            "/api/status",
            get(|| async {
                Json(json!({
                    "cache_valid": true,
                    "cached_at": "2025-09-20T12:00:00",
                    "cache_expires_at": "2025-09-20T12:15:00"
                }))
            }),
        );
        let client = client(serve(router).await);

        let status = client.fetch_status().await.expect("status failed");
        assert!(status.cache_valid);
        assert_eq!(status.cached_at.as_deref(), Some("2025-09-20T12:00:00"));
    }
}
