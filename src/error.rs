use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::models::offer::ErrorKind;

/// Every way a single-offer pipeline can fail. Converted into an
/// error-shaped `JobOffer` at the engine boundary, never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error("Invalid URL: URL must be a non-empty string")]
    InvalidUrl,

    #[error(
        "Unsupported URL: no scraper available for '{0}'. Supported sites: JustJoin.it, TheProtocol.it, Pracuj.pl, LinkedIn"
    )]
    UnsupportedUrl(String),

    #[error("Session initialization failed: {0}")]
    SessionInitFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Incomplete extraction: missing required field(s): {}", .0.join(", "))]
    IncompleteExtraction(Vec<&'static str>),

    #[error("Scraping failed: {0}")]
    Unknown(String),
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::InvalidUrl => ErrorKind::InvalidUrl,
            ScrapeError::UnsupportedUrl(_) => ErrorKind::UnsupportedUrl,
            ScrapeError::SessionInitFailed(_) => ErrorKind::SessionInitFailed,
            ScrapeError::Timeout(_) => ErrorKind::Timeout,
            ScrapeError::Connection(_) => ErrorKind::ConnectionError,
            ScrapeError::IncompleteExtraction(_) => ErrorKind::IncompleteExtraction,
            ScrapeError::Unknown(_) => ErrorKind::UnknownFailure,
        }
    }
}

/// Failures reported by a browser-session collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Init(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Other(String),
}

impl From<SessionError> for ScrapeError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Init(msg) => ScrapeError::SessionInitFailed(msg),
            SessionError::Timeout(msg) => ScrapeError::Timeout(msg),
            SessionError::Connection(msg) => ScrapeError::Connection(msg),
            SessionError::Other(msg) => ScrapeError::Unknown(msg),
        }
    }
}

/// Errors surfaced by the HTTP API itself. Scrape failures are not among
/// them: those travel inside the 200 response as error-shaped offers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_extraction_names_missing_fields() {
        let err = ScrapeError::IncompleteExtraction(vec!["title", "company"]);
        assert_eq!(
            err.to_string(),
            "Incomplete extraction: missing required field(s): title, company"
        );
        assert_eq!(err.kind(), ErrorKind::IncompleteExtraction);
    }

    #[test]
    fn session_errors_map_onto_taxonomy() {
        let err: ScrapeError = SessionError::Timeout("navigation took longer than 30s".into()).into();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().starts_with("Timeout:"));

        let err: ScrapeError = SessionError::Init("no chrome".into()).into();
        assert_eq!(err.kind(), ErrorKind::SessionInitFailed);
    }
}
