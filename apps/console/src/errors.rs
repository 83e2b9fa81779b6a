use thiserror::Error;

use crate::editor::asset::AssetError;
use crate::session::store::StoreError;

/// Failure of a backend round-trip or of the local work leading up to it.
///
/// Expired, missing and malformed credentials all collapse into `Unauthorized`;
/// the operator sees the same rejection for each.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("A {0} is already in flight")]
    Busy(&'static str),

    /// Saving before any document was loaded would overwrite the stored portfolio.
    #[error("No portfolio loaded; refusing to save")]
    NotLoaded,
}

impl SyncError {
    /// Maps a non-2xx status to an error. 401 and 403 mean the credential was refused.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => SyncError::Unauthorized,
            code => SyncError::Server {
                status: code,
                message: extract_message(&body).unwrap_or(body),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SyncError::Unauthorized)
    }
}

/// Pulls `message` (or `error.message`) out of a JSON error body when there is one.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_401_and_403_collapse_to_unauthorized() {
        assert!(SyncError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_unauthorized());
        assert!(SyncError::from_status(StatusCode::FORBIDDEN, "nope".into()).is_unauthorized());
    }

    #[test]
    fn test_server_error_keeps_json_message() {
        let err = SyncError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"disk full"}"#.to_string(),
        );
        match err {
            SyncError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "disk full");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_server_error_nested_message() {
        let err = SyncError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":"VALIDATION_ERROR","message":"bad skills"}}"#.to_string(),
        );
        assert_eq!(err.to_string(), "Server error (status 400): bad skills");
    }

    #[test]
    fn test_server_error_plain_body() {
        let err = SyncError::from_status(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(err.to_string(), "Server error (status 502): upstream down");
    }
}
