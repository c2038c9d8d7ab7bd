//! Shared HTTP plumbing for the Google REST clients.

use std::time::Duration;

use serde::Deserialize;

use recite_sync::BackendError;

/// Blocking agent with one timeout for connect, read, and write.
pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .user_agent(concat!("recite/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Where the OAuth2 access token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Read from this environment variable on every request.
    Env(String),
    /// Fixed token.
    Static(String),
}

impl TokenSource {
    /// `Authorization` header value.
    pub fn authorization(&self) -> Result<String, BackendError> {
        let token = match self {
            TokenSource::Env(var) => std::env::var(var)
                .ok()
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| {
                    BackendError::Auth(format!("access token variable ${var} is not set"))
                })?,
            TokenSource::Static(token) => token.clone(),
        };
        Ok(format!("Bearer {}", token.trim()))
    }
}

/// Google's JSON error envelope: `{"error": {"code": 403, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Human-readable message from an error response body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(200).collect()
}

/// Map an HTTP error status onto the backend error taxonomy.
pub(crate) fn classify_status(status: u16, message: String) -> BackendError {
    match status {
        401 | 403 => BackendError::Auth(format!("HTTP {status}: {message}")),
        404 => BackendError::NotFound(message),
        408 | 429 | 500..=599 => BackendError::TransientIo(format!("HTTP {status}: {message}")),
        _ => BackendError::Rejected { status, message },
    }
}

/// Map a `ureq` failure for operation `what`.
pub(crate) fn from_ureq(what: &str, err: ureq::Error) -> BackendError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            classify_status(status, format!("{what}: {}", error_message(&body)))
        }
        ureq::Error::Transport(transport) => {
            BackendError::TransientIo(format!("{what}: {transport}"))
        }
    }
}

/// Decode a JSON response body for operation `what`.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    what: &str,
    response: ureq::Response,
) -> Result<T, BackendError> {
    response
        .into_json::<T>()
        .map_err(|e| BackendError::Malformed(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes_map_to_backend_kinds() {
        assert!(matches!(classify_status(401, "x".into()), BackendError::Auth(_)));
        assert!(matches!(classify_status(403, "x".into()), BackendError::Auth(_)));
        assert!(matches!(classify_status(404, "x".into()), BackendError::NotFound(_)));
        assert!(matches!(classify_status(429, "x".into()), BackendError::TransientIo(_)));
        assert!(matches!(classify_status(503, "x".into()), BackendError::TransientIo(_)));
        assert!(matches!(
            classify_status(400, "bad range".into()),
            BackendError::Rejected { status: 400, .. }
        ));
    }

    #[test]
    fn google_error_envelope_message_is_extracted() {
        let body = r#"{"error":{"code":400,"message":"Unable to parse range: Sheet9!A1:A","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "Unable to parse range: Sheet9!A1:A");
    }

    #[test]
    fn non_json_body_is_trimmed_and_truncated() {
        assert_eq!(error_message("  gateway timeout \n"), "gateway timeout");
        assert_eq!(error_message(""), "empty response body");
        assert_eq!(error_message(&"x".repeat(500)).len(), 200);
    }

    #[test]
    fn static_token_becomes_bearer_header() {
        let source = TokenSource::Static(" ya29.token \n".to_string());
        assert_eq!(source.authorization().expect("header"), "Bearer ya29.token");
    }

    #[test]
    fn missing_env_token_is_an_auth_error() {
        let source = TokenSource::Env("RECITE_TEST_TOKEN_THAT_IS_NEVER_SET".to_string());
        let err = source.authorization().unwrap_err();
        assert!(matches!(err, BackendError::Auth(_)));
        assert!(err.to_string().contains("RECITE_TEST_TOKEN_THAT_IS_NEVER_SET"));
    }
}
