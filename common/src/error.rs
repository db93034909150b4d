use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    // === APPLICATION ERRORS ===
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Builds an error from a non-success backend response.
    ///
    /// The body is read for a `message` or `error` field the way the backend
    /// reports failures; anything else is passed through as raw text.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value["message"]
                    .as_str()
                    .or_else(|| value["error"].as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

        if status == 401 {
            return AppError::Unauthorized(message);
        }

        AppError::Api { status, message }
    }

    /// HTTP status carried by this error, when it came from the backend.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Unauthorized(_) | AppError::SessionExpired => Some(401),
            AppError::Api { status, .. } => Some(*status),
            AppError::NotFound(_) => Some(404),
            AppError::BadRequest(_) => Some(400),
            AppError::Reqwest(error) => error.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the caller should send the user back through login.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Unauthorized(_) | AppError::SessionExpired)
    }

    /// Logs transport level failures; application errors are the caller's to present.
    pub fn log(&self) {
        match self {
            AppError::Reqwest(error) => log::error!("Reqwest error: {}", error),
            AppError::Json(error) => log::error!("JSON error: {}", error),
            AppError::Url(error) => log::error!("URL error: {}", error),
            AppError::Internal(error) => log::error!("Internal error: {}", error),
            other => log::debug!("{}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_field_is_used() {
        let err = AppError::from_status(422, br#"{"message":"Plan is inactive"}"#);
        match err {
            AppError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Plan is inactive");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_field_is_used_when_message_missing() {
        let err = AppError::from_status(500, br#"{"error":"boom"}"#);
        assert_eq!(err.to_string(), "Backend returned 500: boom");
    }

    #[test]
    fn plain_text_body_passes_through() {
        let err = AppError::from_status(502, b"Bad Gateway\n");
        assert_eq!(err.to_string(), "Backend returned 502: Bad Gateway");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn unauthorized_status_maps_to_auth_failure() {
        let err = AppError::from_status(401, br#"{"message":"Invalid credentials"}"#);
        assert!(err.is_auth_failure());
        assert_eq!(err.status(), Some(401));
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Invalid credentials"));
    }

    #[test]
    fn validation_is_not_an_http_error() {
        let err = AppError::Validation("duration must be positive".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_auth_failure());
    }
}
