use std::{env, sync::Arc, time::Duration};

use url::Url;

use crate::error::{AppError, Res};

/// Backend the dashboard talks to when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Clone, Debug)]
/// Configuration struct for the console client.
///
/// Holds the backend location and the logging preferences
/// used by the console binary and the API client.
pub struct Config {
    /// Base URL every API path is joined onto.
    pub api_base_url: Url,
    pub environment: String, // development or production
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger mirrors stdout into.
    pub log_file: String,
    /// Where the user agent is sent when the session cannot be recovered.
    pub login_path: String,
    /// Optional per request timeout; the transport default applies when unset.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Optional (with defaults):
    /// - `API_BASE_URL`: Backend base URL (default: "http://localhost:5000/api")
    /// - `ENVIRONMENT`: development or production (default: "development")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Log file path (default: "console.log")
    /// - `LOGIN_PATH`: Login entry point (default: "/login")
    /// - `REQUEST_TIMEOUT_SECS`: Request timeout in seconds (default: unset)
    pub fn from_env() -> Res<Arc<Self>> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok()).map(Arc::new)
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base_url =
            lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url(&raw_base_url)?;

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|_| {
                AppError::BadRequest(format!("REQUEST_TIMEOUT_SECS must be a number, got {raw}"))
            })?)),
            None => None,
        };

        Ok(Config {
            api_base_url,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            console_logging_enabled: lookup("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|| "true".to_string())
                .to_lowercase()
                == "true",
            log_file: lookup("LOG_FILE").unwrap_or_else(|| "console.log".to_string()),
            login_path: lookup("LOGIN_PATH").unwrap_or_else(|| "/login".to_string()),
            request_timeout,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

// Paths are joined relative to the base, so it must end in a slash.
fn parse_base_url(raw: &str) -> Res<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&normalized)?)
}
