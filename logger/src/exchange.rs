//! Console lines for backend exchanges issued by the API client.

use std::time::Duration;

use colored::{ColoredString, Colorize};
use log::{debug, info, warn};

/// What the client knows about one finished HTTP exchange.
pub struct Exchange<'a> {
    pub request_id: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub status: u16,
    pub elapsed: Duration,
    /// Whether this was the resubmission after a token refresh.
    pub retried: bool,
}

pub fn log_exchange(exchange: &Exchange<'_>) {
    info!(
        "[{}] {} {} {} req_id={}{}",
        colored_status(exchange.status),
        colored_method(exchange.method),
        exchange.path.bright_white(),
        format!("({}ms)", exchange.elapsed.as_millis()).bright_black(),
        exchange.request_id.bright_blue(),
        if exchange.retried {
            " (retry)".yellow().to_string()
        } else {
            String::new()
        },
    );
}

/// Request payloads only go to the debug level.
pub fn log_request_body(request_id: &str, body: &serde_json::Value) {
    debug!("  Request {}: {}", request_id, body.to_string().bright_green());
}

pub fn log_transport_failure(method: &str, path: &str, error: &dyn std::fmt::Display) {
    warn!(
        "{} {} failed before a response: {}",
        colored_method(method),
        path.bright_white(),
        error
    );
}

fn colored_status(status: u16) -> ColoredString {
    match status {
        200..=299 => status.to_string().green(),
        300..=399 => status.to_string().yellow(),
        400..=499 => status.to_string().bright_red(),
        _ => status.to_string().red(),
    }
}

fn colored_method(method: &str) -> ColoredString {
    match method {
        "GET" => method.blue(),
        "POST" => method.yellow(),
        "PUT" => method.purple(),
        "PATCH" => method.cyan(),
        "DELETE" => method.red(),
        _ => method.normal(),
    }
}
