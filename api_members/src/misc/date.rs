use chrono::{DateTime, NaiveDate, Utc};
use common::error::{AppError, Res};

/// Parses the timestamp spellings the backend uses.
///
/// Accepts RFC 3339 (`2025-06-01T00:00:00.000Z`) and bare dates
/// (`2025-06-01`, read as midnight UTC).
pub fn parse_timestamp(raw: &str) -> Res<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Internal(format!("Unrecognized timestamp from backend: {raw}")))
}

/// Like [`parse_timestamp`], treating absent or empty values as `None`.
pub fn parse_optional(raw: Option<&str>) -> Res<Option<DateTime<Utc>>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value).map(Some),
    }
}
