use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::error::{AppError, Res};

/// One logical call against the backend.
///
/// The value is kept intact across a retry, so a resubmitted request carries
/// the same method, path, query, body and headers as the first attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/members/42`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serializes `body` as the JSON payload.
    pub fn json<T: Serialize>(mut self, body: &T) -> Res<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Path without query string or trailing slash, used for endpoint matching.
    pub fn endpoint(&self) -> &str {
        let path = self.path.split('?').next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }

    /// Resolves the request path against the API base URL.
    pub fn url(&self, base: &Url) -> Res<Url> {
        let mut url = base.join(self.path.trim_start_matches('/'))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }
}

/// Checks that an id can stand as one path segment.
///
/// Ids come from backend data and user input; one carrying a separator or a
/// dot segment would retarget the request.
pub fn path_segment(raw: &str) -> Res<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\', '?', '#', '%'])
        || trimmed.contains(char::is_whitespace)
    {
        return Err(AppError::BadRequest(format!(
            "'{}' is not a valid identifier",
            raw
        )));
    }
    Ok(trimmed)
}

/// Raw backend answer: status code and body bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decodes the body, unwrapping the `{"data": ..}` envelope when present.
    pub fn json<T: DeserializeOwned>(&self) -> Res<T> {
        let value: serde_json::Value = if self.body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&self.body)?
        };
        let payload = match value {
            serde_json::Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };
        Ok(serde_json::from_value(payload)?)
    }

    /// Decodes the body as-is, envelope included.
    pub fn json_raw<T: DeserializeOwned>(&self) -> Res<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turns a non-success response into the matching error.
    pub fn error_for_status(self) -> Res<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::from_status(self.status, &self.body))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Profile {
        email: String,
    }

    #[test]
    fn url_joins_relative_to_base_and_appends_query() {
        let base = Url::parse("https://api.example.com/api/").unwrap();
        let request = ApiRequest::get("/members").query("page", 2).query("status", "active");
        assert_eq!(
            request.url(&base).unwrap().as_str(),
            "https://api.example.com/api/members?page=2&status=active"
        );
    }

    #[test]
    fn path_segment_refuses_separators_and_dot_segments() {
        assert_eq!(path_segment(" 665f1c0e9b ").unwrap(), "665f1c0e9b");
        assert_eq!(path_segment("ref_123-A").unwrap(), "ref_123-A");
        for bad in ["", "..", ".", "../admin", "a/b", "a?b=1", "a#b", "%2e%2e", "a b", "a\\b"] {
            assert!(
                matches!(path_segment(bad), Err(AppError::BadRequest(_))),
                "{bad:?} should be refused"
            );
        }
    }

    #[test]
    fn endpoint_strips_query_and_trailing_slash() {
        assert_eq!(ApiRequest::post("/auth/login/").endpoint(), "/auth/login");
        assert_eq!(ApiRequest::get("/members?page=1").endpoint(), "/members");
        assert_eq!(ApiRequest::get("/").endpoint(), "/");
    }

    #[test]
    fn data_envelope_is_unwrapped() {
        let response = ApiResponse::new(200, r#"{"data":{"email":"a@b.co"}}"#);
        let profile: Profile = response.json().unwrap();
        assert_eq!(profile.email, "a@b.co");

        let bare = ApiResponse::new(200, r#"{"email":"c@d.co"}"#);
        assert_eq!(bare.json::<Profile>().unwrap().email, "c@d.co");
    }

    #[test]
    fn error_for_status_keeps_success() {
        assert!(ApiResponse::new(204, "").error_for_status().is_ok());
        let err = ApiResponse::new(404, r#"{"message":"Member not found"}"#)
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
