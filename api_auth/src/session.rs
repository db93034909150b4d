//! Client side credential storage.
//!
//! The bearer token lives here next to the cookies the backend sets. The
//! refresh credential arrives as an httpOnly style cookie, so the store also
//! acts as the transport's cookie jar and replays it on credentialed calls.
//! Cookies are scoped by domain and path and dropped once expired.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cookie::{
    Cookie,
    time::{Duration, OffsetDateTime},
};
use log::{debug, warn};
use reqwest::{cookie::CookieStore, header::HeaderValue};
use url::Url;

/// Cookie carrying the refresh credential.
pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Debug, Clone, PartialEq)]
struct StoredCookie {
    name: String,
    value: String,
    domain: String,
    host_only: bool,
    path: String,
    secure: bool,
    expires_at: Option<OffsetDateTime>,
}

impl StoredCookie {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }

    fn matches(&self, url: &Url, now: OffsetDateTime) -> bool {
        if !self.is_live(now) || (self.secure && url.scheme() != "https") {
            return false;
        }
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };
        let domain_matches = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };
        domain_matches && path_matches(&self.path, url.path())
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

#[derive(Debug, Default)]
struct Credentials {
    access_token: Option<String>,
    cookies: Vec<StoredCookie>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Credentials>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a session saved by an earlier run against the backend at `origin`.
    pub fn restore(
        origin: &Url,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Self {
        let store = Self::new();
        {
            let mut credentials = store.write();
            credentials.access_token = access_token;
            if let Some(refresh_token) = refresh_token {
                credentials.cookies.push(StoredCookie {
                    name: REFRESH_COOKIE.to_string(),
                    value: refresh_token,
                    domain: origin.host_str().unwrap_or_default().to_ascii_lowercase(),
                    host_only: true,
                    path: "/".to_string(),
                    secure: false,
                    expires_at: None,
                });
            }
        }
        store
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_credential(&self) -> Option<String> {
        let now = OffsetDateTime::now_utc();
        self.read()
            .cookies
            .iter()
            .find(|cookie| {
                cookie.name == REFRESH_COOKIE && !cookie.value.is_empty() && cookie.is_live(now)
            })
            .map(|cookie| cookie.value.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().access_token.is_some()
    }

    // Only sign-in and the refresh cycle write the bearer token.
    pub(crate) fn set_access_token(&self, token: String) {
        self.write().access_token = Some(token);
    }

    /// Drops the bearer token and every cookie.
    pub fn clear(&self) {
        let mut credentials = self.write();
        credentials.access_token = None;
        credentials.cookies.clear();
        debug!("Session cleared");
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieStore for SessionStore {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let now = OffsetDateTime::now_utc();
        let mut credentials = self.write();
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            let parsed = match Cookie::parse(raw.to_string()) {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!("Ignoring malformed Set-Cookie from {}: {}", url, error);
                    continue;
                }
            };
            let Some((stored, expired)) = scope_cookie(&parsed, url, now) else {
                warn!("Ignoring cookie {} outside the scope of {}", parsed.name(), url);
                continue;
            };
            credentials.cookies.retain(|cookie| !cookie.same_slot(&stored));
            if !expired {
                credentials.cookies.push(stored);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let now = OffsetDateTime::now_utc();
        let credentials = self.read();
        let mut matching: Vec<&StoredCookie> = credentials
            .cookies
            .iter()
            .filter(|cookie| cookie.matches(url, now))
            .collect();
        if matching.is_empty() {
            return None;
        }
        // Longer paths first.
        matching.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        let joined = matching
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }
}

/// Resolves where a cookie set by `url` applies and whether it is already expired.
///
/// Returns `None` when the cookie names a domain the responding host may not set.
fn scope_cookie(
    parsed: &Cookie<'_>,
    url: &Url,
    now: OffsetDateTime,
) -> Option<(StoredCookie, bool)> {
    let host = url.host_str()?.to_ascii_lowercase();
    let (domain, host_only) = match parsed.domain().map(str::to_ascii_lowercase) {
        Some(domain) if !domain.is_empty() => {
            if !domain_matches(&host, &domain) {
                return None;
            }
            (domain, false)
        }
        _ => (host, true),
    };
    let path = match parsed.path() {
        Some(path) if path.starts_with('/') => path.to_string(),
        _ => default_path(url.path()),
    };

    // Max-Age wins over Expires when both are present.
    let expires_at = match parsed.max_age() {
        Some(age) if age <= Duration::ZERO => Some(OffsetDateTime::UNIX_EPOCH),
        Some(age) => Some(now + age),
        None => parsed.expires_datetime(),
    };
    let expired = expires_at.is_some_and(|at| at <= now);

    let stored = StoredCookie {
        name: parsed.name().to_string(),
        value: parsed.value().to_string(),
        domain,
        host_only,
        path,
        secure: parsed.secure().unwrap_or(false),
        expires_at,
    };
    Some((stored, expired))
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some("") => true,
        Some(rest) => cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

// Directory of the request path, per RFC 6265 section 5.1.4.
fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => request_path[..index].to_string(),
    }
}
