use log::warn;

/// Told when the session is lost for good and the user must sign in again.
pub trait SessionListener: Send + Sync {
    fn on_session_expired(&self, login_path: &str);
}

/// Default listener: records the redirect to the login entry point.
pub struct LoginRedirect;

impl SessionListener for LoginRedirect {
    fn on_session_expired(&self, login_path: &str) {
        warn!("Session could not be refreshed, redirecting to {}", login_path);
    }
}
