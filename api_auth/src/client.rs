//! Authenticated request pipeline.
//!
//! Every call goes through [`ApiClient::send`]: the bearer token is attached,
//! and a 401 on a protected endpoint joins the single refresh cycle managed by
//! [`RefreshGate`]. A request is resubmitted at most once; any other failure is
//! handed back to the caller untouched.

use std::{sync::Arc, time::Instant};

use common::{
    env_config::Config,
    error::{AppError, Res},
    http::{ApiRequest, ApiResponse},
};
use log::{info, warn};
use logger::exchange::{self, Exchange};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::{
    dtos::auth::AuthResponse,
    listener::{LoginRedirect, SessionListener},
    refresh::{RefreshGate, RefreshOutcome},
    session::SessionStore,
    transport::{ReqwestTransport, Transport},
};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ACCEPT_INVITE_PATH: &str = "/auth/accept-invite";
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Endpoints whose 401 means bad credentials rather than an expired session.
const REFRESH_EXEMPT: [&str; 4] = [LOGIN_PATH, REGISTER_PATH, ACCEPT_INVITE_PATH, REFRESH_PATH];

pub fn is_refresh_exempt(endpoint: &str) -> bool {
    REFRESH_EXEMPT.contains(&endpoint)
}

pub struct ApiClient {
    base_url: Url,
    login_path: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    gate: RefreshGate,
    listener: Arc<dyn SessionListener>,
}

impl ApiClient {
    /// Builds a client over `reqwest` from the loaded configuration.
    pub fn new(config: &Config) -> Res<Self> {
        let session = Arc::new(SessionStore::new());
        let transport = ReqwestTransport::new(session.clone(), config.request_timeout)?;
        Ok(Self::with_transport(config.api_base_url.clone(), Arc::new(transport), session)
            .with_login_path(config.login_path.clone()))
    }

    pub fn with_transport(
        base_url: Url,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
    ) -> Self {
        ApiClient {
            base_url,
            login_path: "/login".to_string(),
            transport,
            session,
            gate: RefreshGate::new(),
            listener: Arc::new(LoginRedirect),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_login_path(mut self, login_path: String) -> Self {
        self.login_path = login_path;
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Sends `request`, recovering once from an expired access token.
    pub async fn send(&self, request: ApiRequest) -> Res<ApiResponse> {
        let request_id = Uuid::new_v4().to_string();
        let sent_token = self.session.access_token();

        let response = self
            .dispatch(&request_id, &request, sent_token.as_deref(), false)
            .await?;
        if !response.is_unauthorized() || is_refresh_exempt(request.endpoint()) {
            return response.error_for_status();
        }

        // Another request may already have replaced the token this one was
        // rejected with; the gate checks under its lock before leading a cycle.
        let outcome = self
            .gate
            .acquire_or_wait(
                || {
                    self.session
                        .access_token()
                        .filter(|current| Some(current) != sent_token.as_ref())
                },
                move || self.refresh_cycle(),
            )
            .await;
        let RefreshOutcome::Refreshed(token) = outcome else {
            return Err(AppError::SessionExpired);
        };

        let retried = self
            .dispatch(&request_id, &request, Some(&token), true)
            .await?;
        // A second 401 is final; there is no further cycle for this request.
        retried.error_for_status()
    }

    /// Sends `request` and decodes the response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Res<T> {
        self.send(request).await?.json()
    }

    /// Exchanges the refresh credential for a new access token.
    ///
    /// Bypasses the pipeline: no bearer header is attached and a failure is
    /// never itself refreshed.
    pub async fn refresh(&self) -> Res<String> {
        let request_id = Uuid::new_v4().to_string();
        let request = ApiRequest::post(REFRESH_PATH);
        let response = self
            .dispatch(&request_id, &request, None, false)
            .await?
            .error_for_status()?;
        let body: AuthResponse = response.json()?;
        let token = body
            .access_token
            .ok_or_else(|| AppError::Unauthorized("Refresh response carried no token".to_string()))?;
        self.session.set_access_token(token.clone());
        Ok(token)
    }

    // Runs only on the cycle leader.
    async fn refresh_cycle(&self) -> RefreshOutcome {
        info!("Access token rejected, refreshing session");
        match self.refresh().await {
            Ok(token) => {
                info!("Session refreshed");
                RefreshOutcome::Refreshed(token)
            }
            Err(error) => {
                warn!("Session refresh failed: {}", error);
                self.session.clear();
                self.listener.on_session_expired(&self.login_path);
                RefreshOutcome::Failed(error.to_string())
            }
        }
    }

    async fn dispatch(
        &self,
        request_id: &str,
        request: &ApiRequest,
        bearer: Option<&str>,
        retried: bool,
    ) -> Res<ApiResponse> {
        let url = request.url(&self.base_url)?;
        let bearer = if request.endpoint() == REFRESH_PATH {
            None
        } else {
            bearer
        };
        if let Some(body) = &request.body {
            exchange::log_request_body(request_id, body);
        }

        let started = Instant::now();
        let response = match self.transport.execute(request, &url, bearer).await {
            Ok(response) => response,
            Err(error) => {
                exchange::log_transport_failure(request.method.as_str(), &request.path, &error);
                return Err(error);
            }
        };

        exchange::log_exchange(&Exchange {
            request_id,
            method: request.method.as_str(),
            path: &request.path,
            status: response.status,
            elapsed: started.elapsed(),
            retried,
        });
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_entry_points_are_exempt() {
        assert!(is_refresh_exempt("/auth/login"));
        assert!(is_refresh_exempt("/auth/register"));
        assert!(is_refresh_exempt("/auth/accept-invite"));
        assert!(is_refresh_exempt("/auth/refresh"));
        assert!(!is_refresh_exempt("/auth/profile"));
        assert!(!is_refresh_exempt("/members"));
    }
}
