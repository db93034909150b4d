//! In-memory backend used to drive the request pipeline.

#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use api_auth::{ApiClient, SessionListener, SessionStore, Transport};
use async_trait::async_trait;
use common::{
    error::Res,
    http::{ApiRequest, ApiResponse},
};
use serde_json::json;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub endpoint: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

pub enum RefreshBehavior {
    Issue(String),
    Reject,
}

pub struct FakeBackend {
    valid_token: Mutex<String>,
    refresh: Mutex<RefreshBehavior>,
    refresh_delay: Duration,
    slow_delay: Duration,
    calls: Mutex<Vec<Call>>,
    refresh_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new(valid_token: &str, refresh: RefreshBehavior) -> Arc<Self> {
        Arc::new(FakeBackend {
            valid_token: Mutex::new(valid_token.to_string()),
            refresh: Mutex::new(refresh),
            refresh_delay: Duration::from_millis(20),
            slow_delay: Duration::from_millis(80),
            calls: Mutex::new(Vec::new()),
            refresh_calls: AtomicUsize::new(0),
        })
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.endpoint == endpoint)
            .collect()
    }

    fn accepts(&self, bearer: Option<&str>) -> bool {
        bearer == Some(self.valid_token.lock().unwrap().as_str())
    }
}

fn respond(status: u16, body: serde_json::Value) -> Res<ApiResponse> {
    Ok(ApiResponse::new(status, body.to_string()))
}

#[async_trait]
impl Transport for FakeBackend {
    async fn execute(
        &self,
        request: &ApiRequest,
        _url: &Url,
        bearer: Option<&str>,
    ) -> Res<ApiResponse> {
        let endpoint = request.endpoint().to_string();
        self.calls.lock().unwrap().push(Call {
            method: request.method.to_string(),
            endpoint: endpoint.clone(),
            bearer: bearer.map(str::to_string),
            body: request.body.clone(),
        });

        match endpoint.as_str() {
            "/auth/refresh" => {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.refresh_delay).await;
                let issued = match &*self.refresh.lock().unwrap() {
                    RefreshBehavior::Issue(token) => Some(token.clone()),
                    RefreshBehavior::Reject => None,
                };
                match issued {
                    Some(token) => {
                        *self.valid_token.lock().unwrap() = token.clone();
                        respond(200, json!({ "accessToken": token }))
                    }
                    None => respond(401, json!({ "message": "Refresh token expired" })),
                }
            }
            "/auth/login" | "/auth/register" | "/auth/accept-invite" => {
                let password = request
                    .body
                    .as_ref()
                    .and_then(|body| body["password"].as_str())
                    .unwrap_or_default();
                let first_name = request
                    .body
                    .as_ref()
                    .and_then(|body| body["firstName"].as_str())
                    .unwrap_or_default();
                if password == "correct horse" && first_name == "Pending" {
                    // Account created, but sign-in waits for approval.
                    respond(201, json!({ "message": "Awaiting approval" }))
                } else if password == "correct horse" {
                    *self.valid_token.lock().unwrap() = "login-token".to_string();
                    respond(
                        200,
                        json!({
                            "accessToken": "login-token",
                            "user": { "_id": "admin-1", "email": "owner@gym.io" }
                        }),
                    )
                } else {
                    respond(401, json!({ "message": "Invalid credentials" }))
                }
            }
            "/slow" => {
                tokio::time::sleep(self.slow_delay).await;
                if self.accepts(bearer) {
                    respond(200, json!({ "endpoint": endpoint }))
                } else {
                    respond(401, json!({ "message": "jwt expired" }))
                }
            }
            "/always-401" => respond(401, json!({ "message": "Not allowed" })),
            "/boom" => respond(500, json!({ "message": "exploded" })),
            "/auth/profile" if self.accepts(bearer) => respond(
                200,
                json!({ "data": { "id": "admin-1", "email": "owner@gym.io", "firstName": "Ada" } }),
            ),
            _ if self.accepts(bearer) => respond(200, json!({ "endpoint": endpoint })),
            _ => respond(401, json!({ "message": "jwt expired" })),
        }
    }
}

#[derive(Default)]
pub struct RecordingListener {
    pub notified: AtomicUsize,
    pub last_path: Mutex<Option<String>>,
}

impl SessionListener for RecordingListener {
    fn on_session_expired(&self, login_path: &str) {
        self.notified.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(login_path.to_string());
    }
}

pub fn base_url() -> Url {
    Url::parse("http://backend.test/api/").unwrap()
}

pub fn client_with(
    backend: Arc<FakeBackend>,
    session: SessionStore,
    listener: Arc<RecordingListener>,
) -> ApiClient {
    ApiClient::with_transport(
        base_url(),
        backend,
        Arc::new(session),
    )
    .with_listener(listener)
}
