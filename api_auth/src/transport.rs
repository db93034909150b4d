use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use common::{
    error::Res,
    http::{ApiRequest, ApiResponse},
};
use reqwest::Client;
use url::Url;

use crate::session::SessionStore;

/// Executes a single HTTP exchange with the backend.
///
/// Implementations do not interpret the status code; the pipeline in
/// [`crate::client::ApiClient`] decides what a 401 means.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        request: &ApiRequest,
        url: &Url,
        bearer: Option<&str>,
    ) -> Res<ApiResponse>;
}

/// Production transport backed by a pooled `reqwest` client.
///
/// The session store is installed as the cookie provider, so cookies the
/// backend sets (the refresh credential among them) travel with every call.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(session: Arc<SessionStore>, timeout: Option<Duration>) -> Res<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(10)
            .cookie_provider(session);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(ReqwestTransport {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        url: &Url,
        bearer: Option<&str>,
    ) -> Res<ApiResponse> {
        let mut builder = self.client.request(request.method.clone(), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(ApiResponse { status, body })
    }
}
