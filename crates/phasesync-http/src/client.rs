use std::time::Duration;

use async_trait::async_trait;
use phasesync_api::{ApiError, ApiResult, TrackerApi};
use phasesync_core::{
    DeliverableChanges, NewDeliverable, NewPhase, PersistedDeliverable, PersistedPhase,
    PhaseChanges, PhaseDetail,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::auth::AuthHeader;

/// Connection settings for [`HttpTrackerClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub auth: Option<AuthHeader>,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            auth: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthHeader) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// JSON-over-HTTP implementation of [`TrackerApi`].
pub struct HttpTrackerClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<AuthHeader>,
}

impl HttpTrackerClient {
    pub fn new(settings: ClientSettings) -> ApiResult<Self> {
        url::Url::parse(&settings.base_url).map_err(|e| {
            ApiError::invalid_request(format!("invalid base URL '{}': {e}", settings.base_url))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth: settings.auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, url);
        let req = match &self.auth {
            Some(auth) => auth.apply(req),
            None => req,
        };
        req.header("Accept", "application/json")
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        req.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::transport(format!("request timed out: {e}"))
            } else {
                ApiError::transport(format!("failed to connect to server: {e}"))
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        target: Option<(&str, &str)>,
    ) -> ApiResult<T> {
        let url = self.url(path);
        debug!(method = "GET", %url, "tracker request");
        let resp = self.send(self.request(Method::GET, &url)).await?;
        handle_response(resp, target).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        target: Option<(&str, &str)>,
    ) -> ApiResult<T> {
        let url = self.url(path);
        debug!(method = %method, %url, "tracker request");
        let resp = self
            .send(self.request(method, &url).json(body))
            .await?;
        handle_response(resp, target).await
    }
}

#[async_trait]
impl TrackerApi for HttpTrackerClient {
    async fn list_phases(&self) -> ApiResult<Vec<PersistedPhase>> {
        self.get_json("phases", None).await
    }

    async fn create_phase(&self, phase: &NewPhase) -> ApiResult<PersistedPhase> {
        self.send_json(Method::POST, "phases", phase, None).await
    }

    async fn update_phase(&self, id: &str, changes: &PhaseChanges) -> ApiResult<PersistedPhase> {
        self.send_json(
            Method::PUT,
            &format!("phases/{id}"),
            changes,
            Some(("phase", id)),
        )
        .await
    }

    async fn get_phase_detail(&self, id: &str) -> ApiResult<PhaseDetail> {
        self.get_json(&format!("phases/{id}"), Some(("phase", id)))
            .await
    }

    async fn create_deliverable(
        &self,
        deliverable: &NewDeliverable,
    ) -> ApiResult<PersistedDeliverable> {
        self.send_json(Method::POST, "deliverables", deliverable, None)
            .await
    }

    async fn update_deliverable(
        &self,
        id: &str,
        changes: &DeliverableChanges,
    ) -> ApiResult<PersistedDeliverable> {
        self.send_json(
            Method::PUT,
            &format!("deliverables/{id}"),
            changes,
            Some(("deliverable", id)),
        )
        .await
    }

    async fn delete_deliverable(&self, id: &str) -> ApiResult<()> {
        let url = self.url(&format!("deliverables/{id}"));
        debug!(method = "DELETE", %url, "tracker request");
        let resp = self.send(self.request(Method::DELETE, &url)).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found("deliverable", id));
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::status(status.as_u16(), error_message(&body)))
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    target: Option<(&str, &str)>,
) -> ApiResult<T> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if status == StatusCode::NOT_FOUND
        && let Some((resource, id)) = target
    {
        return Err(ApiError::not_found(resource, id));
    }
    if !status.is_success() {
        return Err(ApiError::status(status.as_u16(), error_message(&body)));
    }

    serde_json::from_str(&body)
        .map_err(|e| ApiError::decode(format!("failed to parse response JSON: {e}")))
}

/// Pulls a human-readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let candidates = [
            json.get("error").and_then(|v| v.as_str()),
            json.get("message").and_then(|v| v.as_str()),
            json.get("error")
                .and_then(|v| v.get("message"))
                .and_then(|v| v.as_str()),
        ];
        if let Some(msg) = candidates.into_iter().flatten().next() {
            return msg.to_string();
        }
    }
    if body.trim().is_empty() {
        "empty response body".to_string()
    } else {
        body.trim().to_string()
    }
}
