//! HTTP implementation of the session transport.

use std::time::Duration;

use async_trait::async_trait;
use questline_core::error::TransportError;
use questline_core::step::SessionId;
use questline_core::transport::{
    AdvanceRequest, AdvanceResponse, RestartSessionRequest, RestartSessionResponse,
    SessionTransport, StartSessionRequest, StartSessionResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::wire::{AdvanceForm, RestartForm, StartEnvelope, StartForm, StepEnvelope};

const START_ENDPOINT: &str = "start_game";
const ADVANCE_ENDPOINT: &str = "next_step";
const RESTART_ENDPOINT: &str = "restart_game";
const PING_ENDPOINT: &str = "ping";

/// Body of the server's health check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PingResponse {
    /// `"ok"` when the server is healthy.
    pub status: String,
    /// Human-readable detail.
    #[serde(default)]
    pub message: String,
}

/// Talks to the story server over HTTP.
///
/// Endpoints are resolved against `base_url`; resource locators in returned
/// steps are resolved against the server origin so that the media layer
/// always receives absolute URLs.
#[derive(Debug, Clone)]
pub struct HttpSessionTransport {
    client: Client,
    base_url: Url,
}

impl HttpSessionTransport {
    /// Creates a transport with its own client and the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Network` if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// The API base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a resource locator returned by the server.
    ///
    /// Absolute URLs are returned unchanged; paths (with or without a leading
    /// slash) are resolved against the server origin. Unparseable locators
    /// are passed through as-is and left for the media layer to reject.
    #[must_use]
    pub fn resolve_resource(&self, locator: &str) -> String {
        self.base_url
            .join("/")
            .and_then(|origin| origin.join(locator))
            .map_or_else(|_| locator.to_owned(), String::from)
    }

    /// Probes the server's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the server is unreachable, answers with a
    /// non-success status, or returns an unexpected body.
    pub async fn ping(&self) -> Result<PingResponse, TransportError> {
        let url = self.endpoint(PING_ENDPOINT)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        decode_response(response).await
    }

    fn endpoint(&self, name: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(name)
            .map_err(|e| TransportError::Network(format!("invalid endpoint {name}: {e}")))
    }

    async fn post_form<F, R>(&self, endpoint: &str, form: &F) -> Result<R, TransportError>
    where
        F: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(endpoint)?;
        debug!(%url, "posting form");

        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint, error = %e, "request failed");
                TransportError::Network(e.to_string())
            })?;

        decode_response(response).await
    }
}

async fn decode_response<R: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<R, TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "server rejected request");
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, "failed to decode response body");
        TransportError::Decode(e.to_string())
    })
}

#[async_trait]
impl SessionTransport for HttpSessionTransport {
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<StartSessionResponse, TransportError> {
        let form = StartForm {
            theme: &request.theme,
            session_seed: &request.session_seed,
        };
        let envelope: StartEnvelope = self.post_form(START_ENDPOINT, &form).await?;

        Ok(StartSessionResponse {
            session_id: SessionId::new(envelope.session_id),
            step: envelope
                .step
                .into_step(|locator| self.resolve_resource(locator)),
        })
    }

    async fn advance(&self, request: AdvanceRequest) -> Result<AdvanceResponse, TransportError> {
        let form = AdvanceForm {
            session_id: request.session_id.as_str(),
            current_step_id: request.current_step_id.as_str(),
            choice_index: request.choice_index,
        };
        let envelope: StepEnvelope = self.post_form(ADVANCE_ENDPOINT, &form).await?;

        Ok(AdvanceResponse {
            step: envelope
                .step
                .into_step(|locator| self.resolve_resource(locator)),
        })
    }

    async fn restart_session(
        &self,
        request: RestartSessionRequest,
    ) -> Result<RestartSessionResponse, TransportError> {
        let form = RestartForm {
            session_id: request.session_id.as_str(),
        };
        let envelope: StepEnvelope = self.post_form(RESTART_ENDPOINT, &form).await?;

        Ok(RestartSessionResponse {
            step: envelope
                .step
                .into_step(|locator| self.resolve_resource(locator)),
        })
    }
}
