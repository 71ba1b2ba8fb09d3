//! GraphQL-over-HTTP executor backed by `reqwest` and the fetch cache.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, error, warn};
use url::Url;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest, GraphqlResponse};
use crate::cache::{CachePolicy, FetchCache, FetchKey};
use crate::config::{ContentSettings, LiveEnv};

use super::error::InfraError;

const TARGET: &str = "presswire::graphql";

pub struct GraphqlClient {
    http: Client,
    loaded: ContentSettings,
    env: LiveEnv,
    cache: Arc<FetchCache>,
}

impl GraphqlClient {
    pub fn new(settings: &ContentSettings, cache: Arc<FetchCache>) -> Result<Self, InfraError> {
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(InfraError::HttpClient)?;
        Ok(Self {
            http,
            loaded: settings.clone(),
            env: LiveEnv::process(),
            cache,
        })
    }

    /// Resolve the endpoint and token through `env` instead of the process environment.
    pub fn with_env(mut self, env: LiveEnv) -> Self {
        self.env = env;
        self
    }

    pub fn user_agent() -> &'static str {
        concat!("presswire/", env!("CARGO_PKG_VERSION"))
    }

    pub fn cache(&self) -> &Arc<FetchCache> {
        &self.cache
    }

    fn cached(&self, key: &FetchKey, operation: &'static str) -> Option<GraphqlResponse> {
        let body = self.cache.get(key)?;
        match serde_json::from_slice(&body) {
            Ok(envelope) => {
                debug!(target: TARGET, operation, key = %key, "Serving response from fetch cache");
                Some(envelope)
            }
            Err(err) => {
                warn!(
                    target: TARGET,
                    operation,
                    error = %err,
                    "Cached response could not be decoded; refetching"
                );
                None
            }
        }
    }

    async fn send(
        &self,
        endpoint: &Url,
        auth_token: Option<&str>,
        operation: &'static str,
        body: Vec<u8>,
    ) -> Result<Bytes, ContentError> {
        let mut builder = self
            .http
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|err| {
            error!(target: TARGET, operation, error = %err, "Content API request failed");
            ContentError::transport(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            error!(target: TARGET, operation, error = %err, "Reading content API response failed");
            ContentError::transport(err)
        })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            error!(
                target: TARGET,
                operation,
                status = status.as_u16(),
                body = %body,
                "Content API responded with an error status"
            );
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(bytes)
    }
}

#[async_trait]
impl ContentTransport for GraphqlClient {
    async fn execute(
        &self,
        request: GraphqlRequest,
        policy: &CachePolicy,
    ) -> Result<GraphqlResponse, ContentError> {
        let operation = request.operation;
        let settings = self.env.content(&self.loaded).map_err(|err| {
            error!(target: TARGET, operation, error = %err, "Content endpoint is invalid");
            ContentError::InvalidEndpoint {
                reason: err.to_string(),
            }
        })?;
        let Some(endpoint) = settings.graphql_url.as_ref() else {
            error!(target: TARGET, operation, "Content endpoint is not configured");
            return Err(ContentError::MissingEndpoint);
        };

        let body = serde_json::to_vec(&request)
            .map_err(|source| ContentError::Encode { operation, source })?;
        let key = FetchKey::new(endpoint.as_str(), &body);

        if !policy.is_no_store()
            && let Some(envelope) = self.cached(&key, operation)
        {
            return Ok(envelope);
        }

        let bytes = self
            .send(endpoint, settings.auth_token.as_deref(), operation, body)
            .await?;
        let envelope: GraphqlResponse = serde_json::from_slice(&bytes).map_err(|source| {
            error!(target: TARGET, operation, error = %source, "Content API response was not JSON");
            ContentError::Decode { operation, source }
        })?;

        if envelope.has_errors() {
            warn!(
                target: TARGET,
                operation,
                errors = ?envelope.error_messages(),
                "Content API reported errors"
            );
        } else {
            self.cache.put(key, bytes, policy);
        }

        Ok(envelope)
    }
}
