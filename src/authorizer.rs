/// Upstream authorizer client
///
/// Exchanges an authorization code for the user identity it was issued to.
use crate::{
    config::AuthorizerConfig,
    error::{GatewayError, GatewayResult},
    session::{ClientAccessRequest, ClientAccessResponse, UserIdentity},
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Path appended to the authorizer base URL
pub const EXCHANGE_PATH: &str = "client/auth";

/// Authorization-code exchange backend
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Trade `request` for the identity it authorizes
    async fn exchange(&self, request: &ClientAccessRequest) -> GatewayResult<UserIdentity>;
}

/// Authorizer reached over HTTP
#[derive(Clone)]
pub struct HttpAuthorizer {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpAuthorizer {
    /// Create a new HTTP authorizer client
    pub fn new(config: &AuthorizerConfig) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", config.base_url, EXCHANGE_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Authorizer for HttpAuthorizer {
    async fn exchange(&self, request: &ClientAccessRequest) -> GatewayResult<UserIdentity> {
        debug!(endpoint = %self.endpoint, grant_type = %request.grant_type, "Forwarding code exchange");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the authorizer URL; keep it in the logs only
                warn!("Failed to reach authorizer: {}", e);
                if e.is_timeout() {
                    GatewayError::Upstream("Authorizer request timed out".to_string())
                } else {
                    GatewayError::Upstream("Authorizer unreachable".to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Authorizer rejected code exchange");
            return Err(GatewayError::Upstream(format!(
                "Authorizer returned error: {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!("Failed to read authorizer response: {}", e);
            GatewayError::Upstream("Failed to read authorizer response".to_string())
        })?;

        let parsed: ClientAccessResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(body = %String::from_utf8_lossy(&body), "Unparseable authorizer response: {}", e);
            GatewayError::Upstream("Invalid authorizer response".to_string())
        })?;

        Ok(parsed.user)
    }
}
