/// Configuration management for the Terrabaq gateway
use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::env;
use tracing_subscriber::EnvFilter;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub authorizer: AuthorizerConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Upstream authorizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizerConfig {
    /// Base URL, always ending in `/`; `client/auth` is appended to it
    pub base_url: String,
    /// Timeout for a single exchange call, in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `terrabaq=debug,tower_http=debug`
    pub level: String,
}

impl LoggingConfig {
    /// Filter for the tracing subscriber; falls back to the default
    /// directives when `level` does not parse
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

/// Log directives used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "terrabaq=debug,tower_http=debug";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                hostname: "0.0.0.0".to_string(),
                port: 3000,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            authorizer: AuthorizerConfig {
                base_url: "https://pukka.terraling.com/".to_string(),
                timeout_secs: 10,
                user_agent: format!("Terrabaq/{}", env!("CARGO_PKG_VERSION")),
            },
            logging: LoggingConfig {
                level: DEFAULT_LOG_FILTER.to_string(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let hostname = env::var("TERRABAQ_HOSTNAME").unwrap_or(defaults.service.hostname);
        let port = match env::var("TERRABAQ_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| GatewayError::Internal(format!("Invalid port number: {}", raw)))?,
            Err(_) => defaults.service.port,
        };

        let base_url = env::var("TERRABAQ_AUTHORIZER_URL")
            .map(|url| normalize_base_url(&url))
            .unwrap_or(defaults.authorizer.base_url);
        let timeout_secs = env::var("TERRABAQ_AUTHORIZER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.authorizer.timeout_secs);
        let user_agent =
            env::var("TERRABAQ_USER_AGENT").unwrap_or(defaults.authorizer.user_agent);

        let level = env::var("RUST_LOG").unwrap_or(defaults.logging.level);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version: defaults.service.version,
            },
            authorizer: AuthorizerConfig {
                base_url,
                timeout_secs,
                user_agent,
            },
            logging: LoggingConfig { level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GatewayResult<()> {
        if self.service.hostname.is_empty() {
            return Err(GatewayError::Internal("Hostname cannot be empty".to_string()));
        }

        if self.service.port == 0 {
            return Err(GatewayError::Internal("Port cannot be 0".to_string()));
        }

        let url = reqwest::Url::parse(&self.authorizer.base_url).map_err(|e| {
            GatewayError::Internal(format!(
                "Invalid authorizer URL {}: {}",
                self.authorizer.base_url, e
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(GatewayError::Internal(format!(
                "Authorizer URL must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.authorizer.timeout_secs == 0 {
            return Err(GatewayError::Internal(
                "Authorizer timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

/// Ensure the authorizer base URL ends with a single `/`
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
