/// Application context and dependency injection
use crate::{
    authorizer::{Authorizer, HttpAuthorizer},
    config::ServerConfig,
    error::GatewayResult,
    session::{SessionManager, SessionStore},
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub fn new(config: ServerConfig) -> GatewayResult<Self> {
        config.validate()?;

        let authorizer = Arc::new(HttpAuthorizer::new(&config.authorizer)?);
        tracing::info!("Authorizer endpoint: {}", authorizer.endpoint());

        Ok(Self::with_authorizer(config, authorizer))
    }

    /// Build a context around an existing authorizer backend
    pub fn with_authorizer(config: ServerConfig, authorizer: Arc<dyn Authorizer>) -> Self {
        let sessions = SessionManager::new(SessionStore::new(), authorizer);

        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.config.service.hostname, self.config.service.port)
    }
}
