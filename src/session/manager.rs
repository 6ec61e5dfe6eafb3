/// Session manager - ties the authorizer to the session store
use super::{ClientAccessRequest, SessionStats, SessionStore, SessionToken, UpdateRolesRequest, UserIdentity};
use crate::{authorizer::Authorizer, error::GatewayResult};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    authorizer: Arc<dyn Authorizer>,
}

impl SessionManager {
    pub fn new(store: SessionStore, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { store, authorizer }
    }

    /// Exchange an authorization code and open a session for the result.
    ///
    /// The authorizer call runs without touching the store lock.
    pub async fn issue(&self, request: ClientAccessRequest) -> GatewayResult<SessionToken> {
        let user = self.authorizer.exchange(&request).await.map_err(|e| {
            error!("Code exchange failed: {}", e);
            e
        })?;

        let token = self.store.insert(user).await?;
        info!("New session issued");
        Ok(token)
    }

    /// Return the identity behind `token`
    pub async fn resolve(&self, token: &str) -> GatewayResult<UserIdentity> {
        let user = self.store.resolve(token).await?;
        debug!("Session resolved");
        Ok(user)
    }

    /// Swap the stored identity for the session `old_user` belongs to
    pub async fn update_roles(&self, request: UpdateRolesRequest) -> GatewayResult<SessionToken> {
        let token = self
            .store
            .update_by_identity(&request.old_user, request.new_user)
            .await?;
        info!("Session roles updated");
        Ok(token)
    }

    pub async fn stats(&self) -> SessionStats {
        self.store.stats().await
    }
}
