/// In-memory session store
///
/// Holds two tables behind a single lock:
/// - `by_token`: session token -> user identity (primary)
/// - `by_identity`: canonical identity -> session token (reverse index for
///   identity-keyed updates)
///
/// Entries are never removed. Reverse keys for identities that were later
/// updated stay in place and keep pointing at their token, so memory grows
/// with every distinct identity ever seen.
use super::{OsTokenGenerator, SessionToken, TokenGenerator, UserIdentity};
use crate::error::{GatewayError, GatewayResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Default)]
struct SessionTables {
    by_token: HashMap<SessionToken, UserIdentity>,
    by_identity: HashMap<String, SessionToken>,
}

/// Counts reported by [`SessionStore::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub sessions: usize,
    pub identity_keys: usize,
}

/// Session store shared across request handlers
#[derive(Clone)]
pub struct SessionStore {
    tables: Arc<RwLock<SessionTables>>,
    generator: Arc<dyn TokenGenerator>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty store drawing tokens from the OS RNG
    pub fn new() -> Self {
        Self::with_generator(Arc::new(OsTokenGenerator))
    }

    /// Create an empty store with a custom token source
    pub fn with_generator(generator: Arc<dyn TokenGenerator>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(SessionTables::default())),
            generator,
        }
    }

    /// Mint a token for `user` and index it both ways.
    ///
    /// Re-inserting an identical identity creates a second token and moves
    /// the reverse key to it; the earlier token still resolves.
    pub async fn insert(&self, user: UserIdentity) -> GatewayResult<SessionToken> {
        let key = user.canonical()?;

        let mut tables = self.tables.write().await;

        let token = self.generator.generate();
        if token.is_empty() {
            return Err(GatewayError::Internal(
                "Failed to generate session token".to_string(),
            ));
        }
        if tables.by_token.contains_key(&token) {
            warn!("Generated session token collides with an existing session");
            return Err(GatewayError::Internal(
                "Session token collision".to_string(),
            ));
        }

        tables.by_token.insert(token.clone(), user);
        if tables.by_identity.insert(key, token.clone()).is_some() {
            debug!("Reverse index moved from an earlier session to the new one");
        }

        info!(sessions = tables.by_token.len(), "Session issued");
        Ok(token)
    }

    /// Look up the identity stored for `token`
    pub async fn resolve(&self, token: &str) -> GatewayResult<UserIdentity> {
        let tables = self.tables.read().await;

        tables
            .by_token
            .get(&SessionToken::new(token))
            .cloned()
            .ok_or_else(|| GatewayError::InvalidSession("Unknown session token".to_string()))
    }

    /// Replace the identity of the session that `old_user` maps to.
    ///
    /// The caller proves ownership only by presenting the exact prior
    /// identity. The old reverse key is kept, so `old_user` keeps reaching
    /// the same token after the update.
    pub async fn update_by_identity(
        &self,
        old_user: &UserIdentity,
        new_user: UserIdentity,
    ) -> GatewayResult<SessionToken> {
        let old_key = old_user.canonical()?;
        let new_key = new_user.canonical()?;

        let mut tables = self.tables.write().await;

        let token = tables
            .by_identity
            .get(&old_key)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidSession("Unknown identity".to_string()))?;

        tables.by_token.insert(token.clone(), new_user);
        tables.by_identity.insert(new_key, token.clone());

        info!(identity_keys = tables.by_identity.len(), "Session identity updated");
        Ok(token)
    }

    /// Current table sizes
    pub async fn stats(&self) -> SessionStats {
        let tables = self.tables.read().await;
        SessionStats {
            sessions: tables.by_token.len(),
            identity_keys: tables.by_identity.len(),
        }
    }
}
