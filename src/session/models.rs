/// Session data models
use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Application requesting user data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(default)]
    pub redirect_uri: String,
}

/// Authorization-code exchange forwarded to the authorizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAccessRequest {
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub auth_code: String,
    #[serde(default)]
    pub client: Client,
}

/// Authorizer response to a successful exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAccessResponse {
    pub user: UserIdentity,
}

/// A (type, resource) grant. Never interpreted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "type", default)]
    pub role_type: String,
    #[serde(default)]
    pub resource_id: String,
}

/// User identity as resolved by the authorizer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub roles: Vec<Role>,
}

/// Reverse-index view of an identity. The password is only carried through
/// from the authorizer and never takes part in matching.
#[derive(Serialize)]
struct CanonicalIdentity<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "<[Role]>::is_empty")]
    roles: &'a [Role],
}

impl UserIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: None,
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        self.roles.push(Role {
            role_type: role_type.into(),
            resource_id: resource_id.into(),
        });
        self
    }

    /// Deterministic encoding used as the reverse-index key.
    ///
    /// Compact JSON of name, email and roles in that order; the password is
    /// left out and an empty role list is omitted.
    pub fn canonical(&self) -> GatewayResult<String> {
        let view = CanonicalIdentity {
            name: &self.name,
            email: &self.email,
            roles: &self.roles,
        };
        serde_json::to_string(&view)
            .map_err(|e| GatewayError::Internal(format!("Failed to encode identity: {}", e)))
    }
}

/// `""` and a missing password are the same identity
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// `null` and a missing role list are both no roles
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Role>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Opaque bearer token, 32 lowercase hex characters when well-formed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// An empty token signals a failed draw and must never be stored
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request body for `/enqueue`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub session_token: String,
}

/// Request body for `/update_roles`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRolesRequest {
    pub old_user: UserIdentity,
    pub new_user: UserIdentity,
}
