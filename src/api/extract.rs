/// Request body extractors
use crate::error::GatewayError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// JSON body decoded without regard to `Content-Type`.
///
/// Clients post JSON with whatever content type their HTTP library picks, so
/// only the body is checked. Any failure becomes [`GatewayError::Decode`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| GatewayError::Decode(format!("Failed to read request body: {}", e)))?;

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::Decode(format!("Invalid request body: {}", e)))?;

        Ok(JsonBody(value))
    }
}
