/// Session endpoints: issue, enqueue, update_roles
use crate::{
    api::extract::JsonBody,
    context::AppContext,
    error::GatewayResult,
    session::{ClientAccessRequest, EnqueueRequest, UpdateRolesRequest, UserIdentity},
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, MethodRouter},
    Json, Router,
};

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", session_route(post(new_session)))
        .route("/new_session", session_route(post(new_session)))
        .route("/enqueue", session_route(post(enqueue)))
        .route("/update_roles", session_route(post(update_roles)))
}

/// POST handler plus the gateway's method rules: OPTIONS answers 200 with an
/// empty body, every other method is unauthorized.
fn session_route(handler: MethodRouter<AppContext>) -> MethodRouter<AppContext> {
    handler
        .options(|| async { StatusCode::OK })
        .fallback(|| async { StatusCode::UNAUTHORIZED })
}

/// Exchange an authorization code for a new session token
async fn new_session(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<ClientAccessRequest>,
) -> GatewayResult<String> {
    tracing::info!("new_session: client {:?} exchanging code", req.client.name);

    let token = ctx.sessions.issue(req).await?;

    Ok(token.into_inner())
}

/// Redeem a session token for the stored identity
async fn enqueue(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<EnqueueRequest>,
) -> GatewayResult<Json<UserIdentity>> {
    let user = ctx.sessions.resolve(&req.session_token).await?;

    Ok(Json(user))
}

/// Replace the identity of the session the old identity belongs to
async fn update_roles(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<UpdateRolesRequest>,
) -> GatewayResult<String> {
    let token = ctx.sessions.update_roles(req).await.map_err(|e| {
        tracing::warn!("update_roles: {}", e);
        e
    })?;

    Ok(token.into_inner())
}
