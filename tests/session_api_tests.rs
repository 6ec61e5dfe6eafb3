/// Session API integration tests
/// Drives the full router with a stub authorizer in place of the upstream service
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use terrabaq::{
    authorizer::Authorizer,
    config::ServerConfig,
    context::AppContext,
    error::{GatewayError, GatewayResult},
    server::build_router,
    session::{ClientAccessRequest, UserIdentity},
};
use tower::ServiceExt;

/// Maps auth codes to identities; unknown codes are rejected upstream
struct StubAuthorizer;

#[async_trait]
impl Authorizer for StubAuthorizer {
    async fn exchange(&self, request: &ClientAccessRequest) -> GatewayResult<UserIdentity> {
        match request.auth_code.as_str() {
            "code-a" => Ok(UserIdentity::new("A", "a@x.com")),
            "code-b" => Ok(UserIdentity::new("B", "b@x.com").with_role("viewer", "r9")),
            _ => Err(GatewayError::Upstream("Authorizer returned error: 401".to_string())),
        }
    }
}

fn create_app() -> Router {
    let ctx = AppContext::with_authorizer(ServerConfig::default(), Arc::new(StubAuthorizer));
    build_router(ctx)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn issue(app: &Router, code: &str) -> String {
    let request = post_json(
        "/new_session",
        json!({
            "grant_type": "authorization_code",
            "auth_code": code,
            "client": {"name": "app", "id": "app-id", "secret": "s", "redirect_uri": "https://app/cb"}
        }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_text(response).await
}

async fn enqueue(app: &Router, token: &str) -> Response {
    app.clone()
        .oneshot(post_json("/enqueue", json!({ "session_token": token })))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_session_flow() {
    let app = create_app();

    let token = issue(&app, "code-a").await;
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    let response = enqueue(&app, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let user: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(user, json!({"name": "A", "email": "a@x.com"}));

    let response = app
        .clone()
        .oneshot(post_json(
            "/update_roles",
            json!({
                "old_user": {"name": "A", "email": "a@x.com"},
                "new_user": {
                    "name": "A",
                    "email": "a@x.com",
                    "roles": [{"type": "admin", "resource_id": "r1"}]
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, token);

    let response = enqueue(&app, &token).await;
    let user: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(user["roles"], json!([{"type": "admin", "resource_id": "r1"}]));
}

#[tokio::test]
async fn test_legacy_root_issues_sessions() {
    let app = create_app();

    let request = post_json(
        "/",
        json!({"grant_type": "authorization_code", "auth_code": "code-b", "client": {"redirect_uri": ""}}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_text(response).await;

    let response = enqueue(&app, &token).await;
    let user: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(user["name"], "B");
    assert_eq!(user["roles"][0]["type"], "viewer");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let app = create_app();
    issue(&app, "code-a").await;

    let response = enqueue(&app, "ffffffffffffffffffffffffffffffff").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "InvalidSession");
}

#[tokio::test]
async fn test_update_for_unknown_identity_is_unauthorized() {
    let app = create_app();
    issue(&app, "code-a").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/update_roles",
            json!({
                "old_user": {"name": "X", "email": "x@x.com"},
                "new_user": {"name": "X", "email": "x@x.com", "roles": [{"type": "admin", "resource_id": "r1"}]}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upstream_rejection_is_bad_gateway() {
    let app = create_app();

    let request = post_json(
        "/new_session",
        json!({"grant_type": "authorization_code", "auth_code": "bogus", "client": {}}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "UpstreamError");

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health: Value = serde_json::from_str(&body_text(health).await).unwrap();
    assert_eq!(health["sessions"], 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = create_app();

    for uri in ["/new_session", "/enqueue", "/update_roles"] {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"], "InvalidRequest");
    }
}

#[tokio::test]
async fn test_method_rules() {
    let app = create_app();

    for uri in ["/", "/new_session", "/enqueue", "/update_roles"] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "GET {}", uri);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "OPTIONS {}", uri);
    }
}

#[tokio::test]
async fn test_cors_headers() {
    let app = create_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/enqueue")
        .header(header::ORIGIN, "https://client.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-csrf-token")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST") && methods.contains("DELETE"));
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(allowed.contains("x-csrf-token"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = create_app();

    let response = app
        .clone()
        .oneshot(
            Request::get("/nope")
                .header(header::ORIGIN, "https://client.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_update_accepts_loose_role_payloads() {
    let app = create_app();
    let token = issue(&app, "code-b").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/update_roles",
            json!({
                "old_user": {"name": "B", "email": "b@x.com", "roles": [{"type": "viewer", "resource_id": "r9"}]},
                "new_user": {"name": "B", "email": "b@x.com", "roles": [{"type": "admin"}]}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, token);

    let response = app
        .clone()
        .oneshot(post_json(
            "/update_roles",
            json!({
                "old_user": {"name": "B", "email": "b@x.com", "roles": [{"type": "admin", "resource_id": ""}]},
                "new_user": {"name": "B", "email": "b@x.com", "roles": null}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user: Value = serde_json::from_str(&body_text(enqueue(&app, &token).await).await).unwrap();
    assert_eq!(user, json!({"name": "B", "email": "b@x.com"}));
}

#[tokio::test]
async fn test_reissue_gives_independent_tokens() {
    let app = create_app();

    let first = issue(&app, "code-a").await;
    let second = issue(&app, "code-a").await;
    assert_ne!(first, second);

    for token in [&first, &second] {
        assert_eq!(enqueue(&app, token).await.status(), StatusCode::OK);
    }

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health: Value = serde_json::from_str(&body_text(health).await).unwrap();
    assert_eq!(health["sessions"], 2);
    assert_eq!(health["identityKeys"], 1);
}
