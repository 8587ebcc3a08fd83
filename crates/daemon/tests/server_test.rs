//! End-to-end tests against the assembled daemon router

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bazaar_core::access::GrantFlags;
use bazaar_daemon::{ServerBuilder, Settings, commands, connect_store};
use serde_json::{Value, json};
use tower::ServiceExt;

fn settings(protect_administration: bool) -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt.secret = "integration-secret".to_string();
    settings.auth.protect_administration = protect_administration;
    settings.database.url = "sqlite::memory:".to_string();
    settings
}

async fn app(settings: &Settings) -> Router {
    let store = connect_store(settings).await.unwrap();
    ServerBuilder::new(settings.clone(), store).build()
}

fn set_permission_request(body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/set-permission")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_and_docs() {
    let app = app(&settings(false)).await;

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");

    let response = app
        .oneshot(Request::get("/docs/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_open_administration_round_trip() {
    let app = app(&settings(false)).await;

    let response = app
        .clone()
        .oneshot(set_permission_request(
            json!({ "roleId": "admin", "resource": "Order", "canView": true, "canEdit": true }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/permissions/admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body[0]["resource"], "Order");
    assert_eq!(body[0]["canEdit"], true);
    assert_eq!(body[0]["canDelete"], false);
}

#[tokio::test]
async fn test_protected_administration_with_issued_token() {
    let settings = settings(true);
    let store = connect_store(&settings).await.unwrap();
    store
        .upsert_grant(
            &"admin".into(),
            &"Permission".into(),
            GrantFlags::new(true, true, false),
        )
        .await
        .unwrap();
    let app = ServerBuilder::new(settings.clone(), store).build();

    let body = json!({ "roleId": "viewer", "resource": "Payout", "canView": true });

    let response = app
        .clone()
        .oneshot(set_permission_request(body.clone(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let viewer = commands::issue_token(&settings, "user-2", Some("viewer"), None).unwrap();
    let response = app
        .clone()
        .oneshot(set_permission_request(body.clone(), Some(&viewer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = commands::issue_token(&settings, "user-1", Some("admin"), None).unwrap();
    let response = app
        .oneshot(set_permission_request(body, Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
