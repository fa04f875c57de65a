use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use rentals_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::{establish_connection_with_config, run_migrations, DbConfig},
    AppServices, AppState,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration: 3600,
        auth_issuer: "rentals-auth".to_string(),
        auth_audience: "rentals-api".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
        auto_migrate: true,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
        request_timeout_secs: 5,
    }
}

async fn build_app() -> Router {
    let db_config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..DbConfig::default()
    };
    let db = Arc::new(
        establish_connection_with_config(&db_config)
            .await
            .expect("Failed to connect"),
    );
    run_migrations(db.as_ref())
        .await
        .expect("Failed to run migrations");

    let cfg = test_config();
    let auth_cfg = AuthConfig::new(
        cfg.jwt_secret.clone(),
        cfg.auth_audience.clone(),
        cfg.auth_issuer.clone(),
        Duration::from_secs(cfg.jwt_expiration),
    );
    let auth_service = Arc::new(AuthService::new(auth_cfg, db.clone()));

    let services = AppServices::new(db.clone(), None);
    let state = AppState {
        db,
        config: cfg,
        services,
    };

    Router::new()
        .nest("/api", rentals_api::api_routes())
        .nest(
            "/auth",
            rentals_api::auth::auth_routes().with_state(auth_service.clone()),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
             mut req: axum::extract::Request,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        .with_state(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn public_material_listing_needs_no_token() {
    let app = build_app().await;

    let response = app
        .oneshot(Request::get("/api/materials").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rentals_require_a_bearer_token() {
    let app = build_app().await;

    let response = app
        .oneshot(Request::get("/api/rentals").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stock_adjustment_requires_a_bearer_token() {
    let app = build_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/materials/update-stock",
            serde_json::json!({"itemName": "Drill", "model": "D-18V", "quantity": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_use_the_token() {
    let app = build_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({"username": "manager", "password": "hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Second registration with the same username is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({"username": "manager", "password": "hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Wrong password never authenticates
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            serde_json::json!({"username": "manager", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            serde_json::json!({"username": "manager", "password": "hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token in response");
    assert_eq!(body["username"], "manager");

    let response = app
        .oneshot(
            Request::get("/api/rentals")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = build_app().await;

    let response = app
        .oneshot(
            Request::get("/api/rentals")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
