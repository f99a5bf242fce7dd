// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use dbsnap_config::DbsnapConfig;
use dbsnap_core::SnapshotError;
use dbsnap_security::SecretList;
use dbsnap_service::{BackupService, RestoreService};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for the route handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub backup: Arc<BackupService>,
    pub restore: Arc<RestoreService>,
    /// Held for the duration of every backup or restore.
    pub operation_lock: Arc<Mutex<()>>,
    /// Exact values scrubbed from every response message.
    pub secrets: SecretList,
    pub auth: AuthConfig,
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(config: &DbsnapConfig, backup: BackupService, restore: RestoreService) -> Self {
        Self {
            backup: Arc::new(backup),
            restore: Arc::new(restore),
            operation_lock: Arc::new(Mutex::new(())),
            secrets: Arc::new(
                config
                    .secret_values()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            auth: AuthConfig::from_token(&config.gateway.bearer_token),
            start_time: Instant::now(),
        }
    }
}

/// Routes:
/// - `GET /health` (public)
/// - `POST /v1/backup` (bearer auth)
/// - `POST /v1/restore` (bearer auth, form field `fileName`)
pub fn router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/backup", post(handlers::post_backup))
        .route("/v1/restore", post(handlers::post_restore))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

/// Bind `host:port` and serve until Ctrl-C or a listener failure.
pub async fn start_server(host: &str, port: u16, state: GatewayState) -> Result<(), SnapshotError> {
    let app = router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SnapshotError::local_io(format!("failed to bind gateway to {addr}"), e))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SnapshotError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use dbsnap_core::OperationResult;
    use dbsnap_test_utils::{FixedClock, MockFetcher, MockUploader, TestHarness};
    use std::time::Duration;
    use tower::ServiceExt;

    const TOKEN: &str = "test-gateway-token";

    struct Fixture {
        harness: TestHarness,
        uploader: MockUploader,
        fetcher: MockFetcher,
        state: GatewayState,
    }

    async fn fixture(configure: impl FnOnce(&mut TestHarness)) -> Fixture {
        fixture_with(configure, MockFetcher::serving(b"RESTORED".to_vec()).await)
    }

    fn fixture_with(configure: impl FnOnce(&mut TestHarness), fetcher: MockFetcher) -> Fixture {
        let mut harness = TestHarness::builder().build().unwrap();
        configure(&mut harness);
        let config = harness.config_arc();
        let uploader = MockUploader::new();
        let backup = BackupService::new(
            config.clone(),
            Arc::new(uploader.clone()),
            Arc::new(FixedClock::at(2024, 1, 1, 12, 0, 0)),
        );
        let restore = RestoreService::new(config.clone(), Arc::new(fetcher.clone()));
        let state = GatewayState::new(&config, backup, restore);
        Fixture {
            harness,
            uploader,
            fetcher,
            state,
        }
    }

    fn post(uri: &str, token: Option<&str>, form: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match form {
            Some(form) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json(response: axum::response::Response) -> OperationResult {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let fx = fixture(|_| {}).await;
        let response = router(fx.state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn trigger_routes_require_bearer_token() {
        let fx = fixture(|_| {}).await;
        let app = router(fx.state);

        let missing = app.clone().oneshot(post("/v1/backup", None, None)).await.unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = app
            .oneshot(post("/v1/restore", Some("nope"), Some("fileName=a.db")))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert!(fx.uploader.calls().await.is_empty());
        assert_eq!(fx.fetcher.fetch_count().await, 0);
    }

    #[tokio::test]
    async fn empty_configured_token_fails_closed() {
        let fx = fixture(|h| h.config.gateway.bearer_token.clear()).await;
        let response = router(fx.state)
            .oneshot(post("/v1/backup", Some(""), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn backup_reports_success_with_wire_fields() {
        let fx = fixture(|_| {}).await;
        let response = router(fx.state)
            .oneshot(post("/v1/backup", Some(TOKEN), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result = json(response).await;
        assert!(result.succeeded, "{}", result.message);
        assert!(result.message.contains("wblog_20240101120000.db"));
        assert_eq!(fx.uploader.calls().await[0].bytes, b"DBDATA");
    }

    #[tokio::test]
    async fn restore_writes_database() {
        let fx = fixture(|_| {}).await;
        let response = router(fx.state)
            .oneshot(post(
                "/v1/restore",
                Some(TOKEN),
                Some("fileName=wblog_20240101120000.db"),
            ))
            .await
            .unwrap();

        let result = json(response).await;
        assert!(result.succeeded, "{}", result.message);
        assert_eq!(fx.harness.db_contents(), b"RESTORED");
    }

    #[tokio::test]
    async fn traversal_is_reported_as_failure_without_fetch() {
        let fx = fixture(|_| {}).await;
        let response = router(fx.state)
            .oneshot(post("/v1/restore", Some(TOKEN), Some("fileName=..%2Fx.db")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result = json(response).await;
        assert!(!result.succeeded);
        assert!(result.message.contains("fileName"));
        assert_eq!(fx.fetcher.fetch_count().await, 0);
    }

    #[tokio::test]
    async fn missing_field_is_empty_name_failure() {
        let fx = fixture(|_| {}).await;
        let response = router(fx.state)
            .oneshot(post("/v1/restore", Some(TOKEN), Some("other=1")))
            .await
            .unwrap();
        let result = json(response).await;
        assert!(!result.succeeded);
        assert!(result.message.contains("cannot be empty"));
    }

    #[tokio::test]
    async fn concurrent_operation_is_refused_with_conflict() {
        let fx = fixture(|_| {}).await;
        let lock = fx.state.operation_lock.clone();
        let app = router(fx.state);

        let _held = lock.lock().await;
        let response = app
            .oneshot(post("/v1/backup", Some(TOKEN), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let result = json(response).await;
        assert_eq!(result.message, crate::handlers::BUSY_MESSAGE);
        assert!(fx.uploader.calls().await.is_empty());
    }

    #[tokio::test]
    async fn dropped_request_keeps_lock_until_restore_finishes() {
        let fetcher = MockFetcher::serving(b"NEWDATA".to_vec())
            .await
            .with_delay(Duration::from_millis(300));
        let fx = fixture_with(|_| {}, fetcher);
        let lock = fx.state.operation_lock.clone();

        let request = router(fx.state.clone()).oneshot(post(
            "/v1/restore",
            Some(TOKEN),
            Some("fileName=wblog_20240101120000.db"),
        ));
        let outcome = tokio::time::timeout(Duration::from_millis(50), request).await;
        assert!(outcome.is_err(), "request should still be in flight");

        // The client is gone but the restore is not: the lock stays held.
        assert!(lock.try_lock().is_err());
        let second = router(fx.state.clone())
            .oneshot(post("/v1/backup", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(fx.harness.db_contents(), b"DBDATA");

        let _guard = tokio::time::timeout(Duration::from_secs(5), lock.lock())
            .await
            .unwrap();
        assert_eq!(fx.harness.db_contents(), b"NEWDATA");
        assert!(fx.uploader.calls().await.is_empty());
    }

    #[tokio::test]
    async fn non_form_restore_body_gets_json_failure() {
        let fx = fixture(|_| {}).await;
        let request = Request::builder()
            .method("POST")
            .uri("/v1/restore")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"fileName":"wblog_20240101120000.db"}"#))
            .unwrap();

        let response = router(fx.state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result = json(response).await;
        assert!(!result.succeeded);
        assert!(result.message.contains("invalid restore request"));
        assert_eq!(fx.fetcher.fetch_count().await, 0);
        assert_eq!(fx.harness.db_contents(), b"DBDATA");
    }

    #[tokio::test]
    async fn failure_messages_are_scrubbed() {
        let fetcher = MockFetcher::new();
        fetcher
            .push_response(Err(SnapshotError::Transport {
                message: "proxy rejected credentials test-secret-key".into(),
                source: None,
            }))
            .await;
        let fx = fixture_with(|_| {}, fetcher);

        let response = router(fx.state)
            .oneshot(post("/v1/restore", Some(TOKEN), Some("fileName=a.db")))
            .await
            .unwrap();

        let result = json(response).await;
        assert!(!result.succeeded);
        assert!(result.message.contains("[REDACTED]"));
        assert!(!result.message.contains("test-secret-key"));
    }
}
