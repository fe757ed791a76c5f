//! Router assembly: resource routers under `/api`, operational routes at the root.

mod common;
mod config;
mod products;
mod quotations;
mod users;

pub use common::common_routes;
pub use config::config_routes;
pub use products::product_routes;
pub use quotations::quotation_routes;
pub use users::user_routes;

use crate::settings::Settings;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// All resource routes, unprefixed.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(config_routes(state.clone()))
        .merge(product_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(quotation_routes(state))
}

/// The full application: `/api/...`, `/health`, `/ready`, `/version`, and the static
/// front-end as fallback when `STATIC_DIR` is set.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let mut router = Router::new()
        .nest("/api", api_routes(state.clone()))
        .merge(common_routes(state));
    if let Some(dir) = &settings.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }
    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::memory::MemoryKvStore;
    use crate::kv::ConfigService;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_settings() -> Settings {
        Settings::from_lookup(|var| match var {
            "JWT_SECRET" => Some("test-secret".into()),
            "BODY_LIMIT_BYTES" => Some("256".into()),
            _ => None,
        })
        .unwrap()
    }

    /// Router over an in-memory config store and a pool that never connects.
    fn test_app() -> Router {
        let settings = test_settings();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/cotizador_unused")
            .unwrap();
        let state = AppState {
            pool,
            config: ConfigService::new(Arc::new(MemoryKvStore::new())),
            auth: settings.auth.clone(),
        };
        app(state, &settings)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_and_version() {
        let app = test_app();
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
        let (status, body) = send(&app, get("/version")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "cotizador");
    }

    #[tokio::test]
    async fn config_put_then_get() {
        let app = test_app();
        let (status, body) = send(
            &app,
            json_request(Method::PUT, "/api/config", json!({"key": "theme", "value": {"dark": true}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "key": "theme"}));

        let (status, body) = send(&app, get("/api/config/theme")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"key": "theme", "value": {"dark": true}}));
    }

    #[tokio::test]
    async fn config_missing_key_is_400_with_message() {
        let app = test_app();
        let (status, body) = send(&app, json_request(Method::PUT, "/api/config", json!({"value": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("key"));
    }

    #[tokio::test]
    async fn config_unknown_key_is_404() {
        let (status, body) = send(&test_app(), get("/api/config/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "key not found: nope");
    }

    #[tokio::test]
    async fn bulk_then_read_all() {
        let app = test_app();
        let items = json!([
            {"key": "b", "value": "plain"},
            {"key": "a", "value": [1, 2]},
            {"key": "c"}
        ]);
        let (status, body) = send(&app, json_request(Method::PUT, "/api/config/bulk", items)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "count": 3}));

        let (status, body) = send(&app, get("/api/config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"a": [1, 2], "b": "plain", "c": null}));
    }

    #[tokio::test]
    async fn bulk_with_invalid_item_writes_nothing() {
        let app = test_app();
        let items = json!([{"key": "a", "value": 1}, {"value": 2}]);
        let (status, _) = send(&app, json_request(Method::PUT, "/api/config/bulk", items)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, body) = send(&app, get("/api/config")).await;
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn export_is_a_json_attachment() {
        let app = test_app();
        send(&app, json_request(Method::PUT, "/api/config", json!({"key": "x", "value": 5}))).await;
        let res = app.clone().oneshot(get("/api/config/export/json")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"config.json\""
        );
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "{\n  \"x\": 5\n}");
    }

    #[tokio::test]
    async fn import_requires_data_object() {
        let app = test_app();
        let (status, _) = send(&app, json_request(Method::POST, "/api/config/import", json!({"data": [1]}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/config/import", json!({"data": {"k1": "v", "k2": 2}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn keys_named_like_static_routes_are_readable() {
        let app = test_app();
        for key in ["bulk", "import", "export"] {
            let (status, _) = send(
                &app,
                json_request(Method::PUT, "/api/config", json!({"key": key, "value": {"k": key}})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            let (status, body) = send(&app, get(&format!("/api/config/{}", key))).await;
            assert_eq!(status, StatusCode::OK, "GET /api/config/{}", key);
            assert_eq!(body, json!({"key": key, "value": {"k": key}}));
        }
    }

    #[tokio::test]
    async fn unknown_static_route_key_is_404() {
        let (status, body) = send(&test_app(), get("/api/config/bulk")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "key not found: bulk");
    }

    #[tokio::test]
    async fn malformed_json_gets_a_message_body() {
        let app = test_app();
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/api/config/bulk")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("[{"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/products")
            .body(Body::from(r#"{"code": "P1", "name": "x"}"#))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let big = "x".repeat(1024);
        let req = json_request(Method::PUT, "/api/config", json!({"key": "big", "value": big}));
        let (status, body) = send(&test_app(), req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn resource_validation_happens_before_the_database() {
        let app = test_app();
        let (status, body) = send(&app, json_request(Method::POST, "/api/products", json!({"code": "P1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "code and name are required");

        let (status, _) = send(&app, get("/api/quotations/abc/details")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request(Method::PUT, "/api/quotations/1/status", json!({"status": "archived"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/users/check-email")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn details_without_quotation_id_are_empty() {
        let (status, body) = send(&test_app(), get("/api/quotation-details")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
