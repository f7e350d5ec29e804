//! Application setup and server configuration.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Router,
};
use regex::Regex;
use sqlx::PgPool;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domains::query::QueryEngine;
use crate::kernel::BaseRecordStore;
use crate::server::routes::{
    analytics_handler, create_maintenance_issue, create_property, get_property, health_handler,
    list_documents, list_maintenance_issues, list_properties, login_handler, query_handler,
    root_handler, upload_document,
};

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static VERCEL_PREVIEW_ORIGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://.*\.vercel\.app$").unwrap());

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub query_engine: Arc<QueryEngine>,
}

/// True for configured origins and Vercel preview deployments
pub fn origin_allowed(origin: &HeaderValue, allowed_origins: &[String]) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    allowed_origins.iter().any(|allowed| allowed == origin) || VERCEL_PREVIEW_ORIGIN.is_match(origin)
}

/// Requests running past `duration` are answered with 408
fn timeout_layer(duration: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, duration)
}

/// Build the Axum application router
///
/// The query engine reads through `store`; the CRUD routes use `pool` directly.
pub fn build_app(
    pool: PgPool,
    store: Arc<dyn BaseRecordStore>,
    allowed_origins: Vec<String>,
) -> Router {
    let app_state = AppState {
        db_pool: pool,
        query_engine: Arc::new(QueryEngine::new(store)),
    };

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _parts| {
            origin_allowed(origin, &allowed_origins)
        }))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/properties", get(list_properties).post(create_property))
        .route("/api/properties/:id", get(get_property))
        .route(
            "/api/maintenance",
            get(list_maintenance_issues).post(create_maintenance_issue),
        )
        .route("/api/query", post(query_handler))
        .route(
            "/api/upload",
            post(upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/documents", get(list_documents))
        .route("/api/analytics", get(analytics_handler))
        .route("/api/login", post(login_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(timeout_layer(REQUEST_TIMEOUT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec![
            "https://assets.example.com".to_string(),
            "http://localhost:3000".to_string(),
        ]
    }

    #[test]
    fn configured_origins_are_allowed() {
        assert!(origin_allowed(&HeaderValue::from_static("http://localhost:3000"), &allowed()));
        assert!(origin_allowed(&HeaderValue::from_static("https://assets.example.com"), &allowed()));
    }

    #[test]
    fn vercel_previews_are_allowed() {
        assert!(origin_allowed(
            &HeaderValue::from_static("https://asset-brain-git-main.vercel.app"),
            &allowed()
        ));
        assert!(!origin_allowed(
            &HeaderValue::from_static("http://asset-brain.vercel.app"),
            &allowed()
        ));
        assert!(!origin_allowed(
            &HeaderValue::from_static("https://vercel.app.attacker.io"),
            &allowed()
        ));
    }

    #[test]
    fn unknown_origins_are_rejected() {
        assert!(!origin_allowed(&HeaderValue::from_static("http://localhost:5173"), &allowed()));
    }

    #[tokio::test]
    async fn slow_requests_time_out_with_408() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_millis(10)));

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
