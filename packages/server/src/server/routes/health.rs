use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::domains::properties::Property;
use crate::server::app::AppState;

const PORTFOLIO_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    status: &'static str,
}

/// Liveness banner; does not touch the database.
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Real Estate Asset Brain API",
        status: "running",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: DatabaseHealth,
    portfolio: PortfolioHealth,
    connection_pool: ConnectionPoolHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Whether the query engine has any records to answer from
#[derive(Serialize)]
pub struct PortfolioHealth {
    properties: i64,
    seeded: bool,
}

#[derive(Serialize)]
pub struct ConnectionPoolHealth {
    size: u32,
    idle_connections: usize,
    max_connections: u32,
}

/// Counts properties as the database round trip. 200 when the count comes
/// back, 503 otherwise. An empty portfolio is still healthy.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let counted = tokio::time::timeout(PORTFOLIO_CHECK_TIMEOUT, Property::count(&state.db_pool)).await;

    let (database, properties) = match counted {
        Ok(Ok(properties)) => (
            DatabaseHealth {
                status: "ok",
                error: None,
            },
            properties,
        ),
        Ok(Err(e)) => (
            DatabaseHealth {
                status: "error",
                error: Some(format!("Query failed: {:#}", e)),
            },
            0,
        ),
        Err(_) => (
            DatabaseHealth {
                status: "error",
                error: Some(format!("Query timeout (>{}s)", PORTFOLIO_CHECK_TIMEOUT.as_secs())),
            },
            0,
        ),
    };

    let status_code = if database.error.is_none() {
        StatusCode::OK
    } else {
        tracing::warn!(error = ?database.error, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if status_code.is_success() { "healthy" } else { "unhealthy" },
            database,
            portfolio: PortfolioHealth {
                properties,
                seeded: properties > 0,
            },
            connection_pool: ConnectionPoolHealth {
                size: state.db_pool.size(),
                idle_connections: state.db_pool.num_idle(),
                max_connections: state.db_pool.options().get_max_connections(),
            },
        }),
    )
}
