use axum::{extract::Extension, Json};

use crate::domains::analytics::PortfolioAnalytics;
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn analytics_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<PortfolioAnalytics>, ApiError> {
    let analytics = PortfolioAnalytics::compute(&state.db_pool).await?;
    Ok(Json(analytics))
}
