use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};

use crate::common::SortOrder;
use crate::domains::maintenance::{
    MaintenanceFilter, MaintenanceIssue, MaintenanceIssueWithAddress, NewMaintenanceIssue,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Every issue whose property exists, newest first
pub async fn list_maintenance_issues(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<MaintenanceIssueWithAddress>>, ApiError> {
    let issues = MaintenanceIssue::find_filtered_with_address(
        &MaintenanceFilter::default(),
        SortOrder::Descending,
        &state.db_pool,
    )
    .await?;
    Ok(Json(issues))
}

/// Report an issue. Unknown status values are rejected during deserialization.
pub async fn create_maintenance_issue(
    Extension(state): Extension<AppState>,
    payload: Result<Json<NewMaintenanceIssue>, JsonRejection>,
) -> Result<(StatusCode, Json<MaintenanceIssue>), ApiError> {
    let Json(input) = payload?;
    if input.property_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Property id is required".to_string()));
    }
    if input.category.trim().is_empty() {
        return Err(ApiError::BadRequest("Category is required".to_string()));
    }

    let issue = MaintenanceIssue::create(input, &state.db_pool).await?;
    tracing::info!(
        issue_id = issue.id,
        property_id = %issue.property_id,
        category = %issue.category,
        "Maintenance issue created"
    );
    Ok((StatusCode::CREATED, Json(issue)))
}
