use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::common::SortOrder;
use crate::domains::maintenance::{MaintenanceFilter, MaintenanceIssue};
use crate::domains::properties::{NewProperty, Property};
use crate::server::app::AppState;
use crate::server::error::{is_unique_violation, ApiError};

#[derive(Serialize)]
pub struct PropertyDetail {
    pub property: Property,
    pub maintenance_history: Vec<MaintenanceIssue>,
}

pub async fn list_properties(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = Property::find_all(&state.db_pool).await?;
    Ok(Json(properties))
}

/// A property with its maintenance history, newest issue first
pub async fn get_property(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PropertyDetail>, ApiError> {
    let property = Property::find_by_id(&id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

    let maintenance_history = MaintenanceIssue::find_filtered(
        &MaintenanceFilter::for_property(&id),
        SortOrder::Descending,
        &state.db_pool,
    )
    .await?;

    Ok(Json(PropertyDetail {
        property,
        maintenance_history,
    }))
}

pub async fn create_property(
    Extension(state): Extension<AppState>,
    payload: Result<Json<NewProperty>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let Json(input) = payload?;
    if input.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Property id is required".to_string()));
    }
    if input.address.trim().is_empty() {
        return Err(ApiError::BadRequest("Property address is required".to_string()));
    }

    let id = input.id.clone();
    match Property::create(input, &state.db_pool).await {
        Ok(property) => {
            tracing::info!(property_id = %property.id, "Property created");
            Ok((StatusCode::CREATED, Json(property)))
        }
        Err(e) if is_unique_violation(&e) => Err(ApiError::BadRequest(format!(
            "Property '{}' already exists",
            id
        ))),
        Err(e) => Err(e.into()),
    }
}
