//! Portal login.
//!
//! Credentials are checked against the stored hash and the profile is
//! returned. No session or token is issued.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::users::User;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub property_id: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            property_id: user.property_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub user: UserProfile,
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(credentials) = payload?;

    let Some(user) =
        User::authenticate(&credentials.username, &credentials.password, &state.db_pool).await?
    else {
        tracing::info!(username = %credentials.username, "Login rejected");
        return Err(ApiError::Unauthorized);
    };

    tracing::info!(username = %user.username, role = %user.role, "Login succeeded");
    Ok(Json(LoginResponse {
        status: "success",
        user: user.into(),
    }))
}
