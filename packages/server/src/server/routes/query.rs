use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::Deserialize;

use crate::domains::query::AnswerResult;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

pub async fn query_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<AnswerResult>, ApiError> {
    let Json(request) = payload?;
    tracing::debug!(query = %request.query, "Received query");

    let answer = state.query_engine.answer_query(&request.query).await?;
    Ok(Json(answer))
}
