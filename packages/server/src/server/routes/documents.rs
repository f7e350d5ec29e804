use axum::{
    extract::{Extension, Multipart, Query},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domains::documents::{Document, ExtractedMetadata};
use crate::server::app::AppState;
use crate::server::error::ApiError;

const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub property_id: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub document_id: i64,
    pub extracted_data: ExtractedMetadata,
    pub message: String,
}

/// Record an uploaded file's metadata. The file body is read for its size only.
pub async fn upload_document(
    Extension(state): Extension<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut metadata = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let body = field.bytes().await?;
        metadata = Some(ExtractedMetadata::new(
            &filename,
            content_type.as_deref(),
            body.len(),
            Utc::now(),
        ));
        break;
    }

    let metadata =
        metadata.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let property_id = params.property_id.as_deref().filter(|id| !id.is_empty());
    let document = Document::create(property_id, &metadata, &state.db_pool).await?;
    tracing::info!(
        document_id = document.id,
        property_id = %document.property_id,
        filename = %metadata.filename,
        size = metadata.size,
        "Document uploaded"
    );

    Ok(Json(UploadResponse {
        status: "success",
        document_id: document.id,
        message: format!("Document '{}' processed successfully", metadata.filename),
        extracted_data: metadata,
    }))
}

pub async fn list_documents(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = Document::find_all(&state.db_pool).await?;
    Ok(Json(documents))
}
