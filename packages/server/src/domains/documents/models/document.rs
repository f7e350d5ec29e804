use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

/// Property id recorded for uploads that were not attached to a property
pub const UNASSIGNED_PROPERTY: &str = "unassigned";

/// An uploaded document. Only metadata is kept, not the file contents.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: i64,
    pub property_id: String,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    pub size_bytes: i64,
    pub extracted_data: Json<ExtractedMetadata>,
    pub content_summary: Option<String>,
}

/// Metadata captured at upload time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    pub size: i64,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

impl ExtractedMetadata {
    pub fn new(
        filename: &str,
        content_type: Option<&str>,
        size: usize,
        upload_date: DateTime<Utc>,
    ) -> Self {
        Self {
            filename: filename.to_string(),
            upload_date,
            size: size as i64,
            content_type: content_type.map(str::to_string),
        }
    }
}

impl Document {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let documents = sqlx::query_as::<_, Self>(
            "SELECT * FROM documents ORDER BY upload_date DESC, id DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(documents)
    }

    /// Record an upload. A missing property id is stored as `unassigned`.
    pub async fn create(
        property_id: Option<&str>,
        metadata: &ExtractedMetadata,
        pool: &PgPool,
    ) -> Result<Self> {
        let document = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO documents (property_id, content_type, filename, upload_date, size_bytes, extracted_data, content_summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(property_id.unwrap_or(UNASSIGNED_PROPERTY))
        .bind(&metadata.content_type)
        .bind(&metadata.filename)
        .bind(metadata.upload_date)
        .bind(metadata.size)
        .bind(Json(metadata))
        .bind(format!("Uploaded {}", metadata.filename))
        .fetch_one(pool)
        .await?;
        Ok(document)
    }
}
