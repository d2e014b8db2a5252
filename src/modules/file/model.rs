use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::file::schema::FileEntity;

/// New file metadata to insert into database
#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub owner_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub version: i32,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<FileEntity> for FileResponse {
    fn from(file: FileEntity) -> Self {
        FileResponse {
            url: format!("/api/files/{}/download", file.id),
            id: file.id,
            owner_id: file.owner_id,
            filename: file.original_filename,
            mime_type: file.mime_type,
            file_size: file.file_size,
            version: file.version,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenameFileBody {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsageResponse {
    pub used: i64,
    pub limit: i64,
    pub percentage: f64,
}

impl UsageResponse {
    pub fn new(used: i64, limit: i64) -> Self {
        let percentage = if limit > 0 { used as f64 / limit as f64 * 100.0 } else { 0.0 };
        Self { used, limit, percentage }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub share_token: Option<String>,
}
