use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Stored file metadata. `file_size` is what quota accounting sums over.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Artifact name inside the storage root.
    pub filename: String,
    /// User-facing name, changed by rename.
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    /// Bumped every time the artifact content is replaced.
    pub version: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
