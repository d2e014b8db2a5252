use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::share::schema::{SharePermission, ShareType};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShareToFriendBody {
    pub file_id: Uuid,
    pub friend_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePublicShareBody {
    pub file_id: Uuid,
    /// Lifetime in hours; zero or absent never expires.
    #[validate(range(min = 0, max = 87600, message = "expires_in must be between 0 and 87600 hours"))]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicShareResponse {
    pub id: Uuid,
    pub file_id: Uuid,
    pub share_token: String,
    pub url: String,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A file someone else shared with the requesting user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SharedWithMeRow {
    pub share_id: Uuid,
    pub file_id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub file_created_at: chrono::DateTime<chrono::Utc>,
    pub granted_by: Uuid,
    pub granted_by_username: String,
    pub permission: SharePermission,
    pub shared_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MyShareRow {
    pub share_id: Uuid,
    pub file_id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub share_type: ShareType,
    pub share_token: Option<String>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub shared_with: Option<Uuid>,
    pub shared_with_username: Option<String>,
    pub shared_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    pub id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// A grant created by the requesting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "share_type", rename_all = "lowercase")]
pub enum GrantSummary {
    Friend {
        id: Uuid,
        file: SharedFile,
        shared_with: Uuid,
        shared_with_username: Option<String>,
        shared_at: chrono::DateTime<chrono::Utc>,
    },
    Public {
        id: Uuid,
        file: SharedFile,
        share_token: String,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
        shared_at: chrono::DateTime<chrono::Utc>,
    },
}

impl From<MyShareRow> for GrantSummary {
    fn from(row: MyShareRow) -> Self {
        let file = SharedFile {
            id: row.file_id,
            filename: row.filename,
            file_size: row.file_size,
            mime_type: row.mime_type,
        };

        match (row.share_type, row.shared_with) {
            (ShareType::Friend, Some(shared_with)) => GrantSummary::Friend {
                id: row.share_id,
                file,
                shared_with,
                shared_with_username: row.shared_with_username,
                shared_at: row.shared_at,
            },
            _ => GrantSummary::Public {
                id: row.share_id,
                file,
                share_token: row.share_token.unwrap_or_default(),
                expires_at: row.expires_at,
                shared_at: row.shared_at,
            },
        }
    }
}
