use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "share_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    Friend,
    Public,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "share_permission", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    Read,
}

/// One act of sharing. Friend grants carry `shared_with`; public grants carry
/// `share_token` and an optional `expires_at`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShareEntity {
    pub id: Uuid,
    pub file_id: Uuid,
    pub granted_by: Uuid,
    pub share_type: ShareType,
    pub shared_with: Option<Uuid>,
    pub permission: SharePermission,
    pub share_token: Option<String>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
