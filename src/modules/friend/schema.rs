use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Accepted friendship, stored once per pair with `user_a <= user_b`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendEntity {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
