use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        file::schema::FileEntity,
        share::{
            model::{MyShareRow, SharedWithMeRow},
            repository::ShareRepository,
            schema::ShareEntity,
        },
    },
};

#[derive(Clone)]
pub struct SharePgRepository {
    pool: sqlx::PgPool,
}

impl SharePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ShareRepository for SharePgRepository {
    async fn find_by_id(&self, share_id: &Uuid) -> Result<Option<ShareEntity>, error::SystemError> {
        let share = sqlx::query_as::<_, ShareEntity>("SELECT * FROM file_shares WHERE id = $1")
            .bind(share_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(share)
    }

    async fn find_friend_grant(
        &self,
        file_id: &Uuid,
        shared_with: &Uuid,
    ) -> Result<Option<ShareEntity>, error::SystemError> {
        let share = sqlx::query_as::<_, ShareEntity>(
            r#"
            SELECT * FROM file_shares
            WHERE file_id = $1 AND shared_with = $2 AND share_type = 'friend'
            "#,
        )
        .bind(file_id)
        .bind(shared_with)
        .fetch_optional(&self.pool)
        .await?;

        Ok(share)
    }

    async fn create_friend_grant(
        &self,
        file_id: &Uuid,
        granted_by: &Uuid,
        shared_with: &Uuid,
    ) -> Result<ShareEntity, error::SystemError> {
        let share = sqlx::query_as::<_, ShareEntity>(
            r#"
            INSERT INTO file_shares (id, file_id, granted_by, share_type, shared_with, permission)
            VALUES ($1, $2, $3, 'friend', $4, 'read')
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(file_id)
        .bind(granted_by)
        .bind(shared_with)
        .fetch_one(&self.pool)
        .await?;

        Ok(share)
    }

    async fn create_public_grant(
        &self,
        file_id: &Uuid,
        granted_by: &Uuid,
        share_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShareEntity, error::SystemError> {
        let share = sqlx::query_as::<_, ShareEntity>(
            r#"
            INSERT INTO file_shares (id, file_id, granted_by, share_type, permission, share_token, expires_at)
            VALUES ($1, $2, $3, 'public', 'read', $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(file_id)
        .bind(granted_by)
        .bind(share_token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(share)
    }

    async fn find_public_file(
        &self,
        share_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            r#"
            SELECT f.*
            FROM file_shares fs
            JOIN files f ON f.id = fs.file_id
            WHERE fs.share_token = $1
              AND fs.share_type = 'public'
              AND (fs.expires_at IS NULL OR fs.expires_at > $2)
            "#,
        )
        .bind(share_token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn find_granted_to(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<SharedWithMeRow>, error::SystemError> {
        let rows = sqlx::query_as::<_, SharedWithMeRow>(
            r#"
            SELECT
                fs.id AS share_id,
                f.id AS file_id,
                f.original_filename AS filename,
                f.file_size,
                f.mime_type,
                f.created_at AS file_created_at,
                fs.granted_by,
                u.username AS granted_by_username,
                fs.permission,
                fs.created_at AS shared_at
            FROM file_shares fs
            JOIN files f ON f.id = fs.file_id
            JOIN users u ON u.id = fs.granted_by
            WHERE fs.shared_with = $1 AND fs.share_type = 'friend'
            ORDER BY fs.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_granted_by(&self, user_id: &Uuid) -> Result<Vec<MyShareRow>, error::SystemError> {
        let rows = sqlx::query_as::<_, MyShareRow>(
            r#"
            SELECT
                fs.id AS share_id,
                f.id AS file_id,
                f.original_filename AS filename,
                f.file_size,
                f.mime_type,
                fs.share_type,
                fs.share_token,
                fs.expires_at,
                fs.shared_with,
                u.username AS shared_with_username,
                fs.created_at AS shared_at
            FROM file_shares fs
            JOIN files f ON f.id = fs.file_id
            LEFT JOIN users u ON u.id = fs.shared_with
            WHERE fs.granted_by = $1
            ORDER BY fs.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete(&self, share_id: &Uuid) -> Result<bool, error::SystemError> {
        let result = sqlx::query("DELETE FROM file_shares WHERE id = $1")
            .bind(share_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
