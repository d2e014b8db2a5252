use uuid::Uuid;

use crate::{
    api::error,
    modules::file::{model::NewFile, repository::FileRepository, schema::FileEntity},
};

#[derive(Clone)]
pub struct FilePgRepository {
    pool: sqlx::PgPool,
}

impl FilePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FilePgRepository {
    async fn create_within_quota(
        &self,
        file: &NewFile,
        quota: i64,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent uploads of one owner until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::uuid::text, 0))")
            .bind(file.owner_id)
            .execute(&mut *tx)
            .await?;

        let used: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(file_size), 0)::BIGINT FROM files WHERE owner_id = $1",
        )
        .bind(file.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        if used + file.file_size > quota {
            tx.rollback().await?;
            return Ok(None);
        }

        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO files (id, owner_id, filename, original_filename, mime_type, file_size)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(file.owner_id)
        .bind(&file.filename)
        .bind(&file.original_filename)
        .bind(&file.mime_type)
        .bind(file.file_size)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(entity))
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>("SELECT * FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn find_by_owner(&self, owner_id: &Uuid) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>(
            "SELECT * FROM files WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn find_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>("SELECT * FROM files ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(files)
    }

    async fn total_size_by_owner(&self, owner_id: &Uuid) -> Result<i64, error::SystemError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(file_size), 0)::BIGINT FROM files WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn rename(
        &self,
        file_id: &Uuid,
        original_filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            r#"
            UPDATE files SET original_filename = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(original_filename)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn record_overwrite(
        &self,
        file_id: &Uuid,
        file_size: i64,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            r#"
            UPDATE files SET file_size = $1, version = version + 1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(file_size)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete(&self, file_id: &Uuid) -> Result<bool, error::SystemError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
