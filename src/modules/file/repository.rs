use uuid::Uuid;

use crate::{
    api::error,
    modules::file::{model::NewFile, schema::FileEntity},
};

#[async_trait::async_trait]
pub trait FileRepository {
    /// Insert only if the owner's usage plus this file stays within `quota`.
    /// The check and the insert are one atomic step per owner; `None` means
    /// the quota would have been exceeded and nothing was written.
    async fn create_within_quota(
        &self,
        file: &NewFile,
        quota: i64,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError>;

    async fn find_by_owner(&self, owner_id: &Uuid) -> Result<Vec<FileEntity>, error::SystemError>;

    async fn find_all(&self) -> Result<Vec<FileEntity>, error::SystemError>;

    async fn total_size_by_owner(&self, owner_id: &Uuid) -> Result<i64, error::SystemError>;

    async fn rename(
        &self,
        file_id: &Uuid,
        original_filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    /// Record new content: size, bumped version and `updated_at`.
    async fn record_overwrite(
        &self,
        file_id: &Uuid,
        file_size: i64,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    async fn delete(&self, file_id: &Uuid) -> Result<bool, error::SystemError>;
}
