use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        file::schema::FileEntity,
        share::{
            model::{MyShareRow, SharedWithMeRow},
            schema::ShareEntity,
        },
    },
};

#[async_trait::async_trait]
pub trait ShareRepository {
    async fn find_by_id(&self, share_id: &Uuid) -> Result<Option<ShareEntity>, error::SystemError>;

    async fn find_friend_grant(
        &self,
        file_id: &Uuid,
        shared_with: &Uuid,
    ) -> Result<Option<ShareEntity>, error::SystemError>;

    async fn create_friend_grant(
        &self,
        file_id: &Uuid,
        granted_by: &Uuid,
        shared_with: &Uuid,
    ) -> Result<ShareEntity, error::SystemError>;

    async fn create_public_grant(
        &self,
        file_id: &Uuid,
        granted_by: &Uuid,
        share_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShareEntity, error::SystemError>;

    /// File behind a public token that is still live at `now`. Friend rows,
    /// expired rows and unknown tokens are indistinguishable.
    async fn find_public_file(
        &self,
        share_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    async fn find_granted_to(&self, user_id: &Uuid)
    -> Result<Vec<SharedWithMeRow>, error::SystemError>;

    async fn find_granted_by(&self, user_id: &Uuid) -> Result<Vec<MyShareRow>, error::SystemError>;

    async fn delete(&self, share_id: &Uuid) -> Result<bool, error::SystemError>;
}
