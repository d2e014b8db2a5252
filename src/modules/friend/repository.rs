use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::schema::FriendEntity;

/// Read side of the friendship graph. The request/accept workflow that writes
/// it lives with the account service.
#[async_trait::async_trait]
pub trait FriendRepository {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendEntity>, error::SystemError>;

    async fn are_friends(&self, user_id_a: &Uuid, user_id_b: &Uuid) -> Result<bool, error::SystemError> {
        let friendship = self.find_friendship(user_id_a, user_id_b).await?;
        Ok(friendship.is_some_and(|f| f.deleted_at.is_none()))
    }
}
