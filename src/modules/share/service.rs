use std::sync::Arc;

use chrono::Duration;
use log::info;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        file::{schema::FileEntity, service::StorageService},
        friend::repository::FriendRepository,
        share::{
            model::{GrantSummary, SharedWithMeRow},
            repository::ShareRepository,
            schema::ShareEntity,
        },
    },
    utils::{Clock, generate_share_token},
};

#[derive(Clone)]
pub struct ShareService {
    share_repo: Arc<dyn ShareRepository + Send + Sync>,
    friend_repo: Arc<dyn FriendRepository + Send + Sync>,
    storage: StorageService,
    clock: Arc<dyn Clock>,
}

impl ShareService {
    pub fn with_dependencies(
        share_repo: Arc<dyn ShareRepository + Send + Sync>,
        friend_repo: Arc<dyn FriendRepository + Send + Sync>,
        storage: StorageService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ShareService { share_repo, friend_repo, storage, clock }
    }

    async fn owned_file(&self, owner_id: Uuid, file_id: &Uuid) -> Result<FileEntity, error::SystemError> {
        let file = self.storage.resolve(file_id).await?;
        if file.owner_id != owner_id {
            return Err(error::SystemError::forbidden("File not found or permission denied"));
        }
        Ok(file)
    }

    pub async fn grant_to_friend(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        friend_id: Uuid,
    ) -> Result<ShareEntity, error::SystemError> {
        self.owned_file(owner_id, &file_id).await?;

        if friend_id == owner_id || !self.friend_repo.are_friends(&owner_id, &friend_id).await? {
            return Err(error::SystemError::NotFriends);
        }

        if self.share_repo.find_friend_grant(&file_id, &friend_id).await?.is_some() {
            return Err(error::SystemError::AlreadyShared);
        }

        let share = match self.share_repo.create_friend_grant(&file_id, &owner_id, &friend_id).await {
            Ok(share) => share,
            Err(error::SystemError::Conflict(_)) => return Err(error::SystemError::AlreadyShared),
            Err(e) => return Err(e),
        };

        info!("User {} shared file {} with {}", owner_id, file_id, friend_id);
        Ok(share)
    }

    pub async fn create_public_grant(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        ttl_hours: Option<i64>,
    ) -> Result<ShareEntity, error::SystemError> {
        self.owned_file(owner_id, &file_id).await?;

        let expires_at = ttl_hours
            .filter(|hours| *hours > 0)
            .map(|hours| self.clock.now() + Duration::hours(hours));

        let token = generate_share_token();
        let share =
            self.share_repo.create_public_grant(&file_id, &owner_id, &token, expires_at).await?;

        info!("User {} created public link for file {} (expires {:?})", owner_id, file_id, expires_at);
        Ok(share)
    }

    pub async fn resolve_by_token(&self, token: &str) -> Result<FileEntity, error::SystemError> {
        self.share_repo
            .find_public_file(token, self.clock.now())
            .await?
            .ok_or_else(|| error::SystemError::not_found("Share link not found or expired"))
    }

    pub async fn has_friend_grant(
        &self,
        file_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.share_repo.find_friend_grant(file_id, user_id).await?.is_some())
    }

    pub async fn revoke(&self, share_id: Uuid, requester: Uuid) -> Result<(), error::SystemError> {
        let share = self
            .share_repo
            .find_by_id(&share_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Share not found"))?;

        if share.granted_by != requester {
            return Err(error::SystemError::forbidden("You are not allowed to remove this share"));
        }

        if !self.share_repo.delete(&share_id).await? {
            return Err(error::SystemError::not_found("Share not found"));
        }

        info!("User {} revoked share {}", requester, share_id);
        Ok(())
    }

    pub async fn list_granted_to_me(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SharedWithMeRow>, error::SystemError> {
        self.share_repo.find_granted_to(&user_id).await
    }

    pub async fn list_my_grants(&self, user_id: Uuid) -> Result<Vec<GrantSummary>, error::SystemError> {
        let rows = self.share_repo.find_granted_by(&user_id).await?;
        Ok(rows.into_iter().map(GrantSummary::from).collect())
    }
}
