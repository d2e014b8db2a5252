use log::debug;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        access::model::{Authorized, EffectivePermission},
        file::{schema::FileEntity, service::StorageService},
        share::service::ShareService,
    },
};

/// Computes what a requester may do with a file. Every path that serves
/// content or opens an editor goes through here before touching the artifact.
#[derive(Clone)]
pub struct AccessResolver {
    storage: StorageService,
    shares: ShareService,
}

impl AccessResolver {
    pub fn with_dependencies(storage: StorageService, shares: ShareService) -> Self {
        AccessResolver { storage, shares }
    }

    /// Owner, then friend grant, then public token; first match wins.
    async fn permission_for(
        &self,
        file: &FileEntity,
        requester: Option<Uuid>,
        share_token: Option<&str>,
    ) -> Result<EffectivePermission, error::SystemError> {
        if let Some(user_id) = requester {
            if file.owner_id == user_id {
                return Ok(EffectivePermission::Owner);
            }
            if self.shares.has_friend_grant(&file.id, &user_id).await? {
                return Ok(EffectivePermission::FriendGrant);
            }
        }

        if let Some(token) = share_token {
            match self.shares.resolve_by_token(token).await {
                Ok(shared) if shared.id == file.id => return Ok(EffectivePermission::PublicGrant),
                Ok(_) | Err(error::SystemError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(EffectivePermission::Denied)
    }

    pub async fn resolve(
        &self,
        file_id: &Uuid,
        requester: Option<Uuid>,
        share_token: Option<&str>,
    ) -> Result<Authorized, error::SystemError> {
        let file = self.storage.resolve(file_id).await?;
        let permission = self.permission_for(&file, requester, share_token).await?;
        Ok(Authorized { file, permission })
    }

    /// Like `resolve`, but `Denied` becomes an authorization failure.
    pub async fn authorize(
        &self,
        file_id: &Uuid,
        requester: Option<Uuid>,
        share_token: Option<&str>,
    ) -> Result<Authorized, error::SystemError> {
        let resolved = self.resolve(file_id, requester, share_token).await?;

        if resolved.permission.is_denied() {
            debug!("Access to file {} denied for {:?}", file_id, requester);
            return Err(error::SystemError::forbidden("Access denied"));
        }

        Ok(resolved)
    }
}
