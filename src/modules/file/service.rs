use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::api::error::{self, QuotaScope};
use crate::configs::{QuotaPolicy, StorageConfig};
use crate::modules::file::{
    artifact::ArtifactStore, model::NewFile, repository::FileRepository, schema::FileEntity,
};

#[derive(Clone)]
pub struct StorageService {
    file_repo: Arc<dyn FileRepository + Send + Sync>,
    artifacts: ArtifactStore,
    policy: QuotaPolicy,
}

impl StorageService {
    pub fn with_dependencies(
        file_repo: Arc<dyn FileRepository + Send + Sync>,
        config: StorageConfig,
    ) -> Self {
        info!("StorageService initialized with root {}", config.root.display());
        StorageService { file_repo, artifacts: ArtifactStore::new(config.root), policy: config.policy }
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    /// Quota checks run before any byte hits the disk; the insert re-checks the
    /// account ceiling atomically. Whatever fails after the artifact write
    /// removes the artifact again.
    pub async fn store(
        &self,
        owner_id: Uuid,
        bytes: Vec<u8>,
        original_filename: String,
        mime_type: String,
    ) -> Result<FileEntity, error::SystemError> {
        let file_size = bytes.len() as i64;

        if file_size > self.policy.max_file_size {
            return Err(error::SystemError::QuotaExceeded(QuotaScope::File {
                limit: self.policy.max_file_size,
            }));
        }

        let used = self.file_repo.total_size_by_owner(&owner_id).await?;
        if used + file_size > self.policy.account_quota {
            return Err(error::SystemError::QuotaExceeded(QuotaScope::Account {
                limit: self.policy.account_quota,
                used,
            }));
        }

        let filename = ArtifactStore::generate_name(&original_filename);
        self.artifacts.write(&filename, &bytes).await?;

        let new_file = NewFile {
            filename: filename.clone(),
            original_filename,
            mime_type,
            file_size,
            owner_id,
        };

        let outcome = self.file_repo.create_within_quota(&new_file, self.policy.account_quota).await;
        let failure = match outcome {
            Ok(Some(entity)) => {
                info!("User {} stored file {} ({} bytes)", owner_id, entity.id, file_size);
                return Ok(entity);
            }
            // Lost a race with a concurrent upload of the same owner.
            Ok(None) => {
                let used = self.file_repo.total_size_by_owner(&owner_id).await.unwrap_or(used);
                error::SystemError::QuotaExceeded(QuotaScope::Account {
                    limit: self.policy.account_quota,
                    used,
                })
            }
            Err(e) => e,
        };

        if let Err(e) = self.artifacts.remove(&filename).await {
            warn!("Failed to remove artifact {} after aborted upload: {:?}", filename, e);
        }
        Err(failure)
    }

    pub async fn resolve(&self, file_id: &Uuid) -> Result<FileEntity, error::SystemError> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))
    }

    pub async fn list_owned(&self, owner_id: &Uuid) -> Result<Vec<FileEntity>, error::SystemError> {
        self.file_repo.find_by_owner(owner_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        self.file_repo.find_all().await
    }

    pub async fn read_content(&self, file: &FileEntity) -> Result<Vec<u8>, error::SystemError> {
        self.artifacts.read(&file.filename).await
    }

    /// Replace the content of an existing file in place. Size and version are
    /// only recorded once the new bytes are durable. The per-file ceiling
    /// applies; the account ceiling does not.
    pub async fn overwrite(
        &self,
        file_id: &Uuid,
        bytes: Vec<u8>,
    ) -> Result<FileEntity, error::SystemError> {
        let file = self.resolve(file_id).await?;

        if bytes.len() as i64 > self.policy.max_file_size {
            return Err(error::SystemError::QuotaExceeded(QuotaScope::File {
                limit: self.policy.max_file_size,
            }));
        }

        self.artifacts.replace(&file.filename, &bytes).await?;

        let updated = self
            .file_repo
            .record_overwrite(file_id, bytes.len() as i64)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;

        info!("File {} overwritten, version {} ({} bytes)", file_id, updated.version, updated.file_size);
        Ok(updated)
    }

    pub async fn delete(&self, file_id: &Uuid, requester: Uuid) -> Result<(), error::SystemError> {
        let file = self.resolve(file_id).await?;

        if file.owner_id != requester {
            return Err(error::SystemError::forbidden(
                "You don't have permission to delete this file",
            ));
        }

        if !self.file_repo.delete(file_id).await? {
            return Err(error::SystemError::not_found("File not found"));
        }

        // Orphaned bytes are left for out-of-band cleanup.
        if let Err(e) = self.artifacts.remove(&file.filename).await {
            warn!("File {} deleted but artifact {} remains: {:?}", file_id, file.filename, e);
        }

        Ok(())
    }

    pub async fn rename(
        &self,
        file_id: &Uuid,
        requester: Uuid,
        new_name: String,
    ) -> Result<FileEntity, error::SystemError> {
        let file = self.resolve(file_id).await?;

        if file.owner_id != requester {
            return Err(error::SystemError::forbidden(
                "You don't have permission to rename this file",
            ));
        }

        self.file_repo
            .rename(file_id, new_name.trim())
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))
    }

    pub async fn usage_of(&self, owner_id: &Uuid) -> Result<i64, error::SystemError> {
        self.file_repo.total_size_by_owner(owner_id).await
    }
}
