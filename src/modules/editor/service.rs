use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    api::error as api_error,
    configs::EditorConfig,
    modules::{
        access::service::AccessResolver,
        editor::{
            fetcher::{ContentFetcher, validate_download_url},
            model::{
                CallbackReply, CallbackStatus, DocumentConfig, DocumentDescriptor,
                DocumentPermissions, EditorMode, EditorSettings, EditorUser, FileType,
                SaveCallback,
            },
        },
        file::{schema::FileEntity, service::StorageService},
    },
    utils::Claims,
};

#[derive(Clone)]
pub struct EditorService {
    access: AccessResolver,
    storage: StorageService,
    fetcher: Arc<dyn ContentFetcher + Send + Sync>,
    config: EditorConfig,
}

/// Stable for one user while the content is unchanged; a new version forces
/// the document server to drop its cached copy.
pub fn document_key(file: &FileEntity, user_id: &Uuid) -> String {
    format!("file_{}_{}_v{}", file.id.simple(), user_id.simple(), file.version)
}

impl EditorService {
    pub fn with_dependencies(
        access: AccessResolver,
        storage: StorageService,
        fetcher: Arc<dyn ContentFetcher + Send + Sync>,
        config: EditorConfig,
    ) -> Self {
        EditorService { access, storage, fetcher, config }
    }

    pub async fn issue_session(
        &self,
        file_id: &Uuid,
        claims: &Claims,
        bearer_token: &str,
    ) -> Result<DocumentConfig, api_error::SystemError> {
        let authorized = self.access.authorize(file_id, Some(claims.sub), None).await?;
        let file = authorized.file;

        let file_type = FileType::from_filename(&file.original_filename).ok_or_else(|| {
            api_error::SystemError::bad_request("File type not supported for online editing")
        })?;
        let (permissions, mode) = if authorized.permission.can_edit() {
            (DocumentPermissions::full(), EditorMode::Edit)
        } else {
            (DocumentPermissions::read_only(), EditorMode::View)
        };

        info!(file_id = %file.id, user_id = %claims.sub, mode = ?mode, "Issuing editor session");

        Ok(DocumentConfig {
            document: DocumentDescriptor {
                file_type,
                key: document_key(&file, &claims.sub),
                url: format!(
                    "{}/api/files/{}/download?token={}",
                    self.config.public_base_url, file.id, bearer_token
                ),
                title: file.original_filename,
                permissions,
            },
            document_type: file_type.document_type(),
            editor_config: EditorSettings {
                callback_url: format!("{}/{}", self.config.callback_url, file.id),
                lang: self.config.lang.clone(),
                mode,
                user: EditorUser { id: claims.sub.to_string(), name: claims.username.clone() },
            },
            height: "100%",
            width: "100%",
            kind: "desktop",
        })
    }

    /// Always answers; failures are reported to the document server as
    /// `error: 1` so it keeps the edited copy and retries.
    pub async fn handle_callback(&self, file_id: &Uuid, callback: SaveCallback) -> CallbackReply {
        let status = CallbackStatus::from(callback.status);
        info!(file_id = %file_id, key = %callback.key, status = ?status, users = ?callback.users, "Editor callback received");

        let expected_prefix = format!("file_{}_", file_id.simple());
        if !callback.key.starts_with(&expected_prefix) {
            warn!(file_id = %file_id, key = %callback.key, "Editor callback key does not belong to this file");
            return CallbackReply::failed();
        }

        if !status.carries_content() {
            if let CallbackStatus::Unknown(code) = status {
                warn!(file_id = %file_id, code, "Unknown editor callback status acknowledged");
            }
            return CallbackReply::ack();
        }

        let Some(url) = callback.url.as_deref() else {
            error!(file_id = %file_id, status = ?status, "Save callback without download url");
            return CallbackReply::failed();
        };

        match self.save_from(file_id, url).await {
            Ok(file) => {
                info!(file_id = %file.id, version = file.version, size = file.file_size, "Edited document saved");
                CallbackReply::ack()
            }
            Err(e) => {
                error!(file_id = %file_id, error = %e, "Failed to save edited document");
                CallbackReply::failed()
            }
        }
    }

    async fn save_from(&self, file_id: &Uuid, url: &str) -> Result<FileEntity, api_error::SystemError> {
        // Nothing is downloaded for an unknown file or a foreign host.
        self.storage.resolve(file_id).await?;
        let url = validate_download_url(url, &self.config.document_server_hosts)?;

        let max_bytes = usize::try_from(self.storage.policy().max_file_size).unwrap_or(usize::MAX);
        let bytes = self.fetcher.fetch(url.as_str(), max_bytes).await?;
        self.storage.overwrite(file_id, bytes).await
    }
}
