#![allow(dead_code)]

//! In-memory repositories and a temporary storage root for service tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use crate::{
    api::error,
    configs::{EditorConfig, QuotaPolicy, StorageConfig},
    modules::{
        access::service::AccessResolver,
        editor::{fetcher::ContentFetcher, service::EditorService},
        file::{
            model::NewFile, repository::FileRepository, schema::FileEntity,
            service::StorageService,
        },
        friend::{repository::FriendRepository, schema::FriendEntity},
        share::{
            model::{MyShareRow, SharedWithMeRow},
            repository::ShareRepository,
            schema::{SharePermission, ShareEntity, ShareType},
        },
    },
    utils::Clock,
};

pub const MIB: i64 = 1024 * 1024;

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Mutex::new(Utc::now()) }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MemoryFileRepository {
    rows: Mutex<Vec<FileEntity>>,
    fail_next_insert: AtomicBool,
}

impl MemoryFileRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, file_id: &Uuid) -> Option<FileEntity> {
        self.rows.lock().unwrap().iter().find(|f| f.id == *file_id).cloned()
    }

    /// Metadata-only row, standing in for earlier uploads without their bytes.
    pub fn seed(&self, owner_id: Uuid, file_size: i64) -> FileEntity {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let entity = FileEntity {
            id,
            owner_id,
            filename: format!("seed-{id}.bin"),
            original_filename: "seed.bin".into(),
            mime_type: "application/octet-stream".into(),
            file_size,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(entity.clone());
        entity
    }

    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    fn used_by(rows: &[FileEntity], owner_id: &Uuid) -> i64 {
        rows.iter().filter(|f| f.owner_id == *owner_id).map(|f| f.file_size).sum()
    }

    fn update<F>(&self, file_id: &Uuid, apply: F) -> Option<FileEntity>
    where
        F: FnOnce(&mut FileEntity),
    {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|f| f.id == *file_id)?;
        apply(row);
        row.updated_at = Utc::now();
        Some(row.clone())
    }
}

#[async_trait::async_trait]
impl FileRepository for MemoryFileRepository {
    async fn create_within_quota(
        &self,
        file: &NewFile,
        quota: i64,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(error::SystemError::DatabaseError("connection reset".into()));
        }

        let mut rows = self.rows.lock().unwrap();
        if Self::used_by(&rows, &file.owner_id) + file.file_size > quota {
            return Ok(None);
        }

        let now = Utc::now();
        let entity = FileEntity {
            id: Uuid::now_v7(),
            owner_id: file.owner_id,
            filename: file.filename.clone(),
            original_filename: file.original_filename.clone(),
            mime_type: file.mime_type.clone(),
            file_size: file.file_size,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        rows.push(entity.clone());
        Ok(Some(entity))
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self.get(file_id))
    }

    async fn find_by_owner(&self, owner_id: &Uuid) -> Result<Vec<FileEntity>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().filter(|f| f.owner_id == *owner_id).cloned().collect())
    }

    async fn find_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn total_size_by_owner(&self, owner_id: &Uuid) -> Result<i64, error::SystemError> {
        Ok(Self::used_by(&self.rows.lock().unwrap(), owner_id))
    }

    async fn rename(
        &self,
        file_id: &Uuid,
        original_filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self.update(file_id, |f| f.original_filename = original_filename.to_string()))
    }

    async fn record_overwrite(
        &self,
        file_id: &Uuid,
        file_size: i64,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self.update(file_id, |f| {
            f.file_size = file_size;
            f.version += 1;
        }))
    }

    async fn delete(&self, file_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|f| f.id != *file_id);
        Ok(rows.len() < before)
    }
}

/// Share rows joined against the file fake, so grants of deleted files vanish
/// the way the cascading foreign key makes them vanish.
pub struct MemoryShareRepository {
    rows: Mutex<Vec<ShareEntity>>,
    files: Arc<MemoryFileRepository>,
}

impl MemoryShareRepository {
    pub fn new(files: Arc<MemoryFileRepository>) -> Self {
        Self { rows: Mutex::new(Vec::new()), files }
    }

    pub fn len(&self) -> usize {
        self.live().len()
    }

    fn live(&self) -> Vec<(ShareEntity, FileEntity)> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| self.files.get(&s.file_id).map(|f| (s.clone(), f)))
            .collect()
    }

    fn insert(&self, share: ShareEntity) -> Result<ShareEntity, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows.iter().any(|s| {
            s.file_id == share.file_id
                && s.share_type == ShareType::Friend
                && share.share_type == ShareType::Friend
                && s.shared_with == share.shared_with
        });
        if duplicate {
            return Err(error::SystemError::Conflict(None));
        }
        rows.push(share.clone());
        Ok(share)
    }

    fn username(user_id: &Uuid) -> String {
        format!("user-{}", &user_id.simple().to_string()[..8])
    }
}

#[async_trait::async_trait]
impl ShareRepository for MemoryShareRepository {
    async fn find_by_id(&self, share_id: &Uuid) -> Result<Option<ShareEntity>, error::SystemError> {
        Ok(self.live().into_iter().map(|(s, _)| s).find(|s| s.id == *share_id))
    }

    async fn find_friend_grant(
        &self,
        file_id: &Uuid,
        shared_with: &Uuid,
    ) -> Result<Option<ShareEntity>, error::SystemError> {
        Ok(self.live().into_iter().map(|(s, _)| s).find(|s| {
            s.file_id == *file_id
                && s.share_type == ShareType::Friend
                && s.shared_with == Some(*shared_with)
        }))
    }

    async fn create_friend_grant(
        &self,
        file_id: &Uuid,
        granted_by: &Uuid,
        shared_with: &Uuid,
    ) -> Result<ShareEntity, error::SystemError> {
        self.insert(ShareEntity {
            id: Uuid::now_v7(),
            file_id: *file_id,
            granted_by: *granted_by,
            share_type: ShareType::Friend,
            shared_with: Some(*shared_with),
            permission: SharePermission::Read,
            share_token: None,
            expires_at: None,
            created_at: Utc::now(),
        })
    }

    async fn create_public_grant(
        &self,
        file_id: &Uuid,
        granted_by: &Uuid,
        share_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShareEntity, error::SystemError> {
        self.insert(ShareEntity {
            id: Uuid::now_v7(),
            file_id: *file_id,
            granted_by: *granted_by,
            share_type: ShareType::Public,
            shared_with: None,
            permission: SharePermission::Read,
            share_token: Some(share_token.to_string()),
            expires_at,
            created_at: Utc::now(),
        })
    }

    async fn find_public_file(
        &self,
        share_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self
            .live()
            .into_iter()
            .find(|(s, _)| {
                s.share_type == ShareType::Public
                    && s.share_token.as_deref() == Some(share_token)
                    && s.expires_at.is_none_or(|at| at > now)
            })
            .map(|(_, f)| f))
    }

    async fn find_granted_to(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<SharedWithMeRow>, error::SystemError> {
        Ok(self
            .live()
            .into_iter()
            .rev()
            .filter(|(s, _)| s.share_type == ShareType::Friend && s.shared_with == Some(*user_id))
            .map(|(s, f)| SharedWithMeRow {
                share_id: s.id,
                file_id: f.id,
                filename: f.original_filename,
                file_size: f.file_size,
                mime_type: f.mime_type,
                file_created_at: f.created_at,
                granted_by: s.granted_by,
                granted_by_username: Self::username(&s.granted_by),
                permission: s.permission,
                shared_at: s.created_at,
            })
            .collect())
    }

    async fn find_granted_by(&self, user_id: &Uuid) -> Result<Vec<MyShareRow>, error::SystemError> {
        Ok(self
            .live()
            .into_iter()
            .rev()
            .filter(|(s, _)| s.granted_by == *user_id)
            .map(|(s, f)| MyShareRow {
                share_id: s.id,
                file_id: f.id,
                filename: f.original_filename,
                file_size: f.file_size,
                mime_type: f.mime_type,
                share_type: s.share_type,
                share_token: s.share_token,
                expires_at: s.expires_at,
                shared_with_username: s.shared_with.as_ref().map(Self::username),
                shared_with: s.shared_with,
                shared_at: s.created_at,
            })
            .collect())
    }

    async fn delete(&self, share_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != *share_id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryFriendRepository {
    rows: Mutex<Vec<FriendEntity>>,
}

impl MemoryFriendRepository {
    pub fn befriend(&self, a: Uuid, b: Uuid) {
        let (user_a, user_b) = if a <= b { (a, b) } else { (b, a) };
        self.rows.lock().unwrap().push(FriendEntity {
            user_a,
            user_b,
            deleted_at: None,
            created_at: Utc::now(),
        });
    }
}

#[async_trait::async_trait]
impl FriendRepository for MemoryFriendRepository {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendEntity>, error::SystemError> {
        let (a, b) =
            if user_id_a <= user_id_b { (user_id_a, user_id_b) } else { (user_id_b, user_id_a) };
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|f| f.user_a == *a && f.user_b == *b).cloned())
    }
}

/// Document server stand-in. Records every requested URL.
pub struct StubFetcher {
    calls: Mutex<Vec<String>>,
    response: Mutex<Option<Vec<u8>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self { calls: Mutex::new(Vec::new()), response: Mutex::new(Some(b"edited".to_vec())) }
    }

    pub fn respond_with(&self, bytes: Vec<u8>) {
        *self.response.lock().unwrap() = Some(bytes);
    }

    pub fn fail(&self) {
        *self.response.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContentFetcher for StubFetcher {
    async fn fetch(&self, url: &str, max_bytes: usize) -> Result<Vec<u8>, error::SystemError> {
        self.calls.lock().unwrap().push(url.to_string());
        let bytes = self
            .response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| error::SystemError::UpstreamFetch("connection refused".into()))?;

        if bytes.len() > max_bytes {
            return Err(error::SystemError::UpstreamFetch("body over limit".into()));
        }
        Ok(bytes)
    }
}

pub struct TestEnv {
    pub dir: TempDir,
    pub files: Arc<MemoryFileRepository>,
    pub share_repo: Arc<MemoryShareRepository>,
    pub friends: Arc<MemoryFriendRepository>,
    pub clock: Arc<ManualClock>,
    pub fetcher: Arc<StubFetcher>,
    pub storage: StorageService,
    pub shares: crate::modules::share::service::ShareService,
    pub access: AccessResolver,
    pub editor: EditorService,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let files = Arc::new(MemoryFileRepository::default());
        let share_repo = Arc::new(MemoryShareRepository::new(files.clone()));
        let friends = Arc::new(MemoryFriendRepository::default());
        let clock = Arc::new(ManualClock::new());
        let fetcher = Arc::new(StubFetcher::new());

        let storage = StorageService::with_dependencies(
            files.clone(),
            StorageConfig { root: dir.path().to_path_buf(), policy: QuotaPolicy::default() },
        );
        let shares = crate::modules::share::service::ShareService::with_dependencies(
            share_repo.clone(),
            friends.clone(),
            storage.clone(),
            clock.clone(),
        );
        let access = AccessResolver::with_dependencies(storage.clone(), shares.clone());
        let editor = EditorService::with_dependencies(
            access.clone(),
            storage.clone(),
            fetcher.clone(),
            EditorConfig {
                public_base_url: "http://backend:8080".into(),
                callback_url: "http://backend:8080/api/editor/callback".into(),
                lang: "en".into(),
                document_server_hosts: vec!["ds".into()],
            },
        );

        TestEnv {
            dir,
            files,
            share_repo,
            friends,
            clock,
            fetcher,
            storage,
            shares,
            access,
            editor,
        }
    }

    pub async fn upload(&self, owner_id: Uuid, name: &str, bytes: &[u8]) -> FileEntity {
        let mime = mime_guess::from_path(name).first_or_octet_stream().to_string();
        self.storage.store(owner_id, bytes.to_vec(), name.to_string(), mime).await.unwrap()
    }

    /// Committed artifacts under the storage root, ignoring in-flight temp files.
    pub fn artifact_count(&self) -> usize {
        match std::fs::read_dir(self.dir.path()) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
                .count(),
            Err(_) => 0,
        }
    }
}
