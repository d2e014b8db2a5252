use std::path::PathBuf;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    api::error,
    constants::{ACCOUNT_QUOTA, Env, MAX_FILE_SIZE},
};

pub async fn connect_database(database_url: &str) -> Result<PgPool, error::SystemError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| error::SystemError::InternalError(Box::new(e)))?;

    Ok(pool)
}

/// Upload ceilings, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct QuotaPolicy {
    pub max_file_size: i64,
    pub account_quota: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self { max_file_size: MAX_FILE_SIZE, account_quota: ACCOUNT_QUOTA }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub policy: QuotaPolicy,
}

impl StorageConfig {
    pub fn from_env(env: &Env) -> Self {
        Self { root: PathBuf::from(&env.storage_root), policy: QuotaPolicy::default() }
    }
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Base URL the editor uses to pull document content from this service.
    pub public_base_url: String,
    /// Save notifications are posted to `{callback_url}/{file_id}`.
    pub callback_url: String,
    pub lang: String,
    /// Hosts the save callback may download edited content from.
    pub document_server_hosts: Vec<String>,
}

impl EditorConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            public_base_url: env.public_base_url.trim_end_matches('/').to_string(),
            callback_url: env.editor_callback_url.trim_end_matches('/').to_string(),
            lang: env.editor_lang.clone(),
            document_server_hosts: env.document_server_hosts.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn from_env(env: &Env) -> Self {
        Self { jwt_secret: env.jwt_secret.clone() }
    }
}
