use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::api::error;

/// Artifact bytes on the local filesystem, one flat directory per deployment.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Artifact names are generated server-side, but anything that could walk
    /// out of the root is refused anyway.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, error::SystemError> {
        if name.is_empty() || name.contains("..") || name.contains(['/', '\\']) {
            return Err(error::SystemError::bad_request("Invalid artifact name"));
        }
        Ok(self.root.join(name))
    }

    /// `<uuid-v7>.<ext>`, keeping the extension of the declared name.
    pub fn generate_name(original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_default();
        let uuid = Uuid::now_v7();
        if extension.is_empty() { uuid.to_string() } else { format!("{}.{}", uuid, extension) }
    }

    /// Write a fresh artifact. A partially written file is removed before the
    /// error is returned.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, error::SystemError> {
        let path = self.path_of(name)?;
        fs::create_dir_all(&self.root).await?;

        if let Err(e) = write_synced(&path, bytes).await {
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }
        Ok(path)
    }

    /// Swap the artifact content atomically: readers see the old bytes or the
    /// new bytes, never a torn file.
    pub async fn replace(&self, name: &str, bytes: &[u8]) -> Result<(), error::SystemError> {
        let path = self.path_of(name)?;
        fs::create_dir_all(&self.root).await?;

        let tmp = self.root.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));
        if let Err(e) = write_synced(&tmp, bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, error::SystemError> {
        let path = self.path_of(name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::error!("Artifact {} is missing from {}", name, self.root.display());
                Err(error::SystemError::not_found("File content not found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(&self, name: &str) -> Result<(), error::SystemError> {
        let path = self.path_of(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn replace_swaps_content_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.write("doc.txt", b"first").await.unwrap();
        store.replace("doc.txt", b"second version").await.unwrap();

        assert_eq!(store.read("doc.txt").await.unwrap(), b"second version");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[actix_web::test]
    async fn rejects_names_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(store.write("../escape", b"x").await.is_err());
        assert!(store.path_of("a/b").is_err());
    }

    #[test]
    fn generated_names_keep_extension() {
        let name = ArtifactStore::generate_name("Report.DOCX");
        assert!(name.ends_with(".docx"));
        assert!(!ArtifactStore::generate_name("noext").contains('.'));
    }
}
