//! Filesystem avatar store rooted at the configured upload directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{AvatarStore, AvatarStoreError};
use crate::domain::{AvatarPath, AvatarUpload};

/// Writes avatars into a single directory and returns their public path.
///
/// Files are named by the hex SHA-256 digest of a fresh UUID v4.
#[derive(Clone)]
pub struct FilesystemAvatarStore {
    root: PathBuf,
    dir: Arc<Dir>,
}

impl FilesystemAvatarStore {
    /// Open `upload_dir`, creating it when missing.
    ///
    /// # Errors
    /// Returns the I/O error raised while creating or opening the directory.
    pub fn open(upload_dir: impl AsRef<Path>) -> io::Result<Self> {
        let root = upload_dir.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
        Ok(Self {
            root,
            dir: Arc::new(dir),
        })
    }

    /// Directory avatars are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn fresh_file_name(extension: &str) -> String {
    let digest = Sha256::digest(Uuid::new_v4().to_string().as_bytes());
    format!("{}{extension}", hex::encode(digest))
}

#[async_trait]
impl AvatarStore for FilesystemAvatarStore {
    async fn store(&self, upload: &AvatarUpload) -> Result<AvatarPath, AvatarStoreError> {
        let file_name = fresh_file_name(upload.kind().extension());
        let public = AvatarPath::for_file_name(&file_name)
            .map_err(|err| AvatarStoreError::io(err.to_string()))?;

        let dir = Arc::clone(&self.dir);
        let bytes = upload.bytes().to_vec();
        let name = file_name.clone();
        tokio::task::spawn_blocking(move || dir.write(&name, bytes))
            .await
            .map_err(|err| AvatarStoreError::io(err.to_string()))?
            .map_err(|err| AvatarStoreError::io(err.to_string()))?;

        info!(
            file = %self.root.join(&file_name).display(),
            bytes = upload.bytes().len(),
            "stored avatar"
        );
        Ok(public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_MAX_AVATAR_BYTES;
    use rstest::rstest;

    fn upload(content_type: &str) -> AvatarUpload {
        AvatarUpload::new(content_type, vec![0x89, b'P', b'N', b'G'], DEFAULT_MAX_AVATAR_BYTES)
            .expect("valid upload")
    }

    #[rstest]
    #[case("image/png", ".png")]
    #[case("image/jpeg", ".jpg")]
    #[tokio::test]
    async fn stores_files_under_hashed_names(
        #[case] content_type: &str,
        #[case] extension: &str,
    ) {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FilesystemAvatarStore::open(temp.path().join("upload")).expect("open store");

        let path = store.store(&upload(content_type)).await.expect("stored");

        let name = path
            .as_ref()
            .strip_prefix("/static/upload/")
            .expect("public prefix");
        let stem = name.strip_suffix(extension).expect("extension");
        assert_eq!(stem.len(), 64);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        let written = std::fs::read(store.root().join(name)).expect("file written");
        assert_eq!(written, upload(content_type).bytes());
    }

    #[rstest]
    #[tokio::test]
    async fn every_upload_gets_a_new_name() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FilesystemAvatarStore::open(temp.path()).expect("open store");

        let first = store.store(&upload("image/png")).await.expect("stored");
        let second = store.store(&upload("image/png")).await.expect("stored");

        assert_ne!(first, second);
    }
}
