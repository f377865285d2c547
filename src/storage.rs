use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Filesystem-backed public blob store. Objects live at
/// `{root}/{bucket}/{object}` and are served under `/storage`.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` under a fresh object name that keeps the original extension.
    /// Returns the object path inside the bucket.
    pub async fn upload(&self, bucket: &str, file_name: &str, bytes: &[u8]) -> AppResult<String> {
        if !is_safe_segment(bucket) {
            return Err(AppError::BadRequest(format!("invalid bucket '{bucket}'")));
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("empty upload".into()));
        }

        let object = object_name(file_name);
        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&object), bytes).await?;

        tracing::info!(bucket, object = %object, size = bytes.len(), "blob stored");
        Ok(object)
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            bucket,
            path
        )
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn object_name(file_name: &str) -> String {
    let stem = format!("{}_{}", Uuid::new_v4().simple(), Utc::now().timestamp_millis());
    match Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| is_safe_segment(ext))
    {
        Some(ext) => format!("{stem}.{}", ext.to_ascii_lowercase()),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_keeps_extension_and_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path(), "http://localhost:3000/");

        let path = store.upload("products", "burger.PNG", b"img").await.unwrap();
        assert!(path.ends_with(".png"));
        let written = tokio::fs::read(dir.path().join("products").join(&path)).await.unwrap();
        assert_eq!(written, b"img");
        assert_eq!(
            store.public_url("products", &path),
            format!("http://localhost:3000/storage/products/{path}")
        );
    }

    #[tokio::test]
    async fn rejects_path_traversal_in_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path(), "http://localhost");
        let err = store.upload("../etc", "x.png", b"1").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn object_names_drop_odd_extensions() {
        assert!(!object_name("archive.tar/../x").contains('/'));
        assert!(!object_name("noext").contains('.'));
    }
}
