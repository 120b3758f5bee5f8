//! Local filesystem storage backend.

use super::{ByteStream, StorageBackend, StorageError, StorageObject};
use actix_web::web::{self, Bytes};
use async_trait::async_trait;
use futures::stream;
use std::fs;
use std::path::{Path, PathBuf};

/// Local filesystem storage backend.
///
/// Files live directly under `base_path`; the directory is created by the
/// first write rather than at construction.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        log::info!("LocalStorage configured at {:?}", base_path);
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Full path for `filename`. Refuses anything that is not a single plain
    /// path component.
    fn get_file_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let is_plain = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\', '\0']);
        if !is_plain {
            return Err(StorageError::InvalidName(filename.to_owned()));
        }
        Ok(self.base_path.join(filename))
    }

    /// Get MIME type from filename extension.
    fn get_mime_type(filename: &str) -> &'static str {
        let ext = filename.rsplit('.').next().unwrap_or_default();
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "pdf" => "application/pdf",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<(), StorageError> {
        let path = self.get_file_path(filename)?;
        let base_path = self.base_path.clone();
        log::info!("LocalStorage: put_object: {:?}", path);

        web::block(move || {
            fs::create_dir_all(&base_path)?;
            fs::write(&path, data)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        Ok(())
    }

    async fn get_object(&self, filename: &str) -> Result<StorageObject, StorageError> {
        let path = self.get_file_path(filename)?;
        log::debug!("LocalStorage: get_object: {:?}", path);

        let buffer = web::block(move || fs::read(&path))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        let content_length = buffer.len() as u64;
        let body: ByteStream = Box::pin(stream::once(async move { Ok(Bytes::from(buffer)) }));

        Ok(StorageObject {
            body,
            content_length,
            content_type: Self::get_mime_type(filename).to_string(),
        })
    }

    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        Ok(self.get_file_path(filename)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[actix_rt::test]
    async fn test_put_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested").join("uploads");
        let storage = LocalStorage::new(&base);
        assert!(!base.exists());

        storage
            .put_object(b"hello".to_vec(), "note.txt")
            .await
            .unwrap();

        assert_eq!(fs::read(base.join("note.txt")).unwrap(), b"hello");
        assert!(storage.exists("note.txt").await.unwrap());
    }

    #[actix_rt::test]
    async fn test_get_object_streams_content() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .put_object(b"%PDF-1.4".to_vec(), "report.pdf")
            .await
            .unwrap();

        let mut object = storage.get_object("report.pdf").await.unwrap();
        assert_eq!(object.content_length, 8);
        assert_eq!(object.content_type, "application/pdf");

        let chunk = object.body.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"%PDF-1.4");
    }

    #[actix_rt::test]
    async fn test_get_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let result = storage.get_object("missing.png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(!storage.exists("missing.png").await.unwrap());
    }

    #[actix_rt::test]
    async fn test_rejects_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        for name in ["../escape.png", "a/b.png", "..", ""] {
            let result = storage.put_object(Vec::new(), name).await;
            assert!(matches!(result, Err(StorageError::InvalidName(_))), "{}", name);
        }
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(LocalStorage::get_mime_type("a.JPG"), "image/jpeg");
        assert_eq!(LocalStorage::get_mime_type("a.png"), "image/png");
        assert_eq!(LocalStorage::get_mime_type("noext"), "application/octet-stream");
    }
}
