/*!
 * File Storage
 * Where uploaded e-paper PDFs end up: ImageKit in production, local disk otherwise
 */
use async_trait::async_trait;
use axum::body::Bytes;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Path the local backend's files are served under.
pub const LOCAL_PUBLIC_PATH: &str = "/uploads/epapers";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file on its way to storage.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// What storage hands back once the file is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub url: String,
    pub file_id: String,
    pub name: String,
    pub size: i64,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(&self, file: FileUpload) -> Result<StoredFile, StorageError>;

    fn name(&self) -> &'static str;
}

/// Build the backend the configuration asks for.
pub fn from_config(config: &StorageConfig) -> std::sync::Arc<dyn FileStorage> {
    match &config.imagekit_private_key {
        Some(key) => std::sync::Arc::new(ImageKitStorage::new(
            key.clone(),
            config.imagekit_upload_url.clone(),
            config.upload_folder.clone(),
        )),
        None => std::sync::Arc::new(LocalStorage::new(
            &config.upload_dir,
            &config.public_base_url,
        )),
    }
}

// ============================================================================
// ImageKit
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageKitUploadResponse {
    file_id: String,
    name: String,
    url: String,
    #[serde(default)]
    size: Option<i64>,
}

#[derive(Clone)]
pub struct ImageKitStorage {
    client: reqwest::Client,
    private_key: String,
    upload_url: String,
    folder: String,
}

impl ImageKitStorage {
    pub fn new(private_key: String, upload_url: String, folder: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            private_key,
            upload_url,
            folder,
        }
    }
}

#[async_trait]
impl FileStorage for ImageKitStorage {
    async fn upload(&self, file: FileUpload) -> Result<StoredFile, StorageError> {
        let local_size = file.bytes.len() as i64;
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("fileName", file.file_name)
            .text("folder", self.folder.clone());

        // ImageKit authenticates with the private key as the basic-auth user.
        let response = self
            .client
            .post(&self.upload_url)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: ImageKitUploadResponse = response.json().await?;
        tracing::info!(file_id = %uploaded.file_id, "uploaded to ImageKit");

        Ok(StoredFile {
            url: uploaded.url,
            file_id: uploaded.file_id,
            name: uploaded.name,
            size: uploaded.size.unwrap_or(local_size),
        })
    }

    fn name(&self) -> &'static str {
        "imagekit"
    }
}

// ============================================================================
// Local disk
// ============================================================================

#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn upload(&self, file: FileUpload) -> Result<StoredFile, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_id = Uuid::new_v4().to_string();
        let stored_name = format!("{}.pdf", file_id);
        tokio::fs::write(self.dir.join(&stored_name), &file.bytes).await?;

        tracing::info!("E-paper stored locally: {} ({} bytes)", stored_name, file.bytes.len());

        Ok(StoredFile {
            url: format!("{}{}/{}", self.public_base_url, LOCAL_PUBLIC_PATH, stored_name),
            file_id,
            name: stored_name,
            size: file.bytes.len() as i64,
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.7\n%test\n"),
        }
    }

    #[tokio::test]
    async fn test_local_storage_writes_file_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("papers"), "http://localhost:3001/");

        let stored = storage.upload(pdf("2025-03-01.pdf")).await.unwrap();
        assert_eq!(stored.size, 15);
        assert!(stored.name.ends_with(".pdf"));
        assert_eq!(
            stored.url,
            format!("http://localhost:3001/uploads/epapers/{}", stored.name)
        );

        let on_disk = std::fs::read(storage.dir().join(&stored.name)).unwrap();
        assert!(on_disk.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_local_storage_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "");
        let a = storage.upload(pdf("a.pdf")).await.unwrap();
        let b = storage.upload(pdf("a.pdf")).await.unwrap();
        assert_ne!(a.file_id, b.file_id);
        assert!(a.url.starts_with(LOCAL_PUBLIC_PATH));
    }

    #[tokio::test]
    async fn test_imagekit_unreachable_is_an_error() {
        let storage = ImageKitStorage::new(
            "private_test".to_string(),
            "http://127.0.0.1:9/api/v1/files/upload".to_string(),
            "/pdfs".to_string(),
        );
        assert!(storage.upload(pdf("a.pdf")).await.is_err());
    }

    #[test]
    fn test_from_config_picks_local_without_key() {
        let config = StorageConfig {
            imagekit_private_key: None,
            imagekit_upload_url: "https://upload.imagekit.io/api/v1/files/upload".to_string(),
            upload_folder: "/pdfs".to_string(),
            upload_dir: "uploads/epapers".to_string(),
            public_base_url: String::new(),
        };
        assert_eq!(from_config(&config).name(), "local");

        let config = StorageConfig {
            imagekit_private_key: Some("private_x".to_string()),
            ..config
        };
        assert_eq!(from_config(&config).name(), "imagekit");
    }
}
