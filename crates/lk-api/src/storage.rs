//! Storage operations of the backend client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;

/// Request to upload a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFileRequest {
    /// File name recorded in the file's metadata.
    pub file_name: String,
    /// File content.
    pub content: Vec<u8>,
    /// MIME type of the content.
    pub mime_type: String,
    /// Target bucket; the backend's default bucket when absent.
    pub bucket_id: Option<String>,
}

/// Request to download a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFileRequest {
    /// Id of the file to download.
    pub file_id: Uuid,
}

/// Request to delete a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    /// Id of the file to delete.
    pub file_id: Uuid,
}

/// Metadata of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Unique file identifier.
    pub id: Uuid,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: String,
    /// Bucket the file lives in.
    pub bucket_id: String,
    /// Entity tag of the stored content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// When the file was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Storage operations.
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Uploads a file and returns its metadata.
    async fn upload_file(&self, request: UploadFileRequest) -> ApiResult<FileMetadata>;

    /// Downloads a file's content.
    async fn download_file(&self, request: DownloadFileRequest) -> ApiResult<Vec<u8>>;

    /// Deletes a file.
    async fn delete_file(&self, request: DeleteFileRequest) -> ApiResult<()>;
}
