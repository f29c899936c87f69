//! File storage abstraction layer.
//!
//! Uploaded documents (photos, proofs, resumes, books, exam papers) are saved
//! under a category folder picked from the form field name, with a
//! timestamped and sanitized file name:
//!
//! ```text
//! uploads/<category>/<timestamp>-<sanitized-name>
//! ```
//!
//! The storage key (`<category>/<timestamp>-<sanitized-name>`) is what gets
//! persisted on the owning row. Keys are served back under `/uploads/`.
//!
//! # Example
//!
//! ```ignore
//! use edunexus_core::file_storage::{upload_key, FileStorage, LocalFileStorage};
//!
//! let storage = LocalFileStorage::new(PathBuf::from("./uploads"));
//! let key = upload_key("photo", "Passport Photo.JPG", Utc::now());
//! storage.save(&key, &bytes, "image/jpeg").await?;
//! storage.delete(&key).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::errors::AppError;

type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Abstract trait for file storage backends.
pub trait FileStorage: Send + Sync {
    /// Save file content under `key` and return the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8], content_type: &'a str)
    -> StorageFuture<'a, String>;

    /// Read a stored file. Missing files yield [`StorageError::NotFound`].
    fn read<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Vec<u8>>;

    /// Delete a file by key. A file that is already gone is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;
}

/// Error type for file storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// File exceeds maximum allowed size.
    InvalidFileSize { max_bytes: usize },

    /// MIME type not allowed.
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    /// I/O error (file system or similar).
    IoError(std::io::Error),

    /// File not found.
    NotFound,

    /// Invalid storage key format.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received, allowed } => {
                write!(
                    f,
                    "MIME type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::NotFound => write!(f, "File not found"),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl StorageError {
    /// Client-caused failures map to 400; I/O problems stay 500.
    pub fn into_app_error(self) -> AppError {
        let status = match self {
            Self::InvalidFileSize { .. } | Self::InvalidMimeType { .. } | Self::InvalidKey(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, self)
    }
}

/// Folder for an upload, chosen by the multipart field it arrived in.
pub fn category_for_field(field: &str) -> &'static str {
    match field {
        "resume" | "cv" => "resumes",
        "photo" | "image" | "owner_photo" | "centre_photo" | "signature" | "team_photo" => "images",
        "id_proof" | "address_proof" | "qualification_proof" => "center-apply",
        "gallery_image" => "gallery",
        "slider_image" => "sliders",
        "download_file" => "downloads",
        "book_file" | "cover_image" => "books",
        "notice_file" | "attachment" => "notices",
        "question_paper" | "answer_sheet" => "exam-papers",
        _ => "misc",
    }
}

/// Keeps ASCII alphanumerics, dots, hyphens and underscores; everything else
/// becomes `-`. The extension is lowercased.
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");

    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext.to_ascii_lowercase())),
        _ => (base, None),
    };

    let mut clean: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    while clean.contains("--") {
        clean = clean.replace("--", "-");
    }
    let clean = clean.trim_matches('-');
    let clean = if clean.is_empty() { "file" } else { clean };

    match ext {
        Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => format!("{}.{}", clean, ext),
        _ => clean.to_string(),
    }
}

pub fn upload_key(field: &str, original_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}-{}",
        category_for_field(field),
        now.timestamp_millis(),
        sanitize_file_name(original_name)
    )
}

/// Local filesystem-based file storage implementation.
#[derive(Clone)]
pub struct LocalFileStorage {
    /// Base directory where files are stored
    base_dir: PathBuf,

    /// Maximum file size in bytes
    max_file_size: usize,

    allowed_mime_types: Vec<String>,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self::with_max_size(base_dir, DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_size(base_dir: PathBuf, max_file_size: usize) -> Self {
        Self {
            base_dir,
            max_file_size,
            allowed_mime_types: ALLOWED_MIME_TYPES.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn check_mime_type(&self, content_type: &str) -> Result<(), StorageError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if self.allowed_mime_types.iter().any(|m| *m == essence) {
            Ok(())
        } else {
            Err(StorageError::InvalidMimeType {
                received: essence,
                allowed: self.allowed_mime_types.clone(),
            })
        }
    }

    /// Validate storage key format to prevent path traversal.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
        content_type: &'a str,
    ) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;
            self.check_mime_type(content_type)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn read<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Vec<u8>> {
        Box::pin(async move {
            Self::validate_key(key)?;
            match fs::read(self.base_dir.join(key)).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn storage(dir: &Path) -> LocalFileStorage {
        LocalFileStorage::with_max_size(dir.to_path_buf(), 16)
    }

    #[test]
    fn test_validate_key_accepts_valid_keys() {
        assert!(LocalFileStorage::validate_key("images/1700000000000-photo.png").is_ok());
        assert!(LocalFileStorage::validate_key("books/abc_123.pdf").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_traversal() {
        assert!(LocalFileStorage::validate_key("../../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("..\\windows\\system32").is_err());
    }

    #[test]
    fn test_validate_key_rejects_absolute_paths() {
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("\\windows\\system32").is_err());
    }

    #[test]
    fn test_category_follows_field_name() {
        assert_eq!(category_for_field("resume"), "resumes");
        assert_eq!(category_for_field("photo"), "images");
        assert_eq!(category_for_field("id_proof"), "center-apply");
        assert_eq!(category_for_field("gallery_image"), "gallery");
        assert_eq!(category_for_field("download_file"), "downloads");
        assert_eq!(category_for_field("question_paper"), "exam-papers");
        assert_eq!(category_for_field("whatever"), "misc");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Passport Photo.JPG"), "Passport-Photo.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("résumé (final).pdf"), "r-sum-final.pdf");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("***"), "file");
    }

    #[test]
    fn test_upload_key_layout() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let key = upload_key("resume", "My CV.pdf", now);
        assert_eq!(key, format!("resumes/{}-My-CV.pdf", now.timestamp_millis()));
        assert!(LocalFileStorage::validate_key(&key).is_ok());
    }

    #[test]
    fn test_mime_check_ignores_parameters() {
        let storage = LocalFileStorage::new(PathBuf::from("./uploads"));
        assert!(storage.check_mime_type("image/PNG").is_ok());
        assert!(storage.check_mime_type("application/pdf; charset=binary").is_ok());
        assert!(storage.check_mime_type("text/html").is_err());
    }

    #[tokio::test]
    async fn test_save_read_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let key = storage
            .save("books/1-guide.pdf", b"%PDF-1.4", "application/pdf")
            .await
            .unwrap();
        assert_eq!(storage.read(&key).await.unwrap(), b"%PDF-1.4");

        storage.delete(&key).await.unwrap();
        assert!(!dir.path().join(&key).exists());
        assert!(matches!(storage.read(&key).await, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        assert!(storage.delete("downloads/1-missing.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_and_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let too_big = vec![0u8; 17];
        let err = storage
            .save("images/1-big.png", &too_big, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidFileSize { max_bytes: 16 }));

        let err = storage
            .save("images/1-page.html", b"<html>", "text/html")
            .await
            .unwrap_err();
        assert_eq!(err.into_app_error().status, StatusCode::BAD_REQUEST);
    }
}
