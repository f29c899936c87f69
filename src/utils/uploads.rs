use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use edunexus_core::AppError;
use edunexus_core::file_storage::{FileStorage, upload_key};

use crate::validator::UploadedFile;

/// Files written for one request, keyed by the form field they came from.
///
/// If the write that references them fails, [`StoredFiles::settle`] removes
/// them again so no orphan is left behind.
pub struct StoredFiles {
    storage: Arc<dyn FileStorage>,
    saved: Vec<(String, String)>,
}

impl StoredFiles {
    pub fn empty(storage: &Arc<dyn FileStorage>) -> Self {
        Self {
            storage: Arc::clone(storage),
            saved: Vec::new(),
        }
    }

    pub async fn persist(
        storage: &Arc<dyn FileStorage>,
        files: &[UploadedFile],
    ) -> Result<Self, AppError> {
        let now = Utc::now();
        let mut stored = Self::empty(storage);

        for (i, file) in files.iter().enumerate() {
            // Offset by position so two same-named files in one form get distinct keys.
            let key = upload_key(
                &file.field,
                &file.file_name,
                now + Duration::milliseconds(i as i64),
            );
            match storage.save(&key, &file.bytes, &file.content_type).await {
                Ok(key) => {
                    debug!(field = %file.field, key = %key, size = file.bytes.len(), "Stored upload");
                    stored.saved.push((file.field.clone(), key));
                }
                Err(e) => {
                    stored.discard().await;
                    return Err(e.into_app_error());
                }
            }
        }

        Ok(stored)
    }

    pub fn key(&self, field: &str) -> Option<String> {
        self.saved
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, key)| key.clone())
    }

    /// `previous` when this request stored a different file for `field`.
    pub fn supersedes(&self, field: &str, previous: Option<&str>) -> Option<String> {
        let previous = previous?;
        self.key(field)
            .filter(|key| key != previous)
            .map(|_| previous.to_string())
    }

    /// Removes every stored file.
    pub async fn discard(self) {
        remove_files(
            self.storage.as_ref(),
            self.saved.iter().map(saved_key),
        )
        .await;
    }

    /// Passes `result` through, discarding the files when it is an error.
    pub async fn settle<T>(self, result: Result<T, AppError>) -> Result<T, AppError> {
        if result.is_err() {
            self.discard().await;
        }
        result
    }
}

fn saved_key((_, key): &(String, String)) -> &str {
    key.as_str()
}

/// Best-effort deletion. Missing files are fine; other failures are logged.
pub async fn remove_files<'a, I>(storage: &dyn FileStorage, keys: I)
where
    I: IntoIterator<Item = &'a str>,
{
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            warn!(key = %key, error = %e, "Failed to remove stored file");
        }
    }
}

/// Keys that `previous` held and `current` no longer references.
pub fn replaced_keys<'a>(previous: &[(&str, &'a str)], current: &[(&str, &str)]) -> Vec<&'a str> {
    previous
        .iter()
        .filter(|(field, key)| {
            current
                .iter()
                .find(|(f, _)| f == field)
                .is_none_or(|(_, k)| k != key)
        })
        .map(|(_, key)| *key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use edunexus_core::file_storage::LocalFileStorage;
    use std::path::Path;

    fn upload(field: &str, name: &str) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG"),
        }
    }

    fn storage(dir: &Path) -> Arc<dyn FileStorage> {
        Arc::new(LocalFileStorage::new(dir.to_path_buf()))
    }

    #[tokio::test]
    async fn same_named_files_get_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let stored = StoredFiles::persist(
            &storage,
            &[upload("owner_photo", "photo.png"), upload("centre_photo", "photo.png")],
        )
        .await
        .unwrap();

        let owner = stored.key("owner_photo").unwrap();
        let centre = stored.key("centre_photo").unwrap();
        assert_ne!(owner, centre);
        assert!(owner.starts_with("images/"));
        assert!(dir.path().join(&owner).exists());
        assert!(dir.path().join(&centre).exists());
    }

    #[tokio::test]
    async fn settle_discards_files_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let stored = StoredFiles::persist(&storage, &[upload("photo", "me.png")])
            .await
            .unwrap();
        let key = stored.key("photo").unwrap();
        assert!(dir.path().join(&key).exists());

        let result: Result<(), AppError> = stored
            .settle(Err(AppError::bad_request(anyhow::anyhow!("insert failed"))))
            .await;
        assert!(result.is_err());
        assert!(!dir.path().join(&key).exists());
    }

    #[tokio::test]
    async fn removing_missing_files_does_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        remove_files(storage.as_ref(), ["books/123-gone.pdf"]).await;
    }

    #[tokio::test]
    async fn supersedes_only_when_a_new_file_arrived() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let stored = StoredFiles::persist(&storage, &[upload("attachment", "notice.pdf")])
            .await
            .unwrap();

        assert_eq!(
            stored.supersedes("attachment", Some("notices/1-old.pdf")),
            Some("notices/1-old.pdf".to_string())
        );
        assert_eq!(stored.supersedes("attachment", None), None);
        assert_eq!(stored.supersedes("resume", Some("resumes/1-cv.pdf")), None);
    }

    #[test]
    fn replaced_keys_lists_only_changed_fields() {
        let previous = [("photo", "images/1-a.png"), ("id_proof", "center-apply/1-b.pdf")];
        let current = [("photo", "images/2-c.png"), ("id_proof", "center-apply/1-b.pdf")];
        assert_eq!(replaced_keys(&previous, &current), vec!["images/1-a.png"]);
    }
}
