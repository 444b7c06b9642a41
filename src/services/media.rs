//! Image upload orchestration shared by every image-bearing entity.
//!
//! The object is written first and the row second. If the row write fails, the fresh
//! object is removed again; objects replaced or orphaned by a successful write are
//! removed afterwards. Failed removals are logged and never fail the request.

use crate::error::AppResult;
use crate::storage::{StorageService, object_key};
use crate::uploads::UploadedFile;
use crate::AppState;

/// Validates `file` as an image and stores it under `folder`. Returns the new key.
pub async fn store_image(
    state: &AppState,
    folder: &str,
    field: &str,
    file: UploadedFile,
) -> AppResult<String> {
    file.validate_image(field, state.config.max_upload_bytes)?;

    let key = object_key(folder, &file.file_name);
    state
        .storage
        .upload(&key, file.data, &file.content_type)
        .await?;

    tracing::debug!(key = %key, "stored image");
    Ok(key)
}

/// Stores `file` when one was sent.
pub async fn store_optional(
    state: &AppState,
    folder: &str,
    field: &str,
    file: Option<UploadedFile>,
) -> AppResult<Option<String>> {
    match file {
        Some(file) => store_image(state, folder, field, file).await.map(Some),
        None => Ok(None),
    }
}

/// Best-effort delete.
pub async fn discard(storage: &dyn StorageService, key: &str) {
    match storage.delete(key).await {
        Ok(()) => tracing::debug!(key, "deleted stored object"),
        Err(e) => tracing::warn!(key, error = %e, "failed to delete stored object"),
    }
}

/// Passes `result` through, removing `fresh_key` first when the write failed.
pub async fn settle<T>(
    storage: &dyn StorageService,
    result: AppResult<T>,
    fresh_key: Option<&str>,
) -> AppResult<T> {
    if result.is_err() {
        if let Some(key) = fresh_key {
            discard(storage, key).await;
        }
    }
    result
}

/// Works out the key an optional image slot should hold after an update.
///
/// Returns `(new_value, obsolete_key)`: a fresh upload replaces the current key, an
/// explicit removal clears it, otherwise it is kept.
pub fn next_key(
    current: Option<String>,
    fresh: Option<String>,
    remove: bool,
) -> (Option<String>, Option<String>) {
    match (fresh, remove) {
        (Some(fresh), _) => (Some(fresh), current),
        (None, true) => (None, current),
        (None, false) => (current, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::MockStorageService;

    #[test]
    fn next_key_transitions() {
        let old = Some("a/old.png".to_string());
        let new = Some("a/new.png".to_string());

        assert_eq!(next_key(old.clone(), new.clone(), false), (new.clone(), old.clone()));
        assert_eq!(next_key(old.clone(), new.clone(), true), (new, old.clone()));
        assert_eq!(next_key(old.clone(), None, true), (None, old.clone()));
        assert_eq!(next_key(old.clone(), None, false), (old, None));
        assert_eq!(next_key(None, None, true), (None, None));
    }

    #[tokio::test]
    async fn settle_removes_fresh_object_on_failure() {
        let storage = MockStorageService::new();
        storage.upload("a/new.png", vec![1], "image/png").await.unwrap();

        let failed: AppResult<()> = Err(AppError::Internal("boom".into()));
        assert!(settle(&storage, failed, Some("a/new.png")).await.is_err());
        assert!(!storage.contains("a/new.png"));
    }

    #[tokio::test]
    async fn settle_keeps_object_on_success() {
        let storage = MockStorageService::new();
        storage.upload("a/new.png", vec![1], "image/png").await.unwrap();

        assert_eq!(settle(&storage, Ok(5), Some("a/new.png")).await.unwrap(), 5);
        assert!(storage.contains("a/new.png"));
    }

    #[tokio::test]
    async fn discard_swallows_storage_errors() {
        let storage = MockStorageService::new_failing();
        discard(&storage, "a/missing.png").await;
    }
}
