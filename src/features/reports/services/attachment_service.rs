use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use rand::{rngs::OsRng, RngCore};
use tracing::{debug, error, warn};

use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::IncomingFile;
use crate::features::reports::models::ReportFile;
use crate::modules::storage::{ObjectStorage, StoredObject};
use crate::shared::constants::REPORT_ATTACHMENT_FOLDER;
use crate::shared::validation::sanitize_filename;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Attachments that were stored for one submission
#[derive(Debug, Default)]
pub struct UploadedAttachments {
    pub files: Vec<ReportFile>,
    keys: Vec<String>,
}

impl UploadedAttachments {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// Uploads report attachments to object storage.
///
/// Either every file of a submission is stored or none is.
#[derive(Clone)]
pub struct AttachmentService {
    storage: Arc<dyn ObjectStorage>,
    limits: UploadConfig,
}

impl AttachmentService {
    pub fn new(storage: Arc<dyn ObjectStorage>, limits: UploadConfig) -> Self {
        Self { storage, limits }
    }

    pub fn limits(&self) -> &UploadConfig {
        &self.limits
    }

    /// Reject a file set that exceeds the count or per-file size limit
    pub fn check_limits(&self, files: &[IncomingFile]) -> Result<()> {
        if files.len() > self.limits.max_files {
            return Err(too_many_files(self.limits.max_files));
        }
        if let Some(file) = files.iter().find(|f| f.data.len() > self.limits.max_file_size) {
            return Err(file_too_large(&file.file_name, self.limits.max_file_size));
        }
        Ok(())
    }

    /// Store every file concurrently. The result keeps input order.
    ///
    /// When any upload fails, the ones that succeeded are deleted again and a
    /// storage error is returned.
    pub async fn upload_all(&self, files: Vec<IncomingFile>) -> Result<UploadedAttachments> {
        self.check_limits(&files)?;
        if files.is_empty() {
            return Ok(UploadedAttachments::default());
        }

        let mut pending = Vec::with_capacity(files.len());
        for file in files {
            let name = sanitize_filename(&file.file_name);
            let path = storage_path(&name)?;
            pending.push((file, name, path));
        }

        let uploads = pending.into_iter().map(|(file, name, path)| {
            let storage = Arc::clone(&self.storage);
            async move {
                let content_type = if file.content_type.trim().is_empty() {
                    DEFAULT_CONTENT_TYPE
                } else {
                    file.content_type.as_str()
                };
                let stored = storage.put_public(&path, file.data, content_type).await;
                (name, stored)
            }
        });

        let results = join_all(uploads).await;

        let mut uploaded = UploadedAttachments::default();
        let mut first_error: Option<AppError> = None;
        for (original_name, result) in results {
            match result {
                Ok(StoredObject { key, url }) => {
                    uploaded.keys.push(key);
                    uploaded.files.push(ReportFile { url, original_name });
                }
                Err(e) => {
                    warn!("Upload of '{}' failed: {}", original_name, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            self.discard(uploaded.keys()).await;
            return Err(match e {
                AppError::Storage(_) => e,
                other => AppError::Storage(other.to_string()),
            });
        }

        debug!("Stored {} attachment(s)", uploaded.files.len());
        Ok(uploaded)
    }

    /// Best-effort removal of stored objects. Failures are logged as orphans.
    pub async fn discard(&self, keys: &[String]) {
        let deletions = keys.iter().map(|key| {
            let storage = Arc::clone(&self.storage);
            async move { (key, storage.delete(key).await) }
        });

        for (key, result) in join_all(deletions).await {
            if let Err(e) = result {
                error!(orphaned_key = %key, "Failed to remove stored attachment: {}", e);
            }
        }
    }

    /// Remove the objects behind previously recorded attachment URLs
    pub async fn discard_files(&self, files: &[ReportFile]) {
        let keys: Vec<String> = files
            .iter()
            .filter_map(|f| {
                let key = self.storage.key_from_url(&f.url);
                if key.is_none() {
                    warn!("Attachment URL is not in this bucket: {}", f.url);
                }
                key
            })
            .collect();
        self.discard(&keys).await;
    }
}

pub(crate) fn too_many_files(max: usize) -> AppError {
    AppError::TooManyFiles(format!("At most {} files may be attached", max))
}

pub(crate) fn file_too_large(name: &str, max: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File '{}' exceeds the {} byte limit",
        name, max
    ))
}

/// `reports/{unix_millis}-{8 hex}-{name}`, relative to the public prefix.
/// `name` must already be sanitized.
fn storage_path(name: &str) -> Result<String> {
    let mut random = [0u8; 4];
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|e| AppError::Internal(format!("Entropy source unavailable: {}", e)))?;

    Ok(format!(
        "{}/{}-{}-{}",
        REPORT_ATTACHMENT_FOLDER,
        Utc::now().timestamp_millis(),
        hex::encode(random),
        name
    ))
}
