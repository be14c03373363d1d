//! Media service
//!
//! Validates uploads by kind, stores the bytes and records the uploader so
//! only they can delete the object later.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Account, Database, EntityId, MediaKind, MediaObject, MediaRef};
use crate::error::AppError;
use crate::storage::MediaStorage;

/// Maximum number of files in one multi-file upload
pub const MAX_FILES_PER_UPLOAD: usize = 10;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];
const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
const MAX_VIDEO_BYTES: usize = 25 * 1024 * 1024;

/// Upload limits for a media kind
pub fn max_file_bytes(kind: MediaKind) -> usize {
    match kind {
        MediaKind::Image => MAX_IMAGE_BYTES,
        MediaKind::Video => MAX_VIDEO_BYTES,
    }
}

fn allowed_extensions(kind: MediaKind) -> &'static [&'static str] {
    match kind {
        MediaKind::Image => IMAGE_EXTENSIONS,
        MediaKind::Video => VIDEO_EXTENSIONS,
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// One file taken from a multipart body
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Lowercased extension, checked against the kind's allow-list
    fn validated_extension(&self, kind: MediaKind) -> Result<String, AppError> {
        let extension = std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !allowed_extensions(kind).contains(&extension.as_str()) {
            return Err(AppError::validation(format!(
                "Invalid file format. Allowed {} formats: {}",
                kind.as_str(),
                allowed_extensions(kind).join(", ")
            )));
        }

        if self.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        if self.data.len() > max_file_bytes(kind) {
            return Err(AppError::validation(format!(
                "File too large. Maximum {} size is {} MB",
                kind.as_str(),
                max_file_bytes(kind) / (1024 * 1024)
            )));
        }

        Ok(extension)
    }
}

/// Media service
pub struct MediaService {
    db: Arc<Database>,
    storage: Arc<MediaStorage>,
}

impl MediaService {
    pub fn new(db: Arc<Database>, storage: Arc<MediaStorage>) -> Self {
        Self { db, storage }
    }

    /// Store a batch of files of one kind
    ///
    /// Every file is validated before any is stored, so a bad file rejects
    /// the whole batch. A failure while storing discards the files already
    /// written, so the batch lands completely or not at all.
    pub async fn upload(
        &self,
        owner: &Account,
        kind: MediaKind,
        files: Vec<UploadFile>,
    ) -> Result<Vec<MediaRef>, AppError> {
        if files.is_empty() {
            return Err(AppError::validation("No file uploaded"));
        }
        if files.len() > MAX_FILES_PER_UPLOAD {
            return Err(AppError::validation(format!(
                "Too many files. At most {} files per upload",
                MAX_FILES_PER_UPLOAD
            )));
        }

        let extensions = files
            .iter()
            .map(|file| file.validated_extension(kind))
            .collect::<Result<Vec<_>, _>>()?;

        let mut written: Vec<MediaObject> = Vec::with_capacity(files.len());
        for (file, extension) in files.into_iter().zip(extensions) {
            match self.store_one(owner, kind, file, &extension).await {
                Ok(media) => written.push(media),
                Err(e) => {
                    self.discard(&written).await;
                    return Err(e);
                }
            }
        }

        for media in &written {
            crate::metrics::MEDIA_UPLOADS_TOTAL
                .with_label_values(&[kind.as_str()])
                .inc();
            tracing::info!(key = %media.storage_key, owner_id = %owner.id, size = media.file_size, "Media uploaded");
        }

        Ok(written.iter().map(MediaObject::to_media_ref).collect())
    }

    /// Write one file and its row; the object is removed again if the row
    /// cannot be recorded
    async fn store_one(
        &self,
        owner: &Account,
        kind: MediaKind,
        file: UploadFile,
        extension: &str,
    ) -> Result<MediaObject, AppError> {
        let id = EntityId::new().0;
        let storage_key = format!("{}s/{}.{}", kind.as_str(), id.to_lowercase(), extension);
        let content_type = content_type_for(extension);
        let file_size = file.data.len() as i64;

        let url = self
            .storage
            .upload(&storage_key, file.data, content_type)
            .await?;

        let media = MediaObject {
            id,
            owner_id: owner.id.clone(),
            storage_key,
            url,
            kind,
            content_type: content_type.to_string(),
            file_size,
            created_at: Utc::now(),
        };

        if let Err(e) = self.db.insert_media(&media).await {
            if let Err(cleanup) = self.storage.delete(&media.storage_key).await {
                tracing::warn!(key = %media.storage_key, error = %cleanup, "Failed to remove unrecorded media object");
            }
            return Err(e);
        }

        Ok(media)
    }

    /// Best-effort removal of the objects and rows of an aborted batch
    async fn discard(&self, written: &[MediaObject]) {
        for media in written {
            if let Err(e) = self.storage.delete(&media.storage_key).await {
                tracing::warn!(key = %media.storage_key, error = %e, "Failed to remove media object of aborted upload");
            }
            if let Err(e) = self.db.delete_media(&media.id).await {
                tracing::warn!(media_id = %media.id, error = %e, "Failed to remove media row of aborted upload");
            }
        }
    }

    /// Delete an uploaded object by its public id
    pub async fn delete(&self, owner: &Account, public_id: &str) -> Result<(), AppError> {
        let public_id = public_id.trim();
        if public_id.is_empty() {
            return Err(AppError::validation("publicId is required"));
        }

        let media = self
            .db
            .get_media_by_key(public_id)
            .await?
            .ok_or_else(|| AppError::not_found("Media not found"))?;

        if media.owner_id != owner.id {
            return Err(AppError::forbidden("You can only delete your own media"));
        }

        self.storage.delete(&media.storage_key).await?;
        self.db.delete_media(&media.id).await?;

        tracing::info!(key = %media.storage_key, "Media deleted");
        Ok(())
    }
}
