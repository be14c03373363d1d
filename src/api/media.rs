//! Media upload endpoints

use axum::{
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    response::IntoResponse,
};
use serde::Deserialize;

use super::envelope::ApiResponse;
use super::extract::ValidJson;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::MediaKind;
use crate::error::AppError;
use crate::service::{MAX_FILES_PER_UPLOAD, MediaService, UploadFile, max_file_bytes};

fn media_service(state: &AppState) -> MediaService {
    MediaService::new(state.db.clone(), state.storage.clone())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteMediaRequest {
    pub public_id: String,
}

/// Collect every part named `field_name`
///
/// Each part is read chunk by chunk and cut one byte past the kind's limit,
/// which is enough for the service to reject it as oversize.
async fn collect_files(
    mut multipart: Multipart,
    field_name: &str,
    kind: MediaKind,
) -> Result<Vec<UploadFile>, AppError> {
    let limit = max_file_bytes(kind);
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        if files.len() == MAX_FILES_PER_UPLOAD {
            return Err(AppError::validation(format!(
                "Too many files. At most {} files per upload",
                MAX_FILES_PER_UPLOAD
            )));
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?
        {
            let room = (limit + 1).saturating_sub(data.len());
            data.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if data.len() > limit {
                break;
            }
        }

        files.push(UploadFile { file_name, data });
    }

    Ok(files)
}

fn upload_message(kind: MediaKind, count: usize) -> String {
    let label = match kind {
        MediaKind::Image => "Image",
        MediaKind::Video => "Video",
    };
    if count == 1 {
        format!("{} uploaded successfully", label)
    } else {
        format!("{}s uploaded successfully", label)
    }
}

/// POST /api/v1/media/single/:kind
pub async fn upload_single(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(kind): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let kind = MediaKind::parse(&kind)?;
    let mut files = collect_files(multipart?, "file", kind).await?;
    files.truncate(1);

    let mut stored = media_service(&state)
        .upload(&account, kind, files)
        .await?;
    let media = stored
        .pop()
        .ok_or_else(|| AppError::validation("No file uploaded"))?;

    Ok(ApiResponse::created(media, upload_message(kind, 1)))
}

/// POST /api/v1/media/multiple/:kind
pub async fn upload_multiple(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(kind): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let kind = MediaKind::parse(&kind)?;
    let files = collect_files(multipart?, "files", kind).await?;

    let stored = media_service(&state)
        .upload(&account, kind, files)
        .await?;
    let message = upload_message(kind, stored.len());

    Ok(ApiResponse::created(stored, message))
}

/// DELETE /api/v1/media
pub async fn delete_media(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<DeleteMediaRequest>,
) -> Result<impl IntoResponse, AppError> {
    media_service(&state)
        .delete(&account, &req.public_id)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "publicId": req.public_id.trim() }),
        "Media deleted successfully",
    ))
}
