use axum::extract::{Multipart, Path, State};
use chrono::Utc;
use db::documents::Attachment;
use services::achievement_service::AchievementView;
use tracing::warn;
use validator::Validate;

use super::common::{AchievementRequest, RejectRequest, VerifyRequest};
use crate::auth::AuthUser;
use crate::extract::JsonBody;
use crate::response::{ApiError, ApiResult, created, ok};
use crate::state::AppState;
use crate::storage::{self, MAX_ATTACHMENT_BYTES, StoredFile};

/// POST /api/v1/achievements
///
/// Creates a draft for the caller's student profile. Points start at 0.
///
/// ### Request Body
/// ```json
/// {
///   "achievement_type": "competition",
///   "title": "National Programming Contest",
///   "description": "Second place",
///   "details": { "competition": { "competition_name": "NPC", "competition_level": "national", "rank": 2 } },
///   "tags": ["programming"]
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with the new achievement (`status: "draft"`, `points: 0`)
/// - `400 Bad Request` (validation)
/// - `404 Not Found` (`Student profile not found`)
pub async fn create_achievement(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<AchievementRequest>,
) -> ApiResult<AchievementView> {
    req.validate()?;
    let view = state.achievements().create(&user.caller(), req.into()).await?;
    created(view, "Achievement created successfully")
}

/// POST /api/v1/achievements/{id}/submit
///
/// `draft → submitted`, owner only.
pub async fn submit_achievement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<AchievementView> {
    let view = state.achievements().submit(&user.caller(), &id).await?;
    ok(view, "Achievement submitted for verification")
}

/// POST /api/v1/achievements/{id}/verify
///
/// `submitted → verified` and assigns the points.
///
/// ### Request Body
/// ```json
/// { "points": 50 }
/// ```
///
/// - `200 OK` (`status: "verified"`, `verified_by`, `verified_at` set)
/// - `400 Bad Request` (`points` not positive, or not in `submitted`)
pub async fn verify_achievement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<VerifyRequest>,
) -> ApiResult<AchievementView> {
    req.validate()?;
    let view = state.achievements().verify(&user.caller(), &id, req.points).await?;
    ok(view, "Achievement verified")
}

/// POST /api/v1/achievements/{id}/reject
///
/// ### Request Body
/// ```json
/// { "rejection_note": "Certificate is not legible" }
/// ```
pub async fn reject_achievement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<RejectRequest>,
) -> ApiResult<AchievementView> {
    req.validate()?;
    let view = state
        .achievements()
        .reject(&user.caller(), &id, &req.rejection_note)
        .await?;
    ok(view, "Achievement rejected")
}

/// POST /api/v1/achievements/{id}/attachments
///
/// Multipart upload; every part named `files` (or `file`) is stored. Only the
/// owner may upload, and only while the achievement is a draft.
///
/// ### Responses
/// - `200 OK` with the updated achievement
/// - `400 Bad Request` (no files, file too large, bad file name, not a draft)
/// - `403 Forbidden` (not the owner)
/// - `404 Not Found`
pub async fn upload_attachments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<AchievementView> {
    let caller = user.caller();
    let service = state.achievements();
    let document_id = service.attachment_target(&caller, &id).await?;

    let mut stored: Vec<StoredFile> = Vec::new();
    let result = match store_files(&state, &document_id, multipart, &mut stored).await {
        Ok(attachments) => service
            .add_attachments(&caller, &id, attachments)
            .await
            .map_err(ApiError::from),
        Err(err) => Err(err),
    };

    match result {
        Ok(view) => ok(view, "Attachments uploaded successfully"),
        Err(err) => {
            if !stored.is_empty() {
                warn!(achievement_id = %id, files = stored.len(), "Upload failed; removing stored files");
                storage::discard(&stored).await;
            }
            Err(err)
        }
    }
}

/// Writes every `files`/`file` part to disk. `stored` collects what was
/// written so far so that the caller can clean up on failure.
async fn store_files(
    state: &AppState,
    document_id: &str,
    mut multipart: Multipart,
    stored: &mut Vec<StoredFile>,
) -> Result<Vec<Attachment>, ApiError> {
    let mut attachments = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if !matches!(field.name(), Some("files") | Some("file")) {
            continue;
        }

        let original = field.file_name().unwrap_or("").to_string();
        let file_name = storage::sanitize_file_name(&original)
            .ok_or_else(|| ApiError::bad_request("Every file needs a valid file name"))?;
        let file_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream().to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
        if bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(ApiError::bad_request(format!("{file_name} exceeds the 10 MB limit")));
        }

        let file = storage::save_attachment(state.upload_root(), document_id, &file_name, &bytes)
            .await
            .map_err(ApiError::internal)?;

        attachments.push(Attachment {
            file_name,
            file_url: file.url.clone(),
            file_type,
            uploaded_at: Utc::now(),
        });
        stored.push(file);
    }

    if attachments.is_empty() {
        return Err(ApiError::bad_request("No files uploaded"));
    }
    Ok(attachments)
}
