use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::catalog::{FileEntry, UploadedFile};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub is_rendered: bool,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub originalname: String,
    pub size: u64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRenderedRequest {
    /// Kept as raw JSON so that non-boolean values can be rejected explicitly.
    #[serde(default)]
    pub is_rendered: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRenderedResponse {
    pub is_rendered: bool,
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<FileResponse>>>, ApiError> {
    let files = state.catalog.list().await?;
    Ok(JSend::success(files.into_iter().map(entry_to_response).collect()))
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JSend<UploadResponse>>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart data", e))?
    {
        if field.name() != Some("file") {
            // Ignore unknown fields
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file", e))?;

        if data.len() as u64 > state.config.max_upload_size {
            return Err(ApiError::payload_too_large(format!(
                "File exceeds maximum upload size of {} bytes",
                state.config.max_upload_size
            )));
        }

        let mut reader: &[u8] = &data;
        let uploaded = state
            .catalog
            .upload(file_name.as_deref(), &mut reader)
            .await?;

        return Ok((StatusCode::CREATED, JSend::success(upload_to_response(uploaded))));
    }

    Err(ApiError::bad_request("No file uploaded"))
}

pub async fn set_rendered(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    AppJson(req): AppJson<SetRenderedRequest>,
) -> Result<Json<JSend<SetRenderedResponse>>, ApiError> {
    let rendered = state.catalog.set_rendered(&name, &req.is_rendered).await?;

    Ok(JSend::success(SetRenderedResponse {
        is_rendered: rendered,
        success: true,
    }))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

/// Keep the status axum assigns (413 when the body limit is hit, 400 otherwise).
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    let status = e.status();
    let message = format!("{context}: {}", e.body_text());
    if status.is_server_error() {
        ApiError::Error(status, message)
    } else {
        ApiError::Fail(status, message)
    }
}

fn entry_to_response(entry: FileEntry) -> FileResponse {
    FileResponse {
        is_rendered: entry.rendered,
        name: entry.name,
    }
}

fn upload_to_response(uploaded: UploadedFile) -> UploadResponse {
    UploadResponse {
        filename: uploaded.name,
        originalname: uploaded.original_name,
        size: uploaded.size,
    }
}
