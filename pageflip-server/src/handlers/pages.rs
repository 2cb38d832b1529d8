//! Page image upload handler

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use pageflip_core::wizard::{DraftUpdate, WizardSession};
use pageflip_core::SelectedFile;
use serde::Serialize;

/// Uploaded page URLs, in page order
#[derive(Debug, Serialize)]
pub struct UploadPagesResponse {
    pub images: Vec<String>,
}

/// Upload an ordered set of page images
///
/// Expects a `title` text field and one `file` field per page, in page
/// order. Pages are stored in the caller's own scope. Returns the public URLs
/// to pass to `POST /books/create`.
pub async fn upload_pages(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<Json<UploadPagesResponse>, ApiError> {
    let owner = caller.require()?;

    let mut session = WizardSession::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => {
                let title = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                session.set_draft(DraftUpdate {
                    title: Some(title),
                    ..DraftUpdate::default()
                });
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                files.push(SelectedFile::new(filename, data.to_vec()));
            }
            _ => {}
        }
    }

    if session.draft().map_or(true, |d| d.title.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if files.is_empty() {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }

    session.add_images(files)?;
    let images = session.upload(&state.pipeline.for_owner(owner)).await?;
    session.discard();

    tracing::info!(owner = %owner, pages = images.len(), "Uploaded book pages");
    Ok(Json(UploadPagesResponse { images }))
}
