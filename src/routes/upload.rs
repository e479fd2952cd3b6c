use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::auth::AdminUser;
use crate::routes::papers::parse_date;
use crate::state::AppState;
use crate::storage::FileUpload;

const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub pdf_url: String,
    pub file_id: String,
    pub file_name: String,
    pub file_size: i64,
    pub date: chrono::NaiveDate,
    pub uploaded_by: String,
}

fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

fn clean_file_name(raw: Option<&str>) -> String {
    // Keep only the last path component of whatever the browser sent.
    raw.and_then(|name| name.rsplit(['/', '\\']).next())
        .map(|name| name.replace('\0', ""))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "epaper.pdf".to_string())
}

/// POST /api/upload-epaper - Store a PDF for a date (auth required)
///
/// Only stores the file. The record is created by a follow-up
/// `POST /api/papers` with the returned URL and id.
pub async fn upload_epaper(
    admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut file: Option<FileUpload> = None;
    let mut date: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Multipart error: {}", e);
        ApiError::Validation("Invalid multipart data".to_string())
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = clean_file_name(field.file_name());
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read upload bytes: {}", e);
                    ApiError::Validation("Failed to read file data".to_string())
                })?;
                file = Some(FileUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("date") => {
                let text = field.text().await.map_err(|_| {
                    ApiError::Validation("Invalid multipart data".to_string())
                })?;
                date = Some(text);
            }
            _ => {}
        }
    }

    let (Some(file), Some(date)) = (file, date.filter(|d| !d.trim().is_empty())) else {
        return Err(ApiError::Validation(
            "File and date are required".to_string(),
        ));
    };

    if file.content_type != PDF_MIME {
        return Err(ApiError::Validation("Only PDF files are allowed".to_string()));
    }

    if file.bytes.is_empty() {
        return Err(ApiError::Validation("Empty file".to_string()));
    }

    if file.bytes.len() > state.max_upload_bytes {
        return Err(ApiError::Validation(format!(
            "File too large. Maximum size is {}MB.",
            state.max_upload_bytes / (1024 * 1024)
        )));
    }

    if !is_pdf(&file.bytes) {
        return Err(ApiError::Validation(
            "File content is not a PDF document".to_string(),
        ));
    }

    let date = parse_date(&date)?;

    let stored = state.storage.upload(file).await?;

    tracing::info!(
        file_id = %stored.file_id,
        date = %date,
        size = stored.size,
        backend = state.storage.name(),
        "e-paper uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            pdf_url: stored.url,
            file_id: stored.file_id,
            file_name: stored.name,
            file_size: stored.size,
            date,
            uploaded_by: admin.id().to_string(),
        }),
    ))
}
