/**
 * E-Paper Routes
 * Public reading endpoints plus admin create/delete for dated editions
 */
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Epaper, NewEpaper};
use crate::directory::{EpaperDirectory, Navigation};
use crate::error::ApiError;
use crate::routes::auth::AdminUser;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::SuccessResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct DatesResponse {
    pub dates: Vec<NaiveDate>,
}

/// Request body for POST /api/papers.
///
/// Everything is optional at the serde level so a missing field is reported
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaperRequest {
    pub date: Option<String>,
    pub pdf_url: Option<String>,
    pub file_id: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePaperResponse {
    pub success: bool,
    pub paper: Epaper,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: i64,
}

// ============================================================================
// Helpers
// ============================================================================

/// Today's date in UTC, the calendar the edition dates are kept in.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::Validation("Invalid date, expected YYYY-MM-DD".to_string()))
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn load_directory(state: &AppState) -> Result<EpaperDirectory, ApiError> {
    Ok(EpaperDirectory::new(state.store.list_dates().await?))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/papers - Today's paper, or the latest one
pub async fn current_paper(State(state): State<AppState>) -> Result<Json<Epaper>, ApiError> {
    let directory = load_directory(&state).await?;
    let date = directory
        .current(today())
        .ok_or_else(|| ApiError::NotFound("No papers available".to_string()))?;

    let paper = state
        .store
        .find_epaper_by_date(date)
        .await?
        .ok_or_else(|| ApiError::NotFound("No papers available".to_string()))?;

    Ok(Json(paper))
}

/// GET /api/papers/dates - Published dates, newest first
pub async fn list_dates(State(state): State<AppState>) -> Result<Json<DatesResponse>, ApiError> {
    let directory = load_directory(&state).await?;
    Ok(Json(DatesResponse {
        dates: directory.dates().to_vec(),
    }))
}

/// GET /api/papers/all - Every record, newest first (auth required)
pub async fn list_all(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Epaper>>, ApiError> {
    Ok(Json(state.store.list_epapers().await?))
}

/// GET /api/papers/date/{date} - The paper for an exact date
pub async fn paper_by_date(
    State(state): State<AppState>,
    ApiPath(date): ApiPath<String>,
) -> Result<Json<Epaper>, ApiError> {
    let date = parse_date(&date)?;
    state
        .store
        .find_epaper_by_date(date)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No paper found for this date".to_string()))
}

/// GET /api/papers/date/{date}/navigation - Neighbouring editions
pub async fn paper_navigation(
    State(state): State<AppState>,
    ApiPath(date): ApiPath<String>,
) -> Result<Json<Navigation>, ApiError> {
    let date = parse_date(&date)?;
    let directory = load_directory(&state).await?;
    Ok(Json(directory.navigation(date)?))
}

/// POST /api/papers - Record an uploaded paper (auth required)
pub async fn create_paper(
    _admin: AdminUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePaperRequest>,
) -> Result<(StatusCode, Json<CreatePaperResponse>), ApiError> {
    let (Some(date), Some(pdf_url), Some(file_id), Some(file_name), Some(uploaded_by)) = (
        required(payload.date),
        required(payload.pdf_url),
        required(payload.file_id),
        required(payload.file_name),
        required(payload.uploaded_by),
    ) else {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    };

    if payload.file_size.is_some_and(|size| size < 0) {
        return Err(ApiError::Validation("File size cannot be negative".to_string()));
    }

    let date = parse_date(&date)?;

    let paper = state
        .store
        .create_epaper(NewEpaper {
            date,
            pdf_url,
            file_id,
            file_name,
            file_size: payload.file_size,
            uploaded_by,
        })
        .await?;

    tracing::info!(paper_id = %paper.id, date = %paper.date, "e-paper published");

    Ok((
        StatusCode::CREATED,
        Json(CreatePaperResponse {
            success: true,
            paper,
        }),
    ))
}

/// DELETE /api/papers/{id} - Remove a paper record (auth required)
///
/// Only the record goes; the stored PDF stays where it is.
pub async fn delete_paper(
    _admin: AdminUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.store.delete_epaper(id).await? {
        return Err(ApiError::NotFound("Paper not found".to_string()));
    }
    tracing::info!(paper_id = %id, "e-paper deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/papers/{id}/views - Count one read
pub async fn record_view(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ViewsResponse>, ApiError> {
    match state.store.increment_views(id).await {
        Ok(Some(views)) => Ok(Json(ViewsResponse { views })),
        Ok(None) => Err(ApiError::NotFound("Paper not found".to_string())),
        Err(e) => {
            // Analytics only: log and let the reader carry on.
            tracing::warn!(paper_id = %id, error = %e, "failed to track view");
            Err(ApiError::from(e))
        }
    }
}
