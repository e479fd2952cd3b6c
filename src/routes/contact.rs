/**
 * Contact Routes
 * Public contact form submission and the admin inbox
 */
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{ContactMessage, NewContactMessage};
use crate::error::ApiError;
use crate::routes::auth::AdminUser;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::SuccessResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: ContactMessage,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListResponse {
    pub items: Vec<ContactMessage>,
    pub total: usize,
    pub unread: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageRequest {
    pub is_read: bool,
}

// ============================================================================
// Validation
// ============================================================================

lazy_static::lazy_static! {
    /// Something@something.something, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate(payload: ContactRequest) -> Result<NewContactMessage, ApiError> {
    let raw_email = payload.email.unwrap_or_default();
    let (Some(name), Some(email), Some(message)) = (
        non_blank(payload.name),
        non_blank(Some(raw_email.clone())),
        non_blank(payload.message),
    ) else {
        return Err(ApiError::Validation(
            "Name, email, and message are required".to_string(),
        ));
    };

    // Checked as submitted: surrounding whitespace makes it invalid.
    if !is_valid_email(&raw_email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }

    Ok(NewContactMessage {
        name,
        email,
        phone: non_blank(payload.phone),
        subject: non_blank(payload.subject),
        message,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/contact - Submit the contact form
pub async fn create_message(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let new_message = validate(payload)?;
    let message = state.store.create_message(new_message).await?;

    tracing::info!(message_id = %message.id, "contact message received");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            message,
        }),
    ))
}

/// GET /api/contact - Inbox, newest first (auth required)
pub async fn list_messages(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let items = state.store.list_messages().await?;
    let unread = items.iter().filter(|m| !m.is_read).count();
    Ok(Json(ContactListResponse {
        total: items.len(),
        unread,
        items,
    }))
}

/// PATCH /api/contact/{id} - Mark read or unread (auth required)
pub async fn update_message(
    _admin: AdminUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateMessageRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let message = state
        .store
        .set_message_read(id, payload.is_read)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    Ok(Json(ContactResponse {
        success: true,
        message,
    }))
}

/// DELETE /api/contact/{id} - Remove a message (auth required)
pub async fn delete_message(
    _admin: AdminUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.store.delete_message(id).await? {
        return Err(ApiError::NotFound("Message not found".to_string()));
    }
    Ok(Json(SuccessResponse { success: true }))
}
