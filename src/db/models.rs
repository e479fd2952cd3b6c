//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One published edition: a PDF tied to a single calendar date.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epaper {
    pub id: Uuid,
    pub date: NaiveDate,
    pub pdf_url: String,
    pub file_id: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub uploaded_by: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New e-paper for insertion
#[derive(Debug, Clone)]
pub struct NewEpaper {
    pub date: NaiveDate,
    pub pdf_url: String,
    pub file_id: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub uploaded_by: String,
}

/// Contact form submission
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New contact message for insertion
#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}
