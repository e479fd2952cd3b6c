/**
 * Routes Module
 * API route handlers
 */
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod contact;
pub mod extract;
pub mod health;
pub mod papers;
pub mod upload;

/// Body for mutations that return nothing else.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}
