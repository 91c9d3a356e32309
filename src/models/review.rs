//! Book review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::DeclaredFields;

/// A reader review attached to a book
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i32,
    pub book_id: i32,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Create review request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    /// Book the review refers to
    pub book_id: i32,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

impl DeclaredFields for CreateReview {
    const FIELDS: &'static [&'static str] = &["book_id", "author", "content"];
}
