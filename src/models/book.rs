//! Book catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validation::DeclaredFields;

/// A book as stored in the catalog
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub sub_title: Option<String>,
    pub description: Option<String>,
    pub author: String,
    pub publisher: String,
    /// ISBN-13, unique across the catalog
    pub isbn: String,
    /// Price in minor currency units
    pub price: i64,
    pub cover_img_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub sub_title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "Publisher must not be empty"))]
    pub publisher: String,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10 to 17 characters"))]
    pub isbn: String,
    #[validate(range(min = 1, code = "positive", message = "Price must be positive"))]
    pub price: i64,
    pub cover_img_url: Option<String>,
}

impl DeclaredFields for CreateBook {
    const FIELDS: &'static [&'static str] = &[
        "title",
        "sub_title",
        "description",
        "author",
        "publisher",
        "isbn",
        "price",
        "cover_img_url",
    ];
}

/// Update book request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "Publisher must not be empty"))]
    pub publisher: Option<String>,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10 to 17 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 1, code = "positive", message = "Price must be positive"))]
    pub price: Option<i64>,
    pub cover_img_url: Option<String>,
}

impl DeclaredFields for UpdateBook {
    const FIELDS: &'static [&'static str] = CreateBook::FIELDS;
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Search in title and sub_title
    pub title: Option<String>,
    /// Search by author name
    pub author: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
