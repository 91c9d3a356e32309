//! Error types and error normalization for the Bookstore server
//!
//! Every failure path produces the same response body shape
//! (`{ "code", "message", "details" }`) so clients can branch on `code`
//! without knowing which layer produced the error. Database errors are
//! translated to HTTP statuses through a static mapping table keyed by
//! SQLSTATE; everything the table does not recognize is collapsed into a
//! generic 500 while the full driver error goes to the logs.

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// One failed constraint on one field of a request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationIssue {
    /// Path segments leading to the offending field
    pub path: Vec<String>,
    /// Identifier of the violated rule (e.g. `positive`, `not_allowed`)
    pub constraint: String,
    /// Human-readable description
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: Vec<String>, constraint: &str, message: impl Into<String>) -> Self {
        Self {
            path,
            constraint: constraint.to_string(),
            message: message.into(),
        }
    }

    /// Issue on a single top-level field.
    pub fn field(name: &str, constraint: &str, message: impl Into<String>) -> Self {
        Self::new(vec![name.to_string()], constraint, message)
    }
}

/// Metadata attached to a normalized storage error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StorageDetail {
    /// Column the violated constraint covers, when it can be derived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Name of the violated database constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

/// Entry of a failure response's `details` array.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorDetail {
    Issue(ValidationIssue),
    Storage(StorageDetail),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("request payload failed validation")]
    Validation(Vec<ValidationIssue>),

    #[error("{message}")]
    Storage {
        status: StatusCode,
        code: &'static str,
        message: String,
        detail: Option<StorageDetail>,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Vec<ErrorDetail>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation(issues) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Request payload failed validation".to_string(),
                issues.into_iter().map(ErrorDetail::Issue).collect(),
            ),
            AppError::Storage {
                status,
                code,
                message,
                detail,
            } => (
                status,
                code,
                message,
                detail.into_iter().map(ErrorDetail::Storage).collect(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, Vec::new()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Storage-error filter
// =============================================================================

struct StorageMapping {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

/// SQLSTATE → HTTP translation table. Built once, read-only afterwards.
static STORAGE_ERROR_TABLE: Lazy<HashMap<&'static str, StorageMapping>> = Lazy::new(|| {
    HashMap::from([
        (
            "23505",
            StorageMapping {
                status: StatusCode::CONFLICT,
                code: "CONFLICT",
                message: "Duplicate value violates a unique constraint",
            },
        ),
        (
            "23503",
            StorageMapping {
                status: StatusCode::BAD_REQUEST,
                code: "FOREIGN_KEY_VIOLATION",
                message: "Referenced record does not exist",
            },
        ),
        (
            "23502",
            StorageMapping {
                status: StatusCode::BAD_REQUEST,
                code: "NOT_NULL_VIOLATION",
                message: "Required column is missing a value",
            },
        ),
        (
            "23514",
            StorageMapping {
                status: StatusCode::BAD_REQUEST,
                code: "CHECK_VIOLATION",
                message: "Value rejected by a check constraint",
            },
        ),
    ])
});

/// Derives the offending column from a Postgres constraint name, using the
/// `<table>_<column>_key` / `<table>_<column>_fkey` naming convention.
fn constraint_field(constraint: &str) -> Option<String> {
    let trimmed = constraint
        .strip_suffix("_fkey")
        .or_else(|| constraint.strip_suffix("_key"))
        .unwrap_or(constraint);
    trimmed
        .split_once('_')
        .map(|(_, field)| field.to_string())
        .filter(|f| !f.is_empty())
}

/// Translates a database error code (plus optional constraint metadata) into
/// a normalized storage error. Unrecognized codes become a generic 500; the
/// caller is responsible for logging those.
fn map_database_error(code: Option<&str>, constraint: Option<&str>) -> AppError {
    match code.and_then(|c| STORAGE_ERROR_TABLE.get(c)) {
        Some(mapping) => {
            let field = constraint.and_then(constraint_field);
            let message = match &field {
                Some(f) => format!("{} on `{}`", mapping.message, f),
                None => mapping.message.to_string(),
            };
            AppError::Storage {
                status: mapping.status,
                code: mapping.code,
                message,
                detail: Some(StorageDetail {
                    field,
                    constraint: constraint.map(str::to_string),
                }),
            }
        }
        None => AppError::Storage {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: "Internal server error".to_string(),
            detail: None,
        },
    }
}

/// Attempts to claim a sqlx error for the storage taxonomy.
///
/// Returns `None` for errors outside it (pool, configuration, protocol
/// failures); those propagate to the generic internal handler unchanged.
pub fn try_map_storage_error(err: &sqlx::Error) -> Option<AppError> {
    match err {
        sqlx::Error::RowNotFound => Some(AppError::Storage {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: "Record not found".to_string(),
            detail: None,
        }),
        sqlx::Error::Database(db) => {
            let code = db.code();
            let recognized = code
                .as_deref()
                .map(|c| STORAGE_ERROR_TABLE.contains_key(c))
                .unwrap_or(false);
            if !recognized {
                tracing::error!(error = %db, code = ?code, "Unrecognized database error");
            }
            Some(map_database_error(code.as_deref(), db.constraint()))
        }
        _ => None,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match try_map_storage_error(&err) {
            Some(mapped) => mapped,
            None => AppError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: &AppError) -> StatusCode {
        match err {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage { status, .. } => *status,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code_of(err: &AppError) -> &str {
        match err {
            AppError::Storage { code, .. } => code,
            _ => panic!("not a storage error"),
        }
    }

    #[test]
    fn mapped_codes_translate_deterministically() {
        for _ in 0..3 {
            let unique = map_database_error(Some("23505"), None);
            assert_eq!(status_of(&unique), StatusCode::CONFLICT);
            assert_eq!(code_of(&unique), "CONFLICT");

            let fk = map_database_error(Some("23503"), None);
            assert_eq!(status_of(&fk), StatusCode::BAD_REQUEST);
            assert_eq!(code_of(&fk), "FOREIGN_KEY_VIOLATION");

            let not_null = map_database_error(Some("23502"), None);
            assert_eq!(status_of(&not_null), StatusCode::BAD_REQUEST);

            let check = map_database_error(Some("23514"), None);
            assert_eq!(status_of(&check), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unique_violation_message_references_the_field() {
        let err = map_database_error(Some("23505"), Some("books_isbn_key"));
        assert_eq!(status_of(&err), StatusCode::CONFLICT);
        match &err {
            AppError::Storage {
                message, detail, ..
            } => {
                assert!(message.contains("isbn"), "message was: {}", message);
                let detail = detail.as_ref().unwrap();
                assert_eq!(detail.field.as_deref(), Some("isbn"));
                assert_eq!(detail.constraint.as_deref(), Some("books_isbn_key"));
            }
            _ => panic!("expected storage error"),
        }
    }

    #[test]
    fn unmapped_code_becomes_generic_internal_error() {
        let err = map_database_error(Some("P0001"), Some("secret_internal_detail"));
        assert_eq!(status_of(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code_of(&err), "INTERNAL_ERROR");
        match &err {
            AppError::Storage {
                message, detail, ..
            } => {
                assert_eq!(message, "Internal server error");
                assert!(detail.is_none());
            }
            _ => panic!("expected storage error"),
        }
    }

    #[test]
    fn missing_code_becomes_generic_internal_error() {
        let err = map_database_error(None, None);
        assert_eq!(status_of(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code_of(&err), "INTERNAL_ERROR");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = try_map_storage_error(&sqlx::Error::RowNotFound).unwrap();
        assert_eq!(status_of(&err), StatusCode::NOT_FOUND);
        assert_eq!(code_of(&err), "NOT_FOUND");
    }

    #[test]
    fn non_storage_errors_are_declined() {
        assert!(try_map_storage_error(&sqlx::Error::PoolTimedOut).is_none());
        assert!(try_map_storage_error(&sqlx::Error::WorkerCrashed).is_none());
    }

    #[test]
    fn constraint_field_follows_postgres_naming() {
        assert_eq!(constraint_field("books_isbn_key").as_deref(), Some("isbn"));
        assert_eq!(
            constraint_field("reviews_book_id_fkey").as_deref(),
            Some("book_id")
        );
        assert_eq!(constraint_field("nounderscore"), None);
    }

    #[tokio::test]
    async fn validation_error_serializes_with_uniform_shape() {
        let err = AppError::Validation(vec![
            ValidationIssue::field("price", "positive", "price must be positive"),
            ValidationIssue::field("extraField", "not_allowed", "field is not allowed"),
        ]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
        assert_eq!(body["details"][0]["path"][0], "price");
        assert_eq!(body["details"][1]["constraint"], "not_allowed");
    }

    #[tokio::test]
    async fn internal_error_never_echoes_the_original_message() {
        let err = AppError::Internal("password=hunter2 leaked".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("hunter2"));
    }
}
