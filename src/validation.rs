//! Request payload validation
//!
//! [`ValidatedJson`] replaces `axum::Json` for request bodies. It always
//! interprets the body as JSON (the transport layer has already forced the
//! content type), rejects fields the target type does not declare, runs the
//! `validator` constraints, and folds every failure into a single
//! [`AppError::Validation`] so the handler never runs on bad input.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, ValidationIssue};

/// Field whitelist for a request payload type.
///
/// Keys present in the payload but absent from `FIELDS` are reported as
/// `not_allowed` validation issues rather than silently dropped.
pub trait DeclaredFields {
    /// Accepted top-level field names, in declaration order.
    const FIELDS: &'static [&'static str];
}

/// JSON extractor that validates the payload before the handler sees it.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + DeclaredFields,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            AppError::Validation(vec![ValidationIssue::new(
                Vec::new(),
                "invalid_body",
                e.to_string(),
            )])
        })?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::Validation(vec![ValidationIssue::new(
                Vec::new(),
                "invalid_json",
                e.to_string(),
            )])
        })?;

        // Declared-field issues come first, unknown keys after, so the
        // details order follows the declared shape and then the payload.
        let unknown = unknown_field_issues(&value, T::FIELDS);

        match serde_path_to_error::deserialize::<_, T>(value) {
            Ok(payload) => {
                let mut issues = match payload.validate() {
                    Ok(()) => Vec::new(),
                    Err(errors) => issues_from_validator(&errors, T::FIELDS),
                };
                issues.extend(unknown);
                if issues.is_empty() {
                    Ok(Self(payload))
                } else {
                    Err(AppError::Validation(issues))
                }
            }
            Err(e) => {
                let mut issues = vec![decode_issue(&e)];
                issues.extend(unknown);
                Err(AppError::Validation(issues))
            }
        }
    }
}

/// Turns a decode failure into an issue pointing at the offending field.
///
/// serde reports missing fields at the parent level, so those are pulled out
/// of the error message to keep the path populated.
fn decode_issue(err: &serde_path_to_error::Error<serde_json::Error>) -> ValidationIssue {
    let mut path: Vec<String> = err
        .path()
        .iter()
        .filter_map(|segment| match segment {
            serde_path_to_error::Segment::Map { key } => Some(key.clone()),
            serde_path_to_error::Segment::Seq { index } => Some(index.to_string()),
            serde_path_to_error::Segment::Enum { variant } => Some(variant.clone()),
            serde_path_to_error::Segment::Unknown => None,
        })
        .collect();
    let message = err.inner().to_string();

    if let Some(rest) = message.strip_prefix("missing field `") {
        if let Some(field) = rest.split('`').next() {
            path.push(field.to_string());
            return ValidationIssue::new(path, "required", message.clone());
        }
    }

    ValidationIssue::new(path, "invalid_type", message)
}

/// Issues for payload keys the target type does not declare, in payload
/// order (`serde_json` is built with `preserve_order`).
fn unknown_field_issues(value: &Value, fields: &[&str]) -> Vec<ValidationIssue> {
    let Value::Object(map) = value else {
        return Vec::new();
    };
    map.keys()
        .filter(|key| !fields.contains(&key.as_str()))
        .map(|key| {
            ValidationIssue::field(
                key,
                "not_allowed",
                format!("property `{}` should not exist", key),
            )
        })
        .collect()
}

/// Flattens `validator` output into one issue per (field, constraint) pair,
/// in field declaration order.
fn issues_from_validator(errors: &ValidationErrors, fields: &[&str]) -> Vec<ValidationIssue> {
    let by_field = errors.field_errors();
    let mut issues = Vec::new();
    for field in fields {
        let Some(field_errors) = by_field.get(*field) else {
            continue;
        };
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| {
                    format!("field `{}` violates constraint `{}`", field, error.code)
                });
            issues.push(ValidationIssue::field(field, &error.code, message));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use serde_json::json;
    use tower::ServiceExt;
    use validator::ValidationError;

    #[derive(Debug, Deserialize, Validate)]
    struct CreatePayload {
        #[validate(length(min = 1, message = "title must not be empty"))]
        title: String,
        #[validate(range(min = 1, code = "positive", message = "price must be positive"))]
        price: i64,
    }

    impl DeclaredFields for CreatePayload {
        const FIELDS: &'static [&'static str] = &["title", "price"];
    }

    #[test]
    fn undeclared_fields_become_issues_in_payload_order() {
        let value = json!({"zz_first": 1, "title": "Book", "aa_second": 2});
        let issues = unknown_field_issues(&value, CreatePayload::FIELDS);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, vec!["zz_first"]);
        assert_eq!(issues[0].constraint, "not_allowed");
        assert_eq!(issues[1].path, vec!["aa_second"]);
    }

    #[test]
    fn non_object_payloads_produce_no_unknown_field_issues() {
        assert!(unknown_field_issues(&json!([1, 2]), CreatePayload::FIELDS).is_empty());
        assert!(unknown_field_issues(&json!("text"), CreatePayload::FIELDS).is_empty());
    }

    #[test]
    fn validator_issues_are_flattened_per_field_and_constraint() {
        let mut errors = ValidationErrors::new();
        errors.add("price", ValidationError::new("positive"));
        errors.add("title", ValidationError::new("length"));

        let issues = issues_from_validator(&errors, CreatePayload::FIELDS);
        assert_eq!(issues.len(), 2);
        // Declaration order, not hash-map order.
        assert_eq!(issues[0].path, vec!["title"]);
        assert_eq!(issues[0].constraint, "length");
        assert_eq!(issues[1].path, vec!["price"]);
        assert_eq!(issues[1].constraint, "positive");
    }

    fn test_router() -> Router {
        async fn create(ValidatedJson(_payload): ValidatedJson<CreatePayload>) -> StatusCode {
            StatusCode::CREATED
        }
        Router::new().route("/books", post(create))
    }

    fn post_json(body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/books")
            // Deliberately wrong: the extractor must not depend on it.
            .header("content-type", "text/plain")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_payload_reaches_the_handler() {
        let response = test_router()
            .oneshot(post_json(r#"{"title":"Book","price":15000}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn invalid_and_undeclared_fields_are_reported_together() {
        let response = test_router()
            .oneshot(post_json(r#"{"title":"Book","price":-5,"extraField":true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["path"][0], "price");
        assert_eq!(details[0]["constraint"], "positive");
        assert_eq!(details[1]["path"][0], "extraField");
        assert_eq!(details[1]["constraint"], "not_allowed");
    }

    #[tokio::test]
    async fn undeclared_field_rejects_even_when_declared_fields_are_valid() {
        let response = test_router()
            .oneshot(post_json(r#"{"title":"Book","price":15000,"extraField":true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0]["path"][0], "extraField");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_failure() {
        let response = test_router().oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["constraint"], "invalid_json");
    }

    #[tokio::test]
    async fn wrong_field_type_is_a_validation_failure() {
        let response = test_router()
            .oneshot(post_json(r#"{"title":"Book","price":"free"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["details"][0]["constraint"], "invalid_type");
        assert_eq!(body["details"][0]["path"][0], "price");
    }

    #[tokio::test]
    async fn missing_required_field_is_attributed_to_the_field() {
        let response = test_router()
            .oneshot(post_json(r#"{"price":15000}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["details"][0]["constraint"], "required");
        assert_eq!(body["details"][0]["path"][0], "title");
    }
}
