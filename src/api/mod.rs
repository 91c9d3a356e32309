//! API handlers for Bookstore REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod reviews;

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Rewrites the request content type to JSON before extraction runs,
/// regardless of what the client declared. Runs ahead of validation.
pub async fn force_json_content_type(mut req: Request, next: Next) -> Response {
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn content_type_is_overridden_before_handlers_run() {
        async fn echo_content_type(req: Request) -> String {
            req.headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        }

        let app = Router::new()
            .route("/", post(echo_content_type))
            .layer(middleware::from_fn(force_json_content_type));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "text/plain")
                    .body(axum::body::Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"application/json");
    }
}
