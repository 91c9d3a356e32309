//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, reviews};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore API",
        version = "1.0.0",
        description = "REST API server for an online bookstore",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Reviews
        reviews::list_reviews,
        reviews::create_review,
        reviews::delete_review,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ErrorDetail,
            crate::error::ValidationIssue,
            crate::error::StorageDetail,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "reviews", description = "Book reviews")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router, serving the UI at `/api`
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
