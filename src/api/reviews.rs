//! Book review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review},
    validation::ValidatedJson,
};

/// List reviews for a book
#[utoipa::path(
    get,
    path = "/books/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Reviews for the book", body = [Review]),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_reviews(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state.services.reviews.list_reviews(id).await?;
    Ok(Json(reviews))
}

/// Create a new review
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid input or unknown book", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_review(
    State(state): State<crate::AppState>,
    ValidatedJson(review): ValidatedJson<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let created = state.services.reviews.create_review(review).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a review
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_review(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
