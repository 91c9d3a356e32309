//! Book review service

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List reviews for a book
    pub async fn list_reviews(&self, book_id: i32) -> AppResult<Vec<Review>> {
        // Surface a 404 for unknown books instead of an empty list.
        self.repository.books.get_by_id(book_id).await?;
        self.repository.reviews.list_for_book(book_id).await
    }

    /// Create a new review
    pub async fn create_review(&self, review: CreateReview) -> AppResult<Review> {
        let created = self.repository.reviews.create(&review).await?;
        tracing::info!(id = created.id, book_id = created.book_id, "Review created");
        Ok(created)
    }

    /// Delete a review
    pub async fn delete_review(&self, id: i32) -> AppResult<()> {
        self.repository.reviews.delete(id).await
    }
}
