//! Reviews repository for database operations.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, Review},
};

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List reviews for a book, newest first.
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, book_id, author, content, created_at
            FROM reviews
            WHERE book_id = $1
            ORDER BY id DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    /// Insert a new review. A dangling `book_id` trips the foreign-key
    /// constraint and comes back as a 400 through the storage-error filter.
    pub async fn create(&self, review: &CreateReview) -> AppResult<Review> {
        let created = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (book_id, author, content)
            VALUES ($1, $2, $3)
            RETURNING id, book_id, author, content, created_at
            "#,
        )
        .bind(review.book_id)
        .bind(&review.author)
        .bind(&review.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Delete a review.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Review with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
