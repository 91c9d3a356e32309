//! Books repository for database operations.
//!
//! Constraint violations (duplicate ISBN, negative price slipping past
//! validation) are not handled here; they surface as `sqlx::Error` and are
//! normalized by the storage-error filter in `crate::error`.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

const BOOK_COLUMNS: &str = "id, title, sub_title, description, author, publisher, isbn, price, \
                            cover_img_url, created_at, updated_at";

/// Clamps client-supplied pagination and computes the LIMIT/OFFSET window.
/// Saturates instead of overflowing on absurd page numbers.
fn page_window(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    (per_page, offset)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search books with optional title/author filters and pagination.
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let (per_page, offset) = page_window(query.page, query.per_page);

        let title = query.title.as_deref();
        let author = query.author.as_deref();

        let sql = format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%'
                   OR sub_title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR author ILIKE '%' || $2 || '%')
            ORDER BY id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(title)
            .bind(author)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM books
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%'
                   OR sub_title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR author ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(title)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Get a book by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Insert a new book.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let sql = format!(
            r#"
            INSERT INTO books (title, sub_title, description, author, publisher,
                               isbn, price, cover_img_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.sub_title)
            .bind(&book.description)
            .bind(&book.author)
            .bind(&book.publisher)
            .bind(&book.isbn)
            .bind(book.price)
            .bind(&book.cover_img_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Partially update a book; absent fields keep their current value.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let sql = format!(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                sub_title = COALESCE($3, sub_title),
                description = COALESCE($4, description),
                author = COALESCE($5, author),
                publisher = COALESCE($6, publisher),
                isbn = COALESCE($7, isbn),
                price = COALESCE($8, price),
                cover_img_url = COALESCE($9, cover_img_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .bind(&book.title)
            .bind(&book.sub_title)
            .bind(&book.description)
            .bind(&book.author)
            .bind(&book.publisher)
            .bind(&book.isbn)
            .bind(book.price)
            .bind(&book.cover_img_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_to_first_page() {
        assert_eq!(page_window(None, None), (20, 0));
        assert_eq!(page_window(Some(1), Some(50)), (50, 0));
        assert_eq!(page_window(Some(3), Some(10)), (10, 20));
    }

    #[test]
    fn page_window_clamps_out_of_range_inputs() {
        // Non-positive values fall back to the first page / minimum size.
        assert_eq!(page_window(Some(0), Some(0)), (1, 0));
        assert_eq!(page_window(Some(-7), Some(-1)), (1, 0));
        // Oversized per_page is capped.
        assert_eq!(page_window(Some(2), Some(10_000)), (100, 100));
    }

    #[test]
    fn page_window_saturates_instead_of_overflowing() {
        let (per_page, offset) = page_window(Some(i64::MAX), Some(100));
        assert_eq!(per_page, 100);
        assert_eq!(offset, i64::MAX);

        let (_, offset) = page_window(Some(i64::MAX), None);
        assert_eq!(offset, i64::MAX);
    }
}
