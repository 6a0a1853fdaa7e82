//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tokio_stream::StreamExt;

use crate::{
    error::{AppError, AppResult},
    models::book::{derive_available_copies, Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if an ISBN is already registered
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new book; a new title starts fully stocked
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, total_copies, available_copies, cover_ref, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.total_copies)
        .bind(&book.cover_ref)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Administrative update. Runs under the same row lock as borrow/return
    /// so the copy counts cannot be edited mid-transaction.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query(
            "SELECT total_copies, available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let available = derive_available_copies(
            current.get("total_copies"),
            current.get("available_copies"),
            book.total_copies,
            book.available_copies,
        )
        .map_err(AppError::Validation)?;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, isbn = $3, total_copies = $4,
                available_copies = $5, cover_ref = $6, updated_at = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.total_copies)
        .bind(available)
        .bind(&book.cover_ref)
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a book. Loan history blocks the delete.
    pub async fn delete(&self, id: i32, loan_count: i64) -> AppResult<()> {
        if loan_count > 0 {
            return Err(AppError::HasDependentRecords(format!(
                "Book {} has {} loan records",
                id, loan_count
            )));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Stream books matching a free-text filter over title and author.
    ///
    /// Rows flow through a bounded channel so a large catalog is never
    /// buffered whole; the receiver side feeds the NDJSON response body.
    pub fn search_stream(
        &self,
        query: Option<String>,
    ) -> tokio::sync::mpsc::Receiver<AppResult<Book>> {
        let (tx, rx) = tokio::sync::mpsc::channel(32);
        let pool = self.pool.clone();

        tokio::spawn(async move {
            let pattern = format!("%{}%", query.unwrap_or_default().to_lowercase());
            let mut rows = sqlx::query_as::<_, Book>(
                r#"
                SELECT * FROM books
                WHERE LOWER(title) LIKE $1 OR LOWER(author) LIKE $1
                ORDER BY title, id
                "#,
            )
            .bind(pattern)
            .fetch(&pool);

            while let Some(row) = rows.next().await {
                if tx.send(row.map_err(AppError::from)).await.is_err() {
                    // Client went away; stop reading.
                    break;
                }
            }
        });

        rx
    }
}
