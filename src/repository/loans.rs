//! Loans repository: the inventory ledger transactions
//!
//! Borrow and Return are single database transactions that take a row lock on
//! the book (`SELECT ... FOR UPDATE`), so concurrent operations against the
//! same title serialize in the store rather than in process. The pool may be
//! shared by several server instances; an in-process mutex would not help.

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::loan::{BorrowBook, Loan, LoanDetails, LoanQuery},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Borrow a book: all checks and both mutations in one transaction.
    ///
    /// The book row lock is taken first, so two borrowers cannot both observe
    /// the last copy; the second one waits and then sees zero.
    pub async fn borrow(&self, request: &BorrowBook, period: Duration) -> AppResult<Loan> {
        let now = Utc::now();
        let due_date = now + period;

        let mut tx = self.pool.begin().await?;

        let book = sqlx::query(
            "SELECT total_copies, available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(request.book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Book with id {} not found", request.book_id))
        })?;

        let available: i32 = book.get("available_copies");

        let member = sqlx::query("SELECT is_active, max_loans FROM members WHERE id = $1")
            .bind(request.member_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Member with id {} not found", request.member_id))
            })?;

        if !member.get::<bool, _>("is_active") {
            return Err(AppError::Validation(format!(
                "Member with id {} is not active",
                request.member_id
            )));
        }

        if available <= 0 {
            return Err(AppError::OutOfStock(format!(
                "No copies of book {} available",
                request.book_id
            )));
        }

        let max_loans: i32 = member.get("max_loans");
        let active_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND returned_date IS NULL",
        )
        .bind(request.member_id)
        .fetch_one(&mut *tx)
        .await?;

        if active_loans >= max_loans as i64 {
            return Err(AppError::LoanLimitExceeded(format!(
                "Member {} already has {} of {} allowed loans",
                request.member_id, active_loans, max_loans
            )));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, loan_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.book_id)
        .bind(request.member_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        let new_available: i32 = sqlx::query_scalar(
            r#"
            UPDATE books SET available_copies = available_copies - 1, updated_at = $2
            WHERE id = $1
            RETURNING available_copies
            "#,
        )
        .bind(request.book_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // Cannot happen while the row lock holds; if it does, the ledger has
        // already diverged and the transaction must not commit.
        if new_available < 0 {
            return Err(AppError::InvariantViolation(format!(
                "available_copies for book {} went negative",
                request.book_id
            )));
        }

        tx.commit().await?;

        Ok(loan)
    }

    /// Return a book: closes the most recent active loan for the pair and
    /// restores one copy, in one transaction.
    ///
    /// A second return of the same loan fails with NoActiveLoan; silently
    /// accepting it would credit the stock twice.
    pub async fn return_book(&self, book_id: i32, member_id: i32) -> AppResult<Loan> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Same lock order as borrow, so the two never deadlock.
        let book = sqlx::query(
            "SELECT total_copies, available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let total: i32 = book.get("total_copies");
        let available: i32 = book.get("available_copies");

        let loan_id: i32 = sqlx::query_scalar(
            r#"
            SELECT id FROM loans
            WHERE book_id = $1 AND member_id = $2 AND returned_date IS NULL
            ORDER BY loan_date DESC
            LIMIT 1
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NoActiveLoan(format!(
                "No active loan of book {} for member {}",
                book_id, member_id
            ))
        })?;

        // Restoring a copy past total_copies means the ledger already
        // diverged; abort instead of clamping.
        if available + 1 > total {
            return Err(AppError::InvariantViolation(format!(
                "returning book {} would push available_copies past total_copies ({}/{})",
                book_id,
                available + 1,
                total
            )));
        }

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET returned_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(now)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE books SET available_copies = available_copies + 1, updated_at = $2 WHERE id = $1",
        )
        .bind(book_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// List loans with book and member details
    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        if query.member_id.is_some() {
            conditions.push("l.member_id = $1".to_string());
        }
        if query.active.unwrap_or(false) {
            conditions.push("l.returned_date IS NULL".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM loans l {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(member_id) = query.member_id {
            count_builder = count_builder.bind(member_id);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT l.id, l.book_id, l.member_id, l.loan_date, l.due_date, l.returned_date,
                   b.title as book_title, m.full_name as member_name
            FROM loans l
            JOIN books b ON l.book_id = b.id
            JOIN members m ON l.member_id = m.id
            {}
            ORDER BY l.loan_date DESC
            LIMIT {} OFFSET {}
            "#,
            where_clause, per_page, offset
        );

        let mut select_builder = sqlx::query(&select_query);
        if let Some(member_id) = query.member_id {
            select_builder = select_builder.bind(member_id);
        }
        let rows = select_builder.fetch_all(&self.pool).await?;

        let now = Utc::now();
        let loans = rows
            .into_iter()
            .map(|row| {
                let due_date: chrono::DateTime<Utc> = row.get("due_date");
                let returned_date: Option<chrono::DateTime<Utc>> = row.get("returned_date");
                LoanDetails {
                    id: row.get("id"),
                    book_id: row.get("book_id"),
                    book_title: row.get("book_title"),
                    member_id: row.get("member_id"),
                    member_name: row.get("member_name"),
                    loan_date: row.get("loan_date"),
                    due_date,
                    returned_date,
                    is_overdue: returned_date.is_none() && due_date < now,
                }
            })
            .collect();

        Ok((loans, total))
    }

    /// Count loans (active or historical) referencing a book
    pub async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count loans (active or historical) referencing a member
    pub async fn count_for_member(&self, member_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE member_id = $1")
            .bind(member_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
