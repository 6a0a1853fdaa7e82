//! Inventory ledger service: copy counts, loan lifecycle, book administration

use chrono::Duration;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook, UpdateBook},
        loan::{BorrowBook, Loan, LoanDetails, LoanQuery},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    config: LoansConfig,
}

impl LedgerService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a book for a member
    pub async fn borrow(&self, request: BorrowBook) -> AppResult<Loan> {
        let days = request
            .loan_period_days
            .unwrap_or(self.config.default_period_days);
        if days <= 0 {
            return Err(AppError::Validation(
                "loan_period_days must be positive".to_string(),
            ));
        }

        let loan = self.repository.loans.borrow(&request, Duration::days(days)).await?;

        tracing::info!(
            loan_id = loan.id,
            book_id = loan.book_id,
            member_id = loan.member_id,
            "Book borrowed"
        );

        Ok(loan)
    }

    /// Return a borrowed book
    pub async fn return_book(&self, book_id: i32, member_id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.return_book(book_id, member_id).await?;

        tracing::info!(loan_id = loan.id, book_id, member_id, "Book returned");

        Ok(loan)
    }

    /// List loans with details
    pub async fn list_loans(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository.loans.list(query).await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Duplicate(format!(
                "A book with ISBN {} already exists",
                book.isbn
            )));
        }

        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&book.isbn, Some(id)).await? {
            return Err(AppError::Duplicate(format!(
                "A book with ISBN {} already exists",
                book.isbn
            )));
        }

        self.repository.books.update(id, &book).await
    }

    /// Delete a book (blocked by loan history)
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        // Existence check first so a missing book reports NotFound,
        // not a zero-history delete.
        self.repository.books.get_by_id(id).await?;

        let loan_count = self.repository.loans.count_for_book(id).await?;
        self.repository.books.delete(id, loan_count).await
    }

    /// Stream books matching a free-text filter
    pub fn search_books(
        &self,
        query: Option<String>,
    ) -> tokio::sync::mpsc::Receiver<AppResult<Book>> {
        self.repository.books.search_stream(query)
    }
}
