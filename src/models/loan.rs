//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Loan record from database
///
/// A loan is ACTIVE while `returned_date` is NULL; returned loans stay in the
/// table as history and are never deleted by normal operation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
}

/// Loan with book and member details for listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub member_id: i32,
    pub member_name: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub is_overdue: bool,
}

/// Borrow request passed to the ledger
#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowBook {
    pub book_id: i32,
    pub member_id: i32,
    /// Falls back to the configured default when omitted
    pub loan_period_days: Option<i64>,
}

/// Return request passed to the ledger
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnBook {
    pub book_id: i32,
    pub member_id: i32,
}

/// Loan listing query
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoanQuery {
    pub member_id: Option<i32>,
    /// Restrict to loans with no returned_date
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
