//! Book model and copy-count rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book record from database
///
/// `available_copies` only moves through borrow/return transactions and
/// administrative edits; the ledger keeps it in `0..=total_copies`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub cover_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    #[validate(range(min = 1))]
    pub total_copies: i32,
    pub cover_ref: Option<String>,
}

/// Update book request (administrative edit)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    #[validate(range(min = 1))]
    pub total_copies: i32,
    /// When omitted, available_copies follows the total_copies delta
    pub available_copies: Option<i32>,
    pub cover_ref: Option<String>,
}

/// Book search query
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct BookQuery {
    /// Case-insensitive substring matched against title and author
    pub q: Option<String>,
}

/// Derive the new available_copies for an administrative book update.
///
/// An explicit value wins and must stay within `0..=new_total`. Otherwise the
/// count moves by the same delta as total_copies, so checked-out copies keep
/// their meaning when stock is added or withdrawn.
pub fn derive_available_copies(
    current_total: i32,
    current_available: i32,
    new_total: i32,
    requested: Option<i32>,
) -> Result<i32, String> {
    let available = match requested {
        Some(value) => value,
        None => current_available + (new_total - current_total),
    };

    if available < 0 {
        return Err(format!(
            "available_copies would be negative ({}); more copies are on loan than the new total",
            available
        ));
    }
    if available > new_total {
        return Err(format!(
            "available_copies ({}) cannot exceed total_copies ({})",
            available, new_total
        ));
    }

    Ok(available)
}
