//! Member (patron) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Member record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Permanent patron identifier, printed on the library card
    pub member_id: String,
    pub joined_at: DateTime<Utc>,
    pub is_active: bool,
    pub max_loans: i32,
    /// Optional link to a staff login owning this patron record
    pub account_id: Option<i32>,
}

/// Create member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub phone: String,
}

/// Update member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0))]
    pub max_loans: Option<i32>,
}

/// Member search query
#[derive(Debug, Deserialize, IntoParams)]
pub struct MemberQuery {
    /// Case-insensitive substring matched against name, email and member id
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Generate a fresh patron identifier like `M-1A2B3C4D`
pub fn generate_member_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("M-{}", uuid[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_ids_have_card_format() {
        let id = generate_member_id();
        assert!(id.starts_with("M-"));
        assert_eq!(id.len(), 10);
        assert!(id[2..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn member_ids_are_not_repeated() {
        let a = generate_member_id();
        let b = generate_member_id();
        assert_ne!(a, b);
    }
}
