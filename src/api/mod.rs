//! API handlers for Biblion RPC endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod staff;

use serde::Serialize;
use utoipa::ToSchema;

/// Structured result payload returned by every mutating operation
#[derive(Serialize, ToSchema)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
    /// Identifier of the entity the operation created or touched
    pub entity_id: Option<i32>,
}

impl MutationResponse {
    pub fn ok(message: impl Into<String>, entity_id: Option<i32>) -> Self {
        Self {
            success: true,
            message: message.into(),
            entity_id,
        }
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}
