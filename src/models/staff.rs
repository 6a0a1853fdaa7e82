//! Staff account model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Staff account record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffAccount {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Argon2 PHC hash, never serialized to clients
    #[serde(skip_serializing)]
    pub password: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Create staff account request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaffAccount {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Self-service profile update: the acting account edits itself and must
/// prove knowledge of its current password before anything changes
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStaffProfile {
    #[validate(length(min = 1, max = 150))]
    pub new_username: Option<String>,
    pub new_email: Option<String>,
    pub current_password: String,
    #[validate(length(min = 1))]
    pub new_password: Option<String>,
}

/// Administrative update of another account: authorized by the acting
/// principal's superuser flag, no current-password check
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateStaffAccount {
    pub acting_staff_id: i32,
    #[validate(length(min = 1, max = 150))]
    pub new_username: Option<String>,
    pub new_email: Option<String>,
    #[validate(length(min = 1))]
    pub new_password: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}
