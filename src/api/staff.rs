//! Staff account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::staff::{AdminUpdateStaffAccount, CreateStaffAccount, StaffAccount, UpdateStaffProfile},
};

use super::MutationResponse;

/// Profile update result; `password_changed` tells the front end to drop
/// the staff member's session
#[derive(Serialize, ToSchema)]
pub struct ProfileUpdateResponse {
    pub success: bool,
    pub message: String,
    pub entity_id: Option<i32>,
    pub password_changed: bool,
}

/// List staff accounts
#[utoipa::path(
    get,
    path = "/staff",
    tag = "staff",
    responses(
        (status = 200, description = "List of staff accounts", body = Vec<StaffAccount>)
    )
)]
pub async fn list_staff(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<StaffAccount>>> {
    let accounts = state.services.auth.list_accounts().await?;
    Ok(Json(accounts))
}

/// Get staff account by ID
#[utoipa::path(
    get,
    path = "/staff/{id}",
    tag = "staff",
    params(
        ("id" = i32, Path, description = "Staff account ID")
    ),
    responses(
        (status = 200, description = "Staff account details", body = StaffAccount),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_staff(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<StaffAccount>> {
    let account = state.services.auth.get_account(id).await?;
    Ok(Json(account))
}

/// Create a new staff account
#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    request_body = CreateStaffAccount,
    responses(
        (status = 201, description = "Account created", body = MutationResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn create_staff(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateStaffAccount>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let account = state.services.auth.create_account(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::ok(
            format!("Staff account '{}' created", account.username),
            Some(account.id),
        )),
    ))
}

/// Self-service profile update: the account edits itself and must supply
/// its current password
#[utoipa::path(
    put,
    path = "/staff/{id}/profile",
    tag = "staff",
    params(
        ("id" = i32, Path, description = "Staff account ID (acting account)")
    ),
    request_body = UpdateStaffProfile,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdateResponse),
        (status = 401, description = "Current password incorrect"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn update_staff_profile(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStaffProfile>,
) -> AppResult<Json<ProfileUpdateResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (account, password_changed) =
        state.services.auth.update_profile(id, request).await?;

    Ok(Json(ProfileUpdateResponse {
        success: true,
        message: "Profile updated".to_string(),
        entity_id: Some(account.id),
        password_changed,
    }))
}

/// Administrative update of another staff account; the acting principal
/// named in the body must be a superuser
#[utoipa::path(
    put,
    path = "/staff/{id}",
    tag = "staff",
    params(
        ("id" = i32, Path, description = "Target staff account ID")
    ),
    request_body = AdminUpdateStaffAccount,
    responses(
        (status = 200, description = "Account updated", body = MutationResponse),
        (status = 401, description = "Acting account is not a superuser"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn admin_update_staff(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AdminUpdateStaffAccount>,
) -> AppResult<Json<MutationResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let account = state.services.auth.admin_update_account(id, request).await?;

    Ok(Json(MutationResponse::ok(
        format!("Staff account '{}' updated", account.username),
        Some(account.id),
    )))
}

/// Delete a staff account
#[utoipa::path(
    delete,
    path = "/staff/{id}",
    tag = "staff",
    params(
        ("id" = i32, Path, description = "Staff account ID")
    ),
    responses(
        (status = 200, description = "Account deleted", body = MutationResponse),
        (status = 403, description = "Superusers cannot be deleted"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account linked to member records")
    )
)]
pub async fn delete_staff(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MutationResponse>> {
    state.services.auth.delete_account(id).await?;

    Ok(Json(MutationResponse::ok("Staff account deleted", Some(id))))
}
