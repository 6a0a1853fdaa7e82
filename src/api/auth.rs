//! Staff authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    /// Identifier of the authenticated staff account
    pub staff_id: Option<i32>,
    pub message: String,
}

/// Authenticate a staff member.
///
/// Auth failures are reported in-band as `success=false` rather than as
/// transport faults; the front end shows the message on the login form.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login result", body = LoginResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    match state
        .services
        .auth
        .login(&request.username, &request.password)
        .await
    {
        Ok(account) => Ok(Json(LoginResponse {
            success: true,
            staff_id: Some(account.id),
            message: format!("Welcome, {}", account.username),
        })),
        Err(AppError::InvalidCredentials) => Ok(Json(LoginResponse {
            success: false,
            staff_id: None,
            message: "Invalid username or password".to_string(),
        })),
        Err(AppError::AccessDenied) => Ok(Json(LoginResponse {
            success: false,
            staff_id: None,
            message: "Access denied".to_string(),
        })),
        Err(e) => Err(e),
    }
}
