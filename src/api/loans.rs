//! Loan (borrow/return) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{BorrowBook, LoanDetails, LoanQuery, ReturnBook},
};

use super::{MutationResponse, PaginatedResponse};

/// Borrow a book for a member
#[utoipa::path(
    post,
    path = "/loans/borrow",
    tag = "loans",
    request_body = BorrowBook,
    responses(
        (status = 201, description = "Loan created", body = MutationResponse),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "No copies available or loan limit reached")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowBook>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let loan = state.services.ledger.borrow(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::ok(
            format!("Book borrowed, due {}", loan.due_date.format("%Y-%m-%d")),
            Some(loan.id),
        )),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    request_body = ReturnBook,
    responses(
        (status = 200, description = "Book returned", body = MutationResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No active loan for this book and member")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Json(request): Json<ReturnBook>,
) -> AppResult<Json<MutationResponse>> {
    let loan = state
        .services
        .ledger
        .return_book(request.book_id, request.member_id)
        .await?;

    Ok(Json(MutationResponse::ok("Book returned", Some(loan.id))))
}

/// List loans with optional member and active-only filters
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = PaginatedResponse<LoanDetails>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (loans, total) = state.services.ledger.list_loans(&query).await?;

    Ok(Json(PaginatedResponse {
        items: loans,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get active loans for a specific member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's active loans", body = PaginatedResponse<LoanDetails>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_loans(
    State(state): State<crate::AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    // 404 for unknown members rather than an empty list
    state.services.members.get_by_id(member_id).await?;

    let query = LoanQuery {
        member_id: Some(member_id),
        active: Some(true),
        page: None,
        per_page: Some(100),
    };
    let (loans, total) = state.services.ledger.list_loans(&query).await?;

    Ok(Json(PaginatedResponse {
        items: loans,
        total,
        page: 1,
        per_page: 100,
    }))
}
