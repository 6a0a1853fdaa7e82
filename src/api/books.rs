//! Book (inventory) endpoints

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

use super::MutationResponse;

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.ledger.get_book(id).await?;
    Ok(Json(book))
}

/// Search books, streamed as NDJSON
///
/// One `Book` JSON object per line; the response body is produced row by row
/// so arbitrarily large result sets never sit in server memory.
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "NDJSON stream of matching books")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> Response {
    let rows = state.services.ledger.search_books(query.q);

    let body = Body::from_stream(ReceiverStream::new(rows).map(|row| {
        row.and_then(|book| {
            serde_json::to_string(&book)
                .map(|mut line| {
                    line.push('\n');
                    line
                })
                .map_err(|e| AppError::Internal(e.to_string()))
        })
    }));

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        body,
    )
        .into_response()
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = MutationResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.ledger.create_book(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::ok(
            format!("Book '{}' created", book.title),
            Some(book.id),
        )),
    ))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = MutationResponse),
        (status = 400, description = "Invalid copy counts"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<MutationResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.ledger.update_book(id, request).await?;

    Ok(Json(MutationResponse::ok(
        format!("Book '{}' updated", book.title),
        Some(book.id),
    )))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MutationResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has loan history")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MutationResponse>> {
    state.services.ledger.delete_book(id).await?;

    Ok(Json(MutationResponse::ok("Book deleted", Some(id))))
}
