//! Book endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookDetail, BookSummary, NewBook},
};

use super::{IdPath, ValidatedJson};

/// List all books
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<BookSummary>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get a book by integer ID, or list the books of a genre
///
/// An integer segment is a book id; anything else is a genre, matched
/// without regard to case.
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID, or a genre name")),
    responses(
        (status = 200, description = "Book summary (id) or list of book summaries (genre)", body = BookSummary),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book_or_genre(
    State(state): State<crate::AppState>,
    Path(segment): Path<String>,
) -> AppResult<Response> {
    match segment.parse::<i32>() {
        Ok(id) => {
            let book = state.services.catalog.get_book(id).await?;
            Ok(Json(book).into_response())
        }
        Err(_) => {
            let books = state.services.catalog.list_by_genre(&segment).await?;
            Ok(Json(books).into_response())
        }
    }
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/api/books/{id}/details",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book_detail(
    State(state): State<crate::AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book_detail(id).await?;
    Ok(Json(book))
}

/// List books published on a given day
#[utoipa::path(
    get,
    path = "/api/books/date/{date}",
    tag = "books",
    params(("date" = String, Path, description = "yyyy-mm-dd or yyyy/mm/dd")),
    responses(
        (status = 200, description = "Books published that day", body = Vec<BookSummary>),
        (status = 400, description = "Unparseable date", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books_by_publication_date(
    State(state): State<crate::AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state
        .services
        .catalog
        .list_by_publication_date(&date)
        .await?;
    Ok(Json(books))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = Book,
    responses(
        (status = 204, description = "Book replaced"),
        (status = 400, description = "Invalid payload or id mismatch", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book was modified concurrently", body = crate::error::ErrorResponse)
    )
)]
pub async fn replace_book(
    State(state): State<crate::AppState>,
    IdPath(id): IdPath,
    ValidatedJson(book): ValidatedJson<Book>,
) -> AppResult<StatusCode> {
    state.services.catalog.replace_book(id, book).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<NewBook>,
) -> AppResult<impl IntoResponse> {
    let book = state.services.catalog.create_book(data).await?;
    let location = format!("/api/books/{}", book.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Deleted book", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.delete_book(id).await?;
    Ok(Json(book))
}
