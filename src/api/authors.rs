//! Author endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{author::Author, book::BookSummary},
};

use super::IdPath;

/// List all authors
#[utoipa::path(
    get,
    path = "/api/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Authors list", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// List the books of an author
#[utoipa::path(
    get,
    path = "/api/authors/{id}/books",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Books by this author", body = Vec<BookSummary>),
        (status = 404, description = "Non-integer author id", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_author_books(
    State(state): State<crate::AppState>,
    IdPath(author_id): IdPath,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.list_by_author(author_id).await?;
    Ok(Json(books))
}
