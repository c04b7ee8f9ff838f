//! Repository layer for database operations

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{Author, Book, BookWithAuthor, NewBook},
};

pub use memory::MemoryCatalogRepository;
pub use postgres::PgCatalogRepository;

/// Description of a book listing. Nothing runs until it is handed to
/// [`CatalogRepository::list_books`]; filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    pub id: Option<i32>,
    /// Case-insensitive exact match
    pub genre: Option<String>,
    pub author_id: Option<i32>,
    /// Publication timestamp truncated to the day
    pub published_on: Option<NaiveDate>,
}

impl BookQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_author(mut self, author_id: i32) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn published_on(mut self, day: NaiveDate) -> Self {
        self.published_on = Some(day);
        self
    }

    /// Evaluate the filters against an already loaded row
    pub fn matches(&self, row: &BookWithAuthor) -> bool {
        let book = &row.book;
        self.id.map_or(true, |id| book.id == id)
            && self
                .genre
                .as_ref()
                .map_or(true, |g| book.genre.to_lowercase() == g.to_lowercase())
            && self.author_id.map_or(true, |a| book.author_id == a)
            && self
                .published_on
                .map_or(true, |day| book.publish_date.date() == day)
    }
}

/// Access to the books and authors tables.
///
/// Every write is one unit of work: it either commits as a whole or leaves
/// the store untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Books joined with their author, ordered by id
    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<BookWithAuthor>>;

    /// All authors, ordered by id
    async fn list_authors(&self) -> AppResult<Vec<Author>>;

    /// Insert a book; the store assigns the id and version 1
    async fn create_book(&self, data: &NewBook) -> AppResult<Book>;

    /// Overwrite the row with `book.id`, bumping its version. When
    /// `book.version` is set the row must also still carry that version.
    /// Returns the number of rows written (0 or 1).
    async fn replace_book(&self, book: &Book) -> AppResult<u64>;

    /// Delete a book, returning the removed record if there was one
    async fn delete_book(&self, id: i32) -> AppResult<Option<Book>>;

    async fn book_exists(&self, id: i32) -> AppResult<bool>;

    /// Cheap round trip used by the readiness check
    async fn ping(&self) -> AppResult<()>;
}
