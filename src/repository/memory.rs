//! In-process catalog repository.
//!
//! Selected with `database.url = "memory://"`; also backs the test suite.
//! Each write holds the lock for its whole duration, which gives it the
//! same all-or-nothing behavior as a database transaction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{BookQuery, CatalogRepository};
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookWithAuthor, NewBook},
};

#[derive(Debug, Default)]
struct Tables {
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, Book>,
    /// Last id handed out; never decreases, so deleted ids are not reused
    last_book_id: i32,
}

impl Tables {
    fn allocate_book_id(&mut self) -> i32 {
        self.last_book_id += 1;
        self.last_book_id
    }

    fn require_author(&self, author_id: i32) -> AppResult<()> {
        if self.authors.contains_key(&author_id) {
            Ok(())
        } else {
            Err(AppError::Validation("Referenced author does not exist".to_string()))
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryCatalogRepository {
    tables: RwLock<Tables>,
}

impl MemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a handful of authors and books
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        for (id, name) in [
            (1, "Ralls, Kim"),
            (2, "Corets, Eva"),
            (3, "Randall, Cynthia"),
            (4, "Thurman, Paula"),
        ] {
            tables.authors.insert(id, Author { id, name: name.to_string() });
        }

        let seed = [
            (1, "Midnight Rain", "Fantasy", (2000, 12, 16), 1495, "A former architect battles an evil sorceress.", 1),
            (2, "Maeve Ascendant", "Fantasy", (2000, 11, 17), 1295, "After the collapse of a nanotechnology society, the young survivors lay the foundation for a new society.", 2),
            (3, "The Sundered Grail", "Fantasy", (2001, 9, 10), 1295, "The two daughters of Maeve battle for control of England.", 2),
            (4, "Lover Birds", "Romance", (2000, 9, 2), 795, "When Carla meets Paul at an ornithology conference, tempers fly.", 3),
            (5, "Splish Splash", "Romance", (2000, 11, 2), 695, "A deep sea diver finds true love 20,000 leagues beneath the sea.", 4),
        ];
        for (id, title, genre, (y, m, d), cents, description, author_id) in seed {
            let Some(publish_date) =
                NaiveDate::from_ymd_opt(y, m, d).and_then(|day| day.and_hms_opt(0, 0, 0))
            else {
                continue;
            };
            tables.books.insert(
                id,
                Book {
                    id,
                    title: title.to_string(),
                    genre: genre.to_string(),
                    publish_date,
                    price: Decimal::new(cents, 2),
                    description: description.to_string(),
                    author_id,
                    version: Some(1),
                },
            );
        }
        tables.last_book_id = tables.books.keys().next_back().copied().unwrap_or(0);

        Self { tables: RwLock::new(tables) }
    }

    /// Register an author, returning the stored record
    pub async fn add_author(&self, name: &str) -> Author {
        let mut tables = self.tables.write().await;
        let id = tables.authors.keys().next_back().map_or(1, |id| id + 1);
        let author = Author { id, name: name.to_string() };
        tables.authors.insert(id, author.clone());
        author
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<BookWithAuthor>> {
        let tables = self.tables.read().await;
        let rows = tables
            .books
            .values()
            .filter_map(|book| {
                tables.authors.get(&book.author_id).map(|author| BookWithAuthor {
                    book: book.clone(),
                    author_name: author.name.clone(),
                })
            })
            .filter(|row| query.matches(row))
            .collect();
        Ok(rows)
    }

    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let tables = self.tables.read().await;
        Ok(tables.authors.values().cloned().collect())
    }

    async fn create_book(&self, data: &NewBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        tables.require_author(data.author_id)?;

        let book = Book {
            id: tables.allocate_book_id(),
            title: data.title.clone(),
            genre: data.genre.clone(),
            publish_date: data.publish_date,
            price: data.price,
            description: data.description.clone(),
            author_id: data.author_id,
            version: Some(1),
        };
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn replace_book(&self, book: &Book) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let current_version = match tables.books.get(&book.id) {
            Some(current) if book.version.map_or(true, |v| current.version == Some(v)) => {
                current.version.unwrap_or(1)
            }
            _ => return Ok(0),
        };
        tables.require_author(book.author_id)?;

        let mut replacement = book.clone();
        replacement.version = Some(current_version + 1);
        tables.books.insert(book.id, replacement);
        Ok(1)
    }

    async fn delete_book(&self, id: i32) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        Ok(tables.books.remove(&id))
    }

    async fn book_exists(&self, id: i32) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.books.contains_key(&id))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
