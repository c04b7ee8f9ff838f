//! PostgreSQL catalog repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use super::{BookQuery, CatalogRepository};
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookWithAuthor, NewBook},
};

const BOOK_COLUMNS: &str =
    "id, title, genre, publish_date, price, description, author_id, version";

const SELECT_BOOKS_WITH_AUTHOR: &str = r#"
    SELECT b.id, b.title, b.genre, b.publish_date, b.price, b.description,
           b.author_id, b.version, a.name AS author_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
    WHERE TRUE"#;

/// SQLSTATE raised when a row references a missing parent
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Turn a write failure into an application error, reporting a missing
/// author as a validation problem.
fn map_write_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return AppError::Validation("Referenced author does not exist".to_string());
        }
    }
    AppError::Database(err)
}

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: Pool<Postgres>,
}

impl PgCatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<BookWithAuthor>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_BOOKS_WITH_AUTHOR);

        if let Some(id) = query.id {
            builder.push(" AND b.id = ").push_bind(id);
        }
        if let Some(ref genre) = query.genre {
            builder
                .push(" AND LOWER(b.genre) = LOWER(")
                .push_bind(genre.clone())
                .push(")");
        }
        if let Some(author_id) = query.author_id {
            builder.push(" AND b.author_id = ").push_bind(author_id);
        }
        if let Some(day) = query.published_on {
            builder.push(" AND b.publish_date::date = ").push_bind(day);
        }
        builder.push(" ORDER BY b.id");

        let rows = builder
            .build_query_as::<BookWithAuthor>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_book(&self, data: &NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO books (title, genre, publish_date, price, description, author_id, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&data.title)
            .bind(&data.genre)
            .bind(data.publish_date)
            .bind(data.price)
            .bind(&data.description)
            .bind(data.author_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(book)
    }

    async fn replace_book(&self, book: &Book) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, genre = $2, publish_date = $3, price = $4,
                description = $5, author_id = $6, version = version + 1
            WHERE id = $7 AND ($8::int IS NULL OR version = $8)
            "#,
        )
        .bind(&book.title)
        .bind(&book.genre)
        .bind(book.publish_date)
        .bind(book.price)
        .bind(&book.description)
        .bind(book.author_id)
        .bind(book.id)
        .bind(book.version)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn delete_book(&self, id: i32) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let query = format!("DELETE FROM books WHERE id = $1 RETURNING {}", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(book)
    }

    async fn book_exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
