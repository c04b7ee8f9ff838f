//! Catalog service: books and authors

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookDetail, BookSummary, BookWithAuthor, NewBook},
    repository::{BookQuery, CatalogRepository},
};

/// Accepted spellings of a publication date in URLs
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a `yyyy-mm-dd` or `yyyy/mm/dd` date. Both separators must match and
/// every component must be zero padded.
pub fn parse_publication_date(raw: &str) -> AppResult<NaiveDate> {
    let well_formed = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-' || b == b'/',
            _ => b.is_ascii_digit(),
        });

    DATE_FORMATS
        .iter()
        .filter(|_| well_formed)
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid publication date '{}': expected yyyy-mm-dd or yyyy/mm/dd",
                raw
            ))
        })
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    async fn summaries(&self, query: BookQuery) -> AppResult<Vec<BookSummary>> {
        let rows = self.repository.list_books(&query).await?;
        Ok(rows.iter().map(BookSummary::from).collect())
    }

    async fn find_book(&self, id: i32) -> AppResult<BookWithAuthor> {
        self.repository
            .list_books(&BookQuery::all().with_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        self.summaries(BookQuery::all()).await
    }

    /// Get a book summary by ID
    pub async fn get_book(&self, id: i32) -> AppResult<BookSummary> {
        let row = self.find_book(id).await?;
        Ok(BookSummary::from(&row))
    }

    /// Get full book details by ID
    pub async fn get_book_detail(&self, id: i32) -> AppResult<BookDetail> {
        let row = self.find_book(id).await?;
        Ok(BookDetail::from(&row))
    }

    pub async fn list_by_genre(&self, genre: &str) -> AppResult<Vec<BookSummary>> {
        self.summaries(BookQuery::all().with_genre(genre)).await
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.list_authors().await
    }

    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookSummary>> {
        self.summaries(BookQuery::all().with_author(author_id)).await
    }

    /// List books published on the given day (raw URL segment)
    pub async fn list_by_publication_date(&self, raw: &str) -> AppResult<Vec<BookSummary>> {
        let day = parse_publication_date(raw)?;
        self.summaries(BookQuery::all().published_on(day)).await
    }

    /// Create a new book
    pub async fn create_book(&self, data: NewBook) -> AppResult<Book> {
        let book = self.repository.create_book(&data).await?;
        tracing::info!("Created book id={} title={:?}", book.id, book.title);
        Ok(book)
    }

    /// Replace a book as a whole.
    ///
    /// With a `version` the write only lands if the stored version still
    /// equals it; without one the stored book is overwritten. When nothing was
    /// written, a book that still exists means someone else changed it first.
    pub async fn replace_book(&self, id: i32, book: Book) -> AppResult<()> {
        if book.id != id {
            return Err(AppError::BadRequest(format!(
                "Book id {} in body does not match id {} in path",
                book.id, id
            )));
        }

        if self.repository.replace_book(&book).await? == 0 {
            if self.repository.book_exists(id).await? {
                tracing::warn!(
                    "Concurrent update rejected for book id={} (stale version {:?})",
                    id,
                    book.version
                );
                return Err(AppError::Conflict(format!(
                    "Book {} was modified by another request",
                    id
                )));
            }
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        tracing::info!("Replaced book id={}", id);
        Ok(())
    }

    /// Delete a book, returning the removed record
    pub async fn delete_book(&self, id: i32) -> AppResult<Book> {
        let book = self
            .repository
            .delete_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        tracing::info!("Deleted book id={}", id);
        Ok(book)
    }

    /// Check the store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogRepository;
    use rust_decimal::Decimal;

    fn book(id: i32, version: i32) -> Book {
        Book {
            id,
            title: "XML Developer's Guide".to_string(),
            genre: "Computer".to_string(),
            publish_date: NaiveDate::from_ymd_opt(2000, 10, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            price: Decimal::new(4495, 2),
            description: "An in-depth look at creating applications with XML.".to_string(),
            author_id: 1,
            version: Some(version),
        }
    }

    fn service(mock: MockCatalogRepository) -> CatalogService {
        CatalogService::new(Arc::new(mock))
    }

    #[test]
    fn both_date_spellings_parse_to_the_same_day() {
        let dashed = parse_publication_date("2020-01-05").unwrap();
        let slashed = parse_publication_date("2020/01/05").unwrap();
        assert_eq!(dashed, slashed);
        assert_eq!(dashed, NaiveDate::from_ymd_opt(2020, 1, 5).unwrap());
    }

    #[test]
    fn malformed_dates_are_bad_requests() {
        for raw in ["2020-1-5", "2020-01/05", "20200105", "2020-13-01", "2020-02-30", "yesterday", ""] {
            let err = parse_publication_date(raw).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "{raw} should be rejected");
        }
    }

    #[tokio::test]
    async fn replace_with_mismatched_id_never_writes() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_replace_book().never();

        let err = service(mock).replace_book(2, book(3, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn replace_of_vanished_book_is_not_found() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_replace_book().times(1).returning(|_| Ok(0));
        mock.expect_book_exists().times(1).returning(|_| Ok(false));

        let err = service(mock).replace_book(3, book(3, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn replace_with_stale_version_is_conflict() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_replace_book().times(1).returning(|_| Ok(0));
        mock.expect_book_exists().times(1).returning(|_| Ok(true));

        let err = service(mock).replace_book(3, book(3, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn successful_replace_skips_existence_check() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_replace_book()
            .withf(|b| b.id == 3 && b.version == Some(4))
            .times(1)
            .returning(|_| Ok(1));
        mock.expect_book_exists().never();

        service(mock).replace_book(3, book(3, 4)).await.unwrap();
    }

    #[tokio::test]
    async fn unversioned_replace_of_vanished_book_is_not_found() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_replace_book()
            .withf(|b| b.version.is_none())
            .times(1)
            .returning(|_| Ok(0));
        mock.expect_book_exists().times(1).returning(|_| Ok(false));

        let mut unversioned = book(3, 1);
        unversioned.version = None;
        let err = service(mock).replace_book(3, unversioned).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_list_books()
            .withf(|q| q.id == Some(42))
            .returning(|_| Ok(vec![]));

        let err = service(mock).get_book_detail(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_of_missing_book_is_not_found() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_delete_book().returning(|_| Ok(None));

        let err = service(mock).delete_book(9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
