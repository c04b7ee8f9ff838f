//! Book model, its payloads and its read projections.
//!
//! `Book` is the persisted record. `BookWithAuthor` is a book joined with its
//! author's name; the two views (`BookSummary`, `BookDetail`) are only ever
//! built from it, so a projection cannot run against an unloaded author.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Full book record (DB + API)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    #[validate(length(min = 1, max = 256, message = "Title must be 1 to 256 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 64, message = "Genre must be 1 to 64 characters"))]
    pub genre: String,
    pub publish_date: NaiveDateTime,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: String,
    pub author_id: i32,
    /// Concurrency token, bumped on every replace. A replace that omits it
    /// overwrites whatever is stored.
    #[serde(default)]
    pub version: Option<i32>,
}

/// Create book request (a book without its generated fields)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[validate(length(min = 1, max = 256, message = "Title must be 1 to 256 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 64, message = "Genre must be 1 to 64 characters"))]
    pub genre: String,
    pub publish_date: NaiveDateTime,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: String,
    pub author_id: i32,
}

/// Prices are stored as `NUMERIC(18, 2)`
const PRICE_SCALE: u32 = 2;

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let message = if price.is_sign_negative() && !price.is_zero() {
        "Price cannot be negative"
    } else if price.scale() > PRICE_SCALE {
        "Price cannot have more than 2 decimal places"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("price");
    err.message = Some(message.into());
    Err(err)
}

/// Book row joined with its author's name
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BookWithAuthor {
    #[sqlx(flatten)]
    pub book: Book,
    pub author_name: String,
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub title: String,
    pub author_name: String,
    pub genre: String,
}

/// Detailed book representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub title: String,
    pub genre: String,
    pub publish_date: NaiveDateTime,
    pub price: Decimal,
    pub description: String,
    pub author_name: String,
}

impl From<&BookWithAuthor> for BookSummary {
    fn from(row: &BookWithAuthor) -> Self {
        Self {
            title: row.book.title.clone(),
            author_name: row.author_name.clone(),
            genre: row.book.genre.clone(),
        }
    }
}

impl From<&BookWithAuthor> for BookDetail {
    fn from(row: &BookWithAuthor) -> Self {
        Self {
            title: row.book.title.clone(),
            genre: row.book.genre.clone(),
            publish_date: row.book.publish_date,
            price: row.book.price,
            description: row.book.description.clone(),
            author_name: row.author_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> BookWithAuthor {
        BookWithAuthor {
            book: Book {
                id: 7,
                title: "Midnight Rain".to_string(),
                genre: "Fantasy".to_string(),
                publish_date: NaiveDate::from_ymd_opt(2000, 12, 16)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                price: Decimal::new(595, 2),
                description: "A former architect battles an evil sorceress.".to_string(),
                author_id: 2,
                version: Some(1),
            },
            author_name: "Ralls, Kim".to_string(),
        }
    }

    #[test]
    fn summary_projects_title_author_and_genre() {
        let summary = BookSummary::from(&sample());
        assert_eq!(summary.title, "Midnight Rain");
        assert_eq!(summary.author_name, "Ralls, Kim");
        assert_eq!(summary.genre, "Fantasy");
    }

    #[test]
    fn detail_keeps_every_field_but_ids() {
        let row = sample();
        let detail = BookDetail::from(&row);
        assert_eq!(detail.publish_date, row.book.publish_date);
        assert_eq!(detail.price, Decimal::new(595, 2));
        assert_eq!(detail.description, row.book.description);

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("authorId").is_none());
        assert_eq!(json["authorName"], "Ralls, Kim");
    }

    #[test]
    fn payload_validation() {
        let mut book = sample().book;
        assert!(book.validate().is_ok());

        book.title = String::new();
        assert!(book.validate().is_err());

        book.title = "Ok".to_string();
        book.price = Decimal::new(-1, 0);
        assert!(book.validate().is_err());
    }

    #[test]
    fn price_scale_is_capped_at_cents() {
        let mut book = sample().book;
        book.price = Decimal::new(1250, 2);
        assert!(book.validate().is_ok());
        // Trailing zeros still count as scale
        book.price = Decimal::new(12500, 3);
        assert!(book.validate().is_err());
        book.price = Decimal::new(1999, 3);
        assert!(book.validate().is_err());
    }

    #[test]
    fn replace_payload_may_omit_version() {
        let book: Book = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Midnight Rain",
            "genre": "Fantasy",
            "publishDate": "2000-12-16T00:00:00",
            "price": "14.95",
            "description": "A former architect battles an evil sorceress.",
            "authorId": 1
        }))
        .unwrap();
        assert_eq!(book.version, None);
        assert!(book.validate().is_ok());
    }

    #[test]
    fn new_book_accepts_camel_case_and_missing_description() {
        let payload: NewBook = serde_json::from_value(serde_json::json!({
            "title": "Maeve Ascendant",
            "genre": "Fantasy",
            "publishDate": "2000-11-17T00:00:00",
            "price": "5.95",
            "authorId": 3
        }))
        .unwrap();
        assert_eq!(payload.description, "");
        assert_eq!(payload.author_id, 3);
        assert!(payload.validate().is_ok());
    }
}
