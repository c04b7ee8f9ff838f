//! Data models for the books catalog

pub mod author;
pub mod book;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetail, BookSummary, BookWithAuthor, NewBook};
