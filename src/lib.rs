//! Books Catalog
//!
//! A REST JSON API over a relational catalog of books and their authors:
//! listing, filtering by genre, author or publication day, detail views,
//! and create/replace/delete of books with optimistic concurrency.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state over a repository implementation
    pub fn new(config: AppConfig, repository: Arc<dyn repository::CatalogRepository>) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository)),
        }
    }
}
