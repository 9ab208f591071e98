//! Collaborators the review feed talks to: where pages come from, where guest
//! submissions go, and the moderation operations behind the admin screen.

mod rest;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, BackendKind};
use crate::review::{NewReview, ReviewFilter, ReviewRecord};
use crate::Result;

pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

/// Read side of the feed: approved reviews, newest first
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch `limit` approved reviews starting at `offset`.
    /// A page shorter than `limit` means there is no more data.
    async fn list_approved_reviews(&self, offset: u32, limit: u32) -> Result<Vec<ReviewRecord>>;
}

/// Guest submissions, stored unapproved
#[async_trait]
pub trait ReviewSubmitter: Send + Sync {
    async fn submit_review(&self, review: &NewReview) -> Result<()>;
}

/// Admin moderation operations
#[async_trait]
pub trait ReviewModerator: Send + Sync {
    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<ReviewRecord>>;
    /// Returns false when no review has this id
    async fn approve_review(&self, id: i64) -> Result<bool>;
    /// Returns false when no review has this id
    async fn delete_review(&self, id: i64) -> Result<bool>;
}

/// Everything a full backend provides
pub trait ReviewBackend: ReviewSource + ReviewSubmitter + ReviewModerator {
    /// The read side alone, for mounting a feed
    fn into_source(self: Arc<Self>) -> Arc<dyn ReviewSource>;
}

impl<T> ReviewBackend for T
where
    T: ReviewSource + ReviewSubmitter + ReviewModerator + 'static,
{
    fn into_source(self: Arc<Self>) -> Arc<dyn ReviewSource> {
        self
    }
}

/// Open the backend selected in the configuration
pub async fn open_backend(config: &AppConfig) -> Result<Arc<dyn ReviewBackend>> {
    match config.backend.kind {
        BackendKind::Sqlite => {
            let backend = SqliteBackend::open(config).await?;
            Ok(Arc::new(backend))
        }
        BackendKind::Rest => {
            let backend = RestBackend::new(&config.backend)?;
            tracing::info!("Using hosted review table at {}", backend.base_url());
            Ok(Arc::new(backend))
        }
    }
}
