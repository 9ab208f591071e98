use async_trait::async_trait;

use super::{ReviewModerator, ReviewSource, ReviewSubmitter};
use crate::config::AppConfig;
use crate::review::{validate_new_review, NewReview, ReviewFilter, ReviewRecord};
use crate::storage::{Database, ReviewRepository};
use crate::Result;

/// Backend over the local SQLite database
#[derive(Clone)]
pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (and migrate) the database under the configured data directory
    pub async fn open(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(Database::new(config).await?))
    }
}

#[async_trait]
impl ReviewSource for SqliteBackend {
    async fn list_approved_reviews(&self, offset: u32, limit: u32) -> Result<Vec<ReviewRecord>> {
        ReviewRepository::new(&self.db).list_approved(offset, limit).await
    }
}

#[async_trait]
impl ReviewSubmitter for SqliteBackend {
    async fn submit_review(&self, review: &NewReview) -> Result<()> {
        let review = validate_new_review(review)?;
        let created = ReviewRepository::new(&self.db).create(&review).await?;
        tracing::info!(id = created.id, "Review submitted for moderation");
        Ok(())
    }
}

#[async_trait]
impl ReviewModerator for SqliteBackend {
    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<ReviewRecord>> {
        ReviewRepository::new(&self.db).list(filter).await
    }

    async fn approve_review(&self, id: i64) -> Result<bool> {
        ReviewRepository::new(&self.db).approve(id).await
    }

    async fn delete_review(&self, id: i64) -> Result<bool> {
        ReviewRepository::new(&self.db).delete(id).await
    }
}
