use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::Database;
use crate::review::{NewReview, ReviewFilter, ReviewRecord};
use crate::{Error, Result};

/// Repository for review CRUD operations
pub struct ReviewRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct ReviewRow {
    id: i64,
    client_name: String,
    rating: i64,
    comment: String,
    created_at: DateTime<Utc>,
    is_approved: i32,
}

impl From<ReviewRow> for ReviewRecord {
    fn from(row: ReviewRow) -> Self {
        ReviewRecord {
            id: row.id,
            client_name: row.client_name,
            rating: row.rating,
            comment: row.comment,
            created_at: Some(row.created_at),
            is_approved: row.is_approved != 0,
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, client_name, rating, comment, created_at, is_approved FROM reviews";

impl<'a> ReviewRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a guest review; new reviews always start unapproved
    pub async fn create(&self, new_review: &NewReview) -> Result<ReviewRecord> {
        self.insert(new_review, Utc::now(), false).await
    }

    /// Insert a review with an explicit timestamp and approval state
    pub async fn insert(
        &self,
        new_review: &NewReview,
        created_at: DateTime<Utc>,
        approved: bool,
    ) -> Result<ReviewRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (client_name, rating, comment, created_at, is_approved)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_review.name)
        .bind(new_review.rating as i64)
        .bind(&new_review.comment)
        .bind(created_at)
        .bind(approved as i32)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or(Error::ReviewNotFound(id))
    }

    /// Find a review by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ReviewRecord>> {
        let row: Option<ReviewRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(Into::into))
    }

    /// One page of approved reviews, newest first
    pub async fn list_approved(&self, offset: u32, limit: u32) -> Result<Vec<ReviewRecord>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "{} WHERE is_approved = 1 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All reviews matching a moderation filter, newest first
    pub async fn list(&self, filter: ReviewFilter) -> Result<Vec<ReviewRecord>> {
        let condition = match filter {
            ReviewFilter::All => "",
            ReviewFilter::Approved => " WHERE is_approved = 1",
            ReviewFilter::Pending => " WHERE is_approved = 0",
        };

        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "{}{} ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS, condition
        ))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark a review approved, returning false if it does not exist
    pub async fn approve(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE reviews SET is_approved = 1 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a review, returning false if it does not exist
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
