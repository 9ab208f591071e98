use std::time::Duration;

use tokio::time::Instant;

use super::backoff::RetryBackoff;
use super::store::{FeedStore, FetchToken};
use crate::review::{validate_record, Review, ReviewRecord};
use crate::Result;

/// A page request handed to whoever talks to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: FetchToken,
    /// Zero-based page index (the store cursor when the request was made)
    pub page: u32,
    pub offset: u32,
    pub limit: u32,
}

impl FetchRequest {
    /// Inclusive index of the last row requested
    pub fn last_index(&self) -> u32 {
        self.offset + self.limit - 1
    }
}

/// What a completed fetch did to the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Appended {
        appended: usize,
        skipped: usize,
        has_more: bool,
    },
    Failed {
        error: String,
        retry_in: Option<Duration>,
    },
    /// The result belonged to an earlier generation and was dropped
    Stale,
}

/// Single-flight page fetching into a `FeedStore`
#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: u32,
    backoff: RetryBackoff,
}

impl Paginator {
    pub fn new(page_size: u32, backoff: RetryBackoff) -> Self {
        Self {
            page_size: page_size.max(1),
            backoff,
        }
    }

    #[inline]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn backoff(&self) -> &RetryBackoff {
        &self.backoff
    }

    /// Start fetching the next page unless one is already loading, the feed
    /// is exhausted, or the failure backoff window is still open.
    pub fn fetch_next(&mut self, store: &mut FeedStore, now: Instant) -> Option<FetchRequest> {
        if store.is_loading() {
            tracing::debug!("fetch_next ignored: a page is already loading");
            return None;
        }
        if !store.has_more() {
            tracing::debug!("fetch_next ignored: no more reviews");
            return None;
        }
        if !self.backoff.allows(now) {
            tracing::debug!(
                failures = self.backoff.failures(),
                "fetch_next ignored: backing off after failures"
            );
            return None;
        }

        store.set_loading(true);
        let page = store.cursor();
        let request = FetchRequest {
            token: store.token(),
            page,
            offset: page * self.page_size,
            limit: self.page_size,
        };
        tracing::debug!(
            page,
            from = request.offset,
            to = request.last_index(),
            "Fetching review page"
        );
        Some(request)
    }

    /// Fold a backend result into the store
    pub fn complete(
        &mut self,
        store: &mut FeedStore,
        token: FetchToken,
        result: Result<Vec<ReviewRecord>>,
        now: Instant,
    ) -> FetchOutcome {
        if token != store.token() {
            tracing::debug!("Dropping result of a fetch from an earlier feed generation");
            return FetchOutcome::Stale;
        }

        store.set_loading(false);

        match result {
            Ok(records) => {
                let page_was_full = records.len() as u32 == self.page_size;
                let received = records.len();
                let valid: Vec<Review> = records
                    .into_iter()
                    .filter_map(|record| match validate_record(record) {
                        Ok(review) => Some(review),
                        Err(e) => {
                            tracing::warn!("Skipping review: {}", e);
                            None
                        }
                    })
                    .collect();
                let skipped = received - valid.len();

                let appended = store.append_page(valid);
                store.advance_cursor(page_was_full);
                self.backoff.record_success();

                tracing::debug!(
                    appended,
                    skipped,
                    cursor = store.cursor(),
                    has_more = store.has_more(),
                    "Review page loaded"
                );

                FetchOutcome::Appended {
                    appended,
                    skipped,
                    has_more: store.has_more(),
                }
            }
            Err(e) => {
                let retry_in = self.backoff.record_failure(now);
                tracing::error!(
                    failures = self.backoff.failures(),
                    "Failed to fetch reviews: {}",
                    e
                );
                FetchOutcome::Failed {
                    error: e.to_string(),
                    retry_in,
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.backoff.reset();
    }
}
