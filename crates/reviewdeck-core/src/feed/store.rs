use std::collections::HashSet;
use std::sync::Arc;

use crate::review::Review;

/// Liveness token identifying one generation of feed state
///
/// Every `reset` (and teardown) moves to a new token, so a fetch started under
/// an older token can be recognised and dropped when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FetchToken(u64);

impl FetchToken {
    fn next(self) -> Self {
        FetchToken(self.0.wrapping_add(1))
    }
}

/// Ordered, deduplicated collection of loaded reviews plus pagination state
#[derive(Debug, Clone)]
pub struct FeedStore {
    items: Arc<Vec<Review>>,
    seen: HashSet<i64>,
    cursor: u32,
    has_more: bool,
    loading: bool,
    token: FetchToken,
}

impl Default for FeedStore {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            seen: HashSet::new(),
            cursor: 0,
            has_more: true,
            loading: false,
            token: FetchToken::default(),
        }
    }
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the feed and start a new generation; in-flight results become stale
    pub fn reset(&mut self) {
        self.items = Arc::new(Vec::new());
        self.seen.clear();
        self.cursor = 0;
        self.has_more = true;
        self.loading = false;
        self.token = self.token.next();
    }

    /// Append reviews whose ids have not been seen, in the given order.
    /// Returns how many were appended.
    pub fn append_page(&mut self, page: Vec<Review>) -> usize {
        let fresh: Vec<Review> = page
            .into_iter()
            .filter(|review| self.seen.insert(review.id))
            .collect();

        let appended = fresh.len();
        if appended > 0 {
            Arc::make_mut(&mut self.items).extend(fresh);
        }
        appended
    }

    /// Current ordered sequence, read-only
    pub fn snapshot(&self) -> &[Review] {
        &self.items
    }

    /// True when a review with this id has been appended since the last reset
    pub fn contains(&self, id: i64) -> bool {
        self.seen.contains(&id)
    }

    /// Cheap shared handle to the current sequence for renderers
    pub fn shared(&self) -> Arc<Vec<Review>> {
        Arc::clone(&self.items)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    #[inline]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[inline]
    pub fn token(&self) -> FetchToken {
        self.token
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Move past a completed page. `has_more` can only go from true to false here.
    pub(crate) fn advance_cursor(&mut self, page_was_full: bool) {
        self.cursor += 1;
        self.has_more = self.has_more && page_was_full;
    }

    /// Invalidate in-flight work without touching the loaded items (teardown)
    pub(crate) fn invalidate(&mut self) {
        self.loading = false;
        self.token = self.token.next();
    }
}
