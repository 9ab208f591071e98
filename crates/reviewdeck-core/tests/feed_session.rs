use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use reviewdeck_core::backend::{ReviewSource, SqliteBackend};
use reviewdeck_core::feed::{FeedEvent, FeedSession, NotificationKind, SchedulerState};
use reviewdeck_core::review::{NewReview, ReviewRecord};
use reviewdeck_core::storage::{Database, ReviewRepository};
use reviewdeck_core::{AppConfig, Error, Result};

/// Serves pages from a fixed list, failing the calls listed in `fail_calls`
struct ScriptedSource {
    rows: Vec<ReviewRecord>,
    fail_calls: Mutex<Vec<usize>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(count: i64) -> Self {
        let rows = (1..=count)
            .map(|id| ReviewRecord {
                id,
                client_name: format!("guest{}", id),
                rating: 5,
                comment: "Would book again".to_string(),
                created_at: Some(Utc::now()),
                is_approved: true,
            })
            .collect();
        Self {
            rows,
            fail_calls: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(mut self, calls: &[usize]) -> Self {
        self.fail_calls = Mutex::new(calls.to_vec());
        self
    }

    fn with_row(mut self, id: i64, edit: impl FnOnce(&mut ReviewRecord)) -> Self {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            edit(row);
        }
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewSource for ScriptedSource {
    async fn list_approved_reviews(&self, offset: u32, limit: u32) -> Result<Vec<ReviewRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_calls.lock().unwrap().contains(&call) {
            return Err(Error::Other("connection reset".into()));
        }
        Ok(self
            .rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Serves one JSON body, decoding rows the way the REST backend does
struct JsonSource {
    body: &'static str,
}

#[async_trait]
impl ReviewSource for JsonSource {
    async fn list_approved_reviews(&self, _offset: u32, _limit: u32) -> Result<Vec<ReviewRecord>> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(self.body)?;
        Ok(rows.into_iter().map(ReviewRecord::from_json).collect())
    }
}

async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_scroll_to_end_loads_remaining_pages_once() {
    let source = Arc::new(ScriptedSource::new(10));
    let session = FeedSession::mount(source.clone(), &AppConfig::default());
    settle().await;
    assert_eq!(session.view().items.len(), 6);

    session.send(FeedEvent::UserScrolled { delta: 900.0 });
    session.send(FeedEvent::UserScrolled { delta: 10.0 });
    settle().await;

    let view = session.view();
    assert_eq!(view.items.len(), 10);
    assert!(!view.has_more);
    assert_eq!(source.calls(), 2);

    session.send(FeedEvent::UserScrolled { delta: 2000.0 });
    settle().await;
    assert_eq!(source.calls(), 2);

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_malformed_rows_are_skipped_without_losing_the_page() {
    let source = Arc::new(
        ScriptedSource::new(10)
            .with_row(2, |row| row.rating = 0)
            .with_row(4, |row| row.client_name.clear()),
    );
    let session = FeedSession::mount(source.clone(), &AppConfig::default());
    settle().await;

    let view = session.view();
    let ids: Vec<i64> = view.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 5, 6]);
    // Six raw rows came back, so another page may exist
    assert!(view.has_more);
    assert_eq!(view.failures, 0);
    assert!(view.notification.is_none());

    // 4 cards leave 352 to the end; 200 more is inside the threshold
    session.send(FeedEvent::UserScrolled { delta: 200.0 });
    settle().await;

    let view = session.view();
    assert_eq!(source.calls(), 2);
    assert_eq!(view.items.len(), 8);
    assert!(!view.has_more);

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_null_fields_in_json_page_skip_only_that_row() {
    let source = Arc::new(JsonSource {
        body: r#"[
            {"id": 1, "client_name": "Marina", "rating": 5, "comment": "Lovely stay",
             "created_at": "2024-03-01T12:00:00+00:00", "is_approved": true},
            {"id": 2, "client_name": null, "rating": 4, "comment": null,
             "created_at": "2024-02-28T12:00:00+00:00", "is_approved": true},
            {"id": 3, "client_name": "Tiago", "rating": 4, "comment": "Quiet street",
             "created_at": "2024-02-27T12:00:00+00:00", "is_approved": true},
            {"id": 4, "client_name": "Ines", "rating": 5, "comment": "",
             "created_at": "2024-02-26T12:00:00+00:00", "is_approved": true},
            {"id": 5, "client_name": "Rui", "rating": 3, "comment": "Noisy at night",
             "created_at": "2024-02-25T12:00:00+00:00", "is_approved": true},
            {"id": 6, "client_name": "Ana", "rating": 5, "comment": "Great host",
             "created_at": "2024-02-24T12:00:00+00:00", "is_approved": true}
        ]"#,
    });
    let session = FeedSession::mount(source, &AppConfig::default());
    settle().await;

    let view = session.view();
    let ids: Vec<i64> = view.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 4, 5, 6]);
    assert!(view.has_more);
    assert_eq!(view.failures, 0);
    assert!(view.notification.is_none());

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_interaction_pauses_auto_advance() {
    let source = Arc::new(ScriptedSource::new(6));
    let session = FeedSession::mount(source, &AppConfig::default());
    settle().await;

    session.send(FeedEvent::UserInteracted);
    settle().await;
    assert_eq!(session.view().scheduler, SchedulerState::Suppressed);

    advance_ms(2999).await;
    assert_eq!(session.view().scheduler, SchedulerState::Suppressed);
    assert_eq!(session.view().position.offset, 0.0);

    advance_ms(1).await;
    assert_eq!(session.view().scheduler, SchedulerState::Running);

    advance_ms(3000).await;
    assert!(session.view().position.offset > 0.0);

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_shows_error_then_recovers_on_reload() {
    let source = Arc::new(ScriptedSource::new(4).failing(&[1]));
    let session = FeedSession::mount(source.clone(), &AppConfig::default());
    settle().await;

    let view = session.view();
    assert!(view.items.is_empty());
    assert!(!view.loading);
    assert_eq!(view.failures, 1);
    assert_eq!(view.notification.as_ref().map(|n| n.kind), Some(NotificationKind::Error));

    advance_ms(3000).await;
    assert!(session.view().notification.is_none());

    session.send(FeedEvent::Reload);
    settle().await;
    let view = session.view();
    assert_eq!(view.items.len(), 4);
    assert_eq!(view.failures, 0);
    assert_eq!(source.calls(), 2);

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_later_notification_replaces_earlier() {
    let source = Arc::new(ScriptedSource::new(2));
    let session = FeedSession::mount(source, &AppConfig::default());
    settle().await;

    session.send(FeedEvent::Notify {
        message: "first".into(),
        kind: NotificationKind::Info,
    });
    settle().await;
    advance_ms(500).await;
    session.send(FeedEvent::Notify {
        message: "second".into(),
        kind: NotificationKind::Success,
    });
    settle().await;

    advance_ms(2500).await;
    let current = session.view().notification.map(|n| n.message);
    assert_eq!(current.as_deref(), Some("second"));

    advance_ms(500).await;
    assert!(session.view().notification.is_none());

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_events_after_unmount_are_rejected() {
    let source = Arc::new(ScriptedSource::new(6));
    let session = FeedSession::mount(source, &AppConfig::default());
    let handle = session.handle();
    let mut views = session.subscribe();
    settle().await;

    session.unmount().await;
    assert!(!handle.send(FeedEvent::Reload));
    assert!(handle.is_closed());
    assert_eq!(views.borrow_and_update().scheduler, SchedulerState::Idle);
}

#[tokio::test]
async fn test_feed_over_sqlite_backend() {
    let db = Database::new_in_memory().await.unwrap();
    let repo = ReviewRepository::new(&db);
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    for i in 0..3 {
        let review = NewReview {
            name: format!("Guest {}", i),
            rating: 5,
            comment: "Sea view".to_string(),
        };
        repo.insert(&review, base + chrono::Duration::days(i), true)
            .await
            .unwrap();
    }
    repo.create(&NewReview {
        name: "Pending".to_string(),
        rating: 1,
        comment: "Not yet moderated".to_string(),
    })
    .await
    .unwrap();

    let backend = Arc::new(SqliteBackend::new(db.clone()));
    let session = FeedSession::mount(backend, &AppConfig::default());
    let mut views = session.subscribe();

    let view = views
        .wait_for(|view| !view.items.is_empty())
        .await
        .unwrap()
        .clone();
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.items[0].name, "Guest 2");
    assert!(!view.has_more);

    session.unmount().await;
}
