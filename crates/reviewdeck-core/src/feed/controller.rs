use std::sync::Arc;

use tokio::time::Instant;

use super::arbiter::InteractionArbiter;
use super::backoff::RetryBackoff;
use super::notification::{Notification, NotificationKind, NotificationSink};
use super::paginator::{FetchOutcome, FetchRequest, Paginator};
use super::scheduler::{AutoAdvanceScheduler, SchedulerState};
use super::scroll::{PositionChanged, ScrollCause, ScrollController, ScrollPosition};
use super::store::{FeedStore, FetchToken};
use super::timer::earliest;
use crate::config::{AppConfig, FeedConfig};
use crate::review::{Review, ReviewRecord};
use crate::Result;

const FETCH_FAILED_MESSAGE: &str = "Could not load reviews.";

/// Everything that can happen to a mounted feed
#[derive(Debug)]
pub enum FeedEvent {
    Mounted,
    /// Auto-advance timer fired
    Tick,
    /// Pointer or key activity that does not move the viewport by itself
    UserInteracted,
    /// Direct scroll by `delta`
    UserScrolled { delta: f64 },
    /// Arrow control: move one page fraction of the viewport
    UserPaged { forward: bool },
    ViewportResized { extent: f64 },
    /// Content width reported by a renderer; replaces the card layout estimate
    ContentMeasured { extent: f64 },
    QuiescenceElapsed,
    NotificationExpired,
    Notify {
        message: String,
        kind: NotificationKind,
    },
    DismissNotification,
    /// Drop everything and load from page zero again
    Reload,
    FetchCompleted {
        token: FetchToken,
        result: Result<Vec<ReviewRecord>>,
    },
    Unmounted,
}

/// Side effects requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    Fetch(FetchRequest),
    /// Abort the fetch currently in flight; its result is already stale
    CancelFetch,
}

/// Snapshot handed to renderers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedView {
    pub items: Arc<Vec<Review>>,
    pub loading: bool,
    pub has_more: bool,
    pub position: ScrollPosition,
    pub scheduler: SchedulerState,
    pub notification: Option<Notification>,
    pub show_left_affordance: bool,
    pub show_right_affordance: bool,
    /// Consecutive failed fetches
    pub failures: u32,
}

/// Deterministic state machine behind a review feed.
///
/// All mutation goes through [`FeedController::handle`] with the current time,
/// so the controller can be driven by a tokio loop or stepped by hand in tests.
pub struct FeedController {
    config: FeedConfig,
    store: FeedStore,
    paginator: Paginator,
    scroll: ScrollController,
    scheduler: AutoAdvanceScheduler,
    arbiter: InteractionArbiter,
    notifications: NotificationSink,
    content_measured: bool,
    mounted: bool,
    disposed: bool,
}

impl FeedController {
    pub fn new(config: &AppConfig) -> Self {
        let feed = config.feed.clone();
        Self {
            store: FeedStore::new(),
            paginator: Paginator::new(feed.page_size, RetryBackoff::from_config(&config.retry)),
            scroll: ScrollController::new(feed.viewport_extent, feed.affordance_margin_px),
            scheduler: AutoAdvanceScheduler::new(
                feed.auto_advance_interval(),
                feed.step_fraction,
                feed.wrap_epsilon_px,
            ),
            arbiter: InteractionArbiter::new(feed.quiescence()),
            notifications: NotificationSink::new(config.notification.display()),
            content_measured: false,
            mounted: false,
            disposed: false,
            config: feed,
        }
    }

    pub fn handle(&mut self, event: FeedEvent, now: Instant) -> Vec<FeedCommand> {
        if self.disposed {
            tracing::debug!(?event, "Ignoring event after unmount");
            return Vec::new();
        }

        let mut commands = Vec::new();
        match event {
            FeedEvent::Mounted => {
                if self.mounted {
                    return commands;
                }
                tracing::info!(page_size = self.paginator.page_size(), "Review feed mounted");
                self.mounted = true;
                self.store.reset();
                self.paginator.reset();
                commands.extend(self.fetch_next(now));
            }
            FeedEvent::Tick => {
                if self.scheduler.state() == SchedulerState::Running {
                    // Prefetch is judged on the position the tick started from
                    commands.extend(self.maybe_fetch(self.config.tick_prefetch_threshold_px, now));
                    if let Some(change) = self.scheduler.on_tick(now, &mut self.scroll) {
                        self.position_changed(change, now);
                    }
                }
            }
            FeedEvent::UserInteracted => {
                self.arbiter.on_user_interaction(now, &mut self.scheduler);
            }
            FeedEvent::UserScrolled { delta } => {
                commands.extend(self.user_scroll(delta, now));
            }
            FeedEvent::UserPaged { forward } => {
                let step = self.scroll.position().viewport_extent * self.config.page_fraction;
                let delta = if forward { step } else { -step };
                commands.extend(self.user_scroll(delta, now));
            }
            FeedEvent::ViewportResized { extent } => {
                if let Some(change) = self.scroll.set_viewport_extent(extent) {
                    self.position_changed(change, now);
                }
                commands.extend(self.maybe_fetch(self.config.near_end_threshold_px, now));
            }
            FeedEvent::ContentMeasured { extent } => {
                self.content_measured = true;
                if let Some(change) = self.scroll.set_content_extent(extent) {
                    self.position_changed(change, now);
                }
            }
            FeedEvent::QuiescenceElapsed => {
                self.arbiter.on_quiescence_elapsed(now, &mut self.scheduler);
            }
            FeedEvent::NotificationExpired => {
                self.notifications.expire(now);
            }
            FeedEvent::Notify { message, kind } => {
                self.notifications.show(message, kind, now);
            }
            FeedEvent::DismissNotification => {
                self.notifications.dismiss();
            }
            FeedEvent::Reload => {
                if !self.mounted {
                    return commands;
                }
                tracing::info!("Reloading review feed");
                if self.store.is_loading() {
                    commands.push(FeedCommand::CancelFetch);
                }
                self.store.reset();
                self.paginator.reset();
                if let Some(change) = self.scroll.scroll_to_start(ScrollCause::Programmatic) {
                    self.position_changed(change, now);
                }
                commands.extend(self.fetch_next(now));
            }
            FeedEvent::FetchCompleted { token, result } => {
                self.fetch_completed(token, result, now);
            }
            FeedEvent::Unmounted => {
                if self.store.is_loading() {
                    commands.push(FeedCommand::CancelFetch);
                }
                self.dispose();
            }
        }
        commands
    }

    /// Earliest armed timer, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.disposed {
            return None;
        }
        earliest([
            self.scheduler.tick_deadline(),
            self.arbiter.deadline(),
            self.notifications.deadline(),
        ])
    }

    /// Timer events that are due at `now`, earliest deadline first
    pub fn due_events(&self, now: Instant) -> Vec<FeedEvent> {
        if self.disposed {
            return Vec::new();
        }
        let mut due: Vec<(Instant, FeedEvent)> = Vec::new();
        if let Some(at) = self.scheduler.tick_deadline().filter(|_| self.scheduler.tick_is_due(now)) {
            due.push((at, FeedEvent::Tick));
        }
        if let Some(at) = self.arbiter.deadline().filter(|_| self.arbiter.is_due(now)) {
            due.push((at, FeedEvent::QuiescenceElapsed));
        }
        if let Some(at) = self.notifications.deadline().filter(|_| self.notifications.is_due(now)) {
            due.push((at, FeedEvent::NotificationExpired));
        }
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, event)| event).collect()
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            items: self.store.shared(),
            loading: self.store.is_loading(),
            has_more: self.store.has_more(),
            position: self.scroll.position(),
            scheduler: self.scheduler.state(),
            notification: self.notifications.current().cloned(),
            show_left_affordance: self.scroll.show_left_affordance(),
            show_right_affordance: self.scroll.show_right_affordance(),
            failures: self.paginator.backoff().failures(),
        }
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn user_scroll(&mut self, delta: f64, now: Instant) -> Option<FeedCommand> {
        match self.scroll.advance_by(delta, ScrollCause::User) {
            Some(change) => self.position_changed(change, now),
            // Pushing against either end still counts as activity
            None => self.arbiter.on_user_interaction(now, &mut self.scheduler),
        }
        self.maybe_fetch(self.config.near_end_threshold_px, now)
    }

    fn position_changed(&mut self, change: PositionChanged, now: Instant) {
        tracing::trace!(
            offset = change.position.offset,
            previous = change.previous_offset,
            cause = ?change.cause,
            "Feed position changed"
        );
        self.arbiter
            .on_position_changed(&change, now, &mut self.scheduler);
    }

    fn maybe_fetch(&mut self, threshold: f64, now: Instant) -> Option<FeedCommand> {
        if !self.mounted || !self.scroll.near_end(threshold) {
            return None;
        }
        self.fetch_next(now)
    }

    fn fetch_next(&mut self, now: Instant) -> Option<FeedCommand> {
        let request = self.paginator.fetch_next(&mut self.store, now)?;
        self.sync_content_extent(now);
        Some(FeedCommand::Fetch(request))
    }

    fn fetch_completed(&mut self, token: FetchToken, result: Result<Vec<ReviewRecord>>, now: Instant) {
        match self.paginator.complete(&mut self.store, token, result, now) {
            FetchOutcome::Stale => return,
            FetchOutcome::Appended { .. } => {
                if self.scheduler.state() == SchedulerState::Idle {
                    self.scheduler.start(now, self.arbiter.is_interacting());
                }
            }
            FetchOutcome::Failed { retry_in, .. } => {
                if retry_in.is_none() {
                    tracing::warn!("Automatic review loading stopped after repeated failures");
                }
                self.notifications
                    .show(FETCH_FAILED_MESSAGE, NotificationKind::Error, now);
            }
        }
        self.sync_content_extent(now);
    }

    /// Estimate content width from the card layout unless a renderer measures it
    fn sync_content_extent(&mut self, now: Instant) {
        if self.content_measured {
            return;
        }
        let cards = self.store.len() + usize::from(self.store.is_loading());
        let extent = if cards == 0 {
            0.0
        } else {
            cards as f64 * self.config.card_extent + (cards - 1) as f64 * self.config.card_gap
        };
        if let Some(change) = self.scroll.set_content_extent(extent) {
            self.position_changed(change, now);
        }
    }

    fn dispose(&mut self) {
        tracing::info!(loaded = self.store.len(), "Review feed unmounted");
        self.disposed = true;
        self.scheduler.dispose();
        self.arbiter.cancel();
        self.notifications.dismiss();
        self.store.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::Utc;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn records(ids: std::ops::RangeInclusive<i64>) -> Vec<ReviewRecord> {
        ids.map(|id| ReviewRecord {
            id,
            client_name: format!("guest{}", id),
            rating: 5,
            comment: "Lovely stay".to_string(),
            created_at: Some(Utc::now()),
            is_approved: true,
        })
        .collect()
    }

    fn fetch_of(commands: &[FeedCommand]) -> Option<FetchRequest> {
        commands.iter().find_map(|command| match command {
            FeedCommand::Fetch(request) => Some(*request),
            FeedCommand::CancelFetch => None,
        })
    }

    fn mounted(t0: Instant) -> (FeedController, FetchRequest) {
        let mut controller = FeedController::new(&AppConfig::default());
        let commands = controller.handle(FeedEvent::Mounted, t0);
        let request = fetch_of(&commands).expect("mount fetches page 0");
        (controller, request)
    }

    fn complete(
        controller: &mut FeedController,
        request: FetchRequest,
        result: Result<Vec<ReviewRecord>>,
        now: Instant,
    ) {
        controller.handle(
            FeedEvent::FetchCompleted {
                token: request.token,
                result,
            },
            now,
        );
    }

    #[test]
    fn test_mount_requests_first_page() {
        let (controller, request) = mounted(Instant::now());
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, 6);
        assert!(controller.view().loading);
        assert_eq!(controller.scheduler_state(), SchedulerState::Idle);
        // Placeholder card while loading
        assert_eq!(controller.scroll().position().content_extent, 320.0);
    }

    #[test]
    fn test_scenario_two_pages_then_end() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        complete(&mut controller, first, Ok(records(1..=6)), t0);

        let view = controller.view();
        assert_eq!(view.items.len(), 6);
        assert!(view.has_more);
        assert_eq!(view.scheduler, SchedulerState::Running);
        assert_eq!(view.position.content_extent, 6.0 * 320.0 + 5.0 * 32.0);

        // 2080 - 1024 = 1056 left; scrolling 900 leaves 156, inside the 200 threshold
        let commands = controller.handle(FeedEvent::UserScrolled { delta: 900.0 }, t0 + ms(10));
        let second = fetch_of(&commands).expect("near end fetches page 1");
        assert_eq!(second.offset, 6);

        // Still loading: a second trigger is absorbed
        let commands = controller.handle(FeedEvent::UserScrolled { delta: 50.0 }, t0 + ms(20));
        assert!(fetch_of(&commands).is_none());

        complete(&mut controller, second, Ok(records(7..=10)), t0 + ms(30));
        let view = controller.view();
        assert_eq!(view.items.len(), 10);
        assert!(!view.has_more);
        assert_eq!(controller.store().cursor(), 2);

        let commands = controller.handle(FeedEvent::UserScrolled { delta: 5000.0 }, t0 + ms(40));
        assert!(fetch_of(&commands).is_none());
    }

    #[test]
    fn test_scenario_interaction_suppresses_until_quiescence() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        complete(&mut controller, first, Ok(records(1..=6)), t0);

        let t1 = t0 + ms(1000);
        controller.handle(FeedEvent::UserInteracted, t1);
        assert_eq!(controller.scheduler_state(), SchedulerState::Suppressed);
        assert!(controller.due_events(t1 + ms(2999)).is_empty());

        let due = controller.due_events(t1 + ms(3000));
        assert!(matches!(due.as_slice(), [FeedEvent::QuiescenceElapsed]));
        controller.handle(FeedEvent::QuiescenceElapsed, t1 + ms(3000));
        assert_eq!(controller.scheduler_state(), SchedulerState::Running);
        assert_eq!(controller.next_deadline(), Some(t1 + ms(6000)));
    }

    #[test]
    fn test_scenario_tick_at_end_wraps() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        // Short page: no more fetches will get in the way
        complete(&mut controller, first, Ok(records(1..=5)), t0);
        let max_offset = controller.scroll().position().max_offset();
        assert_eq!(max_offset, 5.0 * 320.0 + 4.0 * 32.0 - 1024.0);

        controller.handle(FeedEvent::UserScrolled { delta: max_offset }, t0);
        assert_eq!(controller.scroll().offset(), max_offset);

        let resume = t0 + ms(3000);
        controller.handle(FeedEvent::QuiescenceElapsed, resume);
        let tick_at = resume + ms(3000);
        assert!(matches!(controller.due_events(tick_at).as_slice(), [FeedEvent::Tick]));
        controller.handle(FeedEvent::Tick, tick_at);

        assert_eq!(controller.scroll().offset(), 0.0);
        assert_eq!(controller.scheduler_state(), SchedulerState::Running);
    }

    #[test]
    fn test_auto_advance_does_not_suppress_itself() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        complete(&mut controller, first, Ok(records(1..=6)), t0);

        controller.handle(FeedEvent::Tick, t0 + ms(3000));
        assert_eq!(controller.scroll().offset(), 0.4 * 1024.0);
        assert_eq!(controller.scheduler_state(), SchedulerState::Running);
        assert_eq!(controller.next_deadline(), Some(t0 + ms(6000)));
    }

    #[test]
    fn test_tick_prefetches_with_wider_threshold() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        complete(&mut controller, first, Ok(records(1..=6)), t0);

        // 1056 left: two ticks of 409.6 leave 236.8, outside 200 but inside 300
        let commands = controller.handle(FeedEvent::Tick, t0 + ms(3000));
        assert!(fetch_of(&commands).is_none());
        let commands = controller.handle(FeedEvent::Tick, t0 + ms(6000));
        assert!(fetch_of(&commands).is_none());
        assert!((controller.scroll().position().remaining() - 236.8).abs() < 1e-6);

        // The third tick sees 236.8 left before it moves
        let commands = controller.handle(FeedEvent::Tick, t0 + ms(9000));
        let request = fetch_of(&commands).expect("tick prefetch");
        assert_eq!(request.page, 1);
        assert!((controller.scroll().offset() - 3.0 * 409.6).abs() < 1e-6);
    }

    #[test]
    fn test_first_page_during_interaction_starts_suppressed() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        controller.handle(FeedEvent::UserInteracted, t0);
        assert_eq!(controller.scheduler_state(), SchedulerState::Idle);

        complete(&mut controller, first, Ok(records(1..=6)), t0 + ms(100));
        assert_eq!(controller.scheduler_state(), SchedulerState::Suppressed);

        controller.handle(FeedEvent::QuiescenceElapsed, t0 + ms(3000));
        assert_eq!(controller.scheduler_state(), SchedulerState::Running);
    }

    #[test]
    fn test_failure_notifies_and_backs_off() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        complete(&mut controller, first, Ok(records(1..=6)), t0);

        let commands = controller.handle(FeedEvent::UserScrolled { delta: 900.0 }, t0);
        let second = fetch_of(&commands).unwrap();
        complete(&mut controller, second, Err(Error::Other("offline".into())), t0 + ms(100));

        let view = controller.view();
        assert!(!view.loading);
        assert_eq!(view.items.len(), 6);
        assert_eq!(view.failures, 1);
        let notification = view.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, FETCH_FAILED_MESSAGE);

        // Inside the 1000ms window
        let commands = controller.handle(FeedEvent::UserScrolled { delta: 10.0 }, t0 + ms(600));
        assert!(fetch_of(&commands).is_none());

        let commands = controller.handle(FeedEvent::UserScrolled { delta: 10.0 }, t0 + ms(1100));
        let retry = fetch_of(&commands).expect("retry after window");
        assert_eq!(retry.offset, 6);
    }

    #[test]
    fn test_notification_expires() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        complete(&mut controller, first, Err(Error::Other("offline".into())), t0);
        assert!(controller.notification().is_some());

        assert!(matches!(
            controller.due_events(t0 + ms(3000)).as_slice(),
            [FeedEvent::NotificationExpired]
        ));
        controller.handle(FeedEvent::NotificationExpired, t0 + ms(3000));
        assert!(controller.notification().is_none());
    }

    #[test]
    fn test_reload_discards_in_flight_result() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);

        let commands = controller.handle(FeedEvent::Reload, t0 + ms(10));
        assert_eq!(commands[0], FeedCommand::CancelFetch);
        let fresh = fetch_of(&commands).unwrap();
        assert_ne!(fresh.token, first.token);

        complete(&mut controller, first, Ok(records(1..=6)), t0 + ms(20));
        assert!(controller.view().items.is_empty());
        assert!(controller.view().loading);

        complete(&mut controller, fresh, Ok(records(20..=22)), t0 + ms(30));
        assert_eq!(controller.view().items.len(), 3);
    }

    #[test]
    fn test_unmount_is_terminal() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);

        let commands = controller.handle(FeedEvent::Unmounted, t0);
        assert_eq!(commands, vec![FeedCommand::CancelFetch]);
        assert!(controller.next_deadline().is_none());

        complete(&mut controller, first, Ok(records(1..=6)), t0 + ms(10));
        assert!(controller.view().items.is_empty());
        assert_eq!(controller.scheduler_state(), SchedulerState::Idle);
        assert!(controller.handle(FeedEvent::Mounted, t0 + ms(20)).is_empty());
    }

    #[test]
    fn test_measured_content_overrides_layout() {
        let t0 = Instant::now();
        let (mut controller, first) = mounted(t0);
        controller.handle(FeedEvent::ContentMeasured { extent: 5000.0 }, t0);
        complete(&mut controller, first, Ok(records(1..=6)), t0);
        assert_eq!(controller.scroll().position().content_extent, 5000.0);
    }
}
