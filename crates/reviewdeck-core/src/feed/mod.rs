//! The review feed: paginated loading, horizontal scrolling, auto-advance and
//! transient notifications, driven by a single event loop.

mod arbiter;
mod backoff;
mod controller;
mod notification;
mod paginator;
mod scheduler;
mod scroll;
mod session;
mod store;
mod timer;

pub use arbiter::InteractionArbiter;
pub use backoff::RetryBackoff;
pub use controller::{FeedCommand, FeedController, FeedEvent, FeedView};
pub use notification::{Notification, NotificationKind, NotificationSink};
pub use paginator::{FetchOutcome, FetchRequest, Paginator};
pub use scheduler::{AutoAdvanceScheduler, SchedulerState};
pub use scroll::{PositionChanged, ScrollCause, ScrollController, ScrollPosition};
pub use session::{FeedHandle, FeedSession};
pub use store::{FeedStore, FetchToken};
pub use timer::{earliest, TimerSlot};
