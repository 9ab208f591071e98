use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::controller::{FeedCommand, FeedController, FeedEvent, FeedView};
use super::paginator::FetchRequest;
use crate::backend::ReviewSource;
use crate::config::AppConfig;

/// Cloneable sender for feed events
#[derive(Clone)]
pub struct FeedHandle {
    events: mpsc::UnboundedSender<FeedEvent>,
}

impl FeedHandle {
    /// Returns false once the session has shut down
    pub fn send(&self, event: FeedEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

/// A mounted review feed running on its own tokio task
///
/// Owns the event loop, runs fetches against the source and publishes a
/// [`FeedView`] after every event. Dropping every handle unmounts the feed.
pub struct FeedSession {
    handle: FeedHandle,
    view: watch::Receiver<FeedView>,
    task: JoinHandle<()>,
}

impl FeedSession {
    /// Mount a feed and request the first page. Must be called inside a tokio runtime.
    pub fn mount(source: Arc<dyn ReviewSource>, config: &AppConfig) -> Self {
        let controller = FeedController::new(config);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(controller.view());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let _ = events_tx.send(FeedEvent::Mounted);

        let event_loop = EventLoop {
            controller,
            source,
            view_tx,
            completions_tx,
            in_flight: None,
        };
        let task = tokio::spawn(event_loop.run(events_rx, completions_rx));

        Self {
            handle: FeedHandle { events: events_tx },
            view: view_rx,
            task,
        }
    }

    pub fn handle(&self) -> FeedHandle {
        self.handle.clone()
    }

    pub fn send(&self, event: FeedEvent) -> bool {
        self.handle.send(event)
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view.clone()
    }

    /// Latest published snapshot
    pub fn view(&self) -> FeedView {
        self.view.borrow().clone()
    }

    /// Tear down and wait for the event loop to finish
    pub async fn unmount(self) {
        self.handle.send(FeedEvent::Unmounted);
        if let Err(e) = self.task.await {
            tracing::error!("Feed event loop failed: {}", e);
        }
    }
}

struct EventLoop {
    controller: FeedController,
    source: Arc<dyn ReviewSource>,
    view_tx: watch::Sender<FeedView>,
    completions_tx: mpsc::UnboundedSender<FeedEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl EventLoop {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<FeedEvent>,
        mut completions: mpsc::UnboundedReceiver<FeedEvent>,
    ) {
        tracing::debug!("Feed event loop started");

        while !self.controller.is_disposed() {
            let deadline = self.controller.next_deadline();

            tokio::select! {
                event = events.recv() => {
                    // Every handle dropped: the owner is gone
                    let event = event.unwrap_or(FeedEvent::Unmounted);
                    self.dispatch(event, Instant::now());
                }
                Some(event) = completions.recv() => {
                    self.dispatch(event, Instant::now());
                }
                _ = wait_for(deadline) => {
                    let now = Instant::now();
                    for event in self.controller.due_events(now) {
                        self.dispatch(event, now);
                    }
                }
            }
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        tracing::debug!("Feed event loop stopped");
    }

    fn dispatch(&mut self, event: FeedEvent, now: Instant) {
        for command in self.controller.handle(event, now) {
            match command {
                FeedCommand::Fetch(request) => self.spawn_fetch(request),
                FeedCommand::CancelFetch => {
                    if let Some(task) = self.in_flight.take() {
                        task.abort();
                    }
                }
            }
        }
        self.view_tx.send_replace(self.controller.view());
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let result = source
                .list_approved_reviews(request.offset, request.limit)
                .await;
            let _ = completions.send(FeedEvent::FetchCompleted {
                token: request.token,
                result,
            });
        }));
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
