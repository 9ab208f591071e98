use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use reviewdeck_core::backend::ReviewSource;
use reviewdeck_core::feed::{FeedSession, FeedView};
use reviewdeck_core::AppConfig;

/// One line describing the parts of the view worth printing
fn summarize(view: &FeedView) -> String {
    let mut line = format!(
        "{:>7.1}px  {:<7}  reviews: {}",
        view.position.offset,
        view.scheduler.to_string(),
        view.items.len()
    );
    if view.loading {
        line.push_str("  loading");
    } else if !view.has_more {
        line.push_str("  (end)");
    }
    if let Some(notification) = &view.notification {
        line.push_str(&format!("  [{}] {}", notification.kind, notification.message));
    }
    line
}

pub async fn run(config: &AppConfig, source: Arc<dyn ReviewSource>, seconds: u64) -> Result<()> {
    let session = FeedSession::mount(source, config);
    let mut views = session.subscribe();

    println!("Watching the review feed for {}s (Ctrl+C to stop)", seconds);

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);
    let mut last = String::new();

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = summarize(&views.borrow_and_update());
                if line != last {
                    println!("{}", line);
                    last = line;
                }
            }
        }
    }

    session.unmount().await;
    Ok(())
}
