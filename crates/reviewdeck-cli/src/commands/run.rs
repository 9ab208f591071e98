use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Position, Rect},
    Terminal,
};
use tokio::sync::{mpsc, watch};

use reviewdeck_core::{
    backend::ReviewBackend,
    feed::{FeedEvent, FeedSession, FeedView, NotificationKind},
    review::validate_new_review,
    AppConfig,
};
use reviewdeck_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler, SubmitResult},
    input::{handle_key_event, Action},
    widgets::{PopupWidget, ReviewStripWidget, StatusBarWidget, ToastWidget},
};

/// Columns moved by one mouse wheel notch
const WHEEL_COLUMNS: u16 = 4;

pub async fn run(config: Arc<AppConfig>, backend: Arc<dyn ReviewBackend>) -> Result<()> {
    let session = FeedSession::mount(Arc::clone(&backend).into_source(), &config);
    let views = session.subscribe();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Reviewdeck"))?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(session.handle(), config.clone());
    let result = event_loop(&mut terminal, &mut app, views, backend).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    session.unmount().await;
    result
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut views: watch::Receiver<FeedView>,
    backend: Arc<dyn ReviewBackend>,
) -> Result<()> {
    let event_handler = EventHandler::new(app.config.ui.tick_rate_ms);
    let (submit_tx, mut submit_rx) = mpsc::unbounded_channel::<SubmitResult>();
    let mut strip_area = Rect::default();

    loop {
        // Process finished submissions (non-blocking)
        while let Ok(result) = submit_rx.try_recv() {
            handle_submit_result(app, result);
        }

        app.view = views.borrow_and_update().clone();

        terminal.draw(|frame| {
            let size = frame.area();

            // Main layout: feed + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(size);
            let feed_area = main_layout[0];
            strip_area = feed_area;

            app.set_strip_width(ReviewStripWidget::split(feed_area)[1].width);

            ReviewStripWidget::render(frame, feed_area, app);
            StatusBarWidget::render(frame, main_layout[1], app);
            ToastWidget::render(frame, feed_area, app);

            match &app.mode {
                Mode::Submit(form) => {
                    PopupWidget::render_submit_form(frame, form, app.submitting, &app.theme)
                }
                Mode::Help => PopupWidget::render_help(frame, &app.theme),
                Mode::Browse => {}
            }
        })?;

        if let Some(event) = event_handler.next()? {
            match event {
                AppEvent::Key(key) => {
                    if app.mode != Mode::Browse {
                        // Typing in the form still counts as someone using the page
                        app.send(FeedEvent::UserInteracted);
                    }
                    let action = handle_key_event(key, &app.mode);
                    handle_action(app, action, &backend, &submit_tx);
                }
                AppEvent::Wheel(notches) => {
                    let delta = app.layout.to_px(WHEEL_COLUMNS) * f64::from(notches);
                    app.send(FeedEvent::UserScrolled { delta });
                }
                AppEvent::Pointer { column, row } => {
                    if strip_area.contains(Position::new(column, row)) {
                        app.send(FeedEvent::UserInteracted);
                    }
                }
                // The next draw picks up the new size
                AppEvent::Resize(_, _) | AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_action(
    app: &mut App,
    action: Action,
    backend: &Arc<dyn ReviewBackend>,
    submit_tx: &mpsc::UnboundedSender<SubmitResult>,
) {
    match action {
        Action::Quit => app.should_quit = true,
        Action::PageLeft => app.send(FeedEvent::UserPaged { forward: false }),
        Action::PageRight => app.send(FeedEvent::UserPaged { forward: true }),
        Action::StepLeft => app.send(FeedEvent::UserScrolled {
            delta: -app.layout.card_step_px(),
        }),
        Action::StepRight => app.send(FeedEvent::UserScrolled {
            delta: app.layout.card_step_px(),
        }),
        Action::Reload => app.send(FeedEvent::Reload),
        Action::DismissNotification => app.send(FeedEvent::DismissNotification),
        Action::OpenForm => {
            app.send(FeedEvent::UserInteracted);
            app.open_form();
        }
        Action::ShowHelp => {
            app.send(FeedEvent::UserInteracted);
            app.mode = Mode::Help;
        }
        Action::NextField => {
            if let Some(form) = app.form_mut() {
                form.next_field();
            }
        }
        Action::RatingUp | Action::RatingDown => {
            if let Some(form) = app.form_mut() {
                form.adjust_rating(action == Action::RatingUp);
            }
        }
        Action::InputChar(c) => {
            if let Some(form) = app.form_mut() {
                form.input_char(c);
            }
        }
        Action::Backspace => {
            if let Some(form) = app.form_mut() {
                form.backspace();
            }
        }
        Action::Submit => submit(app, backend, submit_tx),
        Action::ExitMode => app.exit_mode(),
        Action::Interact => app.send(FeedEvent::UserInteracted),
        Action::None => {}
    }
}

/// Validate the form and send it in the background
fn submit(
    app: &mut App,
    backend: &Arc<dyn ReviewBackend>,
    submit_tx: &mpsc::UnboundedSender<SubmitResult>,
) {
    if app.submitting {
        return;
    }
    let Mode::Submit(form) = &app.mode else {
        return;
    };

    let review = match validate_new_review(&form.to_new_review()) {
        Ok(review) => review,
        Err(e) => {
            app.send(FeedEvent::Notify {
                message: e.to_string(),
                kind: NotificationKind::Error,
            });
            return;
        }
    };

    app.submitting = true;
    let backend = Arc::clone(backend);
    let tx = submit_tx.clone();
    tokio::spawn(async move {
        let result = match backend.submit_review(&review).await {
            Ok(()) => SubmitResult::Sent,
            Err(e) => {
                tracing::error!("Review submission failed: {}", e);
                SubmitResult::Failed {
                    error: e.to_string(),
                }
            }
        };
        let _ = tx.send(result);
    });
}

fn handle_submit_result(app: &mut App, result: SubmitResult) {
    app.submitting = false;
    match result {
        SubmitResult::Sent => {
            app.exit_mode();
            app.send(FeedEvent::Notify {
                message: "Thank you! Your review will appear once it has been approved.".into(),
                kind: NotificationKind::Success,
            });
        }
        SubmitResult::Failed { error } => {
            app.send(FeedEvent::Notify {
                message: format!("Could not send your review: {}", error),
                kind: NotificationKind::Error,
            });
        }
    }
}
