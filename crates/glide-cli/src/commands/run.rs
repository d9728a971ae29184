use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use glide_core::AppConfig;
use glide_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, pointer_event},
    widgets::{CarouselWidget, RefreshHeadWidget, StatusBarWidget},
    Theme,
};

/// How long the simulated refresh takes
const REFRESH_DURATION: Duration = Duration::from_millis(1200);

/// Result of a background refresh
#[derive(Debug)]
pub struct RefreshResult {
    pub elapsed: Duration,
}

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let mut app = App::new(config.clone(), Theme::default())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("glide"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("Starting carousel with {} slides", app.slides.len());
    let result = main_loop(&mut terminal, &mut app, &config);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn main_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &AppConfig,
) -> Result<()> {
    let event_handler = EventHandler::new(config.ui.tick_rate_ms);
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<RefreshResult>();

    let clock = Instant::now();
    let mut last_frame = clock;

    loop {
        // Process any completed refreshes (non-blocking)
        while let Ok(result) = refresh_rx.try_recv() {
            debug!("Refresh finished after {:?}", result.elapsed);
            app.finish_refresh();
        }

        // Draw UI
        terminal.draw(|frame| {
            let size = frame.area();
            let status_rows = if app.config.ui.show_status_bar { 1 } else { 0 };
            let head_rows = app
                .head_rows()
                .min(size.height.saturating_sub(status_rows + 1));

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(head_rows),
                    Constraint::Min(1),
                    Constraint::Length(status_rows),
                ])
                .split(size);

            app.set_carousel_area(layout[1]);
            RefreshHeadWidget::render(frame, layout[0], app);
            CarouselWidget::render(frame, layout[1], app);
            if status_rows > 0 {
                StatusBarWidget::render(frame, layout[2], app);
            }
        })?;

        if let Some(event) = event_handler.next()? {
            let timestamp_ms = clock.elapsed().as_secs_f64() * 1000.0;
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key);
                    app.handle_action(action)?;
                }
                AppEvent::Mouse(mouse) => {
                    if let Some((phase, column, row)) = pointer_event(mouse) {
                        app.handle_pointer(phase, column, row, timestamp_ms);
                    }
                }
                AppEvent::Resize(_, _) => {
                    // Geometry changes under the finger; drop the gesture
                    app.cancel_pointer();
                }
                AppEvent::Tick => {}
            }
        }

        // Advance animations by wall time since the previous frame
        let now = Instant::now();
        let dt_ms = now.duration_since(last_frame).as_secs_f64() * 1000.0;
        last_frame = now;
        app.tick(dt_ms);

        if app.take_refresh_request() {
            app.set_status("Refreshing...");
            spawn_refresh(refresh_tx.clone());
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Stand-in for real refresh work: completes after a fixed delay
fn spawn_refresh(tx: mpsc::UnboundedSender<RefreshResult>) {
    tokio::spawn(async move {
        let started = Instant::now();
        tokio::time::sleep(REFRESH_DURATION).await;
        let _ = tx.send(RefreshResult {
            elapsed: started.elapsed(),
        });
    });
}
