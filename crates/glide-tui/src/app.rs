use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use glide_core::config::{AutoplayDirection, Axis};
use glide_core::motion::{MotionEngine, PointerSample, PullController, PullState};
use glide_core::AppConfig;
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

use crate::input::{Action, PointerPhase};
use crate::theme::Theme;

/// Pixels per terminal row. Columns count as one pixel each.
pub const ROW_PX: f64 = 8.0;

/// Which controller the active pointer gesture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grab {
    Carousel,
    Pull,
}

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub engine: MotionEngine,
    pub pull: PullController,
    /// Slide titles, one per item
    pub slides: Vec<String>,
    /// Carousel area from the last draw
    pub carousel_area: Rect,
    pub grab: Option<Grab>,
    pub status_message: Option<String>,
    pub refresh_count: u32,
    pub should_quit: bool,
    /// Set by the index-change callback, drained on tick
    reported: Rc<Cell<Option<usize>>>,
    /// Autoplay direction restored by the toggle
    autoplay_direction: AutoplayDirection,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme) -> glide_core::Result<Self> {
        let mut engine = MotionEngine::new(config.engine.clone())?;
        let pull = PullController::new(config.pull)?;

        let reported = Rc::new(Cell::new(None));
        let sink = Rc::clone(&reported);
        engine.on_index_change(move |index| sink.set(Some(index)));

        let slides = (1..=config.engine.item_count)
            .map(|n| format!("Slide {}", n))
            .collect();
        let autoplay_direction = match config.engine.autoplay.direction {
            AutoplayDirection::None => AutoplayDirection::Forward,
            direction => direction,
        };

        Ok(Self {
            config,
            theme,
            engine,
            pull,
            slides,
            carousel_area: Rect::default(),
            grab: None,
            status_message: None,
            refresh_count: 0,
            should_quit: false,
            reported,
            autoplay_direction,
        })
    }

    /// Record where the carousel was drawn and tell the engine its extent
    pub fn set_carousel_area(&mut self, area: Rect) {
        if area == self.carousel_area {
            return;
        }
        self.carousel_area = area;
        let extent = match self.engine.config().axis {
            Axis::Horizontal => area.width as f64,
            Axis::Vertical => area.height as f64 * ROW_PX,
        };
        self.engine.set_extent(extent);
    }

    /// Rows taken by the pull-to-refresh head
    pub fn head_rows(&self) -> u16 {
        (self.pull.head_px() / ROW_PX).round().max(0.0) as u16
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn handle_action(&mut self, action: Action) -> glide_core::Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Next => {
                self.engine.swipe_next();
            }
            Action::Prev => {
                self.engine.swipe_prev();
            }
            Action::First => {
                self.engine.swipe_to(0);
            }
            Action::Last => {
                let last = self.slides.len().saturating_sub(1) as i64;
                self.engine.swipe_to(last);
            }
            Action::ToggleLoop => {
                let mut config = self.engine.config().clone();
                config.loop_mode = !config.loop_mode;
                let enabled = config.loop_mode;
                self.engine.set_config(config)?;
                self.set_status(if enabled { "Loop on" } else { "Loop off" });
            }
            Action::ToggleAutoplay => {
                let mut config = self.engine.config().clone();
                config.autoplay.direction = match config.autoplay.direction {
                    AutoplayDirection::None => self.autoplay_direction,
                    _ => AutoplayDirection::None,
                };
                let enabled = config.autoplay.direction != AutoplayDirection::None;
                self.engine.set_config(config)?;
                self.set_status(if enabled { "Autoplay on" } else { "Autoplay off" });
            }
            Action::None => {}
        }
        Ok(())
    }

    /// Route a left-button pointer event to the carousel or the pull head
    pub fn handle_pointer(&mut self, phase: PointerPhase, column: u16, row: u16, timestamp_ms: f64) {
        let sample = PointerSample::new(column as f64, row as f64 * ROW_PX, timestamp_ms);
        match phase {
            PointerPhase::Down => {
                if self.grab.is_some() {
                    return;
                }
                let area = self.carousel_area;
                if !area.contains(Position::new(column, row)) && row >= area.y {
                    return;
                }
                // The top edge of the carousel (and the head above it) pulls to refresh
                if row <= area.y {
                    if self.pull.drag_start(sample) {
                        self.grab = Some(Grab::Pull);
                    }
                } else if self.engine.drag_start(sample) {
                    self.grab = Some(Grab::Carousel);
                }
            }
            PointerPhase::Move => match self.grab {
                Some(Grab::Carousel) => {
                    self.engine.drag_update(sample);
                }
                Some(Grab::Pull) => {
                    self.pull.drag_update(sample);
                }
                None => {}
            },
            PointerPhase::Up => match self.grab.take() {
                Some(Grab::Carousel) => {
                    self.engine.drag_end(sample);
                }
                Some(Grab::Pull) => {
                    self.pull.drag_end(sample);
                    if self.pull.state() == PullState::Refreshing {
                        self.set_status("Refreshing...");
                    }
                }
                None => {}
            },
        }
    }

    /// Abort whatever gesture is in progress (focus lost, resize)
    pub fn cancel_pointer(&mut self) {
        match self.grab.take() {
            Some(Grab::Carousel) => {
                self.engine.drag_cancel();
            }
            Some(Grab::Pull) => {
                self.pull.drag_cancel();
            }
            None => {}
        }
    }

    /// Advance both controllers by `dt_ms` of wall time
    pub fn tick(&mut self, dt_ms: f64) {
        self.engine.tick(dt_ms);
        self.pull.tick(dt_ms);

        if let Some(index) = self.reported.take() {
            debug!(index, "carousel index changed");
            self.set_status(format!("Slide {} of {}", index + 1, self.slides.len()));
        }
    }

    /// Returns true once when a pull was released past the threshold
    pub fn take_refresh_request(&mut self) -> bool {
        self.pull.take_refresh_request()
    }

    /// The background refresh finished
    pub fn finish_refresh(&mut self) {
        if self.pull.finish_refresh() {
            self.refresh_count += 1;
            info!("Refresh #{} complete", self.refresh_count);
            self.set_status(format!("Refreshed ({})", self.refresh_count));
        }
    }

    /// Tear down the engine; nothing fires afterwards
    pub fn shutdown(&mut self) {
        self.cancel_pointer();
        self.engine.dispose();
    }

    /// Whether anything is animating and needs a fast frame rate
    pub fn is_animating(&self) -> bool {
        self.engine.state() != glide_core::GestureState::Idle
            || !self.pull.is_at_rest()
            || self.pull.state() == PullState::Completing
    }
}
