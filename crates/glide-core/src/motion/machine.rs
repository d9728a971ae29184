//! Gesture state machine.
//!
//! `MotionEngine` is the single writer of the [`PositionModel`]. It routes
//! host input to the drag tracker, spring and autoplay scheduler and applies
//! what they compute:
//!
//! ```text
//! Idle     --drag_start-->            Dragging
//! Settling --drag_start-->            Dragging   (spring cancelled in place)
//! Dragging --drag_update-->           Dragging
//! Dragging --drag_end / drag_cancel-> Settling
//! Settling --tick, converged-->       Idle
//! Idle     --swipe_* / autoplay-->    Settling
//! Settling --swipe_*-->               Settling   (retarget)
//! ```
//!
//! Every call is synchronous and bounded. Degenerate input (no items,
//! unmeasured layout, calls after `dispose`) degrades to a no-op.

use std::fmt;

use tracing::{debug, warn};

use super::autoplay::AutoplayScheduler;
use super::boundary::Bounds;
use super::drag::{normalize_target, DragRelease, DragTracker, PointerSample, TrackGeometry};
use super::model::{GestureState, PositionModel, Snapshot};
use super::spring::SpringAnimator;
use crate::config::EngineConfig;
use crate::Result;

type IndexCallback = Box<dyn FnMut(usize)>;

pub struct MotionEngine {
    model: PositionModel,
    drag: Option<DragTracker>,
    spring: SpringAnimator,
    autoplay: AutoplayScheduler,
    on_index_change: Option<IndexCallback>,
    /// Last index reported (or the initial index, which counts as reported)
    last_reported: usize,
    disposed: bool,
}

impl fmt::Debug for MotionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionEngine")
            .field("model", &self.model)
            .field("dragging", &self.drag.is_some())
            .field("spring", &self.spring)
            .field("autoplay", &self.autoplay)
            .field("last_reported", &self.last_reported)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl MotionEngine {
    /// Build an engine resting at `config.default_index`.
    ///
    /// Fails fast on an invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let spring = SpringAnimator::new(config.spring);
        let autoplay = AutoplayScheduler::new(config.autoplay, config.item_count);
        let model = PositionModel::new(config);
        let last_reported = model.target_index();

        let mut engine = Self {
            model,
            drag: None,
            spring,
            autoplay,
            on_index_change: None,
            last_reported,
            disposed: false,
        };
        engine.autoplay.start();
        debug!(
            items = engine.model.item_count(),
            index = last_reported,
            "motion engine created"
        );
        Ok(engine)
    }

    /// Register the callback fired once per distinct settled target index
    pub fn on_index_change(&mut self, callback: impl FnMut(usize) + 'static) {
        if !self.disposed {
            self.on_index_change = Some(Box::new(callback));
        }
    }

    pub fn model(&self) -> &PositionModel {
        &self.model
    }

    pub fn config(&self) -> &EngineConfig {
        self.model.config()
    }

    pub fn position(&self) -> f64 {
        self.model.position()
    }

    pub fn raw_position(&self) -> f64 {
        self.model.raw_position()
    }

    pub fn target_index(&self) -> usize {
        self.model.target_index()
    }

    pub fn state(&self) -> GestureState {
        self.model.state()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.model.snapshot()
    }

    pub fn track_translation_px(&self) -> f64 {
        self.model.track_translation_px()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_autoplay_running(&self) -> bool {
        self.autoplay.is_running()
    }

    /// Nothing can move: disposed or empty
    fn is_inert(&self) -> bool {
        self.disposed || self.model.item_count() == 0
    }

    /// Viewport length along the drag axis, in px
    pub fn set_extent(&mut self, extent_px: f64) {
        if self.disposed {
            return;
        }
        self.model.set_viewport_extent(extent_px);
    }

    /// Replace the configuration. Validation failures leave the engine untouched.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        if self.disposed {
            return Ok(());
        }

        // Bring a looping track into [0, count) before the rules change
        let shift = self.model.rebase();
        if shift != 0.0 {
            self.spring.translate(shift);
        }

        self.spring.set_params(config.spring);
        self.autoplay.configure(config.autoplay, config.item_count);
        self.model.set_config(config);
        self.drag = None;

        if self.model.item_count() == 0 {
            self.spring.cancel();
            self.model.set_target(DragRelease {
                raw_target: 0,
                index: 0,
            });
            self.model.set_raw_position(0.0);
            self.model.set_state(GestureState::Idle);
            self.last_reported = 0;
            self.autoplay.stop();
            return Ok(());
        }

        let release = normalize_target(
            self.model.raw_target(),
            self.model.item_count(),
            self.model.config().loop_mode,
        );
        let velocity = if self.spring.is_active() {
            self.spring.velocity()
        } else {
            0.0
        };
        self.report(release.index);
        self.begin_settle(release, velocity);
        self.autoplay.restart();
        debug!("configuration replaced");
        Ok(())
    }

    /// Begin a drag gesture. Rejected while another drag is in progress.
    pub fn drag_start(&mut self, sample: PointerSample) -> bool {
        if self.is_inert() || !self.model.config().allow_drag {
            return false;
        }
        if self.model.state() == GestureState::Dragging {
            warn!("drag_start rejected: a drag is already in progress");
            return false;
        }

        // Interrupting a settle freezes the track where the spring left it
        self.spring.cancel();
        self.autoplay.stop();

        let config = self.model.config();
        self.drag = Some(DragTracker::start(
            self.model.raw_position(),
            sample,
            config.axis,
            config.drag,
        ));
        self.model.set_state(GestureState::Dragging);
        debug!(position = self.model.raw_position(), "drag started");
        true
    }

    /// Move the active drag. Ignored while the layout is unmeasured.
    pub fn drag_update(&mut self, sample: PointerSample) -> bool {
        if self.is_inert() {
            return false;
        }
        let geometry = self.geometry();
        let Some(tracker) = self.drag.as_mut() else {
            return false;
        };
        match tracker.update(sample, geometry) {
            Some(position) => {
                self.model.set_raw_position(position);
                true
            }
            None => false,
        }
    }

    /// Release the drag: predict the target from offset and velocity and settle.
    pub fn drag_end(&mut self, sample: PointerSample) -> bool {
        if self.is_inert() {
            return false;
        }
        let geometry = self.geometry();
        let Some(mut tracker) = self.drag.take() else {
            return false;
        };
        if let Some(position) = tracker.update(sample, geometry) {
            self.model.set_raw_position(position);
        }

        let velocity = tracker.velocity();
        let index_position = self.model.index_coordinate(tracker.position());
        let config = self.model.config();
        let release = tracker.end(index_position, velocity, config.item_count, config.loop_mode);
        debug!(
            position = tracker.position(),
            velocity,
            last_delta = tracker.last_sample().map(|s| s.raw_delta).unwrap_or(0.0),
            target = release.index,
            "drag ended"
        );

        self.report(release.index);
        self.begin_settle(release, velocity);
        self.autoplay.restart();
        true
    }

    /// Abort the drag and return to the index targeted when it began
    pub fn drag_cancel(&mut self) -> bool {
        if self.is_inert() {
            return false;
        }
        if self.drag.take().is_none() {
            return false;
        }
        let release = DragRelease {
            raw_target: self.model.raw_target(),
            index: self.model.target_index(),
        };
        debug!(target = release.index, "drag cancelled");
        self.begin_settle(release, 0.0);
        self.autoplay.restart();
        true
    }

    /// Advance time by `dt_ms`. Drives the spring while settling and the
    /// autoplay interval while idle.
    pub fn tick(&mut self, dt_ms: f64) {
        if self.is_inert() {
            return;
        }
        match self.model.state() {
            GestureState::Settling => {
                let previous = self.model.raw_position();
                let mut step = self.spring.tick(dt_ms);
                if let Some(bounds) = self.model.drag_bounds() {
                    // Outside the bounds the spring may only head back in
                    let limits = Bounds::new(bounds.min.min(previous), bounds.max.max(previous));
                    if !limits.contains(step.position) {
                        step.position = self.spring.hold_at(limits.clamp(step.position));
                    }
                }
                self.model.set_raw_position(step.position);
                if step.converged {
                    self.finish_settle();
                }
            }
            GestureState::Idle => {
                if let Some(step) = self.autoplay.advance(dt_ms) {
                    self.autoplay_step(step);
                }
            }
            GestureState::Dragging => {}
        }
    }

    /// External autoplay timer fired. Only honoured while idle.
    pub fn autoplay_tick(&mut self) -> bool {
        if self.is_inert() || self.model.state() != GestureState::Idle {
            return false;
        }
        match self.autoplay.trigger() {
            Some(step) => {
                self.autoplay_step(step);
                true
            }
            None => false,
        }
    }

    /// Settle on `index`, clamped (bounded) or wrapped (loop).
    ///
    /// In loop mode the track takes the shortest way round.
    pub fn swipe_to(&mut self, index: i64) -> bool {
        if !self.accepts_navigation("swipe_to") {
            return false;
        }
        let count = self.model.item_count() as i64;
        let raw = if self.model.config().loop_mode {
            let wrapped = index.rem_euclid(count);
            let laps = ((self.model.raw_position() - wrapped as f64) / count as f64).round() as i64;
            wrapped + laps * count
        } else {
            index
        };
        self.navigate(raw);
        true
    }

    pub fn swipe_next(&mut self) -> bool {
        self.swipe_by(1, "swipe_next")
    }

    pub fn swipe_prev(&mut self) -> bool {
        self.swipe_by(-1, "swipe_prev")
    }

    /// Tear down: stop the spring and autoplay and drop the callback.
    /// Idempotent; every later call is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.spring.cancel();
        self.autoplay.stop();
        self.drag = None;
        self.on_index_change = None;
        self.model.set_state(GestureState::Idle);
        debug!("motion engine disposed");
    }

    fn swipe_by(&mut self, step: i64, op: &str) -> bool {
        if !self.accepts_navigation(op) {
            return false;
        }
        self.navigate(self.model.raw_target() + step);
        true
    }

    fn accepts_navigation(&self, op: &str) -> bool {
        if self.disposed {
            warn!("{} ignored: engine disposed", op);
            return false;
        }
        if self.model.item_count() == 0 {
            return false;
        }
        if self.model.state() == GestureState::Dragging {
            warn!("{} rejected while dragging", op);
            return false;
        }
        true
    }

    fn autoplay_step(&mut self, step: i64) {
        debug!(step, from = self.model.target_index(), "autoplay advance");
        self.navigate(self.model.raw_target() + step);
    }

    /// Explicit navigation: report synchronously, then animate.
    fn navigate(&mut self, raw: i64) {
        let config = self.model.config();
        let release = normalize_target(raw, config.item_count, config.loop_mode);
        let velocity = if self.model.state() == GestureState::Settling {
            self.spring.velocity()
        } else {
            0.0
        };
        self.report(release.index);
        self.begin_settle(release, velocity);
        self.autoplay.restart();
    }

    fn begin_settle(&mut self, release: DragRelease, velocity: f64) {
        self.model.set_target(release);
        let target = self.model.settle_position(release.raw_target);
        self.spring.start(self.model.raw_position(), target, velocity);
        self.model.set_state(GestureState::Settling);
    }

    fn finish_settle(&mut self) {
        let shift = self.model.rebase();
        if shift != 0.0 {
            self.spring.translate(shift);
        }
        self.model.set_state(GestureState::Idle);
        self.autoplay.restart();
        debug!(index = self.model.target_index(), "settled");
    }

    fn report(&mut self, index: usize) {
        if index == self.last_reported {
            return;
        }
        self.last_reported = index;
        debug!(index, "index changed");
        if let Some(callback) = self.on_index_change.as_mut() {
            callback(index);
        }
    }

    fn geometry(&self) -> TrackGeometry {
        TrackGeometry {
            unit_extent: self.model.unit_extent(),
            bounds: self.model.drag_bounds(),
            rubberband: self.model.config().rubberband,
        }
    }
}
