//! Pull-to-refresh controller.
//!
//! Drives the height of a refresh indicator ("head") in pixels from a
//! vertical drag, using the same resistance curve and spring as the track.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::boundary::{self, Bounds};
use super::drag::PointerSample;
use super::spring::SpringAnimator;
use crate::config::PullConfig;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullState {
    #[default]
    Idle,
    /// Pulled, but releasing now would spring back
    Pulling,
    /// Pulled past the threshold; releasing triggers a refresh
    CanRelease,
    Refreshing,
    /// Refresh finished, holding before retracting
    Completing,
}

impl PullState {
    pub fn label(&self) -> &'static str {
        match self {
            PullState::Idle => "idle",
            PullState::Pulling => "pull to refresh",
            PullState::CanRelease => "release to refresh",
            PullState::Refreshing => "refreshing",
            PullState::Completing => "done",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PullController {
    config: PullConfig,
    state: PullState,
    head_px: f64,
    /// Pointer y and unresisted pull at drag start
    origin: Option<(f64, f64)>,
    spring: SpringAnimator,
    refresh_requested: bool,
    completing_ms: f64,
}

impl PullController {
    pub fn new(config: PullConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            spring: SpringAnimator::new(config.spring),
            config,
            state: PullState::Idle,
            head_px: 0.0,
            origin: None,
            refresh_requested: false,
            completing_ms: 0.0,
        })
    }

    pub fn config(&self) -> &PullConfig {
        &self.config
    }

    pub fn state(&self) -> PullState {
        self.state
    }

    /// Current indicator height in px
    pub fn head_px(&self) -> f64 {
        self.head_px
    }

    /// No drag in progress and the head is not moving
    pub fn is_at_rest(&self) -> bool {
        self.origin.is_none() && !self.spring.is_active()
    }

    pub fn drag_start(&mut self, sample: PointerSample) -> bool {
        if self.origin.is_some() {
            warn!("pull drag_start rejected: a drag is already in progress");
            return false;
        }
        if self.state != PullState::Idle {
            return false;
        }
        // Grab a retracting head where it is
        self.spring.cancel();
        let pulled = unresist(self.head_px, self.config.rubberband_factor);
        self.origin = Some((sample.y, pulled));
        self.state = PullState::Pulling;
        debug!(head = self.head_px, "pull started");
        true
    }

    pub fn drag_update(&mut self, sample: PointerSample) -> bool {
        let Some((origin_y, pulled)) = self.origin else {
            return false;
        };
        let raw = (pulled + sample.y - origin_y).max(0.0);
        self.head_px = boundary::clamp(
            raw,
            Bounds::new(0.0, 0.0),
            true,
            self.config.rubberband_factor,
        );
        self.state = if self.head_px >= self.config.threshold_px {
            PullState::CanRelease
        } else {
            PullState::Pulling
        };
        true
    }

    pub fn drag_end(&mut self, sample: PointerSample) -> bool {
        if !self.drag_update(sample) {
            return false;
        }
        self.origin = None;
        if self.state == PullState::CanRelease {
            self.state = PullState::Refreshing;
            self.refresh_requested = true;
            self.spring.start(self.head_px, self.config.head_height_px, 0.0);
            debug!("refresh triggered");
        } else {
            self.retract();
        }
        true
    }

    pub fn drag_cancel(&mut self) -> bool {
        if self.origin.take().is_none() {
            return false;
        }
        self.retract();
        true
    }

    /// Returns true exactly once per triggered refresh
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// The host's refresh work is done
    pub fn finish_refresh(&mut self) -> bool {
        if self.state != PullState::Refreshing {
            return false;
        }
        self.state = PullState::Completing;
        self.completing_ms = 0.0;
        debug!("refresh finished");
        true
    }

    pub fn tick(&mut self, dt_ms: f64) {
        if self.spring.is_active() {
            self.head_px = self.spring.tick(dt_ms).position;
        }
        if self.state == PullState::Completing && dt_ms.is_finite() && dt_ms > 0.0 {
            self.completing_ms += dt_ms;
            if self.completing_ms >= self.config.complete_delay_ms as f64 {
                self.retract();
            }
        }
    }

    fn retract(&mut self) {
        self.state = PullState::Idle;
        self.completing_ms = 0.0;
        self.spring.start(self.head_px, 0.0, 0.0);
    }
}

/// Inverse of the pull resistance curve `h = r / (1 + r·k)`
fn unresist(head: f64, k: f64) -> f64 {
    let limit = 1.0 / k;
    let head = head.clamp(0.0, limit * 0.999);
    head / (1.0 - head * k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(y: f64, t: f64) -> PointerSample {
        PointerSample::new(0.0, y, t)
    }

    fn run(pull: &mut PullController, ticks: usize) {
        for _ in 0..ticks {
            pull.tick(16.0);
        }
    }

    #[test]
    fn test_short_pull_springs_back() {
        let mut pull = PullController::new(PullConfig::default()).unwrap();
        assert!(pull.drag_start(sample(0.0, 0.0)));
        pull.drag_update(sample(50.0, 16.0));
        assert_eq!(pull.state(), PullState::Pulling);
        assert!(pull.head_px() > 0.0 && pull.head_px() < 50.0);

        pull.drag_end(sample(50.0, 32.0));
        assert_eq!(pull.state(), PullState::Idle);
        assert!(!pull.take_refresh_request());
        run(&mut pull, 120);
        assert_eq!(pull.head_px(), 0.0);
        assert!(pull.is_at_rest());
    }

    #[test]
    fn test_full_refresh_cycle() {
        let mut pull = PullController::new(PullConfig::default()).unwrap();
        pull.drag_start(sample(0.0, 0.0));
        pull.drag_update(sample(300.0, 16.0));
        assert_eq!(pull.state(), PullState::CanRelease);
        pull.drag_end(sample(300.0, 32.0));
        assert_eq!(pull.state(), PullState::Refreshing);
        assert!(pull.take_refresh_request());
        assert!(!pull.take_refresh_request());

        run(&mut pull, 120);
        assert_eq!(pull.head_px(), 40.0);
        assert!(!pull.drag_start(sample(0.0, 100.0)));

        assert!(pull.finish_refresh());
        assert_eq!(pull.state(), PullState::Completing);
        // 500ms hold
        run(&mut pull, 30);
        assert_eq!(pull.state(), PullState::Completing);
        assert_eq!(pull.head_px(), 40.0);
        run(&mut pull, 2);
        assert_eq!(pull.state(), PullState::Idle);
        run(&mut pull, 120);
        assert_eq!(pull.head_px(), 0.0);
    }

    #[test]
    fn test_resistance_caps_head() {
        let mut pull = PullController::new(PullConfig::default()).unwrap();
        pull.drag_start(sample(0.0, 0.0));
        pull.drag_update(sample(10_000.0, 16.0));
        assert!(pull.head_px() < 100.0, "head {}", pull.head_px());
        pull.drag_update(sample(-50.0, 32.0));
        assert_eq!(pull.head_px(), 0.0);
    }

    #[test]
    fn test_cancel_retracts() {
        let mut pull = PullController::new(PullConfig::default()).unwrap();
        pull.drag_start(sample(0.0, 0.0));
        pull.drag_update(sample(300.0, 16.0));
        assert!(pull.drag_cancel());
        assert!(!pull.drag_cancel());
        assert_eq!(pull.state(), PullState::Idle);
        assert!(!pull.take_refresh_request());
        run(&mut pull, 120);
        assert_eq!(pull.head_px(), 0.0);
    }

    #[test]
    fn test_regrab_while_retracting_keeps_head() {
        let mut pull = PullController::new(PullConfig::default()).unwrap();
        pull.drag_start(sample(0.0, 0.0));
        pull.drag_update(sample(100.0, 16.0));
        pull.drag_end(sample(100.0, 32.0));
        pull.tick(16.0);
        let head = pull.head_px();
        assert!(pull.drag_start(sample(200.0, 64.0)));
        pull.drag_update(sample(200.0, 80.0));
        assert!((pull.head_px() - head).abs() < 1e-9);
    }

    #[test]
    fn test_finish_refresh_only_while_refreshing() {
        let mut pull = PullController::new(PullConfig::default()).unwrap();
        assert!(!pull.finish_refresh());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PullConfig {
            threshold_px: 0.0,
            ..PullConfig::default()
        };
        assert!(PullController::new(config).is_err());
    }
}
