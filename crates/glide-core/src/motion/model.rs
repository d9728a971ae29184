//! Position model: the engine's only mutable state.
//!
//! Readers get `&PositionModel` or a [`Snapshot`]; mutation is restricted to
//! the motion module, where only the state machine performs it.

use serde::{Deserialize, Serialize};

use super::boundary::Bounds;
use super::drag::{normalize_target, DragRelease};
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureState {
    #[default]
    Idle,
    Dragging,
    Settling,
}

/// Read-only view handed to renderers and traces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Rendered position (wrapped into `[0, count)` when looping)
    pub position: f64,
    pub target_index: usize,
    pub state: GestureState,
}

#[derive(Debug, Clone)]
pub struct PositionModel {
    config: EngineConfig,
    bounds: Bounds,
    /// Unwrapped continuous position
    raw_position: f64,
    /// Unwrapped integer target
    raw_target: i64,
    target_index: usize,
    state: GestureState,
    /// Viewport length along the axis, px
    viewport_extent: f64,
}

impl PositionModel {
    pub fn new(config: EngineConfig) -> Self {
        let bounds = track_bounds(&config);
        let DragRelease { raw_target, index } =
            normalize_target(config.default_index, config.item_count, config.loop_mode);
        let mut model = Self {
            config,
            bounds,
            raw_position: 0.0,
            raw_target,
            target_index: index,
            state: GestureState::Idle,
            viewport_extent: 0.0,
        };
        model.raw_position = model.settle_position(raw_target);
        model
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn item_count(&self) -> usize {
        self.config.item_count
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Bounds the drag tracker should respect (`None` when looping)
    pub fn drag_bounds(&self) -> Option<Bounds> {
        if self.config.loop_mode {
            None
        } else {
            Some(self.bounds)
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn raw_position(&self) -> f64 {
        self.raw_position
    }

    /// Position for rendering. Wrapped into `[0, count)` in loop mode.
    pub fn position(&self) -> f64 {
        let count = self.config.item_count;
        if self.config.loop_mode && count > 0 {
            self.raw_position.rem_euclid(count as f64)
        } else {
            self.raw_position
        }
    }

    pub fn raw_target(&self) -> i64 {
        self.raw_target
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn viewport_extent(&self) -> f64 {
        self.viewport_extent
    }

    /// Pixels per position unit; 0 until the layout is measured
    pub fn unit_extent(&self) -> f64 {
        if self.viewport_extent.is_finite() && self.viewport_extent > 0.0 {
            self.viewport_extent * self.config.slide_size_ratio
        } else {
            0.0
        }
    }

    /// Track offset in px for the current position
    pub fn track_translation_px(&self) -> f64 {
        self.viewport_extent.max(0.0) * self.config.track_offset_ratio
            - self.raw_position * self.unit_extent()
    }

    /// Where the track rests for an unwrapped integer target
    pub fn settle_position(&self, raw_target: i64) -> f64 {
        if self.config.loop_mode {
            raw_target as f64
        } else {
            self.bounds.clamp(raw_target as f64)
        }
    }

    /// Fractional slide index for a track position; inverse of `settle_position`.
    ///
    /// Identity unless partial slides pile up against a stuck boundary, where
    /// the last (or first) gap is shorter than one position unit. Past either
    /// end the overscroll carries over unscaled.
    pub fn index_coordinate(&self, position: f64) -> f64 {
        let count = self.config.item_count;
        if self.config.loop_mode || count < 2 {
            return position;
        }
        let last = (count - 1) as i64;
        let first_rest = self.settle_position(0);
        if position <= first_rest {
            return position - first_rest;
        }
        let last_rest = self.settle_position(last);
        if position >= last_rest {
            return last as f64 + (position - last_rest);
        }
        for i in 0..last {
            let lo = self.settle_position(i);
            let hi = self.settle_position(i + 1);
            if position <= hi && hi > lo {
                return i as f64 + (position - lo) / (hi - lo);
            }
        }
        last as f64
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.position(),
            target_index: self.target_index,
            state: self.state,
        }
    }

    pub(in crate::motion) fn set_config(&mut self, config: EngineConfig) {
        self.bounds = track_bounds(&config);
        self.config = config;
    }

    pub(in crate::motion) fn set_state(&mut self, state: GestureState) {
        self.state = state;
    }

    pub(in crate::motion) fn set_raw_position(&mut self, position: f64) {
        if position.is_finite() {
            self.raw_position = position;
        }
    }

    pub(in crate::motion) fn set_target(&mut self, release: DragRelease) {
        self.raw_target = release.raw_target;
        self.target_index = release.index;
    }

    pub(in crate::motion) fn set_viewport_extent(&mut self, extent: f64) {
        self.viewport_extent = if extent.is_finite() { extent } else { 0.0 };
    }

    /// Shift the unwrapped coordinates so the target lies in `[0, count)`.
    /// Returns the applied offset.
    pub(in crate::motion) fn rebase(&mut self) -> f64 {
        let count = self.config.item_count as i64;
        if !self.config.loop_mode || count == 0 {
            return 0.0;
        }
        let shift = -self.raw_target.div_euclid(count) * count;
        self.raw_target += shift;
        self.raw_position += shift as f64;
        shift as f64
    }
}

fn track_bounds(config: &EngineConfig) -> Bounds {
    Bounds::for_track(
        config.item_count,
        config.stuck_at_boundary,
        config.slide_size_ratio,
        config.track_offset_ratio,
    )
}
