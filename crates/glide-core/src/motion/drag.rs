//! Drag tracking: pointer samples in, transient positions and a release target out.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::boundary::{self, Bounds};
use crate::config::{Axis, DragParams};

/// Raw pointer reading forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub timestamp_ms: f64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// Sample on the horizontal axis only
    pub fn at(x: f64, timestamp_ms: f64) -> Self {
        Self::new(x, 0.0, timestamp_ms)
    }

    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// One accepted drag update, in position units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub timestamp_ms: f64,
    /// Position change since the previous sample
    pub raw_delta: f64,
    /// Velocity estimate at this sample, positions per second
    pub velocity_estimate: f64,
}

/// Where a released drag should settle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragRelease {
    /// Unwrapped integer target (may leave `[0, count)` when looping)
    pub raw_target: i64,
    /// Normalized index in `[0, count)`
    pub index: usize,
}

/// Geometry the tracker needs for each update
#[derive(Debug, Clone, Copy)]
pub struct TrackGeometry {
    /// Pixels per position unit; non-positive means unmeasured
    pub unit_extent: f64,
    /// `None` when the track loops
    pub bounds: Option<Bounds>,
    pub rubberband: bool,
}

#[derive(Debug, Clone)]
pub struct DragTracker {
    params: DragParams,
    axis: Axis,
    origin_px: f64,
    start_position: f64,
    position: f64,
    history: VecDeque<DragSample>,
}

impl DragTracker {
    /// Snapshot the drag origin and the position it started from
    pub fn start(position: f64, sample: PointerSample, axis: Axis, params: DragParams) -> Self {
        let origin_px = sample.along(axis);
        let mut history = VecDeque::new();
        history.push_back(DragSample {
            timestamp_ms: sample.timestamp_ms,
            raw_delta: 0.0,
            velocity_estimate: 0.0,
        });
        Self {
            params,
            axis,
            origin_px,
            start_position: position,
            position,
            history,
        }
    }

    pub fn start_position(&self) -> f64 {
        self.start_position
    }

    /// Latest transient position
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Feed a pointer sample and return the position to render immediately.
    ///
    /// Returns `None` while the layout is unmeasured or the sample is older
    /// than the previous one.
    pub fn update(&mut self, sample: PointerSample, geometry: TrackGeometry) -> Option<f64> {
        let extent = geometry.unit_extent;
        if !(extent.is_finite() && extent > 0.0) {
            return None;
        }
        if let Some(last) = self.history.back() {
            if sample.timestamp_ms < last.timestamp_ms {
                trace!(
                    "ignoring drag sample at {}ms earlier than last {}ms",
                    sample.timestamp_ms,
                    last.timestamp_ms
                );
                return None;
            }
        }

        let current_px = sample.along(self.axis);
        let tentative = self.start_position + (self.origin_px - current_px) / extent;
        let previous = self.position;

        // Velocity follows the bounded track, so a drag pinned at a hard
        // stop carries no momentum into the settle
        self.position = match geometry.bounds {
            Some(bounds) => boundary::clamp(
                tentative,
                bounds,
                geometry.rubberband,
                self.params.rubberband_factor,
            ),
            None => tentative,
        };

        self.history.push_back(DragSample {
            timestamp_ms: sample.timestamp_ms,
            raw_delta: self.position - previous,
            velocity_estimate: 0.0,
        });
        self.trim_history();
        let velocity = self.velocity();
        if let Some(last) = self.history.back_mut() {
            last.velocity_estimate = velocity;
        }

        trace!(position = self.position, velocity, "drag update");
        Some(self.position)
    }

    /// Most recent accepted sample
    pub fn last_sample(&self) -> Option<&DragSample> {
        self.history.back()
    }

    /// Velocity over the recent sample window, positions per second.
    pub fn velocity(&self) -> f64 {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return 0.0;
        };

        let total_secs = (last.timestamp_ms - first.timestamp_ms) / 1000.0;
        if total_secs <= 0.0 {
            return 0.0;
        }

        // The first sample's delta happened before the window opened
        let travelled: f64 = self.history.iter().skip(1).map(|s| s.raw_delta).sum();
        travelled / total_secs
    }

    /// Predict the settle target from a release point in index space and the
    /// release velocity.
    ///
    /// `index_position` is the track position mapped back onto slide indices
    /// (see `PositionModel::index_coordinate`). The prediction never skips
    /// past the neighbouring slide. Slow releases round on the configured
    /// fractional threshold instead of projecting.
    pub fn end(
        &self,
        index_position: f64,
        velocity: f64,
        item_count: usize,
        loop_mode: bool,
    ) -> DragRelease {
        let position = index_position;
        let base = position.floor();

        let raw = if !velocity.is_finite() || velocity.abs() < self.params.min_fling_velocity {
            let fraction = position - base;
            if fraction >= self.params.rounding_threshold {
                base + 1.0
            } else {
                base
            }
        } else {
            let projected = position + velocity * self.params.velocity_projection_secs;
            projected.clamp(base, base + 1.0).round()
        };

        normalize_target(raw as i64, item_count, loop_mode)
    }

    fn trim_history(&mut self) {
        let Some(newest) = self.history.back().map(|s| s.timestamp_ms) else {
            return;
        };
        let window = self.params.velocity_window_ms as f64;

        while let Some(first) = self.history.front() {
            if newest <= first.timestamp_ms + window {
                break;
            }
            let _ = self.history.pop_front();
        }
    }
}

/// Wrap (loop) or clamp (bounded) an integer index into `[0, count)`.
pub fn normalize_target(raw: i64, item_count: usize, loop_mode: bool) -> DragRelease {
    if item_count == 0 {
        return DragRelease {
            raw_target: 0,
            index: 0,
        };
    }
    let count = item_count as i64;
    if loop_mode {
        DragRelease {
            raw_target: raw,
            index: raw.rem_euclid(count) as usize,
        }
    } else {
        let clamped = raw.clamp(0, count - 1);
        DragRelease {
            raw_target: clamped,
            index: clamped as usize,
        }
    }
}
