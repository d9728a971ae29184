//! Boundary policy: hard clamp or rubberband resistance past the track ends.
//!
//! Pure functions only. Nothing here knows about gesture state.

/// Closed interval of positions the track may rest in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Bounds of a non-looping track.
    ///
    /// With `stuck_at_boundary` the first and last slides sit flush with the
    /// viewport edges instead of at the track offset.
    pub fn for_track(
        item_count: usize,
        stuck_at_boundary: bool,
        slide_size_ratio: f64,
        track_offset_ratio: f64,
    ) -> Self {
        let mut min = 0.0;
        let mut max = item_count.saturating_sub(1) as f64;
        if stuck_at_boundary {
            min += track_offset_ratio / slide_size_ratio;
            // Never pushes the last slide past the end of the track
            max -= ((1.0 - slide_size_ratio - track_offset_ratio) / slide_size_ratio).max(0.0);
        }
        Self::new(min, max)
    }

    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.min && position <= self.max
    }

    /// Hard clamp into the interval
    #[inline]
    pub fn clamp(&self, position: f64) -> f64 {
        position.clamp(self.min, self.max)
    }
}

/// Resistance multiplier for a given overscroll distance.
///
/// `1 / (1 + overscroll * k)`: 1.0 at the boundary, strictly decreasing after.
#[inline]
pub fn resistance(overscroll: f64, k: f64) -> f64 {
    1.0 / (1.0 + overscroll.abs() * k)
}

/// Map a raw position into `[min, max]`, optionally letting it stretch past
/// the nearest bound with rubberband resistance.
pub fn clamp(raw: f64, bounds: Bounds, rubberband: bool, k: f64) -> f64 {
    let bound = if raw < bounds.min {
        bounds.min
    } else if raw > bounds.max {
        bounds.max
    } else {
        return raw;
    };

    if !rubberband {
        return bound;
    }

    let overscroll = raw - bound;
    bound + overscroll * resistance(overscroll, k)
}
