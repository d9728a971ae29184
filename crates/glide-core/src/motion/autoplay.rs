//! Autoplay scheduling.
//!
//! The scheduler owns no timer. The engine feeds it idle time through
//! `advance` (or the host fires `trigger` from its own timer) and it answers
//! with the index step to take.

use crate::config::{AutoplayConfig, AutoplayDirection};

#[derive(Debug, Clone)]
pub struct AutoplayScheduler {
    config: AutoplayConfig,
    item_count: usize,
    running: bool,
    elapsed_ms: f64,
}

impl AutoplayScheduler {
    pub fn new(config: AutoplayConfig, item_count: usize) -> Self {
        Self {
            config,
            item_count,
            running: false,
            elapsed_ms: 0.0,
        }
    }

    /// Replace configuration. The caller decides whether to restart.
    pub fn configure(&mut self, config: AutoplayConfig, item_count: usize) {
        self.config = config;
        self.item_count = item_count;
        if !self.is_enabled() {
            self.stop();
        }
    }

    /// Whether the configuration allows autoplay at all
    pub fn is_enabled(&self) -> bool {
        self.config.direction != AutoplayDirection::None
            && self.item_count > 1
            && self.config.interval_ms > 0
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Begin counting toward the next advance, if enabled
    pub fn start(&mut self) {
        self.running = self.is_enabled();
    }

    /// Stop counting; no advance will be requested until restarted
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_ms = 0.0;
    }

    /// Reset the interval and start again per configuration
    pub fn restart(&mut self) {
        self.elapsed_ms = 0.0;
        self.start();
    }

    /// Accumulate idle time. Returns the index step once a full interval passed.
    pub fn advance(&mut self, dt_ms: f64) -> Option<i64> {
        if !self.running || !(dt_ms.is_finite() && dt_ms > 0.0) {
            return None;
        }
        self.elapsed_ms += dt_ms;
        let interval = self.config.interval_ms as f64;
        if self.elapsed_ms >= interval {
            // One advance per call even after a long stall
            self.elapsed_ms %= interval;
            return Some(self.config.direction.step());
        }
        None
    }

    /// External timer fired. Returns the step if the scheduler is running.
    pub fn trigger(&mut self) -> Option<i64> {
        if !self.running {
            return None;
        }
        self.elapsed_ms = 0.0;
        Some(self.config.direction.step())
    }
}
