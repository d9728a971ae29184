//! Damped spring animator.
//!
//! Each tick advances the closed-form solution of `m·x'' + c·x' + k·x = 0`
//! from the current state, so results depend only on the `dt` sequence and
//! stay stable for any frame length.

use tracing::debug;

use crate::config::SpringParams;

/// Result of one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringStep {
    pub position: f64,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct SpringAnimator {
    params: SpringParams,
    position: f64,
    velocity: f64,
    target: f64,
    /// Sign of travel toward the target, used for the overshoot clamp
    direction: f64,
    active: bool,
}

impl SpringAnimator {
    pub fn new(params: SpringParams) -> Self {
        Self {
            params,
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            direction: 0.0,
            active: false,
        }
    }

    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    /// Begin animating from `current` toward `target` with an initial velocity
    /// in positions per second.
    pub fn start(&mut self, current: f64, target: f64, initial_velocity: f64) {
        let initial_velocity = if initial_velocity.is_finite() {
            initial_velocity
        } else {
            0.0
        };
        let gap = target - current;
        self.direction = if gap != 0.0 {
            gap.signum()
        } else if initial_velocity != 0.0 {
            initial_velocity.signum()
        } else {
            0.0
        };
        self.position = current;
        self.velocity = initial_velocity;
        self.target = target;
        self.active = true;
        debug!(from = current, to = target, velocity = initial_velocity, "spring start");
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Shift position and target by the same amount (loop rebasing)
    pub fn translate(&mut self, offset: f64) {
        self.position += offset;
        self.target += offset;
    }

    /// Advance by `dt_ms` milliseconds.
    ///
    /// Once converged the position snaps exactly onto the target and the
    /// animator goes inactive. Non-positive `dt` only re-checks convergence.
    pub fn tick(&mut self, dt_ms: f64) -> SpringStep {
        if !self.active {
            return SpringStep {
                position: self.position,
                converged: true,
            };
        }

        if dt_ms.is_finite() && dt_ms > 0.0 {
            let (displacement, velocity) =
                advance(&self.params, self.position - self.target, self.velocity, dt_ms / 1000.0);
            self.position = self.target + displacement;
            self.velocity = velocity;
            self.clamp_overshoot();
        }

        let converged = self.is_at_rest();
        if converged {
            self.position = self.target;
            self.velocity = 0.0;
            self.active = false;
            debug!(target = self.target, "spring converged");
        }

        SpringStep {
            position: self.position,
            converged,
        }
    }

    /// Pin the spring at `position` with zero velocity. It keeps pulling
    /// toward the target from there on the next tick.
    pub fn hold_at(&mut self, position: f64) -> f64 {
        self.position = position;
        self.velocity = 0.0;
        position
    }

    /// Halt in place. The position stays wherever the spring was.
    pub fn cancel(&mut self) {
        if self.active {
            debug!(position = self.position, "spring cancelled");
        }
        self.active = false;
        self.velocity = 0.0;
    }

    fn is_at_rest(&self) -> bool {
        (self.position - self.target).abs() < self.params.rest_displacement
            && self.velocity.abs() < self.params.rest_velocity
    }

    fn clamp_overshoot(&mut self) {
        if self.direction == 0.0 {
            return;
        }
        let past = (self.position - self.target) * self.direction;
        if past > self.params.overshoot_limit {
            self.position = self.target + self.params.overshoot_limit * self.direction;
            self.velocity = 0.0;
        }
    }
}

/// Closed-form step of a damped oscillator.
///
/// `x0` is displacement from rest, `v0` its velocity; returns both after `t`
/// seconds. Handles under-, critically and over-damped regimes.
fn advance(params: &SpringParams, x0: f64, v0: f64, t: f64) -> (f64, f64) {
    let omega = (params.stiffness / params.mass).sqrt();
    let zeta = params.damping_ratio();

    if (zeta - 1.0).abs() < 1e-6 {
        let b = v0 + omega * x0;
        let decay = (-omega * t).exp();
        let x = decay * (x0 + b * t);
        let v = decay * (b - omega * (x0 + b * t));
        (x, v)
    } else if zeta < 1.0 {
        let alpha = zeta * omega;
        let omega_d = omega * (1.0 - zeta * zeta).sqrt();
        let a = x0;
        let b = (v0 + alpha * x0) / omega_d;
        let decay = (-alpha * t).exp();
        let (sin, cos) = (omega_d * t).sin_cos();
        let x = decay * (a * cos + b * sin);
        let v = decay * ((omega_d * b - alpha * a) * cos - (alpha * b + omega_d * a) * sin);
        (x, v)
    } else {
        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -omega * (zeta - root);
        let r2 = -omega * (zeta + root);
        let c2 = (v0 - r1 * x0) / (r2 - r1);
        let c1 = x0 - c2;
        let e1 = (r1 * t).exp();
        let e2 = (r2 * t).exp();
        (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
    }
}
