//! Motion engine for carousels, paginated viewers and pull-to-refresh.
//!
//! The host feeds pointer samples, frame ticks and imperative commands into
//! a [`MotionEngine`] and reads back a continuous position to render from.
//! Nothing here owns a clock or a thread: time only moves through `tick(dt)`.
//!
//! # Layers
//!
//! ## Pure
//! - `boundary` - Bounds and rubberband resistance
//! - `spring` - Damped spring integrated in closed form
//!
//! ## Stateful components
//! - `drag` - Pointer tracking, velocity estimation, release prediction
//! - `autoplay` - Idle interval scheduling
//! - `model` - Position, target and gesture state (single writer)
//!
//! ## Controllers
//! - `machine` - Gesture state machine wiring the components together
//! - `pull` - Pull-to-refresh head built on the same primitives
//!
//! # Usage
//!
//! ```ignore
//! use glide_core::config::EngineConfig;
//! use glide_core::motion::{MotionEngine, PointerSample};
//!
//! let mut engine = MotionEngine::new(EngineConfig::default())?;
//! engine.set_extent(320.0);
//! engine.on_index_change(|index| println!("now at {}", index));
//!
//! engine.drag_start(PointerSample::at(300.0, 0.0));
//! engine.drag_update(PointerSample::at(120.0, 16.0));
//! engine.drag_end(PointerSample::at(100.0, 32.0));
//!
//! // Each frame
//! engine.tick(16.0);
//! let offset = engine.track_translation_px();
//! ```

pub mod boundary;
pub mod spring;

pub mod autoplay;
pub mod drag;
pub mod model;

pub mod machine;
pub mod pull;

pub use autoplay::AutoplayScheduler;
pub use boundary::Bounds;
pub use drag::{DragRelease, DragSample, DragTracker, PointerSample, TrackGeometry};
pub use machine::MotionEngine;
pub use model::{GestureState, PositionModel, Snapshot};
pub use pull::{PullController, PullState};
pub use spring::{SpringAnimator, SpringStep};
