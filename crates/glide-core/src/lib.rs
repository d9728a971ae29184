pub mod config;
pub mod error;
pub mod motion;
pub mod replay;

pub use config::{AppConfig, AutoplayDirection, Axis, EngineConfig, PullConfig};
pub use error::{Error, Result};
pub use motion::{GestureState, MotionEngine, PointerSample, PullController, PullState, Snapshot};
