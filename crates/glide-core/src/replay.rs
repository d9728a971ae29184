//! Scripted event replay.
//!
//! A [`Script`] is an engine configuration plus an ordered list of host
//! inputs. Replaying it is deterministic: the same script always yields the
//! same [`Trace`], which makes scripts usable both as fixtures and as a way
//! to inspect tuning changes from the command line.
//!
//! ```toml
//! [config]
//! item_count = 3
//!
//! [[events]]
//! type = "extent"
//! px = 320.0
//!
//! [[events]]
//! type = "drag_start"
//! x = 300.0
//! timestamp_ms = 0.0
//! ```

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Error;
use crate::motion::{GestureState, MotionEngine, PointerSample, Snapshot};

/// One host input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionEvent {
    Extent { px: f64 },
    DragStart(PointerSample),
    DragUpdate(PointerSample),
    DragEnd(PointerSample),
    DragCancel,
    Tick { dt_ms: f64 },
    RunTicks { count: u32, dt_ms: f64 },
    /// Tick until the engine is idle, giving up after `max_ticks`
    RunUntilIdle {
        dt_ms: f64,
        #[serde(default = "default_max_ticks")]
        max_ticks: u32,
    },
    Autoplay,
    SwipeTo { index: i64 },
    SwipeNext,
    SwipePrev,
    Dispose,
}

fn default_max_ticks() -> u32 {
    600
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Script {
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| Error::Replay(e.to_string()))
    }

    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load by extension: `.json` is JSON, anything else TOML
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }
}

/// Engine state after one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: MotionEvent,
    /// Whether the engine took the input (ticks are always taken)
    pub accepted: bool,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub frames: Vec<Frame>,
    /// Every index reported through `on_index_change`, in order
    pub index_changes: Vec<usize>,
}

impl Trace {
    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.frames.last().map(|frame| &frame.snapshot)
    }
}

/// Run a script against a fresh engine
pub fn replay(script: &Script) -> crate::Result<Trace> {
    let mut engine = MotionEngine::new(script.config.clone())?;

    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    engine.on_index_change(move |index| sink.borrow_mut().push(index));

    debug!("Replaying {} events", script.events.len());

    let mut frames = Vec::with_capacity(script.events.len());
    for event in &script.events {
        let accepted = apply(&mut engine, event);
        frames.push(Frame {
            event: event.clone(),
            accepted,
            snapshot: engine.snapshot(),
        });
    }
    engine.dispose();

    let index_changes = changes.borrow().clone();
    Ok(Trace {
        frames,
        index_changes,
    })
}

fn apply(engine: &mut MotionEngine, event: &MotionEvent) -> bool {
    match event {
        MotionEvent::Extent { px } => {
            engine.set_extent(*px);
            true
        }
        MotionEvent::DragStart(sample) => engine.drag_start(*sample),
        MotionEvent::DragUpdate(sample) => engine.drag_update(*sample),
        MotionEvent::DragEnd(sample) => engine.drag_end(*sample),
        MotionEvent::DragCancel => engine.drag_cancel(),
        MotionEvent::Tick { dt_ms } => {
            engine.tick(*dt_ms);
            true
        }
        MotionEvent::RunTicks { count, dt_ms } => {
            for _ in 0..*count {
                engine.tick(*dt_ms);
            }
            true
        }
        MotionEvent::RunUntilIdle { dt_ms, max_ticks } => {
            let mut ticks = 0;
            while engine.state() != GestureState::Idle && ticks < *max_ticks {
                engine.tick(*dt_ms);
                ticks += 1;
            }
            engine.state() == GestureState::Idle
        }
        MotionEvent::Autoplay => engine.autoplay_tick(),
        MotionEvent::SwipeTo { index } => engine.swipe_to(*index),
        MotionEvent::SwipeNext => engine.swipe_next(),
        MotionEvent::SwipePrev => engine.swipe_prev(),
        MotionEvent::Dispose => {
            engine.dispose();
            true
        }
    }
}
