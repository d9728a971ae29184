use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use glide_core::replay::{self, MotionEvent, Script, Trace};

pub fn run(file: &Path, json: bool) -> Result<()> {
    let script = Script::load(file)
        .with_context(|| format!("Failed to load script {}", file.display()))?;
    info!("Loaded {} events from {}", script.events.len(), file.display());

    let trace = replay::replay(&script)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else {
        print!("{}", render_table(&trace));
    }
    Ok(())
}

fn render_table(trace: &Trace) -> String {
    let mut out = format!(
        "{:>4}  {:<28} {:<4} {:>10} {:>6}  {}\n",
        "#", "event", "ok", "position", "index", "state"
    );
    for (n, frame) in trace.frames.iter().enumerate() {
        let state = serde_json::to_value(frame.snapshot.state)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>4}  {:<28} {:<4} {:>10.4} {:>6}  {}\n",
            n,
            describe(&frame.event),
            if frame.accepted { "yes" } else { "no" },
            frame.snapshot.position,
            frame.snapshot.target_index,
            state
        ));
    }
    out.push_str(&format!("index changes: {:?}\n", trace.index_changes));
    out
}

fn describe(event: &MotionEvent) -> String {
    match event {
        MotionEvent::Extent { px } => format!("extent {}px", px),
        MotionEvent::DragStart(s) => format!("drag_start ({}, {}) @{}", s.x, s.y, s.timestamp_ms),
        MotionEvent::DragUpdate(s) => format!("drag_update ({}, {}) @{}", s.x, s.y, s.timestamp_ms),
        MotionEvent::DragEnd(s) => format!("drag_end ({}, {}) @{}", s.x, s.y, s.timestamp_ms),
        MotionEvent::DragCancel => "drag_cancel".to_string(),
        MotionEvent::Tick { dt_ms } => format!("tick {}ms", dt_ms),
        MotionEvent::RunTicks { count, dt_ms } => format!("run_ticks {}x{}ms", count, dt_ms),
        MotionEvent::RunUntilIdle { dt_ms, max_ticks } => {
            format!("run_until_idle {}ms (max {})", dt_ms, max_ticks)
        }
        MotionEvent::Autoplay => "autoplay".to_string(),
        MotionEvent::SwipeTo { index } => format!("swipe_to {}", index),
        MotionEvent::SwipeNext => "swipe_next".to_string(),
        MotionEvent::SwipePrev => "swipe_prev".to_string(),
        MotionEvent::Dispose => "dispose".to_string(),
    }
}
