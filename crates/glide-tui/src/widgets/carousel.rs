use glide_core::config::Axis;
use glide_core::motion::MotionEngine;
use glide_core::GestureState;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, ROW_PX};

/// A slide's extent along the track, in px relative to the viewport start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideSpan {
    pub index: usize,
    pub start_px: f64,
    pub end_px: f64,
}

/// Slides intersecting the viewport at the engine's current position.
///
/// In loop mode the same index may appear more than once when slides are
/// narrower than the viewport.
pub fn visible_slides(engine: &MotionEngine) -> Vec<SlideSpan> {
    let model = engine.model();
    let count = model.item_count();
    let unit = model.unit_extent();
    let extent = model.viewport_extent();
    if count == 0 || unit <= 0.0 {
        return Vec::new();
    }

    let translation = model.track_translation_px();
    let first = (-translation / unit).floor() as i64 - 1;
    let last = ((extent - translation) / unit).ceil() as i64 + 1;
    let loop_mode = model.config().loop_mode;

    (first..=last)
        .filter_map(|k| {
            let index = if loop_mode {
                k.rem_euclid(count as i64) as usize
            } else if (0..count as i64).contains(&k) {
                k as usize
            } else {
                return None;
            };
            let start_px = translation + k as f64 * unit;
            let end_px = start_px + unit;
            (end_px > 0.0 && start_px < extent).then_some(SlideSpan {
                index,
                start_px,
                end_px,
            })
        })
        .collect()
}

pub struct CarouselWidget;

impl CarouselWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let axis = app.engine.config().axis;
        let (cells, px_per_cell) = match axis {
            Axis::Horizontal => (area.width, 1.0),
            Axis::Vertical => (area.height, ROW_PX),
        };
        let target = app.engine.target_index();
        let border_color = match app.engine.state() {
            GestureState::Dragging => theme.dragging,
            GestureState::Settling => theme.settling,
            GestureState::Idle => theme.active_border,
        };

        for span in visible_slides(&app.engine) {
            let start = (span.start_px / px_per_cell).round() as i64;
            let end = (span.end_px / px_per_cell).round() as i64;
            let from = start.clamp(0, cells as i64) as u16;
            let to = end.clamp(0, cells as i64) as u16;
            if to <= from {
                continue;
            }

            // Only draw the edges that are actually on screen
            let mut borders = match axis {
                Axis::Horizontal => Borders::TOP | Borders::BOTTOM,
                Axis::Vertical => Borders::LEFT | Borders::RIGHT,
            };
            if start >= 0 {
                borders |= match axis {
                    Axis::Horizontal => Borders::LEFT,
                    Axis::Vertical => Borders::TOP,
                };
            }
            if end <= cells as i64 {
                borders |= match axis {
                    Axis::Horizontal => Borders::RIGHT,
                    Axis::Vertical => Borders::BOTTOM,
                };
            }

            let rect = match axis {
                Axis::Horizontal => Rect::new(area.x + from, area.y, to - from, area.height),
                Axis::Vertical => Rect::new(area.x, area.y + from, area.width, to - from),
            };

            let active = span.index == target;
            let (border_style, title_style) = if active {
                (
                    Style::default().fg(border_color),
                    Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    Style::default().fg(theme.slide_border),
                    Style::default().fg(theme.grey2),
                )
            };

            let label = app
                .slides
                .get(span.index)
                .map(String::as_str)
                .unwrap_or("");
            let block = Block::default()
                .borders(borders)
                .border_style(border_style)
                .style(Style::default().bg(theme.bg1));
            let inner = block.inner(rect);
            frame.render_widget(block, rect);

            if inner.height > 0 {
                let text_area = Rect::new(
                    inner.x,
                    inner.y + inner.height / 2,
                    inner.width,
                    inner.height.min(1),
                );
                let paragraph = Paragraph::new(Line::styled(label.to_string(), title_style))
                    .alignment(Alignment::Center);
                frame.render_widget(paragraph, text_area);
            }
        }
    }
}
