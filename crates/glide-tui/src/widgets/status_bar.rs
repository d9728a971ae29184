use glide_core::config::AutoplayDirection;
use glide_core::GestureState;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let engine = &app.engine;

        let state_str = match engine.state() {
            GestureState::Idle => "IDLE",
            GestureState::Dragging => "DRAG",
            GestureState::Settling => "SETTLE",
        };
        let config = engine.config();
        let loop_str = if config.loop_mode { " loop" } else { "" };
        let autoplay_str = match config.autoplay.direction {
            AutoplayDirection::None => "",
            AutoplayDirection::Forward => " auto>",
            AutoplayDirection::Reverse => " <auto",
        };

        let status_text = match &app.status_message {
            Some(msg) => format!(" {} | {}", state_str, msg),
            None => format!(
                " {} | {}/{} | pos {:.3}{}{}",
                state_str,
                engine.target_index() + 1,
                app.slides.len(),
                engine.position(),
                loop_str,
                autoplay_str
            ),
        };

        let help_hint = " q:quit h/l:swipe g/G:ends o:loop a:autoplay ";
        let padding_len = area
            .width
            .saturating_sub(status_text.len() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
