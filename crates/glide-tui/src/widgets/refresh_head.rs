use glide_core::PullState;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Indicator revealed above the carousel while pulling or refreshing
pub struct RefreshHeadWidget;

impl RefreshHeadWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        if area.height == 0 {
            return;
        }
        let theme = &app.theme;
        let color = match app.pull.state() {
            PullState::CanRelease | PullState::Refreshing | PullState::Completing => theme.refresh,
            PullState::Idle | PullState::Pulling => theme.grey1,
        };

        // Label sits on the bottom row, nearest the content being pulled
        let label_row = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
        frame.render_widget(
            Paragraph::new("").style(Style::default().bg(theme.bg0)),
            area,
        );
        frame.render_widget(
            Paragraph::new(Line::styled(app.pull.state().label(), Style::default().fg(color)))
                .alignment(Alignment::Center),
            label_row,
        );
    }
}
