//! Header and footer shared by every dashboard view

use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::spinner::Spinner;
use super::tabs::{PeriodBar, TabBar};
use crate::tui::state::DashboardState;

const APP_TITLE: &str = "CloudCost";
const APP_SUBTITLE: &str = "Multi-cloud Cost Dashboard";

/// Maximum content width (keeps layout clean on wide terminals)
pub const MAX_CONTENT_WIDTH: u16 = 170;

const HEADER_HEIGHT: u16 = 4;
const FOOTER_HEIGHT: u16 = 2;

/// Split a view area into (header, body, footer), centered to the max width
pub fn split_view(area: Rect) -> (Rect, Rect, Rect) {
    let content_width = area.width.min(MAX_CONTENT_WIDTH);
    let x_offset = (area.width.saturating_sub(content_width)) / 2;
    let centered_area = Rect {
        x: area.x + x_offset,
        y: area.y,
        width: content_width,
        height: area.height,
    };

    let chunks = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Fill(1),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .split(centered_area);

    (chunks[0], chunks[1], chunks[2])
}

/// Title line, tab bar, period selector and separator
pub struct Header {
    state: DashboardState,
    fetched_at: DateTime<Utc>,
}

impl Header {
    pub fn new(state: DashboardState, fetched_at: DateTime<Utc>) -> Self {
        Self { state, fetched_at }
    }

    fn status_text(&self) -> String {
        if self.state.refreshing {
            let spinner = Spinner::new(self.state.spinner_frame);
            format!("{} Refreshing...", spinner.current_char())
        } else {
            let local = self.fetched_at.with_timezone(&Local);
            format!("Updated {}", local.format("%H:%M:%S"))
        }
    }
}

impl Widget for Header {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.state.theme;
        let rows = Layout::vertical([Constraint::Length(1); 4]).split(area);

        let title = Line::from(vec![
            Span::styled(
                APP_TITLE,
                Style::default()
                    .fg(theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(APP_SUBTITLE, Style::default().fg(theme.muted())),
        ]);
        Paragraph::new(title).render(rows[0], buf);

        let status_style = if self.state.refreshing {
            Style::default().fg(theme.accent())
        } else {
            Style::default().fg(theme.muted())
        };
        Paragraph::new(Line::from(Span::styled(self.status_text(), status_style)))
            .alignment(Alignment::Right)
            .render(rows[0], buf);

        TabBar::new(self.state.tab, theme).render(rows[1], buf);
        PeriodBar::new(self.state.period, theme).render(rows[2], buf);
        render_separator(rows[3], buf, theme.muted());
    }
}

/// Separator and keybinding hints
pub struct Footer {
    state: DashboardState,
}

impl Footer {
    pub fn new(state: DashboardState) -> Self {
        Self { state }
    }
}

impl Widget for Footer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.state.theme;
        let rows = Layout::vertical([Constraint::Length(1); 2]).split(area);
        render_separator(rows[0], buf, theme.muted());

        let key = Style::default().fg(theme.accent());
        let hint = Style::default().fg(theme.muted());
        let mode = if theme.is_dark() { ": Light" } else { ": Dark" };

        let bindings = Paragraph::new(Line::from(vec![
            Span::styled("q", key),
            Span::styled(": Quit", hint),
            Span::raw("  "),
            Span::styled("Tab", key),
            Span::styled(": Switch view", hint),
            Span::raw("  "),
            Span::styled("p", key),
            Span::styled(": Period", hint),
            Span::raw("  "),
            Span::styled("r", key),
            Span::styled(": Refresh", hint),
            Span::raw("  "),
            Span::styled("t", key),
            Span::styled(mode, hint),
            Span::raw("  "),
            Span::styled("?", key),
            Span::styled(": Help", hint),
        ]))
        .alignment(Alignment::Center);

        bindings.render(rows[1], buf);
    }
}

/// Row count as a layout length, capped at `u16::MAX`
pub fn row_count(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

pub fn render_separator(area: Rect, buf: &mut Buffer, color: ratatui::style::Color) {
    if area.height == 0 {
        return;
    }
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(color));
}
