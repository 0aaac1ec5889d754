//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of the help popup
const POPUP_WIDTH: u16 = 42;
const POPUP_HEIGHT: u16 = 18;

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }

    fn render_section(&self, header: Rect, sep: Rect, title: &str, buf: &mut Buffer) {
        Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(self.theme.period())
                .add_modifier(Modifier::BOLD),
        )))
        .render(header, buf);

        if sep.height > 0 {
            let line = "─".repeat(sep.width as usize);
            buf.set_string(sep.x, sep.y, &line, Style::default().fg(self.theme.muted()));
        }
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear the area first (for overlay effect)
        Clear.render(area, buf);

        let title = format!(" cloudcost v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // [0] Padding
            Constraint::Length(1), // [1] Navigation header
            Constraint::Length(1), // [2] Separator
            Constraint::Length(1), // [3] Tab/Shift+Tab
            Constraint::Length(1), // [4] 1-4
            Constraint::Length(1), // [5] p / P
            Constraint::Length(1), // [6] Padding
            Constraint::Length(1), // [7] General header
            Constraint::Length(1), // [8] Separator
            Constraint::Length(1), // [9] r
            Constraint::Length(1), // [10] t
            Constraint::Length(1), // [11] q/Esc
            Constraint::Length(1), // [12] ?
            Constraint::Length(1), // [13] Padding
            Constraint::Length(1), // [14] Close hint
            Constraint::Min(0),
        ])
        .split(inner);

        self.render_section(chunks[1], chunks[2], "Navigation", buf);
        render_keybinding(chunks[3], buf, "Tab / Shift+Tab", "Switch view", self.theme);
        render_keybinding(chunks[4], buf, "1-4", "Jump to view", self.theme);
        render_keybinding(chunks[5], buf, "p / P", "Next/prev period", self.theme);

        self.render_section(chunks[7], chunks[8], "General", buf);
        render_keybinding(chunks[9], buf, "r", "Refresh data", self.theme);
        render_keybinding(chunks[10], buf, "t", "Toggle dark mode", self.theme);
        render_keybinding(chunks[11], buf, "q / Esc", "Quit", self.theme);
        render_keybinding(chunks[12], buf, "?", "Toggle help", self.theme);

        Paragraph::new(Line::from(Span::styled(
            "Press ? to close",
            Style::default().fg(self.theme.muted()),
        )))
        .alignment(Alignment::Center)
        .render(chunks[14], buf);
    }
}

/// Render a single keybinding line
fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!("  {:<18}", key),
            Style::default().fg(theme.accent()),
        ),
        Span::styled(desc, Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Left)
        .render(area, buf);
}
