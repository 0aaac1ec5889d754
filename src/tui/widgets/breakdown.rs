//! Breakdown view - each provider's share of total cost

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::header::{render_separator, row_count, split_view, Footer, Header};
use super::overview::format_currency;
use crate::tui::state::DashboardState;
use crate::types::{DashboardReport, Snapshot};

/// Format a share bar with filled/empty blocks
/// Example: 0.5 with width 10 → "█████░░░░░"
pub fn format_share_bar(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 1.0)) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Table width: Provider(14) + Cost(14) + Share(10) + Bar(2 + BAR_WIDTH)
const BAR_WIDTH: usize = 36;
const TABLE_WIDTH: u16 = 14 + 14 + 10 + 2 + BAR_WIDTH as u16;

/// Breakdown view widget
pub struct BreakdownView<'a> {
    snapshot: &'a Snapshot,
    report: &'a DashboardReport,
    state: DashboardState,
}

impl<'a> BreakdownView<'a> {
    pub fn new(snapshot: &'a Snapshot, report: &'a DashboardReport, state: DashboardState) -> Self {
        Self {
            snapshot,
            report,
            state,
        }
    }
}

impl Widget for BreakdownView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (header, body, footer) = split_view(area);
        Header::new(self.state, self.snapshot.fetched_at).render(header, buf);

        let rows = row_count(self.report.distribution.len());
        let chunks = Layout::vertical([
            Constraint::Length(1),    // Title
            Constraint::Length(1),    // Blank
            Constraint::Length(1),    // Column header
            Constraint::Length(1),    // Separator
            Constraint::Length(rows), // Provider rows
            Constraint::Length(1),    // Separator
            Constraint::Length(1),    // Total row
            Constraint::Min(0),
        ])
        .split(body);

        let table_x = body.x + body.width.saturating_sub(TABLE_WIDTH) / 2;
        let table = |r: Rect| Rect {
            x: table_x.max(r.x),
            width: r.width.min(TABLE_WIDTH),
            ..r
        };

        self.render_title(chunks[0], buf);
        self.render_header(table(chunks[2]), buf);
        render_separator(table(chunks[3]), buf, self.state.theme.muted());
        self.render_rows(table(chunks[4]), buf);
        render_separator(table(chunks[5]), buf, self.state.theme.muted());
        self.render_total(table(chunks[6]), buf);

        Footer::new(self.state).render(footer, buf);
    }
}

impl BreakdownView<'_> {
    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(Span::styled(
            "Cost Distribution",
            Style::default()
                .fg(self.state.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.state.theme.text())
            .add_modifier(Modifier::BOLD);
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{:<14}", "Provider"), style),
            Span::styled(format!("{:>14}", "Cost"), style),
            Span::styled(format!("{:>10}", "Share"), style),
        ]))
        .render(area, buf);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.state.theme;

        for (i, share) in self.report.distribution.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let cost = self
                .snapshot
                .providers
                .iter()
                .find(|p| p.name == share.name)
                .map(|p| p.cost)
                .unwrap_or(0.0);
            let color = theme.provider_color(i);

            let line = Line::from(vec![
                Span::styled(format!("{:<14}", share.name), Style::default().fg(color)),
                Span::styled(
                    format!("{:>14}", format_currency(cost)),
                    Style::default().fg(theme.cost()),
                ),
                Span::styled(
                    format!("{:>9.1}%", share.share * 100.0),
                    Style::default().fg(theme.text()),
                ),
                Span::raw("  "),
                Span::styled(format_share_bar(share.share, BAR_WIDTH), Style::default().fg(color)),
            ]);
            Paragraph::new(line).render(
                Rect {
                    y,
                    height: 1,
                    ..area
                },
                buf,
            );
        }
    }

    fn render_total(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.state.theme;
        let share_sum: f64 = self.report.distribution.iter().map(|s| s.share).sum();
        let style = Style::default()
            .fg(theme.text())
            .add_modifier(Modifier::BOLD);

        Paragraph::new(Line::from(vec![
            Span::styled(format!("{:<14}", "Total"), style),
            Span::styled(
                format!("{:>14}", format_currency(self.report.totals.total_cost)),
                Style::default().fg(theme.stat_warm()),
            ),
            Span::styled(format!("{:>9.1}%", share_sum * 100.0), style),
        ]))
        .render(area, buf);
    }
}
