//! Providers view - one row per cloud provider

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::header::{render_separator, row_count, split_view, Footer, Header};
use super::overview::{format_change, format_currency};
use crate::services::Aggregator;
use crate::tui::state::DashboardState;
use crate::types::Snapshot;

/// Table width: marker(2) + Provider(16) + Services(10) + Cost(14) + Change(12) + Status(12)
const TABLE_WIDTH: u16 = 66;

/// Providers list widget
pub struct ProvidersView<'a> {
    snapshot: &'a Snapshot,
    state: DashboardState,
}

impl<'a> ProvidersView<'a> {
    pub fn new(snapshot: &'a Snapshot, state: DashboardState) -> Self {
        Self { snapshot, state }
    }
}

impl Widget for ProvidersView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (header, body, footer) = split_view(area);
        Header::new(self.state, self.snapshot.fetched_at).render(header, buf);

        let rows = row_count(self.snapshot.providers.len());
        let chunks = Layout::vertical([
            Constraint::Length(1),    // Title
            Constraint::Length(1),    // Blank
            Constraint::Length(1),    // Column header
            Constraint::Length(1),    // Separator
            Constraint::Length(rows), // Provider rows
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

        Footer::new(self.state).render(footer, buf);
    }
}

impl ProvidersView<'_> {
    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(Span::styled(
            "Cloud Providers",
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
            Span::styled(format!("  {:<16}", "Provider"), style),
            Span::styled(format!("{:>10}", "Services"), style),
            Span::styled(format!("{:>14}", "Cost"), style),
            Span::styled(format!("{:>12}", "Change"), style),
            Span::styled(format!("{:>12}", "Status"), style),
        ]))
        .render(area, buf);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.state.theme;

        for (i, provider) in self.snapshot.providers.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let direction = Aggregator::classify_trend(provider.change_percent);

            let line = Line::from(vec![
                Span::styled("● ", Style::default().fg(theme.provider_color(i))),
                Span::styled(
                    format!("{:<16}", provider.name),
                    Style::default().fg(theme.text()),
                ),
                Span::styled(
                    format!("{:>10}", provider.service_count),
                    Style::default().fg(theme.muted()),
                ),
                Span::styled(
                    format!("{:>14}", format_currency(provider.cost)),
                    Style::default().fg(theme.cost()),
                ),
                Span::styled(
                    format!("{:>12}", format_change(provider.change_percent)),
                    Style::default().fg(theme.trend_color(direction)),
                ),
                Span::styled(
                    format!("{:>12}", provider.status.label()),
                    Style::default().fg(theme.status_color(provider.status)),
                ),
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
}
