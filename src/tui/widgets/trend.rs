//! Trend view - cost series line chart per provider plus total

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use super::header::{split_view, Footer, Header};
use super::overview::format_currency;
use crate::tui::state::DashboardState;
use crate::types::{CostPoint, DashboardReport, Snapshot};

/// Chart points for one provider (x = bucket index, y = cost)
pub fn provider_points(series: &[CostPoint], provider: &str) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.cost_for(provider)))
        .collect()
}

/// Chart points for the per-bucket total
pub fn total_points(series: &[CostPoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.total))
        .collect()
}

/// First, middle and last bucket labels for the x axis
fn x_labels(series: &[CostPoint]) -> Vec<String> {
    match series.len() {
        0 => Vec::new(),
        1 => vec![series[0].period.clone()],
        n => vec![
            series[0].period.clone(),
            series[n / 2].period.clone(),
            series[n - 1].period.clone(),
        ],
    }
}

/// Trend view widget
pub struct TrendView<'a> {
    snapshot: &'a Snapshot,
    report: &'a DashboardReport,
    state: DashboardState,
}

impl<'a> TrendView<'a> {
    pub fn new(snapshot: &'a Snapshot, report: &'a DashboardReport, state: DashboardState) -> Self {
        Self {
            snapshot,
            report,
            state,
        }
    }
}

impl Widget for TrendView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (header, body, footer) = split_view(area);
        Header::new(self.state, self.snapshot.fetched_at).render(header, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Title
            Constraint::Length(1), // Series summary
            Constraint::Min(0),    // Chart
        ])
        .split(body);

        self.render_title(chunks[0], buf);
        self.render_summary(chunks[1], buf);
        self.render_chart(chunks[2], buf);

        Footer::new(self.state).render(footer, buf);
    }
}

impl TrendView<'_> {
    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        let title = Paragraph::new(Line::from(Span::styled(
            "Cost Trends",
            Style::default()
                .fg(self.state.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(area, buf);
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.state.theme;
        let series_total: f64 = self.snapshot.series.iter().map(|p| p.total).sum();

        let mut spans = vec![
            Span::styled(
                format!(
                    "{} buckets ({}) ",
                    self.snapshot.series.len(),
                    self.snapshot.period.granularity()
                ),
                Style::default().fg(theme.period()),
            ),
            Span::styled(format_currency(series_total), Style::default().fg(theme.cost())),
        ];
        for (i, provider) in self.report.series_totals.iter().enumerate() {
            let color = self
                .snapshot
                .providers
                .iter()
                .position(|p| p.name == provider.name)
                .map(|idx| theme.provider_color(idx))
                .unwrap_or_else(|| theme.provider_color(i));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{} {}", provider.name, format_currency(provider.cost)),
                Style::default().fg(color),
            ));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_chart(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.state.theme;
        let series = &self.snapshot.series;

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted()));

        if series.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled(
                "No cost series for this period",
                Style::default().fg(theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        }

        let provider_data: Vec<Vec<(f64, f64)>> = self
            .snapshot
            .providers
            .iter()
            .map(|p| provider_points(series, &p.name))
            .collect();
        let total_data = total_points(series);

        let mut datasets: Vec<Dataset> = self
            .snapshot
            .providers
            .iter()
            .zip(provider_data.iter())
            .enumerate()
            .map(|(i, (provider, data))| {
                Dataset::default()
                    .name(provider.name.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(theme.provider_color(i)))
                    .data(data)
            })
            .collect();
        datasets.push(
            Dataset::default()
                .name("Total")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.text()))
                .data(&total_data),
        );

        let max_cost = total_data.iter().map(|p| p.1).fold(0.0, f64::max);
        let y_max = if max_cost > 0.0 { max_cost * 1.1 } else { 1.0 };
        let x_max = (series.len().saturating_sub(1)).max(1) as f64;

        let x_labels: Vec<Span> = x_labels(series).into_iter().map(Span::raw).collect();
        let y_labels = vec![
            Span::raw("$0"),
            Span::raw(format_currency(y_max / 2.0)),
            Span::raw(format_currency(y_max)),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(self.snapshot.period.granularity())
                    .style(Style::default().fg(theme.muted()))
                    .labels(x_labels)
                    .bounds([0.0, x_max]),
            )
            .y_axis(
                Axis::default()
                    .title("Cost")
                    .style(Style::default().fg(theme.muted()))
                    .labels(y_labels)
                    .bounds([0.0, y_max]),
            );

        chart.render(area, buf);
    }
}
