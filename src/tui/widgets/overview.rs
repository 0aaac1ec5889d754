//! Overview view - headline cost cards and one card per provider

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::header::{row_count, split_view, Footer, Header};
use crate::services::Aggregator;
use crate::tui::state::DashboardState;
use crate::types::{DashboardReport, Snapshot};

/// Format a number with thousand separators (e.g., 1234567 -> "1,234,567")
/// Optimized: no Vec<char> allocation since digits are ASCII
pub fn format_number(n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in s.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}

/// Format a monetary amount with separators and cents (e.g., "$4,996.66")
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, format_number(cents / 100), cents % 100)
}

/// Trend arrow plus absolute percentage (e.g., "▼ 12.5%")
pub fn format_change(change_percent: f64) -> String {
    let direction = Aggregator::classify_trend(change_percent);
    format!("{} {:.1}%", direction.arrow(), change_percent.abs())
}

/// Card dimensions
const CARD_WIDTH: u16 = 28;
const CARD_HEIGHT: u16 = 6;

/// Max cards per row for a balanced grid
const FIXED_COLS: usize = 3;

/// Calculate number of cards per row based on available width
fn cards_per_row(width: u16) -> usize {
    let usable_width = width.saturating_sub(4); // padding
    let cards = (usable_width / (CARD_WIDTH + 2)) as usize; // +2 for spacing
    cards.clamp(1, FIXED_COLS)
}

fn grid_height(card_count: usize, cols: usize) -> u16 {
    let rows = card_count.div_ceil(cols.max(1));
    row_count(rows).saturating_mul(CARD_HEIGHT + 1)
}

/// Overview widget
pub struct Overview<'a> {
    snapshot: &'a Snapshot,
    report: &'a DashboardReport,
    state: DashboardState,
}

impl<'a> Overview<'a> {
    pub fn new(snapshot: &'a Snapshot, report: &'a DashboardReport, state: DashboardState) -> Self {
        Self {
            snapshot,
            report,
            state,
        }
    }
}

impl Widget for Overview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (header, body, footer) = split_view(area);
        Header::new(self.state, self.snapshot.fetched_at).render(header, buf);

        let summary_cards = self.build_summary_cards();
        let provider_cards = self.build_provider_cards();
        let cols = cards_per_row(body.width);

        let chunks = Layout::vertical([
            Constraint::Length(1),                                      // Blank
            Constraint::Length(grid_height(summary_cards.len(), cols)), // Summary grid
            Constraint::Length(1),                                      // Providers label
            Constraint::Length(1),                                      // Blank
            Constraint::Length(grid_height(provider_cards.len(), cols)), // Provider grid
            Constraint::Min(0),
        ])
        .split(body);

        self.render_card_grid(chunks[1], buf, &summary_cards, cols);
        self.render_section_label(chunks[2], buf, "Cloud Providers");
        self.render_card_grid(chunks[4], buf, &provider_cards, cols);

        Footer::new(self.state).render(footer, buf);
    }
}

impl Overview<'_> {
    fn build_summary_cards(&self) -> Vec<StatCard> {
        let theme = self.state.theme;
        let totals = &self.report.totals;
        let direction = Aggregator::classify_trend(totals.weighted_change_percent);
        let provider_count = self.snapshot.providers.len();

        vec![
            StatCard {
                title: "Total Cost".to_string(),
                value: format_currency(totals.total_cost),
                value_color: theme.stat_warm(),
                border_color: theme.stat_warm(),
                detail: Some((
                    format!("{} vs last period", format_change(totals.weighted_change_percent)),
                    theme.trend_color(direction),
                )),
            },
            StatCard {
                title: "Active Services".to_string(),
                value: format_number(totals.total_services),
                value_color: theme.stat_blue(),
                border_color: theme.stat_blue(),
                detail: Some((
                    format!(
                        "Across {} provider{}",
                        provider_count,
                        if provider_count == 1 { "" } else { "s" }
                    ),
                    theme.muted(),
                )),
            },
            StatCard {
                title: "Alerts".to_string(),
                value: self.report.alerts.to_string(),
                value_color: if self.report.alerts > 0 {
                    theme.warn()
                } else {
                    theme.good()
                },
                border_color: theme.warn(),
                detail: Some(("Require attention".to_string(), theme.muted())),
            },
        ]
    }

    fn build_provider_cards(&self) -> Vec<StatCard> {
        let theme = self.state.theme;

        self.snapshot
            .providers
            .iter()
            .enumerate()
            .map(|(i, provider)| {
                let direction = Aggregator::classify_trend(provider.change_percent);
                StatCard {
                    title: format!("{} · {}", provider.name, provider.status.label()),
                    value: format_currency(provider.cost),
                    value_color: theme.cost(),
                    border_color: theme.provider_color(i),
                    detail: Some((
                        format!(
                            "{}  {} services",
                            format_change(provider.change_percent),
                            provider.service_count
                        ),
                        theme.trend_color(direction),
                    )),
                }
            })
            .collect()
    }

    fn render_section_label(&self, area: Rect, buf: &mut Buffer, label: &str) {
        let label = Paragraph::new(Line::from(Span::styled(
            label,
            Style::default()
                .fg(self.state.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        label.render(area, buf);
    }

    fn render_card_grid(&self, area: Rect, buf: &mut Buffer, cards: &[StatCard], cols: usize) {
        if cards.is_empty() {
            return;
        }

        let cols = cols.min(cards.len());
        let total_cards_width = (cols as u16) * CARD_WIDTH + ((cols - 1) as u16) * 2; // 2 = spacing
        let start_x = area.x + (area.width.saturating_sub(total_cards_width)) / 2;

        for (i, card) in cards.iter().enumerate() {
            let row = i / cols;
            let col = i % cols;

            let card_x = start_x + (col as u16) * (CARD_WIDTH + 2);
            let card_y = area
                .y
                .saturating_add(row_count(row).saturating_mul(CARD_HEIGHT + 1));

            // Rows only grow downward, so the first row past the bottom ends the grid
            if card_y.saturating_add(CARD_HEIGHT) > area.y + area.height {
                break;
            }
            if card_x + CARD_WIDTH > area.x + area.width {
                continue;
            }

            let card_area = Rect {
                x: card_x,
                y: card_y,
                width: CARD_WIDTH,
                height: CARD_HEIGHT,
            };

            render_card(card_area, buf, card);
        }
    }
}

fn centered_x(area: Rect, text: &str) -> u16 {
    area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2
}

fn render_card(area: Rect, buf: &mut Buffer, card: &StatCard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(card.border_color));
    block.render(area, buf);

    // Title (line 1 inside border) in border color
    buf.set_string(
        centered_x(area, &card.title),
        area.y + 1,
        &card.title,
        Style::default().fg(card.border_color),
    );

    // Value (line 3)
    buf.set_string(
        centered_x(area, &card.value),
        area.y + 3,
        &card.value,
        Style::default()
            .fg(card.value_color)
            .add_modifier(Modifier::BOLD),
    );

    // Detail (line 4)
    if let Some((detail, color)) = &card.detail {
        buf.set_string(
            centered_x(area, detail),
            area.y + 4,
            detail,
            Style::default().fg(*color),
        );
    }
}

/// Internal card representation
struct StatCard {
    title: String,
    value: String,
    value_color: Color,
    border_color: Color,
    detail: Option<(String, Color)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockDataProvider;
    use crate::tui::theme::Theme;
    use crate::types::Period;
    use chrono::Utc;

    fn mock_snapshot() -> Snapshot {
        Snapshot {
            period: Period::Month,
            providers: MockDataProvider::mock_providers(),
            series: MockDataProvider::series_for(Period::Month),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(4996.66), "$4,996.66");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(892.45), "$892.45");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-12.5), "-$12.50");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(-12.5), "▼ 12.5%");
        assert_eq!(format_change(8.2), "▲ 8.2%");
        assert_eq!(format_change(0.0), "■ 0.0%");
    }

    #[test]
    fn test_cards_per_row() {
        assert_eq!(cards_per_row(20), 1);
        assert!((1..=2).contains(&cards_per_row(60)));
        assert_eq!(cards_per_row(170), 3);
    }

    #[test]
    fn test_summary_cards() {
        let snapshot = mock_snapshot();
        let report = Aggregator::report(&snapshot);
        let state = DashboardState::new(Period::Month, Theme::Dark);
        let view = Overview::new(&snapshot, &report, state);

        let cards = view.build_summary_cards();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].value, "$4,996.66");
        assert_eq!(cards[0].detail.as_ref().unwrap().0, "▼ 5.6% vs last period");
        assert_eq!(cards[1].value, "43");
        assert_eq!(cards[1].detail.as_ref().unwrap().0, "Across 3 providers");
        assert_eq!(cards[2].value, "1");
    }

    #[test]
    fn test_provider_cards_use_palette() {
        let snapshot = mock_snapshot();
        let report = Aggregator::report(&snapshot);
        let theme = Theme::Dark;
        let view = Overview::new(&snapshot, &report, DashboardState::new(Period::Month, theme));

        let cards = view.build_provider_cards();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title, "AWS · healthy");
        assert_eq!(cards[0].value, "$2,847.32");
        assert_eq!(cards[1].border_color, theme.provider_color(1));
        assert_eq!(cards[1].detail.as_ref().unwrap().0, "▲ 8.2%  12 services");
    }

    #[test]
    fn test_grid_height_saturates() {
        assert_eq!(grid_height(3, 3), CARD_HEIGHT + 1);
        assert_eq!(grid_height(4, 3), 2 * (CARD_HEIGHT + 1));
        assert_eq!(grid_height(70_000, 1), u16::MAX);
    }

    #[test]
    fn test_render_many_providers() {
        let providers = (0..70_000)
            .map(|i| {
                crate::types::ProviderRecord::new(
                    format!("P{}", i),
                    1.0,
                    0.0,
                    1,
                    crate::types::ProviderStatus::Healthy,
                )
            })
            .collect();
        let snapshot = Snapshot {
            providers,
            series: Vec::new(),
            ..mock_snapshot()
        };
        let report = Aggregator::report(&snapshot);
        let state = DashboardState::new(Period::Month, Theme::Dark);

        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::empty(area);
        Overview::new(&snapshot, &report, state).render(area, &mut buf);
    }

    #[test]
    fn test_render_does_not_panic_on_small_area() {
        let snapshot = mock_snapshot();
        let report = Aggregator::report(&snapshot);
        let state = DashboardState::new(Period::Month, Theme::Dark);

        for (w, h) in [(10, 5), (40, 12), (120, 40)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            Overview::new(&snapshot, &report, state).render(area, &mut buf);
        }
    }
}
