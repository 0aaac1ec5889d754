//! Tab bar and period selector widgets

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;
use crate::types::Period;

/// Available tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Trend,
    Breakdown,
    Providers,
}

impl Tab {
    /// Get the display label for this tab
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Trend => "Trend",
            Self::Breakdown => "Breakdown",
            Self::Providers => "Providers",
        }
    }

    /// Get all tabs in order
    pub fn all() -> &'static [Tab] {
        &[Tab::Overview, Tab::Trend, Tab::Breakdown, Tab::Providers]
    }

    /// Get the next tab (wrapping)
    pub fn next(self) -> Self {
        match self {
            Self::Overview => Self::Trend,
            Self::Trend => Self::Breakdown,
            Self::Breakdown => Self::Providers,
            Self::Providers => Self::Overview,
        }
    }

    /// Get the previous tab (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Self::Overview => Self::Providers,
            Self::Trend => Self::Overview,
            Self::Breakdown => Self::Trend,
            Self::Providers => Self::Breakdown,
        }
    }

    /// Get tab from number key (1-4)
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Overview),
            2 => Some(Self::Trend),
            3 => Some(Self::Breakdown),
            4 => Some(Self::Providers),
            _ => None,
        }
    }
}

/// Render `[selected]  other  other` centered on one row
fn render_choices(
    area: Rect,
    buf: &mut Buffer,
    labels: &[&str],
    selected: usize,
    theme: Theme,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let total_width: u16 = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let display_len = if i == selected {
                label.len() + 2 // "[label]"
            } else {
                label.len()
            };
            display_len as u16 + 2 // + spacing
        })
        .sum::<u16>()
        .saturating_sub(2); // Remove trailing spacing

    let mut x = area.x + (area.width.saturating_sub(total_width)) / 2;

    for (i, label) in labels.iter().enumerate() {
        let is_selected = i == selected;
        let display = if is_selected {
            format!("[{}]", label)
        } else {
            label.to_string()
        };

        let display_len = display.len() as u16;
        if x + display_len > area.x + area.width {
            break;
        }

        let style = if is_selected {
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted())
        };

        buf.set_string(x, area.y, &display, style);
        x += display_len + 2;
    }
}

/// Tab bar widget showing available views
pub struct TabBar {
    selected: Tab,
    theme: Theme,
}

impl TabBar {
    pub fn new(selected: Tab, theme: Theme) -> Self {
        Self { selected, theme }
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let labels: Vec<&str> = Tab::all().iter().map(|t| t.label()).collect();
        let selected = Tab::all()
            .iter()
            .position(|t| *t == self.selected)
            .unwrap_or(0);
        render_choices(area, buf, &labels, selected, self.theme);
    }
}

/// Period selector (7d / 30d / 90d / 1y)
pub struct PeriodBar {
    selected: Period,
    theme: Theme,
}

impl PeriodBar {
    pub fn new(selected: Period, theme: Theme) -> Self {
        Self { selected, theme }
    }
}

impl Widget for PeriodBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let labels: Vec<&str> = Period::all().iter().map(|p| p.label()).collect();
        let selected = Period::all()
            .iter()
            .position(|p| *p == self.selected)
            .unwrap_or(0);
        render_choices(area, buf, &labels, selected, self.theme);
    }
}
