//! View state owned by the app and handed to every view

use super::theme::Theme;
use super::widgets::tabs::Tab;
use crate::types::Period;

/// Presentation state; never consulted by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardState {
    pub tab: Tab,
    pub period: Period,
    pub theme: Theme,
    /// A fetch is in flight while older data stays on screen
    pub refreshing: bool,
    pub spinner_frame: usize,
}

impl DashboardState {
    pub fn new(period: Period, theme: Theme) -> Self {
        Self {
            period,
            theme,
            ..Self::default()
        }
    }
}
