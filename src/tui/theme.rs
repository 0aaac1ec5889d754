//! Terminal theme detection and color definitions

use ratatui::style::Color;

use crate::services::ThemePreference;
use crate::types::{ProviderStatus, TrendDirection};

/// Fixed provider palette, assigned by position in the provider list
const PROVIDER_PALETTE: [Color; 3] = [
    Color::Rgb(0xf9, 0x73, 0x16), // orange
    Color::Rgb(0x42, 0x85, 0xf4), // blue
    Color::Rgb(0x00, 0x78, 0xd4), // azure
];

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Resolve a configured preference, detecting only for `Auto`
    pub fn from_preference(pref: ThemePreference) -> Self {
        match pref {
            ThemePreference::Auto => Self::detect(),
            ThemePreference::Dark => Self::Dark,
            ThemePreference::Light => Self::Light,
        }
    }

    /// Dark mode toggle
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// Primary text color (headers, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (selected tabs, keybinding keys, interactive elements)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, inactive tabs, hints)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Period/bucket label color
    pub fn period(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130), // dark orange/yellow (ANSI 256)
        }
    }

    /// Cost/money text color
    pub fn cost(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Light => Color::Indexed(90), // dark magenta (ANSI 256)
        }
    }

    /// Healthy / cost decrease
    pub fn good(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22), // dark green (ANSI 256)
        }
    }

    /// Warning / medium cost
    pub fn warn(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(208), // orange (ANSI 256)
            Self::Light => Color::Indexed(166), // dark orange (ANSI 256)
        }
    }

    /// Critical / cost increase
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Stats accent color (services card)
    pub fn stat_blue(self) -> Color {
        match self {
            Self::Dark => Color::Blue,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Stats warm highlight (Total Cost card)
    pub fn stat_warm(self) -> Color {
        match self {
            Self::Dark => Color::LightRed,
            Self::Light => Color::Red,
        }
    }

    /// Chart/legend color for the provider at `index`; cycles past the palette
    pub fn provider_color(self, index: usize) -> Color {
        PROVIDER_PALETTE[index % PROVIDER_PALETTE.len()]
    }

    pub fn status_color(self, status: ProviderStatus) -> Color {
        match status {
            ProviderStatus::Healthy => self.good(),
            ProviderStatus::Warning => self.warn(),
            ProviderStatus::Critical => self.error(),
        }
    }

    /// Rising cost is bad news, falling cost is good news
    pub fn trend_color(self, direction: TrendDirection) -> Color {
        match direction {
            TrendDirection::Up => self.error(),
            TrendDirection::Down => self.good(),
            TrendDirection::Flat => self.muted(),
        }
    }
}
