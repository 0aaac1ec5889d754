//! Application state and event loop

use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::Widget,
    DefaultTerminal, Frame,
};
use tracing::{debug, warn};

use super::state::DashboardState;
use super::theme::Theme;
use super::widgets::{
    breakdown::BreakdownView,
    help::HelpPopup,
    overview::Overview,
    providers::ProvidersView,
    spinner::Spinner,
    tabs::Tab,
    trend::TrendView,
};
use crate::services::{Aggregator, DataLoaderService};
use crate::types::{DashboardReport, Period, Snapshot};

/// Settings resolved by the CLI before the terminal enters raw mode
pub struct TuiConfig {
    pub period: Period,
    pub theme: Theme,
    pub loader: DataLoaderService,
}

/// Application state
pub enum AppState {
    /// First fetch in flight, spinner animation
    Loading { spinner_frame: usize },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// First fetch failed
    Error { message: String },
}

/// Loaded snapshot and the report derived from it
pub struct AppData {
    pub snapshot: Snapshot,
    pub report: DashboardReport,
}

impl AppData {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let report = Aggregator::report(&snapshot);
        Self { snapshot, report }
    }
}

/// Outcome of a fetch, tagged with the generation that requested it
pub type FetchResult = (u64, Result<Box<AppData>, String>);

/// Main application
pub struct App {
    state: AppState,
    view: DashboardState,
    should_quit: bool,
    show_help: bool,
    /// Generation of the most recent fetch; older results are discarded
    generation: u64,
    fetch_requested: bool,
}

impl App {
    /// Create a new app in loading state with the first fetch queued
    pub fn new(period: Period, theme: Theme) -> Self {
        Self {
            state: AppState::Loading { spinner_frame: 0 },
            view: DashboardState::new(period, theme),
            should_quit: false,
            show_help: false,
            generation: 0,
            fetch_requested: true,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        self.should_quit = true;
                    }
                    KeyCode::Tab => {
                        self.view.tab = self.view.tab.next();
                    }
                    KeyCode::BackTab => {
                        self.view.tab = self.view.tab.prev();
                    }
                    KeyCode::Char(c @ '1'..='4') => {
                        if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                            self.view.tab = tab;
                        }
                    }
                    KeyCode::Char('p') => {
                        self.select_period(self.view.period.next());
                    }
                    KeyCode::Char('P') => {
                        self.select_period(self.view.period.prev());
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.request_refresh();
                    }
                    KeyCode::Char('t') | KeyCode::Char('T') => {
                        self.view.theme = self.view.theme.toggle();
                    }
                    KeyCode::Char('?') => {
                        self.show_help = !self.show_help;
                    }
                    _ => {}
                }
            }
        }
    }

    /// Change the period and queue a fetch for it
    fn select_period(&mut self, period: Period) {
        if period != self.view.period {
            self.view.period = period;
            self.fetch_requested = true;
        }
    }

    /// Queue a refresh unless one is already running
    fn request_refresh(&mut self) {
        if self.is_fetching() {
            return;
        }
        self.fetch_requested = true;
    }

    fn is_fetching(&self) -> bool {
        self.view.refreshing || matches!(self.state, AppState::Loading { .. })
    }

    /// Take the queued fetch, if any, as (generation, period)
    pub fn take_fetch_request(&mut self) -> Option<(u64, Period)> {
        if !self.fetch_requested {
            return None;
        }
        self.fetch_requested = false;
        self.generation += 1;

        match self.state {
            AppState::Ready { .. } => self.view.refreshing = true,
            AppState::Error { .. } => self.state = AppState::Loading { spinner_frame: 0 },
            AppState::Loading { .. } => {}
        }

        Some((self.generation, self.view.period))
    }

    /// Apply a fetch result; returns false when it was superseded
    pub fn apply_fetch_result(&mut self, generation: u64, result: Result<Box<AppData>, String>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Discarding stale fetch result");
            return false;
        }
        self.view.refreshing = false;

        match result {
            Ok(data) => self.state = AppState::Ready { data },
            Err(message) if matches!(self.state, AppState::Ready { .. }) => {
                warn!(error = %message, "Refresh failed, keeping previous data");
            }
            Err(message) => self.state = AppState::Error { message },
        }
        true
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading { spinner_frame } = &mut self.state {
            *spinner_frame = Spinner::next_frame(*spinner_frame);
        }
        if self.view.refreshing {
            self.view.spinner_frame = Spinner::next_frame(self.view.spinner_frame);
        }
    }

    pub fn view_state(&self) -> DashboardState {
        self.view
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.view.theme;

        match &self.state {
            AppState::Loading { spinner_frame } => {
                Spinner::new(*spinner_frame)
                    .with_theme(theme)
                    .render(area, buf);
            }
            AppState::Ready { data } => {
                match self.view.tab {
                    Tab::Overview => {
                        Overview::new(&data.snapshot, &data.report, self.view).render(area, buf);
                    }
                    Tab::Trend => {
                        TrendView::new(&data.snapshot, &data.report, self.view).render(area, buf);
                    }
                    Tab::Breakdown => {
                        BreakdownView::new(&data.snapshot, &data.report, self.view)
                            .render(area, buf);
                    }
                    Tab::Providers => {
                        ProvidersView::new(&data.snapshot, self.view).render(area, buf);
                    }
                }

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                if area.height == 0 {
                    return;
                }
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(theme.error()));

                if y + 1 < area.y + area.height {
                    let hint = "Press r to retry, q to quit";
                    let hint_x = area.x + (area.width.saturating_sub(hint.len() as u16)) / 2;
                    buf.set_string(hint_x, y + 1, hint, Style::default().fg(theme.muted()));
                }
            }
        }
    }
}

/// Run the TUI application
pub fn run(config: TuiConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &runtime, config);
    ratatui::restore();
    result
}

fn run_app(
    terminal: &mut DefaultTerminal,
    runtime: &tokio::runtime::Runtime,
    config: TuiConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(config.period, config.theme);
    let (data_tx, data_rx) = mpsc::channel::<FetchResult>();

    loop {
        if let Some((generation, period)) = app.take_fetch_request() {
            let loader = config.loader.clone();
            let tx = data_tx.clone();
            runtime.spawn(async move {
                let result = loader
                    .load(period)
                    .await
                    .map(|snapshot| Box::new(AppData::from_snapshot(snapshot)))
                    .map_err(|e| e.to_string());
                let _ = tx.send((generation, result));
            });
        }

        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Drain completed fetches (non-blocking)
        while let Ok((generation, result)) = data_rx.try_recv() {
            app.apply_fetch_result(generation, result);
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}
