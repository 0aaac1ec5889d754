use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::services::{Config, DataLoaderService};
use crate::tui::widgets::overview::{format_change, format_currency};
use crate::tui::{self, theme::Theme, TuiConfig};
use crate::types::{CostPoint, DashboardReport, Period, ProviderTrend, Snapshot};

/// Multi-cloud cost dashboard for the terminal
#[derive(Parser)]
#[command(name = "cloudcost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Snapshot JSON file to read instead of mock data
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Config file (defaults to ~/.cloudcost/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reporting period: 7d, 30d, 90d or 1y
    #[arg(long, global = true)]
    period: Option<Period>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui,

    /// Show totals and alert count
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show each provider's share of total cost
    Breakdown {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the cost series and per-provider trend
    Trend {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the full dashboard report as JSON
    Export {
        /// Destination file
        path: PathBuf,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let interactive = matches!(self.command, None | Some(Commands::Tui));
        init_tracing(self.verbose, interactive);

        let config = load_config(self.config.as_deref())?;
        let period = self.period.unwrap_or(config.default_period);
        let data_file = self.data.or_else(|| config.data_file.clone());

        match self.command {
            None | Some(Commands::Tui) => {
                // Detect theme before ratatui::init() enters raw mode
                let theme = Theme::from_preference(config.theme);
                let loader =
                    DataLoaderService::from_source(data_file.as_deref(), config.refresh_delay());
                tui::run(TuiConfig {
                    period,
                    theme,
                    loader,
                })
            }
            Some(Commands::Summary { json }) => {
                let (snapshot, report) = load_report(data_file.as_deref(), period)?;
                if json {
                    print_json(&SummaryJson::from(&report))
                } else {
                    print_summary(&snapshot, &report);
                    Ok(())
                }
            }
            Some(Commands::Breakdown { json }) => {
                let (snapshot, report) = load_report(data_file.as_deref(), period)?;
                if json {
                    print_json(&report.distribution)
                } else {
                    print_breakdown(&snapshot, &report);
                    Ok(())
                }
            }
            Some(Commands::Trend { json }) => {
                let (snapshot, report) = load_report(data_file.as_deref(), period)?;
                if json {
                    print_json(&TrendJson {
                        period: report.period,
                        series: &snapshot.series,
                        providers: &report.trends,
                    })
                } else {
                    print_trend(&snapshot, &report);
                    Ok(())
                }
            }
            Some(Commands::Export { path }) => {
                let (_, report) = load_report(data_file.as_deref(), period)?;
                export_report(&report, &path)?;
                info!(path = %path.display(), "Report exported");
                println!("Report written to {}", path.display());
                Ok(())
            }
        }
    }
}

/// Install the global subscriber. The TUI owns the terminal, so its logs
/// go to `~/.cloudcost/cloudcost.log` instead of stderr.
fn init_tracing(verbose: u8, interactive: bool) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let writer = if interactive {
        match open_log_file() {
            Some(file) => BoxMakeWriter::new(Mutex::new(file)),
            None => BoxMakeWriter::new(io::sink),
        }
    } else {
        BoxMakeWriter::new(io::stderr)
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(!interactive),
        )
        .try_init();
}

fn open_log_file() -> Option<File> {
    let dir = Config::default_path().ok()?.parent()?.to_path_buf();
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("cloudcost.log"))
        .ok()
}

/// A missing file falls back to defaults; a malformed one is an error
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

fn load_report(
    data_file: Option<&Path>,
    period: Period,
) -> anyhow::Result<(Snapshot, DashboardReport)> {
    // Non-interactive commands skip the simulated latency
    let loader = DataLoaderService::from_source(data_file, Duration::ZERO);
    Ok(loader.report_blocking(period)?)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn export_report(report: &DashboardReport, path: &Path) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct SummaryJson {
    period: Period,
    total_cost: f64,
    total_services: u64,
    weighted_change_percent: f64,
    alerts: usize,
}

impl From<&DashboardReport> for SummaryJson {
    fn from(report: &DashboardReport) -> Self {
        Self {
            period: report.period,
            total_cost: report.totals.total_cost,
            total_services: report.totals.total_services,
            weighted_change_percent: report.totals.weighted_change_percent,
            alerts: report.alerts,
        }
    }
}

#[derive(serde::Serialize)]
struct TrendJson<'a> {
    period: Period,
    series: &'a [CostPoint],
    providers: &'a [ProviderTrend],
}

fn print_summary(snapshot: &Snapshot, report: &DashboardReport) {
    let totals = &report.totals;
    println!("Period:          {}", report.period);
    println!("Total cost:      {}", format_currency(totals.total_cost));
    println!(
        "Change:          {}",
        format_change(totals.weighted_change_percent)
    );
    println!(
        "Active services: {} across {} providers",
        totals.total_services,
        snapshot.providers.len()
    );
    println!("Alerts:          {}", report.alerts);
}

fn print_breakdown(snapshot: &Snapshot, report: &DashboardReport) {
    println!("{:<14}{:>14}{:>10}", "Provider", "Cost", "Share");
    for (share, provider) in report.distribution.iter().zip(&snapshot.providers) {
        println!(
            "{:<14}{:>14}{:>9.1}%",
            share.name,
            format_currency(provider.cost),
            share.share * 100.0
        );
    }
    println!(
        "{:<14}{:>14}",
        "Total",
        format_currency(report.totals.total_cost)
    );
}

fn print_trend(snapshot: &Snapshot, report: &DashboardReport) {
    println!(
        "{} ({} buckets, {})",
        report.period,
        snapshot.series.len(),
        report.period.granularity()
    );
    for point in &snapshot.series {
        println!("{:<6}{:>14}", point.period, format_currency(point.total));
    }
    println!();
    for trend in &report.trends {
        println!(
            "{:<14}{:>10}  {}",
            trend.name,
            format_change(trend.change_percent),
            trend.status.label()
        );
    }
}
