//! Billing data providers
//!
//! A `DataProvider` is the seam between the dashboard and wherever billing
//! figures come from. The aggregator never talks to a provider directly;
//! the data loader fetches a snapshot and hands it over.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{CloudCostError, CostPoint, Period, ProviderRecord, ProviderStatus, Result};

/// Source of provider records and cost series
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Fetch current per-provider billing records
    async fn fetch_providers(&self) -> Result<Vec<ProviderRecord>>;

    /// Fetch the cost series for the given window, ordered ascending
    async fn fetch_cost_series(&self, period: Period) -> Result<Vec<CostPoint>>;

    /// Fetch records and series as one consistent read
    ///
    /// Sources that can change between the two calls override this to read
    /// once.
    async fn fetch_snapshot(
        &self,
        period: Period,
    ) -> Result<(Vec<ProviderRecord>, Vec<CostPoint>)> {
        let providers = self.fetch_providers().await?;
        let series = self.fetch_cost_series(period).await?;
        Ok((providers, series))
    }
}

/// Monthly mock figures: (label, aws, gcp, azure)
const MOCK_MONTHS: [(&str, f64, f64, f64); 12] = [
    ("Jan", 2400.0, 1200.0, 800.0),
    ("Feb", 2600.0, 1100.0, 850.0),
    ("Mar", 2800.0, 1300.0, 900.0),
    ("Apr", 2500.0, 1250.0, 880.0),
    ("May", 2700.0, 1180.0, 920.0),
    ("Jun", 2847.0, 1257.0, 892.0),
    ("Jul", 2900.0, 1300.0, 950.0),
    ("Aug", 3000.0, 1350.0, 1000.0),
    ("Sep", 3100.0, 1400.0, 1050.0),
    ("Oct", 3200.0, 1450.0, 1100.0),
    ("Nov", 3300.0, 1500.0, 1150.0),
    ("Dec", 3400.0, 1550.0, 1200.0),
];

/// Repeating multiplier offsets for sub-monthly buckets (sums to zero per cycle)
const BUCKET_VARIATION: [f64; 5] = [-0.04, 0.02, 0.05, -0.01, -0.02];

/// Days per month used when spreading monthly cost into buckets
const DAYS_PER_MONTH: f64 = 30.0;

/// Fixed mock billing data served after a simulated fetch delay
pub struct MockDataProvider {
    delay: Duration,
}

impl MockDataProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Provider that answers immediately (CLI and tests)
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn mock_providers() -> Vec<ProviderRecord> {
        vec![
            ProviderRecord::new("AWS", 2847.32, -12.5, 23, ProviderStatus::Healthy),
            ProviderRecord::new("GCP", 1256.89, 8.2, 12, ProviderStatus::Warning),
            ProviderRecord::new("Azure", 892.45, -3.1, 8, ProviderStatus::Healthy),
        ]
    }

    /// Twelve monthly points, Jan..Dec
    pub fn monthly_series() -> Vec<CostPoint> {
        MOCK_MONTHS
            .iter()
            .map(|(label, aws, gcp, azure)| {
                CostPoint::new(*label, Self::costs(*aws, *gcp, *azure))
            })
            .collect()
    }

    /// Series for `period`, spreading the latest month over smaller buckets
    pub fn series_for(period: Period) -> Vec<CostPoint> {
        let (prefix, days_per_bucket) = match period {
            Period::Year => return Self::monthly_series(),
            Period::Week | Period::Month => ("D", 1.0),
            Period::Quarter => ("W", 7.0),
        };

        let (_, aws, gcp, azure) = MOCK_MONTHS[MOCK_MONTHS.len() - 1];
        let scale = days_per_bucket / DAYS_PER_MONTH;

        (0..period.bucket_count())
            .map(|i| {
                let factor = 1.0 + BUCKET_VARIATION[i % BUCKET_VARIATION.len()];
                CostPoint::new(
                    format!("{}{}", prefix, i + 1),
                    Self::costs(aws * scale * factor, gcp * scale * factor, azure * scale * factor),
                )
            })
            .collect()
    }

    fn costs(aws: f64, gcp: f64, azure: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("AWS".to_string(), aws),
            ("GCP".to_string(), gcp),
            ("Azure".to_string(), azure),
        ])
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            debug!(delay_ms = self.delay.as_millis() as u64, "Simulating fetch latency");
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for MockDataProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

#[async_trait]
impl DataProvider for MockDataProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_providers(&self) -> Result<Vec<ProviderRecord>> {
        self.simulate_latency().await;
        Ok(Self::mock_providers())
    }

    async fn fetch_cost_series(&self, period: Period) -> Result<Vec<CostPoint>> {
        Ok(Self::series_for(period))
    }
}

/// On-disk snapshot layout read by `SnapshotFileProvider`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotFile {
    pub providers: Vec<ProviderRecord>,
    #[serde(default)]
    pub series: Vec<CostPoint>,
}

/// Reads provider records and series from a JSON snapshot file
pub struct SnapshotFileProvider {
    path: PathBuf,
}

impl SnapshotFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SnapshotFile> {
        debug!(path = %self.path.display(), "Reading snapshot file");
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| {
            CloudCostError::Parse(format!("{}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl DataProvider for SnapshotFileProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_providers(&self) -> Result<Vec<ProviderRecord>> {
        Ok(self.read().await?.providers)
    }

    async fn fetch_cost_series(&self, period: Period) -> Result<Vec<CostPoint>> {
        Ok(trailing_buckets(self.read().await?.series, period))
    }

    async fn fetch_snapshot(
        &self,
        period: Period,
    ) -> Result<(Vec<ProviderRecord>, Vec<CostPoint>)> {
        let file = self.read().await?;
        Ok((file.providers, trailing_buckets(file.series, period)))
    }
}

/// Keep the most recent `bucket_count` points of a stored series
fn trailing_buckets(mut series: Vec<CostPoint>, period: Period) -> Vec<CostPoint> {
    let keep = period.bucket_count();
    if series.len() > keep {
        series.drain(..series.len() - keep);
    }
    series
}
