//! Billing types for provider cost tracking

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CloudCostError;

/// Health classification supplied by the billing source (never derived)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl ProviderStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Current-period billing figures for a single cloud provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderRecord {
    /// Provider identifier (e.g., "AWS", "GCP", "Azure")
    pub name: String,
    pub cost: f64,
    /// Signed change versus the prior comparison period, in percent
    pub change_percent: f64,
    pub service_count: u32,
    #[serde(default)]
    pub status: ProviderStatus,
}

impl ProviderRecord {
    pub fn new(
        name: impl Into<String>,
        cost: f64,
        change_percent: f64,
        service_count: u32,
        status: ProviderStatus,
    ) -> Self {
        Self {
            name: name.into(),
            cost,
            change_percent,
            service_count,
            status,
        }
    }

    /// Absolute cost change implied by `change_percent`
    pub fn change_amount(&self) -> f64 {
        self.cost * self.change_percent / 100.0
    }
}

/// Per-provider costs for one time bucket of the trend series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostPoint {
    /// Bucket label (e.g., "Jan", "D12", "W3")
    pub period: String,
    pub costs: BTreeMap<String, f64>,
    pub total: f64,
}

impl CostPoint {
    /// Build a point whose `total` is the sum of `costs`
    pub fn new(period: impl Into<String>, costs: BTreeMap<String, f64>) -> Self {
        let total = costs.values().sum();
        Self {
            period: period.into(),
            costs,
            total,
        }
    }

    /// Cost for a provider in this bucket (0 when the provider is absent)
    pub fn cost_for(&self, provider: &str) -> f64 {
        self.costs.get(provider).copied().unwrap_or(0.0)
    }
}

/// Dashboard time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Period {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl Period {
    /// Short label shown in the period selector
    pub fn label(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
        }
    }

    pub fn all() -> &'static [Period] {
        &[Period::Week, Period::Month, Period::Quarter, Period::Year]
    }

    /// Number of series buckets covering this window
    pub fn bucket_count(self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 13,
            Self::Year => 12,
        }
    }

    /// Human-readable bucket granularity
    pub fn granularity(self) -> &'static str {
        match self {
            Self::Week | Self::Month => "daily",
            Self::Quarter => "weekly",
            Self::Year => "monthly",
        }
    }

    /// Get the next period (wrapping)
    pub fn next(self) -> Self {
        match self {
            Self::Week => Self::Month,
            Self::Month => Self::Quarter,
            Self::Quarter => Self::Year,
            Self::Year => Self::Week,
        }
    }

    /// Get the previous period (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Self::Week => Self::Year,
            Self::Month => Self::Week,
            Self::Quarter => Self::Month,
            Self::Year => Self::Quarter,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = CloudCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            "1y" => Ok(Self::Year),
            other => Err(CloudCostError::Parse(format!(
                "unknown period '{}' (expected 7d, 30d, 90d or 1y)",
                other
            ))),
        }
    }
}

/// Headline figures across all providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Totals {
    pub total_cost: f64,
    pub total_services: u64,
    pub weighted_change_percent: f64,
}

/// A provider's fraction of total cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderShare {
    pub name: String,
    pub share: f64,
}

/// Direction of a cost change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
            Self::Flat => "■",
        }
    }
}

/// Cost accumulated by one provider over a series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderCost {
    pub name: String,
    pub cost: f64,
}

/// Per-provider trend line of the report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderTrend {
    pub name: String,
    pub change_percent: f64,
    pub direction: TrendDirection,
    pub status: ProviderStatus,
}

/// Immutable input snapshot handed from a data provider to the aggregator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub period: Period,
    pub providers: Vec<ProviderRecord>,
    pub series: Vec<CostPoint>,
    pub fetched_at: DateTime<Utc>,
}

/// Everything the presentation layer needs, derived from a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardReport {
    pub period: Period,
    pub totals: Totals,
    pub distribution: Vec<ProviderShare>,
    /// Providers not in healthy status
    pub alerts: usize,
    pub trends: Vec<ProviderTrend>,
    pub series_totals: Vec<ProviderCost>,
    pub generated_at: DateTime<Utc>,
}
