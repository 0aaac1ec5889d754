//! Unified data loading service for CLI and TUI
//!
//! Wraps a `DataProvider`, checks what it returns against the aggregation
//! contract and stamps the result as an immutable `Snapshot`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use super::data_provider::{DataProvider, MockDataProvider, SnapshotFileProvider};
use crate::services::Aggregator;
use crate::types::{CloudCostError, DashboardReport, Period, Result, Snapshot};

/// Unified data loading service
#[derive(Clone)]
pub struct DataLoaderService {
    provider: Arc<dyn DataProvider>,
}

impl DataLoaderService {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self { provider }
    }

    /// Snapshot file when given, otherwise mock data after `mock_delay`
    pub fn from_source(data_file: Option<&Path>, mock_delay: Duration) -> Self {
        let provider: Arc<dyn DataProvider> = match data_file {
            Some(path) => Arc::new(SnapshotFileProvider::new(path)),
            None => Arc::new(MockDataProvider::new(mock_delay)),
        };
        Self::new(provider)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetch and verify a snapshot for `period`
    pub async fn load(&self, period: Period) -> Result<Snapshot> {
        info!(provider = self.provider.name(), %period, "Fetching billing snapshot");

        let (providers, series) = self.provider.fetch_snapshot(period).await?;
        Aggregator::validate_providers(&providers)?;
        Aggregator::verify_series(&series)?;

        debug!(
            providers = providers.len(),
            points = series.len(),
            "Snapshot verified"
        );

        Ok(Snapshot {
            period,
            providers,
            series,
            fetched_at: Utc::now(),
        })
    }

    /// Blocking variant for the non-interactive CLI commands
    pub fn load_blocking(&self, period: Period) -> Result<Snapshot> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| CloudCostError::Provider(format!("failed to start runtime: {}", e)))?;
        runtime.block_on(self.load(period))
    }

    /// Load a snapshot and derive its report
    pub fn report_blocking(&self, period: Period) -> Result<(Snapshot, DashboardReport)> {
        let snapshot = self.load_blocking(period)?;
        let report = Aggregator::report(&snapshot);
        Ok((snapshot, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::data_provider::SnapshotFile;
    use crate::types::{CostPoint, ProviderRecord, ProviderStatus};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    /// Provider returning caller-supplied data
    struct FixedProvider {
        providers: Vec<ProviderRecord>,
        series: Vec<CostPoint>,
    }

    #[async_trait]
    impl DataProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_providers(&self) -> Result<Vec<ProviderRecord>> {
            Ok(self.providers.clone())
        }

        async fn fetch_cost_series(&self, _period: Period) -> Result<Vec<CostPoint>> {
            Ok(self.series.clone())
        }
    }

    /// File source whose contents are replaced right after each read
    struct RewrittenFile {
        inner: SnapshotFileProvider,
        next: SnapshotFile,
    }

    impl RewrittenFile {
        fn rewrite(&self) {
            std::fs::write(self.inner.path(), serde_json::to_string(&self.next).unwrap()).unwrap();
        }
    }

    #[async_trait]
    impl DataProvider for RewrittenFile {
        fn name(&self) -> &'static str {
            "rewritten"
        }

        async fn fetch_providers(&self) -> Result<Vec<ProviderRecord>> {
            let providers = self.inner.fetch_providers().await;
            self.rewrite();
            providers
        }

        async fn fetch_cost_series(&self, period: Period) -> Result<Vec<CostPoint>> {
            let series = self.inner.fetch_cost_series(period).await;
            self.rewrite();
            series
        }

        async fn fetch_snapshot(
            &self,
            period: Period,
        ) -> Result<(Vec<ProviderRecord>, Vec<CostPoint>)> {
            let snapshot = self.inner.fetch_snapshot(period).await;
            self.rewrite();
            snapshot
        }
    }

    #[tokio::test]
    async fn test_load_does_not_mix_file_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let first = SnapshotFile {
            providers: MockDataProvider::mock_providers(),
            series: MockDataProvider::monthly_series(),
        };
        std::fs::write(&path, serde_json::to_string(&first).unwrap()).unwrap();

        let provider = RewrittenFile {
            inner: SnapshotFileProvider::new(&path),
            next: SnapshotFile {
                providers: vec![ProviderRecord::new("OCI", 10.0, 0.0, 1, ProviderStatus::Healthy)],
                series: vec![CostPoint::new("Jan", BTreeMap::from([("OCI".to_string(), 10.0)]))],
            },
        };
        let loader = DataLoaderService::new(Arc::new(provider));
        let snapshot = loader.load(Period::Year).await.unwrap();

        assert_eq!(snapshot.providers, first.providers);
        assert_eq!(snapshot.series, first.series);
    }

    #[tokio::test]
    async fn test_load_mock_snapshot() {
        let loader = DataLoaderService::new(Arc::new(MockDataProvider::instant()));
        let snapshot = loader.load(Period::Year).await.unwrap();

        assert_eq!(snapshot.period, Period::Year);
        assert_eq!(snapshot.providers.len(), 3);
        assert_eq!(snapshot.series.len(), 12);
        assert_eq!(loader.provider_name(), "mock");
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_providers() {
        let provider = FixedProvider {
            providers: vec![ProviderRecord::new(
                "AWS",
                -5.0,
                0.0,
                1,
                ProviderStatus::Healthy,
            )],
            series: Vec::new(),
        };
        let loader = DataLoaderService::new(Arc::new(provider));

        let err = loader.load(Period::Month).await.unwrap_err();
        assert!(matches!(err, CloudCostError::Validation(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_inconsistent_series() {
        let mut point = CostPoint::new("Jan", BTreeMap::from([("AWS".to_string(), 10.0)]));
        point.total = 11.0;
        let provider = FixedProvider {
            providers: MockDataProvider::mock_providers(),
            series: vec![point],
        };
        let loader = DataLoaderService::new(Arc::new(provider));

        let err = loader.load(Period::Month).await.unwrap_err();
        assert!(matches!(err, CloudCostError::InconsistentTotal { .. }));
    }

    #[tokio::test]
    async fn test_load_empty_provider_set() {
        let provider = FixedProvider {
            providers: Vec::new(),
            series: Vec::new(),
        };
        let loader = DataLoaderService::new(Arc::new(provider));
        let snapshot = loader.load(Period::Week).await.unwrap();
        let report = Aggregator::report(&snapshot);

        assert_eq!(report.totals.total_cost, 0.0);
        assert!(report.distribution.is_empty());
    }

    #[test]
    fn test_report_blocking_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let file = SnapshotFile {
            providers: MockDataProvider::mock_providers(),
            series: MockDataProvider::monthly_series(),
        };
        std::fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();

        let loader = DataLoaderService::from_source(Some(&path), Duration::ZERO);
        assert_eq!(loader.provider_name(), "file");

        let (snapshot, report) = loader.report_blocking(Period::Quarter).unwrap();
        assert_eq!(snapshot.series.len(), 12);
        assert_eq!(report.totals.total_services, 43);
    }

    #[test]
    fn test_from_source_defaults_to_mock() {
        let loader = DataLoaderService::from_source(None, Duration::ZERO);
        assert_eq!(loader.provider_name(), "mock");
    }
}
