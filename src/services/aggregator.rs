//! Aggregator service for computing cost summaries
//!
//! All operations are pure functions over borrowed input. Sums run in
//! input order so identical input yields bit-identical output.

use std::collections::HashSet;

use chrono::Utc;

use crate::types::{
    CloudCostError, CostPoint, DashboardReport, ProviderCost, ProviderRecord, ProviderShare,
    ProviderStatus, ProviderTrend, Result, Snapshot, Totals, TrendDirection,
};

/// Absolute tolerance when checking a cost point's stored total
pub const TOTAL_TOLERANCE: f64 = 1e-6;

/// Aggregator for computing cost statistics
pub struct Aggregator;

impl Aggregator {
    /// Total cost, total services and cost-weighted change across providers
    pub fn compute_totals(providers: &[ProviderRecord]) -> Totals {
        if providers.is_empty() {
            return Totals::default();
        }

        let mut total_cost = 0.0;
        let mut total_change = 0.0;
        let mut total_services: u64 = 0;

        for provider in providers {
            total_cost += provider.cost;
            total_change += provider.change_amount();
            total_services = total_services.saturating_add(u64::from(provider.service_count));
        }

        // Zero, negative or overflowed totals have no meaningful weighting
        let weighted_change_percent = if has_weight(total_cost) {
            finite_or_zero(total_change / total_cost * 100.0)
        } else {
            0.0
        };

        Totals {
            total_cost,
            total_services,
            weighted_change_percent,
        }
    }

    /// Each provider's share of total cost, in input order
    pub fn compute_distribution(providers: &[ProviderRecord]) -> Vec<ProviderShare> {
        let total_cost: f64 = providers.iter().map(|p| p.cost).sum();

        providers
            .iter()
            .map(|p| ProviderShare {
                name: p.name.clone(),
                share: if has_weight(total_cost) {
                    finite_or_zero(p.cost / total_cost)
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Classify a percent change; exactly zero is `Flat`
    pub fn classify_trend(change_percent: f64) -> TrendDirection {
        if change_percent > 0.0 {
            TrendDirection::Up
        } else if change_percent < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        }
    }

    /// Providers whose status needs attention (anything but healthy)
    pub fn alert_count(providers: &[ProviderRecord]) -> usize {
        providers
            .iter()
            .filter(|p| p.status != ProviderStatus::Healthy)
            .count()
    }

    /// Check every point's stored total against the sum of its costs
    pub fn verify_series(points: &[CostPoint]) -> Result<()> {
        for point in points {
            let expected: f64 = point.costs.values().sum();
            if !point.total.is_finite() || (expected - point.total).abs() > TOTAL_TOLERANCE {
                return Err(CloudCostError::InconsistentTotal {
                    period: point.period.clone(),
                    expected,
                    actual: point.total,
                });
            }
        }
        Ok(())
    }

    /// Per-provider cost summed over a series, ordered by first appearance
    pub fn series_totals(points: &[CostPoint]) -> Vec<ProviderCost> {
        let mut totals: Vec<ProviderCost> = Vec::new();

        for point in points {
            for (name, cost) in &point.costs {
                match totals.iter_mut().find(|t| &t.name == name) {
                    Some(existing) => existing.cost += cost,
                    None => totals.push(ProviderCost {
                        name: name.clone(),
                        cost: *cost,
                    }),
                }
            }
        }

        totals
    }

    /// Reject records that would break the aggregation contract
    pub fn validate_providers(providers: &[ProviderRecord]) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(providers.len());
        let mut total_cost = 0.0;
        let mut total_change = 0.0;

        for provider in providers {
            if !provider.cost.is_finite() || provider.cost < 0.0 {
                return Err(CloudCostError::Validation(format!(
                    "{}: cost must be a non-negative number, got {}",
                    provider.name, provider.cost
                )));
            }
            if !provider.change_percent.is_finite() {
                return Err(CloudCostError::Validation(format!(
                    "{}: change percent must be finite",
                    provider.name
                )));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(CloudCostError::Validation(format!(
                    "duplicate provider '{}'",
                    provider.name
                )));
            }

            total_cost += provider.cost;
            total_change += provider.change_amount();
            if !total_cost.is_finite() || !total_change.is_finite() {
                return Err(CloudCostError::Validation(format!(
                    "{}: totals overflow",
                    provider.name
                )));
            }
        }

        Ok(())
    }

    /// Derive the full dashboard report from a snapshot
    pub fn report(snapshot: &Snapshot) -> DashboardReport {
        let trends = snapshot
            .providers
            .iter()
            .map(|p| ProviderTrend {
                name: p.name.clone(),
                change_percent: p.change_percent,
                direction: Self::classify_trend(p.change_percent),
                status: p.status,
            })
            .collect();

        DashboardReport {
            period: snapshot.period,
            totals: Self::compute_totals(&snapshot.providers),
            distribution: Self::compute_distribution(&snapshot.providers),
            alerts: Self::alert_count(&snapshot.providers),
            trends,
            series_totals: Self::series_totals(&snapshot.series),
            generated_at: Utc::now(),
        }
    }
}

/// A total usable as a divisor: positive and finite
fn has_weight(total_cost: f64) -> bool {
    total_cost.is_finite() && total_cost > 0.0
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Period;
    use std::collections::BTreeMap;

    fn make_provider(name: &str, cost: f64, change: f64, services: u32) -> ProviderRecord {
        ProviderRecord::new(name, cost, change, services, ProviderStatus::Healthy)
    }

    fn dashboard_providers() -> Vec<ProviderRecord> {
        vec![
            ProviderRecord::new("AWS", 2847.32, -12.5, 23, ProviderStatus::Healthy),
            ProviderRecord::new("GCP", 1256.89, 8.2, 12, ProviderStatus::Warning),
            ProviderRecord::new("Azure", 892.45, -3.1, 8, ProviderStatus::Healthy),
        ]
    }

    fn make_point(period: &str, costs: &[(&str, f64)]) -> CostPoint {
        let costs: BTreeMap<String, f64> =
            costs.iter().map(|(n, c)| (n.to_string(), *c)).collect();
        CostPoint::new(period, costs)
    }

    // ========== compute_totals() tests ==========

    #[test]
    fn test_totals_empty() {
        let totals = Aggregator::compute_totals(&[]);
        assert_eq!(totals, Totals::default());
        assert_eq!(totals.total_cost, 0.0);
        assert_eq!(totals.total_services, 0);
        assert_eq!(totals.weighted_change_percent, 0.0);
    }

    #[test]
    fn test_totals_dashboard_scenario() {
        let totals = Aggregator::compute_totals(&dashboard_providers());

        assert!((totals.total_cost - 4996.66).abs() < 1e-6);
        assert_eq!(totals.total_services, 43);

        // (2847.32*-12.5 + 1256.89*8.2 + 892.45*-3.1) / 100 = -280.51597
        let expected = -280.51597 / 4996.66 * 100.0;
        assert!((totals.weighted_change_percent - expected).abs() < 1e-9);
        assert!((totals.weighted_change_percent + 5.614).abs() < 1e-3);
    }

    #[test]
    fn test_totals_order_independent_cost() {
        let mut providers = dashboard_providers();
        let forward = Aggregator::compute_totals(&providers);
        providers.reverse();
        let backward = Aggregator::compute_totals(&providers);

        assert!((forward.total_cost - backward.total_cost).abs() < 1e-9);
        assert_eq!(forward.total_services, backward.total_services);
        assert!(
            (forward.weighted_change_percent - backward.weighted_change_percent).abs() < 1e-9
        );
    }

    #[test]
    fn test_totals_deterministic() {
        let providers = dashboard_providers();
        let a = Aggregator::compute_totals(&providers);
        let b = Aggregator::compute_totals(&providers);
        assert_eq!(a.total_cost.to_bits(), b.total_cost.to_bits());
        assert_eq!(
            a.weighted_change_percent.to_bits(),
            b.weighted_change_percent.to_bits()
        );
    }

    #[test]
    fn test_totals_zero_cost_guards_division() {
        let providers = vec![make_provider("X", 0.0, 50.0, 3), make_provider("Y", 0.0, -20.0, 2)];
        let totals = Aggregator::compute_totals(&providers);

        assert_eq!(totals.total_cost, 0.0);
        assert_eq!(totals.total_services, 5);
        assert_eq!(totals.weighted_change_percent, 0.0);
        assert!(!totals.weighted_change_percent.is_nan());
    }

    #[test]
    fn test_totals_single_provider_change_equals_own() {
        let totals = Aggregator::compute_totals(&[make_provider("X", 100.0, 7.5, 1)]);
        assert!((totals.weighted_change_percent - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_totals_negative_cost_as_is() {
        // Compute operations do not validate; the guard still avoids NaN
        let totals = Aggregator::compute_totals(&[make_provider("X", -10.0, 5.0, 1)]);
        assert_eq!(totals.total_cost, -10.0);
        assert_eq!(totals.weighted_change_percent, 0.0);
    }

    #[test]
    fn test_totals_overflowing_sum_is_not_nan() {
        let providers = vec![
            make_provider("A", 1.5e308, 200.0, 1),
            make_provider("B", 1.5e308, -200.0, 1),
        ];
        let totals = Aggregator::compute_totals(&providers);

        assert!(totals.total_cost.is_infinite());
        assert_eq!(totals.total_services, 2);
        assert_eq!(totals.weighted_change_percent, 0.0);
    }

    #[test]
    fn test_totals_overflowing_change_is_not_nan() {
        // Cost stays finite, cost * change does not
        let totals = Aggregator::compute_totals(&[make_provider("A", 1e308, 500.0, 1)]);
        assert!(totals.total_cost.is_finite());
        assert_eq!(totals.weighted_change_percent, 0.0);
    }

    #[test]
    fn test_totals_infinite_cost_as_is() {
        let totals = Aggregator::compute_totals(&[make_provider("A", f64::INFINITY, 0.0, 1)]);
        assert_eq!(totals.weighted_change_percent, 0.0);
    }

    // ========== compute_distribution() tests ==========

    #[test]
    fn test_distribution_infinite_total_is_zero_not_nan() {
        let providers = vec![
            make_provider("A", f64::INFINITY, 0.0, 1),
            make_provider("B", 10.0, 0.0, 1),
        ];
        let shares = Aggregator::compute_distribution(&providers);
        assert!(shares.iter().all(|s| s.share == 0.0));

        let overflow = vec![make_provider("A", 1.5e308, 0.0, 1), make_provider("B", 1.5e308, 0.0, 1)];
        let shares = Aggregator::compute_distribution(&overflow);
        assert!(shares.iter().all(|s| !s.share.is_nan()));
    }

    #[test]
    fn test_distribution_empty() {
        assert!(Aggregator::compute_distribution(&[]).is_empty());
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let shares = Aggregator::compute_distribution(&dashboard_providers());
        let sum: f64 = shares.iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_preserves_order() {
        let shares = Aggregator::compute_distribution(&dashboard_providers());
        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["AWS", "GCP", "Azure"]);
        assert!((shares[0].share - 2847.32 / 4996.66).abs() < 1e-12);
    }

    #[test]
    fn test_distribution_zero_total_is_zero_not_nan() {
        let providers = vec![make_provider("X", 0.0, 0.0, 0), make_provider("Y", 0.0, 1.0, 0)];
        let shares = Aggregator::compute_distribution(&providers);
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|s| s.share == 0.0));
    }

    #[test]
    fn test_distribution_single_provider() {
        let shares = Aggregator::compute_distribution(&[make_provider("X", 100.0, 0.0, 1)]);
        assert_eq!(
            shares,
            vec![ProviderShare {
                name: "X".to_string(),
                share: 1.0
            }]
        );
        assert_eq!(Aggregator::classify_trend(0.0), TrendDirection::Flat);
    }

    // ========== classify_trend() tests ==========

    #[test]
    fn test_classify_trend() {
        assert_eq!(Aggregator::classify_trend(5.0), TrendDirection::Up);
        assert_eq!(Aggregator::classify_trend(-3.0), TrendDirection::Down);
        assert_eq!(Aggregator::classify_trend(0.0), TrendDirection::Flat);
        assert_eq!(Aggregator::classify_trend(-0.0), TrendDirection::Flat);
        assert_eq!(Aggregator::classify_trend(1e-12), TrendDirection::Up);
    }

    // ========== verify_series() tests ==========

    #[test]
    fn test_verify_series_accepts_consistent() {
        let points = vec![
            make_point("Jan", &[("AWS", 2400.0), ("GCP", 1200.0), ("Azure", 800.0)]),
            make_point("Feb", &[("AWS", 2600.0), ("GCP", 1100.0)]),
        ];
        assert!(Aggregator::verify_series(&points).is_ok());
        assert!(Aggregator::verify_series(&[]).is_ok());
    }

    #[test]
    fn test_verify_series_rejects_mismatch() {
        let mut point = make_point("Mar", &[("AWS", 2800.0), ("GCP", 1300.0)]);
        point.total = 5000.0;

        let err = Aggregator::verify_series(&[point]).unwrap_err();
        match err {
            CloudCostError::InconsistentTotal {
                period,
                expected,
                actual,
            } => {
                assert_eq!(period, "Mar");
                assert!((expected - 4100.0).abs() < 1e-9);
                assert!((actual - 5000.0).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_series_rejects_nan_total() {
        let mut point = make_point("Apr", &[("AWS", 1.0)]);
        point.total = f64::NAN;
        assert!(Aggregator::verify_series(&[point]).is_err());
    }

    // ========== series_totals() tests ==========

    #[test]
    fn test_series_totals_sums_per_provider() {
        let points = vec![
            make_point("Jan", &[("AWS", 10.0), ("GCP", 5.0)]),
            make_point("Feb", &[("AWS", 20.0), ("Azure", 1.0)]),
        ];
        let totals = Aggregator::series_totals(&points);

        assert_eq!(totals.len(), 3);
        let aws = totals.iter().find(|t| t.name == "AWS").unwrap();
        assert!((aws.cost - 30.0).abs() < 1e-9);
        // Azure first appears in the second point
        assert_eq!(totals.last().unwrap().name, "Azure");
    }

    // ========== validate_providers() tests ==========

    #[test]
    fn test_validate_accepts_dashboard_data() {
        assert!(Aggregator::validate_providers(&dashboard_providers()).is_ok());
        assert!(Aggregator::validate_providers(&[]).is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_cost() {
        let err = Aggregator::validate_providers(&[make_provider("X", -1.0, 0.0, 0)]).unwrap_err();
        assert!(matches!(err, CloudCostError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(Aggregator::validate_providers(&[make_provider("X", f64::NAN, 0.0, 0)]).is_err());
        assert!(
            Aggregator::validate_providers(&[make_provider("X", 1.0, f64::INFINITY, 0)]).is_err()
        );
    }

    #[test]
    fn test_validate_rejects_overflowing_totals() {
        let providers = vec![
            make_provider("A", 1.5e308, 200.0, 1),
            make_provider("B", 1.5e308, -200.0, 1),
        ];
        let err = Aggregator::validate_providers(&providers).unwrap_err();
        assert!(err.to_string().contains("A: totals overflow"));

        let change_only = vec![make_provider("A", 1e308, 500.0, 1)];
        assert!(Aggregator::validate_providers(&change_only).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let providers = vec![make_provider("AWS", 1.0, 0.0, 0), make_provider("AWS", 2.0, 0.0, 0)];
        let err = Aggregator::validate_providers(&providers).unwrap_err();
        assert!(err.to_string().contains("duplicate provider 'AWS'"));
    }

    // ========== report() tests ==========

    #[test]
    fn test_report_bundles_aggregates() {
        let snapshot = Snapshot {
            period: Period::Year,
            providers: dashboard_providers(),
            series: vec![make_point("Jan", &[("AWS", 2400.0), ("GCP", 1200.0)])],
            fetched_at: Utc::now(),
        };
        let report = Aggregator::report(&snapshot);

        assert_eq!(report.period, Period::Year);
        assert_eq!(report.totals.total_services, 43);
        assert_eq!(report.distribution.len(), 3);
        assert_eq!(report.trends[0].direction, TrendDirection::Down);
        assert_eq!(report.trends[1].direction, TrendDirection::Up);
        assert_eq!(report.trends[1].status, ProviderStatus::Warning);
        assert_eq!(report.series_totals.len(), 2);
        assert_eq!(report.alerts, 1);
    }

    #[test]
    fn test_alert_count() {
        let mut providers = dashboard_providers();
        assert_eq!(Aggregator::alert_count(&providers), 1);
        providers[0].status = ProviderStatus::Critical;
        assert_eq!(Aggregator::alert_count(&providers), 2);
        assert_eq!(Aggregator::alert_count(&[]), 0);
    }
}
