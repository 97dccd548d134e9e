use std::collections::HashMap;

use crate::models::{
    BranchConfig, BranchPeriodRecord, BranchSummaryRow, CoverageWindow, DerivedBranchMetrics,
    Period,
};

/// Branch excluded from KPI computation by name match.
pub const EXCLUDED_BRANCH: &str = "Goodfellas Home";

/// Months actually present in the snapshot, inclusive on both ends.
pub const DATA_COVERAGE: CoverageWindow = CoverageWindow {
    first: Period {
        year: 2018,
        month: 6,
    },
    last: Period {
        year: 2025,
        month: 3,
    },
};

/// Display-safe percentage: a zero denominator yields 0 rather than an error.
fn share(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

pub fn compute_branch_metrics(
    record: &BranchPeriodRecord,
    config: &BranchConfig,
) -> DerivedBranchMetrics {
    let pct_lost = share(record.members_lost, record.total_members);
    let pct_semi_lost = share(record.members_semi_lost, record.total_members);
    let pct_new = share(record.members_new, record.total_members);
    let pct_returning = share(record.members_returning, record.total_members);

    let pct_member_cut = share(record.member_cut, record.total_cut);
    let pct_non_member_cut = share(record.non_member_cut, record.total_cut);
    let pct_acquisition = share(record.new_members, record.non_member_cut);
    let pct_target = share(record.total_cut, config.cut_target);

    let member_ratio_tenths = ((pct_member_cut / 10.0).round() as i64).clamp(0, 10);

    DerivedBranchMetrics {
        branch_name: record.branch_name.clone(),
        pct_lost,
        pct_semi_lost,
        pct_new,
        pct_returning,
        pct_member_cut,
        pct_non_member_cut,
        pct_acquisition,
        pct_target,
        cut_per_chair: record.cut_per_chair,
        member_ratio_tenths,
        non_member_ratio_tenths: 10 - member_ratio_tenths,
        active_member_pct: pct_new + pct_returning,
    }
}

pub fn select_period(records: &[BranchPeriodRecord], period: Period) -> Vec<BranchPeriodRecord> {
    records
        .iter()
        .filter(|record| record.year == period.year && record.month == period.month)
        .cloned()
        .collect()
}

/// Compute metrics for every branch in the selected month, skipping the
/// excluded branch and any branch missing from the configuration table.
/// Nothing here fails; skipped branches surface as empty targets in the
/// summary join.
pub fn metrics_for_period(
    records: &[BranchPeriodRecord],
    config: &HashMap<String, BranchConfig>,
) -> Vec<DerivedBranchMetrics> {
    records
        .iter()
        .filter(|record| record.branch_name != EXCLUDED_BRANCH)
        .filter_map(|record| {
            config
                .get(&record.branch_name)
                .map(|branch_config| compute_branch_metrics(record, branch_config))
        })
        .collect()
}

/// Left join of the raw month rows with their derived target attainment:
/// every raw row is kept even when no metric was computed for it.
pub fn summarize_period(
    records: &[BranchPeriodRecord],
    metrics: &[DerivedBranchMetrics],
) -> Vec<BranchSummaryRow> {
    records
        .iter()
        .map(|record| BranchSummaryRow {
            record: record.clone(),
            target_pct: metrics
                .iter()
                .find(|metric| metric.branch_name == record.branch_name)
                .map(|metric| metric.pct_target),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(branch: &str) -> BranchPeriodRecord {
        BranchPeriodRecord {
            branch_name: branch.to_string(),
            year: 2024,
            month: 6,
            total_cut: 800,
            member_cut: 440,
            non_member_cut: 360,
            new_members: 36,
            total_members: 500,
            members_lost: 60,
            members_semi_lost: 90,
            members_new: 125,
            members_returning: 225,
            cut_per_chair: 160.0,
        }
    }

    fn sample_config() -> BranchConfig {
        BranchConfig {
            cut_target: 900,
            chairs: 5,
        }
    }

    #[test]
    fn zero_members_yield_zero_bucket_percentages() {
        let mut record = sample_record("Intro");
        record.total_members = 0;
        record.members_lost = 0;
        record.members_semi_lost = 0;
        record.members_new = 0;
        record.members_returning = 0;

        let metrics = compute_branch_metrics(&record, &sample_config());
        assert_eq!(metrics.pct_lost, 0.0);
        assert_eq!(metrics.pct_semi_lost, 0.0);
        assert_eq!(metrics.pct_new, 0.0);
        assert_eq!(metrics.pct_returning, 0.0);
    }

    #[test]
    fn bucket_percentages_sum_to_hundred_when_buckets_reconcile() {
        let record = sample_record("Intro");
        assert!(record.buckets_reconcile());

        let metrics = compute_branch_metrics(&record, &sample_config());
        let sum = metrics.pct_lost + metrics.pct_semi_lost + metrics.pct_new + metrics.pct_returning;
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn target_attainment_over_one_hundred() {
        let mut record = sample_record("Intro");
        record.total_cut = 1000;

        let metrics = compute_branch_metrics(&record, &sample_config());
        assert!((metrics.pct_target - 111.1).abs() < 0.02);
    }

    #[test]
    fn active_member_share_is_new_plus_returning() {
        let record = sample_record("Intro");
        let metrics = compute_branch_metrics(&record, &sample_config());
        assert!((metrics.active_member_pct - (metrics.pct_new + metrics.pct_returning)).abs() < 1e-9);
        assert!((metrics.active_member_pct - 70.0).abs() < 1e-9);
    }

    #[test]
    fn member_ratio_tenths_split_sums_to_ten() {
        let metrics = compute_branch_metrics(&sample_record("Intro"), &sample_config());
        assert_eq!(metrics.member_ratio_tenths, 6);
        assert_eq!(metrics.non_member_ratio_tenths, 4);
        assert_eq!(metrics.member_ratio_tenths + metrics.non_member_ratio_tenths, 10);
    }

    #[test]
    fn member_ratio_clamps_when_member_cut_exceeds_total() {
        let mut record = sample_record("Intro");
        record.member_cut = 1200;
        record.total_cut = 800;

        let metrics = compute_branch_metrics(&record, &sample_config());
        assert_eq!(metrics.member_ratio_tenths, 10);
        assert_eq!(metrics.non_member_ratio_tenths, 0);
    }

    #[test]
    fn coverage_window_bounds_are_inclusive() {
        let may_2018 = Period {
            year: 2018,
            month: 5,
        };
        let june_2018 = Period {
            year: 2018,
            month: 6,
        };
        let december_2024 = Period {
            year: 2024,
            month: 12,
        };
        let march_2025 = Period {
            year: 2025,
            month: 3,
        };
        let april_2025 = Period {
            year: 2025,
            month: 4,
        };

        assert!(!DATA_COVERAGE.contains(may_2018));
        assert!(DATA_COVERAGE.contains(june_2018));
        assert!(DATA_COVERAGE.contains(december_2024));
        assert!(DATA_COVERAGE.contains(march_2025));
        assert!(!DATA_COVERAGE.contains(april_2025));
    }

    #[test]
    fn excluded_branch_gets_no_metrics_but_stays_in_summary() {
        let records = vec![sample_record("Intro"), sample_record(EXCLUDED_BRANCH)];
        let mut config = HashMap::new();
        config.insert("Intro".to_string(), sample_config());

        let metrics = metrics_for_period(&records, &config);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].branch_name, "Intro");

        let summary = summarize_period(&records, &metrics);
        assert_eq!(summary.len(), 2);
        assert!(summary[0].target_pct.is_some());
        assert!(summary[1].target_pct.is_none());
    }

    #[test]
    fn select_period_keeps_only_matching_rows() {
        let mut other_month = sample_record("Intro");
        other_month.month = 7;
        let records = vec![sample_record("Intro"), other_month];

        let selected = select_period(
            &records,
            Period {
                year: 2024,
                month: 6,
            },
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].month, 6);
    }
}
