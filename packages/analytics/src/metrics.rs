//! Aggregate computations over an already filtered report set.
//!
//! These are pure functions: the aggregator fetches the reports, calls one
//! of these, and caches the result.

use std::collections::BTreeMap;

use civic_report_analytics_models::{
    CategoryDistribution, HeatZone, HeatZoneParams, KeyMetrics, SeverityTrendPoint,
    TimeGranularity, TrendPoint,
};
use civic_report_spatial::cluster_reports;
use civic_report_store_models::ReportRef;

use crate::period::bucket_key;

/// Total count, resolution rate and mean resolution time.
///
/// The rate is 0.0 for an empty set. The mean resolution time is `None`
/// when no report is fixed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn key_metrics(reports: &[ReportRef]) -> KeyMetrics {
    let total = reports.len();
    let fixed: Vec<&ReportRef> = reports.iter().filter(|r| r.status.is_resolved()).collect();

    let resolution_rate = if total == 0 {
        0.0
    } else {
        (fixed.len() as f64 * 100.0) / total as f64
    };

    let average_resolution_time = if fixed.is_empty() {
        None
    } else {
        let sum: f64 = fixed.iter().map(|r| resolution_seconds(r)).sum();
        Some(sum / fixed.len() as f64)
    };

    KeyMetrics {
        total_reports: total as u64,
        resolution_rate,
        average_resolution_time,
    }
}

fn resolution_seconds(report: &ReportRef) -> f64 {
    (report.updated_at - report.created_at).as_seconds_f64()
}

/// Report counts per calendar bucket of the creation time, ascending by
/// bucket key. Counts sum to `reports.len()`.
#[must_use]
pub fn trend_data(reports: &[ReportRef], granularity: TimeGranularity) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for report in reports {
        *buckets
            .entry(bucket_key(&report.created_at, granularity))
            .or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|(period, count)| TrendPoint { period, count })
        .collect()
}

/// Report counts per category. Counts sum to `reports.len()`.
#[must_use]
pub fn category_distribution(reports: &[ReportRef]) -> CategoryDistribution {
    let mut counts = CategoryDistribution::new();
    for report in reports {
        *counts.entry(report.category).or_default() += 1;
    }
    counts
}

/// Mean severity and count per calendar bucket, ascending by bucket key.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn severity_trends(
    reports: &[ReportRef],
    granularity: TimeGranularity,
) -> Vec<SeverityTrendPoint> {
    // bucket -> (severity sum, count)
    let mut buckets: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for report in reports {
        let entry = buckets
            .entry(bucket_key(&report.created_at, granularity))
            .or_default();
        entry.0 += u64::from(report.severity.value());
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(period, (sum, count))| SeverityTrendPoint {
            period,
            average_severity: sum as f64 / count as f64,
            report_count: count,
        })
        .collect()
}

/// Clusters of unresolved, non-archived reports with at least
/// `params.min_reports` members, largest first.
///
/// Zones of equal size keep the order their clusters were created in.
#[must_use]
pub fn heat_zones(reports: &[ReportRef], params: &HeatZoneParams) -> Vec<HeatZone> {
    let open = reports.iter().filter(|r| !r.archived && r.is_unresolved());
    let clusters = cluster_reports(open, params.proximity_meters);

    let mut zones: Vec<HeatZone> = clusters
        .into_iter()
        .filter(|c| c.count >= params.min_reports)
        .map(|c| HeatZone {
            latitude: c.latitude,
            longitude: c.longitude,
            report_count: c.count as u64,
            report_ids: c.report_ids,
        })
        .collect();

    zones.sort_by(|a, b| b.report_count.cmp(&a.report_count));
    zones
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone as _, Utc};
    use civic_report_issue_models::{IssueCategory, ReportStatus, Severity};
    use uuid::Uuid;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn report(created_at: DateTime<Utc>, severity: u8, status: ReportStatus) -> ReportRef {
        ReportRef {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            latitude: 40.0,
            longitude: -111.0,
            category: IssueCategory::Pothole,
            severity: Severity::from_value(severity).unwrap(),
            status,
            created_at,
            updated_at: created_at,
            archived: false,
            image_hash: None,
        }
    }

    fn located(lat: f64, lon: f64) -> ReportRef {
        let mut r = report(at(2024, 4, 1), 5, ReportStatus::Reported);
        r.latitude = lat;
        r.longitude = lon;
        r
    }

    #[test]
    fn resolution_rate_counts_fixed_reports() {
        let reports: Vec<ReportRef> = (0..10)
            .map(|i| {
                let status = if i < 3 {
                    ReportStatus::Fixed
                } else {
                    ReportStatus::InProgress
                };
                report(at(2024, 1, 1), 5, status)
            })
            .collect();

        let metrics = key_metrics(&reports);
        assert_eq!(metrics.total_reports, 10);
        assert!((metrics.resolution_rate - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_set_has_identity_metrics() {
        let metrics = key_metrics(&[]);
        assert_eq!(metrics.total_reports, 0);
        assert!(metrics.resolution_rate.abs() < f64::EPSILON);
        assert!(metrics.average_resolution_time.is_none());
    }

    #[test]
    fn average_resolution_time_uses_fixed_reports_only() {
        let mut quick = report(at(2024, 1, 1), 5, ReportStatus::Fixed);
        quick.updated_at = quick.created_at + Duration::hours(1);
        let mut slow = report(at(2024, 1, 1), 5, ReportStatus::Fixed);
        slow.updated_at = slow.created_at + Duration::hours(3);
        let mut open = report(at(2024, 1, 1), 5, ReportStatus::Reported);
        open.updated_at = open.created_at + Duration::days(30);

        let metrics = key_metrics(&[quick, slow, open]);
        assert_eq!(metrics.average_resolution_time, Some(7_200.0));
    }

    #[test]
    fn average_resolution_time_keeps_sub_millisecond_precision() {
        let mut fixed = report(at(2024, 1, 1), 5, ReportStatus::Fixed);
        fixed.updated_at = fixed.created_at + Duration::microseconds(1_500_250);

        let average = key_metrics(&[fixed]).average_resolution_time.unwrap();
        assert!((average - 1.500_25).abs() < 1e-9, "got {average}");
    }

    #[test]
    fn no_fixed_reports_means_no_average() {
        let metrics = key_metrics(&[report(at(2024, 1, 1), 5, ReportStatus::Reported)]);
        assert!(metrics.resolution_rate.abs() < f64::EPSILON);
        assert!(metrics.average_resolution_time.is_none());
    }

    #[test]
    fn trend_counts_sum_to_total() {
        let reports: Vec<ReportRef> = (0..137)
            .map(|i| report(at(2023, 12, 1) + Duration::hours(i * 13), 5, ReportStatus::Reported))
            .collect();

        for granularity in [
            TimeGranularity::Daily,
            TimeGranularity::Weekly,
            TimeGranularity::Monthly,
        ] {
            let trend = trend_data(&reports, granularity);
            let sum: u64 = trend.iter().map(|p| p.count).sum();
            assert_eq!(sum, 137, "{granularity} trend lost reports");
            assert!(trend.windows(2).all(|w| w[0].period < w[1].period));
        }
    }

    #[test]
    fn monthly_trend_groups_by_month() {
        let reports = vec![
            report(at(2024, 2, 28), 5, ReportStatus::Reported),
            report(at(2024, 1, 3), 5, ReportStatus::Reported),
            report(at(2024, 2, 1), 5, ReportStatus::Reported),
        ];
        let trend = trend_data(&reports, TimeGranularity::Monthly);
        assert_eq!(
            trend,
            vec![
                TrendPoint {
                    period: "2024-01".to_string(),
                    count: 1
                },
                TrendPoint {
                    period: "2024-02".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn empty_trend_is_empty() {
        assert!(trend_data(&[], TimeGranularity::Daily).is_empty());
        assert!(severity_trends(&[], TimeGranularity::Weekly).is_empty());
    }

    #[test]
    fn category_counts_sum_to_total() {
        let mut leak = report(at(2024, 1, 1), 5, ReportStatus::Reported);
        leak.category = IssueCategory::WaterLeak;
        let reports = vec![
            report(at(2024, 1, 1), 5, ReportStatus::Reported),
            leak,
            report(at(2024, 1, 2), 5, ReportStatus::Fixed),
        ];

        let dist = category_distribution(&reports);
        assert_eq!(dist.get(&IssueCategory::Pothole), Some(&2));
        assert_eq!(dist.get(&IssueCategory::WaterLeak), Some(&1));
        assert_eq!(dist.get(&IssueCategory::Vandalism), None);
        assert_eq!(dist.values().sum::<u64>(), 3);
    }

    #[test]
    fn severity_average_per_bucket() {
        let reports = vec![
            report(at(2024, 5, 6), 2, ReportStatus::Reported),
            report(at(2024, 5, 7), 8, ReportStatus::Fixed),
            report(at(2024, 5, 8), 5, ReportStatus::Reported),
        ];
        let trend = severity_trends(&reports, TimeGranularity::Weekly);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].period, "2024-W19");
        assert!((trend[0].average_severity - 5.0).abs() < f64::EPSILON);
        assert_eq!(trend[0].report_count, 3);
    }

    #[test]
    fn heat_zone_threshold_is_inclusive() {
        let params = HeatZoneParams {
            proximity_meters: 200.0,
            min_reports: 3,
        };

        let three: Vec<ReportRef> = (0..3).map(|_| located(40.0, -111.0)).collect();
        assert_eq!(heat_zones(&three, &params).len(), 1);

        let two: Vec<ReportRef> = (0..2).map(|_| located(40.0, -111.0)).collect();
        assert!(heat_zones(&two, &params).is_empty());
    }

    #[test]
    fn heat_zones_skip_fixed_and_archived() {
        let params = HeatZoneParams::default();
        let mut fixed = located(40.0, -111.0);
        fixed.status = ReportStatus::Fixed;
        let mut archived = located(40.0, -111.0);
        archived.archived = true;
        let reports = vec![located(40.0, -111.0), located(40.0, -111.0), fixed, archived];

        assert!(heat_zones(&reports, &params).is_empty());
    }

    #[test]
    fn heat_zones_sorted_largest_first() {
        let params = HeatZoneParams {
            proximity_meters: 200.0,
            min_reports: 2,
        };
        let mut reports = Vec::new();
        // Small zone created first, large zone second, medium third.
        reports.extend((0..2).map(|_| located(10.0, 10.0)));
        reports.extend((0..5).map(|_| located(20.0, 20.0)));
        reports.extend((0..3).map(|_| located(30.0, 30.0)));
        reports.push(located(50.0, 50.0));

        let zones = heat_zones(&reports, &params);
        let counts: Vec<u64> = zones.iter().map(|z| z.report_count).collect();
        assert_eq!(counts, vec![5, 3, 2]);
        assert!(zones.windows(2).all(|w| w[0].report_count >= w[1].report_count));
        assert!((zones[0].latitude - 20.0).abs() < 1e-9);
    }

    #[test]
    fn equal_zones_keep_creation_order() {
        let params = HeatZoneParams {
            proximity_meters: 200.0,
            min_reports: 2,
        };
        let mut reports = Vec::new();
        reports.extend((0..2).map(|_| located(1.0, 1.0)));
        reports.extend((0..2).map(|_| located(2.0, 2.0)));

        let zones = heat_zones(&reports, &params);
        assert_eq!(zones.len(), 2);
        assert!((zones[0].latitude - 1.0).abs() < 1e-9);
        assert!((zones[1].latitude - 2.0).abs() < 1e-9);
    }
}
