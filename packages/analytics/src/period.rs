//! Calendar bucketing for trend series.
//!
//! Keys are fixed-width and zero-padded, so sorting them as strings sorts
//! them chronologically.

use chrono::{DateTime, Datelike as _, Utc};
use civic_report_analytics_models::TimeGranularity;

use crate::AnalyticsError;

/// Returns the bucket key for `timestamp`.
///
/// - daily: `YYYY-MM-DD`
/// - weekly: `YYYY-Www`, using the ISO-8601 week-numbering year, so the
///   last days of December can land in week 1 of the next year
/// - monthly: `YYYY-MM`
#[must_use]
pub fn bucket_key(timestamp: &DateTime<Utc>, granularity: TimeGranularity) -> String {
    match granularity {
        TimeGranularity::Daily => format!(
            "{:04}-{:02}-{:02}",
            timestamp.year(),
            timestamp.month(),
            timestamp.day()
        ),
        TimeGranularity::Weekly => {
            let week = timestamp.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        TimeGranularity::Monthly => format!("{:04}-{:02}", timestamp.year(), timestamp.month()),
    }
}

/// Like [`bucket_key`], taking the period identifier as a string.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidGranularity`] unless `period` is
/// `daily`, `weekly` or `monthly`.
pub fn bucket_key_for_period(
    timestamp: &DateTime<Utc>,
    period: &str,
) -> Result<String, AnalyticsError> {
    let granularity: TimeGranularity = period.parse()?;
    Ok(bucket_key(timestamp, granularity))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone as _};

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 15, 45, 0).unwrap()
    }

    #[test]
    fn daily_and_monthly_formats() {
        let ts = at(2024, 3, 7);
        assert_eq!(bucket_key(&ts, TimeGranularity::Daily), "2024-03-07");
        assert_eq!(bucket_key(&ts, TimeGranularity::Monthly), "2024-03");
    }

    #[test]
    fn weekly_uses_iso_week_numbering() {
        // 2024-01-01 is a Monday.
        assert_eq!(bucket_key(&at(2024, 1, 1), TimeGranularity::Weekly), "2024-W01");
        // 2021-01-01 is a Friday, still in the last ISO week of 2020.
        assert_eq!(bucket_key(&at(2021, 1, 1), TimeGranularity::Weekly), "2020-W53");
        // 2024-12-30 is the Monday of ISO week 1 of 2025.
        assert_eq!(bucket_key(&at(2024, 12, 30), TimeGranularity::Weekly), "2025-W01");
        assert_eq!(bucket_key(&at(2024, 2, 14), TimeGranularity::Weekly), "2024-W07");
    }

    #[test]
    fn weekly_boundary_is_monday() {
        // Sunday 2024-03-10 and Monday 2024-03-11.
        assert_eq!(bucket_key(&at(2024, 3, 10), TimeGranularity::Weekly), "2024-W10");
        assert_eq!(bucket_key(&at(2024, 3, 11), TimeGranularity::Weekly), "2024-W11");
    }

    #[test]
    fn string_order_matches_time_order() {
        let start = at(2019, 11, 20);
        for granularity in [
            TimeGranularity::Daily,
            TimeGranularity::Weekly,
            TimeGranularity::Monthly,
        ] {
            let keys: Vec<String> = (0..900)
                .map(|i| bucket_key(&(start + Duration::days(i)), granularity))
                .collect();
            assert!(
                keys.windows(2).all(|w| w[0] <= w[1]),
                "{granularity} keys not monotonic"
            );
        }
    }

    #[test]
    fn string_period_rejects_unknown_values() {
        let ts = at(2024, 3, 7);
        assert_eq!(bucket_key_for_period(&ts, "weekly").unwrap(), "2024-W10");
        assert!(matches!(
            bucket_key_for_period(&ts, "hourly"),
            Err(AnalyticsError::InvalidGranularity(_))
        ));
    }
}
