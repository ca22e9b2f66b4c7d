//! Dashboard queries over a report store, memoized per filter set.

use std::sync::Arc;

use chrono::TimeDelta;
use civic_report_analytics_models::{
    CategoryDistribution, HeatZone, HeatZoneParams, KeyMetrics, SeverityTrendPoint,
    TimeGranularity, TrendPoint,
};
use civic_report_store::ReportStore;
use civic_report_store_models::{ReportQuery, ReportRef};
use serde::Serialize;

use crate::AnalyticsError;
use crate::cache::{Clock, DEFAULT_CACHE_TTL_SECS, ResultCache, SystemClock, ttl_from_secs};
use crate::config::AnalyticsConfig;
use crate::metrics;

#[derive(Serialize)]
struct BucketedParams<'a> {
    query: &'a ReportQuery,
    granularity: TimeGranularity,
}

#[derive(Serialize)]
struct HeatZoneCacheParams<'a> {
    query: &'a ReportQuery,
    params: HeatZoneParams,
}

/// Answers dashboard analytics queries.
///
/// Each operation fetches the filtered report set from the store, runs the
/// matching function from [`crate::metrics`] and caches the result under
/// its filter parameters. All caches share one clock and one TTL.
pub struct AnalyticsAggregator {
    store: Arc<dyn ReportStore>,
    key_metrics: ResultCache<KeyMetrics>,
    trends: ResultCache<Vec<TrendPoint>>,
    categories: ResultCache<CategoryDistribution>,
    severity: ResultCache<Vec<SeverityTrendPoint>>,
    heat_zones: ResultCache<Vec<HeatZone>>,
}

impl AnalyticsAggregator {
    /// Creates an aggregator with the default TTL and the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self::with_clock(
            store,
            ttl_from_secs(DEFAULT_CACHE_TTL_SECS),
            Arc::new(SystemClock),
        )
    }

    /// Creates an aggregator whose cache entries live for `ttl` as measured
    /// by `clock`.
    #[must_use]
    pub fn with_clock(store: Arc<dyn ReportStore>, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            key_metrics: ResultCache::new(ttl, clock.clone()),
            trends: ResultCache::new(ttl, clock.clone()),
            categories: ResultCache::new(ttl, clock.clone()),
            severity: ResultCache::new(ttl, clock.clone()),
            heat_zones: ResultCache::new(ttl, clock),
        }
    }

    /// Creates an aggregator using the cache TTL from `config`.
    #[must_use]
    pub fn from_config(store: Arc<dyn ReportStore>, config: &AnalyticsConfig) -> Self {
        Self::with_clock(store, config.cache_ttl(), Arc::new(SystemClock))
    }

    fn fetch(&self, query: &ReportQuery) -> Result<Vec<ReportRef>, AnalyticsError> {
        let reports = self.store.query(query)?;
        log::debug!("Aggregating over {} reports", reports.len());
        Ok(reports)
    }

    /// Total reports, resolution rate and mean resolution time.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the store query fails.
    pub fn get_key_metrics(&self, query: &ReportQuery) -> Result<KeyMetrics, AnalyticsError> {
        self.key_metrics
            .try_get_or_compute(query, || Ok(metrics::key_metrics(&self.fetch(query)?)))
    }

    /// Report counts per calendar bucket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the store query fails.
    pub fn get_trend_data(
        &self,
        query: &ReportQuery,
        granularity: TimeGranularity,
    ) -> Result<Vec<TrendPoint>, AnalyticsError> {
        let params = BucketedParams { query, granularity };
        self.trends.try_get_or_compute(&params, || {
            Ok(metrics::trend_data(&self.fetch(query)?, granularity))
        })
    }

    /// Report counts per category.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the store query fails.
    pub fn get_category_distribution(
        &self,
        query: &ReportQuery,
    ) -> Result<CategoryDistribution, AnalyticsError> {
        self.categories.try_get_or_compute(query, || {
            Ok(metrics::category_distribution(&self.fetch(query)?))
        })
    }

    /// Mean severity and count per calendar bucket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the store query fails.
    pub fn get_severity_trends(
        &self,
        query: &ReportQuery,
        granularity: TimeGranularity,
    ) -> Result<Vec<SeverityTrendPoint>, AnalyticsError> {
        let params = BucketedParams { query, granularity };
        self.severity.try_get_or_compute(&params, || {
            Ok(metrics::severity_trends(&self.fetch(query)?, granularity))
        })
    }

    /// Clusters of open reports large enough to count as heat zones,
    /// largest first.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the store query fails.
    pub fn get_heat_zones(
        &self,
        query: &ReportQuery,
        params: HeatZoneParams,
    ) -> Result<Vec<HeatZone>, AnalyticsError> {
        let key = HeatZoneCacheParams { query, params };
        self.heat_zones.try_get_or_compute(&key, || {
            Ok(metrics::heat_zones(&self.fetch(query)?, &params))
        })
    }

    /// Drops every cached result.
    pub fn clear_cache(&self) {
        self.key_metrics.clear();
        self.trends.clear();
        self.categories.clear();
        self.severity.clear();
        self.heat_zones.clear();
    }
}
