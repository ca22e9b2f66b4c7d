#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate analytics for the admin dashboard.
//!
//! [`AnalyticsAggregator`] answers metric, trend, distribution and heat zone
//! queries over a [`civic_report_store::ReportStore`], memoizing each answer
//! per filter set in a TTL-bounded [`ResultCache`]. The computations
//! themselves live in [`metrics`] as pure functions over report slices.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod period;

use civic_report_analytics_models::InvalidGranularityError;
use civic_report_store::StoreError;
use thiserror::Error;

pub use aggregator::AnalyticsAggregator;
pub use cache::{Clock, DEFAULT_CACHE_TTL_SECS, ManualClock, ResultCache, SystemClock};
pub use config::AnalyticsConfig;
pub use period::{bucket_key, bucket_key_for_period};

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The report store failed to answer a query.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A trend period other than `daily`, `weekly` or `monthly`.
    #[error("Invalid argument: {0}")]
    InvalidGranularity(#[from] InvalidGranularityError),

    /// Configuration could not be loaded or failed validation.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}
