#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report query capability consumed by the duplicate detector and the
//! analytics aggregator.
//!
//! The relational database that owns reports lives outside this workspace.
//! [`ReportStore`] is the seam it plugs into. [`memory::MemoryReportStore`]
//! is an in-memory implementation backed by an R-tree, used by the CLI and
//! by tests.

pub mod memory;

use civic_report_store_models::{ReportQuery, ReportRef};

pub use memory::MemoryReportStore;

/// Errors that can occur while reading reports.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading a report dump from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A report dump was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing store rejected the query.
    #[error("Query error: {message}")]
    Query {
        /// Description of what went wrong.
        message: String,
    },
}

/// Read-only access to filtered report sets.
///
/// Implementations must return reports in a stable order for a given
/// underlying data set; duplicate tie-breaking and greedy clustering both
/// depend on it.
pub trait ReportStore: Send + Sync {
    /// Returns every report matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot answer the query.
    fn query(&self, query: &ReportQuery) -> Result<Vec<ReportRef>, StoreError>;
}

impl<T: ReportStore + ?Sized> ReportStore for std::sync::Arc<T> {
    fn query(&self, query: &ReportQuery) -> Result<Vec<ReportRef>, StoreError> {
        (**self).query(query)
    }
}
