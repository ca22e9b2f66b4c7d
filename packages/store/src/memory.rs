//! In-memory report store with an R-tree over report coordinates.
//!
//! Bounding-box filters are answered from the R-tree; every other filter
//! is applied to the resulting candidates. Results always come back in
//! insertion order regardless of how the tree returns them.

use std::path::Path;

use civic_report_store_models::{ReportQuery, ReportRef};
use rstar::{AABB, RTree, RTreeObject};

use crate::{ReportStore, StoreError};

/// A report position stored in the R-tree, pointing back at the report.
#[derive(Debug, Clone, Copy)]
struct IndexedReport {
    idx: usize,
    lon: f64,
    lat: f64,
}

impl RTreeObject for IndexedReport {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

/// Report store held entirely in memory.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: Vec<ReportRef>,
    index: RTree<IndexedReport>,
}

impl MemoryReportStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a list of reports, bulk-loading the spatial index.
    #[must_use]
    pub fn from_reports(reports: Vec<ReportRef>) -> Self {
        let entries = reports
            .iter()
            .enumerate()
            .map(|(idx, r)| IndexedReport {
                idx,
                lon: r.longitude,
                lat: r.latitude,
            })
            .collect();

        Self {
            reports,
            index: RTree::bulk_load(entries),
        }
    }

    /// Parses a JSON array of reports.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if the input is not a valid report array.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let reports: Vec<ReportRef> = serde_json::from_str(json)?;
        Ok(Self::from_reports(reports))
    }

    /// Loads a JSON array of reports from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read or parsed.
    pub fn from_json_path(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&contents)?;
        log::info!("Loaded {} reports from {}", store.len(), path.display());
        Ok(store)
    }

    /// Adds a report to the store.
    pub fn insert(&mut self, report: ReportRef) {
        let idx = self.reports.len();
        self.index.insert(IndexedReport {
            idx,
            lon: report.longitude,
            lat: report.latitude,
        });
        self.reports.push(report);
    }

    /// Number of reports held, archived ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the store holds no reports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn candidate_indices(&self, query: &ReportQuery) -> Vec<usize> {
        query.bbox.map_or_else(
            || (0..self.reports.len()).collect(),
            |bbox| {
                let envelope =
                    AABB::from_corners([bbox.west, bbox.south], [bbox.east, bbox.north]);
                let mut hits: Vec<usize> = self
                    .index
                    .locate_in_envelope(&envelope)
                    .map(|entry| entry.idx)
                    .collect();
                hits.sort_unstable();
                hits
            },
        )
    }
}

impl ReportStore for MemoryReportStore {
    fn query(&self, query: &ReportQuery) -> Result<Vec<ReportRef>, StoreError> {
        let candidates = self.candidate_indices(query);
        let scanned = candidates.len();

        let matched: Vec<ReportRef> = candidates
            .into_iter()
            .map(|idx| &self.reports[idx])
            .filter(|r| query.matches(r))
            .cloned()
            .collect();

        log::trace!(
            "Memory store query scanned {scanned} of {} reports, matched {}",
            self.reports.len(),
            matched.len()
        );

        Ok(matched)
    }
}
