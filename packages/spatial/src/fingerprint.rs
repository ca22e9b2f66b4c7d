//! Exact photo duplicate detection.
//!
//! Runs before AI triage: if the same user already submitted the exact
//! same photo, the existing report is returned and the classifier call is
//! skipped.

use civic_report_store::{ReportStore, StoreError};
use civic_report_store_models::{ReportQuery, ReportRef};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

/// Lowercase hex SHA-256 of the photo bytes.
#[must_use]
pub fn compute_image_hash(photo: &[u8]) -> String {
    hex::encode(Sha256::digest(photo))
}

/// Returns a non-archived report by `user_id` whose stored photo hash
/// matches `photo`, if one exists.
///
/// # Errors
///
/// Returns [`StoreError`] if the store query fails.
pub fn check_image_duplicate(
    store: &dyn ReportStore,
    photo: &[u8],
    user_id: Uuid,
) -> Result<Option<ReportRef>, StoreError> {
    let query = ReportQuery {
        user_id: Some(user_id),
        image_hash: Some(compute_image_hash(photo)),
        ..ReportQuery::default()
    };
    Ok(store.query(&query)?.into_iter().next())
}
