#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Infrastructure issue taxonomy: categories, workflow statuses and
//! severity scores.
//!
//! Categories and statuses are closed sets. Every report in the system
//! carries exactly one of each, so they are modelled as enums rather than
//! free-form strings. The serialized names match the labels shown to
//! citizens and admins (`"Water Leak"`, `"In Progress"`).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lowest severity score the triage step can assign.
pub const MIN_SEVERITY: u8 = 1;

/// Highest severity score the triage step can assign.
pub const MAX_SEVERITY: u8 = 10;

/// Kind of infrastructure problem a report describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum IssueCategory {
    /// Road surface damage
    Pothole,
    /// Burst or leaking water main, hydrant or pipe
    #[serde(rename = "Water Leak")]
    #[strum(serialize = "Water Leak")]
    WaterLeak,
    /// Graffiti or deliberate damage to public property
    Vandalism,
    /// Street lamp out or damaged
    #[serde(rename = "Broken Streetlight")]
    #[strum(serialize = "Broken Streetlight")]
    BrokenStreetlight,
    /// Waste left on public land
    #[serde(rename = "Illegal Dumping")]
    #[strum(serialize = "Illegal Dumping")]
    IllegalDumping,
    /// Anything the classifier could not place
    #[default]
    Other,
}

impl IssueCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pothole,
            Self::WaterLeak,
            Self::Vandalism,
            Self::BrokenStreetlight,
            Self::IllegalDumping,
            Self::Other,
        ]
    }
}

/// Where a report sits in the admin workflow.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ReportStatus {
    /// Submitted, nobody has picked it up yet
    #[default]
    Reported,
    /// A crew has been assigned
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    /// Resolved
    Fixed,
}

impl ReportStatus {
    /// Whether the issue has been resolved.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Fixed)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Reported, Self::InProgress, Self::Fixed]
    }
}

/// Severity score assigned during triage, from 1 (cosmetic) to 10
/// (immediate hazard).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    /// Returns the numeric value of this severity score.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Creates a severity score from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-10.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            MIN_SEVERITY..=MAX_SEVERITY => Ok(Self(value)),
            _ => Err(InvalidSeverityError { value }),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for Severity {
    type Error = InvalidSeverityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when attempting to create a [`Severity`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid severity value {}: expected {MIN_SEVERITY}-{MAX_SEVERITY}",
            self.value
        )
    }
}

impl std::error::Error for InvalidSeverityError {}
