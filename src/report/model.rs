//! Report data model

use serde::{Deserialize, Serialize};

/// Reference application the sizes were measured for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Display name
    pub name: String,
    /// Repository URL
    pub repo: String,
    /// Commit the app was built at
    pub commit: String,
}

/// One measured revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Human-readable row label
    pub label: String,
    /// Revision as requested
    pub revision: String,
    /// Commit the revision resolved to
    pub resolved_commit: String,
    /// Unoptimized artifact size in bytes
    pub raw_size: u64,
    /// Minified artifact size in bytes
    pub minified_size: u64,
    /// Compressed artifact size in bytes
    pub compressed_size: u64,
}

/// Measurements of one run, in plan order.
///
/// The first measurement is the proposed revision every other row is compared against.
/// Measurements can only be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Reference application
    pub app: AppInfo,
    /// Pull request or compare URL that triggered the run
    pub trigger: String,
    measurements: Vec<Measurement>,
}

impl ComparisonReport {
    /// Start an empty report
    pub fn new(app: AppInfo, trigger: impl Into<String>) -> Self {
        Self {
            app,
            trigger: trigger.into(),
            measurements: Vec::new(),
        }
    }

    /// Append a measurement
    pub fn push(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// All measurements, proposed first
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// The measurement every other row is compared against
    pub fn proposed(&self) -> Option<&Measurement> {
        self.measurements.first()
    }

    /// Whether nothing was measured
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}
