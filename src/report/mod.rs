//! Comparison report
//!
//! The report model, delta computation and the two output forms: a Markdown table
//! for humans and a field-for-field JSON encoding for machines. Both are produced
//! from the same [`ComparisonReport`], so they always carry the same numbers.

pub mod delta;
pub mod markdown;
pub mod model;
pub mod store;

use std::path::PathBuf;
use thiserror::Error;

pub use delta::{compute_delta, Direction, SizeDelta};
pub use markdown::{render, NO_MEASUREMENTS, REPORT_MARKER};
pub use model::{AppInfo, ComparisonReport, Measurement};

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Percentages against an empty artifact are undefined
    #[error("cannot compute a delta against a zero-byte baseline")]
    ZeroBaseline,

    /// A delta in one table cell could not be computed
    #[error("{metric} delta for {label:?}")]
    Delta {
        /// Row label
        label: String,
        /// Metric column
        metric: &'static str,
        #[source]
        /// Underlying failure
        source: Box<ReportError>,
    },

    /// JSON encoding failed
    #[error("encode report as JSON")]
    Encode(#[source] serde_json::Error),

    /// A stored report is not valid JSON
    #[error("decode report {}", path.display())]
    Decode {
        /// Report file
        path: PathBuf,
        #[source]
        /// Decoder error
        source: serde_json::Error,
    },

    /// Reading a stored report failed
    #[error("read report {}", path.display())]
    Read {
        /// Report file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Writing a report failed
    #[error("write report {}", path.display())]
    Write {
        /// Report file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl ReportError {
    /// Whether the error comes from a zero-byte baseline
    pub fn is_zero_baseline(&self) -> bool {
        match self {
            Self::ZeroBaseline => true,
            Self::Delta { source, .. } => source.is_zero_baseline(),
            _ => false,
        }
    }
}
