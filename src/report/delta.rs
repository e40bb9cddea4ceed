//! Relative size deltas

use std::fmt;

use super::ReportError;
use crate::fmt::format_byte_count;

/// Direction of a size change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Candidate is larger
    Increase,
    /// Candidate is smaller
    Decrease,
    /// Same size
    Unchanged,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Change of a candidate size relative to a baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeDelta {
    /// Magnitude of the change in percent of the baseline, never negative
    pub percent: f64,
    /// Direction of the change
    pub direction: Direction,
    /// Baseline size in bytes
    pub baseline_bytes: u64,
}

impl fmt::Display for SizeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.direction {
            Direction::Increase => "+",
            Direction::Decrease | Direction::Unchanged => "",
        };
        write!(
            f,
            "{}{:.2}% {} ({})",
            sign,
            self.percent,
            self.direction,
            format_byte_count(self.baseline_bytes)
        )
    }
}

/// Compare `candidate` against `baseline`
///
/// # Examples
///
/// ```
/// use output_size::report::compute_delta;
///
/// assert_eq!(compute_delta(1100, 1000).unwrap().to_string(), "+10.00% increase (1,000 bytes)");
/// assert_eq!(compute_delta(900, 1000).unwrap().to_string(), "10.00% decrease (1,000 bytes)");
/// assert!(compute_delta(1, 0).is_err());
/// ```
pub fn compute_delta(candidate: u64, baseline: u64) -> Result<SizeDelta, ReportError> {
    if baseline == 0 {
        return Err(ReportError::ZeroBaseline);
    }

    let direction = match candidate.cmp(&baseline) {
        std::cmp::Ordering::Greater => Direction::Increase,
        std::cmp::Ordering::Less => Direction::Decrease,
        std::cmp::Ordering::Equal => Direction::Unchanged,
    };
    let percent = candidate.abs_diff(baseline) as f64 / baseline as f64 * 100.0;

    Ok(SizeDelta {
        percent,
        direction,
        baseline_bytes: baseline,
    })
}
