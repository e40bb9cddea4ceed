#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! output-size library
//!
//! Measures how a compiler change affects the size of a reference application's build
//! output. The compiler is rebuilt at each planned revision, the reference app is built
//! raw, minified and gzip-compressed, and the proposed revision is compared against the
//! others in a Markdown table and a JSON record.
//!
//! # Planning a run
//!
//! ```
//! use output_size::plan::{EventPayload, MeasurementPlanner, TriggerContext, TriggerKind};
//!
//! let trigger = TriggerContext {
//!     kind: TriggerKind::PullRequest,
//!     commit: "f00d".to_string(),
//!     git_ref: "refs/pull/1/merge".to_string(),
//!     head_ref: "feature".to_string(),
//!     base_ref: "release-1.19".to_string(),
//!     event: EventPayload::default(),
//! };
//!
//! let plan = MeasurementPlanner::new("master").plan(&trigger).unwrap();
//! let labels: Vec<_> = plan.requests().iter().map(|r| r.label.as_str()).collect();
//! assert_eq!(
//!     labels,
//!     ["Pull request (feature)", "Target branch (release-1.19)", "Baseline"]
//! );
//! ```
//!
//! # Rendering a report
//!
//! ```
//! use output_size::report::{render, AppInfo, ComparisonReport, Measurement};
//!
//! let mut report = ComparisonReport::new(
//!     AppInfo {
//!         name: "todomvc".to_string(),
//!         repo: "https://github.com/gopherjs/todomvc".to_string(),
//!         commit: "c0ffee".to_string(),
//!     },
//!     "",
//! );
//! for (label, raw, min, gz) in [("Proposed", 1_000_000, 400_000, 100_000), ("Baseline", 900_000, 350_000, 90_000)] {
//!     report.push(Measurement {
//!         label: label.to_string(),
//!         revision: label.to_lowercase(),
//!         resolved_commit: String::new(),
//!         raw_size: raw,
//!         minified_size: min,
//!         compressed_size: gz,
//!     });
//! }
//!
//! let table = render(&report).unwrap();
//! assert!(table.contains("+14.29% increase (350,000 bytes)"));
//! ```

/// GitHub Actions workflow commands
pub mod actions;
/// Command-line interface definition
pub mod cli;
/// Command handlers for CLI operations
pub mod cmd;
/// Run configuration and build recipes
pub mod config;
/// Enhanced error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Git operations
pub mod git;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// Measurement run orchestration
pub mod orchestrator;
/// Compiler build and artifact measurement
pub mod pipeline;
/// Measurement planning
pub mod plan;
/// Comparison report model and output
pub mod report;
/// Runtime provisioning
pub mod toolchain;
/// Tool detection and version checking
pub mod tools;
