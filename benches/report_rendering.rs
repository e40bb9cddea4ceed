//! Report Rendering Benchmarks
//!
//! **Purpose:** Measure the cost of turning measurements into the Markdown table and
//! of reloading a stored JSON report.
//!
//! **Regression Threshold:** >20% slower than baseline
//!
//! **How to Run:**
//! ```bash
//! cargo bench --bench report_rendering
//! ```
//!
//! **What's Being Measured:**
//! 1. `compute delta` - One percentage cell
//! 2. `render table/<rows>` - Full table with padding, for growing row counts
//! 3. `decode json report` - serde_json decoding of a stored report

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use output_size::report::{compute_delta, render, AppInfo, ComparisonReport, Measurement};
use std::hint::black_box;

fn sample_report(rows: usize) -> ComparisonReport {
    let mut report = ComparisonReport::new(
        AppInfo {
            name: "todomvc".to_string(),
            repo: "https://github.com/gopherjs/todomvc".to_string(),
            commit: "c0ffee".to_string(),
        },
        "https://github.com/gopherjs/gopherjs/pull/7",
    );
    for i in 0..rows as u64 {
        report.push(Measurement {
            label: format!("Revision {}", i),
            revision: format!("rev-{}", i),
            resolved_commit: format!("{:040x}", i),
            raw_size: 1_000_000 + i * 7_919,
            minified_size: 400_000 + i * 3_331,
            compressed_size: 100_000 + i * 997,
        });
    }
    report
}

fn bench_compute_delta(c: &mut Criterion) {
    c.bench_function("compute delta", |b| {
        b.iter(|| compute_delta(black_box(1_000_000), black_box(900_000)))
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render table");
    for rows in [2usize, 3, 16] {
        let report = sample_report(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &report, |b, report| {
            b.iter(|| render(black_box(report)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let json = serde_json::to_string_pretty(&sample_report(3)).unwrap();
    c.bench_function("decode json report", |b| {
        b.iter(|| serde_json::from_str::<ComparisonReport>(black_box(&json)))
    });
}

criterion_group!(benches, bench_compute_delta, bench_render, bench_decode);
criterion_main!(benches);
