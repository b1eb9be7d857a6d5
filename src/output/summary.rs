//! Run summary
//!
//! This module collects the figures of a finished harvest and renders them
//! for the terminal.

use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a completed harvest
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    /// The search query
    pub query: String,

    /// Page count announced by the pagination control
    pub total_pages: u32,

    /// Result count announced by the results counter
    pub reported_results: u64,

    /// Number of records extracted across all pages
    pub records: usize,

    /// Records that carried a discount
    pub discounted: usize,

    /// Written artifacts
    pub outputs: Vec<PathBuf>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl HarvestSummary {
    /// Returns true if the extracted count matches the announced count
    pub fn counts_match(&self) -> bool {
        self.records as u64 == self.reported_results
    }

    /// Returns the share of discounted records as a percentage
    pub fn discount_rate(&self) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        (self.discounted as f64 / self.records as f64) * 100.0
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &HarvestSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Search:");
    println!("  Query: {}", summary.query);
    println!("  Pages: {}", summary.total_pages);
    println!("  Results reported by site: {}", summary.reported_results);
    println!();

    println!("Records:");
    println!("  Extracted: {}", summary.records);
    println!(
        "  Discounted: {} ({:.1}%)",
        summary.discounted,
        summary.discount_rate()
    );
    if !summary.counts_match() {
        println!(
            "  Note: site reported {} results, {} were extracted",
            summary.reported_results, summary.records
        );
    }
    println!();

    println!("Output:");
    for path in &summary.outputs {
        println!("  - {}", path.display());
    }
    println!();

    println!("Completed in {:.2?}", summary.elapsed);
}
