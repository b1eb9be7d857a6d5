//! Output module for writing the harvested catalog
//!
//! This module handles:
//! - The `BookRecord` type shared by extraction and output
//! - JSON and CSV result sinks
//! - Timestamped output file naming
//! - The end-of-run summary

mod csv;
mod json;
pub mod summary;
mod traits;

pub use self::csv::{CsvSink, CSV_HEADER};
pub use json::JsonSink;
pub use summary::{print_summary, HarvestSummary};
pub use traits::{BookRecord, Discount, OutputError, OutputResult, ResultSink};

use chrono::{DateTime, TimeZone};
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

/// Timestamp layout used in output file names
const STAMP_FORMAT: &str = "%Y%m%d_%H_%M_%S";

/// Returns the shared file stem, `result_<YYYYMMDD_HH_MM_SS>`
pub fn output_stem<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("result_{}", at.format(STAMP_FORMAT))
}

/// Writes `records` through `sink` into `<dir>/<stem>.<ext>`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError::AlreadyExists)` - A file of that name is already
///   there; results are never overwritten
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_with_sink(
    sink: &dyn ResultSink,
    records: &[BookRecord],
    dir: &Path,
    stem: &str,
) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", stem, sink.extension()));

    let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(OutputError::AlreadyExists(path))
        }
        Err(e) => return Err(e.into()),
    };

    let mut writer = BufWriter::new(file);
    sink.write_records(records, &mut writer)?;

    Ok(path)
}

/// Writes the catalog as both JSON and CSV sharing one timestamped stem
///
/// # Arguments
///
/// * `records` - The aggregated catalog, in page then row order
/// * `dir` - Output directory (created if absent)
/// * `at` - Timestamp embedded in the file names
///
/// # Returns
///
/// Paths of the JSON and CSV files, in that order
pub fn write_catalog<Tz: TimeZone>(
    records: &[BookRecord],
    dir: &Path,
    at: &DateTime<Tz>,
) -> OutputResult<Vec<PathBuf>>
where
    Tz::Offset: std::fmt::Display,
{
    let stem = output_stem(at);
    let sinks: [&dyn ResultSink; 2] = [&JsonSink, &CsvSink];

    let mut paths = Vec::with_capacity(sinks.len());
    for sink in sinks {
        let path = write_with_sink(sink, records, dir, &stem)?;
        tracing::info!("Saved {} records to {}", records.len(), path.display());
        paths.push(path);
    }
    Ok(paths)
}
