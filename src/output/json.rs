//! Structured (JSON) result sink

use crate::output::traits::{BookRecord, OutputResult, ResultSink};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;

/// Writes the catalog as a 4-space indented JSON array
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

impl ResultSink for JsonSink {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write_records(&self, records: &[BookRecord], writer: &mut dyn Write) -> OutputResult<()> {
        let mut serializer =
            Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut serializer)?;
        writer.flush()?;
        Ok(())
    }
}
