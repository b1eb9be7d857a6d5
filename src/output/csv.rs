//! Tabular (CSV) result sink

use crate::output::traits::{BookRecord, OutputResult, ResultSink};
use serde::Serialize;
use std::io::Write;

/// Fixed column header of the CSV artifact
pub const CSV_HEADER: [&str; 8] = [
    "Title",
    "Link",
    "Author",
    "Publisher",
    "Price",
    "DiscountAmount",
    "OldPrice",
    "Availability",
];

/// Flattened row; absent discount fields serialize as empty cells
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Link")]
    link: &'a str,
    #[serde(rename = "Author")]
    author: &'a str,
    #[serde(rename = "Publisher")]
    publisher: &'a str,
    #[serde(rename = "Price")]
    price: &'a str,
    #[serde(rename = "DiscountAmount")]
    discount_amount: Option<&'a str>,
    #[serde(rename = "OldPrice")]
    old_price: Option<&'a str>,
    #[serde(rename = "Availability")]
    availability: &'a str,
}

impl<'a> From<&'a BookRecord> for CsvRow<'a> {
    fn from(record: &'a BookRecord) -> Self {
        Self {
            title: &record.title,
            link: &record.link,
            author: &record.author,
            publisher: &record.publisher,
            price: &record.price,
            discount_amount: record.discount_amount(),
            old_price: record.old_price(),
            availability: &record.availability,
        }
    }
}

/// Writes the catalog as comma-delimited, double-quoted CSV with a header row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

impl ResultSink for CsvSink {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write_records(&self, records: &[BookRecord], writer: &mut dyn Write) -> OutputResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(b',')
            .quote(b'"')
            .from_writer(writer);

        // Written explicitly so an empty catalog still gets its header
        csv_writer.write_record(CSV_HEADER)?;
        for record in records {
            csv_writer.serialize(CsvRow::from(record))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
