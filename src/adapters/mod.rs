// Adapters layer: concrete TabularStore implementations.

pub mod csv_file;
pub mod sheet;

pub use csv_file::CsvFileStore;
pub use sheet::SheetStore;

use crate::domain::model::Row;
use crate::utils::error::Result;
use std::io::Read;

/// Parses CSV with a header row into rows keyed by header.
///
/// Rows whose field count differs from the header are malformed and fail the
/// whole read.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(headers.iter().zip(record.iter()).collect::<Row>());
    }

    tracing::debug!("Parsed {} rows ({} columns)", rows.len(), headers.len());
    Ok(rows)
}
