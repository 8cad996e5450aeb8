//! Benchmark Output Parsing
//!
//! The compute benchmark binaries are invoked with `--csv --noHeaders` and
//! print a short CSV table. The first record is skipped; the second record
//! carries the measurement, with the test label in column 0 and the mean in
//! column 1.

use thiserror::Error;

/// Errors produced while parsing benchmark output
#[derive(Debug, Error)]
pub enum ParseError {
    /// Fewer than two CSV records were printed
    #[error("Benchmark output does not contain data.")]
    NoData,

    /// The data record is too short
    #[error("Error parsing output: data row has no column {index}")]
    MissingColumn {
        /// Zero-based column that was expected
        index: usize,
    },

    /// The mean column is not a number
    #[error("Error parsing output: could not convert '{value}' to a number")]
    InvalidNumber {
        /// Text found in the column
        value: String,
    },

    /// The output is not valid CSV
    #[error("Error parsing output: {0}")]
    Csv(#[from] csv::Error),
}

/// Measurement extracted from a benchmark's CSV output
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// Label printed by the binary
    pub label: String,
    /// Mean value
    pub mean: f64,
}

/// Parse the CSV output of a compute benchmark binary.
pub fn parse_compute_output(output: &str) -> Result<ParsedRow, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(output.as_bytes());

    let mut records = reader.records();

    // First record is a preamble line
    if records.next().transpose()?.is_none() {
        return Err(ParseError::NoData);
    }
    let row = records.next().transpose()?.ok_or(ParseError::NoData)?;

    let label = row
        .get(0)
        .ok_or(ParseError::MissingColumn { index: 0 })?
        .to_string();
    let raw_mean = row.get(1).ok_or(ParseError::MissingColumn { index: 1 })?;
    let mean = raw_mean
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber {
            value: raw_mean.to_string(),
        })?;

    Ok(ParsedRow { label, mean })
}
