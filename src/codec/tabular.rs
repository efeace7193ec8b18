//! Row-oriented text codec shared by both pipelines.
//!
//! Input is comma-separated text with an optional header row; output
//! always carries a header. Decoding stops at the first malformed row.

use crate::core::error::{EngineError, EngineResult};
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use log::debug;

/// A named column together with the header spellings accepted on input.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    /// Lower-case alternative header spellings.
    pub aliases: &'static [&'static str],
}

impl Column {
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    fn matches(&self, cell: &str) -> bool {
        let cell = cell.trim().to_lowercase();
        cell == self.name.to_lowercase() || self.aliases.contains(&cell.as_str())
    }
}

/// A value that maps to exactly one row of tabular text.
pub trait TabularRecord: Sized {
    const COLUMNS: &'static [Column];

    /// Column holding the row date, used to recognise summary rows.
    const DATE_COLUMN: Option<usize> = None;

    fn to_record(&self) -> Vec<String>;

    /// Build a value from a record whose column count is already checked.
    /// `row` is the 1-based line number used in error reports.
    fn from_record(record: &StringRecord, row: usize) -> EngineResult<Self>;

    fn is_header(record: &StringRecord) -> bool {
        record.len() == Self::COLUMNS.len()
            && Self::COLUMNS
                .iter()
                .zip(record.iter())
                .all(|(column, cell)| column.matches(cell))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Drop spreadsheet total/summary rows (no usable date in the date column)
    /// instead of rejecting them.
    pub skip_summary_rows: bool,
}

/// Parse every row of `text` into `T`.
pub fn decode<T: TabularRecord>(text: &str, options: &DecodeOptions) -> EngineResult<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);

        if index == 0 && T::is_header(&record) {
            continue;
        }
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if options.skip_summary_rows && is_summary_row::<T>(&record) {
            skipped += 1;
            continue;
        }
        if record.len() != T::COLUMNS.len() {
            return Err(EngineError::malformed(
                row,
                format!(
                    "expected {} columns, found {}",
                    T::COLUMNS.len(),
                    record.len()
                ),
            ));
        }
        rows.push(T::from_record(&record, row)?);
    }

    debug!("decoded {} rows ({} summary rows skipped)", rows.len(), skipped);
    Ok(rows)
}

/// Render `rows` as tabular text with a header row.
pub fn encode<T: TabularRecord>(rows: &[T]) -> EngineResult<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(T::COLUMNS.iter().map(|c| c.name))
        .map_err(write_failure)?;
    for row in rows {
        writer.write_record(row.to_record()).map_err(write_failure)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| EngineError::ProcessingFailure(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| EngineError::ProcessingFailure(e.to_string()))
}

fn write_failure(err: csv::Error) -> EngineError {
    EngineError::ProcessingFailure(format!("failed to write row: {err}"))
}

fn is_summary_row<T: TabularRecord>(record: &StringRecord) -> bool {
    T::DATE_COLUMN
        .map(|column| {
            let cell = record.get(column).unwrap_or("");
            cell.is_empty() || !cell.contains(['-', '/'])
        })
        .unwrap_or(false)
}

/// Fetch a required, non-empty cell.
pub(crate) fn cell<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> EngineResult<&'r str> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(EngineError::malformed(row, format!("missing {name}"))),
    }
}
