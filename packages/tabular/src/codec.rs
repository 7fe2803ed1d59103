//! Spreadsheet container decoding.
//!
//! [`SheetCodec`] is the seam between this crate and whatever binary
//! format the data arrives in. The codec sees raw bytes and produces a
//! [`Workbook`] of named sheets whose cells are plain strings (missing
//! cells default to the empty string); normalization happens later and
//! uniformly in [`crate::clean`].

use std::collections::BTreeMap;

use censo_map_census_models::SheetRow;
use serde_json::Value;

use crate::TabularError;

/// A decoded spreadsheet container: sheet name to raw rows.
#[derive(Debug, Default, Clone)]
pub struct Workbook {
    sheets: BTreeMap<String, Vec<SheetRow>>,
}

impl Workbook {
    /// Creates an empty workbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet, replacing any sheet with the same name.
    pub fn insert_sheet(&mut self, name: impl Into<String>, rows: Vec<SheetRow>) {
        self.sheets.insert(name.into(), rows);
    }

    /// Removes and returns a sheet by name.
    pub fn take_sheet(&mut self, name: &str) -> Option<Vec<SheetRow>> {
        self.sheets.remove(name)
    }

    /// Every sheet name present, for [`TabularError::SheetMissing`]
    /// diagnostics.
    #[must_use]
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }
}

/// Decodes raw spreadsheet bytes into a [`Workbook`].
///
/// Implementations must be cheap to call repeatedly; the loader relies on
/// the cache, not the codec, for memoization.
pub trait SheetCodec: Send + Sync {
    /// Decodes `bytes` fetched from `source` (a path, URL, or upload
    /// name — used for sheet naming and diagnostics only).
    ///
    /// # Errors
    ///
    /// Returns [`TabularError`] if the bytes are not a valid container.
    fn decode(&self, source: &str, bytes: &[u8]) -> Result<Workbook, TabularError>;

    /// Lowercased file extensions this codec accepts, used to vet
    /// uploads before decoding.
    fn supported_extensions(&self) -> &[&str];
}

/// CSV-backed codec: one CSV file is a workbook with a single sheet named
/// after the file stem (`dados_gerais.csv` → sheet `"dados_gerais"`).
///
/// The first row is the header; short records are padded with empty
/// cells. Cells are passed through verbatim, trimming and numeric
/// coercion belong to the normalization pass.
#[derive(Debug, Clone)]
pub struct CsvSheetCodec {
    delimiter: u8,
}

impl Default for CsvSheetCodec {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvSheetCodec {
    /// Creates a comma-delimited codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter (e.g. `b';'` for Brazilian locale
    /// exports).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl SheetCodec for CsvSheetCodec {
    fn decode(&self, source: &str, bytes: &[u8]) -> Result<Workbook, TabularError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        if headers.is_empty() {
            return Err(TabularError::Decode(format!(
                "CSV at {source} contains no header row"
            )));
        }

        let mut rows: Vec<SheetRow> = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = SheetRow::new();
            for (i, header) in headers.iter().enumerate() {
                let cell = record.get(i).unwrap_or("");
                row.insert(header.clone(), Value::String(cell.to_owned()));
            }
            rows.push(row);
        }

        log::debug!("Decoded {} rows from {source}", rows.len());

        let mut workbook = Workbook::new();
        workbook.insert_sheet(sheet_name_for(source), rows);
        Ok(workbook)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["csv"]
    }
}

/// Sheet name for a single-sheet container: the file stem of the source.
fn sheet_name_for(source: &str) -> String {
    std::path::Path::new(source.split(['?', '#']).next().unwrap_or(source))
        .file_stem()
        .and_then(|s| s.to_str())
        .map_or_else(|| source.to_owned(), str::to_owned)
}
