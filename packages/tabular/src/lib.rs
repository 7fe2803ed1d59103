#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spreadsheet record loading and normalization.
//!
//! The binary container format is not this crate's business: a
//! [`SheetCodec`] turns raw bytes into a workbook of named sheets, and
//! everything after that (sheet selection, cell cleaning, caching) is
//! format-agnostic. A CSV codec ships in [`codec`]; an xlsx codec is an
//! external concern the host can inject.

pub mod clean;
pub mod codec;

use std::sync::Arc;

use censo_map_cache::{CacheValue, DataCache, cache_key};
use censo_map_census_models::SheetRow;
use censo_map_transport::{FetchError, Upload, fetch_bytes};

pub use codec::{CsvSheetCodec, SheetCodec, Workbook};

/// Errors that can occur while loading spreadsheet records.
#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    /// Fetching the source bytes failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The workbook decoded fine but does not contain the requested sheet.
    /// Carries the sheets that *are* present, for diagnostics.
    #[error("Sheet \"{sheet}\" not found. Available sheets: {}", .available.join(", "))]
    SheetMissing {
        /// The sheet that was asked for.
        sheet: String,
        /// Every sheet the workbook actually contains.
        available: Vec<String>,
    },

    /// The file extension is not one the configured codec understands.
    #[error("Unsupported spreadsheet format \"{extension}\". Supported: {}", .supported.join(", "))]
    UnsupportedFormat {
        /// Extension of the offending file.
        extension: String,
        /// Extensions the codec accepts.
        supported: Vec<String>,
    },

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Codec-level decode failure other than CSV.
    #[error("Spreadsheet decode error: {0}")]
    Decode(String),
}

/// Loads and normalizes spreadsheet sheets through an injected codec and
/// cache.
pub struct TabularLoader {
    codec: Arc<dyn SheetCodec>,
    cache: Arc<DataCache>,
}

impl TabularLoader {
    /// Creates a loader around a codec and a shared cache.
    #[must_use]
    pub fn new(codec: Arc<dyn SheetCodec>, cache: Arc<DataCache>) -> Self {
        Self { codec, cache }
    }

    /// Loads one sheet from a path (URL or local file).
    ///
    /// Results are memoized by `(path, sheet)`: a cache hit skips the
    /// fetch, the decode, and the normalization pass entirely and hands
    /// back the same `Arc`.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError`] if the fetch fails, the sheet is absent,
    /// or decoding fails.
    pub async fn load_path(
        &self,
        path: &str,
        sheet: &str,
    ) -> Result<Arc<Vec<SheetRow>>, TabularError> {
        let key = cache_key(path, Some(sheet));
        if let Some(CacheValue::Rows(rows)) = self.cache.get(&key) {
            log::info!("{sheet}: loaded from cache");
            return Ok(rows);
        }

        log::info!("Loading {sheet} from {path}...");
        let fetched = fetch_bytes(path).await?;
        let rows = Arc::new(self.decode_sheet(path, &fetched.bytes, sheet)?);

        self.cache.set(key, CacheValue::Rows(Arc::clone(&rows)));
        log::info!("{sheet}: loaded {} records", rows.len());
        Ok(rows)
    }

    /// Loads one sheet from a user upload.
    ///
    /// Uploads are transient and are not cached. The file extension must
    /// be one the codec supports.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError`] if the extension is unsupported, the
    /// sheet is absent, or decoding fails.
    pub fn load_upload(&self, upload: &Upload, sheet: &str) -> Result<Vec<SheetRow>, TabularError> {
        let extension = upload.extension().unwrap_or_default();
        if !self
            .codec
            .supported_extensions()
            .contains(&extension.as_str())
        {
            return Err(TabularError::UnsupportedFormat {
                extension,
                supported: self
                    .codec
                    .supported_extensions()
                    .iter()
                    .map(|&s| s.to_owned())
                    .collect(),
            });
        }

        log::info!("Processing upload {} (sheet {sheet})...", upload.name);
        let rows = self.decode_sheet(&upload.name, &upload.bytes, sheet)?;
        log::info!("{sheet}: processed {} records", rows.len());
        Ok(rows)
    }

    fn decode_sheet(
        &self,
        source: &str,
        bytes: &[u8],
        sheet: &str,
    ) -> Result<Vec<SheetRow>, TabularError> {
        let mut workbook = self.codec.decode(source, bytes)?;

        let Some(raw_rows) = workbook.take_sheet(sheet) else {
            return Err(TabularError::SheetMissing {
                sheet: sheet.to_owned(),
                available: workbook.sheet_names(),
            });
        };

        Ok(clean::clean_rows(raw_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Codec wrapper that counts decode calls, to prove cache hits skip
    /// the whole pipeline.
    struct CountingCodec {
        inner: CsvSheetCodec,
        decodes: AtomicUsize,
    }

    impl SheetCodec for CountingCodec {
        fn decode(&self, source: &str, bytes: &[u8]) -> Result<Workbook, TabularError> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            self.inner.decode(source, bytes)
        }

        fn supported_extensions(&self) -> &[&str] {
            self.inner.supported_extensions()
        }
    }

    const CSV: &str = "Municípios,CD_MUN,Estadual\nAçailândia,2100055, 15 \nBacabal,2101202,9\n";

    #[tokio::test]
    async fn caches_path_loads_by_path_and_sheet() {
        let dir = std::env::temp_dir().join("censo_map_tabular_cache_test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("dados_gerais.csv");
        tokio::fs::write(&path, CSV).await.unwrap();
        let path = path.to_str().unwrap().to_owned();

        let codec = Arc::new(CountingCodec {
            inner: CsvSheetCodec::new(),
            decodes: AtomicUsize::new(0),
        });
        let loader = TabularLoader::new(Arc::clone(&codec) as Arc<dyn SheetCodec>, Arc::default());

        let first = loader.load_path(&path, "dados_gerais").await.unwrap();
        let second = loader.load_path(&path, "dados_gerais").await.unwrap();

        assert_eq!(codec.decodes.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn missing_sheet_reports_available_sheets() {
        let loader = TabularLoader::new(Arc::new(CsvSheetCodec::new()), Arc::default());
        let upload = Upload::new("dados_gerais.csv", CSV.as_bytes().to_vec());

        let err = loader.load_upload(&upload, "Dados Gerais").unwrap_err();
        match err {
            TabularError::SheetMissing { sheet, available } => {
                assert_eq!(sheet, "Dados Gerais");
                assert_eq!(available, vec!["dados_gerais".to_owned()]);
            }
            other => panic!("expected SheetMissing, got {other}"),
        }
    }

    #[test]
    fn upload_with_wrong_extension_is_rejected() {
        let loader = TabularLoader::new(Arc::new(CsvSheetCodec::new()), Arc::default());
        let upload = Upload::new("boundaries.gpkg", Vec::new());

        let err = loader.load_upload(&upload, "dados_gerais").unwrap_err();
        assert!(matches!(
            err,
            TabularError::UnsupportedFormat { extension, .. } if extension == "gpkg"
        ));
    }

    #[test]
    fn upload_rows_are_normalized() {
        let loader = TabularLoader::new(Arc::new(CsvSheetCodec::new()), Arc::default());
        let upload = Upload::new("dados_gerais.csv", CSV.as_bytes().to_vec());

        let rows = loader.load_upload(&upload, "dados_gerais").unwrap();
        assert_eq!(rows.len(), 2);
        // " 15 " was trimmed and coerced to a number
        assert_eq!(rows[0]["Estadual"], serde_json::json!(15));
        assert_eq!(rows[0]["Municípios"], serde_json::json!("Açailândia"));
    }
}
