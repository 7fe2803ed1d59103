#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset facade tying the loaders, the join, and the summaries together.
//!
//! A [`DatasetLoader`] owns one shared cache and loads the three sources
//! (aggregate sheet, school sheet, boundary collection) concurrently; all
//! three must succeed or the load fails as a whole. The resulting
//! [`DatasetBundle`] answers the dashboard's questions: compatibility,
//! search, state-wide statistics, per-municipality school stats, export.

use std::sync::Arc;

use censo_map_cache::DataCache;
use censo_map_census_models::{
    AggregateRecord, CacheInfo, CompatWarning, CompatibilityReport, FeatureCollection,
    GeneralStatistics, SchoolRecord, SchoolStats, SheetRow, ValidationSummary,
};
use censo_map_geography::{GeoError, GeoLoader};
use censo_map_matcher::MunicipalityLookup;
use censo_map_tabular::{SheetCodec, TabularError, TabularLoader};
use censo_map_transport::Upload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors from loading a dataset bundle.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The spreadsheet side failed.
    #[error(transparent)]
    Tabular(#[from] TabularError),

    /// The boundary side failed.
    #[error(transparent)]
    Geo(#[from] GeoError),
}

/// A spreadsheet source: which file, which sheet inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRef {
    /// Path or URL of the container file.
    pub path: String,
    /// Sheet name within the container.
    pub sheet: String,
}

/// Where the three sources live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    /// Per-municipality aggregate sheet.
    pub aggregates: SheetRef,
    /// School-list sheet.
    pub schools: SheetRef,
    /// Boundary collection path.
    pub boundaries: String,
}

impl Default for DatasetConfig {
    /// The bundled Maranhão deployment layout.
    fn default() -> Self {
        Self {
            aggregates: SheetRef {
                path: "data/excel/dados_censo_escolar.xlsx".to_owned(),
                sheet: "Dados Gerais".to_owned(),
            },
            schools: SheetRef {
                path: "data/excel/dados_censo_escolar.xlsx".to_owned(),
                sheet: "Análise - Tabela da lista".to_owned(),
            },
            boundaries: "data/geojson/maranhao_municipios.geojson".to_owned(),
        }
    }
}

/// Loads complete dataset bundles through one shared cache.
pub struct DatasetLoader {
    tabular: TabularLoader,
    geo: GeoLoader,
    cache: Arc<DataCache>,
}

impl DatasetLoader {
    /// Creates a loader around a spreadsheet codec, with a fresh cache.
    #[must_use]
    pub fn new(codec: Arc<dyn SheetCodec>) -> Self {
        Self::with_cache(codec, Arc::default())
    }

    /// Creates a loader sharing an existing cache.
    #[must_use]
    pub fn with_cache(codec: Arc<dyn SheetCodec>, cache: Arc<DataCache>) -> Self {
        Self {
            tabular: TabularLoader::new(codec, Arc::clone(&cache)),
            geo: GeoLoader::new(Arc::clone(&cache)),
            cache,
        }
    }

    /// Loads all three sources concurrently.
    ///
    /// There is no partial success: if any source fails the whole load
    /// fails, and nothing of the failed bundle is handed out.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] from the first source that fails.
    pub async fn load(&self, config: &DatasetConfig) -> Result<DatasetBundle, DatasetError> {
        let (aggregate_rows, school_rows, geo) = tokio::try_join!(
            async {
                self.tabular
                    .load_path(&config.aggregates.path, &config.aggregates.sheet)
                    .await
                    .map_err(DatasetError::from)
            },
            async {
                self.tabular
                    .load_path(&config.schools.path, &config.schools.sheet)
                    .await
                    .map_err(DatasetError::from)
            },
            async {
                self.geo
                    .load_path(&config.boundaries)
                    .await
                    .map_err(DatasetError::from)
            },
        )?;

        Ok(DatasetBundle::assemble(
            &aggregate_rows,
            &school_rows,
            geo.collection,
            geo.warnings,
        ))
    }

    /// Builds a bundle from user uploads instead of configured paths.
    ///
    /// Both sheets come from the same uploaded spreadsheet; the boundary
    /// collection comes from its own upload. Uploads are never cached.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if any of the three extractions fails.
    pub fn load_from_uploads(
        &self,
        spreadsheet: &Upload,
        boundaries: &Upload,
        config: &DatasetConfig,
    ) -> Result<DatasetBundle, DatasetError> {
        let aggregate_rows = self
            .tabular
            .load_upload(spreadsheet, &config.aggregates.sheet)?;
        let school_rows = self.tabular.load_upload(spreadsheet, &config.schools.sheet)?;
        let geo = self.geo.load_upload(boundaries)?;

        Ok(DatasetBundle::assemble(
            &aggregate_rows,
            &school_rows,
            geo.collection,
            geo.warnings,
        ))
    }

    /// Drops every cached entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
        log::info!("Cache cleared");
    }

    /// Snapshot of what the cache currently holds.
    #[must_use]
    pub fn cache_info(&self) -> CacheInfo {
        self.cache.info()
    }
}

/// The three loaded sources plus everything derived from them.
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    /// Per-municipality aggregate records, in sheet order.
    pub aggregates: Vec<AggregateRecord>,
    /// School list, in sheet order.
    pub schools: Vec<SchoolRecord>,
    /// Boundary collection.
    pub collection: Arc<FeatureCollection>,
    /// Soft findings from loading.
    pub warnings: Vec<CompatWarning>,
}

impl DatasetBundle {
    fn assemble(
        aggregate_rows: &[SheetRow],
        school_rows: &[SheetRow],
        collection: Arc<FeatureCollection>,
        warnings: Vec<CompatWarning>,
    ) -> Self {
        let bundle = Self {
            aggregates: AggregateRecord::from_rows(aggregate_rows),
            schools: SchoolRecord::from_rows(school_rows),
            collection,
            warnings,
        };
        log::info!(
            "Dataset loaded: {} municipalities, {} schools, {} features",
            bundle.aggregates.len(),
            bundle.schools.len(),
            bundle.collection.len()
        );
        bundle
    }

    /// Cross-checks the spreadsheet against the boundaries.
    #[must_use]
    pub fn compatibility(&self) -> CompatibilityReport {
        censo_map_matcher::check_compatibility(&self.aggregates, &self.collection)
    }

    /// Condensed validity verdict.
    #[must_use]
    pub fn validate(&self) -> ValidationSummary {
        censo_map_matcher::validation_summary(&self.compatibility())
    }

    /// Bidirectional record/feature lookup over this bundle.
    #[must_use]
    pub fn lookup(&self) -> MunicipalityLookup<'_> {
        MunicipalityLookup::new(&self.aggregates, &self.collection)
    }

    /// Municipalities whose name or code contains `term`, case-insensitive
    /// on the name, capped at ten results in sheet order.
    #[must_use]
    pub fn search_municipalities(&self, term: &str) -> Vec<&AggregateRecord> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        self.aggregates
            .iter()
            .filter(|record| {
                record
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&term))
                    || record
                        .code
                        .is_some_and(|code| code.to_string().contains(&term))
            })
            .take(10)
            .collect()
    }

    /// State-wide totals across every aggregate record. `None` when no
    /// records are loaded, so callers can tell "no data" from zeros.
    #[must_use]
    pub fn general_statistics(&self) -> Option<GeneralStatistics> {
        if self.aggregates.is_empty() {
            return None;
        }

        let mut stats = GeneralStatistics {
            total_municipalities: self.aggregates.len(),
            ..GeneralStatistics::default()
        };
        for record in &self.aggregates {
            stats.total_schools += record.total_schools;
            stats.by_category.estadual += record.by_category.estadual;
            stats.by_category.municipal += record.by_category.municipal;
            stats.by_category.federal += record.by_category.federal;
            stats.by_category.privada += record.by_category.privada;
            stats.by_band.up_to_50 += record.enrollment.up_to_50;
            stats.by_band.from_51_to_200 += record.enrollment.from_51_to_200;
            stats.by_band.from_201_to_500 += record.enrollment.from_201_to_500;
            stats.by_band.from_501_to_1000 += record.enrollment.from_501_to_1000;
            stats.by_band.over_1000 += record.enrollment.over_1000;
            stats.by_band.no_enrollment += record.enrollment.no_enrollment;
        }
        Some(stats)
    }

    /// Per-municipality school counts.
    #[must_use]
    pub fn school_stats(&self, municipality: &str) -> SchoolStats {
        censo_map_schools::school_stats(&self.schools, municipality)
    }

    /// Schools in a municipality, in list order.
    #[must_use]
    pub fn schools_in(&self, municipality: &str) -> Vec<&SchoolRecord> {
        censo_map_schools::filter_by_municipality(&self.schools, municipality)
    }

    /// Serializable snapshot of the loaded data, timestamped now.
    #[must_use]
    pub fn export(&self) -> ExportSnapshot {
        ExportSnapshot {
            metadata: ExportMetadata {
                export_date: Utc::now(),
                total_municipalities: self.aggregates.len(),
                total_schools: self.schools.len(),
            },
            aggregates: self.aggregates.clone(),
            schools: self.schools.clone(),
        }
    }
}

/// Export envelope: the loaded data plus provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    /// When and how much.
    pub metadata: ExportMetadata,
    /// Aggregate records as loaded.
    pub aggregates: Vec<AggregateRecord>,
    /// School list as loaded.
    pub schools: Vec<SchoolRecord>,
}

/// Provenance header of an [`ExportSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Moment the snapshot was taken.
    pub export_date: DateTime<Utc>,
    /// Aggregate record count.
    pub total_municipalities: usize,
    /// School count.
    pub total_schools: usize,
}
