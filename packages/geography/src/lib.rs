#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipality boundary loading and validation.
//!
//! Loads a `GeoJSON` `FeatureCollection` of municipality polygons from a
//! path or an upload, validates its shape, and reports soft findings (no
//! `CD_MUN` anywhere) as structured warnings instead of log-only output.
//!
//! GeoPackage input is recognized but never converted: a `.gpkg` source
//! always fails with [`GeoError::UnsupportedFormat`] unless the server
//! actually served JSON. No empty placeholder collection is ever
//! fabricated for it; the operator is pointed at `ogr2ogr` instead.

pub mod validate;

use std::sync::Arc;

use censo_map_cache::{CacheValue, DataCache, cache_key};
use censo_map_census_models::{CompatWarning, FeatureCollection};
use censo_map_transport::{FetchError, Upload, extension_of, fetch_bytes};

/// Errors that can occur while loading boundary data.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// Fetching the source bytes failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Recognized but unconvertible format (GeoPackage, unknown
    /// extension).
    #[error("Unsupported geographic format: {0}")]
    UnsupportedFormat(String),

    /// The payload parsed as JSON but is not a usable
    /// `FeatureCollection`.
    #[error("Invalid GeoJSON structure: {0}")]
    InvalidStructure(String),

    /// The payload is not valid JSON at all.
    #[error("GeoJSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A successfully loaded collection plus any soft findings.
#[derive(Debug, Clone)]
pub struct GeoLoad {
    /// The validated collection.
    pub collection: Arc<FeatureCollection>,
    /// Non-fatal compatibility findings for the caller to surface.
    pub warnings: Vec<CompatWarning>,
}

/// Loads boundary collections through the shared cache.
pub struct GeoLoader {
    cache: Arc<DataCache>,
}

impl GeoLoader {
    /// Creates a loader around a shared cache.
    #[must_use]
    pub const fn new(cache: Arc<DataCache>) -> Self {
        Self { cache }
    }

    /// Loads a boundary collection from a path (URL or local file).
    ///
    /// Dispatches on the file extension: `.geojson` and `.json` parse as
    /// UTF-8 JSON; `.gpkg` is accepted only when the response
    /// content type says the server already converted it to JSON.
    /// Results are memoized by path; warnings are re-derived on a cache
    /// hit so hits and misses report identically.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the fetch, the parse, or validation fails,
    /// or the format is unsupported.
    pub async fn load_path(&self, path: &str) -> Result<GeoLoad, GeoError> {
        let key = cache_key(path, None);
        if let Some(CacheValue::Collection(collection)) = self.cache.get(&key) {
            log::info!("Boundaries loaded from cache");
            let warnings = validate::soft_warnings(&collection);
            return Ok(GeoLoad {
                collection,
                warnings,
            });
        }

        log::info!("Loading boundaries from {path}...");
        let fetched = fetch_bytes(path).await?;

        let extension = extension_of(path).unwrap_or_default();
        let raw: serde_json::Value = match extension.as_str() {
            "geojson" | "json" => serde_json::from_slice(&fetched.bytes)?,
            "gpkg" => {
                let is_json = fetched
                    .content_type
                    .as_deref()
                    .is_some_and(|ct| ct.contains("application/json"));
                if is_json {
                    serde_json::from_slice(&fetched.bytes)?
                } else {
                    return Err(GeoError::UnsupportedFormat(format!(
                        "{path} is a binary GeoPackage; convert it first, e.g. \
                         `ogr2ogr -f GeoJSON out.geojson {path}`"
                    )));
                }
            }
            other => {
                return Err(GeoError::UnsupportedFormat(format!(
                    "unrecognized extension \"{other}\" for {path}; \
                     expected .geojson, .json or .gpkg"
                )));
            }
        };

        let warnings = validate::validate_collection(&raw)?;
        let collection = Arc::new(FeatureCollection::from_value(raw));

        self.cache
            .set(key, CacheValue::Collection(Arc::clone(&collection)));
        log::info!("Boundaries loaded: {} features", collection.len());

        Ok(GeoLoad {
            collection,
            warnings,
        })
    }

    /// Loads a boundary collection from a user upload.
    ///
    /// Only `.geojson`/`.json` uploads are accepted. A `.gpkg` upload is
    /// rejected without content inspection; there is no conversion path
    /// in the browser-upload flow. Uploads are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the extension is unsupported or the
    /// payload fails to parse or validate.
    pub fn load_upload(&self, upload: &Upload) -> Result<GeoLoad, GeoError> {
        let extension = upload.extension().unwrap_or_default();
        match extension.as_str() {
            "geojson" | "json" => {}
            "gpkg" => {
                return Err(GeoError::UnsupportedFormat(format!(
                    "{} is a GeoPackage; convert it to GeoJSON before \
                     uploading (e.g. with ogr2ogr)",
                    upload.name
                )));
            }
            other => {
                return Err(GeoError::UnsupportedFormat(format!(
                    "unrecognized extension \"{other}\" for {}; \
                     expected .geojson or .json",
                    upload.name
                )));
            }
        }

        log::info!("Processing upload {}...", upload.name);
        let raw: serde_json::Value = serde_json::from_slice(&upload.bytes)?;
        let warnings = validate::validate_collection(&raw)?;
        let collection = Arc::new(FeatureCollection::from_value(raw));
        log::info!("Boundaries processed: {} features", collection.len());

        Ok(GeoLoad {
            collection,
            warnings,
        })
    }
}
