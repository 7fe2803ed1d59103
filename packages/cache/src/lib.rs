#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Keyed memoization for dataset loads.
//!
//! One [`DataCache`] is constructed at application start and handed to
//! every loader; there is no global instance. Entries never expire on
//! their own, only [`DataCache::clear`] empties the cache. Values are
//! `Arc`-shared so a cache hit is a pointer clone, not a deep copy.
//!
//! Loads can run on parallel tasks, so reads and writes go through an
//! `RwLock`. The lock is held only for map access, never across awaits.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use censo_map_census_models::{CacheInfo, FeatureCollection, SheetRow};

/// A memoized load result.
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// Normalized spreadsheet rows for one `(path, sheet)` pair.
    Rows(Arc<Vec<SheetRow>>),
    /// A validated boundary collection for one path.
    Collection(Arc<FeatureCollection>),
}

/// Process-wide cache of normalized load results.
#[derive(Debug, Default)]
pub struct DataCache {
    entries: RwLock<BTreeMap<String, CacheValue>>,
}

impl DataCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores an entry, replacing any previous value under the same key.
    pub fn set(&self, key: impl Into<String>, value: CacheValue) {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.into(), value);
    }

    /// Whether an entry exists for the key.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(key)
    }

    /// Empties the cache. The only way entries ever leave it.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
        log::info!("Data cache cleared");
    }

    /// Size and key listing, for diagnostics.
    #[must_use]
    pub fn info(&self) -> CacheInfo {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        CacheInfo {
            size: entries.len(),
            keys: entries.keys().cloned().collect(),
        }
    }
}

/// Builds the composite cache key for a source path plus an optional
/// selector (sheet name). Geo loads pass no selector and key by path alone.
#[must_use]
pub fn cache_key(path: &str, selector: Option<&str>) -> String {
    selector.map_or_else(|| path.to_owned(), |sheet| format!("{path}_{sheet}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_rows() {
        let cache = DataCache::new();
        let key = cache_key("data/censo.csv", Some("Dados Gerais"));
        assert!(!cache.has(&key));

        let rows = Arc::new(vec![SheetRow::new()]);
        cache.set(key.clone(), CacheValue::Rows(Arc::clone(&rows)));

        assert!(cache.has(&key));
        match cache.get(&key) {
            Some(CacheValue::Rows(cached)) => assert!(Arc::ptr_eq(&cached, &rows)),
            other => panic!("unexpected cache value: {other:?}"),
        }
    }

    #[test]
    fn clear_empties_everything() {
        let cache = DataCache::new();
        cache.set("a", CacheValue::Rows(Arc::new(Vec::new())));
        cache.set("b", CacheValue::Rows(Arc::new(Vec::new())));
        assert_eq!(cache.info().size, 2);

        cache.clear();
        let info = cache.info();
        assert_eq!(info.size, 0);
        assert!(info.keys.is_empty());
    }

    #[test]
    fn info_lists_keys() {
        let cache = DataCache::new();
        cache.set("b", CacheValue::Rows(Arc::new(Vec::new())));
        cache.set("a", CacheValue::Rows(Arc::new(Vec::new())));
        assert_eq!(cache.info().keys, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn selector_is_part_of_the_key() {
        assert_eq!(
            cache_key("censo.csv", Some("Dados Gerais")),
            "censo.csv_Dados Gerais"
        );
        assert_eq!(cache_key("mapa.geojson", None), "mapa.geojson");
    }
}
