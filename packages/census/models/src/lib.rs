#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! School census data model shared across the censo-map crates.
//!
//! These types represent the two sides of the municipality join: aggregate
//! per-municipality rows from the census spreadsheet and boundary features
//! from the `GeoJSON` collection, plus the compatibility report the matcher
//! produces from them.

pub mod columns;
pub mod feature;
pub mod value;

use serde::{Deserialize, Serialize};

pub use feature::{Feature, FeatureCollection};

/// One normalized spreadsheet row: cleaned column header to cleaned cell
/// value (string, or number after coercion).
pub type SheetRow = serde_json::Map<String, serde_json::Value>;

/// Coverage below or at this percentage marks the spreadsheet/boundary pair
/// as incompatible. Policy constant, not derived from data.
pub const MIN_COVERAGE_PERCENT: f64 = 50.0;

/// School counts by administrative category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    /// State-run schools (`Estadual`).
    pub estadual: u64,
    /// Municipal schools (`Municipal`).
    pub municipal: u64,
    /// Federal schools (`Federal`).
    pub federal: u64,
    /// Private schools (`Privada`).
    pub privada: u64,
}

/// School counts by enrollment-size band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentBands {
    /// Up to 50 enrollments.
    pub up_to_50: u64,
    /// 51 to 200 enrollments.
    pub from_51_to_200: u64,
    /// 201 to 500 enrollments.
    pub from_201_to_500: u64,
    /// 501 to 1000 enrollments.
    pub from_501_to_1000: u64,
    /// More than 1000 enrollments.
    pub over_1000: u64,
    /// Schools with no enrollment at all.
    pub no_enrollment: u64,
}

/// Per-municipality aggregate row from the "Dados Gerais" sheet.
///
/// Invariant: at least one of `code` and `name` is present. Rows satisfying
/// neither are dropped at extraction time, see [`AggregateRecord::from_row`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    /// IBGE municipality code (`CD_MUN`), when the sheet carries one.
    pub code: Option<i64>,
    /// Municipality name as written in the sheet, trimmed.
    pub name: Option<String>,
    /// Total school count for the municipality.
    pub total_schools: u64,
    /// Counts by administrative category.
    pub by_category: CategoryTotals,
    /// Counts by enrollment-size band.
    pub enrollment: EnrollmentBands,
}

impl AggregateRecord {
    /// Extracts an aggregate record from a normalized sheet row.
    ///
    /// Returns `None` when the row carries neither a municipality code nor
    /// a non-empty name; such rows cannot participate in the join and are
    /// dropped.
    #[must_use]
    pub fn from_row(row: &SheetRow) -> Option<Self> {
        let code = row.get(columns::CD_MUN).and_then(value::parse_code);
        let name = row
            .get(columns::MUNICIPALITY)
            .or_else(|| row.get(columns::MUNICIPALITY_ALT))
            .and_then(value::as_trimmed_str)
            .map(str::to_owned);

        if code.is_none() && name.is_none() {
            return None;
        }

        Some(Self {
            code,
            name,
            total_schools: value::count_field(row, columns::TOTAL_SCHOOLS),
            by_category: CategoryTotals {
                estadual: value::count_field(row, columns::STATE_SCHOOLS),
                municipal: value::count_field(row, columns::MUNICIPAL_SCHOOLS),
                federal: value::count_field(row, columns::FEDERAL_SCHOOLS),
                privada: value::count_field(row, columns::PRIVATE_SCHOOLS),
            },
            enrollment: EnrollmentBands {
                up_to_50: value::count_field(row, columns::BAND_UP_TO_50),
                from_51_to_200: value::count_field(row, columns::BAND_51_TO_200),
                from_201_to_500: value::count_field(row, columns::BAND_201_TO_500),
                from_501_to_1000: value::count_field(row, columns::BAND_501_TO_1000),
                over_1000: value::count_field(row, columns::BAND_OVER_1000),
                no_enrollment: value::count_field(row, columns::BAND_NO_ENROLLMENT),
            },
        })
    }

    /// Extracts every usable aggregate record from a normalized sheet,
    /// preserving row order.
    #[must_use]
    pub fn from_rows(rows: &[SheetRow]) -> Vec<Self> {
        rows.iter().filter_map(Self::from_row).collect()
    }
}

/// One physical school from the school-list sheet.
///
/// Only the fields the filter needs are given accessors; the remaining
/// columns (address, offerings, phone, ...) pass through untouched for the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchoolRecord {
    row: SheetRow,
}

impl SchoolRecord {
    /// Wraps a normalized sheet row.
    #[must_use]
    pub const fn new(row: SheetRow) -> Self {
        Self { row }
    }

    /// Wraps every row of a normalized sheet, preserving order.
    #[must_use]
    pub fn from_rows(rows: &[SheetRow]) -> Vec<Self> {
        rows.iter().cloned().map(Self::new).collect()
    }

    /// The full underlying row.
    #[must_use]
    pub const fn row(&self) -> &SheetRow {
        &self.row
    }

    /// Municipality name, tolerating both accented and unaccented headers.
    /// Empty string when the column is absent.
    #[must_use]
    pub fn municipality(&self) -> &str {
        self.row
            .get(columns::SCHOOL_MUNICIPALITY)
            .or_else(|| self.row.get(columns::SCHOOL_MUNICIPALITY_ALT))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    /// Administrative category, falling back to the older
    /// "Dependência Administrativa" header.
    #[must_use]
    pub fn category(&self) -> &str {
        self.row
            .get(columns::CATEGORY)
            .or_else(|| self.row.get(columns::CATEGORY_ALT))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    /// School name.
    #[must_use]
    pub fn school_name(&self) -> &str {
        self.row
            .get(columns::SCHOOL_NAME)
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    /// INEP registration code, if present.
    #[must_use]
    pub fn inep_code(&self) -> Option<&serde_json::Value> {
        self.row.get(columns::INEP_CODE)
    }

    /// Parsed `(latitude, longitude)` pair.
    ///
    /// Returns `None` if either coordinate is missing, unparseable, or
    /// exactly zero. Zero is the dataset's missing-value sentinel, not a
    /// real coordinate: Maranhão is nowhere near the equator or the prime
    /// meridian.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = value::parse_number(self.row.get(columns::LATITUDE)?)?;
        let lng = value::parse_number(self.row.get(columns::LONGITUDE)?)?;
        if lat == 0.0 || lng == 0.0 {
            return None;
        }
        Some((lat, lng))
    }
}

/// A municipality reference as reported on either side of the join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalityRef {
    /// Municipality name, when known.
    pub name: Option<String>,
    /// Municipality code, when known.
    pub code: Option<i64>,
}

/// Result of checking how well the spreadsheet and the boundary collection
/// cover each other. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    /// Aggregate rows on the spreadsheet side. Serialized under the legacy
    /// name the dashboard frontend expects.
    #[serde(rename = "totalMunicipiosExcel")]
    pub total_records: usize,
    /// Features on the boundary side, legacy frontend name as well.
    #[serde(rename = "totalMunicipiosGeojson")]
    pub total_features: usize,
    /// Aggregate rows that found a boundary feature.
    pub matched: usize,
    /// Spreadsheet rows with no matching feature.
    pub unmatched: Vec<MunicipalityRef>,
    /// Features with no matching spreadsheet row.
    pub missing: Vec<MunicipalityRef>,
}

impl CompatibilityReport {
    /// Match coverage as a percentage of the spreadsheet side.
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.matched as f64 / self.total_records as f64 * 100.0
        }
    }

    /// Coverage formatted with one decimal, e.g. `"60.0"`.
    #[must_use]
    pub fn match_percentage(&self) -> String {
        format!("{:.1}", self.coverage())
    }

    /// Whether coverage clears [`MIN_COVERAGE_PERCENT`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.coverage() > MIN_COVERAGE_PERCENT
    }
}

/// Condensed validity judgment derived from a [`CompatibilityReport`],
/// sized for a status line rather than a diagnostics panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Whether the pair of datasets is usable.
    pub is_valid: bool,
    /// Aggregate rows on the spreadsheet side.
    pub total_records: usize,
    /// Features on the boundary side.
    pub total_features: usize,
    /// Matched row count.
    pub matched: usize,
    /// Coverage with one decimal, e.g. `"60.0"`.
    pub match_percentage: String,
    /// Up to the first five unmatched municipality names.
    pub unmatched: Vec<String>,
    /// Human-readable one-line summary.
    pub message: String,
}

/// A non-fatal finding surfaced during loading or validation.
///
/// Warnings are returned as values alongside successful results so callers
/// (and tests) can assert on them instead of scraping log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompatWarning {
    /// No feature in the collection carries a usable `CD_MUN` property;
    /// the join will have to rely on names alone.
    MissingMunicipalityCodes {
        /// How many features were scanned.
        feature_count: usize,
    },
}

impl std::fmt::Display for CompatWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMunicipalityCodes { feature_count } => write!(
                f,
                "none of the {feature_count} features has a CD_MUN property; \
                 municipality matching will fall back to names"
            ),
        }
    }
}

/// Snapshot of the cache contents, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// Number of cached entries.
    pub size: usize,
    /// Cache keys, in key order.
    pub keys: Vec<String>,
}

/// State-wide totals across every aggregate record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStatistics {
    /// Number of municipalities with data.
    pub total_municipalities: usize,
    /// Total school count.
    pub total_schools: u64,
    /// Totals by administrative category.
    pub by_category: CategoryTotals,
    /// Totals by enrollment-size band.
    pub by_band: EnrollmentBands,
}

/// Per-municipality school counts derived from the school list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolStats {
    /// Schools in the municipality.
    pub total: usize,
    /// Counts by administrative category.
    pub by_category: CategoryTotals,
    /// Schools with plottable coordinates.
    pub with_coordinates: usize,
    /// Schools missing usable coordinates.
    pub without_coordinates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, serde_json::Value)]) -> SheetRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn extracts_aggregate_record_with_code_and_name() {
        let row = row(&[
            (columns::CD_MUN, json!(2100055)),
            (columns::MUNICIPALITY, json!("Açailândia")),
            (columns::TOTAL_SCHOOLS, json!(120)),
            (columns::STATE_SCHOOLS, json!(15)),
        ]);
        let rec = AggregateRecord::from_row(&row).unwrap();
        assert_eq!(rec.code, Some(2_100_055));
        assert_eq!(rec.name.as_deref(), Some("Açailândia"));
        assert_eq!(rec.total_schools, 120);
        assert_eq!(rec.by_category.estadual, 15);
        assert_eq!(rec.by_category.federal, 0);
    }

    #[test]
    fn drops_row_without_code_or_name() {
        let row = row(&[(columns::TOTAL_SCHOOLS, json!(3))]);
        assert!(AggregateRecord::from_row(&row).is_none());
    }

    #[test]
    fn accepts_numeric_string_code() {
        let row = row(&[(columns::CD_MUN, json!("2100055"))]);
        let rec = AggregateRecord::from_row(&row).unwrap();
        assert_eq!(rec.code, Some(2_100_055));
    }

    #[test]
    fn school_municipality_falls_back_to_unaccented_header() {
        let school = SchoolRecord::new(row(&[(
            columns::SCHOOL_MUNICIPALITY_ALT,
            json!("Bacabal"),
        )]));
        assert_eq!(school.municipality(), "Bacabal");
    }

    #[test]
    fn zero_coordinates_are_rejected() {
        let school = SchoolRecord::new(row(&[
            (columns::LATITUDE, json!("0")),
            (columns::LONGITUDE, json!("0")),
        ]));
        assert!(school.coordinates().is_none());
    }

    #[test]
    fn string_coordinates_parse() {
        let school = SchoolRecord::new(row(&[
            (columns::LATITUDE, json!("-4.9467")),
            (columns::LONGITUDE, json!("-47.5042")),
        ]));
        let (lat, lng) = school.coordinates().unwrap();
        assert!((lat - -4.9467).abs() < f64::EPSILON);
        assert!((lng - -47.5042).abs() < f64::EPSILON);
    }

    #[test]
    fn coverage_threshold_is_exclusive() {
        let mut report = CompatibilityReport {
            total_records: 100,
            total_features: 100,
            matched: 60,
            unmatched: Vec::new(),
            missing: Vec::new(),
        };
        assert_eq!(report.match_percentage(), "60.0");
        assert!(report.is_valid());

        report.matched = 40;
        assert!(!report.is_valid());

        report.matched = 50;
        assert!(!report.is_valid());
    }

    #[test]
    fn report_serializes_legacy_field_names() {
        let report = CompatibilityReport {
            total_records: 2,
            total_features: 3,
            matched: 1,
            unmatched: Vec::new(),
            missing: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalMunicipiosExcel"], json!(2));
        assert_eq!(json["totalMunicipiosGeojson"], json!(3));
    }
}
