#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Join between spreadsheet aggregate records and boundary features.
//!
//! A record and a feature refer to the same municipality when their IBGE
//! codes are equal, falling back to exact trimmed names when a code is
//! missing on either side. Codes are compared as canonical integers so
//! string-typed feature properties match number-typed cells; nothing is
//! ever matched on an absent key.

pub mod index;
pub mod key;

use censo_map_census_models::{
    AggregateRecord, CompatibilityReport, FeatureCollection, ValidationSummary,
};

use crate::{index::KeyIndex, key::MatchKey};

/// Cross-checks both sides of the join and reports coverage.
///
/// The spreadsheet side drives validity: a record with neither a matching
/// feature lands in `unmatched`, and a feature with no matching record
/// lands in `missing`. The report is recomputed from scratch each call.
#[must_use]
pub fn check_compatibility(
    records: &[AggregateRecord],
    collection: &FeatureCollection,
) -> CompatibilityReport {
    let feature_index = KeyIndex::build(collection.iter().map(MatchKey::of_feature));
    let record_index = KeyIndex::build(records.iter().map(MatchKey::of_record));

    let mut matched = 0;
    let mut unmatched = Vec::new();
    for record in records {
        let key = MatchKey::of_record(record);
        if feature_index.contains(&key) {
            matched += 1;
        } else {
            unmatched.push(key.to_ref());
        }
    }

    let mut missing = Vec::new();
    for feature in collection.iter() {
        let key = MatchKey::of_feature(feature);
        if !record_index.contains(&key) {
            missing.push(key.to_ref());
        }
    }

    let report = CompatibilityReport {
        total_records: records.len(),
        total_features: collection.len(),
        matched,
        unmatched,
        missing,
    };

    log::info!(
        "Compatibility: {}/{} records matched ({}%), {} features without data",
        report.matched,
        report.total_records,
        report.match_percentage(),
        report.missing.len()
    );

    report
}

/// Condenses a report into a status-line verdict.
///
/// Carries up to the first five unmatched municipality labels; validity
/// requires strictly more than half of the records to match.
#[must_use]
pub fn validation_summary(report: &CompatibilityReport) -> ValidationSummary {
    let unmatched: Vec<String> = report
        .unmatched
        .iter()
        .filter_map(|m| {
            m.name
                .clone()
                .or_else(|| m.code.map(|c| c.to_string()))
        })
        .take(5)
        .collect();

    ValidationSummary {
        is_valid: report.is_valid(),
        total_records: report.total_records,
        total_features: report.total_features,
        matched: report.matched,
        match_percentage: report.match_percentage(),
        unmatched,
        message: format!(
            "{}/{} municípios encontrados ({}%)",
            report.matched,
            report.total_records,
            report.match_percentage()
        ),
    }
}

/// Bidirectional lookup between records and features, built once and
/// queried per click or hover.
pub struct MunicipalityLookup<'a> {
    records: &'a [AggregateRecord],
    record_index: KeyIndex,
    feature_index: KeyIndex,
}

impl<'a> MunicipalityLookup<'a> {
    /// Indexes both sides.
    #[must_use]
    pub fn new(records: &'a [AggregateRecord], collection: &FeatureCollection) -> Self {
        Self {
            records,
            record_index: KeyIndex::build(records.iter().map(MatchKey::of_record)),
            feature_index: KeyIndex::build(collection.iter().map(MatchKey::of_feature)),
        }
    }

    /// The aggregate record behind a boundary feature, if any.
    #[must_use]
    pub fn record_for(&self, key: &MatchKey) -> Option<&'a AggregateRecord> {
        self.record_index.find(key).map(|i| &self.records[i])
    }

    /// Resolves a free-form identifier (a code or a name, as a string)
    /// to its aggregate record.
    #[must_use]
    pub fn record_by_identifier(&self, identifier: &str) -> Option<&'a AggregateRecord> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }
        let key = MatchKey {
            code: identifier.parse().ok(),
            name: Some(identifier.to_owned()),
        };
        self.record_for(&key)
    }

    /// Position of the feature matching `record` in the collection's
    /// `features` array, if any.
    #[must_use]
    pub fn feature_position(&self, record: &AggregateRecord) -> Option<usize> {
        self.feature_index.find(&MatchKey::of_record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use censo_map_census_models::MunicipalityRef;
    use serde_json::json;

    fn record(code: Option<i64>, name: &str) -> AggregateRecord {
        AggregateRecord {
            code,
            name: Some(name.to_owned()),
            ..AggregateRecord::default()
        }
    }

    fn collection(features: serde_json::Value) -> FeatureCollection {
        FeatureCollection::from_value(json!({
            "type": "FeatureCollection",
            "features": features,
        }))
    }

    #[test]
    fn matches_by_code_and_by_name() {
        // A matches by code (string vs number), B by name only, C not at
        // all.
        let records = vec![
            record(Some(2_100_055), "Açailândia"),
            record(None, "Bacabal"),
            record(None, "Cidade Fantasma"),
        ];
        let features = collection(json!([
            {"properties": {"CD_MUN": "2100055", "NM_MUN": "Acailandia"}},
            {"properties": {"NM_MUN": "Bacabal"}},
        ]));

        let report = check_compatibility(&records, &features);
        assert_eq!(report.matched, 2);
        assert_eq!(
            report.unmatched,
            vec![MunicipalityRef {
                name: Some("Cidade Fantasma".to_owned()),
                code: None,
            }]
        );
        assert!(report.missing.is_empty());
    }

    #[test]
    fn features_without_data_are_reported_missing() {
        let records = vec![record(Some(1), "Caxias")];
        let features = collection(json!([
            {"properties": {"CD_MUN": 1, "NM_MUN": "Caxias"}},
            {"properties": {"CD_MUN": 2, "NM_MUN": "Codó"}},
        ]));

        let report = check_compatibility(&records, &features);
        assert_eq!(report.matched, 1);
        assert_eq!(
            report.missing,
            vec![MunicipalityRef {
                name: Some("Codó".to_owned()),
                code: Some(2),
            }]
        );
    }

    #[test]
    fn name_matching_is_case_sensitive() {
        let records = vec![record(None, "caxias")];
        let features = collection(json!([
            {"properties": {"NM_MUN": "Caxias"}},
        ]));

        let report = check_compatibility(&records, &features);
        assert_eq!(report.matched, 0);
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.missing.len(), 1);
    }

    #[test]
    fn summary_carries_at_most_five_unmatched_labels() {
        let records: Vec<AggregateRecord> = (0..8)
            .map(|i| record(None, &format!("Município {i}")))
            .collect();
        let features = collection(json!([
            {"properties": {"NM_MUN": "Outro"}},
        ]));

        let report = check_compatibility(&records, &features);
        let summary = validation_summary(&report);
        assert!(!summary.is_valid);
        assert_eq!(summary.unmatched.len(), 5);
        assert_eq!(summary.unmatched[0], "Município 0");
        assert_eq!(summary.match_percentage, "0.0");
        assert_eq!(summary.message, "0/8 municípios encontrados (0.0%)");
    }

    #[test]
    fn validity_requires_a_strict_majority() {
        let records = vec![
            record(Some(1), "A"),
            record(Some(2), "B"),
            record(Some(3), "C"),
            record(Some(4), "D"),
        ];
        let features = collection(json!([
            {"properties": {"CD_MUN": 1}},
            {"properties": {"CD_MUN": 2}},
        ]));

        // Exactly 50% is not enough.
        let report = check_compatibility(&records, &features);
        assert_eq!(report.match_percentage(), "50.0");
        assert!(!validation_summary(&report).is_valid);
    }

    #[test]
    fn lookup_resolves_identifiers_both_ways() {
        let records = vec![
            record(Some(2_100_055), "Açailândia"),
            record(None, "Bacabal"),
        ];
        let features = collection(json!([
            {"properties": {"CD_MUN": "2100055", "NM_MUN": "Açailândia"}},
            {"properties": {"NM_MUN": "Bacabal"}},
        ]));

        let lookup = MunicipalityLookup::new(&records, &features);

        let by_code = lookup.record_by_identifier("2100055").unwrap();
        assert_eq!(by_code.name.as_deref(), Some("Açailândia"));

        let by_name = lookup.record_by_identifier("Bacabal").unwrap();
        assert!(by_name.code.is_none());

        assert_eq!(lookup.feature_position(&records[1]), Some(1));
        assert!(lookup.record_by_identifier("Inexistente").is_none());
        assert!(lookup.record_by_identifier("  ").is_none());
    }
}
