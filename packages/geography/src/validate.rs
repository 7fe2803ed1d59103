//! Structural validation for boundary collections.
//!
//! Checks run in a fixed order and stop at the first failure, so callers
//! get the most fundamental problem first (a payload that is not even an
//! object never reports "no features").

use censo_map_census_models::{CompatWarning, Feature, FeatureCollection};
use serde_json::Value;

use crate::GeoError;

/// Validates the top-level shape of a parsed collection.
///
/// Hard checks, in order: the value is an object; its `type` is exactly
/// `"FeatureCollection"`; `features` is an array; the array is non-empty.
/// Passing those, one soft check scans for at least one feature with a
/// usable `CD_MUN` and returns a [`CompatWarning`] when none is found.
///
/// # Errors
///
/// Returns [`GeoError::InvalidStructure`] naming the first failed check.
pub fn validate_collection(raw: &Value) -> Result<Vec<CompatWarning>, GeoError> {
    let Some(object) = raw.as_object() else {
        return Err(GeoError::InvalidStructure(
            "payload is not a JSON object".to_owned(),
        ));
    };

    if object.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(GeoError::InvalidStructure(
            "\"type\" must be \"FeatureCollection\"".to_owned(),
        ));
    }

    let Some(features) = object.get("features").and_then(Value::as_array) else {
        return Err(GeoError::InvalidStructure(
            "\"features\" must be an array".to_owned(),
        ));
    };

    if features.is_empty() {
        return Err(GeoError::InvalidStructure(
            "collection contains no features".to_owned(),
        ));
    }

    let mut warnings = Vec::new();
    if !features.iter().any(|f| Feature(f).has_code()) {
        let warning = CompatWarning::MissingMunicipalityCodes {
            feature_count: features.len(),
        };
        log::warn!("{warning}");
        warnings.push(warning);
    }

    log::debug!("GeoJSON validated: {} features", features.len());
    Ok(warnings)
}

/// Re-derives the soft findings for an already-validated collection, used
/// on cache hits so they report the same warnings as the original load.
#[must_use]
pub fn soft_warnings(collection: &FeatureCollection) -> Vec<CompatWarning> {
    if collection.iter().any(|f| f.has_code()) {
        Vec::new()
    } else {
        vec![CompatWarning::MissingMunicipalityCodes {
            feature_count: collection.len(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invalid_reason(raw: &Value) -> String {
        match validate_collection(raw).unwrap_err() {
            GeoError::InvalidStructure(reason) => reason,
            other => panic!("expected InvalidStructure, got {other}"),
        }
    }

    #[test]
    fn rejects_non_object_payload() {
        assert!(invalid_reason(&json!([1, 2, 3])).contains("not a JSON object"));
        assert!(invalid_reason(&Value::Null).contains("not a JSON object"));
    }

    #[test]
    fn rejects_wrong_type_field() {
        let raw = json!({"type": "Feature", "features": []});
        assert!(invalid_reason(&raw).contains("FeatureCollection"));
    }

    #[test]
    fn rejects_missing_features_before_scanning_them() {
        let raw = json!({"type": "FeatureCollection"});
        assert!(invalid_reason(&raw).contains("must be an array"));
    }

    #[test]
    fn rejects_empty_features() {
        let raw = json!({"type": "FeatureCollection", "features": []});
        assert!(invalid_reason(&raw).contains("no features"));
    }

    #[test]
    fn warns_when_no_feature_has_a_code() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NM_MUN": "Bacabal"}},
                {"type": "Feature", "properties": {"CD_MUN": ""}},
            ]
        });
        let warnings = validate_collection(&raw).unwrap();
        assert_eq!(
            warnings,
            vec![CompatWarning::MissingMunicipalityCodes { feature_count: 2 }]
        );
    }

    #[test]
    fn a_single_code_suppresses_the_warning() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NM_MUN": "Bacabal"}},
                {"type": "Feature", "properties": {"CD_MUN": 2100055}},
            ]
        });
        assert!(validate_collection(&raw).unwrap().is_empty());
    }
}
