//! Boundary feature collection wrapper.
//!
//! The collection stays a raw `serde_json::Value` underneath: the geometry
//! is opaque to this core and is handed to the renderer untouched. Only the
//! join-relevant properties get typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{columns, value};

/// A `GeoJSON` `FeatureCollection` that passed structural validation.
///
/// Construct through the geography loader; [`FeatureCollection::from_value`]
/// exists for tests and for hosts that bring their own parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureCollection {
    raw: Value,
}

impl FeatureCollection {
    /// Wraps an already-parsed collection. The caller is responsible for
    /// having validated the top-level shape.
    #[must_use]
    pub const fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// The raw collection, for the rendering layer.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.raw
    }

    /// The features array. Empty for a malformed collection, though the
    /// loader never produces one.
    #[must_use]
    pub fn features(&self) -> &[Value] {
        self.raw
            .get("features")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features().len()
    }

    /// Whether the collection has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features().is_empty()
    }

    /// Iterates features through the typed [`Feature`] view.
    pub fn iter(&self) -> impl Iterator<Item = Feature<'_>> {
        self.features().iter().map(Feature)
    }
}

/// Borrowed view over one feature's join-relevant properties.
#[derive(Debug, Clone, Copy)]
pub struct Feature<'a>(pub &'a Value);

impl<'a> Feature<'a> {
    /// The `properties` object, if present.
    #[must_use]
    pub fn properties(&self) -> Option<&'a serde_json::Map<String, Value>> {
        self.0.get("properties")?.as_object()
    }

    /// Raw `CD_MUN` property value.
    #[must_use]
    pub fn code_value(&self) -> Option<&'a Value> {
        self.properties()?.get(columns::CD_MUN)
    }

    /// Municipality code parsed to its canonical integer form.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.code_value().and_then(value::parse_code)
    }

    /// Whether the feature carries a usable (truthy) `CD_MUN`.
    #[must_use]
    pub fn has_code(&self) -> bool {
        self.code_value().is_some_and(value::is_truthy)
    }

    /// Municipality display name (`NM_MUN`).
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        self.properties()?.get(columns::NM_MUN)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> FeatureCollection {
        FeatureCollection::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"CD_MUN": "2100055", "NM_MUN": "Açailândia"}},
                {"type": "Feature", "properties": {"NM_MUN": "Bacabal"}},
            ]
        }))
    }

    #[test]
    fn exposes_features_and_properties() {
        let fc = collection();
        assert_eq!(fc.len(), 2);

        let first = fc.iter().next().unwrap();
        assert_eq!(first.code(), Some(2_100_055));
        assert_eq!(first.name(), Some("Açailândia"));
        assert!(first.has_code());
    }

    #[test]
    fn missing_code_is_not_truthy() {
        let fc = collection();
        let second = fc.iter().nth(1).unwrap();
        assert!(!second.has_code());
        assert_eq!(second.code(), None);
        assert_eq!(second.name(), Some("Bacabal"));
    }
}
