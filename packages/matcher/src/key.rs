//! Join keys for the municipality match.

use censo_map_census_models::{AggregateRecord, Feature, MunicipalityRef};

/// The identity of a municipality on either side of the join.
///
/// Two keys match when their codes are equal, or, failing a code on
/// either side, their names are equal after trimming. Codes are compared
/// as canonical integers, so the string `"2100055"` in a feature property
/// matches the number `2100055` in a spreadsheet cell; an absent code
/// never matches another absent code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKey {
    /// Canonical IBGE code, when the side carries one.
    pub code: Option<i64>,
    /// Trimmed municipality name, when the side carries one.
    pub name: Option<String>,
}

impl MatchKey {
    /// Key for a spreadsheet aggregate row.
    #[must_use]
    pub fn of_record(record: &AggregateRecord) -> Self {
        Self {
            code: record.code,
            name: record.name.clone(),
        }
    }

    /// Key for a boundary feature.
    #[must_use]
    pub fn of_feature(feature: Feature<'_>) -> Self {
        Self {
            code: feature.code(),
            name: feature
                .name()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_owned),
        }
    }

    /// A key with neither a code nor a name can never match anything.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.code.is_none() && self.name.is_none()
    }

    /// The key as a reportable reference.
    #[must_use]
    pub fn to_ref(&self) -> MunicipalityRef {
        MunicipalityRef {
            name: self.name.clone(),
            code: self.code,
        }
    }

    /// Best human-readable label: the name, else the code.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.code.map(|c| c.to_string()))
    }
}
