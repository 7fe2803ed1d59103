#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! School-list queries: per-municipality filtering, coordinate
//! partitioning, and category counts.
//!
//! Unlike the municipality join, school filtering is case-insensitive:
//! a map click hands over whatever casing the boundary file uses, and
//! the school list routinely disagrees with it.

use censo_map_census_models::{CategoryTotals, SchoolRecord, SchoolStats};

/// Schools belonging to a municipality, by case-insensitive trimmed name
/// equality, in list order.
#[must_use]
pub fn filter_by_municipality<'a>(
    schools: &'a [SchoolRecord],
    municipality: &str,
) -> Vec<&'a SchoolRecord> {
    let wanted = municipality.trim().to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }
    schools
        .iter()
        .filter(|school| school.municipality().trim().to_lowercase() == wanted)
        .collect()
}

/// Splits schools into those with plottable coordinates and those
/// without, preserving order within each side.
#[must_use]
pub fn partition_by_coordinates<'a>(
    schools: &[&'a SchoolRecord],
) -> (Vec<&'a SchoolRecord>, Vec<&'a SchoolRecord>) {
    schools
        .iter()
        .copied()
        .partition(|school| school.coordinates().is_some())
}

/// Per-municipality counts for the side panel.
#[must_use]
pub fn school_stats(schools: &[SchoolRecord], municipality: &str) -> SchoolStats {
    let in_municipality = filter_by_municipality(schools, municipality);

    let mut by_category = CategoryTotals::default();
    let mut with_coordinates = 0;
    for school in &in_municipality {
        match school.category().trim().to_lowercase().as_str() {
            "estadual" => by_category.estadual += 1,
            "municipal" => by_category.municipal += 1,
            "federal" => by_category.federal += 1,
            "privada" => by_category.privada += 1,
            other => {
                if !other.is_empty() {
                    log::debug!("Unrecognized administrative category \"{other}\"");
                }
            }
        }
        if school.coordinates().is_some() {
            with_coordinates += 1;
        }
    }

    SchoolStats {
        total: in_municipality.len(),
        by_category,
        with_coordinates,
        without_coordinates: in_municipality.len() - with_coordinates,
    }
}
