//! Column synonyms accepted in flow exports.
//!
//! Exports from different clustering runs name the same field differently.
//! Each [`FieldGroup`] lists its synonyms in priority order; the first
//! populated one wins.

use crate::parser::{RawRow, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldGroup {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const PICKUP_LAT: FieldGroup = FieldGroup {
    name: "pickup_lat",
    columns: &["pickup_centroid_lat", "pickup_lat", "pickup_center_lat"],
};
pub const PICKUP_LON: FieldGroup = FieldGroup {
    name: "pickup_lon",
    columns: &["pickup_centroid_lon", "pickup_lon", "pickup_center_lon"],
};
pub const PICKUP_ID: FieldGroup = FieldGroup {
    name: "pickup_id",
    columns: &["pickup_cluster_id", "pickup_zone_id", "pickup_id"],
};
pub const PICKUP_RADIUS: FieldGroup = FieldGroup {
    name: "pickup_radius",
    columns: &["pickup_radius_meters", "pickup_radius"],
};

pub const DROPOFF_LAT: FieldGroup = FieldGroup {
    name: "dropoff_lat",
    columns: &["dropoff_centroid_lat", "dropoff_lat", "dropoff_center_lat"],
};
pub const DROPOFF_LON: FieldGroup = FieldGroup {
    name: "dropoff_lon",
    columns: &["dropoff_centroid_lon", "dropoff_lon", "dropoff_center_lon"],
};
pub const DROPOFF_ID: FieldGroup = FieldGroup {
    name: "dropoff_id",
    columns: &["dropoff_cluster_id", "dropoff_zone_id", "dropoff_id"],
};
pub const DROPOFF_RADIUS: FieldGroup = FieldGroup {
    name: "dropoff_radius",
    columns: &["dropoff_radius_meters", "dropoff_radius"],
};

pub const PROBABILITY: FieldGroup = FieldGroup {
    name: "probability",
    columns: &["probability_%", "probability"],
};

/// Radius used when a row has none, or an unusable one.
pub const DEFAULT_RADIUS_M: f64 = 500.0;

/// Groups checked for disagreeing synonyms while building zones.
pub const COORDINATE_GROUPS: [FieldGroup; 4] = [PICKUP_LAT, PICKUP_LON, DROPOFF_LAT, DROPOFF_LON];

impl FieldGroup {
    /// First populated synonym, in priority order.
    pub fn lookup<'r>(&self, row: &'r RawRow) -> Option<&'r Value> {
        self.columns
            .iter()
            .filter_map(|c| row.get(c))
            .find(|v| v.is_populated())
    }

    pub fn lookup_f64(&self, row: &RawRow) -> Option<f64> {
        self.lookup(row).and_then(Value::as_f64)
    }

    pub fn lookup_id(&self, row: &RawRow) -> Option<String> {
        self.lookup(row).and_then(Value::as_id)
    }

    /// Radius in meters, falling back to [`DEFAULT_RADIUS_M`] when missing,
    /// non-finite or not positive.
    pub fn lookup_radius(&self, row: &RawRow) -> f64 {
        self.lookup_f64(row)
            .filter(|r| *r > 0.0)
            .unwrap_or(DEFAULT_RADIUS_M)
    }

    /// Returns the two columns that are both populated but disagree, if any.
    pub fn conflict(&self, row: &RawRow) -> Option<(&'static str, &'static str)> {
        let populated: Vec<(&'static str, &Value)> = self
            .columns
            .iter()
            .filter_map(|c| row.get(c).map(|v| (*c, v)))
            .filter(|(_, v)| v.is_populated())
            .collect();
        let (first, first_value) = *populated.first()?;
        populated[1..]
            .iter()
            .find(|(_, v)| !same_value(first_value, v))
            .map(|(other, _)| (first, *other))
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_id() == b.as_id(),
    }
}
