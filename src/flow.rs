//! Dropoff flows leaving a pickup zone.

use serde::Serialize;
use tracing::warn;

use crate::geo::LatLon;
use crate::parser::RawRow;
use crate::schema::{DROPOFF_ID, DROPOFF_LAT, DROPOFF_LON, DROPOFF_RADIUS, PROBABILITY};
use crate::zone::{PickupZone, pickup_location};

/// Per-axis tolerance when matching a row's pickup to a zone.
pub const COORD_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord {
    pub dropoff_id: Option<String>,
    pub dropoff_lat: f64,
    pub dropoff_lon: f64,
    pub dropoff_radius_m: f64,
    /// Percentage, nominally 0..=100.
    pub probability: f64,
}

impl FlowRecord {
    fn from_row(row: &RawRow) -> Option<Self> {
        Some(FlowRecord {
            dropoff_id: DROPOFF_ID.lookup_id(row),
            dropoff_lat: DROPOFF_LAT.lookup_f64(row)?,
            dropoff_lon: DROPOFF_LON.lookup_f64(row)?,
            dropoff_radius_m: DROPOFF_RADIUS.lookup_radius(row),
            probability: PROBABILITY.lookup_f64(row).unwrap_or(0.0),
        })
    }

    pub fn dropoff(&self) -> LatLon {
        LatLon::new(self.dropoff_lat, self.dropoff_lon)
    }

    /// List label: `Zone <id>`, or `Zone <index + 1>` when the id is missing or `-1`.
    pub fn label(&self, index: usize) -> String {
        match self.dropoff_id.as_deref() {
            Some(id) if id != "-1" => format!("Zone {id}"),
            _ => format!("Zone {}", index + 1),
        }
    }

    /// Stroke width of the pickup-to-dropoff line.
    pub fn line_weight(&self) -> f64 {
        (self.probability * 0.2).clamp(2.0, 8.0)
    }
}

fn matches(zone: &PickupZone, pickup: LatLon) -> bool {
    (pickup.lat - zone.location.lat).abs() < COORD_EPSILON
        && (pickup.lon - zone.location.lon).abs() < COORD_EPSILON
}

/// Flows whose pickup matches `zone`, highest probability first.
///
/// Ties keep input order. Rows without finite dropoff coordinates are left out.
pub fn flows_for(zone: &PickupZone, rows: &[RawRow]) -> Vec<FlowRecord> {
    let mut dropped = 0usize;
    let mut flows: Vec<FlowRecord> = rows
        .iter()
        .filter(|row| pickup_location(row).is_some_and(|p| matches(zone, p)))
        .filter_map(|row| {
            let flow = FlowRecord::from_row(row);
            if flow.is_none() {
                dropped += 1;
            }
            flow
        })
        .collect();

    // sort_by is stable
    flows.sort_by(|a, b| b.probability.total_cmp(&a.probability));

    if dropped > 0 {
        warn!(zone = %zone.key, dropped, "Flows without valid dropoff coordinates left out");
    }
    flows
}
