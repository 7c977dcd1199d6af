//! Pickup zone deduplication.
//!
//! Every row with finite pickup coordinates maps to a [`ZoneKey`]; the first
//! row seen for a key defines the [`PickupZone`]. All rows, including
//! duplicates and rows without usable coordinates, are kept for flow lookups.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::flow::{FlowRecord, flows_for};
use crate::geo::{Bounds, LatLon};
use crate::parser::RawRow;
use crate::schema::{COORDINATE_GROUPS, PICKUP_ID, PICKUP_LAT, PICKUP_LON, PICKUP_RADIUS};

const MICRO: f64 = 1_000_000.0;

/// Pickup coordinates rounded to 6 decimals, held as integer micro-degrees so
/// equality and hashing never depend on float formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneKey {
    lat_e6: i64,
    lon_e6: i64,
}

impl ZoneKey {
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        Self {
            lat_e6: to_e6(lat),
            lon_e6: to_e6(lon),
        }
    }
}

/// Micro-degrees of `v` rounded to 6 decimals.
///
/// `v * 1e6` rounds before `.round()` does, which can push a value just below
/// a half micro-degree up. `{:.6}` rounds the exact binary value instead.
fn to_e6(v: f64) -> i64 {
    format!("{v:.6}")
        .replace('.', "")
        .parse::<i64>()
        .unwrap_or_else(|_| (v * MICRO).round() as i64)
}

fn write_e6(f: &mut fmt::Formatter<'_>, v: i64) -> fmt::Result {
    let sign = if v < 0 { "-" } else { "" };
    let abs = v.unsigned_abs();
    write!(f, "{sign}{}.{:06}", abs / 1_000_000, abs % 1_000_000)
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_e6(f, self.lat_e6)?;
        f.write_str("_")?;
        write_e6(f, self.lon_e6)
    }
}

impl Serialize for ZoneKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ZoneKeyError {
    #[error("zone key must look like <lat>_<lon>, got '{0}'")]
    Shape(String),
    #[error("zone key coordinate '{0}' is not a finite number")]
    Coordinate(String),
}

impl FromStr for ZoneKey {
    type Err = ZoneKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .trim()
            .split_once('_')
            .ok_or_else(|| ZoneKeyError::Shape(s.to_string()))?;
        let parse = |part: &str| {
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ZoneKeyError::Coordinate(part.to_string()))
        };
        Ok(ZoneKey::from_coords(parse(lat)?, parse(lon)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupZone {
    pub key: ZoneKey,
    pub id: Option<String>,
    /// 1-based position in creation order.
    pub ordinal: usize,
    pub location: LatLon,
    pub radius_m: f64,
}

impl PickupZone {
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("Zone {}", self.ordinal),
        }
    }
}

/// Canonical pickup coordinates of a row, if both are finite.
pub fn pickup_location(row: &RawRow) -> Option<LatLon> {
    Some(LatLon::new(
        PICKUP_LAT.lookup_f64(row)?,
        PICKUP_LON.lookup_f64(row)?,
    ))
}

/// Deduplicated pickup zones plus the full row set they were built from.
#[derive(Debug, Default)]
pub struct ZoneIndex {
    zones: HashMap<ZoneKey, PickupZone>,
    order: Vec<ZoneKey>,
    rows: Vec<RawRow>,
    skipped_rows: usize,
    conflicting_rows: usize,
}

impl ZoneIndex {
    pub fn build(rows: Vec<RawRow>) -> Self {
        let mut index = ZoneIndex::default();

        for (i, row) in rows.iter().enumerate() {
            if let Some((kept, ignored)) = COORDINATE_GROUPS.iter().find_map(|g| g.conflict(row)) {
                index.conflicting_rows += 1;
                debug!(row = i + 1, kept, ignored, "Synonym columns disagree");
            }

            let Some(location) = pickup_location(row) else {
                warn!(row = i + 1, "Skipping row due to invalid pickup coordinates");
                index.skipped_rows += 1;
                continue;
            };

            let key = ZoneKey::from_coords(location.lat, location.lon);
            if index.zones.contains_key(&key) {
                continue;
            }

            let zone = PickupZone {
                key,
                id: PICKUP_ID.lookup_id(row),
                ordinal: index.order.len() + 1,
                location,
                radius_m: PICKUP_RADIUS.lookup_radius(row),
            };
            index.zones.insert(key, zone);
            index.order.push(key);
        }

        if index.conflicting_rows > 0 {
            warn!(
                rows = index.conflicting_rows,
                "Rows carry disagreeing synonym columns; the first populated column was used"
            );
        }

        index.rows = rows;
        info!(
            zones = index.zones.len(),
            rows = index.rows.len(),
            skipped = index.skipped_rows,
            "Created unique pickup zones"
        );
        index
    }

    pub fn get(&self, key: &ZoneKey) -> Option<&PickupZone> {
        self.zones.get(key)
    }

    /// Zones in creation order.
    pub fn zones(&self) -> impl Iterator<Item = &PickupZone> + '_ {
        self.order.iter().filter_map(|k| self.zones.get(k))
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn conflicting_rows(&self) -> usize {
        self.conflicting_rows
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around(self.zones().map(|z| z.location))
    }

    pub fn flows_for(&self, zone: &PickupZone) -> Vec<FlowRecord> {
        flows_for(zone, &self.rows)
    }
}
