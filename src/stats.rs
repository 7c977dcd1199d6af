use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geo::Bounds;
use crate::zone::{ZoneIndex, ZoneKey, pickup_location};

/// Summary of one loaded flow export.
#[derive(Debug, Serialize)]
pub struct DatasetStats {
    pub timestamp: DateTime<Utc>,
    pub total_rows: usize,
    pub zones: usize,
    pub skipped_rows: usize,
    pub skipped_pct: f64,
    pub conflicting_rows: usize,
    /// Rows keyed to the busiest zone, with that zone's key. Ties go to the
    /// zone created first.
    pub busiest_zone: Option<(String, usize)>,
    pub bounds: Option<Bounds>,

    pub parse_error: Option<String>,
}

impl DatasetStats {
    pub fn from_index(index: &ZoneIndex) -> Self {
        let mut rows_per_zone: HashMap<ZoneKey, usize> = HashMap::new();
        for location in index.rows().iter().filter_map(pickup_location) {
            *rows_per_zone
                .entry(ZoneKey::from_coords(location.lat, location.lon))
                .or_default() += 1;
        }

        let mut busiest_zone: Option<(String, usize)> = None;
        for zone in index.zones() {
            let rows = rows_per_zone.get(&zone.key).copied().unwrap_or(0);
            if busiest_zone.as_ref().is_none_or(|(_, best)| rows > *best) {
                busiest_zone = Some((zone.key.to_string(), rows));
            }
        }

        let total_rows = index.rows().len();
        DatasetStats {
            timestamp: Utc::now(),
            total_rows,
            zones: index.len(),
            skipped_rows: index.skipped_rows(),
            skipped_pct: Self::pct(index.skipped_rows(), total_rows),
            conflicting_rows: index.conflicting_rows(),
            busiest_zone,
            bounds: index.bounds(),
            parse_error: None,
        }
    }

    pub fn with_parse_error(mut self, error: Option<&csv::Error>) -> Self {
        self.parse_error = error.map(|e| e.to_string());
        self
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }
}
