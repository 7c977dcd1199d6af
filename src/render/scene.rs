use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::{CircleStyle, INITIAL_CENTER, INITIAL_ZOOM, InfoPanel, Layer, LayerId, MapSurface};
use crate::geo::{Bounds, LatLon};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Viewport {
    Center { center: LatLon, zoom: u8 },
    Fit { bounds: Bounds, padding_px: u32 },
}

/// In-memory [`MapSurface`]: keeps the layers, viewport and sidebar as plain
/// data so they can be inspected or dumped as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub layers: BTreeMap<LayerId, Layer>,
    pub viewport: Viewport,
    pub info_panel: Option<InfoPanel>,
    pub loading: bool,
    pub fly_to_count: usize,
    #[serde(skip)]
    next_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            layers: BTreeMap::new(),
            viewport: Viewport::Center {
                center: INITIAL_CENTER,
                zoom: INITIAL_ZOOM,
            },
            info_panel: None,
            loading: true,
            fly_to_count: 0,
            next_id: 0,
        }
    }
}

impl Scene {
    pub fn circles_with_class(&self, class: &str) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Circle { class: Some(c), .. } if *c == class))
            .count()
    }

    pub fn lines(&self) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Line { .. }))
            .count()
    }
}

impl MapSurface for Scene {
    fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, layer);
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        if self.layers.remove(&id).is_none() {
            warn!(layer = id.0, "Removing unknown layer");
        }
    }

    fn set_circle_style(&mut self, id: LayerId, new_style: CircleStyle) {
        match self.layers.get_mut(&id) {
            Some(Layer::Circle { style, .. }) => *style = new_style,
            _ => warn!(layer = id.0, "Restyling a layer that is not a circle"),
        }
    }

    fn fly_to(&mut self, center: LatLon, zoom: u8) {
        debug!(lat = center.lat, lon = center.lon, zoom, "Flying to");
        self.viewport = Viewport::Center { center, zoom };
        self.fly_to_count += 1;
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32) {
        self.viewport = Viewport::Fit { bounds, padding_px };
    }

    fn show_info_panel(&mut self, panel: InfoPanel) {
        self.info_panel = Some(panel);
    }

    fn hide_info_panel(&mut self) {
        self.info_panel = None;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}
