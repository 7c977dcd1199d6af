//! Map drawing.
//!
//! [`MapSurface`] is the seam to whatever actually paints the map. The
//! [`Renderer`] sits on top of it and owns every layer handle it creates, so
//! callers only ever speak in zones and flows.

mod panel;
mod scene;

pub use panel::{FlowItem, InfoPanel, NO_FLOWS_MESSAGE};
pub use scene::{Scene, Viewport};

use std::collections::HashMap;

use serde::Serialize;

use crate::flow::FlowRecord;
use crate::geo::{Bounds, LatLon};
use crate::zone::{PickupZone, ZoneKey};

pub const INITIAL_CENTER: LatLon = LatLon {
    lat: 40.7128,
    lon: -74.0060,
};
pub const INITIAL_ZOOM: u8 = 11;
pub const FOCUS_ZOOM: u8 = 15;
pub const FIT_PADDING_PX: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleStyle {
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

pub const PICKUP_STYLE: CircleStyle = CircleStyle {
    fill_color: "#00d4ff",
    color: "#0099cc",
    weight: 2.0,
    opacity: 0.8,
    fill_opacity: 0.4,
};

pub const SELECTED_PICKUP_STYLE: CircleStyle = CircleStyle {
    fill_color: "#00d4ff",
    color: "#ff6b00",
    weight: 4.0,
    opacity: 0.8,
    fill_opacity: 0.8,
};

pub const DROPOFF_STYLE: CircleStyle = CircleStyle {
    fill_color: "#ff6b00",
    color: "#ff4500",
    weight: 2.0,
    opacity: 0.7,
    fill_opacity: 0.3,
};

pub const FOCUS_STYLE: CircleStyle = CircleStyle {
    fill_color: "#FF0033",
    color: "#FFFFFF",
    weight: 4.0,
    opacity: 1.0,
    fill_opacity: 0.9,
};

pub const FLOW_LINE_COLOR: &str = "#ff6b00";
pub const FLOW_LINE_OPACITY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Circle {
        center: LatLon,
        radius_m: f64,
        style: CircleStyle,
        class: Option<&'static str>,
    },
    Line {
        from: LatLon,
        to: LatLon,
        color: &'static str,
        weight: f64,
        opacity: f64,
    },
}

/// Something that can hold map layers and a sidebar.
pub trait MapSurface {
    fn add_layer(&mut self, layer: Layer) -> LayerId;
    fn remove_layer(&mut self, id: LayerId);
    fn set_circle_style(&mut self, id: LayerId, style: CircleStyle);
    fn fly_to(&mut self, center: LatLon, zoom: u8);
    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32);
    fn show_info_panel(&mut self, panel: InfoPanel);
    fn hide_info_panel(&mut self);
    fn set_loading(&mut self, loading: bool);
}

pub struct Renderer<S> {
    surface: S,
    zone_layers: HashMap<ZoneKey, LayerId>,
    flow_layers: Vec<LayerId>,
}

impl<S: MapSurface> Renderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            zone_layers: HashMap::new(),
            flow_layers: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn flow_layer_count(&self) -> usize {
        self.flow_layers.len()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.surface.set_loading(loading);
    }

    pub fn draw_zones<'z>(&mut self, zones: impl IntoIterator<Item = &'z PickupZone>) {
        for zone in zones {
            if self.zone_layers.contains_key(&zone.key) {
                continue;
            }
            let id = self.surface.add_layer(Layer::Circle {
                center: zone.location,
                radius_m: zone.radius_m,
                style: PICKUP_STYLE,
                class: Some("pickup-circle"),
            });
            self.zone_layers.insert(zone.key, id);
        }
    }

    /// Frames the view around every zone. No-op when there are none.
    pub fn frame(&mut self, bounds: Option<Bounds>) {
        if let Some(bounds) = bounds {
            self.surface.fit_bounds(bounds, FIT_PADDING_PX);
        }
    }

    pub fn highlight_zone(&mut self, selected: ZoneKey) {
        for (key, id) in &self.zone_layers {
            let style = if *key == selected {
                SELECTED_PICKUP_STYLE
            } else {
                PICKUP_STYLE
            };
            self.surface.set_circle_style(*id, style);
        }
    }

    pub fn reset_zone_styles(&mut self) {
        for id in self.zone_layers.values() {
            self.surface.set_circle_style(*id, PICKUP_STYLE);
        }
    }

    /// Replaces the drawn flow set with one line and one dropoff circle per flow.
    pub fn draw_flows(&mut self, zone: &PickupZone, flows: &[FlowRecord]) {
        self.clear_flows();

        for flow in flows {
            let line = self.surface.add_layer(Layer::Line {
                from: zone.location,
                to: flow.dropoff(),
                color: FLOW_LINE_COLOR,
                weight: flow.line_weight(),
                opacity: FLOW_LINE_OPACITY,
            });
            let circle = self.surface.add_layer(Layer::Circle {
                center: flow.dropoff(),
                radius_m: flow.dropoff_radius_m,
                style: DROPOFF_STYLE,
                class: Some("dropoff-circle"),
            });
            self.flow_layers.extend([line, circle]);
        }
    }

    /// Leaves a single highlighted dropoff circle and flies to it.
    pub fn draw_focus(&mut self, flow: &FlowRecord) {
        self.clear_flows();

        let circle = self.surface.add_layer(Layer::Circle {
            center: flow.dropoff(),
            radius_m: flow.dropoff_radius_m,
            style: FOCUS_STYLE,
            class: None,
        });
        self.flow_layers.push(circle);
        self.surface.fly_to(flow.dropoff(), FOCUS_ZOOM);
    }

    pub fn clear_flows(&mut self) {
        for id in self.flow_layers.drain(..) {
            self.surface.remove_layer(id);
        }
    }

    pub fn show_flows_panel(&mut self, zone: &PickupZone, flows: &[FlowRecord]) {
        self.surface.show_info_panel(InfoPanel::for_zone(zone, flows));
    }

    pub fn hide_panel(&mut self) {
        self.surface.hide_info_panel();
    }
}
