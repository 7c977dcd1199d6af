//! Zone selection state machine.
//!
//! States are `Unselected` and `Selected(zone)`. Zone clicks select (a repeat
//! click on the selected zone does nothing), flow-item clicks focus a single
//! dropoff, and background clicks clear everything.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::events::MapEvent;
use crate::flow::FlowRecord;
use crate::parser::parse_csv;
use crate::render::{MapSurface, Renderer};
use crate::zone::{ZoneIndex, ZoneKey};

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("no pickup zone is selected")]
    NothingSelected,
    #[error("flow index {index} out of range for {len} flows")]
    FlowIndex { index: usize, len: usize },
    #[error("unknown pickup zone {0}")]
    UnknownZone(ZoneKey),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub zone: Option<ZoneKey>,
    pub flows: Vec<FlowRecord>,
}

pub struct SelectionController<S> {
    zones: ZoneIndex,
    loaded: bool,
    selection: Selection,
    renderer: Renderer<S>,
}

impl<S: MapSurface> SelectionController<S> {
    pub fn new(surface: S) -> Self {
        let mut renderer = Renderer::new(surface);
        renderer.set_loading(true);
        Self {
            zones: ZoneIndex::default(),
            loaded: false,
            selection: Selection::default(),
            renderer,
        }
    }

    pub fn zones(&self) -> &ZoneIndex {
        &self.zones
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    /// Feeds every event to [`Self::handle`] in order.
    pub fn run(&mut self, events: impl IntoIterator<Item = MapEvent>) {
        for event in events {
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: MapEvent) {
        match event {
            MapEvent::DataLoaded(text) => self.load(&text),
            MapEvent::FetchFailed(reason) => {
                error!(reason = %reason, "Error loading CSV data");
            }
            MapEvent::ZoneClicked(key) => {
                if let Err(e) = self.select_zone(key) {
                    warn!(error = %e, "Zone click ignored");
                }
            }
            MapEvent::FlowItemClicked(index) => {
                if let Err(e) = self.focus_flow(index) {
                    error!(error = %e, "Could not find the clicked flow data");
                }
            }
            MapEvent::BackgroundClicked | MapEvent::ClearRequested => self.clear_selection(),
        }
    }

    /// Parses and indexes the CSV, draws every zone and frames the view.
    /// Only the first load of a session is honored.
    pub fn load(&mut self, text: &str) {
        if self.loaded {
            warn!("Data already loaded for this session, ignoring reload");
            return;
        }

        let outcome = parse_csv(text);
        info!(rows = outcome.rows.len(), "CSV data parsed");

        self.zones = ZoneIndex::build(outcome.rows);
        self.loaded = true;

        self.renderer.draw_zones(self.zones.zones());
        self.renderer.frame(self.zones.bounds());
        self.renderer.set_loading(false);
    }

    pub fn select_zone(&mut self, key: ZoneKey) -> Result<(), SelectionError> {
        if self.selection.zone == Some(key) {
            debug!(zone = %key, "Zone already selected");
            return Ok(());
        }
        let zone = self
            .zones
            .get(&key)
            .ok_or(SelectionError::UnknownZone(key))?;

        let flows = self.zones.flows_for(zone);
        info!(zone = %key, flows = flows.len(), "Pickup zone selected");

        self.renderer.highlight_zone(key);
        self.renderer.draw_flows(zone, &flows);
        self.renderer.show_flows_panel(zone, &flows);

        self.selection = Selection {
            zone: Some(key),
            flows,
        };
        Ok(())
    }

    /// Isolates one flow of the current selection and recenters on its dropoff.
    pub fn focus_flow(&mut self, index: usize) -> Result<(), SelectionError> {
        if self.selection.zone.is_none() {
            return Err(SelectionError::NothingSelected);
        }
        let flow = self
            .selection
            .flows
            .get(index)
            .ok_or(SelectionError::FlowIndex {
                index,
                len: self.selection.flows.len(),
            })?;

        debug!(index, probability = flow.probability, "Focusing dropoff");
        self.renderer.draw_focus(flow);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.renderer.clear_flows();
        self.renderer.reset_zone_styles();
        self.renderer.hide_panel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Layer, PICKUP_STYLE, SELECTED_PICKUP_STYLE, Scene, Viewport};

    const CSV: &str = "\
pickup_lat,pickup_lon,pickup_id,dropoff_lat,dropoff_lon,dropoff_id,probability_%
40.7128,-74.006,1,40.73,-73.935,10,65.0
40.7128,-74.006,1,40.65,-73.95,11,20.0
40.80,-73.95,2,40.70,-74.00,12,50.0
";

    fn loaded() -> SelectionController<Scene> {
        let mut c = SelectionController::new(Scene::default());
        c.handle(MapEvent::DataLoaded(CSV.to_string()));
        c
    }

    fn first_key() -> ZoneKey {
        ZoneKey::from_coords(40.7128, -74.006)
    }

    fn zone_style(scene: &Scene, key: ZoneKey) -> Vec<&'static str> {
        scene
            .layers
            .values()
            .filter_map(|l| match l {
                Layer::Circle {
                    center,
                    style,
                    class: Some("pickup-circle"),
                    ..
                } if ZoneKey::from_coords(center.lat, center.lon) == key => Some(style.color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_load_draws_zones_and_frames_view() {
        let c = loaded();
        let scene = c.surface();
        assert_eq!(c.zones().len(), 2);
        assert_eq!(scene.circles_with_class("pickup-circle"), 2);
        assert!(!scene.loading);
        assert!(matches!(scene.viewport, Viewport::Fit { padding_px: 50, .. }));
    }

    #[test]
    fn test_fetch_failure_keeps_loading() {
        let mut c = SelectionController::new(Scene::default());
        c.handle(MapEvent::FetchFailed("Network response error".into()));
        assert!(c.surface().loading);
        assert!(c.surface().layers.is_empty());
    }

    #[test]
    fn test_second_load_is_ignored() {
        let mut c = loaded();
        c.handle(MapEvent::DataLoaded("pickup_lat,pickup_lon\n1,2\n".into()));
        assert_eq!(c.zones().len(), 2);
        assert_eq!(c.surface().circles_with_class("pickup-circle"), 2);
    }

    #[test]
    fn test_select_draws_flows_and_panel() {
        let mut c = loaded();
        c.handle(MapEvent::ZoneClicked(first_key()));

        let scene = c.surface();
        assert_eq!(c.selection().zone, Some(first_key()));
        assert_eq!(c.selection().flows.len(), 2);
        assert_eq!(scene.lines(), 2);
        assert_eq!(scene.circles_with_class("dropoff-circle"), 2);
        assert_eq!(zone_style(scene, first_key()), [SELECTED_PICKUP_STYLE.color]);

        let panel = scene.info_panel.as_ref().unwrap();
        assert_eq!(panel.title, "Flows from Pickup 1");
        assert_eq!(panel.items[0].probability, "65.0%");
        assert_eq!(panel.items[1].probability, "20.0%");
    }

    #[test]
    fn test_reselecting_same_zone_is_noop() {
        let mut c = loaded();
        c.handle(MapEvent::ZoneClicked(first_key()));
        let before_scene = c.surface().clone();
        let before_selection = c.selection().clone();

        c.handle(MapEvent::ZoneClicked(first_key()));

        assert_eq!(c.surface(), &before_scene);
        assert_eq!(c.selection(), &before_selection);
    }

    #[test]
    fn test_switching_zones_does_not_accumulate_flow_layers() {
        let mut c = loaded();
        let other = ZoneKey::from_coords(40.80, -73.95);
        for _ in 0..3 {
            c.handle(MapEvent::ZoneClicked(first_key()));
            c.handle(MapEvent::ZoneClicked(other));
        }

        let scene = c.surface();
        assert_eq!(scene.lines(), 1);
        assert_eq!(scene.circles_with_class("dropoff-circle"), 1);
        assert_eq!(c.renderer().flow_layer_count(), 2);
        assert_eq!(zone_style(scene, first_key()), [PICKUP_STYLE.color]);
        assert_eq!(zone_style(scene, other), [SELECTED_PICKUP_STYLE.color]);
    }

    #[test]
    fn test_focus_flow_isolates_dropoff() {
        let mut c = loaded();
        c.handle(MapEvent::ZoneClicked(first_key()));
        c.handle(MapEvent::FlowItemClicked(1));

        let scene = c.surface();
        assert_eq!(scene.lines(), 0);
        assert_eq!(scene.circles_with_class("dropoff-circle"), 0);
        assert_eq!(c.renderer().flow_layer_count(), 1);
        assert_eq!(scene.fly_to_count, 1);
        match &scene.viewport {
            Viewport::Center { center, zoom } => {
                assert_eq!((center.lat, center.lon), (40.65, -73.95));
                assert_eq!(*zoom, 15);
            }
            other => panic!("unexpected viewport {other:?}"),
        }
        // selection survives a focus
        assert_eq!(c.selection().flows.len(), 2);
    }

    #[test]
    fn test_focus_out_of_range_changes_nothing() {
        let mut c = loaded();
        c.handle(MapEvent::ZoneClicked(first_key()));
        let before_scene = c.surface().clone();
        let before_selection = c.selection().clone();

        assert_eq!(
            c.focus_flow(2),
            Err(SelectionError::FlowIndex { index: 2, len: 2 })
        );
        c.handle(MapEvent::FlowItemClicked(99));

        assert_eq!(c.surface(), &before_scene);
        assert_eq!(c.selection(), &before_selection);
    }

    #[test]
    fn test_focus_without_selection_fails() {
        let mut c = loaded();
        assert_eq!(c.focus_flow(0), Err(SelectionError::NothingSelected));
        assert_eq!(c.surface().fly_to_count, 0);
    }

    #[test]
    fn test_clear_selection_from_any_state() {
        let mut fresh = loaded();
        fresh.clear_selection();

        let mut selected = loaded();
        selected.handle(MapEvent::ZoneClicked(first_key()));
        selected.handle(MapEvent::BackgroundClicked);

        let mut focused = loaded();
        focused.handle(MapEvent::ZoneClicked(first_key()));
        focused.handle(MapEvent::FlowItemClicked(0));
        focused.handle(MapEvent::ClearRequested);

        for c in [&fresh, &selected, &focused] {
            let scene = c.surface();
            assert_eq!(c.selection(), &Selection::default());
            assert_eq!(c.renderer().flow_layer_count(), 0);
            assert_eq!(scene.lines(), 0);
            assert_eq!(scene.layers.len(), 2);
            assert!(scene.info_panel.is_none());
            assert_eq!(zone_style(scene, first_key()), [PICKUP_STYLE.color]);
        }
    }

    #[test]
    fn test_unknown_zone_is_rejected() {
        let mut c = loaded();
        let key = ZoneKey::from_coords(1.0, 1.0);
        assert_eq!(c.select_zone(key), Err(SelectionError::UnknownZone(key)));
        assert_eq!(c.selection().zone, None);
    }

    #[test]
    fn test_run_consumes_event_stream() {
        let mut c = SelectionController::new(Scene::default());
        c.run([
            MapEvent::DataLoaded(CSV.to_string()),
            MapEvent::ZoneClicked(first_key()),
            MapEvent::FlowItemClicked(0),
        ]);
        assert_eq!(c.surface().fly_to_count, 1);
        assert_eq!(c.selection().zone, Some(first_key()));
    }
}
