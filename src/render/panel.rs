use serde::Serialize;

use crate::flow::FlowRecord;
use crate::zone::PickupZone;

pub const NO_FLOWS_MESSAGE: &str = "No dropoff flows found.";

/// One clickable line of the flow list. `index` is what a flow-item click reports back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowItem {
    pub index: usize,
    pub label: String,
    pub probability: String,
}

/// Sidebar content for a selected pickup zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoPanel {
    pub title: String,
    pub items: Vec<FlowItem>,
    pub empty_message: Option<&'static str>,
}

impl InfoPanel {
    pub fn for_zone(zone: &PickupZone, flows: &[FlowRecord]) -> Self {
        let items: Vec<FlowItem> = flows
            .iter()
            .enumerate()
            .map(|(index, flow)| FlowItem {
                index,
                label: flow.label(index),
                probability: format!("{:.1}%", flow.probability),
            })
            .collect();
        let empty_message = items.is_empty().then_some(NO_FLOWS_MESSAGE);

        InfoPanel {
            title: format!("Flows from Pickup {}", zone.label()),
            items,
            empty_message,
        }
    }
}
