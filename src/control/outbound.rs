use std::collections::VecDeque;

use super::message::*;
use crate::params::Arg;
use crate::registry::FxEvent;
use crate::settings::OscSettings;

/// Value changes of group-owned parameters are not mirrored to surfaces
const GROUP_SEGMENT: &str = "/Group/";

#[derive(Debug)]
struct NodeQueue {
    send_param_changes: bool,
    pending: VecDeque<ControlMessage>,
}

/// Per-node outbound queues, released at a bounded rate.
///
/// Every `send_interval` seconds up to `max_messages_per_interval` messages
/// leave each node's queue in FIFO order.
#[derive(Debug)]
pub struct OutboundQueue {
    nodes: Vec<NodeQueue>,
    send_interval: f32,
    max_messages_per_interval: usize,
    elapsed: f32,
}

impl OutboundQueue {
    pub fn new(settings: &OscSettings) -> Self {
        let nodes = settings
            .nodes
            .iter()
            .map(|node| NodeQueue {
                send_param_changes: node.send_param_changes,
                pending: VecDeque::new(),
            })
            .collect();
        Self {
            nodes,
            send_interval: settings.send_interval.max(0.0),
            max_messages_per_interval: settings.max_messages_per_interval.max(1),
            elapsed: 0.0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pending(&self, node: usize) -> usize {
        self.nodes.get(node).map_or(0, |n| n.pending.len())
    }

    /// Queue a message for one node. Returns `false` for an unknown node.
    pub fn enqueue(&mut self, node: usize, message: ControlMessage) -> bool {
        match self.nodes.get_mut(node) {
            Some(queue) => {
                queue.pending.push_back(message);
                true
            }
            None => {
                tracing::warn!(node, "no OSC node to queue for");
                false
            }
        }
    }

    /// Queue the broadcast for `event` on every node that wants change notifications
    pub fn broadcast(&mut self, event: &FxEvent) {
        let messages = event_messages(event);
        if messages.is_empty() {
            return;
        }
        for queue in self.nodes.iter_mut().filter(|n| n.send_param_changes) {
            queue.pending.extend(messages.iter().cloned());
        }
    }

    /// Advance the send timer; returns `(node, message)` pairs due now
    pub fn tick(&mut self, delta_secs: f32) -> Vec<(usize, ControlMessage)> {
        self.elapsed += delta_secs.max(0.0);
        if self.elapsed < self.send_interval {
            return Vec::new();
        }
        self.elapsed = 0.0;

        let mut due = Vec::new();
        for (index, queue) in self.nodes.iter_mut().enumerate() {
            let count = queue.pending.len().min(self.max_messages_per_interval);
            due.extend(queue.pending.drain(..count).map(|m| (index, m)));
        }
        due
    }
}

/// Broadcast messages for a registry event. Membership events such as
/// [`FxEvent::ItemAdded`] produce none.
pub fn event_messages(event: &FxEvent) -> Vec<ControlMessage> {
    match event {
        FxEvent::ValueChanged { address, value, .. } => {
            if address.contains(GROUP_SEGMENT) {
                return Vec::new();
            }
            let mut args = vec![Arg::String(address.clone())];
            args.extend(value.to_args());
            vec![ControlMessage::new(FX_GET, args)]
        }
        FxEvent::ScaleChanged {
            address,
            affector,
            invert,
            ..
        } => vec![
            ControlMessage::new(format!("{}{}", address, AFFECTOR_SUFFIX), vec![Arg::from(affector.name())]),
            ControlMessage::new(format!("{}{}", address, INVERT_SUFFIX), vec![Arg::Bool(*invert)]),
        ],
        FxEvent::PaletteIndexChanged { address, index } => vec![ControlMessage::new(
            format!("{}{}", address, PALETTE_INDEX_SUFFIX),
            vec![Arg::Int(*index)],
        )],
        FxEvent::UseGlobalPaletteChanged { address, enabled } => vec![ControlMessage::new(
            format!("{}{}", address, USE_GLOBAL_PALETTE_SUFFIX),
            vec![Arg::Bool(*enabled)],
        )],
        FxEvent::GroupChanged(preset) => {
            json_message(GROUP_GET, vec![Arg::String(preset.address.clone())], preset)
        }
        FxEvent::GroupEnabledChanged { address, enabled } => vec![ControlMessage::new(
            GROUP_ENABLED_GET,
            vec![Arg::String(address.clone()), Arg::Bool(*enabled)],
        )],
        FxEvent::GroupListChanged(list) => json_message(GROUP_LIST_GET, vec![], list),
        FxEvent::SceneLoaded { name } => vec![ControlMessage::new(SCENE_LOAD, vec![Arg::String(name.clone())])],
        FxEvent::SceneListUpdated(scenes) => json_message(SCENE_LIST_GET, vec![], scenes),
        FxEvent::CurrentSceneChanged(scene) => json_message(SCENE_INFO_GET, vec![], scene),
        FxEvent::CurrentSceneNameChanged { name } => {
            vec![ControlMessage::new(SCENE_NAME_GET, vec![Arg::String(name.clone())])]
        }
        FxEvent::TagConfigurationsUpdated(configurations) => {
            json_message(TAG_CONFIGURATION_LIST_GET, vec![], configurations)
        }
        FxEvent::TempoChanged { bpm } => vec![ControlMessage::new(BPM_VALUE_GET, vec![Arg::Float(*bpm)])],
        FxEvent::Beat { beat } => vec![ControlMessage::new(BPM_ON_BEAT, vec![Arg::Int(*beat as i32)])],
        FxEvent::ItemAdded { .. } | FxEvent::ItemRemoved { .. } => Vec::new(),
    }
}

fn json_message<T: serde::Serialize + ?Sized>(address: &str, leading: Vec<Arg>, payload: &T) -> Vec<ControlMessage> {
    match ControlMessage::with_json(address, leading, payload) {
        Ok(message) => vec![message],
        Err(e) => {
            tracing::warn!(%address, "Failed to serialize broadcast: {}", e);
            Vec::new()
        }
    }
}
