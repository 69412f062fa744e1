//! Application state
//!
//! [`FxApp`] owns the registry and everything built on it. It is driven from
//! a single control thread: inbound messages are routed as they arrive and
//! [`FxApp::tick`] advances playback and releases queued outbound messages.

use std::sync::mpsc;

use crate::control::{ControlContext, ControlMessage, OutboundQueue};
use crate::fx::{register_component, FxComponent};
use crate::groups::{BpmClock, GroupManager};
use crate::registry::{FxEvent, Registry, RegistryError};
use crate::scenes::SceneStore;
use crate::settings::FxSettings;

pub struct FxApp {
    settings: FxSettings,
    registry: Registry,
    groups: GroupManager,
    scenes: SceneStore,
    clock: BpmClock,
    outbound: OutboundQueue,
    /// Every registry event, forwarded to the outbound queue once per tick
    events: mpsc::Receiver<FxEvent>,
}

impl FxApp {
    pub fn new(settings: FxSettings) -> Self {
        let mut registry = Registry::new();
        let (_, events) = registry.events().channel();
        let scenes = SceneStore::new(settings.scenes_dir(), settings.tag_configuration_path())
            .with_toggle_suffix(settings.toggle_reset_suffix.clone());

        Self {
            registry,
            groups: GroupManager::new(),
            scenes,
            clock: BpmClock::new(settings.bpm),
            outbound: OutboundQueue::new(&settings.osc),
            events,
            settings,
        }
    }

    pub fn settings(&self) -> &FxSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn groups(&self) -> &GroupManager {
        &self.groups
    }

    pub fn scenes(&self) -> &SceneStore {
        &self.scenes
    }

    pub fn clock(&self) -> &BpmClock {
        &self.clock
    }

    pub fn outbound(&self) -> &OutboundQueue {
        &self.outbound
    }

    pub fn register_component(&mut self, component: &dyn FxComponent) -> Result<(), RegistryError> {
        register_component(&mut self.registry, component)
    }

    /// Start-up sequence, run once every component is registered: tag
    /// catalogue, a fresh untitled scene, default groups and the scene list.
    pub fn start(&mut self) {
        self.scenes.load_tag_configurations(&mut self.registry);

        if let Err(e) = self.scenes.create_new_scene(None, &mut self.registry, &mut self.groups) {
            tracing::warn!("Failed to start a new scene: {}", e);
        }

        let default_groups = self.settings.default_groups_path();
        if let Err(e) = SceneStore::load_default_groups(&default_groups, &mut self.registry, &mut self.groups) {
            tracing::warn!("Failed to load default groups: {}", e);
        }

        self.scenes.populate_scene_list(&mut self.registry);

        if self.settings.export_parameter_list_on_start {
            if let Err(e) = self.scenes.export_parameter_list(&self.registry, &self.groups) {
                tracing::warn!("Failed to export parameter list: {}", e);
            }
        }

        tracing::info!(
            parameters = self.registry.len(),
            scenes = self.scenes.scenes().len(),
            groups = self.groups.len(),
            "FX app started"
        );
        self.forward_events();
    }

    fn context(&mut self) -> ControlContext<'_> {
        ControlContext {
            registry: &mut self.registry,
            groups: &mut self.groups,
            scenes: &mut self.scenes,
            clock: &mut self.clock,
            max_chunk_length: self.settings.osc.max_chunk_length,
        }
    }

    /// Route one message and return its replies without queueing them
    pub fn handle_message(&mut self, message: &ControlMessage) -> Vec<ControlMessage> {
        self.context().route(message)
    }

    /// Route a message from `node` and queue the replies for that node only
    pub fn receive(&mut self, node: usize, message: &ControlMessage) {
        for reply in self.handle_message(message) {
            self.outbound.enqueue(node, reply);
        }
    }

    /// Advance the clock and groups by `delta_secs`, then return the
    /// outbound messages due this tick as `(node, message)` pairs
    pub fn tick(&mut self, delta_secs: f32) -> Vec<(usize, ControlMessage)> {
        let clock_tick = self.clock.advance(delta_secs);
        if let Some(beat) = clock_tick.beat {
            self.registry.emit(FxEvent::Beat { beat });
        }
        self.groups.tick(clock_tick.delta_beats, &mut self.registry);

        self.forward_events();
        self.outbound.tick(delta_secs)
    }

    fn forward_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.outbound.broadcast(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::Strobe;
    use crate::params::Arg;

    fn app(dir: &std::path::Path) -> FxApp {
        let mut settings = FxSettings::default();
        settings.data_dir = dir.to_path_buf();
        settings.osc.send_interval = 0.0;
        settings.osc.max_messages_per_interval = 100;
        let mut app = FxApp::new(settings);
        app.register_component(&Strobe).unwrap();
        app.start();
        app
    }

    #[test]
    fn test_start_creates_untitled_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        assert_eq!(app.scenes().current_scene().name, "Untitled");
        let broadcast = app.tick(0.0);
        assert!(broadcast.iter().any(|(_, m)| m.address == "/scene/name/get"));
    }

    #[test]
    fn test_replies_go_to_requesting_node() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = FxSettings::default();
        settings.data_dir = dir.path().to_path_buf();
        settings.osc.send_interval = 0.0;
        settings.osc.nodes.push(settings.osc.nodes[0].clone());
        settings.osc.nodes[1].send_param_changes = false;
        let mut app = FxApp::new(settings);
        app.start();
        app.tick(0.0);

        app.receive(1, &ControlMessage::bare("/scene/name/get"));
        let due = app.tick(0.01);
        assert_eq!(due, vec![(1, ControlMessage::new("/scene/name/get", vec![Arg::from("Untitled")]))]);
    }

    #[test]
    fn test_value_changes_are_broadcast_on_tick() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.tick(0.0);

        app.receive(0, &ControlMessage::new("/fx/set", vec!["/Strobe/fxEnabled".into(), Arg::Bool(true)]));
        let due = app.tick(0.01);
        assert!(due.contains(&(
            0,
            ControlMessage::new("/fx/get", vec![Arg::from("/Strobe/fxEnabled"), Arg::Bool(true)])
        )));
    }

    #[test]
    fn test_tick_emits_beats() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.tick(0.0);
        // 120 bpm: one beat every half second
        let due = app.tick(0.6);
        assert!(due.iter().any(|(_, m)| m.address == "/audio/BPM/onBeat"));
    }
}
