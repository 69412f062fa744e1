use serde::Serialize;
use std::fmt::Display;

use super::command::{CommandError, ControlCommand};
use super::message::*;
use crate::groups::{BpmClock, GroupManager};
use crate::params::Arg;
use crate::registry::{FxEvent, Registry};
use crate::scenes::{Scene, SceneStore};

/// Marker payloads framing a chunked scene list
const CHUNK_START: &str = "start";
const CHUNK_END: &str = "end";

/// Everything a control message can reach, borrowed for one dispatch
pub struct ControlContext<'a> {
    pub registry: &'a mut Registry,
    pub groups: &'a mut GroupManager,
    pub scenes: &'a mut SceneStore,
    pub clock: &'a mut BpmClock,
    /// Upper bound on the JSON text of one scene list chunk
    pub max_chunk_length: usize,
}

impl ControlContext<'_> {
    /// Parse and execute a message, returning replies for the sender.
    /// Unknown or malformed messages are logged and produce no reply.
    pub fn route(&mut self, message: &ControlMessage) -> Vec<ControlMessage> {
        match ControlCommand::parse(message) {
            Ok(command) => {
                tracing::trace!(%message, "control message");
                self.execute(command)
            }
            Err(CommandError::UnknownVerb(address)) => {
                tracing::debug!(%address, "no handler for control address");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Ignoring control message: {}", e);
                Vec::new()
            }
        }
    }

    pub fn execute(&mut self, command: ControlCommand) -> Vec<ControlMessage> {
        use ControlCommand::*;

        let mut replies = Vec::new();
        match command {
            // Parameters
            GetValue { address } => match self.registry.get(&address) {
                Some(value) => replies.push(ControlMessage::new(address, value.to_args())),
                None => tracing::warn!(%address, "nothing to report"),
            },
            SetValue { address, args } => {
                self.registry.set(&address, &args);
            }
            Trigger { address } => {
                self.registry.set(&address, &[]);
            }
            Reset { address } => logged("reset parameter", self.registry.reset_to_default(&address)),
            ResetToSceneDefault { address } => {
                logged("reset parameter to scene default", self.registry.reset_to_scene_default(&address))
            }
            SetAffector { address, affector } => logged("set affector", self.registry.set_affector(&address, affector)),
            SetInvert { address, invert } => logged("set invert", self.registry.set_invert(&address, invert)),
            SetPaletteIndex { address, index } => {
                logged("set palette index", self.registry.set_palette_index(&address, index))
            }
            SetUseGlobalPalette { address, enabled } => {
                logged("set global palette flag", self.registry.set_use_global_palette(&address, enabled))
            }
            GetPaletteIndex { address } => {
                if let Some(binding) = self.registry.parameter(&address).and_then(|p| p.palette()) {
                    replies.push(ControlMessage::new(
                        format!("{}{}", address, PALETTE_INDEX_SUFFIX),
                        vec![Arg::Int(binding.index)],
                    ));
                } else {
                    tracing::warn!(%address, "no palette binding");
                }
            }
            GetUseGlobalPalette { address } => {
                if let Some(binding) = self.registry.parameter(&address).and_then(|p| p.palette()) {
                    replies.push(ControlMessage::new(
                        format!("{}{}", address, USE_GLOBAL_PALETTE_SUFFIX),
                        vec![Arg::Bool(binding.use_global)],
                    ));
                } else {
                    tracing::warn!(%address, "no palette binding");
                }
            }

            // Scenes
            LoadScene { name } => {
                self.scenes.load_scene(&name, self.registry, self.groups);
            }
            SaveScene => {
                self.scenes.save_current_scene(self.registry, self.groups);
            }
            SaveSceneAs { name } => logged(
                "save scene",
                self.scenes.save_current_scene_as(&name, self.registry, self.groups),
            ),
            RemoveScene { name } => logged("remove scene", self.scenes.remove_scene(&name, self.registry)),
            NewScene { name } => logged(
                "create scene",
                self.scenes.create_new_scene(name.as_deref(), self.registry, self.groups),
            ),
            ResetScene => {
                self.scenes.reset_current_scene(self.registry, self.groups);
            }
            SetSceneName { name } => match self.scenes.rename_current_scene(&name, self.registry) {
                Ok(()) => {
                    self.scenes.save_current_scene(self.registry, self.groups);
                }
                Err(e) => tracing::warn!("Failed to rename scene: {}", e),
            },
            GetSceneName => replies.push(ControlMessage::new(
                SCENE_NAME_GET,
                vec![Arg::String(self.scenes.current_scene().name.clone())],
            )),
            GetSceneInfo => push_json(&mut replies, SCENE_INFO_GET, vec![], self.scenes.current_scene()),
            GetSceneList => replies.extend(self.scene_list_messages()),
            GetCurrentState => replies.extend(self.current_state()),
            AddSceneTag { id } => logged("tag scene", self.scenes.add_tag_to_current_scene(&id, self.registry)),
            RemoveSceneTag { id } => logged(
                "untag scene",
                self.scenes.remove_tag_from_current_scene(&id, self.registry),
            ),
            ClearSceneTags { tag_type } => {
                self.scenes
                    .remove_all_tags_from_current_scene(tag_type.as_deref(), self.registry);
            }

            // Tag catalogue
            NewTag { tag_type, value } => logged(
                "add tag",
                self.scenes.add_tag_to_configuration(&tag_type, &value, self.registry),
            ),
            RemoveTag { id } => logged(
                "remove tag",
                self.scenes.remove_tag_from_configuration(&id, self.registry),
            ),
            SetTag(tag) => logged("update tag", self.scenes.set_tag(&tag, self.registry)),
            GetTagConfigurations => push_json(
                &mut replies,
                TAG_CONFIGURATION_LIST_GET,
                vec![],
                self.scenes.tags().configurations(),
            ),

            // Groups
            NewGroup(preset) => {
                self.groups.create_group(preset.as_ref(), self.registry);
            }
            RemoveGroup { address } => {
                self.groups.remove_group(&address, self.registry);
            }
            ClearGroup { address } => {
                self.groups.clear_group(&address, self.registry);
            }
            ResetGroup { address } => {
                self.groups.reset_group(&address, self.registry);
            }
            GetGroup { address } => match self.groups.find(&address) {
                Some(group) => push_json(
                    &mut replies,
                    GROUP_GET,
                    vec![Arg::String(group.address().to_string())],
                    &group.data(),
                ),
                None => tracing::warn!(%address, "no group to report"),
            },
            SetGroup(preset) => {
                self.groups.set_group(&preset, self.registry);
            }
            GetGroupList => push_json(&mut replies, GROUP_LIST_GET, vec![], &self.groups.group_list()),
            AddGroupParameter { group, parameter } => {
                self.groups.add_parameter(&group, &parameter, self.registry);
            }
            RemoveGroupParameter { group, parameter } => {
                self.groups.remove_parameter(&group, &parameter, self.registry);
            }
            RemoveGroupParameters { group, parameters } => {
                let parameters = if parameters.is_empty() {
                    self.groups
                        .find(&group)
                        .map(|g| g.parameter_addresses().to_vec())
                        .unwrap_or_default()
                } else {
                    parameters
                };
                self.groups.remove_parameters(&group, &parameters, self.registry);
            }
            AddGroupTrigger { group, trigger } => {
                self.groups.add_trigger(&group, &trigger, self.registry);
            }
            RemoveGroupTrigger { group, trigger } => {
                self.groups.remove_trigger(&group, &trigger, self.registry);
            }
            RemoveGroupTriggers { group, triggers } => {
                let triggers = if triggers.is_empty() {
                    self.groups
                        .find(&group)
                        .map(|g| g.trigger_addresses().to_vec())
                        .unwrap_or_default()
                } else {
                    triggers
                };
                self.groups.remove_triggers(&group, &triggers, self.registry);
            }
            SetGroupEnabled { group, enabled } => {
                self.groups.set_enabled(&group, enabled, self.registry);
            }
            GetGroupEnabled { group } => match self.groups.find(&group) {
                Some(found) => replies.push(ControlMessage::new(
                    GROUP_ENABLED_GET,
                    vec![Arg::String(found.address().to_string()), Arg::Bool(found.is_enabled())],
                )),
                None => tracing::warn!(%group, "no group to report"),
            },
            SetGroupNumBeats { group, num_beats } => {
                self.groups.set_num_beats(&group, num_beats, self.registry);
            }
            AddTapTrigger { group } => {
                self.groups.add_tap_trigger(&group, self.registry);
            }
            SetTapTriggerCount { group, count } => {
                self.groups.set_tap_trigger_count(&group, count, self.registry);
            }
            ClearTapTriggers { group } => {
                self.groups.clear_tap_triggers(&group, self.registry);
            }

            // Tempo
            TapTempo => {
                self.clock.tap();
                self.tempo_changed();
            }
            ResetPhase => self.clock.reset_phase(),
            DoubleBpm => {
                self.clock.double_bpm();
                self.tempo_changed();
            }
            HalfBpm => {
                self.clock.half_bpm();
                self.tempo_changed();
            }
            SetBpm { bpm } => {
                if self.clock.set_bpm(bpm) {
                    self.tempo_changed();
                }
            }
            GetBpm => replies.push(ControlMessage::new(BPM_VALUE_GET, vec![Arg::Float(self.clock.bpm())])),
        }
        replies
    }

    fn tempo_changed(&mut self) {
        let bpm = self.clock.bpm();
        self.registry.emit(FxEvent::TempoChanged { bpm });
    }

    /// Scene list framed by start and end markers, one message per chunk
    fn scene_list_messages(&self) -> Vec<ControlMessage> {
        let chunks = match chunk_scene_list(self.scenes.scenes(), self.max_chunk_length) {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!("Failed to serialize scene list: {}", e);
                return Vec::new();
            }
        };

        let total = chunks.len() as i32;
        let mut messages = Vec::with_capacity(chunks.len() + 2);
        messages.push(ControlMessage::new(
            format!("{}/{}", SCENE_LIST_CHUNKED, CHUNK_START),
            vec![Arg::from(CHUNK_START)],
        ));
        for (index, chunk) in chunks.into_iter().enumerate() {
            messages.push(ControlMessage::new(
                SCENE_LIST_CHUNKED,
                vec![Arg::Int(index as i32 + 1), Arg::Int(total), Arg::String(chunk)],
            ));
        }
        messages.push(ControlMessage::new(
            format!("{}/{}", SCENE_LIST_CHUNKED, CHUNK_END),
            vec![Arg::from(CHUNK_END)],
        ));
        messages
    }

    /// Snapshot for a freshly connected surface: every value, scaled
    /// settings, groups, the current scene, tags and tempo
    fn current_state(&self) -> Vec<ControlMessage> {
        let mut messages = Vec::new();
        for parameter in self.registry.parameters() {
            let address = parameter.address();
            let mut args = vec![Arg::String(address.to_string())];
            args.extend(parameter.value().to_args());
            messages.push(ControlMessage::new(FX_GET, args));

            if let Some(scaled) = self.registry.scaled_parameter(address) {
                messages.push(ControlMessage::new(
                    format!("{}{}", address, AFFECTOR_SUFFIX),
                    vec![Arg::from(scaled.affector().name())],
                ));
                messages.push(ControlMessage::new(
                    format!("{}{}", address, INVERT_SUFFIX),
                    vec![Arg::Bool(scaled.invert())],
                ));
            }
            if let Some(binding) = parameter.palette() {
                messages.push(ControlMessage::new(
                    format!("{}{}", address, PALETTE_INDEX_SUFFIX),
                    vec![Arg::Int(binding.index)],
                ));
                messages.push(ControlMessage::new(
                    format!("{}{}", address, USE_GLOBAL_PALETTE_SUFFIX),
                    vec![Arg::Bool(binding.use_global)],
                ));
            }
        }

        push_json(&mut messages, GROUP_LIST_GET, vec![], &self.groups.group_list());
        for group in self.groups.groups() {
            push_json(
                &mut messages,
                GROUP_GET,
                vec![Arg::String(group.address().to_string())],
                &group.data(),
            );
        }
        push_json(&mut messages, SCENE_INFO_GET, vec![], self.scenes.current_scene());
        messages.push(ControlMessage::new(
            SCENE_NAME_GET,
            vec![Arg::String(self.scenes.current_scene().name.clone())],
        ));
        push_json(
            &mut messages,
            TAG_CONFIGURATION_LIST_GET,
            vec![],
            self.scenes.tags().configurations(),
        );
        messages.push(ControlMessage::new(BPM_VALUE_GET, vec![Arg::Float(self.clock.bpm())]));
        messages
    }
}

/// Split the scene list into JSON arrays no longer than `max_length`.
///
/// A single scene that alone exceeds the limit still gets its own chunk. An
/// empty list yields one empty array.
pub fn chunk_scene_list(scenes: &[Scene], max_length: usize) -> Result<Vec<String>, serde_json::Error> {
    let mut chunks = Vec::new();
    let mut current: Vec<&Scene> = Vec::new();
    let mut current_json = serde_json::to_string(&current)?;

    for scene in scenes {
        current.push(scene);
        let candidate = serde_json::to_string(&current)?;
        if candidate.len() > max_length && current.len() > 1 {
            chunks.push(std::mem::take(&mut current_json));
            current = vec![scene];
            current_json = serde_json::to_string(&current)?;
        } else {
            current_json = candidate;
        }
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current_json);
    }
    Ok(chunks)
}

fn logged<T, E: Display>(action: &str, result: Result<T, E>) {
    if let Err(e) = result {
        tracing::warn!("Failed to {}: {}", action, e);
    }
}

fn push_json<T: Serialize + ?Sized>(messages: &mut Vec<ControlMessage>, address: &str, leading: Vec<Arg>, payload: &T) {
    match ControlMessage::with_json(address, leading, payload) {
        Ok(message) => messages.push(message),
        Err(e) => tracing::warn!(%address, "Failed to serialize reply: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Parameter, ParameterValue};

    struct Fixture {
        registry: Registry,
        groups: GroupManager,
        scenes: SceneStore,
        clock: BpmClock,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut registry = Registry::new();
            registry.register_parameter(Parameter::float("/Blur/amount", 0.0)).unwrap();
            registry
                .register_parameter(Parameter::color("/Tint/colour", crate::params::Color::WHITE))
                .unwrap();
            Self {
                registry,
                groups: GroupManager::new(),
                scenes: SceneStore::new(dir.path().join("scenes"), dir.path().join("tags.json")),
                clock: BpmClock::new(120.0),
                _dir: dir,
            }
        }

        fn route(&mut self, address: &str, args: Vec<Arg>) -> Vec<ControlMessage> {
            let mut context = ControlContext {
                registry: &mut self.registry,
                groups: &mut self.groups,
                scenes: &mut self.scenes,
                clock: &mut self.clock,
                max_chunk_length: 64,
            };
            context.route(&ControlMessage::new(address, args))
        }
    }

    #[test]
    fn test_set_then_get_value() {
        let mut fx = Fixture::new();
        assert!(fx.route("/fx/set", vec!["/blur/AMOUNT".into(), 0.25.into()]).is_empty());
        let replies = fx.route("/FX/GET", vec!["/Blur/amount".into()]);
        assert_eq!(replies, vec![ControlMessage::new("/Blur/amount", vec![Arg::Float(0.25)])]);
    }

    #[test]
    fn test_unknown_and_malformed_messages_are_ignored() {
        let mut fx = Fixture::new();
        assert!(fx.route("/not/a/verb", vec![]).is_empty());
        assert!(fx.route("/fx/set", vec![]).is_empty());
        assert_eq!(fx.registry.get("/Blur/amount"), Some(ParameterValue::Float(0.0)));
    }

    #[test]
    fn test_palette_replies_use_suffix_addresses() {
        let mut fx = Fixture::new();
        fx.route("/fx/globalColourPaletteIndex/set", vec!["/Tint/colour".into(), Arg::Int(3)]);
        let replies = fx.route("/fx/globalColourPaletteIndex/get", vec!["/Tint/colour".into()]);
        assert_eq!(
            replies,
            vec![ControlMessage::new("/Tint/colour/globalColourPaletteIndex", vec![Arg::Int(3)])]
        );
    }

    #[test]
    fn test_tempo_commands_emit_tempo_changed() {
        let mut fx = Fixture::new();
        let (_, events) = fx.registry.events().channel();
        fx.route("/audio/BPM/doubleBPM", vec![]);
        assert_eq!(fx.clock.bpm(), 240.0);
        assert_eq!(events.try_recv().unwrap(), FxEvent::TempoChanged { bpm: 240.0 });

        let replies = fx.route("/audio/BPM/value/get", vec![]);
        assert_eq!(replies, vec![ControlMessage::new(BPM_VALUE_GET, vec![Arg::Float(240.0)])]);
    }

    #[test]
    fn test_non_finite_tempo_is_ignored() {
        let mut fx = Fixture::new();
        let (_, events) = fx.registry.events().channel();
        fx.route("/audio/BPM/value/set", vec![Arg::Float(f32::NAN)]);
        assert_eq!(fx.clock.bpm(), 120.0);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_group_lifecycle_over_messages() {
        let mut fx = Fixture::new();
        fx.route("/group/new", vec![]);
        fx.route("/group/param/add", vec!["/Group/1".into(), "/Blur/amount".into()]);
        let replies = fx.route("/group/get", vec!["/Group/1".into()]);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].str_arg(0), Some("/Group/1"));
        assert!(replies[0].str_arg(1).unwrap().contains("/Blur/amount"));

        fx.route("/group/params/remove", vec!["/Group/1".into()]);
        assert!(fx.groups.find("/Group/1").unwrap().parameter_addresses().is_empty());

        fx.route("/group/enabled/set", vec!["/Group/1".into(), Arg::Bool(false)]);
        let replies = fx.route("/group/enabled/get", vec!["/Group/1".into()]);
        assert_eq!(replies[0].args, vec![Arg::from("/Group/1"), Arg::Bool(false)]);
    }

    #[test]
    fn test_scene_list_is_framed_and_chunked() {
        let mut fx = Fixture::new();
        for name in ["Alpha", "Bravo", "Charlie", "Delta"] {
            fx.route("/scene/saveAs", vec![name.into()]);
        }
        let replies = fx.route("/sceneList/get/chunked", vec![]);
        assert_eq!(replies.first().unwrap().address, "/sceneList/get/chunked/start");
        assert_eq!(replies.last().unwrap().address, "/sceneList/get/chunked/end");

        let chunks = &replies[1..replies.len() - 1];
        assert!(chunks.len() > 1);
        let mut names = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.i32_arg(0), Some(i as i32 + 1));
            assert_eq!(chunk.i32_arg(1), Some(chunks.len() as i32));
            let scenes: Vec<Scene> = serde_json::from_str(chunk.str_arg(2).unwrap()).unwrap();
            names.extend(scenes.into_iter().map(|s| s.name));
        }
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_chunking_keeps_oversized_scene_alone() {
        let scenes = vec![Scene::new("a".repeat(100)), Scene::new("b")];
        let chunks = chunk_scene_list(&scenes, 50).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunk_scene_list(&[], 50).unwrap(), vec!["[]".to_string()]);
    }

    #[test]
    fn test_current_state_reports_everything() {
        let mut fx = Fixture::new();
        let replies = fx.route("/scene/getCurrentState", vec![]);
        let addresses: Vec<&str> = replies.iter().map(|m| m.address.as_str()).collect();
        assert!(addresses.contains(&FX_GET));
        assert!(addresses.contains(&"/Tint/colour/useGlobalColourPalette"));
        assert!(addresses.contains(&SCENE_INFO_GET));
        assert!(addresses.contains(&GROUP_LIST_GET));
        assert!(addresses.contains(&BPM_VALUE_GET));
    }
}
