use super::group::{GroupController, GroupPreset};
use crate::registry::{address_key, FxEvent, Registry, RegistryError};

const GROUP_PREFIX: &str = "/Group/";

/// Owns every group controller and publishes their changes on the registry bus
#[derive(Debug, Default)]
pub struct GroupManager {
    groups: Vec<GroupController>,
}

impl GroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[GroupController] {
        &self.groups
    }

    pub fn group_list(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.address().to_string()).collect()
    }

    pub fn find(&self, address: &str) -> Option<&GroupController> {
        let key = address_key(address);
        self.groups.iter().find(|g| address_key(g.address()) == key)
    }

    pub fn find_mut(&mut self, address: &str) -> Option<&mut GroupController> {
        let key = address_key(address);
        self.groups.iter_mut().find(|g| address_key(g.address()) == key)
    }

    /// Snapshot of every group for persistence
    pub fn presets(&self) -> Vec<GroupPreset> {
        self.groups.iter().map(GroupController::data).collect()
    }

    fn next_address(&self) -> String {
        (1..)
            .map(|n| format!("{}{}", GROUP_PREFIX, n))
            .find(|candidate| self.find(candidate).is_none())
            .unwrap_or_else(|| GROUP_PREFIX.to_string())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a group, optionally from a preset. An empty preset address gets
    /// the next free `/Group/<n>`.
    pub fn create_group(&mut self, preset: Option<&GroupPreset>, registry: &mut Registry) -> Option<String> {
        let requested = preset.map(|p| p.address.trim()).filter(|a| !a.is_empty());
        let address = match requested {
            Some(address) if self.find(address).is_some() => {
                tracing::warn!(%address, "group already exists");
                return None;
            }
            Some(address) => address.to_string(),
            None => self.next_address(),
        };

        let mut group = GroupController::new(address.clone());
        if let Some(preset) = preset {
            group.load_preset(preset, registry);
        }
        tracing::info!(%address, "created group");
        let data = group.data();
        self.groups.push(group);
        registry.emit(FxEvent::GroupChanged(data));
        registry.emit(FxEvent::GroupListChanged(self.group_list()));
        Some(address)
    }

    pub fn remove_group(&mut self, address: &str, registry: &mut Registry) -> bool {
        let key = address_key(address);
        let before = self.groups.len();
        self.groups.retain(|g| address_key(g.address()) != key);
        if self.groups.len() == before {
            tracing::warn!(%address, "no group to remove");
            return false;
        }
        registry.emit(FxEvent::GroupListChanged(self.group_list()));
        true
    }

    /// Apply a preset to an existing group
    pub fn set_group(&mut self, preset: &GroupPreset, registry: &mut Registry) -> bool {
        self.modify(&preset.address, registry, |group, registry| {
            group.load_preset(preset, registry);
            Ok(true)
        })
    }

    /// Apply persisted presets: existing groups are updated, missing ones created
    pub fn apply_presets(&mut self, presets: &[GroupPreset], registry: &mut Registry) {
        for preset in presets {
            if self.find(&preset.address).is_some() {
                self.set_group(preset, registry);
            } else {
                self.create_group(Some(preset), registry);
            }
        }
    }

    /// Drop every unpinned group and empty the pinned ones
    pub fn on_new_scene(&mut self, registry: &mut Registry) {
        self.groups.retain(GroupController::is_pinned);
        for group in &mut self.groups {
            group.clear();
            registry.emit(FxEvent::GroupChanged(group.data()));
        }
        registry.emit(FxEvent::GroupListChanged(self.group_list()));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Membership
    // ═══════════════════════════════════════════════════════════════════════

    pub fn clear_group(&mut self, address: &str, registry: &mut Registry) -> bool {
        self.modify(address, registry, |group, _| {
            group.clear();
            Ok(true)
        })
    }

    pub fn reset_group(&mut self, address: &str, registry: &mut Registry) -> bool {
        self.modify(address, registry, |group, registry| Ok(group.reset_to_last_loaded(registry)))
    }

    pub fn add_parameter(&mut self, group: &str, parameter: &str, registry: &mut Registry) -> bool {
        self.modify(group, registry, |group, registry| group.add_parameter(registry, parameter))
    }

    pub fn remove_parameter(&mut self, group: &str, parameter: &str, registry: &mut Registry) -> bool {
        self.modify(group, registry, |group, _| Ok(group.remove_parameter(parameter)))
    }

    pub fn remove_parameters(&mut self, group: &str, parameters: &[String], registry: &mut Registry) -> bool {
        self.modify(group, registry, |group, _| {
            Ok(parameters.iter().fold(false, |changed, p| group.remove_parameter(p) || changed))
        })
    }

    pub fn add_trigger(&mut self, group: &str, trigger: &str, registry: &mut Registry) -> bool {
        self.modify(group, registry, |group, registry| group.add_trigger(registry, trigger))
    }

    pub fn remove_trigger(&mut self, group: &str, trigger: &str, registry: &mut Registry) -> bool {
        self.modify(group, registry, |group, _| Ok(group.remove_trigger(trigger)))
    }

    pub fn remove_triggers(&mut self, group: &str, triggers: &[String], registry: &mut Registry) -> bool {
        self.modify(group, registry, |group, _| {
            Ok(triggers.iter().fold(false, |changed, t| group.remove_trigger(t) || changed))
        })
    }

    pub fn set_enabled(&mut self, address: &str, enabled: bool, registry: &mut Registry) -> bool {
        let Some(group) = self.find_mut(address) else {
            tracing::warn!(%address, "no group to enable");
            return false;
        };
        if group.set_enabled(enabled) {
            let address = group.address().to_string();
            registry.emit(FxEvent::GroupEnabledChanged { address, enabled });
        }
        true
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Pattern controls
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_num_beats(&mut self, address: &str, num_beats: u32, registry: &mut Registry) -> bool {
        self.modify(address, registry, |group, _| {
            group.pattern_mut().set_num_beats(num_beats);
            Ok(true)
        })
    }

    pub fn add_tap_trigger(&mut self, address: &str, registry: &mut Registry) -> bool {
        self.modify(address, registry, |group, _| {
            group.pattern_mut().add_trigger_at_current_phase();
            Ok(true)
        })
    }

    pub fn set_tap_trigger_count(&mut self, address: &str, count: u32, registry: &mut Registry) -> bool {
        self.modify(address, registry, |group, _| {
            group.pattern_mut().set_trigger_count(count);
            Ok(true)
        })
    }

    pub fn clear_tap_triggers(&mut self, address: &str, registry: &mut Registry) -> bool {
        self.modify(address, registry, |group, _| {
            group.pattern_mut().clear_triggers();
            Ok(true)
        })
    }

    /// Advance every enabled group
    pub fn tick(&mut self, delta_beats: f32, registry: &mut Registry) {
        for group in &mut self.groups {
            group.tick(delta_beats, registry);
        }
    }

    /// Run `update` on a group and publish its snapshot when it reports a change
    fn modify<F>(&mut self, address: &str, registry: &mut Registry, update: F) -> bool
    where
        F: FnOnce(&mut GroupController, &Registry) -> Result<bool, RegistryError>,
    {
        let Some(group) = self.find_mut(address) else {
            tracing::warn!(%address, "no group at address");
            return false;
        };
        match update(group, registry) {
            Ok(changed) => {
                if changed {
                    registry.emit(FxEvent::GroupChanged(group.data()));
                }
                true
            }
            Err(e) => {
                tracing::warn!(group = %address, "group update failed: {}", e);
                false
            }
        }
    }
}
