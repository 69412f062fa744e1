use serde::{Deserialize, Serialize};

use super::pattern::{Pattern, PatternOutput, SignalSource};
use crate::params::Arg;
use crate::registry::{address_key, Registry, RegistryError};

/// Serializable group configuration, as stored in scenes and the default groups file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPreset {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub signal_source: SignalSource,
    #[serde(flatten)]
    pub pattern: Pattern,
    #[serde(default, rename = "fxAddresses")]
    pub parameter_addresses: Vec<String>,
    #[serde(default, rename = "fxTriggerAddresses")]
    pub trigger_addresses: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub is_pinned: bool,
}

fn default_enabled() -> bool {
    true
}

impl GroupPreset {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            signal_source: SignalSource::default(),
            pattern: Pattern::default(),
            parameter_addresses: Vec::new(),
            trigger_addresses: Vec::new(),
            enabled: true,
            is_pinned: false,
        }
    }
}

/// A named set of parameter and trigger addresses with its own playback
#[derive(Debug, Clone)]
pub struct GroupController {
    address: String,
    parameter_addresses: Vec<String>,
    trigger_addresses: Vec<String>,
    enabled: bool,
    signal_source: SignalSource,
    pattern: Pattern,
    is_pinned: bool,
    last_loaded: Option<GroupPreset>,
}

impl GroupController {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            parameter_addresses: Vec::new(),
            trigger_addresses: Vec::new(),
            enabled: true,
            signal_source: SignalSource::default(),
            pattern: Pattern::default(),
            is_pinned: false,
            last_loaded: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn parameter_addresses(&self) -> &[String] {
        &self.parameter_addresses
    }

    pub fn trigger_addresses(&self) -> &[String] {
        &self.trigger_addresses
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    pub fn signal_source(&self) -> SignalSource {
        self.signal_source
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn pattern_mut(&mut self) -> &mut Pattern {
        &mut self.pattern
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.is_pinned = pinned;
    }

    pub fn set_signal_source(&mut self, source: SignalSource) {
        self.signal_source = source;
        self.pattern.reset();
    }

    /// Returns `true` when the flag changed. Membership is kept either way.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    /// Add a registered parameter. Returns `Ok(false)` if it is already a member.
    pub fn add_parameter(&mut self, registry: &Registry, address: &str) -> Result<bool, RegistryError> {
        if !registry.is_parameter(address) {
            return Err(RegistryError::AddressNotFound(address.to_string()));
        }
        Ok(push_unique(&mut self.parameter_addresses, address))
    }

    pub fn remove_parameter(&mut self, address: &str) -> bool {
        remove_address(&mut self.parameter_addresses, address)
    }

    /// Add a registered method. Returns `Ok(false)` if it is already a trigger.
    pub fn add_trigger(&mut self, registry: &Registry, address: &str) -> Result<bool, RegistryError> {
        if !registry.is_method(address) {
            return Err(RegistryError::AddressNotFound(address.to_string()));
        }
        Ok(push_unique(&mut self.trigger_addresses, address))
    }

    pub fn remove_trigger(&mut self, address: &str) -> bool {
        remove_address(&mut self.trigger_addresses, address)
    }

    pub fn clear(&mut self) {
        self.parameter_addresses.clear();
        self.trigger_addresses.clear();
    }

    /// Replace configuration and membership, dropping addresses the registry no longer knows
    pub fn load_preset(&mut self, preset: &GroupPreset, registry: &Registry) {
        self.signal_source = preset.signal_source;
        self.pattern = preset.pattern.clone();
        self.pattern.reset();
        self.enabled = preset.enabled;
        self.is_pinned = preset.is_pinned;

        self.parameter_addresses.clear();
        for address in &preset.parameter_addresses {
            if registry.is_parameter(address) {
                push_unique(&mut self.parameter_addresses, address);
            } else {
                tracing::warn!(group = %self.address, %address, "dropping unknown group parameter");
            }
        }
        self.trigger_addresses.clear();
        for address in &preset.trigger_addresses {
            if registry.is_method(address) {
                push_unique(&mut self.trigger_addresses, address);
            } else {
                tracing::warn!(group = %self.address, %address, "dropping unknown group trigger");
            }
        }
        self.last_loaded = Some(preset.clone());
    }

    /// Reload the last applied preset, if any
    pub fn reset_to_last_loaded(&mut self, registry: &Registry) -> bool {
        match self.last_loaded.take() {
            Some(preset) => {
                self.load_preset(&preset, registry);
                true
            }
            None => false,
        }
    }

    /// Serializable snapshot
    pub fn data(&self) -> GroupPreset {
        GroupPreset {
            address: self.address.clone(),
            signal_source: self.signal_source,
            pattern: self.pattern.clone(),
            parameter_addresses: self.parameter_addresses.clone(),
            trigger_addresses: self.trigger_addresses.clone(),
            enabled: self.enabled,
            is_pinned: self.is_pinned,
        }
    }

    /// Advance playback and push the result to members.
    ///
    /// Disabled groups and groups without a pattern source do nothing.
    pub fn tick(&mut self, delta_beats: f32, registry: &mut Registry) -> Option<PatternOutput> {
        if !self.enabled || self.signal_source != SignalSource::Pattern {
            return None;
        }
        let output = self.pattern.advance(delta_beats);

        for address in &self.parameter_addresses {
            if let Err(e) = registry.try_set(address, &[Arg::Float(output.value)]) {
                tracing::trace!(group = %self.address, "member not driven: {}", e);
            }
        }
        if output.triggered {
            for address in &self.trigger_addresses {
                if let Err(e) = registry.try_set(address, &[]) {
                    tracing::warn!(group = %self.address, "trigger failed: {}", e);
                }
            }
        }
        Some(output)
    }
}

fn push_unique(addresses: &mut Vec<String>, address: &str) -> bool {
    let key = address_key(address);
    if addresses.iter().any(|existing| address_key(existing) == key) {
        return false;
    }
    addresses.push(address.to_string());
    true
}

fn remove_address(addresses: &mut Vec<String>, address: &str) -> bool {
    let key = address_key(address);
    let before = addresses.len();
    addresses.retain(|existing| address_key(existing) != key);
    addresses.len() != before
}
