//! Preset documents: the persisted snapshot of registry values and groups

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::StoreError;
use crate::groups::{GroupManager, GroupPreset};
use crate::params::{Affector, Arg, Color, ParameterValue, ScaledParameter, ValueKind};
use crate::registry::{address_key, Registry};

/// One saved value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetEntry<T> {
    pub key: String,
    pub value: T,
}

/// Saved enum value with the member names it was chosen from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumEntry {
    pub key: String,
    pub value: i32,
    #[serde(default)]
    pub available_names: Vec<String>,
}

/// Saved shaping of a scaled parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledSettings {
    pub key: String,
    pub affector: Affector,
    pub invert: bool,
}

/// Snapshot of saveable parameters bucketed by type, plus groups and scene tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresetDocument {
    pub string_parameters: Vec<PresetEntry<String>>,
    pub int_parameters: Vec<PresetEntry<i32>>,
    pub float_parameters: Vec<PresetEntry<f32>>,
    pub bool_parameters: Vec<PresetEntry<bool>>,
    pub color_parameters: Vec<PresetEntry<Color>>,
    pub enum_parameters: Vec<EnumEntry>,
    pub scaled_settings: Vec<ScaledSettings>,
    pub fx_group_presets: Vec<GroupPreset>,
    pub scene_tag_ids: Vec<String>,
}

impl PresetDocument {
    /// Snapshot the registry. Parameters with their save flag off are skipped
    /// unless `ignore_should_save` is set.
    pub fn capture(registry: &Registry, groups: &GroupManager, tag_ids: &[String], ignore_should_save: bool) -> Self {
        let mut document = Self::default();

        for parameter in registry.parameters() {
            if !ignore_should_save && !parameter.should_save() {
                continue;
            }
            let key = parameter.address().to_string();
            if !parameter.value().is_finite() {
                tracing::warn!(address = %key, "skipping non-finite value");
                continue;
            }
            match parameter.value() {
                ParameterValue::String(v) => document.string_parameters.push(entry(&key, v.clone())),
                ParameterValue::Int(v) => document.int_parameters.push(entry(&key, *v)),
                ParameterValue::Float(v) => document.float_parameters.push(entry(&key, *v)),
                ParameterValue::Bool(v) => document.bool_parameters.push(entry(&key, *v)),
                ParameterValue::Color(v) => document.color_parameters.push(entry(&key, *v)),
                ParameterValue::Enum { index, options } => document.enum_parameters.push(EnumEntry {
                    key: key.clone(),
                    value: *index,
                    available_names: options.clone(),
                }),
                ParameterValue::Vec3(_) => {
                    tracing::warn!(address = %key, "vector parameters are not saved");
                }
            }
            if let Some(scaled) = parameter.as_any().downcast_ref::<ScaledParameter>() {
                document.scaled_settings.push(ScaledSettings {
                    key,
                    affector: scaled.affector(),
                    invert: scaled.invert(),
                });
            }
        }

        document.fx_group_presets = groups.presets();
        document.scene_tag_ids = tag_ids.to_vec();
        document
    }

    /// Number of saved parameter values
    pub fn len(&self) -> usize {
        self.string_parameters.len()
            + self.int_parameters.len()
            + self.float_parameters.len()
            + self.bool_parameters.len()
            + self.color_parameters.len()
            + self.enum_parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every saved value back through the registry.
    ///
    /// Buckets apply in the order string, int, float, bool, color, enum; an
    /// address seen in an earlier bucket is not applied again. Saveable
    /// boolean toggles whose address ends with `toggle_suffix` and that the
    /// document does not mention are switched off. Group members that no
    /// longer resolve are dropped when the presets load.
    pub fn apply(&self, registry: &mut Registry, groups: &mut GroupManager, toggle_suffix: &str) {
        let mut applied: HashSet<String> = HashSet::new();
        let mut apply = |registry: &mut Registry, key: &str, arg: Arg| {
            if !registry.contains(key) {
                tracing::debug!(address = key, "skipping saved value for unknown address");
                return;
            }
            if !applied.insert(address_key(key)) {
                tracing::warn!(address = key, "address saved in more than one bucket, keeping the first");
                return;
            }
            registry.set(key, &[arg]);
        };

        for e in &self.string_parameters {
            apply(registry, &e.key, Arg::String(e.value.clone()));
        }
        for e in &self.int_parameters {
            apply(registry, &e.key, Arg::Int(e.value));
        }
        for e in &self.float_parameters {
            apply(registry, &e.key, Arg::Float(e.value));
        }
        for e in &self.bool_parameters {
            apply(registry, &e.key, Arg::Bool(e.value));
        }
        for e in &self.color_parameters {
            apply(registry, &e.key, Arg::Color(e.value));
        }
        for e in &self.enum_parameters {
            apply(registry, &e.key, Arg::Int(e.value));
        }

        for settings in &self.scaled_settings {
            if !registry.contains(&settings.key) {
                continue;
            }
            let result = registry
                .set_affector(&settings.key, settings.affector)
                .and_then(|_| registry.set_invert(&settings.key, settings.invert));
            if let Err(e) = result {
                tracing::warn!("Failed to restore scaling: {}", e);
            }
        }

        self.reset_absent_toggles(registry, toggle_suffix);
        groups.apply_presets(&self.fx_group_presets, registry);
    }

    fn reset_absent_toggles(&self, registry: &mut Registry, toggle_suffix: &str) {
        let saved: HashSet<String> = self.bool_parameters.iter().map(|e| address_key(&e.key)).collect();
        let suffix = toggle_suffix.to_lowercase();
        let absent: Vec<String> = registry
            .parameters()
            .filter(|p| p.kind() == ValueKind::Bool && p.should_save())
            .map(|p| p.address().to_string())
            .filter(|address| {
                let key = address_key(address);
                key.ends_with(&suffix) && !saved.contains(&key)
            })
            .collect();

        for address in absent {
            if let Err(e) = registry.write(&address, ParameterValue::Bool(false)) {
                tracing::warn!("Failed to reset {}: {}", address, e);
            }
        }
    }
}

fn entry<T>(key: &str, value: T) -> PresetEntry<T> {
    PresetEntry {
        key: key.to_string(),
        value,
    }
}

/// Read and parse a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Err(StoreError::DocumentNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize to pretty JSON and replace `path` atomically (temp file + rename)
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    let write_failure = |source: std::io::Error| StoreError::DocumentWriteFailure {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failure)?;
    }
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    fs::write(&temp, json).map_err(write_failure)?;
    fs::rename(&temp, path).map_err(write_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Parameter;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::string("/Fx/label", "a")).unwrap();
        registry.register_parameter(Parameter::int("/Fx/count", 1)).unwrap();
        registry.register_parameter(Parameter::float("/Fx/level", 0.5)).unwrap();
        registry.register_parameter(Parameter::bool("/Fx/fxEnabled", true)).unwrap();
        registry.register_parameter(Parameter::color("/Fx/colour", Color::WHITE)).unwrap();
        registry
            .register_parameter(Parameter::enumeration("/Fx/mode", &["Off", "On"], 1))
            .unwrap();
        registry
            .register_parameter(Parameter::float("/Fx/output", 0.0).with_should_save(false))
            .unwrap();
        registry
            .register_parameter(ScaledParameter::float("/Fx/speed", 0.2, 0.0, 10.0).with_invert(true))
            .unwrap();
        registry
    }

    #[test]
    fn test_capture_skips_non_finite_values() {
        let mut registry = registry();
        registry.register_parameter(Parameter::float("/Fx/broken", f32::NAN)).unwrap();
        let document = PresetDocument::capture(&registry, &GroupManager::new(), &[], false);
        assert!(document.float_parameters.iter().all(|e| e.key != "/Fx/broken"));
        assert!(document.float_parameters.iter().any(|e| e.key == "/Fx/level"));
    }

    #[test]
    fn test_capture_buckets_by_type() {
        let registry = registry();
        let document = PresetDocument::capture(&registry, &GroupManager::new(), &["t1".into()], false);
        assert_eq!(document.string_parameters.len(), 1);
        assert_eq!(document.int_parameters.len(), 1);
        assert_eq!(document.float_parameters.len(), 2);
        assert_eq!(document.bool_parameters.len(), 1);
        assert_eq!(document.color_parameters.len(), 1);
        assert_eq!(document.enum_parameters[0].available_names, vec!["Off", "On"]);
        assert_eq!(document.scaled_settings[0].key, "/Fx/speed");
        assert!(document.scaled_settings[0].invert);
        assert_eq!(document.scene_tag_ids, vec!["t1"]);
        assert_eq!(document.len(), 7);

        let everything = PresetDocument::capture(&registry, &GroupManager::new(), &[], true);
        assert_eq!(everything.float_parameters.len(), 3);
    }

    #[test]
    fn test_apply_restores_values() {
        let mut registry = registry();
        let mut groups = GroupManager::new();
        let document = PresetDocument::capture(&registry, &groups, &[], false);

        registry.set("/Fx/label", &[Arg::String("b".into())]);
        registry.set("/Fx/count", &[Arg::Int(9)]);
        registry.set("/Fx/level", &[Arg::Float(0.9)]);
        registry.set("/Fx/colour", &[Arg::Color(Color::BLACK)]);
        registry.set("/Fx/mode", &[Arg::Int(0)]);
        registry.set_invert("/Fx/speed", false).unwrap();

        document.apply(&mut registry, &mut groups, "fxEnabled");
        assert_eq!(registry.get_string("/Fx/label"), Some("a".into()));
        assert_eq!(registry.get_i32("/Fx/count"), Some(1));
        assert_eq!(registry.get_f32("/Fx/level"), Some(0.5));
        assert_eq!(registry.get_color("/Fx/colour"), Some(Color::WHITE));
        assert_eq!(registry.get_i32("/Fx/mode"), Some(1));
        assert!(registry.scaled_parameter("/Fx/speed").unwrap().invert());
    }

    #[test]
    fn test_apply_resets_absent_toggles() {
        let mut registry = registry();
        let document = PresetDocument::default();
        document.apply(&mut registry, &mut GroupManager::new(), "fxEnabled");
        assert_eq!(registry.get_bool("/Fx/fxEnabled"), Some(false));
    }

    #[test]
    fn test_apply_skips_unknown_and_duplicate_addresses() {
        let mut registry = registry();
        let document = PresetDocument {
            int_parameters: vec![entry("/Fx/count", 4), entry("/Gone/count", 2)],
            float_parameters: vec![entry("/fx/COUNT", 8.0)],
            ..Default::default()
        };
        document.apply(&mut registry, &mut GroupManager::new(), "fxEnabled");
        assert_eq!(registry.get_i32("/Fx/count"), Some(4));
        assert!(!registry.contains("/Gone/count"));
    }

    #[test]
    fn test_json_shape() {
        let registry = registry();
        let document = PresetDocument::capture(&registry, &GroupManager::new(), &[], false);
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["intParameters"][0]["key"], "/Fx/count");
        assert_eq!(json["colorParameters"][0]["value"]["a"], 1.0);
        assert_eq!(json["enumParameters"][0]["availableNames"][1], "On");
        let parsed: PresetDocument = serde_json::from_str("{\"boolParameters\":[]}").unwrap();
        assert!(parsed.is_empty());
    }
}
