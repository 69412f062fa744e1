//! Settings management for Immersive FX
//!
//! Handles loading/saving of the XML settings file: storage locations, tempo,
//! tick rate and the OSC nodes the control surface talks to.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::fx::ENABLED_SUFFIX;

/// Application settings (stored in config directory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "ImmersiveFxSettings")]
pub struct FxSettings {
    /// Root folder for scenes, tag configurations and default groups
    #[serde(rename = "dataDir", default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(rename = "scenesFolder", default = "default_scenes_folder")]
    pub scenes_folder: String,

    #[serde(rename = "tagConfigurationFile", default = "default_tag_configuration_file")]
    pub tag_configuration_file: String,

    #[serde(rename = "defaultGroupsFile", default = "default_groups_file")]
    pub default_groups_file: String,

    /// Boolean toggles ending with this suffix are switched off when a loaded
    /// scene does not mention them
    #[serde(rename = "toggleResetSuffix", default = "default_toggle_reset_suffix")]
    pub toggle_reset_suffix: String,

    /// Write every parameter to the `ParameterList` document at start-up
    #[serde(rename = "exportParameterListOnStart", default)]
    pub export_parameter_list_on_start: bool,

    /// Initial tempo (20-300)
    #[serde(rename = "bpm", default = "default_bpm")]
    pub bpm: f32,

    /// Control loop rate (1-1000)
    #[serde(rename = "tickRateHz", default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    #[serde(rename = "osc", default)]
    pub osc: OscSettings,
}

/// Outbound rate limiting and the node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscSettings {
    /// Seconds between outbound flushes
    #[serde(rename = "sendInterval", default = "default_send_interval")]
    pub send_interval: f32,

    #[serde(rename = "maxMessagesPerInterval", default = "default_max_messages_per_interval")]
    pub max_messages_per_interval: usize,

    /// Upper bound on the JSON payload of one scene list chunk
    #[serde(rename = "maxChunkLength", default = "default_max_chunk_length")]
    pub max_chunk_length: usize,

    #[serde(rename = "node", default)]
    pub nodes: Vec<OscNodeSettings>,
}

/// One remote control peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscNodeSettings {
    #[serde(rename = "localPort")]
    pub local_port: u16,

    #[serde(rename = "remoteHost", default = "default_remote_host")]
    pub remote_host: String,

    #[serde(rename = "remotePort")]
    pub remote_port: u16,

    /// Broadcast value changes to this node
    #[serde(rename = "sendParamChanges", default = "default_send_param_changes")]
    pub send_param_changes: bool,

    /// Send colors as a JSON string instead of an OSC colour argument
    #[serde(rename = "sendColoursAsJson", default)]
    pub send_colours_as_json: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("ImmersiveFx"))
        .unwrap_or_else(|| PathBuf::from("ImmersiveFx"))
}

fn default_scenes_folder() -> String {
    "FX Scenes".to_string()
}

fn default_tag_configuration_file() -> String {
    "TagConfigurations.json".to_string()
}

fn default_groups_file() -> String {
    "DefaultGroups.json".to_string()
}

fn default_toggle_reset_suffix() -> String {
    ENABLED_SUFFIX.to_string()
}

fn default_bpm() -> f32 {
    120.0
}

fn default_tick_rate_hz() -> u32 {
    60
}

fn default_send_interval() -> f32 {
    0.1
}

fn default_max_messages_per_interval() -> usize {
    10
}

fn default_max_chunk_length() -> usize {
    1500
}

fn default_remote_host() -> String {
    "127.0.0.1".to_string()
}

fn default_send_param_changes() -> bool {
    true
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            send_interval: default_send_interval(),
            max_messages_per_interval: default_max_messages_per_interval(),
            max_chunk_length: default_max_chunk_length(),
            nodes: vec![OscNodeSettings::default()],
        }
    }
}

impl Default for OscNodeSettings {
    fn default() -> Self {
        Self {
            local_port: 9000,
            remote_host: default_remote_host(),
            remote_port: 9001,
            send_param_changes: default_send_param_changes(),
            send_colours_as_json: false,
        }
    }
}

impl Default for FxSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            scenes_folder: default_scenes_folder(),
            tag_configuration_file: default_tag_configuration_file(),
            default_groups_file: default_groups_file(),
            toggle_reset_suffix: default_toggle_reset_suffix(),
            export_parameter_list_on_start: false,
            bpm: default_bpm(),
            tick_rate_hz: default_tick_rate_hz(),
            osc: OscSettings::default(),
        }
    }
}

impl FxSettings {
    pub fn scenes_dir(&self) -> PathBuf {
        self.data_dir.join(&self.scenes_folder)
    }

    pub fn tag_configuration_path(&self) -> PathBuf {
        self.data_dir.join(&self.tag_configuration_file)
    }

    pub fn default_groups_path(&self) -> PathBuf {
        self.data_dir.join(&self.default_groups_file)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }

    /// Clamp numeric settings to their valid ranges
    pub fn clamp(&mut self) {
        self.bpm = self.bpm.clamp(20.0, 300.0);
        self.tick_rate_hz = self.tick_rate_hz.clamp(1, 1000);
        self.osc.send_interval = self.osc.send_interval.max(0.0);
        self.osc.max_messages_per_interval = self.osc.max_messages_per_interval.max(1);
    }

    /// Get the settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("ImmersiveFx");
            p.push("settings.xml");
            p
        })
    }

    /// Load settings from an XML file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let mut settings: Self = from_str(&contents)?;
        settings.clamp();
        Ok(settings)
    }

    /// Save settings to an XML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let xml = to_string(self)?;
        let formatted = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml);
        fs::write(path, formatted)?;
        Ok(())
    }

    /// Load from the config directory, falling back to defaults when the
    /// file is missing or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from_file(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings from {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Save to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to_file(&path)
    }
}

/// Settings-related errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::DeError),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::SeError),
    #[error("Could not find config directory")]
    NoConfigDir,
}
