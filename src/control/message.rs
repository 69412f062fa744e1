use serde::Serialize;
use std::fmt;

use crate::params::Arg;

// Outbound addresses
pub const FX_GET: &str = "/fx/get";
pub const AFFECTOR_SUFFIX: &str = "/affector";
pub const INVERT_SUFFIX: &str = "/invert";
pub const PALETTE_INDEX_SUFFIX: &str = "/globalColourPaletteIndex";
pub const USE_GLOBAL_PALETTE_SUFFIX: &str = "/useGlobalColourPalette";
pub const GROUP_GET: &str = "/group/get";
pub const GROUP_ENABLED_GET: &str = "/group/enabled/get";
pub const GROUP_LIST_GET: &str = "/groupList/get";
pub const SCENE_LOAD: &str = "/scene/load";
pub const SCENE_INFO_GET: &str = "/scene/info/get";
pub const SCENE_NAME_GET: &str = "/scene/name/get";
pub const SCENE_LIST_GET: &str = "/sceneList/get";
pub const SCENE_LIST_CHUNKED: &str = "/sceneList/get/chunked";
pub const TAG_CONFIGURATION_LIST_GET: &str = "/tagConfigurationList/get";
pub const BPM_VALUE_GET: &str = "/audio/BPM/value/get";
pub const BPM_ON_BEAT: &str = "/audio/BPM/onBeat";

/// Transport-neutral control message: an address and its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ControlMessage {
    pub address: String,
    pub args: Vec<Arg>,
}

impl ControlMessage {
    pub fn new(address: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Message with no arguments
    pub fn bare(address: impl Into<String>) -> Self {
        Self::new(address, Vec::new())
    }

    /// `leading` arguments followed by `payload` serialized as a JSON string
    pub fn with_json<T: Serialize + ?Sized>(
        address: impl Into<String>,
        mut leading: Vec<Arg>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        leading.push(Arg::String(serde_json::to_string(payload)?));
        Ok(Self::new(address, leading))
    }

    pub fn arg(&self, index: usize) -> Option<&Arg> {
        self.args.get(index)
    }

    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.arg(index)?.as_str()
    }

    pub fn i32_arg(&self, index: usize) -> Option<i32> {
        self.arg(index)?.as_i32()
    }

    pub fn f32_arg(&self, index: usize) -> Option<f32> {
        self.arg(index)?.as_f32()
    }

    pub fn bool_arg(&self, index: usize) -> Option<bool> {
        self.arg(index)?.as_bool()
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.address, self.args)
    }
}
