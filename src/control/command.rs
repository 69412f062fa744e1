use thiserror::Error;

use super::ControlMessage;
use crate::groups::GroupPreset;
use crate::params::{Affector, Arg};
use crate::scenes::Tag;

/// Inbound control verbs, parsed from a [`ControlMessage`]
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    // Parameter commands
    GetValue { address: String },
    SetValue { address: String, args: Vec<Arg> },
    Reset { address: String },
    ResetToSceneDefault { address: String },
    SetAffector { address: String, affector: Affector },
    SetInvert { address: String, invert: bool },
    SetPaletteIndex { address: String, index: i32 },
    GetPaletteIndex { address: String },
    SetUseGlobalPalette { address: String, enabled: bool },
    GetUseGlobalPalette { address: String },
    Trigger { address: String },

    // Scene commands
    LoadScene { name: String },
    SaveScene,
    SaveSceneAs { name: String },
    RemoveScene { name: String },
    NewScene { name: Option<String> },
    ResetScene,
    SetSceneName { name: String },
    GetSceneName,
    GetSceneInfo,
    GetSceneList,
    GetCurrentState,
    AddSceneTag { id: String },
    RemoveSceneTag { id: String },
    ClearSceneTags { tag_type: Option<String> },

    // Tag catalogue commands
    NewTag { tag_type: String, value: String },
    RemoveTag { id: String },
    SetTag(Tag),
    GetTagConfigurations,

    // Group commands
    NewGroup(Option<GroupPreset>),
    RemoveGroup { address: String },
    ClearGroup { address: String },
    ResetGroup { address: String },
    GetGroup { address: String },
    SetGroup(GroupPreset),
    GetGroupList,
    AddGroupParameter { group: String, parameter: String },
    RemoveGroupParameter { group: String, parameter: String },
    /// Empty `parameters` removes every member parameter
    RemoveGroupParameters { group: String, parameters: Vec<String> },
    AddGroupTrigger { group: String, trigger: String },
    RemoveGroupTrigger { group: String, trigger: String },
    RemoveGroupTriggers { group: String, triggers: Vec<String> },
    SetGroupEnabled { group: String, enabled: bool },
    GetGroupEnabled { group: String },
    SetGroupNumBeats { group: String, num_beats: u32 },
    AddTapTrigger { group: String },
    SetTapTriggerCount { group: String, count: u32 },
    ClearTapTriggers { group: String },

    // Tempo commands
    TapTempo,
    ResetPhase,
    DoubleBpm,
    HalfBpm,
    SetBpm { bpm: f32 },
    GetBpm,
}

/// Why a message could not be turned into a command
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown control address {0}")]
    UnknownVerb(String),
    #[error("{address}: argument {index} missing or not {expected}")]
    BadArgument {
        address: String,
        index: usize,
        expected: &'static str,
    },
    #[error("{address}: invalid JSON payload: {reason}")]
    InvalidJson { address: String, reason: String },
}

const TRIGGER_MARKER: &str = "/FXTRIGGER";

impl ControlCommand {
    /// Match the verb case-insensitively and extract its arguments.
    ///
    /// Addresses containing `/fxTrigger` that are not a known verb become
    /// [`ControlCommand::Trigger`] for that address.
    pub fn parse(message: &ControlMessage) -> Result<Self, CommandError> {
        let verb = message.address.to_uppercase();
        let m = message;

        let command = match verb.as_str() {
            "/FX/GET" => Self::GetValue { address: text(m, 0)? },
            "/FX/SET" => Self::SetValue {
                address: text(m, 0)?,
                args: m.args[1..].to_vec(),
            },
            "/FX/RESET" => Self::Reset { address: text(m, 0)? },
            "/FX/RESETTOSCENEDEFAULT" => Self::ResetToSceneDefault { address: text(m, 0)? },
            "/FX/AFFECTOR/SET" => Self::SetAffector {
                address: text(m, 0)?,
                affector: affector(m, 1)?,
            },
            "/FX/INVERT/SET" => Self::SetInvert {
                address: text(m, 0)?,
                invert: flag(m, 1)?,
            },
            "/FX/GLOBALCOLOURPALETTEINDEX/SET" => Self::SetPaletteIndex {
                address: text(m, 0)?,
                index: int(m, 1)?,
            },
            "/FX/GLOBALCOLOURPALETTEINDEX/GET" => Self::GetPaletteIndex { address: text(m, 0)? },
            "/FX/USEGLOBALCOLOURPALETTE/SET" => Self::SetUseGlobalPalette {
                address: text(m, 0)?,
                enabled: flag(m, 1)?,
            },
            "/FX/USEGLOBALCOLOURPALETTE/GET" => Self::GetUseGlobalPalette { address: text(m, 0)? },

            "/SCENE/LOAD" => Self::LoadScene { name: text(m, 0)? },
            "/SCENE/SAVE" => Self::SaveScene,
            "/SCENE/SAVEAS" => Self::SaveSceneAs { name: text(m, 0)? },
            "/SCENE/REMOVE" => Self::RemoveScene { name: text(m, 0)? },
            "/SCENE/NEW" => Self::NewScene {
                name: m.str_arg(0).map(str::to_string),
            },
            "/SCENE/RESET" => Self::ResetScene,
            "/SCENE/NAME/SET" => Self::SetSceneName { name: text(m, 0)? },
            "/SCENE/NAME/GET" => Self::GetSceneName,
            "/SCENE/INFO/GET" => Self::GetSceneInfo,
            "/SCENELIST/GET" | "/SCENELIST/GET/CHUNKED" => Self::GetSceneList,
            "/SCENE/GETCURRENTSTATE" => Self::GetCurrentState,
            "/SCENE/TAG/ADD" => Self::AddSceneTag { id: text(m, 0)? },
            "/SCENE/TAG/REMOVE" => Self::RemoveSceneTag { id: text(m, 0)? },
            "/SCENE/TAGS/CLEAR" => Self::ClearSceneTags {
                tag_type: m.str_arg(0).map(str::to_string),
            },

            "/TAG/NEW" => Self::NewTag {
                tag_type: text(m, 0)?,
                value: text(m, 1)?,
            },
            "/TAG/REMOVE" => Self::RemoveTag { id: text(m, 0)? },
            "/TAG/SET" => Self::SetTag(json(m, 0)?),
            "/TAGCONFIGURATIONLIST/GET" => Self::GetTagConfigurations,

            "/GROUP/NEW" => Self::NewGroup(match m.str_arg(0) {
                Some(_) => Some(json(m, 0)?),
                None => None,
            }),
            "/GROUP/REMOVE" => Self::RemoveGroup { address: text(m, 0)? },
            "/GROUP/CLEAR" => Self::ClearGroup { address: text(m, 0)? },
            "/GROUP/RESET" => Self::ResetGroup { address: text(m, 0)? },
            "/GROUP/GET" => Self::GetGroup { address: text(m, 0)? },
            "/GROUP/SET" => {
                let address = text(m, 0)?;
                let mut preset: GroupPreset = json(m, 1)?;
                if preset.address.is_empty() {
                    preset.address = address;
                }
                Self::SetGroup(preset)
            }
            "/GROUPLIST/GET" => Self::GetGroupList,
            "/GROUP/PARAM/ADD" => Self::AddGroupParameter {
                group: text(m, 0)?,
                parameter: text(m, 1)?,
            },
            "/GROUP/PARAM/REMOVE" => Self::RemoveGroupParameter {
                group: text(m, 0)?,
                parameter: text(m, 1)?,
            },
            "/GROUP/PARAMS/REMOVE" => Self::RemoveGroupParameters {
                group: text(m, 0)?,
                parameters: rest(m, 1),
            },
            "/GROUP/TRIGGER/ADD" => Self::AddGroupTrigger {
                group: text(m, 0)?,
                trigger: text(m, 1)?,
            },
            "/GROUP/TRIGGER/REMOVE" => Self::RemoveGroupTrigger {
                group: text(m, 0)?,
                trigger: text(m, 1)?,
            },
            "/GROUP/TRIGGERS/REMOVE" => Self::RemoveGroupTriggers {
                group: text(m, 0)?,
                triggers: rest(m, 1),
            },
            "/GROUP/ENABLED/SET" => Self::SetGroupEnabled {
                group: text(m, 0)?,
                enabled: flag(m, 1)?,
            },
            "/GROUP/ENABLED/GET" => Self::GetGroupEnabled { group: text(m, 0)? },
            "/GROUP/PATTERN/NUMBEATS" => Self::SetGroupNumBeats {
                group: text(m, 0)?,
                num_beats: count(m, 1)?,
            },
            "/GROUP/TAP/ADDTRIGGERATCURRENTTIME" => Self::AddTapTrigger { group: text(m, 0)? },
            "/GROUP/TAP/NUMBEROFTRIGGERS/SET" => Self::SetTapTriggerCount {
                group: text(m, 0)?,
                count: count(m, 1)?,
            },
            "/GROUP/TAP/CLEARTRIGGERS" => Self::ClearTapTriggers { group: text(m, 0)? },

            "/AUDIO/BPM/TAP" => Self::TapTempo,
            "/AUDIO/BPM/RESETPHASE" => Self::ResetPhase,
            "/AUDIO/BPM/DOUBLEBPM" => Self::DoubleBpm,
            "/AUDIO/BPM/HALFBPM" => Self::HalfBpm,
            "/AUDIO/BPM/VALUE/SET" => Self::SetBpm {
                bpm: m.f32_arg(0).ok_or_else(|| bad(m, 0, "a number"))?,
            },
            "/AUDIO/BPM/VALUE/GET" => Self::GetBpm,

            _ if verb.contains(TRIGGER_MARKER) => Self::Trigger {
                address: m.address.clone(),
            },
            _ => return Err(CommandError::UnknownVerb(m.address.clone())),
        };
        Ok(command)
    }
}

fn bad(m: &ControlMessage, index: usize, expected: &'static str) -> CommandError {
    CommandError::BadArgument {
        address: m.address.clone(),
        index,
        expected,
    }
}

fn text(m: &ControlMessage, index: usize) -> Result<String, CommandError> {
    m.str_arg(index)
        .map(str::to_string)
        .ok_or_else(|| bad(m, index, "a string"))
}

fn int(m: &ControlMessage, index: usize) -> Result<i32, CommandError> {
    m.i32_arg(index).ok_or_else(|| bad(m, index, "an int"))
}

fn flag(m: &ControlMessage, index: usize) -> Result<bool, CommandError> {
    m.bool_arg(index).ok_or_else(|| bad(m, index, "a bool"))
}

fn count(m: &ControlMessage, index: usize) -> Result<u32, CommandError> {
    u32::try_from(int(m, index)?).map_err(|_| bad(m, index, "a non-negative int"))
}

/// Affectors arrive either by name or by index
fn affector(m: &ControlMessage, index: usize) -> Result<Affector, CommandError> {
    let found = match m.arg(index) {
        Some(Arg::String(name)) => Affector::from_name(name),
        Some(Arg::Int(i)) => Affector::from_index(*i),
        _ => None,
    };
    found.ok_or_else(|| bad(m, index, "an affector name or index"))
}

fn rest(m: &ControlMessage, from: usize) -> Vec<String> {
    m.args
        .iter()
        .skip(from)
        .filter_map(Arg::as_str)
        .map(str::to_string)
        .collect()
}

fn json<T: serde::de::DeserializeOwned>(m: &ControlMessage, index: usize) -> Result<T, CommandError> {
    let payload = m.str_arg(index).ok_or_else(|| bad(m, index, "a JSON string"))?;
    serde_json::from_str(payload).map_err(|e| CommandError::InvalidJson {
        address: m.address.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(address: &str, args: Vec<Arg>) -> ControlMessage {
        ControlMessage::new(address, args)
    }

    #[test]
    fn test_verbs_match_case_insensitively() {
        let command = ControlCommand::parse(&msg("/fx/set", vec!["/a/b".into(), 0.5.into()])).unwrap();
        assert_eq!(
            command,
            ControlCommand::SetValue {
                address: "/a/b".into(),
                args: vec![Arg::Float(0.5)],
            }
        );
        let command = ControlCommand::parse(&msg("/Scene/Load", vec!["Intro".into()])).unwrap();
        assert_eq!(command, ControlCommand::LoadScene { name: "Intro".into() });
    }

    #[test]
    fn test_missing_argument_is_reported() {
        let err = ControlCommand::parse(&msg("/fx/get", vec![])).unwrap_err();
        assert!(matches!(err, CommandError::BadArgument { index: 0, .. }));

        let err = ControlCommand::parse(&msg("/group/pattern/numBeats", vec!["/g".into(), Arg::Int(-2)])).unwrap_err();
        assert!(matches!(err, CommandError::BadArgument { index: 1, .. }));
    }

    #[test]
    fn test_trigger_addresses_and_unknown_verbs() {
        let command = ControlCommand::parse(&msg("/Strobe/fxTrigger/flash", vec![])).unwrap();
        assert_eq!(
            command,
            ControlCommand::Trigger {
                address: "/Strobe/fxTrigger/flash".into()
            }
        );
        let err = ControlCommand::parse(&msg("/nothing/here", vec![])).unwrap_err();
        assert_eq!(err, CommandError::UnknownVerb("/nothing/here".into()));
    }

    #[test]
    fn test_optional_arguments() {
        assert_eq!(
            ControlCommand::parse(&msg("/scene/new", vec![])).unwrap(),
            ControlCommand::NewScene { name: None }
        );
        assert_eq!(
            ControlCommand::parse(&msg("/scene/tags/clear", vec!["Mood".into()])).unwrap(),
            ControlCommand::ClearSceneTags {
                tag_type: Some("Mood".into())
            }
        );
        assert_eq!(
            ControlCommand::parse(&msg("/group/params/remove", vec!["/g".into()])).unwrap(),
            ControlCommand::RemoveGroupParameters {
                group: "/g".into(),
                parameters: vec![],
            }
        );
    }

    #[test]
    fn test_affector_by_name_or_index() {
        let by_name = ControlCommand::parse(&msg("/fx/affector/set", vec!["/a".into(), "EaseIn".into()])).unwrap();
        let by_index = ControlCommand::parse(&msg("/fx/affector/set", vec!["/a".into(), Arg::Int(1)])).unwrap();
        assert_eq!(by_name, by_index);
    }

    #[test]
    fn test_group_set_fills_missing_address() {
        let command = ControlCommand::parse(&msg("/group/set", vec!["/Group/1".into(), r#"{"address":""}"#.into()])).unwrap();
        match command {
            ControlCommand::SetGroup(preset) => assert_eq!(preset.address, "/Group/1"),
            other => panic!("unexpected {:?}", other),
        }

        let err = ControlCommand::parse(&msg("/group/set", vec!["/Group/1".into(), "not json".into()])).unwrap_err();
        assert!(matches!(err, CommandError::InvalidJson { .. }));
    }
}
