use rosc::{OscColor, OscMessage, OscPacket, OscType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::ControlMessage;
use crate::params::{Arg, Color};

#[derive(Debug, Error)]
pub enum OscCodecError {
    #[error("malformed OSC packet: {0}")]
    Decode(String),
    #[error("failed to encode OSC packet: {0}")]
    Encode(String),
    #[error("OSC socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Colour as exchanged in JSON strings: 0-255 channels, alpha 0-1
#[derive(Debug, Serialize, Deserialize)]
struct JsonColor {
    r: f32,
    g: f32,
    b: f32,
    #[serde(default = "opaque")]
    a: f32,
}

fn opaque() -> f32 {
    1.0
}

/// Serialize a colour for surfaces that take colours as JSON text
pub fn color_to_json(color: Color) -> String {
    let json = serde_json::json!({
        "r": (color.r * 255.0).round() as i32,
        "g": (color.g * 255.0).round() as i32,
        "b": (color.b * 255.0).round() as i32,
        "a": color.a,
    });
    json.to_string()
}

/// Parse a JSON colour object. Anything without non-negative `r`, `g` and
/// `b` is not a colour.
pub fn color_from_json(text: &str) -> Option<Color> {
    if !text.trim_start().starts_with('{') {
        return None;
    }
    let parsed: JsonColor = serde_json::from_str(text).ok()?;
    if parsed.r < 0.0 || parsed.g < 0.0 || parsed.b < 0.0 {
        return None;
    }
    Some(Color::new(parsed.r / 255.0, parsed.g / 255.0, parsed.b / 255.0, parsed.a))
}

/// Decode a UDP datagram. Bundles are flattened in order.
pub fn decode(bytes: &[u8]) -> Result<Vec<ControlMessage>, OscCodecError> {
    let (_, packet) = rosc::decoder::decode_udp(bytes).map_err(|e| OscCodecError::Decode(e.to_string()))?;
    let mut messages = Vec::new();
    flatten(packet, &mut messages);
    Ok(messages)
}

fn flatten(packet: OscPacket, out: &mut Vec<ControlMessage>) {
    match packet {
        OscPacket::Message(message) => {
            let args = message.args.into_iter().filter_map(from_osc).collect();
            out.push(ControlMessage::new(message.addr, args));
        }
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten(inner, out);
            }
        }
    }
}

fn from_osc(value: OscType) -> Option<Arg> {
    let arg = match value {
        OscType::Float(v) => Arg::Float(v),
        OscType::Double(v) => Arg::Float(v as f32),
        OscType::Int(v) => Arg::Int(v),
        OscType::Long(v) => Arg::Int(v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32),
        OscType::Bool(v) => Arg::Bool(v),
        OscType::String(v) => match color_from_json(&v) {
            Some(color) => Arg::Color(color),
            None => Arg::String(v),
        },
        OscType::Char(c) => Arg::String(c.to_string()),
        OscType::Color(c) => Arg::Color(Color::new(
            f32::from(c.red) / 255.0,
            f32::from(c.green) / 255.0,
            f32::from(c.blue) / 255.0,
            f32::from(c.alpha) / 255.0,
        )),
        other => {
            tracing::trace!("skipping unsupported OSC argument {:?}", other);
            return None;
        }
    };
    Some(arg)
}

/// Encode one message. Colours go out as a JSON string when
/// `colors_as_json` is set, otherwise as an OSC RGBA colour.
pub fn encode(message: &ControlMessage, colors_as_json: bool) -> Result<Vec<u8>, OscCodecError> {
    let args = message.args.iter().map(|arg| to_osc(arg, colors_as_json)).collect();
    let packet = OscPacket::Message(OscMessage {
        addr: message.address.clone(),
        args,
    });
    rosc::encoder::encode(&packet).map_err(|e| OscCodecError::Encode(e.to_string()))
}

fn to_osc(arg: &Arg, colors_as_json: bool) -> OscType {
    match arg {
        Arg::Float(v) => OscType::Float(*v),
        Arg::Int(v) => OscType::Int(*v),
        Arg::Bool(v) => OscType::Bool(*v),
        Arg::String(v) => OscType::String(v.clone()),
        Arg::Color(c) if colors_as_json => OscType::String(color_to_json(*c)),
        Arg::Color(c) => OscType::Color(OscColor {
            red: channel(c.r),
            green: channel(c.g),
            blue: channel(c.b),
            alpha: channel(c.a),
        }),
    }
}

fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{OscBundle, OscTime};

    #[test]
    fn test_decode_flattens_bundles() {
        let packet = OscPacket::Bundle(OscBundle {
            timetag: OscTime { seconds: 0, fractional: 1 },
            content: vec![
                OscPacket::Message(OscMessage {
                    addr: "/fx/set".into(),
                    args: vec![OscType::String("/Blur/amount".into()), OscType::Double(0.5)],
                }),
                OscPacket::Message(OscMessage {
                    addr: "/scene/save".into(),
                    args: vec![],
                }),
            ],
        });
        let bytes = rosc::encoder::encode(&packet).unwrap();
        let messages = decode(&bytes).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].args, vec![Arg::from("/Blur/amount"), Arg::Float(0.5)]);
        assert_eq!(messages[1].address, "/scene/save");
    }

    #[test]
    fn test_json_string_becomes_color() {
        let color = color_from_json(r#"{"r":255,"g":0,"b":51}"#).unwrap();
        assert_eq!(color, Color::new(1.0, 0.0, 0.2, 1.0));
        assert!(color_from_json(r#"{"r":-1,"g":0,"b":0}"#).is_none());
        assert!(color_from_json(r#"{"name":"red"}"#).is_none());
        assert!(color_from_json("plain text").is_none());
    }

    #[test]
    fn test_color_encoding_follows_node_preference() {
        let message = ControlMessage::new("/fx/get", vec!["/Tint/colour".into(), Arg::Color(Color::new(1.0, 0.5, 0.0, 1.0))]);

        let bytes = encode(&message, true).unwrap();
        let (_, packet) = rosc::decoder::decode_udp(&bytes).unwrap();
        let OscPacket::Message(decoded) = packet else {
            panic!("expected a message");
        };
        assert_eq!(decoded.args[1], OscType::String(r#"{"a":1.0,"b":0,"g":128,"r":255}"#.into()));

        let bytes = encode(&message, false).unwrap();
        let round_trip = decode(&bytes).unwrap();
        let Arg::Color(color) = &round_trip[0].args[1] else {
            panic!("expected a colour");
        };
        assert_eq!(color.r, 1.0);
        assert!((color.g - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(decode(b"not osc"), Err(OscCodecError::Decode(_))));
    }
}
