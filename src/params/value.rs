//! Value types shared by parameters, methods and the wire.
//!
//! [`ParameterValue`] is the closed set of values a parameter can hold.
//! [`Arg`] is the narrower set of primitives that arrive from (and leave for)
//! remote peers. Coercion between the two is a match on the (source, target)
//! pair, never a runtime type test.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// RGBA color with float components in the 0.0-1.0 range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Component-wise linear interpolation
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::new(
            lerp(self.r, other.r, t),
            lerp(self.g, other.g, t),
            lerp(self.b, other.b, t),
            lerp(self.a, other.a, t),
        )
    }

    pub fn is_finite(self) -> bool {
        self.to_array().iter().all(|c| c.is_finite())
    }

    fn clamp_between(self, min: Color, max: Color) -> Color {
        Color::new(
            self.r.max(min.r).min(max.r),
            self.g.max(min.g).min(max.g),
            self.b.max(min.b).min(max.b),
            self.a.max(min.a).min(max.a),
        )
    }
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Runtime type tag of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Int,
    Bool,
    String,
    Color,
    Vec3,
    Enum,
}

impl ValueKind {
    /// Kinds that can travel as a single wire argument
    pub fn is_wire_kind(self) -> bool {
        matches!(
            self,
            ValueKind::Float | ValueKind::Int | ValueKind::Bool | ValueKind::String | ValueKind::Color
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Float => "float",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
            ValueKind::String => "string",
            ValueKind::Color => "color",
            ValueKind::Vec3 => "vec3",
            ValueKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// A value held by a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParameterValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    String(String),
    Color(Color),
    /// Only produced as the output of a scaled parameter
    Vec3([f32; 3]),
    /// Enum stored as its integer value plus the names of the defined members
    Enum { index: i32, options: Vec<String> },
}

impl ParameterValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ParameterValue::Float(_) => ValueKind::Float,
            ParameterValue::Int(_) => ValueKind::Int,
            ParameterValue::Bool(_) => ValueKind::Bool,
            ParameterValue::String(_) => ValueKind::String,
            ParameterValue::Color(_) => ValueKind::Color,
            ParameterValue::Vec3(_) => ValueKind::Vec3,
            ParameterValue::Enum { .. } => ValueKind::Enum,
        }
    }

    /// `false` for any NaN or infinite component. Documents cannot store those.
    pub fn is_finite(&self) -> bool {
        match self {
            ParameterValue::Float(v) => v.is_finite(),
            ParameterValue::Color(c) => c.is_finite(),
            ParameterValue::Vec3(v) => v.iter().all(|c| c.is_finite()),
            _ => true,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Enum { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParameterValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            ParameterValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Name of the selected member for enum values
    pub fn enum_name(&self) -> Option<&str> {
        match self {
            ParameterValue::Enum { index, options } => usize::try_from(*index)
                .ok()
                .and_then(|i| options.get(i))
                .map(String::as_str),
            _ => None,
        }
    }

    /// Wire representation used for replies and broadcasts
    pub fn to_args(&self) -> Vec<Arg> {
        match self {
            ParameterValue::Float(v) => vec![Arg::Float(*v)],
            ParameterValue::Int(v) => vec![Arg::Int(*v)],
            ParameterValue::Bool(v) => vec![Arg::Bool(*v)],
            ParameterValue::String(v) => vec![Arg::String(v.clone())],
            ParameterValue::Color(v) => vec![Arg::Color(*v)],
            ParameterValue::Vec3(v) => v.iter().map(|c| Arg::Float(*c)).collect(),
            ParameterValue::Enum { index, .. } => vec![Arg::Int(*index)],
        }
    }

    /// Clamp numeric values between optional bounds of the same kind
    pub fn clamped(self, min: Option<&ParameterValue>, max: Option<&ParameterValue>) -> ParameterValue {
        match self {
            ParameterValue::Float(mut v) => {
                if let Some(ParameterValue::Float(lo)) = min {
                    v = v.max(*lo);
                }
                if let Some(ParameterValue::Float(hi)) = max {
                    v = v.min(*hi);
                }
                ParameterValue::Float(v)
            }
            ParameterValue::Int(mut v) => {
                if let Some(ParameterValue::Int(lo)) = min {
                    v = v.max(*lo);
                }
                if let Some(ParameterValue::Int(hi)) = max {
                    v = v.min(*hi);
                }
                ParameterValue::Int(v)
            }
            ParameterValue::Color(v) => {
                let lo = min.and_then(ParameterValue::as_color).unwrap_or(Color::new(f32::MIN, f32::MIN, f32::MIN, f32::MIN));
                let hi = max.and_then(ParameterValue::as_color).unwrap_or(Color::new(f32::MAX, f32::MAX, f32::MAX, f32::MAX));
                ParameterValue::Color(v.clamp_between(lo, hi))
            }
            other => other,
        }
    }

    /// Coerce a wire argument into a value shaped like `self`.
    ///
    /// Enum values keep their member list and only accept defined integers.
    /// Float into int rounds up.
    pub fn coerce_arg(&self, arg: &Arg) -> Result<ParameterValue, CoercionError> {
        match self {
            ParameterValue::Enum { options, .. } => match arg {
                Arg::Int(v) if is_defined_member(*v, options) => Ok(ParameterValue::Enum {
                    index: *v,
                    options: options.clone(),
                }),
                Arg::Int(v) => Err(CoercionError::EnumValueUndefined { value: *v }),
                other => Err(CoercionError::TypeMismatch {
                    expected: ValueKind::Enum,
                    found: other.kind(),
                }),
            },
            ParameterValue::Vec3(_) => Err(CoercionError::TypeMismatch {
                expected: ValueKind::Vec3,
                found: arg.kind(),
            }),
            _ => arg.coerce(self.kind(), IntRounding::Ceil).map(ParameterValue::from),
        }
    }

    /// Check that `incoming` can replace `self` without changing kind
    pub fn conform(&self, incoming: ParameterValue) -> Result<ParameterValue, CoercionError> {
        if !incoming.is_finite() {
            return Err(CoercionError::NotFinite { expected: self.kind() });
        }
        match (self, incoming) {
            (ParameterValue::Enum { options, .. }, ParameterValue::Enum { index, .. })
            | (ParameterValue::Enum { options, .. }, ParameterValue::Int(index)) => {
                if is_defined_member(index, options) {
                    Ok(ParameterValue::Enum { index, options: options.clone() })
                } else {
                    Err(CoercionError::EnumValueUndefined { value: index })
                }
            }
            (current, incoming) if current.kind() == incoming.kind() => Ok(incoming),
            (current, incoming) => Err(CoercionError::TypeMismatch {
                expected: current.kind(),
                found: incoming.kind(),
            }),
        }
    }
}

fn is_defined_member(value: i32, options: &[String]) -> bool {
    usize::try_from(value).map(|i| i < options.len()).unwrap_or(false)
}

impl From<f32> for ParameterValue {
    fn from(v: f32) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::String(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::String(v)
    }
}

impl From<Color> for ParameterValue {
    fn from(v: Color) -> Self {
        ParameterValue::Color(v)
    }
}

impl From<[f32; 3]> for ParameterValue {
    fn from(v: [f32; 3]) -> Self {
        ParameterValue::Vec3(v)
    }
}

impl From<Arg> for ParameterValue {
    fn from(arg: Arg) -> Self {
        match arg {
            Arg::Float(v) => ParameterValue::Float(v),
            Arg::Int(v) => ParameterValue::Int(v),
            Arg::Bool(v) => ParameterValue::Bool(v),
            Arg::String(v) => ParameterValue::String(v),
            Arg::Color(v) => ParameterValue::Color(v),
        }
    }
}

/// A primitive argument as received from or sent to a remote peer
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Float(f32),
    Int(i32),
    Bool(bool),
    String(String),
    Color(Color),
}

/// How a float argument is narrowed into an integer slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntRounding {
    /// Toward zero (method arguments)
    Truncate,
    /// Toward positive infinity (parameter values)
    Ceil,
}

impl IntRounding {
    pub fn apply(self, v: f32) -> i32 {
        match self {
            IntRounding::Truncate => v as i32,
            IntRounding::Ceil => v.ceil() as i32,
        }
    }
}

impl Arg {
    pub fn kind(&self) -> ValueKind {
        match self {
            Arg::Float(_) => ValueKind::Float,
            Arg::Int(_) => ValueKind::Int,
            Arg::Bool(_) => ValueKind::Bool,
            Arg::String(_) => ValueKind::String,
            Arg::Color(_) => ValueKind::Color,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Arg::Int(v) => Some(*v),
            Arg::Float(v) => Some(*v as i32),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Arg::Float(v) => Some(*v),
            Arg::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Bool(v) => Some(*v),
            Arg::Int(v) => Some(*v != 0),
            Arg::Float(v) => Some(*v != 0.0),
            _ => None,
        }
    }

    /// Convert into the requested kind.
    ///
    /// Legal cross-kind conversions are float and int in either direction and
    /// float into bool (non-zero is true). Everything else must match exactly.
    pub fn coerce(&self, target: ValueKind, rounding: IntRounding) -> Result<Arg, CoercionError> {
        match (target, self) {
            (ValueKind::Float | ValueKind::Int, Arg::Float(v)) if !v.is_finite() => {
                Err(CoercionError::NotFinite { expected: target })
            }
            (ValueKind::Color, Arg::Color(c)) if !c.is_finite() => Err(CoercionError::NotFinite { expected: target }),
            (ValueKind::Float, Arg::Float(v)) => Ok(Arg::Float(*v)),
            (ValueKind::Float, Arg::Int(v)) => Ok(Arg::Float(*v as f32)),
            (ValueKind::Int, Arg::Int(v)) => Ok(Arg::Int(*v)),
            (ValueKind::Int, Arg::Float(v)) => Ok(Arg::Int(rounding.apply(*v))),
            (ValueKind::Bool, Arg::Bool(v)) => Ok(Arg::Bool(*v)),
            (ValueKind::Bool, Arg::Float(v)) => Ok(Arg::Bool(*v != 0.0)),
            (ValueKind::String, Arg::String(v)) => Ok(Arg::String(v.clone())),
            (ValueKind::Color, Arg::Color(v)) => Ok(Arg::Color(*v)),
            (expected, found) => Err(CoercionError::TypeMismatch {
                expected,
                found: found.kind(),
            }),
        }
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Arg::Float(v)
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Int(v)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::String(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::String(v)
    }
}

impl From<Color> for Arg {
    fn from(v: Color) -> Self {
        Arg::Color(v)
    }
}

/// Failure to turn an argument into the target kind
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("expected {expected}, received {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },
    #[error("{value} is not a defined enum member")]
    EnumValueUndefined { value: i32 },
    #[error("expected a finite {expected}")]
    NotFinite { expected: ValueKind },
}
