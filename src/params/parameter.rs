//! Typed parameter cells and the capability trait the registry stores.

use std::any::Any;
use std::fmt;
use thiserror::Error;

use super::value::{Color, CoercionError, ParameterValue, ValueKind};

/// Construction failure for parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("parameter {address} cannot hold a {kind} value")]
    UnsupportedType { address: String, kind: ValueKind },
    #[error("bounds for {address} must be {expected} values")]
    MismatchedRange { address: String, expected: ValueKind },
}

/// Global colour palette binding carried by color parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteBinding {
    pub index: i32,
    pub use_global: bool,
}

/// The capability set every registered parameter provides.
///
/// Values handed to [`FxParameter::apply`] are conformed to the parameter's
/// kind and clamped to its bounds before being stored.
pub trait FxParameter: Any + fmt::Debug {
    fn address(&self) -> &str;
    fn value(&self) -> &ParameterValue;
    fn default_value(&self) -> &ParameterValue;
    fn scene_default_value(&self) -> &ParameterValue;
    fn min_value(&self) -> Option<&ParameterValue>;
    fn max_value(&self) -> Option<&ParameterValue>;
    fn should_save(&self) -> bool;
    fn set_should_save(&mut self, should_save: bool);

    /// Record the current value as the scene default
    fn keep_as_scene_default(&mut self);

    /// Store a new value. Returns `true` when the stored value changed.
    /// The scene default follows only when the value actually changes.
    fn apply(&mut self, value: ParameterValue, update_scene_default: bool) -> Result<bool, CoercionError>;

    /// Derived output for scaled parameters
    fn scaled_value(&self) -> Option<ParameterValue> {
        None
    }

    fn palette(&self) -> Option<PaletteBinding> {
        None
    }

    fn palette_mut(&mut self) -> Option<&mut PaletteBinding> {
        None
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn kind(&self) -> ValueKind {
        self.value().kind()
    }

    fn reset_to_default(&mut self) -> bool {
        let default = self.default_value().clone();
        let changed = self.apply(default, true).unwrap_or(false);
        self.keep_as_scene_default();
        changed
    }

    fn reset_to_scene_default(&mut self) -> bool {
        let scene_default = self.scene_default_value().clone();
        self.apply(scene_default, false).unwrap_or(false)
    }
}

/// A named, typed value cell with default tracking and optional bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    address: String,
    value: ParameterValue,
    default_value: ParameterValue,
    scene_default_value: ParameterValue,
    min_value: Option<ParameterValue>,
    max_value: Option<ParameterValue>,
    should_save: bool,
    palette: Option<PaletteBinding>,
}

impl Parameter {
    /// Build a parameter from any supported value.
    ///
    /// Vectors are output-only and rejected here.
    pub fn try_new(address: impl Into<String>, value: ParameterValue) -> Result<Self, ParameterError> {
        let address = address.into();
        if value.kind() == ValueKind::Vec3 {
            return Err(ParameterError::UnsupportedType { address, kind: ValueKind::Vec3 });
        }
        Ok(Self::new_unchecked(address, value))
    }

    fn new_unchecked(address: String, value: ParameterValue) -> Self {
        let palette = matches!(value, ParameterValue::Color(_)).then(PaletteBinding::default);
        Self {
            address,
            default_value: value.clone(),
            scene_default_value: value.clone(),
            value,
            min_value: None,
            max_value: None,
            should_save: true,
            palette,
        }
    }

    pub fn float(address: impl Into<String>, value: f32) -> Self {
        Self::new_unchecked(address.into(), ParameterValue::Float(value))
    }

    pub fn int(address: impl Into<String>, value: i32) -> Self {
        Self::new_unchecked(address.into(), ParameterValue::Int(value))
    }

    pub fn bool(address: impl Into<String>, value: bool) -> Self {
        Self::new_unchecked(address.into(), ParameterValue::Bool(value))
    }

    pub fn string(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new_unchecked(address.into(), ParameterValue::String(value.into()))
    }

    pub fn color(address: impl Into<String>, value: Color) -> Self {
        Self::new_unchecked(address.into(), ParameterValue::Color(value))
    }

    /// Enum parameter selecting `index` among `options`
    pub fn enumeration<S: AsRef<str>>(address: impl Into<String>, options: &[S], index: i32) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();
        let index = if usize::try_from(index).map(|i| i < options.len()).unwrap_or(false) { index } else { 0 };
        Self::new_unchecked(address.into(), ParameterValue::Enum { index, options })
    }

    pub fn bounded_float(address: impl Into<String>, value: f32, min: f32, max: f32) -> Self {
        Self::float(address, value).bounded(ParameterValue::Float(min), ParameterValue::Float(max))
    }

    pub fn bounded_int(address: impl Into<String>, value: i32, min: i32, max: i32) -> Self {
        Self::int(address, value).bounded(ParameterValue::Int(min), ParameterValue::Int(max))
    }

    /// Attach bounds of the parameter's own kind (float, int or color)
    pub fn with_bounds(self, min: ParameterValue, max: ParameterValue) -> Result<Self, ParameterError> {
        let expected = self.value.kind();
        let bounded_kind = matches!(expected, ValueKind::Float | ValueKind::Int | ValueKind::Color);
        if !bounded_kind || min.kind() != expected || max.kind() != expected {
            return Err(ParameterError::MismatchedRange { address: self.address, expected });
        }
        Ok(self.bounded(min, max))
    }

    fn bounded(mut self, min: ParameterValue, max: ParameterValue) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self.value = self.clamp(self.value.clone());
        self.default_value = self.value.clone();
        self.scene_default_value = self.value.clone();
        self
    }

    pub fn with_should_save(mut self, should_save: bool) -> Self {
        self.should_save = should_save;
        self
    }

    fn clamp(&self, value: ParameterValue) -> ParameterValue {
        value.clamped(self.min_value.as_ref(), self.max_value.as_ref())
    }
}

impl FxParameter for Parameter {
    fn address(&self) -> &str {
        &self.address
    }

    fn value(&self) -> &ParameterValue {
        &self.value
    }

    fn default_value(&self) -> &ParameterValue {
        &self.default_value
    }

    fn scene_default_value(&self) -> &ParameterValue {
        &self.scene_default_value
    }

    fn min_value(&self) -> Option<&ParameterValue> {
        self.min_value.as_ref()
    }

    fn max_value(&self) -> Option<&ParameterValue> {
        self.max_value.as_ref()
    }

    fn should_save(&self) -> bool {
        self.should_save
    }

    fn set_should_save(&mut self, should_save: bool) {
        self.should_save = should_save;
    }

    fn apply(&mut self, value: ParameterValue, update_scene_default: bool) -> Result<bool, CoercionError> {
        let value = self.clamp(self.value.conform(value)?);
        if value == self.value {
            return Ok(false);
        }
        if update_scene_default {
            self.scene_default_value = value.clone();
        }
        self.value = value;
        Ok(true)
    }

    fn keep_as_scene_default(&mut self) {
        self.scene_default_value = self.value.clone();
    }

    fn palette(&self) -> Option<PaletteBinding> {
        self.palette
    }

    fn palette_mut(&mut self) -> Option<&mut PaletteBinding> {
        self.palette.as_mut()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
