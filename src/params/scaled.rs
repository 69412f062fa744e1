//! Scaled parameters: a normalized backing value shaped by an affector and
//! interpolated into an output range.

use serde::{Deserialize, Serialize};
use std::any::Any;

use super::parameter::{FxParameter, Parameter, ParameterError};
use super::value::{lerp, Color, CoercionError, ParameterValue, ValueKind};

/// Shaping function applied to the normalized value before interpolation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Affector {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    Randomise,
}

impl Affector {
    pub const ALL: [Affector; 4] = [Affector::Linear, Affector::EaseIn, Affector::EaseOut, Affector::Randomise];

    pub fn apply(self, shaped: f32) -> f32 {
        match self {
            Affector::Linear => shaped,
            Affector::EaseIn => shaped * shaped,
            Affector::EaseOut => shaped.sqrt(),
            Affector::Randomise => rand::random::<f32>(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Affector::Linear => "Linear",
            Affector::EaseIn => "EaseIn",
            Affector::EaseOut => "EaseOut",
            Affector::Randomise => "Randomise",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name().eq_ignore_ascii_case(name))
    }

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

/// A float parameter in 0..1 whose output is `lerp(value_at_zero, value_at_one, affector(shaped))`
#[derive(Debug, Clone)]
pub struct ScaledParameter {
    base: Parameter,
    value_at_zero: ParameterValue,
    value_at_one: ParameterValue,
    affector: Affector,
    invert: bool,
    scaled_value: ParameterValue,
}

impl ScaledParameter {
    /// Output range must be float, int, color or vec3, both ends of the same kind
    pub fn try_new(
        address: impl Into<String>,
        value: f32,
        value_at_zero: ParameterValue,
        value_at_one: ParameterValue,
    ) -> Result<Self, ParameterError> {
        let address = address.into();
        check_range(&address, &value_at_zero, &value_at_one)?;
        Ok(Self::new_unchecked(address, value, value_at_zero, value_at_one))
    }

    fn new_unchecked(address: String, value: f32, value_at_zero: ParameterValue, value_at_one: ParameterValue) -> Self {
        let mut scaled = Self {
            base: Parameter::bounded_float(address, value, 0.0, 1.0),
            scaled_value: value_at_zero.clone(),
            value_at_zero,
            value_at_one,
            affector: Affector::Linear,
            invert: false,
        };
        scaled.recompute();
        scaled
    }

    pub fn float(address: impl Into<String>, value: f32, at_zero: f32, at_one: f32) -> Self {
        Self::new_unchecked(address.into(), value, at_zero.into(), at_one.into())
    }

    pub fn int(address: impl Into<String>, value: f32, at_zero: i32, at_one: i32) -> Self {
        Self::new_unchecked(address.into(), value, at_zero.into(), at_one.into())
    }

    pub fn color(address: impl Into<String>, value: f32, at_zero: Color, at_one: Color) -> Self {
        Self::new_unchecked(address.into(), value, at_zero.into(), at_one.into())
    }

    pub fn vec3(address: impl Into<String>, value: f32, at_zero: [f32; 3], at_one: [f32; 3]) -> Self {
        Self::new_unchecked(address.into(), value, at_zero.into(), at_one.into())
    }

    pub fn with_affector(mut self, affector: Affector) -> Self {
        self.set_affector(affector);
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.set_invert(invert);
        self
    }

    pub fn with_should_save(mut self, should_save: bool) -> Self {
        self.base.set_should_save(should_save);
        self
    }

    /// The normalized backing value
    pub fn raw(&self) -> f32 {
        self.base.value().as_f32().unwrap_or(0.0)
    }

    pub fn scaled(&self) -> &ParameterValue {
        &self.scaled_value
    }

    pub fn affector(&self) -> Affector {
        self.affector
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    pub fn value_at_zero(&self) -> &ParameterValue {
        &self.value_at_zero
    }

    pub fn value_at_one(&self) -> &ParameterValue {
        &self.value_at_one
    }

    pub fn set_affector(&mut self, affector: Affector) {
        self.affector = affector;
        self.recompute();
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
        self.recompute();
    }

    pub fn set_range(&mut self, value_at_zero: ParameterValue, value_at_one: ParameterValue) -> Result<(), ParameterError> {
        check_range(self.base.address(), &value_at_zero, &value_at_one)?;
        self.value_at_zero = value_at_zero;
        self.value_at_one = value_at_one;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        let clamped = self.raw().clamp(0.0, 1.0);
        let shaped = if self.invert { 1.0 - clamped } else { clamped };
        let t = self.affector.apply(shaped);
        self.scaled_value = interpolate(&self.value_at_zero, &self.value_at_one, t);
    }
}

fn check_range(address: &str, zero: &ParameterValue, one: &ParameterValue) -> Result<(), ParameterError> {
    let kind = zero.kind();
    if !matches!(kind, ValueKind::Float | ValueKind::Int | ValueKind::Color | ValueKind::Vec3) {
        return Err(ParameterError::UnsupportedType { address: address.to_string(), kind });
    }
    if one.kind() != kind {
        return Err(ParameterError::MismatchedRange { address: address.to_string(), expected: kind });
    }
    Ok(())
}

fn interpolate(zero: &ParameterValue, one: &ParameterValue, t: f32) -> ParameterValue {
    match (zero, one) {
        (ParameterValue::Float(a), ParameterValue::Float(b)) => ParameterValue::Float(lerp(*a, *b, t)),
        (ParameterValue::Int(a), ParameterValue::Int(b)) => {
            ParameterValue::Int(lerp(*a as f32, *b as f32, t).round() as i32)
        }
        (ParameterValue::Color(a), ParameterValue::Color(b)) => ParameterValue::Color(a.lerp(*b, t)),
        (ParameterValue::Vec3(a), ParameterValue::Vec3(b)) => ParameterValue::Vec3([
            lerp(a[0], b[0], t),
            lerp(a[1], b[1], t),
            lerp(a[2], b[2], t),
        ]),
        _ => zero.clone(),
    }
}

impl FxParameter for ScaledParameter {
    fn address(&self) -> &str {
        self.base.address()
    }

    fn value(&self) -> &ParameterValue {
        self.base.value()
    }

    fn default_value(&self) -> &ParameterValue {
        self.base.default_value()
    }

    fn scene_default_value(&self) -> &ParameterValue {
        self.base.scene_default_value()
    }

    fn min_value(&self) -> Option<&ParameterValue> {
        self.base.min_value()
    }

    fn max_value(&self) -> Option<&ParameterValue> {
        self.base.max_value()
    }

    fn should_save(&self) -> bool {
        self.base.should_save()
    }

    fn set_should_save(&mut self, should_save: bool) {
        self.base.set_should_save(should_save);
    }

    /// Every set reshapes the output, so `Randomise` draws again even when
    /// the base value is unchanged.
    fn apply(&mut self, value: ParameterValue, update_scene_default: bool) -> Result<bool, CoercionError> {
        let changed = self.base.apply(value, update_scene_default)?;
        let previous = self.scaled_value.clone();
        self.recompute();
        Ok(changed || self.scaled_value != previous)
    }

    fn keep_as_scene_default(&mut self) {
        self.base.keep_as_scene_default();
    }

    fn scaled_value(&self) -> Option<ParameterValue> {
        Some(self.scaled_value.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
