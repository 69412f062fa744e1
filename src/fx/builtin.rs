//! Built-in components
//!
//! The standard set published by the server binary.

use super::{register_component, FxComponent, FxScope};
use crate::params::{Color, Parameter, ScaledParameter, ValueKind};
use crate::registry::{Registry, RegistryError};

pub struct Invert;

impl FxComponent for Invert {
    fn name(&self) -> &str {
        "Invert"
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn register(&self, scope: &mut FxScope<'_>) -> Result<(), RegistryError> {
        scope.add_parameter(ScaledParameter::float(scope.address("amount"), 1.0, 0.0, 1.0))?;
        scope.add_parameter(Parameter::bool(scope.address("invertAlpha"), false))
    }
}

pub struct Heat;

impl FxComponent for Heat {
    fn name(&self) -> &str {
        "Heat"
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn register(&self, scope: &mut FxScope<'_>) -> Result<(), RegistryError> {
        scope.add_parameter(ScaledParameter::float(scope.address("amount"), 1.0, 0.0, 1.0))?;
        scope.add_parameter(Parameter::bounded_float(scope.address("sensitivity"), 1.0, 0.5, 2.0))?;
        scope.add_parameter(Parameter::bounded_float(scope.address("coldOffset"), 0.0, -0.5, 0.5))?;
        scope.add_parameter(Parameter::color(scope.address("hotColour"), Color::rgb(1.0, 0.2, 0.0)))
    }
}

pub struct Strobe;

impl Strobe {
    const MODES: [&'static str; 3] = ["Flash", "Fade", "Pulse"];
}

impl FxComponent for Strobe {
    fn name(&self) -> &str {
        "Strobe"
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn register(&self, scope: &mut FxScope<'_>) -> Result<(), RegistryError> {
        scope.add_parameter(ScaledParameter::float(scope.address("rate"), 0.25, 1.0, 20.0))?;
        scope.add_parameter(ScaledParameter::color(
            scope.address("colour"),
            1.0,
            Color::BLACK,
            Color::WHITE,
        ))?;
        scope.add_parameter(Parameter::enumeration(scope.address("mode"), &Self::MODES, 0))?;

        let colour = scope.address("colour");
        scope.add_method("fxTrigger/flash", &[], move |registry, _| {
            let scaled = registry.scaled_value(&colour);
            tracing::debug!(?scaled, "strobe flash");
        })?;
        scope.add_method("fxTrigger/burst", &[ValueKind::Int], |_, args| {
            tracing::debug!(count = ?args.first(), "strobe burst");
        })
    }
}

/// Register every built-in component
pub fn register_builtin_components(registry: &mut Registry) -> Result<(), RegistryError> {
    let components: [&dyn FxComponent; 3] = [&Invert, &Heat, &Strobe];
    for component in components {
        register_component(registry, component)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Arg;

    #[test]
    fn test_builtin_components_register() {
        let mut registry = Registry::new();
        register_builtin_components(&mut registry).unwrap();
        assert_eq!(registry.get_bool("/Strobe/fxEnabled"), Some(false));
        assert_eq!(registry.get_f32("/Heat/sensitivity"), Some(1.0));
        assert!(registry.is_method("/strobe/fxtrigger/flash"));
        assert!(registry.set("/Strobe/fxTrigger/burst", &[Arg::Int(3)]));
    }

    #[test]
    fn test_heat_bounds_clamp() {
        let mut registry = Registry::new();
        register_builtin_components(&mut registry).unwrap();
        registry.set("/Heat/coldOffset", &[Arg::Float(3.0)]);
        assert_eq!(registry.get_f32("/Heat/coldOffset"), Some(0.5));
    }
}
