//! Component registration helpers
//!
//! A component publishes everything under `/<name>/...` and always gets a
//! `/<name>/fxEnabled` toggle, which scene loads switch off when a scene does
//! not mention it.

mod builtin;

pub use builtin::{register_builtin_components, Heat, Invert, Strobe};

use crate::params::{Arg, FxParameter, Parameter, ValueKind};
use crate::registry::{Registry, RegistryError};

/// Address suffix of the toggle every component owns
pub const ENABLED_SUFFIX: &str = "fxEnabled";

/// Something that publishes parameters and methods into the registry
pub trait FxComponent {
    /// Address prefix, without slashes
    fn name(&self) -> &str;

    fn enabled_by_default(&self) -> bool {
        true
    }

    fn register(&self, scope: &mut FxScope<'_>) -> Result<(), RegistryError>;
}

/// Registration context rooted at a component's base address
pub struct FxScope<'a> {
    registry: &'a mut Registry,
    base: String,
}

impl<'a> FxScope<'a> {
    pub fn new(registry: &'a mut Registry, name: &str) -> Self {
        Self {
            registry,
            base: format!("/{}", name.trim_matches('/')),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Full address of a member
    pub fn address(&self, member: &str) -> String {
        format!("{}/{}", self.base, member.trim_start_matches('/'))
    }

    pub fn enabled_address(&self) -> String {
        self.address(ENABLED_SUFFIX)
    }

    pub fn add_parameter(&mut self, parameter: impl FxParameter) -> Result<(), RegistryError> {
        self.registry.register_parameter(parameter)
    }

    pub fn add_method<F>(&mut self, member: &str, signature: &[ValueKind], handler: F) -> Result<(), RegistryError>
    where
        F: FnMut(&Registry, &[Arg]) + 'static,
    {
        let address = self.address(member);
        self.registry.register_method(&address, signature, handler)
    }
}

/// Register a component's enabled toggle and then its own entries
pub fn register_component(registry: &mut Registry, component: &dyn FxComponent) -> Result<(), RegistryError> {
    let mut scope = FxScope::new(registry, component.name());
    let enabled = Parameter::bool(scope.enabled_address(), component.enabled_by_default());
    scope.add_parameter(enabled)?;
    component.register(&mut scope)?;
    tracing::info!(component = component.name(), "registered FX component");
    Ok(())
}
