use std::collections::BTreeMap;

use super::events::{EventBus, FxEvent};
use super::method::Method;
use super::RegistryError;
use crate::params::{Affector, Arg, Color, FxParameter, PaletteBinding, ParameterError, ParameterValue, ScaledParameter, ValueKind};

/// A registered item
pub enum Entry {
    Parameter(Box<dyn FxParameter>),
    Method(Method),
}

impl Entry {
    pub fn parameter(parameter: impl FxParameter) -> Self {
        Entry::Parameter(Box::new(parameter))
    }

    pub fn method<F>(signature: &[ValueKind], handler: F) -> Self
    where
        F: FnMut(&Registry, &[Arg]) + 'static,
    {
        Entry::Method(Method::new(signature, handler))
    }
}

struct Slot {
    /// Address as registered, case preserved
    address: String,
    entry: Entry,
}

/// Lookup key for an address
pub fn address_key(address: &str) -> String {
    address.to_lowercase()
}

/// Address table for every parameter and method in the process.
///
/// Addresses are case-insensitive. The table is owned by the application
/// root and handed to components that publish or query addresses; it is not
/// shared across threads.
pub struct Registry {
    entries: BTreeMap<String, Slot>,
    events: EventBus,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            events: EventBus::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════

    /// Register an entry. The first registration of an address wins.
    pub fn register(&mut self, address: &str, entry: Entry) -> Result<(), RegistryError> {
        if address.trim().is_empty() {
            return Err(RegistryError::InvalidAddress(address.to_string()));
        }
        let key = address_key(address);
        if self.entries.contains_key(&key) {
            tracing::warn!(address, "FX item already registered, ignoring duplicate");
            return Err(RegistryError::DuplicateAddress(address.to_string()));
        }
        if let Entry::Method(method) = &entry {
            method.validate(address)?;
        }

        self.entries.insert(
            key,
            Slot {
                address: address.to_string(),
                entry,
            },
        );
        tracing::debug!(address, "registered FX item");
        self.events.emit(FxEvent::ItemAdded {
            address: address.to_string(),
        });
        Ok(())
    }

    pub fn register_parameter(&mut self, parameter: impl FxParameter) -> Result<(), RegistryError> {
        let address = parameter.address().to_string();
        self.register(&address, Entry::parameter(parameter))
    }

    pub fn register_method<F>(
        &mut self,
        address: &str,
        signature: &[ValueKind],
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: FnMut(&Registry, &[Arg]) + 'static,
    {
        self.register(address, Entry::method(signature, handler))
    }

    /// Remove a parameter during component or group teardown. Methods stay registered.
    pub fn remove_parameter(&mut self, address: &str) -> Result<Box<dyn FxParameter>, RegistryError> {
        let key = address_key(address);
        if !self.is_parameter(address) {
            return Err(RegistryError::AddressNotFound(address.to_string()));
        }
        let Some(Slot { address: registered, entry: Entry::Parameter(parameter) }) = self.entries.remove(&key) else {
            return Err(RegistryError::AddressNotFound(address.to_string()));
        };
        self.events.emit(FxEvent::ItemRemoved { address: registered });
        Ok(parameter)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(&address_key(address))
    }

    pub fn is_parameter(&self, address: &str) -> bool {
        self.parameter(address).is_some()
    }

    pub fn is_method(&self, address: &str) -> bool {
        matches!(
            self.entries.get(&address_key(address)),
            Some(Slot { entry: Entry::Method(_), .. })
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered addresses in lowercase order, case preserved
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|slot| slot.address.as_str())
    }

    pub fn parameters(&self) -> impl Iterator<Item = &dyn FxParameter> {
        self.entries.values().filter_map(|slot| match &slot.entry {
            Entry::Parameter(parameter) => Some(parameter.as_ref()),
            Entry::Method(_) => None,
        })
    }

    pub fn parameter(&self, address: &str) -> Option<&dyn FxParameter> {
        match self.entries.get(&address_key(address)) {
            Some(Slot { entry: Entry::Parameter(parameter), .. }) => Some(parameter.as_ref()),
            _ => None,
        }
    }

    pub fn scaled_parameter(&self, address: &str) -> Option<&ScaledParameter> {
        self.parameter(address)?.as_any().downcast_ref::<ScaledParameter>()
    }

    pub fn method(&self, address: &str) -> Option<&Method> {
        match self.entries.get(&address_key(address)) {
            Some(Slot { entry: Entry::Method(method), .. }) => Some(method),
            _ => None,
        }
    }

    pub fn try_get(&self, address: &str) -> Result<ParameterValue, RegistryError> {
        self.parameter(address)
            .map(|parameter| parameter.value().clone())
            .ok_or_else(|| RegistryError::AddressNotFound(address.to_string()))
    }

    /// Current value, logging a warning when the address is not a parameter
    pub fn get(&self, address: &str) -> Option<ParameterValue> {
        match self.try_get(address) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to get FX value: {}", e);
                None
            }
        }
    }

    pub fn get_f32(&self, address: &str) -> Option<f32> {
        self.parameter(address)?.value().as_f32()
    }

    pub fn get_i32(&self, address: &str) -> Option<i32> {
        self.parameter(address)?.value().as_i32()
    }

    pub fn get_bool(&self, address: &str) -> Option<bool> {
        self.parameter(address)?.value().as_bool()
    }

    pub fn get_string(&self, address: &str) -> Option<String> {
        self.parameter(address)?.value().as_str().map(str::to_string)
    }

    pub fn get_color(&self, address: &str) -> Option<Color> {
        self.parameter(address)?.value().as_color()
    }

    pub fn scaled_value(&self, address: &str) -> Option<ParameterValue> {
        self.parameter(address)?.scaled_value()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════════

    /// Set a parameter or invoke a method by address.
    ///
    /// Returns `Ok(true)` when a parameter changed or a method ran.
    pub fn try_set(&mut self, address: &str, args: &[Arg]) -> Result<bool, RegistryError> {
        let key = address_key(address);
        let invocation = match self.entries.get(&key) {
            None => return Err(RegistryError::AddressNotFound(address.to_string())),
            Some(Slot { entry: Entry::Method(method), .. }) => {
                Some((method.coerce(address, args)?, method.handler()))
            }
            Some(Slot { entry: Entry::Parameter(_), .. }) => None,
        };

        if let Some((args, handler)) = invocation {
            tracing::trace!(address, ?args, "invoking FX method");
            let mut handler = handler.borrow_mut();
            (&mut *handler)(self, &args);
            return Ok(true);
        }

        if args.len() != 1 {
            return Err(RegistryError::ArityMismatch {
                address: address.to_string(),
                expected: 1,
                received: args.len(),
            });
        }
        self.update_parameter(address, |parameter| {
            if !parameter.should_save() {
                return Err(RegistryError::WriteProtected(address.to_string()));
            }
            let value = parameter
                .value()
                .coerce_arg(&args[0])
                .map_err(|e| RegistryError::from_coercion(address, 0, e))?;
            parameter
                .apply(value, true)
                .map_err(|e| RegistryError::from_coercion(address, 0, e))
        })
    }

    /// Network-facing set: failures are logged and the call becomes a no-op
    pub fn set(&mut self, address: &str, args: &[Arg]) -> bool {
        match self.try_set(address, args) {
            Ok(_) => true,
            Err(RegistryError::WriteProtected(address)) => {
                tracing::debug!(%address, "ignoring set on write protected parameter");
                false
            }
            Err(e) => {
                tracing::warn!("Failed to set FX value: {}", e);
                false
            }
        }
    }

    /// Owner-side write that bypasses write protection
    pub fn write(&mut self, address: &str, value: ParameterValue) -> Result<bool, RegistryError> {
        self.update_parameter(address, |parameter| {
            parameter
                .apply(value, true)
                .map_err(|e| RegistryError::from_coercion(address, 0, e))
        })
    }

    pub fn reset_to_default(&mut self, address: &str) -> Result<bool, RegistryError> {
        self.update_parameter(address, |parameter| Ok(parameter.reset_to_default()))
    }

    pub fn reset_to_scene_default(&mut self, address: &str) -> Result<bool, RegistryError> {
        self.update_parameter(address, |parameter| Ok(parameter.reset_to_scene_default()))
    }

    pub fn reset_all_to_default(&mut self) {
        let addresses: Vec<String> = self.parameters().map(|p| p.address().to_string()).collect();
        for address in addresses {
            if let Err(e) = self.reset_to_default(&address) {
                tracing::warn!("Failed to reset {}: {}", address, e);
            }
        }
    }

    fn update_parameter<F>(&mut self, address: &str, update: F) -> Result<bool, RegistryError>
    where
        F: FnOnce(&mut dyn FxParameter) -> Result<bool, RegistryError>,
    {
        let slot = self
            .entries
            .get_mut(&address_key(address))
            .ok_or_else(|| RegistryError::AddressNotFound(address.to_string()))?;
        let Entry::Parameter(parameter) = &mut slot.entry else {
            return Err(RegistryError::AddressNotFound(address.to_string()));
        };

        let changed = update(parameter.as_mut())?;
        if changed {
            let event = FxEvent::ValueChanged {
                address: slot.address.clone(),
                value: parameter.value().clone(),
                scaled: parameter.scaled_value(),
            };
            self.events.emit(event);
        }
        Ok(changed)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Scaled parameters
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_affector(&mut self, address: &str, affector: Affector) -> Result<(), RegistryError> {
        self.update_scaled(address, |scaled| {
            scaled.set_affector(affector);
            Ok(())
        })
    }

    pub fn set_invert(&mut self, address: &str, invert: bool) -> Result<(), RegistryError> {
        self.update_scaled(address, |scaled| {
            scaled.set_invert(invert);
            Ok(())
        })
    }

    pub fn set_scale_range(
        &mut self,
        address: &str,
        value_at_zero: ParameterValue,
        value_at_one: ParameterValue,
    ) -> Result<(), RegistryError> {
        self.update_scaled(address, |scaled| scaled.set_range(value_at_zero, value_at_one))
    }

    fn update_scaled<F>(&mut self, address: &str, update: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut ScaledParameter) -> Result<(), ParameterError>,
    {
        let slot = self
            .entries
            .get_mut(&address_key(address))
            .ok_or_else(|| RegistryError::AddressNotFound(address.to_string()))?;
        let Entry::Parameter(parameter) = &mut slot.entry else {
            return Err(RegistryError::AddressNotFound(address.to_string()));
        };
        let scaled = parameter
            .as_any_mut()
            .downcast_mut::<ScaledParameter>()
            .ok_or_else(|| RegistryError::NotScaled(address.to_string()))?;

        update(scaled)?;
        let event = FxEvent::ScaleChanged {
            address: slot.address.clone(),
            affector: scaled.affector(),
            invert: scaled.invert(),
            scaled: scaled.scaled().clone(),
        };
        self.events.emit(event);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Palette flags
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_palette_index(&mut self, address: &str, index: i32) -> Result<(), RegistryError> {
        let registered = self.update_palette(address, |binding| binding.index = index)?;
        self.events.emit(FxEvent::PaletteIndexChanged { address: registered, index });
        Ok(())
    }

    pub fn set_use_global_palette(&mut self, address: &str, enabled: bool) -> Result<(), RegistryError> {
        let registered = self.update_palette(address, |binding| binding.use_global = enabled)?;
        self.events.emit(FxEvent::UseGlobalPaletteChanged { address: registered, enabled });
        Ok(())
    }

    fn update_palette<F>(&mut self, address: &str, update: F) -> Result<String, RegistryError>
    where
        F: FnOnce(&mut PaletteBinding),
    {
        let slot = self
            .entries
            .get_mut(&address_key(address))
            .ok_or_else(|| RegistryError::AddressNotFound(address.to_string()))?;
        let binding = match &mut slot.entry {
            Entry::Parameter(parameter) => parameter.palette_mut(),
            Entry::Method(_) => None,
        };
        let Some(binding) = binding else {
            return Err(RegistryError::TypeMismatch {
                address: address.to_string(),
                index: 0,
                expected: ValueKind::Color,
                found: self.parameter(address).map(|p| p.kind()).unwrap_or(ValueKind::String),
            });
        };
        update(binding);
        Ok(slot.address.clone())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Publish an event on behalf of a manager built on the registry
    pub fn emit(&mut self, event: FxEvent) {
        self.events.emit(event);
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Parameter;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn recorder(registry: &mut Registry) -> Rc<RefCell<Vec<FxEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        registry.events().subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    fn value_changes(events: &[FxEvent]) -> usize {
        events.iter().filter(|e| matches!(e, FxEvent::ValueChanged { .. })).count()
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Chase/speed", 0.5)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.try_get("/chase/SPEED"), Ok(ParameterValue::Float(0.5)));
        assert_eq!(registry.get_f32("/Chase/speed"), Some(0.5));
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Chase/speed", 0.5)).unwrap();
        let err = registry.register_parameter(Parameter::float("/CHASE/Speed", 0.9)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAddress("/CHASE/Speed".into()));
        assert_eq!(registry.get_f32("/chase/speed"), Some(0.5));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.addresses().collect::<Vec<_>>(), vec!["/Chase/speed"]);
    }

    #[test]
    fn test_empty_address_rejected() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register_parameter(Parameter::int(" ", 1)),
            Err(RegistryError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_get_method_is_not_found() {
        let mut registry = Registry::new();
        registry.register_method("/Chase/FXTrigger", &[], |_, _| {}).unwrap();
        assert_eq!(
            registry.try_get("/Chase/FXTrigger"),
            Err(RegistryError::AddressNotFound("/Chase/FXTrigger".into()))
        );
        assert!(registry.get("/missing").is_none());
    }

    #[test]
    fn test_set_emits_once_for_repeated_value() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::int("/Chase/count", 1)).unwrap();
        let events = recorder(&mut registry);
        assert!(registry.set("/Chase/count", &[Arg::Int(4)]));
        assert!(registry.set("/Chase/count", &[Arg::Int(4)]));
        assert_eq!(value_changes(&events.borrow()), 1);
    }

    #[test]
    fn test_set_clamps_to_bounds() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::bounded_float("/Fx/level", 0.5, 0.0, 1.0)).unwrap();
        for v in [-3.0, 0.25, 7.5] {
            registry.set("/Fx/level", &[Arg::Float(v)]);
            let value = registry.get_f32("/Fx/level").unwrap();
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_set_coerces_float_into_int_parameter_with_ceiling() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::int("/Fx/count", 0)).unwrap();
        registry.try_set("/Fx/count", &[Arg::Float(2.1)]).unwrap();
        assert_eq!(registry.get_i32("/Fx/count"), Some(3));
    }

    #[test]
    fn test_set_float_into_bool_parameter() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::bool("/Fx/fxEnabled", false)).unwrap();
        registry.try_set("/Fx/fxEnabled", &[Arg::Float(1.0)]).unwrap();
        assert_eq!(registry.get_bool("/Fx/fxEnabled"), Some(true));
    }

    #[test]
    fn test_set_type_mismatch_is_noop() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::string("/Fx/label", "a")).unwrap();
        let events = recorder(&mut registry);
        let err = registry.try_set("/Fx/label", &[Arg::Int(3)]).unwrap_err();
        assert!(matches!(err, RegistryError::TypeMismatch { index: 0, .. }));
        assert!(!registry.set("/Fx/label", &[Arg::Int(3)]));
        assert_eq!(registry.get_string("/Fx/label"), Some("a".into()));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_set_parameter_requires_single_argument() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Fx/level", 0.0)).unwrap();
        let err = registry.try_set("/Fx/level", &[]).unwrap_err();
        assert_eq!(err, RegistryError::ArityMismatch { address: "/Fx/level".into(), expected: 1, received: 0 });
    }

    #[test]
    fn test_write_protected_parameter() {
        let mut registry = Registry::new();
        registry
            .register_parameter(Parameter::float("/Fx/output", 0.0).with_should_save(false))
            .unwrap();
        assert_eq!(
            registry.try_set("/Fx/output", &[Arg::Float(1.0)]),
            Err(RegistryError::WriteProtected("/Fx/output".into()))
        );
        assert_eq!(registry.write("/Fx/output", ParameterValue::Float(1.0)), Ok(true));
        assert_eq!(registry.get_f32("/Fx/output"), Some(1.0));
    }

    #[test]
    fn test_enum_parameter_rejects_undefined_member() {
        let mut registry = Registry::new();
        registry
            .register_parameter(Parameter::enumeration("/Chase/pattern", &["Sine", "EveryOther", "MiddleOut"], 0))
            .unwrap();
        assert_eq!(
            registry.try_set("/Chase/pattern", &[Arg::Int(5)]),
            Err(RegistryError::EnumValueUndefined { address: "/Chase/pattern".into(), value: 5 })
        );
        registry.try_set("/Chase/pattern", &[Arg::Int(2)]).unwrap();
        assert_eq!(registry.get("/Chase/pattern").unwrap().enum_name(), Some("MiddleOut"));
    }

    #[test]
    fn test_method_invocation_with_coercion() {
        let mut registry = Registry::new();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        registry
            .register_method("/Fx/Flash", &[ValueKind::Int, ValueKind::Float], move |_, args| {
                sink.borrow_mut().extend_from_slice(args);
            })
            .unwrap();
        assert_eq!(registry.try_set("/fx/flash", &[Arg::Float(3.9), Arg::Int(2)]), Ok(true));
        assert_eq!(*received.borrow(), vec![Arg::Int(3), Arg::Float(2.0)]);
    }

    #[test]
    fn test_method_arity_mismatch_does_not_invoke() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Fx/level", 0.2)).unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        registry
            .register_method("/Fx/Pulse", &[ValueKind::Float, ValueKind::Float], move |_, _| {
                counter.set(counter.get() + 1);
            })
            .unwrap();
        let err = registry.try_set("/Fx/Pulse", &[Arg::Float(1.0)]).unwrap_err();
        assert!(matches!(err, RegistryError::ArityMismatch { expected: 2, received: 1, .. }));
        assert!(!registry.set("/Fx/Pulse", &[Arg::Float(1.0), Arg::String("x".into())]));
        assert_eq!(calls.get(), 0);
        assert_eq!(registry.get_f32("/Fx/level"), Some(0.2));
    }

    #[test]
    fn test_method_reads_registry() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Fx/level", 0.75)).unwrap();
        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        registry
            .register_method("/Fx/FXTrigger", &[], move |registry, _| {
                sink.set(registry.get_f32("/Fx/level").unwrap_or_default());
            })
            .unwrap();
        registry.try_set("/Fx/FXTrigger", &[]).unwrap();
        assert_eq!(seen.get(), 0.75);
    }

    #[test]
    fn test_scaled_value_ready_before_event() {
        let mut registry = Registry::new();
        registry.register_parameter(ScaledParameter::float("/Fx/speed", 0.0, 0.0, 10.0)).unwrap();
        let events = recorder(&mut registry);
        registry.set("/Fx/speed", &[Arg::Float(0.5)]);
        assert_eq!(
            events.borrow().last(),
            Some(&FxEvent::ValueChanged {
                address: "/Fx/speed".into(),
                value: ParameterValue::Float(0.5),
                scaled: Some(ParameterValue::Float(5.0)),
            })
        );
    }

    #[test]
    fn test_invert_change_emits_scale_event() {
        let mut registry = Registry::new();
        registry.register_parameter(ScaledParameter::float("/Fx/speed", 0.0, 0.0, 10.0)).unwrap();
        let events = recorder(&mut registry);
        registry.set_invert("/Fx/speed", true).unwrap();
        assert_eq!(registry.scaled_value("/Fx/speed"), Some(ParameterValue::Float(10.0)));
        assert!(matches!(
            events.borrow().last(),
            Some(FxEvent::ScaleChanged { invert: true, .. })
        ));
        registry.set_affector("/Fx/speed", Affector::EaseIn).unwrap();
        assert_eq!(registry.scaled_parameter("/Fx/speed").unwrap().affector(), Affector::EaseIn);
    }

    #[test]
    fn test_scale_ops_on_plain_parameter() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Fx/level", 0.0)).unwrap();
        assert_eq!(
            registry.set_invert("/Fx/level", true),
            Err(RegistryError::NotScaled("/Fx/level".into()))
        );
    }

    #[test]
    fn test_reset_paths() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Fx/level", 0.1)).unwrap();
        registry.set("/Fx/level", &[Arg::Float(0.6)]);
        registry.write("/Fx/level", ParameterValue::Float(0.6)).unwrap();
        registry.reset_to_default("/Fx/level").unwrap();
        assert_eq!(registry.get_f32("/Fx/level"), Some(0.1));
        registry.set("/Fx/level", &[Arg::Float(0.9)]);
        registry.reset_all_to_default();
        assert_eq!(registry.get_f32("/Fx/level"), Some(0.1));
    }

    #[test]
    fn test_remove_parameter() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Fx/level", 0.1)).unwrap();
        registry.register_method("/Fx/FXTrigger", &[], |_, _| {}).unwrap();
        let events = recorder(&mut registry);
        assert!(registry.remove_parameter("/fx/level").is_ok());
        assert!(registry.remove_parameter("/Fx/FXTrigger").is_err());
        assert!(registry.is_method("/Fx/FXTrigger"));
        assert_eq!(*events.borrow(), vec![FxEvent::ItemRemoved { address: "/Fx/level".into() }]);
    }

    #[test]
    fn test_palette_flags() {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::color("/Fx/colour", Color::WHITE)).unwrap();
        registry.register_parameter(Parameter::float("/Fx/level", 0.0)).unwrap();
        registry.set_palette_index("/Fx/colour", 3).unwrap();
        registry.set_use_global_palette("/Fx/colour", true).unwrap();
        let binding = registry.parameter("/Fx/colour").unwrap().palette().unwrap();
        assert_eq!((binding.index, binding.use_global), (3, true));
        assert!(registry.set_palette_index("/Fx/level", 1).is_err());
    }
}
