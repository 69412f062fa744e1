use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{Registry, RegistryError};
use crate::params::{Arg, IntRounding, ValueKind};

/// Callable published under an address.
///
/// The handler receives the registry read-only together with arguments
/// already coerced to the declared signature.
pub type MethodHandler = dyn FnMut(&Registry, &[Arg]);

/// An invokable registry entry with a declared argument signature
pub struct Method {
    signature: Vec<ValueKind>,
    handler: Rc<RefCell<MethodHandler>>,
}

impl Method {
    pub fn new<F>(signature: &[ValueKind], handler: F) -> Self
    where
        F: FnMut(&Registry, &[Arg]) + 'static,
    {
        Self {
            signature: signature.to_vec(),
            handler: Rc::new(RefCell::new(handler)),
        }
    }

    pub fn signature(&self) -> &[ValueKind] {
        &self.signature
    }

    pub(crate) fn handler(&self) -> Rc<RefCell<MethodHandler>> {
        Rc::clone(&self.handler)
    }

    pub(crate) fn validate(&self, address: &str) -> Result<(), RegistryError> {
        match self.signature.iter().find(|kind| !kind.is_wire_kind()) {
            Some(kind) => Err(RegistryError::UnsupportedArgument {
                address: address.to_string(),
                kind: *kind,
            }),
            None => Ok(()),
        }
    }

    /// Coerce every argument up front so a failure leaves nothing half-applied
    pub(crate) fn coerce(&self, address: &str, args: &[Arg]) -> Result<Vec<Arg>, RegistryError> {
        if args.len() != self.signature.len() {
            return Err(RegistryError::ArityMismatch {
                address: address.to_string(),
                expected: self.signature.len(),
                received: args.len(),
            });
        }
        self.signature
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (kind, arg))| {
                arg.coerce(*kind, IntRounding::Truncate)
                    .map_err(|err| RegistryError::from_coercion(address, index, err))
            })
            .collect()
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("signature", &self.signature).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_checks_arity() {
        let method = Method::new(&[ValueKind::Float, ValueKind::Int], |_, _| {});
        let err = method.coerce("/m", &[Arg::Float(1.0)]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::ArityMismatch { address: "/m".into(), expected: 2, received: 1 }
        );
    }

    #[test]
    fn test_coerce_truncates_floats() {
        let method = Method::new(&[ValueKind::Int, ValueKind::Bool], |_, _| {});
        let args = method.coerce("/m", &[Arg::Float(2.9), Arg::Float(1.0)]).unwrap();
        assert_eq!(args, vec![Arg::Int(2), Arg::Bool(true)]);
    }

    #[test]
    fn test_validate_rejects_output_only_kinds() {
        let method = Method::new(&[ValueKind::Vec3], |_, _| {});
        assert!(matches!(
            method.validate("/m"),
            Err(RegistryError::UnsupportedArgument { kind: ValueKind::Vec3, .. })
        ));
    }
}
