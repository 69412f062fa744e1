use thiserror::Error;

use crate::params::{CoercionError, ParameterError, ValueKind};

/// Errors raised by registry lookups and dispatch.
///
/// None of these are fatal. The logging entry points (`set`, `get`) report
/// them as warnings and turn the call into a no-op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("an FX item is already registered at {0}")]
    DuplicateAddress(String),

    #[error("{0:?} is not a valid FX address")]
    InvalidAddress(String),

    #[error("no FX item registered at {0}")]
    AddressNotFound(String),

    #[error("FX item at {0} is not a scaled parameter")]
    NotScaled(String),

    #[error("argument {index} for {address} should be {expected}, received {found}")]
    TypeMismatch {
        address: String,
        index: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("argument {index} for {address} should be a finite {expected}")]
    NotFinite {
        address: String,
        index: usize,
        expected: ValueKind,
    },

    #[error("{address} takes {expected} argument(s), received {received}")]
    ArityMismatch {
        address: String,
        expected: usize,
        received: usize,
    },

    #[error("parameter {0} is write protected")]
    WriteProtected(String),

    #[error("{value} is not a defined value for enum parameter {address}")]
    EnumValueUndefined { address: String, value: i32 },

    #[error("method {address} declares an unsupported {kind} argument")]
    UnsupportedArgument { address: String, kind: ValueKind },

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

impl RegistryError {
    pub(crate) fn from_coercion(address: &str, index: usize, err: CoercionError) -> Self {
        match err {
            CoercionError::TypeMismatch { expected, found } => RegistryError::TypeMismatch {
                address: address.to_string(),
                index,
                expected,
                found,
            },
            CoercionError::EnumValueUndefined { value } => RegistryError::EnumValueUndefined {
                address: address.to_string(),
                value,
            },
            CoercionError::NotFinite { expected } => RegistryError::NotFinite {
                address: address.to_string(),
                index,
                expected,
            },
        }
    }
}
