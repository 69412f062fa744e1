//! Parameter model
//!
//! Typed value cells published through the [`Registry`](crate::registry::Registry):
//!
//! - [`ParameterValue`] / [`Arg`]: the closed set of native and wire values,
//!   with explicit coercion between them
//! - [`Parameter`]: value, default, scene default, optional bounds, save flag
//! - [`ScaledParameter`]: a normalized value mapped through an [`Affector`]
//!   into a float, int, color or vector output range
//! - [`FxParameter`]: the capability trait the registry stores behind a box

mod parameter;
mod scaled;
mod value;

pub use parameter::*;
pub use scaled::*;
pub use value::*;
