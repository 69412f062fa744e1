//! Address registry
//!
//! A single explicitly constructed [`Registry`] maps case-insensitive string
//! addresses to parameters and methods. Components register their entries
//! once at start-up; remote peers, timers and the scene store then reach them
//! only by address.
//!
//! # Dispatch
//!
//! [`Registry::set`] takes a list of wire [`Arg`](crate::params::Arg)s:
//!
//! - methods require an exact arity; each argument is coerced to the declared
//!   kind before the handler runs, so a bad argument never causes a partial call
//! - parameters take exactly one argument, refuse writes when their save flag
//!   is off, clamp to bounds and emit [`FxEvent::ValueChanged`] only when the
//!   value actually changed
//!
//! Failures are reported as [`RegistryError`]. The `try_*` entry points return
//! them; `set`/`get` log a warning and carry on.

mod error;
mod events;
mod method;
mod table;

pub use error::RegistryError;
pub use events::{EventBus, FxEvent, SubscriptionId};
pub use method::{Method, MethodHandler};
pub use table::{address_key, Entry, Registry};
