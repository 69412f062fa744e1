//! OSC transport
//!
//! [`codec`] converts between UDP datagrams and [`ControlMessage`](crate::control::ControlMessage)s;
//! [`OscEndpoint`] owns one node's socket.

pub mod codec;
mod endpoint;

pub use codec::OscCodecError;
pub use endpoint::{Inbound, OscEndpoint};
