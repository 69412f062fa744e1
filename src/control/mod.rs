//! Control surface routing
//!
//! Remote peers speak in [`ControlMessage`]s: an address plus wire arguments.
//! Inbound messages are parsed into [`ControlCommand`]s and executed against
//! the registry, groups, scene store and clock through a [`ControlContext`].
//! Registry events travel the other way through the [`OutboundQueue`], which
//! holds one rate-limited queue per node.

mod command;
mod message;
mod outbound;
mod router;

pub use command::{CommandError, ControlCommand};
pub use message::*;
pub use outbound::{event_messages, OutboundQueue};
pub use router::{chunk_scene_list, ControlContext};
