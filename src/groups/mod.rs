//! Group controllers
//!
//! A group bundles parameter addresses and trigger (method) addresses. When
//! its signal source is a pattern, each tick writes the pattern value into
//! the member parameters and invokes the triggers whenever the pattern fires.
//! Playback is beat-synced through the shared [`BpmClock`].

mod clock;
mod group;
mod manager;
mod pattern;

pub use clock::{BpmClock, ClockTick};
pub use group::{GroupController, GroupPreset};
pub use manager::GroupManager;
pub use pattern::{OscillatorType, Pattern, PatternOutput, PatternType, SignalSource};
