//! Immersive FX Library
//!
//! A live, address-keyed parameter registry for show control: typed and
//! scaled parameters, beat-synced group controllers, scene presets on disk
//! and an OSC control surface.

pub mod app;
pub mod control;
pub mod fx;
pub mod groups;
pub mod osc;
pub mod params;
pub mod registry;
pub mod scenes;
pub mod settings;
pub mod telemetry;

pub use app::FxApp;
pub use control::{ControlCommand, ControlContext, ControlMessage, OutboundQueue};
pub use fx::{register_component, FxComponent, FxScope};
pub use groups::{BpmClock, GroupController, GroupManager, GroupPreset};
pub use params::{Affector, Arg, Color, FxParameter, Parameter, ParameterValue, ScaledParameter, ValueKind};
pub use registry::{FxEvent, Registry, RegistryError};
pub use scenes::{PresetDocument, Scene, SceneStore, StoreError};
pub use settings::{FxSettings, OscNodeSettings, OscSettings};
