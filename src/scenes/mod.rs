//! Scene persistence
//!
//! Each scene is a [`PresetDocument`] stored as `<scenes_dir>/<name>.json`.
//! [`SceneStore`] keeps the catalogue in step with the directory, tracks the
//! current scene and owns the tag catalogue used to label scenes.

mod document;
mod error;
mod store;
mod tags;

pub use document::{read_json, write_json, EnumEntry, PresetDocument, PresetEntry, ScaledSettings};
pub use error::StoreError;
pub use store::{Scene, SceneStore, PARAMETER_LIST, UNTITLED};
pub use tags::{Tag, TagCatalogue, TagConfiguration, SCENE_BUCKET, SCENE_LABEL};
