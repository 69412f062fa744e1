use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::document::{read_json, write_json, PresetDocument};
use super::tags::{Tag, TagCatalogue};
use super::StoreError;
use crate::fx::ENABLED_SUFFIX;
use crate::groups::{GroupManager, GroupPreset};
use crate::registry::{FxEvent, Registry};

pub const UNTITLED: &str = "Untitled";
pub const PARAMETER_LIST: &str = "ParameterList";

const DOCUMENT_EXTENSION: &str = "json";
const META_SUFFIX: &str = ".meta";

/// A scene in the catalogue. `original_name` is the name it was last saved
/// under and differs from `name` while a rename is pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Scene {
    pub name: String,
    pub original_name: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            tag_ids: Vec::new(),
        }
    }

    pub fn has_tag(&self, id: &str) -> bool {
        self.tag_ids.iter().any(|t| t == id)
    }

    fn add_tag(&mut self, id: &str) -> bool {
        if self.has_tag(id) {
            return false;
        }
        self.tag_ids.push(id.to_string());
        true
    }

    fn remove_tag(&mut self, id: &str) -> bool {
        let before = self.tag_ids.len();
        self.tag_ids.retain(|t| t != id);
        self.tag_ids.len() != before
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(UNTITLED)
    }
}

/// Scene catalogue backed by one JSON document per scene
#[derive(Debug)]
pub struct SceneStore {
    scenes_dir: PathBuf,
    tags_path: PathBuf,
    toggle_suffix: String,
    scenes: Vec<Scene>,
    current: Scene,
    tags: TagCatalogue,
}

impl SceneStore {
    pub fn new(scenes_dir: impl Into<PathBuf>, tags_path: impl Into<PathBuf>) -> Self {
        Self {
            scenes_dir: scenes_dir.into(),
            tags_path: tags_path.into(),
            toggle_suffix: ENABLED_SUFFIX.to_string(),
            scenes: Vec::new(),
            current: Scene::default(),
            tags: TagCatalogue::default(),
        }
    }

    /// Suffix of the boolean toggles switched off when a loaded scene omits them
    pub fn with_toggle_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.toggle_suffix = suffix.into();
        self
    }

    pub fn scenes_dir(&self) -> &Path {
        &self.scenes_dir
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn current_scene(&self) -> &Scene {
        &self.current
    }

    pub fn tags(&self) -> &TagCatalogue {
        &self.tags
    }

    pub fn scene_path(&self, name: &str) -> PathBuf {
        self.scenes_dir.join(format!("{}.{}", name, DOCUMENT_EXTENSION))
    }

    fn contains_scene(&self, name: &str) -> bool {
        self.scenes.iter().any(|s| s.name == name)
    }

    /// Whether saving the current scene as `name` would replace another
    /// scene's document
    fn would_overwrite(&self, name: &str) -> bool {
        name != self.current.original_name && self.scene_path(name).exists()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Catalogue
    // ═══════════════════════════════════════════════════════════════════════

    /// Reconcile the catalogue with the scenes directory: scenes whose
    /// document disappeared are dropped, new documents are added with the tag
    /// ids they were saved with.
    pub fn populate_scene_list(&mut self, registry: &mut Registry) {
        let entries = match fs::read_dir(&self.scenes_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Scenes folder not readable {}: {}", self.scenes_dir.display(), e);
                return;
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|name| name != PARAMETER_LIST)
            .collect();
        names.sort();

        self.scenes.retain(|scene| names.contains(&scene.name));
        for name in names {
            if self.contains_scene(&name) {
                continue;
            }
            let mut scene = Scene::new(name.as_str());
            match read_json::<PresetDocument>(&self.scene_path(&name)) {
                Ok(document) => scene.tag_ids = document.scene_tag_ids,
                Err(e) => tracing::warn!("Failed to read scene tags: {}", e),
            }
            self.scenes.push(scene);
        }

        tracing::debug!(count = self.scenes.len(), "scene list updated");
        registry.emit(FxEvent::SceneListUpdated(self.scenes.clone()));
    }

    /// Scenes carrying every one of `tag_ids`
    pub fn filter_scenes_by_tag(&self, tag_ids: &[String]) -> Vec<Scene> {
        self.scenes
            .iter()
            .filter(|scene| tag_ids.iter().all(|id| scene.has_tag(id)))
            .cloned()
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Scene lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Load a listed scene and make it current. Tag ids unknown to the tag
    /// catalogue are dropped.
    pub fn try_load_scene(
        &mut self,
        name: &str,
        registry: &mut Registry,
        groups: &mut GroupManager,
    ) -> Result<(), StoreError> {
        if !self.contains_scene(name) {
            return Err(StoreError::SceneNotFound(name.to_string()));
        }
        let document: PresetDocument = read_json(&self.scene_path(name))?;
        document.apply(registry, groups, &self.toggle_suffix);

        let (known, unknown): (Vec<String>, Vec<String>) = document
            .scene_tag_ids
            .into_iter()
            .partition(|id| self.tags.contains(id));
        if !unknown.is_empty() {
            tracing::warn!(scene = name, "unrecognized tags: {}", unknown.join(", "));
        }

        let mut scene = Scene::new(name);
        scene.tag_ids = known;
        self.sync_listed(&scene);
        self.current = scene;

        tracing::info!(scene = name, "loaded scene");
        registry.emit(FxEvent::SceneLoaded { name: name.to_string() });
        self.emit_current(registry);
        Ok(())
    }

    pub fn load_scene(&mut self, name: &str, registry: &mut Registry, groups: &mut GroupManager) -> bool {
        match self.try_load_scene(name, registry, groups) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to load scene: {}", e);
                false
            }
        }
    }

    /// Save the current scene. A pending rename deletes the document saved
    /// under the old name first; if that fails the rename is rolled back.
    pub fn try_save_current_scene(
        &mut self,
        registry: &mut Registry,
        groups: &GroupManager,
    ) -> Result<(), StoreError> {
        validate_name(&self.current.name)?;

        if self.current.name != self.current.original_name {
            let old_path = self.scene_path(&self.current.original_name);
            if old_path.exists() {
                if let Err(e) = remove_document(&old_path) {
                    self.current.name = self.current.original_name.clone();
                    registry.emit(FxEvent::CurrentSceneNameChanged {
                        name: self.current.name.clone(),
                    });
                    return Err(e);
                }
            } else {
                tracing::warn!("Old scene file does not exist: {}", old_path.display());
            }
            self.current.original_name = self.current.name.clone();
        }

        let document = PresetDocument::capture(registry, groups, &self.current.tag_ids, false);
        write_json(&self.scene_path(&self.current.name), &document)?;
        tracing::info!(scene = %self.current.name, "saved scene");
        self.populate_scene_list(registry);
        self.sync_listed(&self.current.clone());
        Ok(())
    }

    pub fn save_current_scene(&mut self, registry: &mut Registry, groups: &GroupManager) -> bool {
        match self.try_save_current_scene(registry, groups) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to save scene: {}", e);
                false
            }
        }
    }

    /// Save the current scene under a new name. Existing documents are never overwritten.
    pub fn save_current_scene_as(
        &mut self,
        name: &str,
        registry: &mut Registry,
        groups: &GroupManager,
    ) -> Result<(), StoreError> {
        validate_name(name)?;
        if self.scene_path(name).exists() {
            return Err(StoreError::SceneExists(name.to_string()));
        }

        self.current.name = name.to_string();
        self.current.original_name = name.to_string();
        let document = PresetDocument::capture(registry, groups, &self.current.tag_ids, false);
        write_json(&self.scene_path(name), &document)?;
        tracing::info!(scene = name, "saved scene as");

        self.populate_scene_list(registry);
        self.emit_current(registry);
        Ok(())
    }

    /// Rename the current scene. Takes effect on disk at the next save.
    pub fn rename_current_scene(&mut self, name: &str, registry: &mut Registry) -> Result<(), StoreError> {
        validate_name(name)?;
        if self.would_overwrite(name) {
            tracing::warn!(scene = name, "a saved scene already has this name and will be replaced on save");
        }
        if self.current.name != name {
            self.current.name = name.to_string();
            registry.emit(FxEvent::CurrentSceneNameChanged { name: name.to_string() });
        }
        Ok(())
    }

    /// Delete a scene document and its sidecar
    pub fn remove_scene(&mut self, name: &str, registry: &mut Registry) -> Result<(), StoreError> {
        validate_name(name)?;
        let path = self.scene_path(name);
        if !path.exists() {
            return Err(StoreError::SceneNotFound(name.to_string()));
        }
        remove_document(&path)?;
        tracing::info!(scene = name, "removed scene");
        self.populate_scene_list(registry);
        Ok(())
    }

    /// Reload the current scene from disk, discarding unsaved changes
    pub fn reset_current_scene(&mut self, registry: &mut Registry, groups: &mut GroupManager) -> bool {
        let name = self.current.name.clone();
        self.load_scene(&name, registry, groups)
    }

    /// Start a fresh scene: unpinned groups are dropped, pinned ones emptied
    /// and every parameter returns to its default. A named scene is saved
    /// immediately.
    pub fn create_new_scene(
        &mut self,
        name: Option<&str>,
        registry: &mut Registry,
        groups: &mut GroupManager,
    ) -> Result<(), StoreError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if let Some(name) = name {
            validate_name(name)?;
            if self.scene_path(name).exists() {
                tracing::warn!(scene = name, "replacing the saved scene with a new one");
            }
        }

        groups.on_new_scene(registry);
        registry.reset_all_to_default();
        self.current = Scene::new(name.unwrap_or(UNTITLED));
        tracing::info!(scene = %self.current.name, "new scene");

        if name.is_some() {
            self.try_save_current_scene(registry, groups)?;
        }
        self.emit_current(registry);
        Ok(())
    }

    /// Write every parameter, saveable or not, to the `ParameterList` document
    pub fn export_parameter_list(&self, registry: &Registry, groups: &GroupManager) -> Result<PathBuf, StoreError> {
        let path = self.scene_path(PARAMETER_LIST);
        let document = PresetDocument::capture(registry, groups, &[], true);
        write_json(&path, &document)?;
        tracing::info!(path = %path.display(), parameters = document.len(), "exported parameter list");
        Ok(path)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Tags
    // ═══════════════════════════════════════════════════════════════════════

    /// Read the tag catalogue. A missing file yields the default categories,
    /// an unreadable one is logged and replaced by them.
    pub fn load_tag_configurations(&mut self, registry: &mut Registry) {
        self.tags = TagCatalogue::load(&self.tags_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load tag configurations: {}", e);
            TagCatalogue::default()
        });
        registry.emit(FxEvent::TagConfigurationsUpdated(self.tags.configurations().to_vec()));
    }

    fn save_tag_configurations(&self, registry: &mut Registry) -> Result<(), StoreError> {
        self.tags.save(&self.tags_path)?;
        registry.emit(FxEvent::TagConfigurationsUpdated(self.tags.configurations().to_vec()));
        Ok(())
    }

    pub fn add_tag_to_configuration(
        &mut self,
        tag_type: &str,
        value: &str,
        registry: &mut Registry,
    ) -> Result<Tag, StoreError> {
        let tag = self.tags.add(tag_type, value)?;
        self.save_tag_configurations(registry)?;
        Ok(tag)
    }

    /// Delete a tag from the catalogue and from every scene that carries it
    pub fn remove_tag_from_configuration(&mut self, id: &str, registry: &mut Registry) -> Result<Tag, StoreError> {
        let tag = self.tags.remove(id)?;
        for scene in &mut self.scenes {
            scene.remove_tag(id);
        }
        if self.current.remove_tag(id) {
            self.emit_current(registry);
        }
        self.save_tag_configurations(registry)?;
        Ok(tag)
    }

    pub fn set_tag(&mut self, tag: &Tag, registry: &mut Registry) -> Result<(), StoreError> {
        self.tags.update(tag)?;
        self.save_tag_configurations(registry)
    }

    /// Returns `Ok(false)` when the scene already carries the tag
    pub fn add_tag_to_current_scene(&mut self, id: &str, registry: &mut Registry) -> Result<bool, StoreError> {
        if !self.tags.contains(id) {
            return Err(StoreError::TagNotFound(id.to_string()));
        }
        let added = self.current.add_tag(id);
        if added {
            self.sync_listed(&self.current.clone());
            self.emit_current(registry);
        }
        Ok(added)
    }

    pub fn remove_tag_from_current_scene(&mut self, id: &str, registry: &mut Registry) -> Result<bool, StoreError> {
        if !self.tags.contains(id) {
            return Err(StoreError::TagNotFound(id.to_string()));
        }
        let removed = self.current.remove_tag(id);
        if removed {
            self.sync_listed(&self.current.clone());
            self.emit_current(registry);
        }
        Ok(removed)
    }

    /// Clear every tag, or only the tags of one category
    pub fn remove_all_tags_from_current_scene(&mut self, tag_type: Option<&str>, registry: &mut Registry) {
        match tag_type {
            None => self.current.tag_ids.clear(),
            Some(tag_type) => {
                let ids = self.tags.ids_of_type(tag_type);
                self.current.tag_ids.retain(|id| !ids.contains(id));
            }
        }
        self.sync_listed(&self.current.clone());
        self.emit_current(registry);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Default groups
    // ═══════════════════════════════════════════════════════════════════════

    /// Create the groups listed in the default groups file, if it exists
    pub fn load_default_groups(path: &Path, registry: &mut Registry, groups: &mut GroupManager) -> Result<usize, StoreError> {
        let presets: Vec<GroupPreset> = match read_json(path) {
            Ok(presets) => presets,
            Err(StoreError::DocumentNotFound(_)) => return Ok(0),
            Err(e) => return Err(e),
        };
        let created = presets
            .iter()
            .filter(|preset| groups.create_group(Some(preset), registry).is_some())
            .count();
        tracing::info!(created, "loaded default groups");
        Ok(created)
    }

    fn sync_listed(&mut self, scene: &Scene) {
        if let Some(listed) = self.scenes.iter_mut().find(|s| s.name == scene.name) {
            listed.tag_ids = scene.tag_ids.clone();
        }
    }

    fn emit_current(&self, registry: &mut Registry) {
        registry.emit(FxEvent::CurrentSceneChanged(self.current.clone()));
        registry.emit(FxEvent::CurrentSceneNameChanged {
            name: self.current.name.clone(),
        });
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed.contains("..") {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Delete a document and its `.meta` sidecar, if present
fn remove_document(path: &Path) -> Result<(), StoreError> {
    let delete_failure = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| StoreError::DocumentDeleteFailure { path, source }
    };
    fs::remove_file(path).map_err(delete_failure(path))?;

    let mut meta = path.as_os_str().to_owned();
    meta.push(META_SUFFIX);
    let meta = PathBuf::from(meta);
    if meta.exists() {
        fs::remove_file(&meta).map_err(delete_failure(&meta))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Arg, Parameter};
    use crate::scenes::tags::SCENE_LABEL;

    fn setup(dir: &Path) -> (SceneStore, Registry, GroupManager) {
        let mut registry = Registry::new();
        registry.register_parameter(Parameter::float("/Fx/level", 0.0)).unwrap();
        registry.register_parameter(Parameter::bool("/Fx/fxEnabled", false)).unwrap();
        let store = SceneStore::new(dir.join("FX Scenes"), dir.join("TagConfigurations.json"));
        (store, registry, GroupManager::new())
    }

    #[test]
    fn test_scene_serializes_pascal_case() {
        let json = serde_json::to_value(Scene::new("Intro")).unwrap();
        assert_eq!(json["Name"], "Intro");
        assert_eq!(json["OriginalName"], "Intro");
        assert!(json["TagIds"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Intro").is_ok());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("../etc").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
    }

    #[test]
    fn test_save_as_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, groups) = setup(dir.path());
        store.save_current_scene_as("Intro", &mut registry, &groups).unwrap();
        assert!(matches!(
            store.save_current_scene_as("Intro", &mut registry, &groups),
            Err(StoreError::SceneExists(_))
        ));
        assert_eq!(store.scenes().len(), 1);
    }

    #[test]
    fn test_rename_deletes_old_document_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, groups) = setup(dir.path());
        store.save_current_scene_as("Intro", &mut registry, &groups).unwrap();
        let sidecar = dir.path().join("FX Scenes").join("Intro.json.meta");
        fs::write(&sidecar, "meta").unwrap();

        store.rename_current_scene("Verse", &mut registry).unwrap();
        assert!(store.save_current_scene(&mut registry, &groups));
        assert!(!store.scene_path("Intro").exists());
        assert!(!sidecar.exists());
        assert!(store.scene_path("Verse").exists());
        assert_eq!(store.current_scene().original_name, "Verse");
        let names: Vec<_> = store.scenes().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Verse"]);
    }

    #[test]
    fn test_rename_rolls_back_when_old_document_cannot_be_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, groups) = setup(dir.path());
        store.save_current_scene_as("Intro", &mut registry, &groups).unwrap();
        // A non-empty directory in place of the document cannot be removed as a file
        let old = store.scene_path("Intro");
        fs::remove_file(&old).unwrap();
        fs::create_dir(&old).unwrap();
        fs::write(old.join("keep"), "x").unwrap();

        store.rename_current_scene("Verse", &mut registry).unwrap();
        let (_, events) = registry.events().channel();
        let result = store.try_save_current_scene(&mut registry, &groups);

        assert!(matches!(result, Err(StoreError::DocumentDeleteFailure { .. })));
        assert_eq!(store.current_scene().name, "Intro");
        assert_eq!(store.current_scene().original_name, "Intro");
        assert_eq!(
            events.try_recv().unwrap(),
            FxEvent::CurrentSceneNameChanged { name: "Intro".into() }
        );
        assert!(!store.scene_path("Verse").exists());
    }

    #[test]
    fn test_non_finite_value_does_not_spoil_saved_scene() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, mut groups) = setup(dir.path());
        registry.register_parameter(Parameter::float("/Fx/other", 0.0)).unwrap();

        assert!(!registry.set("/Fx/level", &[Arg::Float(f32::INFINITY)]));
        assert!(!registry.set("/Fx/level", &[Arg::Float(f32::NAN)]));
        assert_eq!(registry.get_f32("/Fx/level"), Some(0.0));
        registry.set("/Fx/other", &[Arg::Float(0.7)]);
        store.save_current_scene_as("Safe", &mut registry, &groups).unwrap();

        registry.set("/Fx/other", &[Arg::Float(0.1)]);
        assert!(store.load_scene("Safe", &mut registry, &mut groups));
        assert_eq!(registry.get_f32("/Fx/other"), Some(0.7));
    }

    #[test]
    fn test_existing_scene_name_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, groups) = setup(dir.path());
        store.save_current_scene_as("Intro", &mut registry, &groups).unwrap();
        store.save_current_scene_as("Verse", &mut registry, &groups).unwrap();
        assert!(store.would_overwrite("Intro"));
        assert!(!store.would_overwrite("Verse"));
        assert!(!store.would_overwrite("Chorus"));
    }

    #[test]
    fn test_load_unknown_scene_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, mut groups) = setup(dir.path());
        assert!(!store.load_scene("Missing", &mut registry, &mut groups));
    }

    #[test]
    fn test_new_scene_resets_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, mut groups) = setup(dir.path());
        registry.set("/Fx/level", &[Arg::Float(0.8)]);
        store.create_new_scene(None, &mut registry, &mut groups).unwrap();
        assert_eq!(registry.get_f32("/Fx/level"), Some(0.0));
        assert_eq!(store.current_scene().name, UNTITLED);
        assert!(!store.scene_path(UNTITLED).exists());

        store.create_new_scene(Some("Named"), &mut registry, &mut groups).unwrap();
        assert!(store.scene_path("Named").exists());
    }

    #[test]
    fn test_scene_tags() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, groups) = setup(dir.path());
        store.load_tag_configurations(&mut registry);
        let tag = store.add_tag_to_configuration(SCENE_LABEL, "Warm", &mut registry).unwrap();
        assert!(dir.path().join("TagConfigurations.json").exists());

        assert!(store.add_tag_to_current_scene(&tag.id, &mut registry).unwrap());
        assert!(!store.add_tag_to_current_scene(&tag.id, &mut registry).unwrap());
        assert!(store.add_tag_to_current_scene("nope", &mut registry).is_err());
        store.save_current_scene_as("Tagged", &mut registry, &groups).unwrap();
        assert_eq!(store.filter_scenes_by_tag(&[tag.id.clone()]).len(), 1);

        store.remove_tag_from_configuration(&tag.id, &mut registry).unwrap();
        assert!(store.current_scene().tag_ids.is_empty());
        assert!(store.filter_scenes_by_tag(&[tag.id]).is_empty());
    }

    #[test]
    fn test_remove_all_tags_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, _) = setup(dir.path());
        let label = store.add_tag_to_configuration(SCENE_LABEL, "Warm", &mut registry).unwrap();
        let bucket = store
            .add_tag_to_configuration(crate::scenes::tags::SCENE_BUCKET, "Intro", &mut registry)
            .unwrap();
        store.add_tag_to_current_scene(&label.id, &mut registry).unwrap();
        store.add_tag_to_current_scene(&bucket.id, &mut registry).unwrap();
        store.remove_all_tags_from_current_scene(Some(SCENE_LABEL), &mut registry);
        assert_eq!(store.current_scene().tag_ids, vec![bucket.id]);
        store.remove_all_tags_from_current_scene(None, &mut registry);
        assert!(store.current_scene().tag_ids.is_empty());
    }

    #[test]
    fn test_export_parameter_list_is_not_a_scene() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, mut registry, groups) = setup(dir.path());
        let path = store.export_parameter_list(&registry, &groups).unwrap();
        assert!(path.ends_with("ParameterList.json"));
        store.populate_scene_list(&mut registry);
        assert!(store.scenes().is_empty());
    }
}
