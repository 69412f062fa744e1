use serde::{Deserialize, Serialize};
use std::path::Path;

use super::document::{read_json, write_json};
use super::StoreError;

pub const SCENE_BUCKET: &str = "scene-bucket";
pub const SCENE_LABEL: &str = "scene-label";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub value: String,
}

/// A tag category and its tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfiguration {
    #[serde(rename = "type")]
    pub tag_type: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl TagConfiguration {
    pub fn new(tag_type: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            tags: Vec::new(),
        }
    }
}

/// Every tag category known to the scene store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCatalogue {
    configurations: Vec<TagConfiguration>,
}

impl Default for TagCatalogue {
    fn default() -> Self {
        Self {
            configurations: vec![TagConfiguration::new(SCENE_BUCKET), TagConfiguration::new(SCENE_LABEL)],
        }
    }
}

impl TagCatalogue {
    pub fn new(configurations: Vec<TagConfiguration>) -> Self {
        Self { configurations }
    }

    /// Read the catalogue, falling back to the two empty default categories
    /// when the file does not exist
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match read_json(path) {
            Ok(configurations) => Ok(Self::new(configurations)),
            Err(StoreError::DocumentNotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        write_json(path, &self.configurations)
    }

    pub fn configurations(&self) -> &[TagConfiguration] {
        &self.configurations
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn find(&self, id: &str) -> Option<&Tag> {
        self.configurations.iter().flat_map(|c| c.tags.iter()).find(|t| t.id == id)
    }

    /// Ids of every tag in one category
    pub fn ids_of_type(&self, tag_type: &str) -> Vec<String> {
        self.configurations
            .iter()
            .filter(|c| c.tag_type == tag_type)
            .flat_map(|c| c.tags.iter().map(|t| t.id.clone()))
            .collect()
    }

    /// Add a tag with a fresh id. Values are unique within a category.
    pub fn add(&mut self, tag_type: &str, value: &str) -> Result<Tag, StoreError> {
        let configuration = self
            .configurations
            .iter_mut()
            .find(|c| c.tag_type == tag_type)
            .ok_or_else(|| StoreError::UnknownTagType(tag_type.to_string()))?;
        if configuration.tags.iter().any(|t| t.value == value) {
            return Err(StoreError::DuplicateTag {
                tag_type: tag_type.to_string(),
                value: value.to_string(),
            });
        }

        let tag = Tag {
            id: uuid::Uuid::new_v4().to_string(),
            value: value.to_string(),
        };
        configuration.tags.push(tag.clone());
        Ok(tag)
    }

    pub fn remove(&mut self, id: &str) -> Result<Tag, StoreError> {
        for configuration in &mut self.configurations {
            if let Some(index) = configuration.tags.iter().position(|t| t.id == id) {
                return Ok(configuration.tags.remove(index));
            }
        }
        Err(StoreError::TagNotFound(id.to_string()))
    }

    /// Change the value of an existing tag
    pub fn update(&mut self, tag: &Tag) -> Result<(), StoreError> {
        let existing = self
            .configurations
            .iter_mut()
            .flat_map(|c| c.tags.iter_mut())
            .find(|t| t.id == tag.id)
            .ok_or_else(|| StoreError::TagNotFound(tag.id.clone()))?;
        existing.value = tag.value.clone();
        Ok(())
    }
}
