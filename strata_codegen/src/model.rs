use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use strata_props::PropertyMap;

/// A level: a root node with one child per layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    pub name: String,
    pub logical_id: String,
    pub layers: Vec<Layer>,
}

/// Sibling grouping inside a level. Names and references resolve per layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layer {
    pub name: String,
    pub instances: Vec<LevelInstance>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelInstance {
    pub logical_id: String,
    /// Display name; empty means "use the type name".
    pub name: String,
    pub type_name: String,
    pub properties: PropertyMap,
    /// Catalog names of the assets this instance pulls in (models, scripts).
    pub references: Vec<String>,
}

impl LevelInstance {
    pub fn new(logical_id: impl Into<String>, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

/// One asset type rendered as its own scene, with optional script and child models.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetDefinition {
    pub name: String,
    pub type_name: String,
    pub properties: PropertyMap,
    pub script: Option<PathBuf>,
    /// Catalog names of models instanced as children of the asset root.
    pub models: Vec<String>,
}

/// Asset name -> authoring path. Lookups ignore ASCII case.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetCatalog {
    entries: IndexMap<String, PathBuf>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.insert(name, path);
        self
    }

    pub fn insert(&mut self, name: &str, path: impl Into<PathBuf>) {
        self.entries.insert(name.to_ascii_lowercase(), path.into());
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
