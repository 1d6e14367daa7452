//! Catalogue of the building models that can be selected.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid model index: {index} (there are {len} models)")]
    InvalidIndex { index: usize, len: usize },
}

/// One selectable model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: String,
    /// Display name for pickers.
    pub name: String,
    /// glTF file relative to the asset root.
    pub path: String,
    pub description: String,
}

impl ModelEntry {
    pub fn new(id: &str, name: &str, path: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            path: path.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    default_index: usize,
}

impl ModelRegistry {
    /// `default_index` is clamped into the list; an empty registry keeps 0.
    pub fn new(entries: Vec<ModelEntry>, default_index: usize) -> Self {
        let default_index = default_index.min(entries.len().saturating_sub(1));
        Self {
            entries,
            default_index,
        }
    }

    pub fn get(&self, index: usize) -> Result<&ModelEntry, RegistryError> {
        self.entries.get(index).ok_or(RegistryError::InvalidIndex {
            index,
            len: self.entries.len(),
        })
    }

    pub fn find(&self, id: &str) -> Option<(usize, &ModelEntry)> {
        self.entries.iter().enumerate().find(|(_, e)| e.id == id)
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn default_index(&self) -> usize {
        self.default_index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ModelRegistry {
    /// The three stock models, starting with the complex one.
    fn default() -> Self {
        Self::new(
            vec![
                ModelEntry::new(
                    "model1",
                    "Model 1 (Basic)",
                    "assets_1/model_01_sub_0.gltf",
                    "Basic experimental model with various materials",
                ),
                ModelEntry::new(
                    "model2",
                    "Model 2 (Medium)",
                    "assets_2/model_02_sub_0.gltf",
                    "Medium complexity model with detailed textures",
                ),
                ModelEntry::new(
                    "model3",
                    "Model 3 (Complex)",
                    "assets_3/model_03_sub_0.gltf",
                    "Complex model with high-detail textures and geometry",
                ),
            ],
            2,
        )
    }
}
