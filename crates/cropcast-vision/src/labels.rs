//! Class label table persisted next to the classifier weights.

use std::path::Path;

use cropcast_common::{CropcastError, Result};
use serde::{Deserialize, Serialize};

/// Ordered class names; position `i` names the model's output class `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabelTable {
    names: Vec<String>,
}

impl ClassLabelTable {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(CropcastError::ModelLoad(
                "class label table is empty".to_string(),
            ));
        }
        Ok(Self { names })
    }

    /// Load a JSON array of strings from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CropcastError::ModelLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let names: Vec<String> = serde_json::from_str(content)
            .map_err(|e| CropcastError::ModelLoad(format!("invalid class label table: {}", e)))?;
        Self::new(names)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string(&self.names).map_err(|e| {
            CropcastError::ModelLoad(format!("failed to serialize class label table: {}", e))
        })?;
        std::fs::write(path, content).map_err(|e| {
            CropcastError::ModelLoad(format!("failed to write {}: {}", path.display(), e))
        })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fail unless this table names exactly `num_classes` outputs.
    pub fn ensure_matches(&self, num_classes: usize) -> Result<()> {
        if self.len() != num_classes {
            return Err(CropcastError::ModelLoad(format!(
                "class label table has {} entries but the model produces {} classes",
                self.len(),
                num_classes
            )));
        }
        Ok(())
    }
}
