use crate::error::AdjacencyError;
use crate::extract::{Contiguity, ExtractOptions};
use crate::links::ManualLink;
use crate::region::LoadOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AdjacencyConfig {
    pub contiguity: Contiguity,
    // Same units as the input coordinates, degrees for WGS84 ZIP boundaries
    pub snap: f64,
    pub manual_links: Vec<ManualLink>,
    /// Turn isolated regions into a hard error instead of a warning.
    pub reject_isolated: bool,
    pub load: LoadOptions,
}

impl Default for AdjacencyConfig {
    fn default() -> Self {
        Self {
            contiguity: Contiguity::Queen,
            snap: 0.0,
            manual_links: Vec::new(),
            reject_isolated: false,
            load: LoadOptions::default(),
        }
    }
}

impl AdjacencyConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, AdjacencyError> {
        Ok(ron::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AdjacencyError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AdjacencyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&raw)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            contiguity: self.contiguity,
            snap: self.snap,
        }
    }
}
