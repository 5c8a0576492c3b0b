//! Compiler Configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::element::DEFAULT_LAYER;
use crate::error::SceneError;
use crate::scene::Metadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    #[serde(default = "default_generator")]
    pub generator: String,
    #[serde(default = "default_format_version")]
    pub format_version: f64,
    #[serde(default = "default_format_type")]
    pub format_type: String,
    #[serde(default = "default_layer")]
    pub default_layer: String,
    #[serde(default = "default_true")]
    pub pretty: bool,
    #[serde(default = "default_true")]
    pub emit_cameras: bool,
}

fn default_generator() -> String { "SceneForgeExporter".to_string() }
fn default_format_version() -> f64 { 4.3 }
fn default_format_type() -> String { "Object".to_string() }
fn default_layer() -> String { DEFAULT_LAYER.to_string() }
fn default_true() -> bool { true }

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            format_version: default_format_version(),
            format_type: default_format_type(),
            default_layer: default_layer(),
            pretty: true,
            emit_cameras: true,
        }
    }
}

impl CompilerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            version: self.format_version,
            kind: self.format_type.clone(),
            generator: self.generator.clone(),
        }
    }
}
