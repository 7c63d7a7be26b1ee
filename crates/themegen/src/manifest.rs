//! Generation manifest
//!
//! Lists the declaring types to generate companions for. TOML or JSON,
//! chosen by file extension:
//!
//! ```toml
//! output = "generated"
//!
//! [[types]]
//! package = "app::ui"
//! name = "Widget"
//! fields = [
//!     { name = "tint", type = "Option<Color>", annotations = [{ bind_color = 100 }] },
//!     { name = "icon", type = "Reactive<Drawable>", annotations = [{ bind_drawable = 200 }] },
//! ]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use theme_codegen::{DeclaringType, ModelError, TypeDescription};
use tracing::{debug, info};

/// Output directory used when neither the manifest nor the command line sets one
pub const DEFAULT_OUTPUT: &str = "generated";

/// Error type for manifest loading
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported manifest format (expected .toml or .json): {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Invalid declaring type {name}: {source}")]
    Model {
        name: String,
        #[source]
        source: ModelError,
    },
}

/// Declaring types plus where their companions go
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Output directory, relative to the manifest
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub types: Vec<TypeDescription>,
}

impl Manifest {
    pub fn from_toml_str(src: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(src)?)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Load a manifest, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let manifest = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => return Err(ManifestError::UnsupportedFormat(path.to_path_buf())),
        };

        info!("Loaded manifest {} ({} types)", path.display(), manifest.types.len());
        Ok(manifest)
    }

    /// Output directory for a manifest loaded from `manifest_path`
    pub fn output_dir(&self, manifest_path: &Path) -> PathBuf {
        let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        base.join(self.output.as_deref().unwrap_or_else(|| Path::new(DEFAULT_OUTPUT)))
    }

    /// Declaration models of every listed type
    pub fn models(&self) -> Result<Vec<DeclaringType>, ManifestError> {
        self.types
            .iter()
            .map(|desc| {
                let model = DeclaringType::build(desc).map_err(|source| ManifestError::Model {
                    name: desc.name.clone(),
                    source,
                })?;
                debug!(
                    "{}: {} bound fields, {} nested types with bindings",
                    model.qualified_name(),
                    model.fields.len(),
                    model.nested.len()
                );
                Ok(model)
            })
            .collect()
    }
}
