//! themegen - Writes theme binding companions for a manifest of declaring types
//!
//! The generated files are meant to be `include!`d in the module that
//! declares each type, next to a `#[derive(Themed)]` on the type itself.

pub mod manifest;

use std::path::Path;

use theme_codegen::{EmitReport, Emitter};
use tracing::info;

pub use manifest::{Manifest, ManifestError, DEFAULT_OUTPUT};

/// Generate companions for every type in the manifest at `manifest_path`.
///
/// `out` overrides the manifest's output directory. Per-type write failures
/// are reported in the returned [`EmitReport`], not as an error.
pub fn generate(
    manifest_path: &Path,
    out: Option<&Path>,
    dry_run: bool,
) -> Result<EmitReport, ManifestError> {
    let manifest = Manifest::load(manifest_path)?;
    let models = manifest.models()?;

    let out_dir = match out {
        Some(out) => out.to_path_buf(),
        None => manifest.output_dir(manifest_path),
    };
    info!(
        "Generating companions into {}{}",
        out_dir.display(),
        if dry_run { " (dry run)" } else { "" }
    );

    Ok(Emitter::new(out_dir).dry_run(dry_run).emit_all(&models))
}
