// Companion emission
//
// Writes one source file per qualifying declaring type under
// `<out>/<package dirs>/<companion file stem>.rs`. A failure for one type is
// logged and recorded; the rest of the pass continues.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use theme_types::naming;
use tracing::{debug, error, info, warn};

use crate::model::{DeclaringType, ModelError};
use crate::synth::Synthesizer;

/// Error writing a single companion
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("Failed to synthesize companion: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A companion that was written
#[derive(Debug, Clone)]
pub struct EmittedCompanion {
    /// Qualified name of the declaring type
    pub declaring_type: String,
    /// Flattened companion path
    pub companion: String,
    pub path: PathBuf,
}

/// Outcome of an emission pass
#[derive(Debug, Default)]
pub struct EmitReport {
    pub written: Vec<EmittedCompanion>,
    /// Declaring types whose companion could not be written
    pub failed: Vec<(String, EmitError)>,
    /// Companion paths claimed by more than one declaring type
    pub collisions: Vec<String>,
}

impl EmitReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes companions for declaration models to an output directory
pub struct Emitter {
    out_dir: PathBuf,
    synthesizer: Synthesizer,
    dry_run: bool,
}

impl Emitter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            synthesizer: Synthesizer::new(),
            dry_run: false,
        }
    }

    /// Plan file paths without touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Where the companion of `ty` is written
    pub fn companion_file(&self, ty: &DeclaringType) -> PathBuf {
        let mut path = self.out_dir.clone();
        for segment in ty.package.split(naming::MODULE_SEPARATOR) {
            if !segment.is_empty() {
                path.push(segment);
            }
        }
        path.push(format!("{}.rs", naming::companion_file_stem(&ty.name)));
        path
    }

    /// Emit companions for every qualifying type in `types`, nested ones included
    pub fn emit_all(&self, types: &[DeclaringType]) -> EmitReport {
        let mut report = EmitReport::default();
        let mut claimed: HashMap<String, String> = HashMap::new();

        for ty in types.iter().flat_map(|t| t.qualifying()) {
            let declaring = ty.qualified_name();
            let companion = ty.companion_path();

            if let Some(previous) = claimed.insert(companion.clone(), declaring.clone()) {
                warn!(
                    "Companion {} is claimed by both {} and {}; the later one wins",
                    companion, previous, declaring
                );
                report.collisions.push(companion.clone());
            }

            match self.emit(ty) {
                Ok(path) => {
                    debug!("Wrote {} for {}", path.display(), declaring);
                    report.written.push(EmittedCompanion {
                        declaring_type: declaring,
                        companion,
                        path,
                    });
                }
                Err(e) => {
                    error!("Failed to emit companion for {}: {}", declaring, e);
                    report.failed.push((declaring, e));
                }
            }
        }

        info!(
            "Emitted {} companions ({} failed)",
            report.written.len(),
            report.failed.len()
        );
        report
    }

    /// Emit the companion of a single type
    pub fn emit(&self, ty: &DeclaringType) -> Result<PathBuf, EmitError> {
        let path = self.companion_file(ty);
        let Some(source) = self.synthesizer.render(ty)? else {
            return Ok(path);
        };
        if self.dry_run {
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| EmitError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, source).map_err(|source| EmitError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
