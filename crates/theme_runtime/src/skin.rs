// Skins - named resource tables and the active-skin switch
//
// A skin maps resource ids to colors and drawables. `SkinManager` is the
// in-process `ResourceLookup`: companions read the active skin, and
// activating another skin notifies the broadcaster so they re-apply.
//
// Skin file format (TOML):
//
// ```toml
// name = "night"
//
// [colors]
// 100 = "#FF202020"
//
// [drawables]
// 200 = { type = "solid", color = "#FF000000" }
// 201 = { type = "image", path = "icons/moon.png" }
// ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use theme_types::{Color, Drawable, ResourceId};
use tracing::{debug, info, warn};

use crate::{ResourceLookup, ThemeBroadcaster, ThemeChanged, ThemeContext};

/// Errors loading or switching skins
#[derive(Debug, thiserror::Error)]
pub enum SkinError {
    #[error("Failed to read skin {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid skin file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("Unknown skin: {0}")]
    UnknownSkin(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Skin
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk form; resource ids are table keys and arrive as strings
#[derive(Deserialize)]
struct SkinFile {
    name: String,
    #[serde(default)]
    colors: BTreeMap<String, Color>,
    #[serde(default)]
    drawables: BTreeMap<String, Drawable>,
}

fn resource_id(key: &str) -> Result<ResourceId, SkinError> {
    key.trim()
        .parse()
        .map_err(|_| SkinError::InvalidResourceId(key.to_string()))
}

/// A named set of resource values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    name: String,
    colors: HashMap<ResourceId, Color>,
    drawables: HashMap<ResourceId, Drawable>,
}

impl Skin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, id: ResourceId, color: Color) -> Self {
        self.colors.insert(id, color);
        self
    }

    pub fn with_drawable(mut self, id: ResourceId, drawable: Drawable) -> Self {
        self.drawables.insert(id, drawable);
        self
    }

    pub fn from_toml(src: &str) -> Result<Self, SkinError> {
        let file: SkinFile = toml::from_str(src)?;
        let mut skin = Skin::new(file.name);
        for (key, color) in file.colors {
            skin.colors.insert(resource_id(&key)?, color);
        }
        for (key, drawable) in file.drawables {
            skin.drawables.insert(resource_id(&key)?, drawable);
        }
        Ok(skin)
    }

    pub fn load(path: &Path) -> Result<Self, SkinError> {
        let src = std::fs::read_to_string(path).map_err(|source| SkinError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&src)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self, id: ResourceId) -> Option<Color> {
        self.colors.get(&id).copied()
    }

    pub fn drawable(&self, id: ResourceId) -> Option<&Drawable> {
        self.drawables.get(&id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Skin Manager
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SkinState {
    skins: HashMap<String, Arc<Skin>>,
    active: Option<Arc<Skin>>,
}

/// Holds the known skins and serves lookups from the active one
///
/// Unknown resource ids resolve to [`Color::TRANSPARENT`] and
/// [`Drawable::Empty`].
pub struct SkinManager {
    state: RwLock<SkinState>,
    broadcaster: Arc<ThemeBroadcaster>,
}

impl SkinManager {
    pub fn new(broadcaster: Arc<ThemeBroadcaster>) -> Self {
        Self {
            state: RwLock::new(SkinState::default()),
            broadcaster,
        }
    }

    /// Context whose lookups go through this manager
    pub fn context(self: &Arc<Self>) -> ThemeContext {
        ThemeContext::new(
            Arc::clone(self) as Arc<dyn ResourceLookup>,
            Arc::clone(&self.broadcaster),
        )
    }

    pub fn broadcaster(&self) -> &Arc<ThemeBroadcaster> {
        &self.broadcaster
    }

    /// Add or replace a skin. The first skin added becomes active.
    ///
    /// Replacing the active skin takes effect on the next [`activate`](Self::activate).
    pub fn add_skin(&self, skin: Skin) {
        let skin = Arc::new(skin);
        let mut state = self.state.write();
        if state.active.is_none() {
            debug!("Skin {} is now active", skin.name());
            state.active = Some(Arc::clone(&skin));
        }
        state.skins.insert(skin.name().to_string(), skin);
    }

    /// Load a skin file and add it. Returns the skin's name.
    pub fn load_skin(&self, path: &Path) -> Result<String, SkinError> {
        let skin = Skin::load(path)?;
        let name = skin.name().to_string();
        debug!("Loaded skin {} from {}", name, path.display());
        self.add_skin(skin);
        Ok(name)
    }

    /// Load every `*.toml` file in `dir`. Unreadable or invalid files are
    /// skipped with a warning. Returns the names of the loaded skins.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<String>, SkinError> {
        let mut loaded = Vec::new();

        if !dir.exists() {
            debug!("Skin directory does not exist: {}", dir.display());
            return Ok(loaded);
        }

        let io_err = |source| SkinError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match self.load_skin(&path) {
                Ok(name) => loaded.push(name),
                Err(e) => warn!("Skipping skin {}: {}", path.display(), e),
            }
        }

        Ok(loaded)
    }

    /// Names of all known skins, sorted
    pub fn skin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().skins.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn active_skin(&self) -> Option<String> {
        self.state
            .read()
            .active
            .as_ref()
            .map(|skin| skin.name().to_string())
    }

    /// Switch to the named skin and tell every listener to re-apply.
    ///
    /// Returns the number of listeners notified.
    pub fn activate(&self, name: &str) -> Result<usize, SkinError> {
        {
            let mut state = self.state.write();
            let skin = state
                .skins
                .get(name)
                .cloned()
                .ok_or_else(|| SkinError::UnknownSkin(name.to_string()))?;
            state.active = Some(skin);
        }

        info!("Activated skin {}", name);
        Ok(self.broadcaster.notify(ThemeChanged {
            skin: name.to_string(),
        }))
    }

    fn active(&self) -> Option<Arc<Skin>> {
        self.state.read().active.clone()
    }
}

impl ResourceLookup for SkinManager {
    fn get_color(&self, id: ResourceId) -> Color {
        let Some(skin) = self.active() else {
            warn!("No active skin; color {} is transparent", id);
            return Color::TRANSPARENT;
        };
        skin.color(id).unwrap_or_else(|| {
            warn!("Skin {} has no color {}", skin.name(), id);
            Color::TRANSPARENT
        })
    }

    fn get_drawable(&self, id: ResourceId) -> Drawable {
        let Some(skin) = self.active() else {
            warn!("No active skin; drawable {} is empty", id);
            return Drawable::Empty;
        };
        skin.drawable(id).cloned().unwrap_or_else(|| {
            warn!("Skin {} has no drawable {}", skin.name(), id);
            Drawable::Empty
        })
    }
}
