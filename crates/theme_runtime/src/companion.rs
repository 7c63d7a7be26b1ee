// Companion Registry - where generated companions make themselves known
//
// Generated code registers one entry per companion under its flattened
// path. The resolver derives the same path from a type's qualified name and
// looks it up here; nothing is loaded by name at runtime.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use crate::{BindingError, ErasedTarget, ThemeContext, Themed};

// ─────────────────────────────────────────────────────────────────────────────
// Unbinder
// ─────────────────────────────────────────────────────────────────────────────

/// A live companion, as held by the binder
pub trait Unbinder: Send + Sync {
    /// Stop listening and reset the target's bound fields.
    ///
    /// Fails with [`BindingError::AlreadyCleared`] once [`Unbinder::clear`]
    /// has run.
    fn unbind(&self) -> Result<(), BindingError>;

    /// Drop the reference to the target
    fn clear(&self);

    fn companion_name(&self) -> &'static str;
}

/// Companion constructor: target handle of the companion's exact target type
/// plus the theme context
pub type ConstructFn =
    fn(ErasedTarget, &ThemeContext) -> Result<Arc<dyn Unbinder>, BindingError>;

// ─────────────────────────────────────────────────────────────────────────────
// Companion Entry
// ─────────────────────────────────────────────────────────────────────────────

/// Registration record of one generated companion
pub struct CompanionEntry {
    path: String,
    name: &'static str,
    target_type: TypeId,
    target_name: &'static str,
    construct: ConstructFn,
}

impl fmt::Debug for CompanionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanionEntry")
            .field("path", &self.path)
            .field("target", &self.target_name)
            .finish()
    }
}

impl CompanionEntry {
    /// Entry for a companion that binds targets of type `T`
    pub fn new<T: Themed>(path: impl Into<String>, name: &'static str, construct: ConstructFn) -> Self {
        Self {
            path: path.into(),
            name,
            target_type: TypeId::of::<T>(),
            target_name: type_name::<T>(),
            construct,
        }
    }

    /// Flattened path, e.g. `app::ui::WidgetThemeBinding`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Simple companion name, e.g. `WidgetThemeBinding`
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn target_type(&self) -> TypeId {
        self.target_type
    }

    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    /// Instantiate the companion for a target of exactly its target type
    pub fn construct(
        &self,
        target: ErasedTarget,
        context: &ThemeContext,
    ) -> Result<Arc<dyn Unbinder>, BindingError> {
        (self.construct)(target, context)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Companion Registry
// ─────────────────────────────────────────────────────────────────────────────

/// All companions known to the process, by flattened path
pub struct CompanionRegistry {
    entries: DashMap<String, Arc<CompanionEntry>>,
}

impl Default for CompanionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanionRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a companion. A second companion under the same path replaces
    /// the first; resolving the first one's target then fails with
    /// [`BindingError::SignatureMismatch`].
    pub fn register(&self, entry: CompanionEntry) {
        let path = entry.path.clone();
        let (target_type, target_name) = (entry.target_type, entry.target_name);
        if let Some(previous) = self.entries.insert(path.clone(), Arc::new(entry)) {
            if previous.target_type != target_type {
                warn!(
                    "Companion {} re-registered: {} replaces {}",
                    path, target_name, previous.target_name
                );
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<Arc<CompanionEntry>> {
        self.entries.get(path).map(|e| Arc::clone(e.value()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
