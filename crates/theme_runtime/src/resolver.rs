// Type Resolver - finds the companion for a type or its nearest ancestor
//
// Resolution is memoized per type in a `BindingTable`, absence included, so
// each distinct type walks its ancestor chain at most once per resolver.

use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use theme_types::naming;
use tracing::debug;

use crate::{BindingError, CompanionEntry, CompanionRegistry, Themed, TypeInfo};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Qualified-name prefixes of framework types that never carry companions.
    /// The ancestor walk stops at the first type matching one of them.
    #[serde(default = "default_framework_roots")]
    pub framework_roots: Vec<String>,
}

fn default_framework_roots() -> Vec<String> {
    vec!["std::".to_string(), "core::".to_string(), "alloc::".to_string()]
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            framework_roots: default_framework_roots(),
        }
    }
}

impl ResolverConfig {
    pub fn from_toml(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Framework Boundary
// ─────────────────────────────────────────────────────────────────────────────

/// Predicate over qualified names marking framework types
#[derive(Clone)]
pub struct Boundary {
    predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Default for Boundary {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

impl Boundary {
    /// Names starting with any of `roots`
    pub fn prefixes(roots: Vec<String>) -> Self {
        Self::custom(move |name| roots.iter().any(|root| name.starts_with(root.as_str())))
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::prefixes(config.framework_roots.clone())
    }

    pub fn custom(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn is_framework(&self, name: &str) -> bool {
        (self.predicate)(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Binding Table
// ─────────────────────────────────────────────────────────────────────────────

/// Memoized resolutions: type → companion entry, or `None` for "no companion"
#[derive(Default)]
pub struct BindingTable {
    entries: DashMap<TypeId, Option<Arc<CompanionEntry>>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached resolution; the outer `None` means "not resolved yet"
    pub fn get(&self, type_id: TypeId) -> Option<Option<Arc<CompanionEntry>>> {
        self.entries.get(&type_id).map(|e| e.value().clone())
    }

    pub fn insert(&self, type_id: TypeId, resolution: Option<Arc<CompanionEntry>>) {
        self.entries.insert(type_id, resolution);
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Type Resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves types to the companion that binds them
pub struct TypeResolver {
    companions: Arc<CompanionRegistry>,
    table: BindingTable,
    boundary: Boundary,
    traversals: AtomicUsize,
}

impl TypeResolver {
    pub fn new(companions: Arc<CompanionRegistry>) -> Self {
        Self {
            companions,
            table: BindingTable::new(),
            boundary: Boundary::default(),
            traversals: AtomicUsize::new(0),
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_config(self, config: &ResolverConfig) -> Self {
        self.with_boundary(Boundary::from_config(config))
    }

    pub fn companions(&self) -> &CompanionRegistry {
        &self.companions
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Number of uncached resolution steps taken so far
    pub fn traversals(&self) -> usize {
        self.traversals.load(Ordering::Relaxed)
    }

    pub fn resolve_type<T: Themed>(&self) -> Result<Option<Arc<CompanionEntry>>, BindingError> {
        self.resolve(T::type_info())
    }

    /// Companion for `info`'s type, or for its nearest ancestor that has one.
    ///
    /// Every type visited on a miss gets its own cache entry. A companion
    /// found under the expected path but bound to another type is an error
    /// and is not cached.
    pub fn resolve(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<CompanionEntry>>, BindingError> {
        let type_id = info.type_id();
        if let Some(cached) = self.table.get(type_id) {
            debug!("HIT: {} cached in binding table", info.name());
            return Ok(cached);
        }
        self.traversals.fetch_add(1, Ordering::Relaxed);

        let path = naming::companion_path(info.name());
        if let Some(entry) = self.companions.get(&path) {
            if entry.target_type() != type_id {
                return Err(BindingError::SignatureMismatch {
                    type_name: info.name().to_string(),
                    companion: path,
                    found: entry.target_name().to_string(),
                });
            }
            debug!("HIT: resolved {} to {}", info.name(), path);
            self.table.insert(type_id, Some(Arc::clone(&entry)));
            return Ok(Some(entry));
        }

        if self.boundary.is_framework(info.name()) {
            debug!("MISS: reached framework type {}; abandoning search", info.name());
            self.table.insert(type_id, None);
            return Ok(None);
        }

        let resolved = match info.parent() {
            Some(parent) => {
                debug!("Not found: trying parent {} of {}", parent.info().name(), info.name());
                self.resolve(parent.info())?
            }
            None => None,
        };
        self.table.insert(type_id, resolved.clone());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErasedTarget, ThemeContext, Themed, Unbinder};

    #[derive(Default, Themed)]
    #[theme(name = "host::Object")]
    struct Object;

    #[derive(Default, Themed)]
    #[theme(name = "host::View", extends = Object, via = object)]
    struct View {
        object: Object,
    }

    #[derive(Default, Themed)]
    #[theme(name = "app::Base", extends = View, via = view)]
    struct Base {
        view: View,
    }

    #[derive(Default, Themed)]
    #[theme(name = "app::Derived", extends = Base, via = base)]
    struct Derived {
        base: Base,
    }

    #[derive(Default, Themed)]
    #[theme(name = "app::Leaf", extends = Derived, via = derived)]
    struct Leaf {
        derived: Derived,
    }

    #[derive(Default, Themed)]
    #[theme(name = "app::Lonely", extends = View, via = view)]
    struct Lonely {
        view: View,
    }

    #[derive(Default, Themed)]
    #[theme(name = "app::Orphan")]
    struct Orphan;

    #[derive(Default, Themed)]
    #[theme(name = "app::Impostor")]
    struct Impostor;

    struct Noop;

    impl Unbinder for Noop {
        fn unbind(&self) -> Result<(), BindingError> {
            Ok(())
        }

        fn clear(&self) {}

        fn companion_name(&self) -> &'static str {
            "Noop"
        }
    }

    fn noop(_: ErasedTarget, _: &ThemeContext) -> Result<Arc<dyn Unbinder>, BindingError> {
        Ok(Arc::new(Noop))
    }

    fn resolver() -> TypeResolver {
        let companions = CompanionRegistry::new_shared();
        companions.register(CompanionEntry::new::<Base>(
            "app::BaseThemeBinding",
            "BaseThemeBinding",
            noop,
        ));
        // Bound to the wrong type on purpose
        companions.register(CompanionEntry::new::<Base>(
            "app::ImpostorThemeBinding",
            "ImpostorThemeBinding",
            noop,
        ));
        TypeResolver::new(companions).with_boundary(Boundary::prefixes(vec!["host::".into()]))
    }

    #[test]
    fn test_resolves_own_companion() {
        let resolver = resolver();
        let entry = resolver.resolve_type::<Base>().unwrap().unwrap();
        assert_eq!(entry.path(), "app::BaseThemeBinding");
        assert_eq!(entry.target_type(), TypeId::of::<Base>());
    }

    #[test]
    fn test_resolution_is_memoized() {
        let resolver = resolver();
        let first = resolver.resolve_type::<Base>().unwrap().unwrap();
        let walked = resolver.traversals();

        let second = resolver.resolve_type::<Base>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.traversals(), walked);
    }

    #[test]
    fn test_ancestor_fallback_is_cached_per_type() {
        let resolver = resolver();
        let entry = resolver.resolve_type::<Leaf>().unwrap().unwrap();
        assert_eq!(entry.target_type(), TypeId::of::<Base>());

        // Leaf, Derived and Base were each probed once and cached
        assert_eq!(resolver.traversals(), 3);
        assert!(resolver.table().contains(TypeId::of::<Leaf>()));
        assert!(resolver.table().contains(TypeId::of::<Derived>()));

        let via_derived = resolver.resolve_type::<Derived>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&entry, &via_derived));
        assert_eq!(resolver.traversals(), 3);
    }

    #[test]
    fn test_framework_boundary_stops_walk() {
        let resolver = resolver();
        assert!(resolver.resolve_type::<View>().unwrap().is_none());
        // Only View itself was probed, never Object
        assert_eq!(resolver.traversals(), 1);
        assert!(!resolver.table().contains(TypeId::of::<Object>()));
        assert!(matches!(resolver.table().get(TypeId::of::<View>()), Some(None)));
    }

    #[test]
    fn test_absence_is_cached() {
        let resolver = resolver();
        assert!(resolver.resolve_type::<Lonely>().unwrap().is_none());
        let walked = resolver.traversals();
        assert_eq!(walked, 2);

        assert!(resolver.resolve_type::<Lonely>().unwrap().is_none());
        assert_eq!(resolver.traversals(), walked);
    }

    #[test]
    fn test_root_without_parent_is_absent() {
        let resolver = resolver();
        assert!(resolver.resolve_type::<Orphan>().unwrap().is_none());
        assert!(matches!(resolver.table().get(TypeId::of::<Orphan>()), Some(None)));
    }

    #[test]
    fn test_signature_mismatch_is_fatal_and_not_cached() {
        let resolver = resolver();
        let err = resolver.resolve_type::<Impostor>().unwrap_err();
        assert!(matches!(err, BindingError::SignatureMismatch { .. }));
        assert!(!resolver.table().contains(TypeId::of::<Impostor>()));

        assert!(resolver.resolve_type::<Impostor>().is_err());
        assert_eq!(resolver.traversals(), 2);
    }

    #[test]
    fn test_default_boundary() {
        let boundary = Boundary::default();
        assert!(boundary.is_framework("std::string::String"));
        assert!(!boundary.is_framework("app::Widget"));
    }

    #[test]
    fn test_config_from_toml() {
        let config = ResolverConfig::from_toml(r#"framework_roots = ["host::", "ui_kit::"]"#).unwrap();
        let boundary = Boundary::from_config(&config);
        assert!(boundary.is_framework("ui_kit::Button"));
        assert!(!boundary.is_framework("std::string::String"));

        let defaults = ResolverConfig::from_toml("").unwrap();
        assert_eq!(defaults, ResolverConfig::default());
    }
}
