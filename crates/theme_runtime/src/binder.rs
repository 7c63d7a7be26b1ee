// Binding Registry - activates and releases companions for live targets
//
// At most one companion is active per target. The binder owns it; the
// broadcaster only holds it weakly, so dropping the entry ends the binding.
// Companions are constructed outside the map, so a panicking constructor
// never leaves a released companion behind.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{
    BindingError, CompanionRegistry, ErasedTarget, Shared, TargetHandle, TargetId, ThemeContext,
    Themed, TypeResolver, Unbinder,
};

/// Active companions by target identity
pub type ActiveBindings = DashMap<TargetId, Arc<dyn Unbinder>>;

/// Binds targets to their companions and releases them again
pub struct ThemeBinder {
    resolver: TypeResolver,
    active: ActiveBindings,
}

impl ThemeBinder {
    pub fn new(resolver: TypeResolver) -> Self {
        Self {
            resolver,
            active: DashMap::new(),
        }
    }

    /// A binder with a default resolver over `companions`
    pub fn with_companions(companions: Arc<CompanionRegistry>) -> Self {
        Self::new(TypeResolver::new(companions))
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Apply the current theme to `target` and keep it updated until unbound.
    ///
    /// Uses the companion of `T` or of its nearest ancestor. Binding a target
    /// that is still bound releases the previous companion first.
    pub fn bind<T: Themed>(&self, target: &Shared<T>, context: &ThemeContext) -> Result<(), BindingError> {
        let info = T::type_info();
        let entry = self
            .resolver
            .resolve(info)?
            .ok_or_else(|| BindingError::NoBinding(info.name().to_string()))?;

        let handle = ErasedTarget::new(TargetHandle::new(Arc::clone(target)));
        let handle = info.upcast_to(handle, entry.target_type())?;

        let id = TargetId::of(target);
        if let Some((_, previous)) = self.active.remove(&id) {
            warn!(
                "{} is already bound by {}; releasing it before rebinding",
                info.name(),
                previous.companion_name()
            );
            if let Err(e) = release(previous.as_ref()) {
                warn!("Releasing previous binding of {} failed: {}", info.name(), e);
            }
        }

        let companion = entry.construct(handle, context)?;
        if let Some(raced) = self.active.insert(id, companion) {
            warn!("{} was bound concurrently; releasing the other binding", info.name());
            if let Err(e) = release(raced.as_ref()) {
                warn!("Releasing concurrent binding of {} failed: {}", info.name(), e);
            }
        }

        debug!("Bound {} with {}", info.name(), entry.name());
        Ok(())
    }

    /// Release the companion of `target`, resetting its bound fields.
    ///
    /// Unbinding a target that is not bound does nothing.
    pub fn unbind<T: Themed>(&self, target: &Shared<T>) -> Result<(), BindingError> {
        let Some((_, companion)) = self.active.remove(&TargetId::of(target)) else {
            debug!("{} is not bound; nothing to unbind", T::type_info().name());
            return Ok(());
        };
        release(companion.as_ref())
    }

    pub fn is_bound<T>(&self, target: &Shared<T>) -> bool {
        self.active.contains_key(&TargetId::of(target))
    }

    /// Number of active bindings
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Release then clear, clearing even when release fails
fn release(companion: &dyn Unbinder) -> Result<(), BindingError> {
    let result = companion.unbind();
    companion.clear();
    result
}
