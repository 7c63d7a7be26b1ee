// Target handles
//
// A bound target is shared between its owner and its companion. Companions
// only ever see a `TargetHandle<T>`: a lock-and-mutate view that may point at
// the whole object or, after upcasting, at the ancestor part embedded in it.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::BindingError;

/// How host code holds a bindable object
pub type Shared<T> = Arc<Mutex<T>>;

/// Wrap a value for binding
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

// ─────────────────────────────────────────────────────────────────────────────
// Target Cell
// ─────────────────────────────────────────────────────────────────────────────

/// Exclusive access to a target for the duration of a callback
pub trait TargetCell<T>: Send + Sync {
    fn with_target(&self, f: &mut dyn FnMut(&mut T));
}

impl<T: Send> TargetCell<T> for Mutex<T> {
    fn with_target(&self, f: &mut dyn FnMut(&mut T)) {
        let mut guard = self.lock();
        f(&mut guard);
    }
}

/// The `P` part of a `C`, reached through a field projection
struct Projection<C, P> {
    parent: TargetHandle<C>,
    project: fn(&mut C) -> &mut P,
}

impl<C: 'static, P: 'static> TargetCell<P> for Projection<C, P> {
    fn with_target(&self, f: &mut dyn FnMut(&mut P)) {
        let project = self.project;
        self.parent.cell.with_target(&mut |child| f(project(child)));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Target Handle
// ─────────────────────────────────────────────────────────────────────────────

/// A companion's reference to its target
pub struct TargetHandle<T> {
    cell: Arc<dyn TargetCell<T>>,
}

impl<T> Clone for TargetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for TargetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetHandle")
            .field("target", &type_name::<T>())
            .finish()
    }
}

impl<T: Send + 'static> TargetHandle<T> {
    pub fn new(target: Shared<T>) -> Self {
        Self { cell: target }
    }

    pub fn from_cell(cell: Arc<dyn TargetCell<T>>) -> Self {
        Self { cell }
    }

    /// Lock the target and mutate it
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut f = Some(f);
        self.cell.with_target(&mut |target| {
            if let Some(f) = f.take() {
                f(target);
            }
        });
    }

    /// A handle to the `P` embedded in this target
    pub fn project<P: 'static>(self, project: fn(&mut T) -> &mut P) -> TargetHandle<P> {
        TargetHandle {
            cell: Arc::new(Projection {
                parent: self,
                project,
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Erased Target
// ─────────────────────────────────────────────────────────────────────────────

/// A `TargetHandle<T>` with `T` erased, as passed to companion constructors
pub struct ErasedTarget {
    type_id: TypeId,
    type_name: &'static str,
    handle: Box<dyn Any + Send + Sync>,
}

impl fmt::Debug for ErasedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedTarget")
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl ErasedTarget {
    pub fn new<T: Send + 'static>(handle: TargetHandle<T>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            handle: Box::new(handle),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the typed handle
    pub fn downcast<T: Send + 'static>(self) -> Result<TargetHandle<T>, BindingError> {
        let found = self.type_name;
        self.handle
            .downcast::<TargetHandle<T>>()
            .map(|handle| *handle)
            .map_err(|_| BindingError::TargetMismatch {
                expected: type_name::<T>(),
                found,
            })
    }

    /// Replace a `C` handle by a handle to the `P` embedded in it
    pub fn project<C: Send + 'static, P: Send + 'static>(
        self,
        project: fn(&mut C) -> &mut P,
    ) -> Result<ErasedTarget, BindingError> {
        Ok(ErasedTarget::new(self.downcast::<C>()?.project(project)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Target Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of a bound target: the address of its shared allocation.
///
/// The active companion keeps the allocation alive, so the address cannot be
/// reused while the binding exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(usize);

impl TargetId {
    pub fn of<T: ?Sized>(target: &Arc<T>) -> Self {
        TargetId(Arc::as_ptr(target) as *const () as usize)
    }
}
