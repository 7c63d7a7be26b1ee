// Reactive wrapper
//
// An observable value container. Companions never replace the value slot of
// a reactive field on release; observers holding a clone keep a valid
// container for as long as they like.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: RwLock<Option<T>>,
    version: AtomicU64,
    observers: Mutex<Vec<Observer<T>>>,
}

/// A shared, observable value slot
///
/// Clones share the same slot. Observers run on the thread that calls
/// [`Reactive::set_value`], with no lock of the slot held.
pub struct Reactive<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Reactive<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("value", &*self.inner.value.read())
            .field("version", &self.version())
            .finish()
    }
}

impl<T> Reactive<T> {
    /// An empty slot
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                value: RwLock::new(None),
                version: AtomicU64::new(0),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Number of values set so far
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    pub fn has_value(&self) -> bool {
        self.inner.value.read().is_some()
    }

    /// Whether both handles share one slot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `observer` on every value set from now on
    pub fn observe(&self, observer: impl Fn(&T) + Send + Sync + 'static) {
        self.inner.observers.lock().push(Arc::new(observer));
    }
}

impl<T: Clone> Reactive<T> {
    pub fn with_value(value: T) -> Self {
        let reactive = Self::new();
        reactive.set_value(value);
        reactive
    }

    /// Store a value and notify observers
    pub fn set_value(&self, value: T) {
        *self.inner.value.write() = Some(value.clone());
        self.inner.version.fetch_add(1, Ordering::AcqRel);

        let observers = self.inner.observers.lock().clone();
        for observer in &observers {
            observer(&value);
        }
    }

    /// Current value, if any was set
    pub fn value(&self) -> Option<T> {
        self.inner.value.read().clone()
    }
}
