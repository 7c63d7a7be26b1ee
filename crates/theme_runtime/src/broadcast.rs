// Theme-change broadcaster
//
// Companions register as listeners and get `apply_theme` on every change.
// Listeners are held weakly: the binder owns companions, the broadcaster only
// reaches them while they are alive. Asynchronous observers can subscribe to
// the change stream instead.

use std::ptr;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Something that re-applies theme values on demand
pub trait ThemeListener: Send + Sync {
    fn apply_theme(&self);
}

/// Notification sent after a theme change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeChanged {
    /// Name of the now active skin
    pub skin: String,
}

/// Fans theme changes out to listeners and subscribers
pub struct ThemeBroadcaster {
    listeners: Mutex<Vec<Weak<dyn ThemeListener>>>,
    change_tx: broadcast::Sender<ThemeChanged>,
}

impl Default for ThemeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeBroadcaster {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(64);
        Self {
            listeners: Mutex::new(Vec::new()),
            change_tx,
        }
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn add_listener(&self, listener: Arc<dyn ThemeListener>) {
        self.listeners.lock().push(Arc::downgrade(&listener));
    }

    /// Remove a listener by identity. Returns whether it was registered.
    pub fn remove_listener(&self, listener: &dyn ThemeListener) -> bool {
        let needle = listener as *const dyn ThemeListener;
        let mut removed = false;
        self.listeners.lock().retain(|l| {
            if ptr::addr_eq(l.as_ptr(), needle) {
                removed = true;
                false
            } else {
                l.strong_count() > 0
            }
        });
        removed
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Subscribe to change notifications
    ///
    /// New subscribers only see changes made after subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<ThemeChanged> {
        self.change_tx.subscribe()
    }

    /// Apply the theme on every live listener, then notify subscribers.
    ///
    /// Returns the number of listeners invoked. Listeners may add or remove
    /// listeners while being notified.
    pub fn notify(&self, change: ThemeChanged) -> usize {
        let live: Vec<Arc<dyn ThemeListener>> = {
            let mut listeners = self.listeners.lock();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        debug!("Theme changed to {}; notifying {} listeners", change.skin, live.len());
        for listener in &live {
            listener.apply_theme();
        }

        // No subscribers is fine
        let _ = self.change_tx.send(change);
        live.len()
    }
}
