// Resource lookup seam and the context handed to companions

use std::sync::Arc;

use theme_types::{Color, Drawable, ResourceId};

use crate::ThemeBroadcaster;

/// Supplies concrete resource values for the active theme
///
/// Lookups should be pure; companions call them on every theme change.
pub trait ResourceLookup: Send + Sync {
    fn get_color(&self, id: ResourceId) -> Color;
    fn get_drawable(&self, id: ResourceId) -> Drawable;
}

/// Everything a companion needs besides its target
#[derive(Clone)]
pub struct ThemeContext {
    resources: Arc<dyn ResourceLookup>,
    broadcaster: Arc<ThemeBroadcaster>,
}

impl ThemeContext {
    pub fn new(resources: Arc<dyn ResourceLookup>, broadcaster: Arc<ThemeBroadcaster>) -> Self {
        Self {
            resources,
            broadcaster,
        }
    }

    pub fn resources(&self) -> &dyn ResourceLookup {
        self.resources.as_ref()
    }

    pub fn broadcaster(&self) -> &ThemeBroadcaster {
        &self.broadcaster
    }
}
