//! Theme Runtime - Binding live objects to the active theme
//!
//! Companion types generated by `#[derive(ThemeBinding)]` (or by `themegen`)
//! register themselves in a [`CompanionRegistry`]. At runtime a
//! [`ThemeBinder`] takes any [`Themed`] target, finds the companion for its
//! exact type or nearest ancestor through the [`TypeResolver`], instantiates
//! it and keeps it alive until the target is unbound.
//!
//! ```ignore
//! let companions = CompanionRegistry::new_shared();
//! WidgetThemeBinding::register(&companions);
//!
//! let broadcaster = ThemeBroadcaster::new_shared();
//! let skins = Arc::new(SkinManager::new(broadcaster.clone()));
//! let context = ThemeContext::new(skins.clone(), broadcaster);
//!
//! let binder = ThemeBinder::with_companions(companions);
//! let widget = shared(Widget::default());
//! binder.bind(&widget, &context)?;   // fields now hold the active skin's values
//! skins.activate("night")?;          // companions re-apply on theme change
//! binder.unbind(&widget)?;           // fields reset, listener removed
//! ```

// Generated code names `::theme_runtime`, including inside this crate.
extern crate self as theme_runtime;

pub use parking_lot;
pub use theme_macros::{ThemeBinding, Themed};
pub use theme_types::{naming, Color, ColorParseError, Drawable, ResourceId, ResourceKind};

mod binder;
mod broadcast;
mod companion;
mod context;
mod error;
mod identity;
mod reactive;
mod resolver;
mod skin;
mod target;

pub use binder::*;
pub use broadcast::*;
pub use companion::*;
pub use context::*;
pub use error::*;
pub use identity::*;
pub use reactive::*;
pub use resolver::*;
pub use skin::*;
pub use target::*;
