//! Theme Macros - Derives for theme bindings
//!
//! This crate provides `#[derive(ThemeBinding)]`, which generates a
//! companion type that keeps annotated fields in sync with the active theme,
//! and `#[derive(Themed)]`, which only gives a type its runtime identity.
//! The expansion logic lives in `theme_codegen` so the `themegen` binary can
//! produce the very same companions as standalone files.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive a theme binding companion.
///
/// # Attributes
///
/// - `#[bind_color(key)]` on a field: bind it to a color resource
/// - `#[bind_drawable(key)]` on a field: bind it to a drawable resource
/// - `#[theme(name = "...")]`: override the qualified type name
/// - `#[theme(enclosing = "Outer")]`: declare logical nesting; the companion
///   is named after the innermost name only
/// - `#[theme(extends = Parent, via = field)]`: resolve to the parent's
///   companion when this type has none of its own
///
/// A field carrying both `#[bind_color]` and `#[bind_drawable]` is a compile
/// error, as is a generic declaring type.
///
/// Field shapes decide how values are written and reset:
///
/// - `Reactive<T>`: allocated on bind, updated with `set_value` once the target
///   is unlocked, kept on release
/// - `Option<T>`: set to `Some(value)`, reset to `None`
/// - anything else: assigned directly, reset to `Default::default()`
///
/// # Example
///
/// ```ignore
/// #[derive(ThemeBinding)]
/// pub struct Widget {
///     #[bind_color(100)]
///     pub tint: Option<Color>,
///     #[bind_drawable(200)]
///     pub icon: Reactive<Drawable>,
/// }
///
/// // Generates `WidgetThemeBinding`; register it once at startup:
/// WidgetThemeBinding::register(&companions);
/// ```
#[proc_macro_derive(ThemeBinding, attributes(theme, bind_color, bind_drawable))]
pub fn derive_theme_binding(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    theme_codegen::syntax::expand_binding(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive only the runtime identity of a type (no companion).
///
/// Use it for host framework types and for types whose companion is
/// generated by `themegen` and included separately.
#[proc_macro_derive(Themed, attributes(theme))]
pub fn derive_themed(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    theme_codegen::syntax::expand_themed(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
