// Code Synthesizer - declaration model to companion source
//
// The emitted companion refers to the declaring type by its simple name, so
// it must be expanded (derive) or included (themegen output) in the module
// that declares the type. Runtime items are always reached through
// `::theme_runtime`.
//
// Constructor order: context, target, reactive allocation, first update,
// listener registration. Release order: listener removal, target re-read
// (fails once cleared), field resets in declaration order.
//
// Updates and resets run with the companion's target slot locked; an update
// already in progress finishes before the release resets any field. Reactive
// values are published only after every lock is released, so observers may
// lock the target or unbind it.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote, ToTokens};
use theme_types::ResourceKind;

use crate::model::{DeclaringType, FieldBinding, FieldShape, ModelError};

/// Turns declaration models into companion tokens
pub struct Synthesizer {
    visibility: TokenStream,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer {
    /// A synthesizer emitting `pub` companions
    pub fn new() -> Self {
        Self {
            visibility: quote!(pub),
        }
    }

    /// Emit companions with the given visibility (usually the declaring type's)
    pub fn with_visibility(mut self, visibility: impl ToTokens) -> Self {
        self.visibility = visibility.into_token_stream();
        self
    }

    /// Companion tokens for one declaring type, or `None` when it has no bindings.
    ///
    /// Nested types are not visited; callers iterate [`DeclaringType::qualifying`].
    pub fn synthesize(&self, ty: &DeclaringType) -> Result<Option<TokenStream>, ModelError> {
        if !ty.qualifies() {
            return Ok(None);
        }

        let vis = &self.visibility;
        let target_ty = ident(&ty.name)?;
        let companion = ident(&ty.companion_name())?;
        let companion_str = ty.companion_name();
        let doc = format!("Theme binding companion for [`{}`].", ty.name);

        let mut allocations = Vec::new();
        let mut pending = Vec::new();
        let mut publishes = Vec::new();
        let mut updates = Vec::new();
        let mut resets = Vec::new();
        for field in &ty.fields {
            let name = ident(&field.name)?;
            if field.shape == FieldShape::Reactive {
                let slot = format_ident!("pending_{}", name);
                allocations.push(quote! {
                    target.#name = ::core::default::Default::default();
                });
                pending.push(quote! {
                    let mut #slot = ::core::option::Option::None;
                });
                publishes.push(quote! {
                    if let ::core::option::Option::Some((reactive, value)) = #slot {
                        reactive.set_value(value);
                    }
                });
            }
            updates.push(update_statement(&name, field));
            if let Some(reset) = reset_statement(&name, field) {
                resets.push(reset);
            }
        }

        let (init_fn, init_call) = if allocations.is_empty() {
            (quote!(), quote!())
        } else {
            (
                quote! {
                    fn init_variables(&self) {
                        let ::core::option::Option::Some(target) = self.target.lock().clone() else {
                            return;
                        };
                        target.update(|target| {
                            #(#allocations)*
                        });
                    }
                },
                quote!(binding.init_variables();),
            )
        };

        let release = if resets.is_empty() {
            quote!(let _ = target;)
        } else {
            quote! {
                target.update(|target| {
                    #(#resets)*
                });
            }
        };

        Ok(Some(quote! {
            #[doc = #doc]
            #vis struct #companion {
                context: ::theme_runtime::ThemeContext,
                target: ::theme_runtime::parking_lot::Mutex<
                    ::core::option::Option<::theme_runtime::TargetHandle<#target_ty>>,
                >,
            }

            #[allow(dead_code)]
            impl #companion {
                /// Bind a new companion to `target`, apply the current theme and
                /// start listening for theme changes.
                #vis fn new(
                    target: ::theme_runtime::TargetHandle<#target_ty>,
                    context: &::theme_runtime::ThemeContext,
                ) -> ::std::sync::Arc<Self> {
                    let binding = Self {
                        context: ::core::clone::Clone::clone(context),
                        target: ::theme_runtime::parking_lot::Mutex::new(
                            ::core::option::Option::Some(target),
                        ),
                    };
                    #init_call
                    binding.update_theme();
                    let binding = ::std::sync::Arc::new(binding);
                    context
                        .broadcaster()
                        .add_listener(::std::sync::Arc::clone(&binding) as ::std::sync::Arc<dyn ::theme_runtime::ThemeListener>);
                    binding
                }

                /// Registry entry for this companion.
                #vis fn entry() -> ::theme_runtime::CompanionEntry {
                    ::theme_runtime::CompanionEntry::new::<#target_ty>(
                        ::theme_runtime::naming::companion_path(
                            <#target_ty as ::theme_runtime::Themed>::type_info().name(),
                        ),
                        #companion_str,
                        Self::construct,
                    )
                }

                /// Make this companion discoverable by the type resolver.
                #vis fn register(registry: &::theme_runtime::CompanionRegistry) {
                    registry.register(Self::entry());
                }

                fn construct(
                    target: ::theme_runtime::ErasedTarget,
                    context: &::theme_runtime::ThemeContext,
                ) -> ::core::result::Result<
                    ::std::sync::Arc<dyn ::theme_runtime::Unbinder>,
                    ::theme_runtime::BindingError,
                > {
                    let target = target.downcast::<#target_ty>()?;
                    let binding: ::std::sync::Arc<dyn ::theme_runtime::Unbinder> =
                        Self::new(target, context);
                    ::core::result::Result::Ok(binding)
                }

                #init_fn

                /// Recompute every bound field from the current resources.
                #vis fn update_theme(&self) {
                    let guard = self.target.lock();
                    let ::core::option::Option::Some(target) = guard.as_ref() else {
                        return;
                    };
                    let resources = self.context.resources();
                    #(#pending)*
                    target.update(|target| {
                        #(#updates)*
                    });
                    ::core::mem::drop(guard);
                    #(#publishes)*
                }
            }

            #[automatically_derived]
            impl ::theme_runtime::ThemeListener for #companion {
                fn apply_theme(&self) {
                    self.update_theme();
                }
            }

            #[automatically_derived]
            impl ::theme_runtime::Unbinder for #companion {
                fn unbind(&self) -> ::core::result::Result<(), ::theme_runtime::BindingError> {
                    self.context.broadcaster().remove_listener(self);
                    let guard = self.target.lock();
                    let target = guard.as_ref().ok_or_else(|| {
                        ::theme_runtime::BindingError::AlreadyCleared(
                            ::std::string::String::from(#companion_str),
                        )
                    })?;
                    #release
                    ::core::result::Result::Ok(())
                }

                fn clear(&self) {
                    self.target.lock().take();
                }

                fn companion_name(&self) -> &'static str {
                    #companion_str
                }
            }
        }))
    }

    /// Companion source text with a generated-file header.
    pub fn render(&self, ty: &DeclaringType) -> Result<Option<String>, ModelError> {
        Ok(self.synthesize(ty)?.map(|tokens| {
            format!(
                "// @generated by themegen for `{}`. Do not edit.\n\n{}\n",
                ty.qualified_name(),
                tokens
            )
        }))
    }
}

fn update_statement(name: &syn::Ident, field: &FieldBinding) -> TokenStream {
    let key = Literal::u32_unsuffixed(field.key);
    let lookup = match field.kind {
        ResourceKind::Color => quote!(resources.get_color(#key)),
        ResourceKind::Drawable => quote!(resources.get_drawable(#key)),
    };

    match field.shape {
        FieldShape::Reactive => {
            let slot = format_ident!("pending_{}", name);
            quote! {
                #slot = ::core::option::Option::Some((
                    ::core::clone::Clone::clone(&target.#name),
                    ::core::convert::Into::into(#lookup),
                ));
            }
        }
        FieldShape::Reference => quote! {
            target.#name = ::core::option::Option::Some(::core::convert::Into::into(#lookup));
        },
        FieldShape::Value => quote! {
            target.#name = ::core::convert::Into::into(#lookup);
        },
    }
}

fn reset_statement(name: &syn::Ident, field: &FieldBinding) -> Option<TokenStream> {
    match field.shape {
        FieldShape::Reactive => None,
        FieldShape::Reference => Some(quote! {
            target.#name = ::core::option::Option::None;
        }),
        FieldShape::Value => Some(quote! {
            target.#name = ::core::default::Default::default();
        }),
    }
}

fn ident(name: &str) -> Result<syn::Ident, ModelError> {
    syn::parse_str(name).map_err(|_| ModelError::InvalidIdentifier(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{Annotation, FieldDescription, TypeDescription};

    fn widget() -> DeclaringType {
        DeclaringType::build(
            &TypeDescription::new("app::ui", "Widget")
                .with_field(
                    FieldDescription::new("tint", "Option<Color>")
                        .annotated(Annotation::BindColor(100)),
                )
                .with_field(
                    FieldDescription::new("icon", "Reactive<Drawable>")
                        .annotated(Annotation::BindDrawable(200)),
                )
                .with_field(
                    FieldDescription::new("border", "u32").annotated(Annotation::BindColor(101)),
                ),
        )
        .unwrap()
    }

    fn render(ty: &DeclaringType) -> String {
        Synthesizer::new().render(ty).unwrap().unwrap()
    }

    /// Text of a generated method, from its `fn` line up to the next `fn`.
    fn method_body<'a>(source: &'a str, name: &str) -> &'a str {
        let start = source
            .find(&format!("fn {name}"))
            .unwrap_or_else(|| panic!("missing fn {name}"));
        let rest = &source[start + 3..];
        let end = rest.find(" fn ").map(|i| i + 3).unwrap_or(rest.len());
        &source[start..start + end]
    }

    #[test]
    fn test_output_is_deterministic() {
        let first = render(&widget());
        let second = render(&widget());
        assert_eq!(first, second);
        assert!(first.starts_with("// @generated by themegen for `app::ui::Widget`."));
    }

    #[test]
    fn test_no_companion_without_bindings() {
        let plain = DeclaringType::build(
            &TypeDescription::new("app", "Plain")
                .with_field(FieldDescription::new("label", "String")),
        )
        .unwrap();
        assert!(Synthesizer::new().synthesize(&plain).unwrap().is_none());
    }

    #[test]
    fn test_companion_naming() {
        let source = render(&widget());
        assert!(source.contains("pub struct WidgetThemeBinding"));
        assert!(source.contains("TargetHandle < Widget >"));
    }

    #[test]
    fn test_every_field_updated_once() {
        let source = render(&widget());
        let update = method_body(&source, "update_theme");
        assert_eq!(update.matches("target . tint =").count(), 1);
        assert_eq!(update.matches("& target . icon").count(), 1);
        assert_eq!(update.matches("set_value").count(), 1);
        assert_eq!(update.matches("target . border =").count(), 1);
        assert!(update.contains("resources . get_color (100)"));
        assert!(update.contains("resources . get_drawable (200)"));
        assert!(update.contains("resources . get_color (101)"));
    }

    #[test]
    fn test_reactive_values_published_after_locks_released() {
        let source = render(&widget());
        let update = method_body(&source, "update_theme");
        let locked = update.find("target . update (").unwrap();
        let unlocked = update.find(":: core :: mem :: drop (guard)").unwrap();
        let publish = update.find("reactive . set_value (value)").unwrap();
        assert!(locked < unlocked);
        assert!(unlocked < publish);
        assert!(update[..unlocked].contains("pending_icon = :: core :: option :: Option :: Some"));
    }

    #[test]
    fn test_release_resets_non_reactive_fields_in_order() {
        let source = render(&widget());
        let unbind = method_body(&source, "unbind");
        let tint = unbind.find("target . tint = :: core :: option :: Option :: None").unwrap();
        let border = unbind
            .find("target . border = :: core :: default :: Default :: default ()")
            .unwrap();
        assert!(tint < border);
        assert!(!unbind.contains("target . icon"));
    }

    #[test]
    fn test_release_checks_cleared_target_after_unregistering() {
        let source = render(&widget());
        let unbind = method_body(&source, "unbind");
        let remove = unbind.find("remove_listener").unwrap();
        let cleared = unbind.find("AlreadyCleared").unwrap();
        let reset = unbind.find("target . tint").unwrap();
        assert!(remove < cleared);
        assert!(cleared < reset);
    }

    #[test]
    fn test_constructor_order() {
        let source = render(&widget());
        let ctor = method_body(&source, "new");
        let context = ctor.find("context : :: core :: clone :: Clone :: clone").unwrap();
        let target = ctor.find("target : :: theme_runtime :: parking_lot").unwrap();
        let init = ctor.find("binding . init_variables ()").unwrap();
        let update = ctor.find("binding . update_theme ()").unwrap();
        let listen = ctor.find("add_listener").unwrap();
        assert!(context < target);
        assert!(target < init);
        assert!(init < update);
        assert!(update < listen);
    }

    #[test]
    fn test_reactive_allocation() {
        let source = render(&widget());
        let init = method_body(&source, "init_variables");
        assert!(init.contains("target . icon = :: core :: default :: Default :: default ()"));
        assert!(!init.contains("target . tint"));
    }

    #[test]
    fn test_no_allocation_step_without_reactive_fields() {
        let ty = DeclaringType::build(&TypeDescription::new("app", "Label").with_field(
            FieldDescription::new("tint", "Option<Color>").annotated(Annotation::BindColor(5)),
        ))
        .unwrap();
        let source = render(&ty);
        assert!(!source.contains("init_variables"));
    }

    #[test]
    fn test_all_reactive_type_releases_nothing() {
        let ty = DeclaringType::build(&TypeDescription::new("app", "Banner").with_field(
            FieldDescription::new("art", "Reactive<Drawable>")
                .annotated(Annotation::BindDrawable(5)),
        ))
        .unwrap();
        let source = render(&ty);
        let unbind = method_body(&source, "unbind");
        assert!(unbind.contains("let _ = target ;"));
    }

    #[test]
    fn test_visibility_follows_declaring_type() {
        let vis: syn::Visibility = syn::parse_str("pub(crate)").unwrap();
        let tokens = Synthesizer::new()
            .with_visibility(vis)
            .synthesize(&widget())
            .unwrap()
            .unwrap()
            .to_string();
        assert!(tokens.contains("pub (crate) struct WidgetThemeBinding"));
    }

    #[test]
    fn test_nested_companion_is_flattened() {
        let outer = DeclaringType::build(&TypeDescription::new("app::ui", "Outer").with_nested(
            TypeDescription::new("", "Inner").with_field(
                FieldDescription::new("tint", "u32").annotated(Annotation::BindColor(1)),
            ),
        ))
        .unwrap();
        let inner = outer.qualifying()[0];
        let source = render(inner);
        assert!(source.contains("struct InnerThemeBinding"));
        assert!(!source.contains("OuterThemeBinding"));
    }
}
