//! Derive front-end
//!
//! Lifts a `syn::DeriveInput` into a [`TypeDescription`] and expands the
//! `ThemeBinding` and `Themed` derives. Helper attributes:
//!
//! - `#[bind_color(N)]` / `#[bind_drawable(N)]` on fields
//! - `#[theme(...)]` on the type, with
//!   - `name = "host::view::View"`: qualified name override
//!   - `enclosing = "Outer.Mid"`: logical nesting chain, outermost first
//!   - `extends = Base, via = base`: parent type and the field holding it

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    Data, DeriveInput, Fields, LitInt, LitStr, Token,
};

use crate::description::{Annotation, FieldDescription, TypeDescription};
use crate::model::DeclaringType;
use crate::synth::Synthesizer;

/// Parsed `#[theme(...)]` attributes
#[derive(Default)]
pub struct ThemeAttrs {
    pub name: Option<String>,
    pub enclosing: Vec<String>,
    pub extends: Option<syn::Path>,
    pub via: Option<syn::Ident>,
}

impl Parse for ThemeAttrs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut attrs = ThemeAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    attrs.name = Some(lit.value());
                }
                "enclosing" => {
                    let lit: LitStr = input.parse()?;
                    attrs.enclosing = lit
                        .value()
                        .split('.')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "extends" => {
                    attrs.extends = Some(input.parse()?);
                }
                "via" => {
                    attrs.via = Some(input.parse()?);
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown theme attribute: {}", ident),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(attrs)
    }
}

impl ThemeAttrs {
    /// Collect every `#[theme(...)]` on an item
    pub fn from_attributes(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut merged = ThemeAttrs::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("theme")) {
            let parsed: ThemeAttrs = attr.parse_args()?;
            merged.name = parsed.name.or(merged.name);
            if !parsed.enclosing.is_empty() {
                merged.enclosing = parsed.enclosing;
            }
            merged.extends = parsed.extends.or(merged.extends);
            merged.via = parsed.via.or(merged.via);
        }

        match (&merged.extends, &merged.via) {
            (Some(path), None) => Err(syn::Error::new_spanned(
                path,
                "`extends` needs `via = <field>` naming the field that holds the parent",
            )),
            (None, Some(via)) => Err(syn::Error::new_spanned(via, "`via` without `extends`")),
            _ => Ok(merged),
        }
    }
}

/// Resource annotations attached to a field
fn field_annotations(attrs: &[syn::Attribute]) -> syn::Result<Vec<Annotation>> {
    let mut annotations = Vec::new();
    for attr in attrs {
        let annotation = if attr.path().is_ident("bind_color") {
            Annotation::BindColor(attr.parse_args::<LitInt>()?.base10_parse()?)
        } else if attr.path().is_ident("bind_drawable") {
            Annotation::BindDrawable(attr.parse_args::<LitInt>()?.base10_parse()?)
        } else {
            continue;
        };
        annotations.push(annotation);
    }
    Ok(annotations)
}

/// Structural description of a derive input
pub fn describe(input: &DeriveInput) -> syn::Result<TypeDescription> {
    let mut desc = TypeDescription::new("", input.ident.to_string());

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ThemeBinding can only be derived for structs",
        ));
    };

    match &data.fields {
        Fields::Named(named) => {
            for field in &named.named {
                let Some(name) = &field.ident else { continue };
                let annotations = field_annotations(&field.attrs)?;
                if annotations.len() > 1 {
                    return Err(syn::Error::new_spanned(
                        name,
                        "a field can carry only one resource annotation",
                    ));
                }
                let ty = &field.ty;
                desc.fields.push(FieldDescription {
                    name: name.to_string(),
                    ty: quote!(#ty).to_string(),
                    annotations,
                });
            }
        }
        Fields::Unit => {}
        Fields::Unnamed(unnamed) => {
            return Err(syn::Error::new_spanned(
                unnamed,
                "ThemeBinding needs named fields",
            ));
        }
    }

    Ok(desc)
}

fn reject_generics(input: &DeriveInput) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &input.generics,
            "theme bindings do not support generic types",
        ))
    }
}

/// `impl Themed` for a derive input
pub fn themed_impl(input: &DeriveInput, attrs: &ThemeAttrs) -> TokenStream {
    let ident = &input.ident;
    let simple = ident.to_string();
    let enclosing = &attrs.enclosing;

    let name_expr = match &attrs.name {
        Some(name) => quote!(::std::string::String::from(#name)),
        None => quote! {
            ::theme_runtime::naming::qualified_name(
                ::core::module_path!(),
                &[#(#enclosing),*],
                #simple,
            )
        },
    };

    let (upcast_fn, with_parent) = match (&attrs.extends, &attrs.via) {
        (Some(parent), Some(via)) => (
            quote! {
                fn upcast(target: &mut #ident) -> &mut #parent {
                    &mut target.#via
                }
            },
            quote!(.with_parent::<#ident, #parent>(upcast)),
        ),
        _ => (quote!(), quote!()),
    };

    quote! {
        #[automatically_derived]
        impl ::theme_runtime::Themed for #ident {
            fn type_info() -> &'static ::theme_runtime::TypeInfo {
                static INFO: ::std::sync::OnceLock<::theme_runtime::TypeInfo> =
                    ::std::sync::OnceLock::new();
                INFO.get_or_init(|| {
                    #upcast_fn
                    ::theme_runtime::TypeInfo::new::<#ident>(#name_expr) #with_parent
                })
            }
        }
    }
}

/// Expand `#[derive(Themed)]`
pub fn expand_themed(input: &DeriveInput) -> syn::Result<TokenStream> {
    reject_generics(input)?;
    let attrs = ThemeAttrs::from_attributes(&input.attrs)?;
    Ok(themed_impl(input, &attrs))
}

/// Expand `#[derive(ThemeBinding)]`: the `Themed` impl plus, when the type
/// has bound fields, its companion.
pub fn expand_binding(input: &DeriveInput) -> syn::Result<TokenStream> {
    reject_generics(input)?;
    let attrs = ThemeAttrs::from_attributes(&input.attrs)?;
    let desc = describe(input)?;

    let mut model = DeclaringType::build(&desc)
        .map_err(|e| syn::Error::new_spanned(&input.ident, e.to_string()))?;
    model.enclosing = attrs.enclosing.clone();

    let themed = themed_impl(input, &attrs);
    let companion = Synthesizer::new()
        .with_visibility(&input.vis)
        .synthesize(&model)
        .map_err(|e| syn::Error::new_spanned(&input.ident, e.to_string()))?;

    Ok(quote! {
        #themed
        #companion
    })
}
