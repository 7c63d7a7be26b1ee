// Declaration Model - the annotated fields of a declaring type
//
// Built once per declaring type from its structural description, consumed by
// the synthesizer, then dropped.

use theme_types::{naming, ResourceId, ResourceKind};

use crate::description::{Annotation, FieldDescription, TypeDescription};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while building a declaration model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Field {type_name}.{field} carries more than one resource annotation")]
    ConflictingAnnotations { type_name: String, field: String },

    #[error("Field {type_name}.{field} has an unparseable type `{ty}`: {message}")]
    InvalidFieldType {
        type_name: String,
        field: String,
        ty: String,
        message: String,
    },

    #[error("Not a valid identifier: {0}")]
    InvalidIdentifier(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Field Binding
// ─────────────────────────────────────────────────────────────────────────────

/// How a bound field is written and reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `Reactive<_>`: allocated when bound, updated through `set_value`,
    /// left in place on release so observers keep their container
    Reactive,
    /// `Option<_>`: assigned `Some(..)`, reset to `None`
    Reference,
    /// Anything else: assigned directly, reset to its `Default` zero value
    Value,
}

impl FieldShape {
    /// Classify a declared type by its outermost path segment
    pub fn classify(ty: &syn::Type) -> Self {
        match ty {
            syn::Type::Path(path) => match path.path.segments.last() {
                Some(segment) if segment.ident == "Reactive" => FieldShape::Reactive,
                Some(segment) if segment.ident == "Option" => FieldShape::Reference,
                _ => FieldShape::Value,
            },
            syn::Type::Group(group) => Self::classify(&group.elem),
            syn::Type::Paren(paren) => Self::classify(&paren.elem),
            _ => FieldShape::Value,
        }
    }
}

/// A field bound to a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub name: String,
    /// Declared type, normalized to token text
    pub ty: String,
    pub shape: FieldShape,
    pub kind: ResourceKind,
    pub key: ResourceId,
}

impl FieldBinding {
    /// Lift a field description into a binding.
    ///
    /// Returns `Ok(None)` for fields without a resource annotation.
    pub fn from_description(
        type_name: &str,
        field: &FieldDescription,
    ) -> Result<Option<Self>, ModelError> {
        let mut recognized = field.annotations.iter().filter_map(|a| match a {
            Annotation::BindColor(key) => Some((ResourceKind::Color, *key)),
            Annotation::BindDrawable(key) => Some((ResourceKind::Drawable, *key)),
            Annotation::Other(_) => None,
        });

        let Some((kind, key)) = recognized.next() else {
            return Ok(None);
        };
        if recognized.next().is_some() {
            return Err(ModelError::ConflictingAnnotations {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            });
        }

        validate_ident(&field.name)?;
        let ty: syn::Type =
            syn::parse_str(&field.ty).map_err(|e| ModelError::InvalidFieldType {
                type_name: type_name.to_string(),
                field: field.name.clone(),
                ty: field.ty.clone(),
                message: e.to_string(),
            })?;

        Ok(Some(Self {
            name: field.name.clone(),
            ty: quote::quote!(#ty).to_string(),
            shape: FieldShape::classify(&ty),
            kind,
            key,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Declaring Type
// ─────────────────────────────────────────────────────────────────────────────

/// A declaring type with its resource-bound fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaringType {
    /// Module path; empty means "wherever the companion is expanded"
    pub package: String,
    /// Enclosing declaring types, outermost first
    pub enclosing: Vec<String>,
    pub name: String,
    /// Bound fields in declaration order
    pub fields: Vec<FieldBinding>,
    /// Nested declaring types that (transitively) carry bindings
    pub nested: Vec<DeclaringType>,
}

impl DeclaringType {
    /// Build the model for a described type and everything nested in it
    pub fn build(desc: &TypeDescription) -> Result<Self, ModelError> {
        Self::build_in(desc, &desc.package, &[])
    }

    fn build_in(
        desc: &TypeDescription,
        package: &str,
        enclosing: &[String],
    ) -> Result<Self, ModelError> {
        validate_ident(&desc.name)?;

        let mut fields = Vec::new();
        for field in &desc.fields {
            if let Some(binding) = FieldBinding::from_description(&desc.name, field)? {
                fields.push(binding);
            }
        }

        let mut inner_chain = enclosing.to_vec();
        inner_chain.push(desc.name.clone());

        let mut nested = Vec::new();
        for inner in &desc.nested {
            let node = Self::build_in(inner, package, &inner_chain)?;
            if node.has_bindings() {
                nested.push(node);
            }
        }

        Ok(Self {
            package: package.to_string(),
            enclosing: enclosing.to_vec(),
            name: desc.name.clone(),
            fields,
            nested,
        })
    }

    /// Whether this type gets a companion of its own
    pub fn qualifies(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Whether this type or anything nested in it gets a companion
    pub fn has_bindings(&self) -> bool {
        self.qualifies() || self.nested.iter().any(|n| n.has_bindings())
    }

    /// `package::Outer.Inner`
    pub fn qualified_name(&self) -> String {
        let enclosing: Vec<&str> = self.enclosing.iter().map(String::as_str).collect();
        naming::qualified_name(&self.package, &enclosing, &self.name)
    }

    /// Simple name of the companion (`InnerThemeBinding`)
    pub fn companion_name(&self) -> String {
        naming::companion_name(&self.name)
    }

    /// Flattened path of the companion (`package::InnerThemeBinding`)
    pub fn companion_path(&self) -> String {
        naming::companion_path(&self.qualified_name())
    }

    /// This type and all nested types that get a companion, outer first
    pub fn qualifying(&self) -> Vec<&DeclaringType> {
        let mut out = Vec::new();
        self.collect_qualifying(&mut out);
        out
    }

    fn collect_qualifying<'a>(&'a self, out: &mut Vec<&'a DeclaringType>) {
        if self.qualifies() {
            out.push(self);
        }
        for inner in &self.nested {
            inner.collect_qualifying(out);
        }
    }
}

fn validate_ident(name: &str) -> Result<(), ModelError> {
    syn::parse_str::<syn::Ident>(name)
        .map(|_| ())
        .map_err(|_| ModelError::InvalidIdentifier(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> TypeDescription {
        TypeDescription::new("app::ui", "Widget")
            .with_field(
                FieldDescription::new("tint", "Option<Color>").annotated(Annotation::BindColor(100)),
            )
            .with_field(
                FieldDescription::new("icon", "Reactive<Drawable>")
                    .annotated(Annotation::BindDrawable(200)),
            )
            .with_field(FieldDescription::new("label", "String"))
    }

    #[test]
    fn test_build_keeps_only_annotated_fields() {
        let model = DeclaringType::build(&widget()).unwrap();
        assert!(model.qualifies());
        assert_eq!(model.fields.len(), 2);
        assert_eq!(model.fields[0].name, "tint");
        assert_eq!(model.fields[0].kind, ResourceKind::Color);
        assert_eq!(model.fields[0].key, 100);
        assert_eq!(model.fields[1].kind, ResourceKind::Drawable);
        assert_eq!(model.fields[1].key, 200);
    }

    #[test]
    fn test_field_shapes() {
        let parse = |s: &str| FieldShape::classify(&syn::parse_str(s).unwrap());
        assert_eq!(parse("Reactive<Drawable>"), FieldShape::Reactive);
        assert_eq!(parse("theme_runtime::Reactive<Color>"), FieldShape::Reactive);
        assert_eq!(parse("Option<Color>"), FieldShape::Reference);
        assert_eq!(parse("u32"), FieldShape::Value);
        assert_eq!(parse("Color"), FieldShape::Value);
        assert_eq!(parse("[u8; 4]"), FieldShape::Value);
    }

    #[test]
    fn test_type_without_bindings_does_not_qualify() {
        let desc = TypeDescription::new("app", "Plain")
            .with_field(FieldDescription::new("label", "String"));
        let model = DeclaringType::build(&desc).unwrap();
        assert!(!model.qualifies());
        assert!(model.qualifying().is_empty());
    }

    #[test]
    fn test_other_annotations_are_ignored() {
        let desc = TypeDescription::new("app", "Widget").with_field(
            FieldDescription::new("tint", "u32")
                .annotated(Annotation::Other("serde".into()))
                .annotated(Annotation::BindColor(3)),
        );
        let model = DeclaringType::build(&desc).unwrap();
        assert_eq!(model.fields.len(), 1);
        assert_eq!(model.fields[0].shape, FieldShape::Value);
    }

    #[test]
    fn test_conflicting_annotations_rejected() {
        let desc = TypeDescription::new("app", "Widget").with_field(
            FieldDescription::new("tint", "u32")
                .annotated(Annotation::BindColor(1))
                .annotated(Annotation::BindDrawable(2)),
        );
        let err = DeclaringType::build(&desc).unwrap_err();
        assert!(matches!(err, ModelError::ConflictingAnnotations { .. }));
    }

    #[test]
    fn test_invalid_field_type_rejected() {
        let desc = TypeDescription::new("app", "Widget").with_field(
            FieldDescription::new("tint", "Option<").annotated(Annotation::BindColor(1)),
        );
        let err = DeclaringType::build(&desc).unwrap_err();
        assert!(matches!(err, ModelError::InvalidFieldType { .. }));
    }

    #[test]
    fn test_nested_types() {
        let desc = TypeDescription::new("app::ui", "Outer")
            .with_nested(
                TypeDescription::new("ignored", "Inner").with_field(
                    FieldDescription::new("tint", "u32").annotated(Annotation::BindColor(9)),
                ),
            )
            .with_nested(
                TypeDescription::new("", "Empty")
                    .with_field(FieldDescription::new("label", "String")),
            );

        let model = DeclaringType::build(&desc).unwrap();
        assert!(!model.qualifies());
        assert_eq!(model.nested.len(), 1);

        let inner = &model.nested[0];
        assert_eq!(inner.package, "app::ui");
        assert_eq!(inner.enclosing, vec!["Outer".to_string()]);
        assert_eq!(inner.qualified_name(), "app::ui::Outer.Inner");
        assert_eq!(inner.companion_name(), "InnerThemeBinding");
        assert_eq!(inner.companion_path(), "app::ui::InnerThemeBinding");

        let names: Vec<_> = model.qualifying().iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["Inner"]);
    }

    #[test]
    fn test_deeply_nested_type_survives_empty_middle() {
        let desc = TypeDescription::new("app", "Outer").with_nested(
            TypeDescription::new("", "Mid").with_nested(
                TypeDescription::new("", "Inner").with_field(
                    FieldDescription::new("tint", "u32").annotated(Annotation::BindColor(1)),
                ),
            ),
        );
        let model = DeclaringType::build(&desc).unwrap();
        let qualifying = model.qualifying();
        assert_eq!(qualifying.len(), 1);
        assert_eq!(qualifying[0].qualified_name(), "app::Outer.Mid.Inner");
        assert_eq!(qualifying[0].companion_path(), "app::InnerThemeBinding");
    }
}
