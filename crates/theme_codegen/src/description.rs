// Structural description of declaring types
//
// This is the build-time input: every field with its declared type and the
// annotations attached to it, plus nested declaring types. It deliberately
// knows nothing about which annotations matter; the model builder decides.

use serde::{Deserialize, Serialize};
use theme_types::ResourceId;

/// An annotation attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    /// Bind the field to a color resource
    BindColor(ResourceId),
    /// Bind the field to a drawable resource
    BindDrawable(ResourceId),
    /// Any other attribute; carried along and ignored
    Other(String),
}

/// A field of a declaring type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,
    /// Declared type as Rust source text, e.g. `Option<Color>`
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A declaring type and the types nested inside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescription {
    /// Module path of the type (`app::ui`). Ignored on nested types, which
    /// always live in their enclosing type's package.
    #[serde(default)]
    pub package: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
    #[serde(default)]
    pub nested: Vec<TypeDescription>,
}

impl TypeDescription {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            fields: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescription) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_nested(mut self, nested: TypeDescription) -> Self {
        self.nested.push(nested);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_toml() {
        let src = r#"
            package = "app::ui"
            name = "Widget"

            [[fields]]
            name = "tint"
            type = "Option<Color>"
            annotations = [{ bind_color = 100 }]

            [[fields]]
            name = "label"
            type = "String"

            [[nested]]
            name = "Badge"
            [[nested.fields]]
            name = "icon"
            type = "Reactive<Drawable>"
            annotations = [{ other = "serde" }, { bind_drawable = 7 }]
        "#;

        let desc: TypeDescription = toml::from_str(src).unwrap();
        assert_eq!(desc.package, "app::ui");
        assert_eq!(desc.fields.len(), 2);
        assert_eq!(desc.fields[0].annotations, vec![Annotation::BindColor(100)]);
        assert!(desc.fields[1].annotations.is_empty());
        assert_eq!(desc.nested[0].name, "Badge");
        assert_eq!(
            desc.nested[0].fields[0].annotations[1],
            Annotation::BindDrawable(7)
        );
    }

    #[test]
    fn test_parse_from_json() {
        let src = r#"{
            "package": "app::ui",
            "name": "Dialog",
            "fields": [
                { "name": "background", "type": "Color", "annotations": [{ "bind_color": 300 }] },
                { "name": "title", "type": "String" }
            ],
            "nested": [
                { "name": "Button", "fields": [{ "name": "fill", "type": "u32" }] }
            ]
        }"#;

        let desc: TypeDescription = serde_json::from_str(src).unwrap();
        assert_eq!(desc.name, "Dialog");
        assert_eq!(desc.fields[0].ty, "Color");
        assert_eq!(desc.fields[0].annotations, vec![Annotation::BindColor(300)]);
        assert!(desc.fields[1].annotations.is_empty());
        assert_eq!(desc.nested[0].package, "");
        assert!(desc.nested[0].nested.is_empty());
    }

    #[test]
    fn test_unknown_annotation_shape_rejected() {
        let src = r#"{ "name": "Dialog", "fields": [{ "name": "x", "type": "u32", "annotations": [{ "bind_size": 1 }] }] }"#;
        assert!(serde_json::from_str::<TypeDescription>(src).is_err());
    }
}
