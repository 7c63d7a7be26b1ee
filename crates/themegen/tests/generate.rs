use std::fs;

use tempfile::TempDir;
use themegen::{generate, ManifestError};

const MANIFEST: &str = r#"
output = "generated"

[[types]]
package = "app::ui"
name = "Widget"
fields = [
    { name = "tint", type = "Option<Color>", annotations = [{ bind_color = 100 }] },
    { name = "icon", type = "Reactive<Drawable>", annotations = [{ bind_drawable = 200 }] },
    { name = "label", type = "String", annotations = [{ other = "serde" }] },
]

[[types.nested]]
name = "Badge"
fields = [{ name = "fill", type = "u32", annotations = [{ bind_color = 101 }] }]

[[types]]
package = "app::ui"
name = "Spacer"
fields = [{ name = "width", type = "u32" }]
"#;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("themegen.toml"), MANIFEST).unwrap();
    dir
}

#[test]
fn test_generates_one_file_per_bound_type() {
    let dir = project();
    let report = generate(&dir.path().join("themegen.toml"), None, false).unwrap();

    assert!(report.is_success());
    assert_eq!(report.written.len(), 2);

    let out = dir.path().join("generated/app/ui");
    let widget = fs::read_to_string(out.join("widget_theme_binding.rs")).unwrap();
    assert!(widget.starts_with("// @generated by themegen for `app::ui::Widget`."));
    assert!(widget.contains("struct WidgetThemeBinding"));

    // Nested types are flattened into the outer type's package
    let badge = fs::read_to_string(out.join("badge_theme_binding.rs")).unwrap();
    assert!(badge.contains("`app::ui::Widget.Badge`"));
    assert!(badge.contains("struct BadgeThemeBinding"));

    assert!(!out.join("spacer_theme_binding.rs").exists());
}

#[test]
fn test_regeneration_is_byte_identical() {
    let dir = project();
    let manifest = dir.path().join("themegen.toml");
    let file = dir.path().join("generated/app/ui/widget_theme_binding.rs");

    generate(&manifest, None, false).unwrap();
    let first = fs::read(&file).unwrap();
    generate(&manifest, None, false).unwrap();
    assert_eq!(first, fs::read(&file).unwrap());
}

#[test]
fn test_out_override_and_dry_run() {
    let dir = project();
    let out = dir.path().join("elsewhere");

    let report = generate(&dir.path().join("themegen.toml"), Some(&out), true).unwrap();
    assert_eq!(report.written.len(), 2);
    assert!(report.written[0].path.starts_with(&out));
    assert!(!out.exists());
    assert!(!dir.path().join("generated").exists());
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let err = generate(&dir.path().join("themegen.toml"), None, false).unwrap_err();
    assert!(matches!(err, ManifestError::NotFound(_)));
}
