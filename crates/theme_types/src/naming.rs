//! Companion naming
//!
//! Qualified type names use `::` between module segments and `.` between
//! nesting levels, e.g. `app::ui::Outer.Inner`. A companion is named after
//! the innermost simple name and lives in the package of the outermost type:
//! `app::ui::Outer.Inner` → `app::ui::InnerThemeBinding`.
//!
//! Flattening means `app::ui::A.Item` and `app::ui::B.Item` both map to
//! `app::ui::ItemThemeBinding`. Nothing here tries to disambiguate them.

/// Suffix appended to a declaring type's simple name.
pub const COMPANION_SUFFIX: &str = "ThemeBinding";

/// Separator between module path segments.
pub const MODULE_SEPARATOR: &str = "::";

/// Separator between nesting levels of a declaring type.
pub const NESTING_SEPARATOR: char = '.';

/// Build a qualified name from a package, the enclosing type chain
/// (outermost first) and the simple name.
pub fn qualified_name(package: &str, enclosing: &[&str], simple: &str) -> String {
    let mut nesting = enclosing.join(".");
    if !nesting.is_empty() {
        nesting.push(NESTING_SEPARATOR);
    }
    nesting.push_str(simple);

    if package.is_empty() {
        nesting
    } else {
        format!("{package}{MODULE_SEPARATOR}{nesting}")
    }
}

/// Package part of a qualified name (empty for a bare type name).
pub fn package_of(qualified: &str) -> &str {
    qualified
        .rfind(MODULE_SEPARATOR)
        .map(|idx| &qualified[..idx])
        .unwrap_or("")
}

/// Innermost simple name of a qualified name.
pub fn simple_name(qualified: &str) -> &str {
    let type_part = qualified
        .rfind(MODULE_SEPARATOR)
        .map(|idx| &qualified[idx + MODULE_SEPARATOR.len()..])
        .unwrap_or(qualified);
    type_part
        .rsplit(NESTING_SEPARATOR)
        .next()
        .unwrap_or(type_part)
}

/// Companion type name for a simple name (`Widget` → `WidgetThemeBinding`).
pub fn companion_name(simple: &str) -> String {
    format!("{simple}{COMPANION_SUFFIX}")
}

/// Fully qualified, flattened companion path for a declaring type.
pub fn companion_path(qualified: &str) -> String {
    let package = package_of(qualified);
    let companion = companion_name(simple_name(qualified));
    if package.is_empty() {
        companion
    } else {
        format!("{package}{MODULE_SEPARATOR}{companion}")
    }
}

/// File stem used when a companion is written to disk
/// (`WidgetThemeBinding` → `widget_theme_binding`).
pub fn companion_file_stem(simple: &str) -> String {
    to_snake_case(&companion_name(simple))
}

fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
