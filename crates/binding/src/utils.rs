//! Helpers for qualified names and namespace attributes.

/// Attribute carrying schema locations on a document root.
///
/// The reader drops it; exporters rebuild it from the namespace set in use.
pub const SCHEMA_LOCATION_ATTRIBUTE: &str = "xsi:schemaLocation";

/// Splits `prefix:local` into its parts. Unprefixed names yield `None`.
pub fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Joins a prefix and a local name. An empty prefix leaves the name unqualified.
pub fn qualify(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Recognizes namespace declarations.
///
/// Returns the declared prefix (`""` for a default namespace) when `key`
/// is `xmlns` or `xmlns:<prefix>`.
pub fn namespace_declaration(key: &str) -> Option<&str> {
    if key == "xmlns" {
        Some("")
    } else {
        key.strip_prefix("xmlns:")
    }
}

/// Resolves an entity or character reference name (without `&` and `;`).
pub fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    quick_xml::escape::resolve_predefined_entity(name).map(str::to_string)
}
