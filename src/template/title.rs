//! Page title normalization

/// Namespace used for transclusion targets without an explicit namespace
pub const TEMPLATE_NAMESPACE: &str = "Template";

/// Canonical names of the namespaces recognized as title prefixes
const NAMESPACES: &[&str] = &[
    "Media",
    "Special",
    "Talk",
    "User",
    "User talk",
    "Project",
    "Project talk",
    "File",
    "File talk",
    "MediaWiki",
    "MediaWiki talk",
    "Template",
    "Template talk",
    "Help",
    "Help talk",
    "Category",
    "Category talk",
    "Portal",
    "Module",
    "Wikipedia",
];

/// Canonicalize a title without touching its namespace
///
/// Underscores become spaces, whitespace runs collapse to a single space and
/// the first letter is upper-cased.
pub fn normalize_title(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Find the canonical spelling of a namespace name
fn canonical_namespace(name: &str) -> Option<&'static str> {
    let name = normalize_title(name);
    NAMESPACES
        .iter()
        .copied()
        .find(|ns| ns.eq_ignore_ascii_case(&name))
}

/// Resolve a possibly unqualified title into a fully qualified one
///
/// A known namespace prefix is canonicalized, a leading `:` selects the main
/// namespace, and anything else lands in `default_namespace`.
pub fn resolve_title(raw: &str, default_namespace: &str) -> String {
    let trimmed = raw.trim();
    if let Some(main) = trimmed.strip_prefix(':') {
        return normalize_title(main);
    }
    if let Some((prefix, rest)) = trimmed.split_once(':') {
        if let Some(ns) = canonical_namespace(prefix) {
            return format!("{}:{}", ns, normalize_title(rest));
        }
    }
    let name = normalize_title(trimmed);
    if name.is_empty() {
        return name;
    }
    format!("{}:{}", default_namespace, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  foo_bar   baz "), "Foo bar baz");
        assert_eq!(normalize_title("über"), "Über");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn test_default_namespace() {
        assert_eq!(resolve_title("Foo", TEMPLATE_NAMESPACE), "Template:Foo");
        assert_eq!(resolve_title(" foo ", TEMPLATE_NAMESPACE), "Template:Foo");
    }

    #[test]
    fn test_explicit_namespace_is_canonicalized() {
        assert_eq!(resolve_title("template:foo", TEMPLATE_NAMESPACE), "Template:Foo");
        assert_eq!(resolve_title("user_talk:bob", TEMPLATE_NAMESPACE), "User talk:Bob");
    }

    #[test]
    fn test_unknown_prefix_is_part_of_name() {
        assert_eq!(resolve_title("Foo:bar", TEMPLATE_NAMESPACE), "Template:Foo:bar");
    }

    #[test]
    fn test_leading_colon_selects_main_namespace() {
        assert_eq!(resolve_title(":main page", TEMPLATE_NAMESPACE), "Main page");
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(resolve_title("   ", TEMPLATE_NAMESPACE), "");
    }
}
