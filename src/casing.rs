//! Name casing transforms between layout resource names and Kotlin names.
//!
//! Layout files and view ids use snake_case; the generated binding classes
//! and their fields use PascalCase and camelCase respectively.

/// Convert a snake_case resource name to a PascalCase type name.
///
/// `my_layout` becomes `MyLayout`. A single segment is capitalized as-is.
/// Empty segments produced by leading, trailing or doubled underscores are
/// dropped rather than capitalized.
pub fn to_pascal_case(s: &str) -> String {
    let split: Vec<&str> = s.split('_').collect();
    if split.len() == 1 {
        return capitalize(split[0]);
    }
    join_pascal(&split)
}

/// Convert a snake_case id to a camelCase property name.
///
/// `my_view_id` becomes `myViewId`. A single segment is returned unchanged
/// because the original casing of a variable name is preserved.
pub fn to_camel_case(s: &str) -> String {
    let split: Vec<&str> = s.split('_').collect();
    if split.len() == 1 {
        return split[0].to_string();
    }
    let mut out = String::from(split[0]);
    out.push_str(&join_pascal(&split[1..]));
    out
}

fn join_pascal(segments: &[&str]) -> String {
    // An empty segment list cannot arise from splitting; hitting this is a
    // caller logic defect, not a recoverable condition.
    assert!(!segments.is_empty(), "invalid section size, cannot be zero");
    segments.iter().map(|s| capitalize(s)).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_splits_on_underscore() {
        assert_eq!(to_pascal_case("my_layout"), "MyLayout");
        assert_eq!(to_pascal_case("fragment_main"), "FragmentMain");
    }

    #[test]
    fn pascal_case_single_segment() {
        assert_eq!(to_pascal_case("layout"), "Layout");
    }

    #[test]
    fn pascal_case_empty_input() {
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn pascal_case_drops_empty_segments() {
        assert_eq!(to_pascal_case("my__layout"), "MyLayout");
        assert_eq!(to_pascal_case("_my_layout_"), "MyLayout");
    }

    #[test]
    fn camel_case_keeps_first_segment() {
        assert_eq!(to_camel_case("my_view_id"), "myViewId");
        assert_eq!(to_camel_case("text_view"), "textView");
    }

    #[test]
    fn camel_case_single_segment_unchanged() {
        assert_eq!(to_camel_case("id"), "id");
        assert_eq!(to_camel_case("textView"), "textView");
    }
}
