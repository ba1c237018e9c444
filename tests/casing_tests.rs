use bindmig::casing::{to_camel_case, to_pascal_case};

#[test]
fn pascal_case_table() {
    assert_eq!(to_pascal_case("my_layout"), "MyLayout");
    assert_eq!(to_pascal_case("layout"), "Layout");
    assert_eq!(to_pascal_case(""), "");
    assert_eq!(to_pascal_case("fragment_main"), "FragmentMain");
    assert_eq!(to_pascal_case("activity_main"), "ActivityMain");
}

#[test]
fn camel_case_table() {
    assert_eq!(to_camel_case("my_view_id"), "myViewId");
    assert_eq!(to_camel_case("id"), "id");
    assert_eq!(to_camel_case("text_view"), "textView");
    assert_eq!(to_camel_case("header_view"), "headerView");
}

#[test]
fn camel_case_single_segment_keeps_original_casing() {
    assert_eq!(to_camel_case("textView"), "textView");
    assert_eq!(to_camel_case("TextView"), "TextView");
}

#[test]
fn empty_segments_are_dropped() {
    assert_eq!(to_pascal_case("my__layout"), "MyLayout");
    assert_eq!(to_pascal_case("_leading"), "Leading");
    assert_eq!(to_pascal_case("trailing_"), "Trailing");
    assert_eq!(to_camel_case("a__b"), "aB");
}
