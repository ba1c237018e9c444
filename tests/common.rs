// Common test utilities

use bindmig::{LayoutIndex, Migrated, MigrationConfig, MigrationOutcome};

pub const FRAGMENT_MAIN_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android"
    android:orientation="vertical">

    <TextView android:id="@+id/text_view" />

    <Button android:id="@+id/submit_button" />

    <TextView android:id="@+id/status_label" />
</LinearLayout>
"#;

pub const ACTIVITY_MAIN_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android"
    android:orientation="vertical">

    <include layout="@layout/header" />

    <Button android:id="@+id/submit_button" />
</LinearLayout>
"#;

pub const HEADER_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <TextView android:id="@+id/header_title" />
</LinearLayout>
"#;

/// Build an in-memory layout index from (variant, name, markup) triples
pub fn index_with(layouts: &[(&str, &str, &str)]) -> LayoutIndex {
    let mut index = LayoutIndex::new();
    for (variant, name, source) in layouts {
        index
            .add_layout(variant, name, source)
            .expect("Failed to add layout");
    }
    index
}

/// Run a migration that is expected to rewrite the class
pub fn migrate(source: &str, index: &mut LayoutIndex, config: &MigrationConfig) -> Migrated {
    match bindmig::migrate_source(source, index, config).expect("Failed to migrate") {
        MigrationOutcome::Migrated(migrated) => migrated,
        MigrationOutcome::NothingToMigrate => panic!("expected a migration, got a no-op"),
    }
}

/// Assert that `earlier` appears before `later` in the text
pub fn assert_ordered(text: &str, earlier: &str, later: &str) {
    let a = text
        .find(earlier)
        .unwrap_or_else(|| panic!("missing {:?} in:\n{}", earlier, text));
    let b = text
        .find(later)
        .unwrap_or_else(|| panic!("missing {:?} in:\n{}", later, text));
    assert!(a < b, "{:?} should precede {:?} in:\n{}", earlier, later, text);
}
