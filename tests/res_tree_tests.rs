mod common;

use bindmig::{LayoutIndex, MigrationConfig, MigrationOutcome};
use common::FRAGMENT_MAIN_XML;
use std::fs;
use std::path::PathBuf;

/// Materialize a `src/<variant>/res/layout/…` tree under the target temp dir
fn write_res_tree(tag: &str, layouts: &[(&str, &str, &str)]) -> PathBuf {
    let root = std::env::temp_dir().join(format!("bindmig-res-{}-{}", tag, std::process::id()));
    if root.exists() {
        fs::remove_dir_all(&root).expect("Failed to clear temp res tree");
    }
    for (variant, name, source) in layouts {
        let dir = root.join(variant).join("res").join("layout");
        fs::create_dir_all(&dir).expect("Failed to create layout dir");
        fs::write(dir.join(format!("{}.xml", name)), source).expect("Failed to write layout");
    }
    root
}

#[test]
fn loads_layouts_from_src_tree() {
    let root = write_res_tree(
        "load",
        &[
            ("main", "fragment_main", FRAGMENT_MAIN_XML),
            ("pro", "fragment_main", FRAGMENT_MAIN_XML),
        ],
    );

    let index = LayoutIndex::load_src_tree(&root).expect("Failed to load res tree");
    assert!(index.variants()[0].is_main);
    assert_eq!(index.variants().len(), 2);
    assert_eq!(index.variants()[0].layouts("fragment_main").len(), 1);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn migrate_with_res_tree_end_to_end() {
    let root = write_res_tree("e2e", &[("main", "fragment_main", FRAGMENT_MAIN_XML)]);

    let source = r#"package com.example.app

import android.view.View
import androidx.fragment.app.Fragment
import com.example.app.R
import kotlinx.android.synthetic.main.fragment_main.*

class MainFragment : Fragment(R.layout.fragment_main) {

    override fun onViewCreated(view: View, savedInstanceState: Bundle?) {
        super.onViewCreated(view, savedInstanceState)
        text_view.text = "hello"
    }
}
"#;
    let outcome = bindmig::migrate_with_res_tree(source, &root, &MigrationConfig::default())
        .expect("Failed to migrate");
    let MigrationOutcome::Migrated(migrated) = outcome else {
        panic!("expected a migration, got a no-op");
    };
    assert!(migrated.source.contains("binding.textView.text"));

    fs::remove_dir_all(&root).ok();
}
