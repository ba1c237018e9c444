mod common;

use bindmig::MigrationConfig;
use common::*;

const ACTIVITY_SOURCE: &str = r#"package com.example.app

import android.os.Bundle
import androidx.appcompat.app.AppCompatActivity
import com.example.app.R
import kotlinx.android.synthetic.main.activity_main.*

class MainActivity : AppCompatActivity() {

    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
        setContentView(R.layout.activity_main)
        submit_button.setOnClickListener {
            finish()
        }
    }
}
"#;

const PLAIN_ACTIVITY_MAIN_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <Button android:id="@+id/submit_button" />
</LinearLayout>
"#;

#[test]
fn activity_migration_inflates_before_set_content_view() {
    let mut index = index_with(&[("main", "activity_main", PLAIN_ACTIVITY_MAIN_XML)]);
    let migrated = migrate(ACTIVITY_SOURCE, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert_eq!(migrated.binding_class, "ActivityMainBinding");
    assert!(out.contains("private lateinit var binding: ActivityMainBinding"), "missing binding field:\n{}", out);
    assert_ordered(
        out,
        "binding = ActivityMainBinding.inflate(layoutInflater)",
        "setContentView(binding.root)",
    );
    assert!(!out.contains("R.layout.activity_main"), "old content view argument left behind:\n{}", out);
    assert!(out.contains("import com.example.app.databinding.ActivityMainBinding"), "missing import:\n{}", out);
}

#[test]
fn activity_rewrites_references_without_safe_calls() {
    let mut index = index_with(&[("main", "activity_main", PLAIN_ACTIVITY_MAIN_XML)]);
    let migrated = migrate(ACTIVITY_SOURCE, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert!(out.contains("binding.submitButton.setOnClickListener"), "bad rewrite:\n{}", out);
    assert!(!out.contains("submit_button"), "synthetic reference left behind:\n{}", out);
    assert!(!out.contains("binding?."), "activity rewrites must not use safe calls:\n{}", out);
    assert!(!out.contains("kotlinx.android.synthetic"), "dead import left behind:\n{}", out);
}

#[test]
fn activity_has_no_teardown() {
    let mut index = index_with(&[("main", "activity_main", PLAIN_ACTIVITY_MAIN_XML)]);
    let migrated = migrate(ACTIVITY_SOURCE, &mut index, &MigrationConfig::default());

    assert!(!migrated.source.contains("onDestroyView"));
    assert!(!migrated.source.contains("binding = null"));
}

const INCLUDE_ACTIVITY_SOURCE: &str = r#"package com.example.app

import android.os.Bundle
import androidx.appcompat.app.AppCompatActivity
import com.example.app.R
import kotlinx.android.synthetic.main.activity_main.*
import kotlinx.android.synthetic.main.header.*

class MainActivity : AppCompatActivity() {

    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
        setContentView(R.layout.activity_main)
        header_title.text = "Welcome"
        submit_button.setOnClickListener {
            finish()
        }
    }
}
"#;

#[test]
fn included_layout_reference_goes_through_include_field() {
    let mut index = index_with(&[
        ("main", "activity_main", ACTIVITY_MAIN_XML),
        ("main", "header", HEADER_XML),
    ]);
    let migrated = migrate(INCLUDE_ACTIVITY_SOURCE, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert!(out.contains("binding.headerView.headerTitle.text = \"Welcome\""), "missing include indirection:\n{}", out);
    assert!(out.contains("binding.submitButton.setOnClickListener"), "root-layout rewrite broken:\n{}", out);
}

#[test]
fn include_without_id_gets_one_synthesized() {
    let mut index = index_with(&[
        ("main", "activity_main", ACTIVITY_MAIN_XML),
        ("main", "header", HEADER_XML),
    ]);
    migrate(INCLUDE_ACTIVITY_SOURCE, &mut index, &MigrationConfig::default());

    let root_id = index.variants()[0].layouts("activity_main")[0];
    let xml = index.file(root_id).to_xml().expect("Failed to serialize layout");
    assert!(
        xml.contains("android:id=\"@+id/header_view\""),
        "missing synthesized include id:\n{}",
        xml
    );
}

#[test]
fn include_with_existing_id_is_reused() {
    let root_xml = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <include layout="@layout/header" android:id="@+id/top_bar" />
    <Button android:id="@+id/submit_button" />
</LinearLayout>
"#;
    let mut index = index_with(&[
        ("main", "activity_main", root_xml),
        ("main", "header", HEADER_XML),
    ]);
    let migrated = migrate(INCLUDE_ACTIVITY_SOURCE, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert!(out.contains("binding.topBar.headerTitle.text = \"Welcome\""), "existing id not reused:\n{}", out);

    let root_id = index.variants()[0].layouts("activity_main")[0];
    let xml = index.file(root_id).to_xml().expect("Failed to serialize layout");
    assert!(!xml.contains("header_view"), "id should not be synthesized when one exists:\n{}", xml);
}

#[test]
fn correlation_can_be_disabled() {
    let mut index = index_with(&[
        ("main", "activity_main", ACTIVITY_MAIN_XML),
        ("main", "header", HEADER_XML),
    ]);
    let config = MigrationConfig {
        correlate_includes: false,
        ..MigrationConfig::default()
    };
    let migrated = migrate(INCLUDE_ACTIVITY_SOURCE, &mut index, &config);
    let out = &migrated.source;

    // without correlation the reference is rewritten flat
    assert!(out.contains("binding.headerTitle.text = \"Welcome\""), "unexpected indirection:\n{}", out);

    let root_id = index.variants()[0].layouts("activity_main")[0];
    let xml = index.file(root_id).to_xml().expect("Failed to serialize layout");
    assert!(!xml.contains("header_view"), "layout mutated with correlation disabled:\n{}", xml);
}
