mod common;

use bindmig::{MigrationConfig, MigrationOutcome};
use common::*;

const FRAGMENT_SOURCE: &str = r#"package com.example.app

import android.os.Bundle
import android.view.View
import androidx.fragment.app.Fragment
import com.example.app.R
import kotlinx.android.synthetic.main.fragment_main.*

class MainFragment : Fragment(R.layout.fragment_main) {

    override fun onViewCreated(view: View, savedInstanceState: Bundle?) {
        super.onViewCreated(view, savedInstanceState)
        text_view.text = "hello"
        submit_button.setOnClickListener {
            text_view.visibility = View.GONE
        }
    }
}
"#;

#[test]
fn fragment_not_null_migration_adds_binding_pair() {
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(FRAGMENT_SOURCE, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert_eq!(migrated.binding_class, "FragmentMainBinding");
    assert_eq!(migrated.root_layout, "fragment_main");

    assert!(out.contains("private var _binding: FragmentMainBinding? = null"), "missing backing field:\n{}", out);
    assert!(out.contains("private val binding: FragmentMainBinding"), "missing getter property:\n{}", out);
    assert!(out.contains("get() = _binding!!"), "missing getter body:\n{}", out);
    assert!(out.contains("import com.example.app.databinding.FragmentMainBinding"), "missing import:\n{}", out);
}

#[test]
fn fragment_initializer_is_first_statement_of_on_view_created() {
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(FRAGMENT_SOURCE, &mut index, &MigrationConfig::default());

    assert_ordered(
        &migrated.source,
        "_binding = FragmentMainBinding.bind(view)",
        "super.onViewCreated(view, savedInstanceState)",
    );
}

#[test]
fn fragment_rewrites_every_synthetic_reference() {
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(FRAGMENT_SOURCE, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert_eq!(migrated.rewritten_references, 3);
    assert!(out.contains("binding.textView.text = \"hello\""), "bad rewrite:\n{}", out);
    assert!(out.contains("binding.submitButton.setOnClickListener"), "bad rewrite:\n{}", out);
    assert!(out.contains("binding.textView.visibility = View.GONE"), "bad rewrite:\n{}", out);
    assert!(!out.contains("text_view"), "synthetic reference left behind:\n{}", out);
    assert!(!out.contains("submit_button"), "synthetic reference left behind:\n{}", out);
}

#[test]
fn fragment_synthesizes_on_destroy_view() {
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(FRAGMENT_SOURCE, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert!(out.contains("override fun onDestroyView()"), "missing teardown override:\n{}", out);
    assert_ordered(out, "super.onDestroyView()", "_binding = null");
}

#[test]
fn fragment_removes_synthetic_imports() {
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(FRAGMENT_SOURCE, &mut index, &MigrationConfig::default());

    assert!(!migrated.source.contains("kotlinx.android.synthetic"));
    // unrelated imports survive
    assert!(migrated.source.contains("import com.example.app.R"));
}

#[test]
fn existing_on_destroy_view_gets_null_assignment_first() {
    let source = r#"package com.example.app

import android.os.Bundle
import android.view.View
import androidx.fragment.app.Fragment
import com.example.app.R
import kotlinx.android.synthetic.main.fragment_main.*

class MainFragment : Fragment(R.layout.fragment_main) {

    private var counter: Int = 0

    override fun onViewCreated(view: View, savedInstanceState: Bundle?) {
        super.onViewCreated(view, savedInstanceState)
        text_view.text = "hello"
    }

    override fun onDestroyView() {
        counter = 0
        super.onDestroyView()
    }
}
"#;
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(source, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    assert_ordered(out, "_binding = null", "counter = 0");
    assert_ordered(out, "counter = 0", "super.onDestroyView()");
    // exactly one onDestroyView, no synthesized duplicate
    assert_eq!(out.matches("fun onDestroyView()").count(), 1);
    // binding declaration lands after the last existing property
    assert_ordered(out, "private var counter: Int = 0", "private var _binding: FragmentMainBinding? = null");
}

#[test]
fn nullable_strategy_propagates_safe_calls_through_chains() {
    let source = r#"package com.example.app

import android.os.Bundle
import android.view.View
import androidx.fragment.app.Fragment
import com.example.app.R
import kotlinx.android.synthetic.main.fragment_main.*

class MainFragment : Fragment(R.layout.fragment_main) {

    override fun onViewCreated(view: View, savedInstanceState: Bundle?) {
        super.onViewCreated(view, savedInstanceState)
        text_view.text = "ready"
        submit_button.setOnClickListener {
            text_view.visibility = View.GONE
        }
        toggle(status_label)
    }

    fun toggle(view: View?) {
    }
}
"#;
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(source, &mut index, &MigrationConfig::nullable());
    let out = &migrated.source;

    assert!(out.contains("private var binding: FragmentMainBinding? = null"), "missing nullable property:\n{}", out);
    assert!(!out.contains("_binding"), "nullable mode must not add a backing field:\n{}", out);
    assert!(out.contains("binding = FragmentMainBinding.bind(view)"), "missing initializer:\n{}", out);
    assert!(out.contains("binding?.textView?.text = \"ready\""), "chain not null-safe:\n{}", out);
    assert!(out.contains("binding?.submitButton?.setOnClickListener"), "chain not null-safe:\n{}", out);
    assert!(out.contains("binding?.textView?.visibility = View.GONE"), "nested chain not null-safe:\n{}", out);
    assert!(out.contains("toggle(binding?.statusLabel)"), "bare reference not rewritten:\n{}", out);
    assert!(out.contains("binding = null"), "missing teardown:\n{}", out);
}

#[test]
fn shadowed_names_are_left_alone() {
    let source = r#"package com.example.app

import android.view.View
import androidx.fragment.app.Fragment
import com.example.app.R
import kotlinx.android.synthetic.main.fragment_main.*

class MainFragment : Fragment(R.layout.fragment_main) {

    fun update(text_view: View) {
        text_view.requestFocus()
        submit_button.isEnabled = true
    }

    override fun onViewCreated(view: View, savedInstanceState: Bundle?) {
        super.onViewCreated(view, savedInstanceState)
        val status_label = findCachedLabel()
        status_label.refresh()
        text_view.text = "x"
    }
}
"#;
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let migrated = migrate(source, &mut index, &MigrationConfig::default());
    let out = &migrated.source;

    // the parameter and the local shadow their synthetic namesakes
    assert!(out.contains("text_view.requestFocus()"), "shadowed parameter was rewritten:\n{}", out);
    assert!(out.contains("status_label.refresh()"), "shadowed local was rewritten:\n{}", out);
    // unshadowed references still migrate
    assert!(out.contains("binding.submitButton.isEnabled = true"), "missing rewrite:\n{}", out);
    assert!(out.contains("binding.textView.text = \"x\""), "missing rewrite:\n{}", out);
}

#[test]
fn no_synthetic_references_is_a_no_op() {
    let source = r#"package com.example.app

import androidx.fragment.app.Fragment

class PlainFragment : Fragment() {

    fun greet(): String {
        return "hello"
    }
}
"#;
    let mut index = index_with(&[("main", "fragment_main", FRAGMENT_MAIN_XML)]);
    let outcome = bindmig::migrate_source(source, &mut index, &MigrationConfig::default())
        .expect("Failed to migrate");
    assert!(matches!(outcome, MigrationOutcome::NothingToMigrate));
}

#[test]
fn availability_check() {
    let config = MigrationConfig::default();
    assert!(bindmig::is_available(FRAGMENT_SOURCE, &config));
    // no imports at all
    assert!(!bindmig::is_available("package p\n\nclass C : Fragment()\n", &config));
    // not a fragment or activity
    assert!(!bindmig::is_available(
        "package p\n\nimport a.b.C\n\nclass D : C()\n",
        &config
    ));
}
