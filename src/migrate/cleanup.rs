//! Post-rewrite cleanup: dead synthetic imports, reference shortening and
//! a conservative reformat.
//!
//! Shortening and reformatting stand in for the host's dedicated passes.
//! Their contract is small on purpose: reduce the fully qualified binding
//! type to its simple name plus one import, and normalize whitespace
//! without restructuring anything.

use super::edits::EditSet;
use super::plan::{line_end, line_start};
use crate::ast::{AstNode, KtFile};
use crate::consts::SYNTHETIC_MAIN_IMPORT;

/// Queue deletion of every import of the deprecated synthetic-accessor
/// package. Returns the number of imports removed.
pub fn remove_synthetic_imports(file: &KtFile, source: &str, edits: &mut EditSet) -> usize {
    let mut removed = 0;
    for import in &file.imports {
        let text = import.span().source_text(source);
        if text.contains(SYNTHETIC_MAIN_IMPORT) {
            let start = line_start(source, import.span().start.offset);
            let mut end = line_end(source, import.span().end.offset);
            if end < source.len() {
                end += 1;
            }
            edits.delete(start, end);
            removed += 1;
        }
    }
    log::debug!("cleanup: removed {} synthetic imports", removed);
    removed
}

/// Replace fully qualified uses of the binding class with its simple name
/// and add the single import that makes them resolve. Import lines are left
/// alone so an already-shortened file passes through unchanged.
pub fn shorten_references(source: String, binding_fq: &str, binding_simple: &str) -> String {
    let mut shortened = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        if line.trim_start().starts_with("import ") {
            shortened.push_str(line);
        } else {
            shortened.push_str(&line.replace(binding_fq, binding_simple));
        }
    }
    insert_import(shortened, binding_fq)
}

fn insert_import(source: String, import_path: &str) -> String {
    let import_line = format!("import {}", import_path);
    if source.lines().any(|line| line.trim() == import_line) {
        return source;
    }

    let mut insert_at = None;
    let mut package_end = None;
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("import ") {
            insert_at = Some(offset + line.len());
        } else if trimmed.starts_with("package ") {
            package_end = Some(offset + line.len());
        }
        offset += line.len();
    }

    let mut out = source;
    match insert_at {
        Some(position) => {
            out.insert_str(position, &format!("{}\n", import_line));
        }
        None => {
            let position = package_end.unwrap_or(0);
            let text = if position == 0 {
                format!("{}\n\n", import_line)
            } else {
                format!("\n{}\n", import_line)
            };
            out.insert_str(position, &text);
        }
    }
    out
}

/// Normalize whitespace: strip trailing spaces, collapse runs of blank
/// lines, end with exactly one newline.
pub fn reformat(source: String) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = 0usize;
    for line in source.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_and_imports() {
        let source = "package p\n\nimport com.example.R\n\nclass F {\n    private lateinit var binding: com.example.databinding.MainBinding\n}\n"
            .to_string();
        let out = shorten_references(source, "com.example.databinding.MainBinding", "MainBinding");
        assert!(out.contains("var binding: MainBinding"));
        assert!(out.contains("import com.example.databinding.MainBinding\n"));
        assert!(!out.contains("binding: com.example.databinding"));
    }

    #[test]
    fn import_added_after_package_when_no_imports() {
        let source = "package p\n\nclass F\n".to_string();
        let out = insert_import(source, "p.databinding.MainBinding");
        assert!(out.starts_with("package p\n\nimport p.databinding.MainBinding\n"));
    }

    #[test]
    fn import_not_duplicated() {
        let source = "import p.databinding.MainBinding\n".to_string();
        let out = insert_import(source, "p.databinding.MainBinding");
        assert_eq!(out.matches("import p.databinding.MainBinding").count(), 1);
    }

    #[test]
    fn reformat_normalizes_whitespace() {
        let source = "class F {   \n\n\n\n    val x = 1\n}\n\n\n".to_string();
        let out = reformat(source);
        assert_eq!(out, "class F {\n\n    val x = 1\n}\n");
    }
}
