//! Per-invocation migration state.
//!
//! One [`MigrationContext`] is constructed per run and threaded through
//! planning and rewriting; nothing about the current migration lives in
//! globals, so invocations cannot leak state into each other.

use crate::ast::{KtClass, KtFile};
use crate::casing::to_pascal_case;
use crate::config::{BindingStrategy, MigrationConfig};
use crate::consts::{BINDING_CLASS_SUFFIX, DATABINDING_SEGMENT};
use crate::layout::LayoutFileId;

/// The two migratable class shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Fragment,
    Activity,
}

impl ClassKind {
    /// Classify a class by inspecting its supertype list against the
    /// configured tables, resolving simple names through the file's
    /// imports. A supertype suffix of `Fragment`/`Activity` is accepted as
    /// a fallback for intermediate base classes the tables cannot know.
    pub fn classify(class: &KtClass, file: &KtFile, config: &MigrationConfig) -> Option<ClassKind> {
        for entry in &class.supertypes {
            // entries without constructor args are usually interfaces
            let simple = entry.simple_name();
            let resolved = if entry.name.contains('.') {
                entry.name.clone()
            } else {
                file.imports
                    .iter()
                    .find(|import| !import.is_wildcard && import.last_segment() == simple)
                    .map(|import| import.path.clone())
                    .unwrap_or_else(|| entry.name.clone())
            };

            if config.fragment_supertypes.iter().any(|t| *t == resolved) {
                return Some(ClassKind::Fragment);
            }
            if config.activity_supertypes.iter().any(|t| *t == resolved) {
                return Some(ClassKind::Activity);
            }
            if simple.ends_with("Fragment") {
                return Some(ClassKind::Fragment);
            }
            if simple.ends_with("Activity") {
                return Some(ClassKind::Activity);
            }
        }
        None
    }
}

/// Everything one migration run needs to know, computed once up front
pub struct MigrationContext<'a> {
    pub source: &'a str,
    pub file: &'a KtFile,
    pub class: &'a KtClass,
    pub kind: ClassKind,
    pub strategy: BindingStrategy,
    /// Base name of the root layout the binding class derives from
    pub root_layout: String,
    /// Resolved root layout file
    pub root_file: LayoutFileId,
    /// Package the binding class lives in, e.g. `com.example.databinding`
    pub binding_package: String,
}

impl<'a> MigrationContext<'a> {
    /// Simple name of the generated binding class
    pub fn binding_class(&self) -> String {
        format!("{}{}", to_pascal_case(&self.root_layout), BINDING_CLASS_SUFFIX)
    }

    /// Fully qualified name of the generated binding class
    pub fn binding_fq_name(&self) -> String {
        if self.binding_package.is_empty() {
            self.binding_class()
        } else {
            format!("{}.{}", self.binding_package, self.binding_class())
        }
    }
}

/// Package of the generated binding class: the class's resource import with
/// its trailing segment replaced by `databinding`, falling back to the
/// file's own package.
pub fn binding_package(file: &KtFile) -> String {
    let from_r_import = file
        .imports
        .iter()
        .find(|import| !import.is_wildcard && import.last_segment() == "R")
        .map(|import| import.parent_path().to_string());

    let base = match from_r_import {
        Some(parent) if !parent.is_empty() => parent,
        _ => file.package_name().to_string(),
    };

    if base.is_empty() {
        DATABINDING_SEGMENT.to_string()
    } else {
        format!("{}.{}", base, DATABINDING_SEGMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_kotlin;

    #[test]
    fn classifies_fragment_by_import() {
        let file = parse_kotlin(
            "package p\n\nimport androidx.fragment.app.Fragment\n\nclass F : Fragment() {}\n",
        )
        .expect("Failed to parse");
        let config = MigrationConfig::default();
        let class = file.first_class().expect("no class");
        assert_eq!(ClassKind::classify(class, &file, &config), Some(ClassKind::Fragment));
    }

    #[test]
    fn classifies_activity_by_suffix() {
        let file = parse_kotlin("package p\n\nclass A : BaseActivity() {}\n").expect("Failed to parse");
        let config = MigrationConfig::default();
        let class = file.first_class().expect("no class");
        assert_eq!(ClassKind::classify(class, &file, &config), Some(ClassKind::Activity));
    }

    #[test]
    fn plain_class_is_not_classified() {
        let file = parse_kotlin("package p\n\nclass C {}\n").expect("Failed to parse");
        let config = MigrationConfig::default();
        let class = file.first_class().expect("no class");
        assert_eq!(ClassKind::classify(class, &file, &config), None);
    }

    #[test]
    fn binding_package_prefers_r_import() {
        let file = parse_kotlin(
            "package p.ui\n\nimport com.example.app.R\n\nclass F : Fragment() {}\n",
        )
        .expect("Failed to parse");
        assert_eq!(binding_package(&file), "com.example.app.databinding");
    }

    #[test]
    fn binding_package_falls_back_to_file_package() {
        let file = parse_kotlin("package p.ui\n\nclass F : Fragment() {}\n").expect("Failed to parse");
        assert_eq!(binding_package(&file), "p.ui.databinding");
    }
}
