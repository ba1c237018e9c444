//! Synthetic accessor resolution.
//!
//! The transformation engine treats symbol resolution as an oracle: given a
//! bare name reference it needs the declaration's property descriptor, the
//! XML attributes backing it, and the layout files those attributes live
//! in. [`SyntheticResolver`] is that contract; [`LayoutIndexResolver`] is
//! the default implementation backed by the file's synthetic imports and a
//! [`LayoutIndex`]. Tests inject their own resolver where convenient.

use crate::ast::KtFile;
use crate::consts::{SYNTHETIC_PACKAGE, SYNTHETIC_PACKAGE_PATH_LENGTH};
use crate::layout::{LayoutFileId, LayoutIndex};
use once_cell::sync::Lazy;
use std::collections::HashSet;

static SYNTHETIC_SEGMENTS: Lazy<Vec<&'static str>> =
    Lazy::new(|| SYNTHETIC_PACKAGE.split('.').collect());

/// Descriptor of a resolved synthetic accessor property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Simple name of the property (the view id)
    pub name: String,
    /// Fully qualified path segments of the accessor
    pub fq_path: Vec<String>,
}

impl PropertyDescriptor {
    pub fn from_path(path: &str) -> Self {
        let fq_path: Vec<String> = path.split('.').map(|s| s.to_string()).collect();
        let name = fq_path.last().cloned().unwrap_or_default();
        Self { name, fq_path }
    }

    pub fn fq_name(&self) -> String {
        self.fq_path.join(".")
    }
}

/// One XML attribute backing a synthetic accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttributeRef {
    /// Base name of the layout file declaring the id
    pub layout: String,
    /// Build variant of that layout file
    pub variant: String,
    /// Raw attribute value, e.g. `@+id/text_view`
    pub value: String,
}

/// Scope surrounding one name reference during discovery
pub struct ReferenceScope<'a> {
    pub file: &'a KtFile,
    /// Names shadowed at the reference site: class properties, function
    /// parameters, locals declared earlier, lambda parameters
    pub shadowed: &'a HashSet<String>,
}

/// Oracle contract consumed by the transformation engine
pub trait SyntheticResolver {
    /// Resolve a bare name reference to its accessor descriptor.
    ///
    /// `None` means the reference is an ordinary, non-layout reference:
    /// the common case, silently excluded from the synthetic set.
    fn resolve_declaration(&self, scope: &ReferenceScope<'_>, name: &str) -> Option<PropertyDescriptor>;

    /// XML attributes backing the descriptor. A descriptor with no backing
    /// attribute is not a synthetic accessor and must be excluded.
    fn candidate_xml_attributes(&self, descriptor: &PropertyDescriptor) -> Vec<XmlAttributeRef>;

    /// Layout files the descriptor's accessor path decodes to, honoring
    /// build-variant overlays. Empty when the path is not a layout accessor.
    fn layout_files_for(&self, descriptor: &PropertyDescriptor) -> Vec<LayoutFileId>;
}

/// Default resolver backed by a [`LayoutIndex`] and the file's imports
pub struct LayoutIndexResolver<'a> {
    index: &'a LayoutIndex,
}

impl<'a> LayoutIndexResolver<'a> {
    pub fn new(index: &'a LayoutIndex) -> Self {
        Self { index }
    }

    /// Decode the variant/layout segments of an accessor path and look the
    /// layout up in the matching variant overlay.
    ///
    /// The first matching variant wins, even when its lookup comes back
    /// empty; overlays are never merged or cross-validated.
    fn decode_layouts(&self, fq_path: &[String]) -> Vec<LayoutFileId> {
        if fq_path.len() <= SYNTHETIC_PACKAGE_PATH_LENGTH {
            return Vec::new();
        }
        if fq_path
            .iter()
            .zip(SYNTHETIC_SEGMENTS.iter())
            .any(|(seg, expected)| seg != expected)
        {
            return Vec::new();
        }

        for variant in self.index.variants() {
            if variant.is_main && fq_path.len() == SYNTHETIC_PACKAGE_PATH_LENGTH + 2 {
                // accessor path without a variant segment; the layout name
                // sits directly after the synthetic package
                let layout_name = &fq_path[SYNTHETIC_PACKAGE_PATH_LENGTH];
                return variant.layouts(layout_name).to_vec();
            }
            if fq_path[SYNTHETIC_PACKAGE_PATH_LENGTH] == variant.name {
                let Some(layout_name) = fq_path.get(SYNTHETIC_PACKAGE_PATH_LENGTH + 1) else {
                    return Vec::new();
                };
                return variant.layouts(layout_name).to_vec();
            }
        }

        Vec::new()
    }

    /// Accessor paths a name could resolve to through the file's imports
    fn candidate_paths(&self, file: &KtFile, name: &str) -> Vec<String> {
        let prefix = format!("{}.", SYNTHETIC_PACKAGE);
        let mut paths = Vec::new();
        for import in &file.imports {
            if !import.path.starts_with(&prefix) {
                continue;
            }
            if import.is_wildcard {
                paths.push(format!("{}.{}", import.path, name));
            } else if import.last_segment() == name {
                paths.push(import.path.clone());
            }
        }
        paths
    }
}

impl<'a> SyntheticResolver for LayoutIndexResolver<'a> {
    fn resolve_declaration(&self, scope: &ReferenceScope<'_>, name: &str) -> Option<PropertyDescriptor> {
        if scope.shadowed.contains(name) {
            return None;
        }
        let candidates = self.candidate_paths(scope.file, name);
        // prefer the import whose layout actually declares the id
        candidates
            .iter()
            .map(|path| PropertyDescriptor::from_path(path))
            .find(|descriptor| !self.candidate_xml_attributes(descriptor).is_empty())
            .or_else(|| candidates.first().map(|path| PropertyDescriptor::from_path(path)))
    }

    fn candidate_xml_attributes(&self, descriptor: &PropertyDescriptor) -> Vec<XmlAttributeRef> {
        let mut attributes = Vec::new();
        for id in self.decode_layouts(&descriptor.fq_path) {
            let file = self.index.file(id);
            if let Some(value) = file.id_attribute_value(&descriptor.name) {
                attributes.push(XmlAttributeRef {
                    layout: file.name.clone(),
                    variant: file.variant.clone(),
                    value,
                });
            }
        }
        attributes
    }

    fn layout_files_for(&self, descriptor: &PropertyDescriptor) -> Vec<LayoutFileId> {
        self.decode_layouts(&descriptor.fq_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_kotlin;

    const LAYOUT: &str = r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <TextView android:id="@+id/text_view" />
</LinearLayout>
"#;

    fn index() -> LayoutIndex {
        let mut index = LayoutIndex::new();
        index.add_layout("main", "fragment_main", LAYOUT).expect("Failed to add layout");
        index
    }

    fn file_with_import(import: &str) -> KtFile {
        parse_kotlin(&format!("package com.example\n\nimport {}\n\nclass C : Fragment()\n", import))
            .expect("Failed to parse")
    }

    #[test]
    fn resolves_through_star_import() {
        let index = index();
        let resolver = LayoutIndexResolver::new(&index);
        let file = file_with_import("kotlinx.android.synthetic.main.fragment_main.*");
        let shadowed = HashSet::new();
        let scope = ReferenceScope { file: &file, shadowed: &shadowed };

        let descriptor = resolver
            .resolve_declaration(&scope, "text_view")
            .expect("should resolve");
        assert_eq!(descriptor.name, "text_view");
        assert_eq!(resolver.candidate_xml_attributes(&descriptor).len(), 1);
        assert_eq!(resolver.layout_files_for(&descriptor).len(), 1);
    }

    #[test]
    fn shadowed_name_does_not_resolve() {
        let index = index();
        let resolver = LayoutIndexResolver::new(&index);
        let file = file_with_import("kotlinx.android.synthetic.main.fragment_main.*");
        let mut shadowed = HashSet::new();
        shadowed.insert("text_view".to_string());
        let scope = ReferenceScope { file: &file, shadowed: &shadowed };

        assert!(resolver.resolve_declaration(&scope, "text_view").is_none());
    }

    #[test]
    fn short_path_is_not_a_layout_accessor() {
        let index = index();
        let resolver = LayoutIndexResolver::new(&index);
        let descriptor = PropertyDescriptor::from_path("kotlinx.android.synthetic");
        assert!(resolver.layout_files_for(&descriptor).is_empty());
    }

    #[test]
    fn unbacked_id_yields_no_attributes() {
        let index = index();
        let resolver = LayoutIndexResolver::new(&index);
        let descriptor =
            PropertyDescriptor::from_path("kotlinx.android.synthetic.main.fragment_main.missing_view");
        assert!(resolver.candidate_xml_attributes(&descriptor).is_empty());
        // the path still decodes to the layout file
        assert_eq!(resolver.layout_files_for(&descriptor).len(), 1);
    }

    #[test]
    fn variantless_path_uses_main_overlay() {
        let index = index();
        let resolver = LayoutIndexResolver::new(&index);
        let descriptor = PropertyDescriptor::from_path("kotlinx.android.synthetic.fragment_main.text_view");
        assert_eq!(resolver.layout_files_for(&descriptor).len(), 1);
    }

    #[test]
    fn first_matching_variant_wins() {
        let mut index = LayoutIndex::new();
        index.add_layout("pro", "fragment_main", LAYOUT).expect("Failed to add layout");
        index.add_layout("main", "fragment_main", LAYOUT).expect("Failed to add layout");
        let resolver = LayoutIndexResolver::new(&index);

        let descriptor =
            PropertyDescriptor::from_path("kotlinx.android.synthetic.pro.fragment_main.text_view");
        let files = resolver.layout_files_for(&descriptor);
        assert_eq!(files.len(), 1);
        assert_eq!(index.file(files[0]).variant, "pro");
    }
}
