//! Layout XML model and build-variant overlay index.
//!
//! Android layouts live in per-variant resource trees
//! (`src/<variant>/res/layout*/<name>.xml`). A logical layout name may be
//! declared by several files across variants; overlay resolution in
//! [`crate::resolve`] picks one per variant per synthetic path length.

pub mod walker;

pub use walker::{walk_includes, IncludeCandidate, IncludeSighting};

use crate::consts::{ANDROID_NAMESPACE, ID_ATTRIBUTE, MAIN_VARIANT, NEW_ID_PREFIX};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use xot::Xot;

/// Identifier of a layout file within a [`LayoutIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutFileId(usize);

/// One parsed layout markup file
pub struct LayoutFile {
    /// Base file name without extension, the layout's logical identity
    pub name: String,
    /// Build variant the file belongs to
    pub variant: String,
    /// Path the file was loaded from, absent for in-memory layouts
    pub path: Option<PathBuf>,
    pub xot: Xot,
    pub document: xot::Node,
}

impl LayoutFile {
    /// Parse layout markup into a mutable XML tree
    pub fn parse(name: &str, variant: &str, source: &str) -> Result<Self> {
        let mut xot = Xot::new();
        let document = xot
            .parse(source)
            .map_err(|e| Error::layout_error(format!("{}.xml: {}", name, e)))?;
        Ok(Self {
            name: name.to_string(),
            variant: variant.to_string(),
            path: None,
            xot,
            document,
        })
    }

    /// Serialize the (possibly mutated) tree back to markup
    pub fn to_xml(&self) -> Result<String> {
        self.xot
            .to_string(self.document)
            .map_err(|e| Error::layout_error(format!("{}.xml: {}", self.name, e)))
    }

    /// All view id names declared in the tree, document order
    pub fn view_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        collect_ids(&self.xot, self.document, &mut ids);
        ids
    }

    /// Raw `android:id` attribute value for a given id name
    pub fn id_attribute_value(&self, id_name: &str) -> Option<String> {
        find_id_value(&self.xot, self.document, id_name)
    }
}

fn collect_ids(xot: &Xot, node: xot::Node, ids: &mut Vec<String>) {
    if xot.element(node).is_some() {
        if let Some(value) = attribute_value(xot, node, ID_ATTRIBUTE) {
            if let Some(name) = android_id_to_name(&value) {
                ids.push(name);
            }
        }
    }
    for child in xot.children(node) {
        collect_ids(xot, child, ids);
    }
}

fn find_id_value(xot: &Xot, node: xot::Node, id_name: &str) -> Option<String> {
    if xot.element(node).is_some() {
        if let Some(value) = attribute_value(xot, node, ID_ATTRIBUTE) {
            if android_id_to_name(&value).as_deref() == Some(id_name) {
                return Some(value);
            }
        }
    }
    for child in xot.children(node) {
        if let Some(found) = find_id_value(xot, child, id_name) {
            return Some(found);
        }
    }
    None
}

/// Value of the first attribute with the given local name.
///
/// Lookup is namespace-lenient: layout files qualify `id` with the android
/// namespace, includes leave `layout` unqualified.
pub(crate) fn attribute_value(xot: &Xot, node: xot::Node, local_name: &str) -> Option<String> {
    let attrs = xot.attributes(node);
    for (name_id, value) in attrs.iter() {
        if xot.local_name_str(name_id) == local_name {
            return Some(value.to_string());
        }
    }
    None
}

/// Set `android:id` on an element, creating the namespaced attribute name
pub(crate) fn set_android_id(xot: &mut Xot, node: xot::Node, id_name: &str) {
    let ns = xot.add_namespace(ANDROID_NAMESPACE);
    let name = xot.add_name_ns(ID_ATTRIBUTE, ns);
    let value = format!("{}{}", NEW_ID_PREFIX, id_name);
    xot.attributes_mut(node).insert(name, value);
}

/// Decode an id resource reference (`@+id/name` or `@id/name`) to its name
pub fn android_id_to_name(value: &str) -> Option<String> {
    let rest = value
        .strip_prefix("@+id/")
        .or_else(|| value.strip_prefix("@id/"))
        .or_else(|| value.strip_prefix("@android:id/"))?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// One build variant's layout overlay
pub struct VariantData {
    pub name: String,
    pub is_main: bool,
    layouts: HashMap<String, Vec<LayoutFileId>>,
}

impl VariantData {
    /// Layout files registered under a logical layout name
    pub fn layouts(&self, layout_name: &str) -> &[LayoutFileId] {
        self.layouts.get(layout_name).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Variant-ordered index over every known layout file.
///
/// The main variant is always ordered first so overlay resolution walks it
/// before flavor variants, matching the synthetic accessor package layout.
pub struct LayoutIndex {
    variants: Vec<VariantData>,
    files: Vec<LayoutFile>,
}

impl LayoutIndex {
    pub fn new() -> Self {
        Self { variants: Vec::new(), files: Vec::new() }
    }

    /// Register an in-memory layout under a variant, creating the variant
    /// on first use
    pub fn add_layout(&mut self, variant: &str, name: &str, source: &str) -> Result<LayoutFileId> {
        let file = LayoutFile::parse(name, variant, source)?;
        Ok(self.register(file))
    }

    fn register(&mut self, file: LayoutFile) -> LayoutFileId {
        let id = LayoutFileId(self.files.len());
        let variant_idx = self.variant_index(&file.variant);
        self.variants[variant_idx]
            .layouts
            .entry(file.name.clone())
            .or_default()
            .push(id);
        self.files.push(file);
        id
    }

    fn variant_index(&mut self, variant: &str) -> usize {
        if let Some(idx) = self.variants.iter().position(|v| v.name == variant) {
            return idx;
        }
        let data = VariantData {
            name: variant.to_string(),
            is_main: variant == MAIN_VARIANT,
            layouts: HashMap::new(),
        };
        if data.is_main {
            self.variants.insert(0, data);
            0
        } else {
            self.variants.push(data);
            self.variants.len() - 1
        }
    }

    /// Load every layout under a module source tree
    /// (`<root>/<variant>/res/layout*/**/*.xml`)
    pub fn load_src_tree(root: &Path) -> Result<Self> {
        let mut index = Self::new();

        for entry in WalkDir::new(root).min_depth(1).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("xml") {
                continue;
            }
            let Some(layout_dir) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str())
            else {
                continue;
            };
            if layout_dir != "layout" && !layout_dir.starts_with("layout-") {
                continue;
            }
            // <root>/<variant>/res/<layout_dir>/<name>.xml
            let Some(variant) = path
                .parent()
                .and_then(|p| p.parent())
                .filter(|res| res.file_name().and_then(|n| n.to_str()) == Some("res"))
                .and_then(|res| res.parent())
                .and_then(|v| v.file_name())
                .and_then(|n| n.to_str())
            else {
                continue;
            };
            let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
                continue;
            };

            let source = std::fs::read_to_string(path)?;
            let mut file = LayoutFile::parse(name, variant, &source)?;
            file.path = Some(path.to_path_buf());
            index.register(file);
            log::debug!("layout index: loaded {}/{}", variant, name);
        }

        Ok(index)
    }

    /// Variants in resolution order, main variant first
    pub fn variants(&self) -> &[VariantData] {
        &self.variants
    }

    pub fn file(&self, id: LayoutFileId) -> &LayoutFile {
        &self.files[id.0]
    }

    pub fn file_mut(&mut self, id: LayoutFileId) -> &mut LayoutFile {
        &mut self.files[id.0]
    }

    /// Base name of a layout file
    pub fn base_name(&self, id: LayoutFileId) -> &str {
        &self.files[id.0].name
    }
}

impl Default for LayoutIndex {
    fn default() -> Self {
        Self::new()
    }
}
