//! Depth-first `<include>` discovery over a layout tree.
//!
//! The walker only observes: it reports every include tag that correlates
//! with a candidate reference set and leaves all mutation to the callback
//! (synthesizing a missing `android:id`, recording the correlation).
//! Traversal is deterministic document order, parent before children, so
//! re-running it on an unmodified tree reports the same sightings in the
//! same order.

use super::{android_id_to_name, attribute_value};
use crate::consts::{INCLUDE_TAG, LAYOUT_ATTRIBUTE, WALKER_MAX_NODES};
use crate::error::{Error, Result};
use xot::{Node, Xot};

/// Pairing of one synthetic reference with the layout files it resolved to
#[derive(Debug, Clone)]
pub struct IncludeCandidate {
    /// Index of the originating reference in the discovery set
    pub reference: usize,
    /// Base names of the reference's resolved layout files
    pub layout_names: Vec<String>,
}

/// One correlated `<include>` tag reported to the callback
pub struct IncludeSighting<'a> {
    /// Base name from the `layout` attribute
    pub name: String,
    /// Existing `android:id`, decoded to a bare name
    pub existing_id: Option<String>,
    /// The include element itself
    pub tag: Node,
    /// First candidate whose layout files contain `name`
    pub candidate: &'a IncludeCandidate,
}

/// Walk the tree rooted at `root`, invoking `callback` for every include
/// tag whose referenced layout matches a candidate.
///
/// An include without a `layout` attribute is skipped; children are always
/// visited afterwards so nested includes are discovered independently.
pub fn walk_includes<F>(
    xot: &mut Xot,
    root: Node,
    candidates: &[IncludeCandidate],
    callback: &mut F,
) -> Result<()>
where
    F: FnMut(&mut Xot, IncludeSighting<'_>) -> Result<()>,
{
    let mut visited = 0usize;
    walk_node(xot, root, candidates, callback, &mut visited)
}

fn walk_node<F>(
    xot: &mut Xot,
    node: Node,
    candidates: &[IncludeCandidate],
    callback: &mut F,
    visited: &mut usize,
) -> Result<()>
where
    F: FnMut(&mut Xot, IncludeSighting<'_>) -> Result<()>,
{
    *visited += 1;
    if *visited > WALKER_MAX_NODES {
        return Err(Error::internal("layout tree exceeds walker node cap"));
    }

    let is_include = xot
        .element(node)
        .map(|element| xot.local_name_str(element.name()) == INCLUDE_TAG)
        .unwrap_or(false);
    if is_include {
        if let Some(layout_value) = attribute_value(xot, node, LAYOUT_ATTRIBUTE) {
            let name = layout_value.rsplit('/').next().unwrap_or("").to_string();
            let candidate = candidates
                .iter()
                .find(|c| c.layout_names.iter().any(|n| *n == name));
            if let Some(candidate) = candidate {
                if !name.trim().is_empty() {
                    let existing_id = attribute_value(xot, node, crate::consts::ID_ATTRIBUTE)
                        .and_then(|value| android_id_to_name(&value));
                    callback(
                        xot,
                        IncludeSighting { name, existing_id, tag: node, candidate },
                    )?;
                }
            }
        }
    }

    let children: Vec<Node> = xot.children(node).collect();
    for child in children {
        walk_node(xot, child, candidates, callback, visited)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutFile;

    const ROOT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <include layout="@layout/header" />
    <FrameLayout>
        <include layout="@layout/footer" android:id="@+id/footer_bar" />
    </FrameLayout>
    <include />
</LinearLayout>
"#;

    fn candidates() -> Vec<IncludeCandidate> {
        vec![
            IncludeCandidate { reference: 0, layout_names: vec!["header".to_string()] },
            IncludeCandidate { reference: 1, layout_names: vec!["footer".to_string()] },
        ]
    }

    fn sightings(file: &mut LayoutFile, candidates: &[IncludeCandidate]) -> Vec<(String, Option<String>, usize)> {
        let mut seen = Vec::new();
        walk_includes(&mut file.xot, file.document, candidates, &mut |_, sighting| {
            seen.push((sighting.name.clone(), sighting.existing_id.clone(), sighting.candidate.reference));
            Ok(())
        })
        .expect("Failed to walk layout");
        seen
    }

    #[test]
    fn reports_includes_in_document_order() {
        let mut file = LayoutFile::parse("activity_main", "main", ROOT).expect("Failed to parse layout");
        let candidates = candidates();
        let seen = sightings(&mut file, &candidates);

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("header".to_string(), None, 0));
        assert_eq!(seen[1], ("footer".to_string(), Some("footer_bar".to_string()), 1));
    }

    #[test]
    fn rerun_is_deterministic() {
        let mut file = LayoutFile::parse("activity_main", "main", ROOT).expect("Failed to parse layout");
        let candidates = candidates();
        let first = sightings(&mut file, &candidates);
        let second = sightings(&mut file, &candidates);
        assert_eq!(first, second);
    }

    #[test]
    fn unmatched_include_skipped() {
        let mut file = LayoutFile::parse("activity_main", "main", ROOT).expect("Failed to parse layout");
        let candidates = vec![IncludeCandidate { reference: 0, layout_names: vec!["sidebar".to_string()] }];
        assert!(sightings(&mut file, &candidates).is_empty());
    }
}
