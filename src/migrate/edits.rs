//! Transactional text edits.
//!
//! Every mutation of one migration (teardown insertion, binding
//! declaration, initializer, the bulk reference rewrite, import cleanup)
//! is queued as a span edit and applied by [`EditSet::commit`] in a single
//! step. Validation happens before the first byte changes, so a rejected
//! edit set leaves the source untouched.

use crate::ast::Span;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
    seq: usize,
}

/// An accumulating set of non-overlapping text edits
#[derive(Debug, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self { edits: Vec::new() }
    }

    /// Replace the text covered by a span
    pub fn replace(&mut self, span: Span, replacement: impl Into<String>) {
        self.replace_range(span.start.offset, span.end.offset, replacement);
    }

    /// Replace an offset range
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: impl Into<String>) {
        let seq = self.edits.len();
        self.edits.push(Edit { start, end, replacement: replacement.into(), seq });
    }

    /// Insert text at an offset
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace_range(offset, offset, text);
    }

    /// Delete an offset range
    pub fn delete(&mut self, start: usize, end: usize) {
        self.replace_range(start, end, "");
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply every edit to `source`, all or nothing.
    ///
    /// Edits are validated first: each range must lie on char boundaries
    /// within the source, and no two edits may overlap. Insertions at the
    /// same offset keep their queue order.
    pub fn commit(mut self, source: &str) -> Result<String> {
        for edit in &self.edits {
            if edit.start > edit.end || edit.end > source.len() {
                return Err(Error::rewrite_conflict(format!(
                    "edit range {}..{} outside source of length {}",
                    edit.start,
                    edit.end,
                    source.len()
                )));
            }
            if !source.is_char_boundary(edit.start) || !source.is_char_boundary(edit.end) {
                return Err(Error::rewrite_conflict(format!(
                    "edit range {}..{} not on a character boundary",
                    edit.start, edit.end
                )));
            }
        }

        self.edits.sort_by(|a, b| (a.start, a.end, a.seq).cmp(&(b.start, b.end, b.seq)));
        for pair in self.edits.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(Error::rewrite_conflict(format!(
                    "overlapping edits at {}..{} and {}..{}",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        log::debug!("edit set: committing {} edits", self.edits.len());

        let mut output = source.to_string();
        for edit in self.edits.iter().rev() {
            output.replace_range(edit.start..edit.end, &edit.replacement);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_edits_back_to_front() {
        let mut edits = EditSet::new();
        edits.replace_range(0, 3, "binding.fooView");
        edits.replace_range(8, 11, "binding.barView");
        let out = edits.commit("foo and bar").expect("Failed to commit");
        assert_eq!(out, "binding.fooView and binding.barView");
    }

    #[test]
    fn same_offset_insertions_keep_order() {
        let mut edits = EditSet::new();
        edits.insert(0, "a");
        edits.insert(0, "b");
        let out = edits.commit("c").expect("Failed to commit");
        assert_eq!(out, "abc");
    }

    #[test]
    fn insertion_at_replacement_start_lands_before_it() {
        let mut edits = EditSet::new();
        edits.replace_range(0, 3, "new");
        edits.insert(0, "pre ");
        let out = edits.commit("old tail").expect("Failed to commit");
        assert_eq!(out, "pre new tail");
    }

    #[test]
    fn overlapping_edits_rejected() {
        let mut edits = EditSet::new();
        edits.replace_range(0, 5, "x");
        edits.replace_range(3, 8, "y");
        assert!(edits.commit("0123456789").is_err());
    }

    #[test]
    fn out_of_range_rejected() {
        let mut edits = EditSet::new();
        edits.replace_range(4, 10, "x");
        assert!(edits.commit("abc").is_err());
    }
}
