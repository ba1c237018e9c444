//! bindmig migrates Android Kotlin classes from synthetic view accessors
//! to explicit view binding.
//!
//! ## Architecture
//!
//! The engine is a single-pass, transactional source transformation:
//!
//! - **parser**: lexical analysis and parsing of the Kotlin subset these
//!   classes use into an AST with byte-accurate spans
//! - **ast**: node definitions, visitor traversal, and a debug printer
//! - **layout**: layout XML model, build-variant overlay index, and the
//!   `<include>` tree walker
//! - **resolve**: the symbol-resolution oracle contract plus the default
//!   index-backed resolver
//! - **migrate**: planning, reference rewriting, transactional text edits,
//!   and cleanup post-passes
//!
//! ## Migration Flow
//!
//! ```text
//! Kotlin Source → Parser → AST → Discovery (resolver oracle)
//!                                     ↓
//!               Root Layout ← Layout Index ← Layout XML
//!                                     ↓
//!          Plan → Rewrite → EditSet commit → Cleanup → Migrated Source
//! ```
//!
//! The whole mutation sequence of one run commits atomically: edits are
//! validated against the original text before the first byte changes.

pub mod ast;
pub mod casing;
pub mod config;
pub mod consts;
pub mod error;
pub mod layout;
pub mod migrate;
pub mod parser;
pub mod resolve;

pub use config::{BindingStrategy, MigrationConfig};
pub use error::{Error, Result};
pub use layout::{LayoutFile, LayoutFileId, LayoutIndex};
pub use migrate::{ClassKind, Migrated, MigrationOutcome};

use std::path::Path;

/// Check whether the migration applies to a source file at all
pub fn is_available(source: &str, config: &MigrationConfig) -> bool {
    migrate::is_available(source, config)
}

/// Migrate one Kotlin source file against an in-memory layout index.
///
/// Returns the rewritten source; layout trees in the index are mutated only
/// to synthesize missing `<include>` ids during correlation.
pub fn migrate_source(
    source: &str,
    index: &mut LayoutIndex,
    config: &MigrationConfig,
) -> Result<MigrationOutcome> {
    migrate::migrate_source(source, index, config)
}

/// Convenience entry point: load the layout index from a module source tree
/// (`<src_root>/<variant>/res/layout*/…`) and migrate the given source.
pub fn migrate_with_res_tree(
    source: &str,
    src_root: &Path,
    config: &MigrationConfig,
) -> Result<MigrationOutcome> {
    let mut index = LayoutIndex::load_src_tree(src_root)?;
    migrate_source(source, &mut index, config)
}
