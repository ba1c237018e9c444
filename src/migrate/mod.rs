//! Migration orchestration.
//!
//! One call to [`migrate_source`] runs the whole pipeline: parse, classify
//! the target class, discover synthetic references through the resolver
//! oracle, resolve the root layout, optionally correlate `<include>` tags,
//! plan the binding declaration/initializer/teardown, rewrite every call
//! site, drop dead imports, and finish with the shortening and reformat
//! post-passes. All source mutation goes through one [`EditSet`] commit.

pub mod cleanup;
pub mod context;
pub mod edits;
pub mod plan;
pub mod rewrite;

pub use context::{binding_package, ClassKind, MigrationContext};
pub use edits::EditSet;
pub use rewrite::{discover_synthetic_references, ChainInfo, SyntheticReference};

use crate::ast::{AstNode, Expr, KtClass, collect_exprs};
use crate::casing::to_camel_case;
use crate::config::{BindingStrategy, MigrationConfig};
use crate::consts::INCLUDE_ID_SUFFIX;
use crate::error::{Error, Result};
use crate::layout::{set_android_id, walk_includes, IncludeCandidate, LayoutIndex};
use crate::parser::parse_kotlin;
use crate::resolve::LayoutIndexResolver;
use std::collections::HashMap;

/// Result of one migration run
#[derive(Debug)]
pub enum MigrationOutcome {
    /// The class was rewritten
    Migrated(Migrated),
    /// No synthetic references (or no resolvable layout); the source is
    /// untouched
    NothingToMigrate,
}

/// A completed migration
#[derive(Debug)]
pub struct Migrated {
    /// The rewritten source text
    pub source: String,
    /// Simple name of the binding class the rewrite introduced
    pub binding_class: String,
    /// Base name of the root layout the binding derives from
    pub root_layout: String,
    /// Number of synthetic references rewritten
    pub rewritten_references: usize,
}

/// The host-facing "is this action valid here" check: the file parses, its
/// first class is a fragment or activity, and it has imports at all.
pub fn is_available(source: &str, config: &MigrationConfig) -> bool {
    match parse_kotlin(source) {
        Ok(file) => {
            !file.imports.is_empty()
                && file
                    .first_class()
                    .map(|class| ClassKind::classify(class, &file, config).is_some())
                    .unwrap_or(false)
        }
        Err(_) => false,
    }
}

/// Migrate one source file from synthetic accessors to view binding.
///
/// Layout files in `index` are mutated only to synthesize a missing
/// `android:id` on a correlated `<include>` tag.
pub fn migrate_source(
    source: &str,
    index: &mut LayoutIndex,
    config: &MigrationConfig,
) -> Result<MigrationOutcome> {
    let file = parse_kotlin(source)?;
    let class = file
        .first_class()
        .ok_or_else(|| Error::UnsupportedClass { name: "<no class>".to_string() })?;
    let kind = ClassKind::classify(class, &file, config)
        .ok_or_else(|| Error::UnsupportedClass { name: class.name.clone() })?;
    log::debug!("migrate: class {} classified as {:?}", class.name, kind);

    let refs = {
        let resolver = LayoutIndexResolver::new(index);
        rewrite::discover_synthetic_references(&file, class, &resolver)?
    };
    if refs.is_empty() {
        log::debug!("migrate: no synthetic references in {}", class.name);
        return Ok(MigrationOutcome::NothingToMigrate);
    }
    if refs[0].layout_files.is_empty() {
        log::debug!("migrate: no layout files resolvable for first reference");
        return Ok(MigrationOutcome::NothingToMigrate);
    }

    // Root layout: prefer the name the class mentions through `R.layout`,
    // fall back to the first reference's first file. With several distinct
    // candidates the first discovered wins; there is no disambiguation step.
    let wanted = extract_layout_name(source, class, kind);
    let root_file = wanted
        .as_deref()
        .and_then(|name| {
            refs.iter()
                .flat_map(|r| r.layout_files.iter().copied())
                .find(|id| index.base_name(*id) == name)
        })
        .unwrap_or(refs[0].layout_files[0]);
    let root_layout = index.base_name(root_file).to_string();

    // A fragment class keeps one consistent access pattern per run; an
    // activity always uses the direct lateinit pattern.
    let strategy = match kind {
        ClassKind::Fragment => config.strategy,
        ClassKind::Activity => BindingStrategy::NotNull,
    };

    let ctx = MigrationContext {
        source,
        file: &file,
        class,
        kind,
        strategy,
        root_layout: root_layout.clone(),
        root_file,
        binding_package: binding_package(&file),
    };

    // Include correlation runs for activities. The fragment flow keeps the
    // walker dormant until a root-layout selection prompt exists.
    // TODO: enable for fragments once the caller can choose among multiple
    // root layout candidates.
    let mut include_fields: HashMap<usize, String> = HashMap::new();
    if kind == ClassKind::Activity && config.correlate_includes {
        let candidates: Vec<IncludeCandidate> = refs
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.layout_files.iter().any(|id| index.base_name(*id) != root_layout)
            })
            .map(|(i, r)| IncludeCandidate {
                reference: i,
                layout_names: r
                    .layout_files
                    .iter()
                    .map(|id| index.base_name(*id).to_string())
                    .collect(),
            })
            .collect();

        if !candidates.is_empty() {
            let root = index.file_mut(ctx.root_file);
            let document = root.document;
            walk_includes(&mut root.xot, document, &candidates, &mut |xot, sighting| {
                let id = match sighting.existing_id.as_deref() {
                    Some(id) if !id.trim().is_empty() => id.to_string(),
                    _ => {
                        let synthesized = format!("{}{}", sighting.name, INCLUDE_ID_SUFFIX);
                        set_android_id(xot, sighting.tag, &synthesized);
                        synthesized
                    }
                };
                include_fields.insert(sighting.candidate.reference, to_camel_case(&id));
                Ok(())
            })?;
            log::debug!("migrate: correlated {} included layouts", include_fields.len());
        }
    }

    let mut edits = EditSet::new();
    plan::plan_edits(&ctx, &mut edits);
    rewrite::rewrite_references(&ctx, &refs, &include_fields, &mut edits);
    cleanup::remove_synthetic_imports(&file, source, &mut edits);

    let rewritten_references = refs.len();
    let migrated = edits.commit(source)?;
    let migrated = cleanup::shorten_references(migrated, &ctx.binding_fq_name(), &ctx.binding_class());
    let migrated = cleanup::reformat(migrated);

    log::debug!(
        "migrate: {} done, {} references through {}",
        class.name,
        rewritten_references,
        ctx.binding_class()
    );

    Ok(MigrationOutcome::Migrated(Migrated {
        source: migrated,
        binding_class: ctx.binding_class(),
        root_layout,
        rewritten_references,
    }))
}

/// Layout name the class itself mentions through an `R.layout` reference
fn extract_layout_name(source: &str, class: &KtClass, kind: ClassKind) -> Option<String> {
    match kind {
        ClassKind::Fragment => collect_exprs(class, |e| {
            matches!(e, Expr::Qualified(_)) && e.span().source_text(source).contains("R.layout")
        })
        .into_iter()
        .next()
        .and_then(|e| layout_name_from_text(e.span().source_text(source))),
        ClassKind::Activity => {
            let call = plan::find_content_view_call(class, source)?;
            let Expr::Call(call) = call else { return None };
            call.args
                .iter()
                .find(|arg| arg.span().source_text(source).contains("R.layout"))
                .and_then(|arg| layout_name_from_text(arg.span().source_text(source)))
        }
    }
}

/// Trailing layout name of an `R.layout.<name>` mention, tolerating the
/// mention being embedded in a larger argument list
fn layout_name_from_text(text: &str) -> Option<String> {
    let after_dot = text.rsplit('.').next()?;
    let name = after_dot
        .split(',')
        .next()
        .unwrap_or(after_dot)
        .trim()
        .trim_end_matches(')')
        .trim()
        .to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
