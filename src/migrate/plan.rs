//! Rewrite planning: where the binding is declared, initialized and torn
//! down, per target class kind.
//!
//! Fragments move through two states: the binding is bound in
//! `onViewCreated` and released in `onDestroyView`, which is synthesized
//! when missing. Activities inflate the binding right before the content
//! view is installed and need no teardown.

use super::context::{ClassKind, MigrationContext};
use super::edits::EditSet;
use crate::ast::{AstNode, Block, Expr, KtClass, collect_exprs};
use crate::config::BindingStrategy;
use crate::consts::{ON_CREATE_VIEW, ON_DESTROY_VIEW, ON_VIEW_CREATED, SET_CONTENT_VIEW};

/// Queue the declaration/initializer/teardown edits for one migration
pub fn plan_edits(ctx: &MigrationContext<'_>, edits: &mut EditSet) {
    match ctx.kind {
        ClassKind::Fragment => plan_fragment(ctx, edits),
        ClassKind::Activity => plan_activity(ctx, edits),
    }
    log::debug!(
        "plan: {:?} {:?} binding={} edits={}",
        ctx.kind,
        ctx.strategy,
        ctx.binding_class(),
        edits.len()
    );
}

fn plan_fragment(ctx: &MigrationContext<'_>, edits: &mut EditSet) {
    // teardown first: an existing onDestroyView gets the null assignment as
    // its first statement, otherwise a whole override is synthesized
    match ctx.class.function(ON_DESTROY_VIEW) {
        Some(function) => {
            if let Some(block) = function.block_body() {
                insert_first_statement(ctx.source, block, &null_assignment(ctx), edits);
            }
        }
        None => {
            let indent = member_indent(ctx.source, ctx.class);
            let text = teardown_function_text(ctx, &indent);
            insert_member_before_rbrace(ctx.source, ctx.class, &text, edits);
        }
    }

    insert_binding_property(ctx, edits);

    if let Some(block) = ctx.class.function(ON_VIEW_CREATED).and_then(|f| f.block_body()) {
        insert_first_statement(ctx.source, block, &initializer_text(ctx), edits);
    }
}

fn plan_activity(ctx: &MigrationContext<'_>, edits: &mut EditSet) {
    insert_binding_property(ctx, edits);

    if let Some(call) = find_content_view_call(ctx.class, ctx.source) {
        let call_span = call.span();
        let stmt_line = line_start(ctx.source, call_span.start.offset);
        let indent = line_indent(ctx.source, call_span.start.offset);
        edits.insert(stmt_line, format!("{}{}\n", indent, initializer_text(ctx)));
        edits.replace(call_span, format!("{}(binding.root)", SET_CONTENT_VIEW));
    }
}

/// First call expression whose text mentions the content-view-setting call
/// or the view-creation call
pub(crate) fn find_content_view_call<'a>(class: &'a KtClass, source: &str) -> Option<&'a Expr> {
    collect_exprs(class, |e| {
        matches!(e, Expr::Call(_)) && {
            let text = e.span().source_text(source);
            text.contains(SET_CONTENT_VIEW) || text.contains(ON_CREATE_VIEW)
        }
    })
    .into_iter()
    .next()
}

// Declaration insertion

fn insert_binding_property(ctx: &MigrationContext<'_>, edits: &mut EditSet) {
    let indent = member_indent(ctx.source, ctx.class);
    let text = binding_property_text(ctx, &indent);

    if let Some(last_property) = ctx.class.properties().last() {
        let offset = line_end(ctx.source, last_property.span().end.offset);
        edits.insert(offset, format!("\n{}{}", indent, text));
    } else if let Some(first_function) = ctx.class.functions().next() {
        let offset = line_start(ctx.source, first_function.span().start.offset);
        edits.insert(offset, format!("{}{}\n\n", indent, text));
    } else {
        insert_member_before_rbrace(ctx.source, ctx.class, &text, edits);
    }
}

fn insert_member_before_rbrace(source: &str, class: &KtClass, text: &str, edits: &mut EditSet) {
    let Some(body) = &class.body else { return };
    let indent = member_indent(source, class);
    let rbrace = body.rbrace.offset;
    let line = line_start(source, rbrace);
    if source[line..rbrace].trim().is_empty() {
        // closing brace on its own line
        edits.insert(line, format!("\n{}{}\n", indent, text));
    } else {
        let class_indent = line_indent(source, class.span().start.offset);
        edits.insert(rbrace, format!("\n{}{}\n{}", indent, text, class_indent));
    }
}

// Rendered declaration texts. The binding type is emitted fully qualified;
// the reference-shortening post-pass reduces it to the simple name and adds
// the import.

fn binding_property_text(ctx: &MigrationContext<'_>, indent: &str) -> String {
    let fq = ctx.binding_fq_name();
    match ctx.kind {
        ClassKind::Activity => format!("private lateinit var binding: {}", fq),
        ClassKind::Fragment => match ctx.strategy {
            BindingStrategy::NotNull => format!(
                "private var _binding: {fq}? = null\n\
                 {indent}private val binding: {fq}\n\
                 {indent}    get() = _binding!!",
            ),
            BindingStrategy::Nullable => format!("private var binding: {}? = null", fq),
        },
    }
}

fn initializer_text(ctx: &MigrationContext<'_>) -> String {
    match ctx.kind {
        ClassKind::Fragment => format!(
            "{}binding = {}.bind(view)",
            binding_field_prefix(ctx),
            ctx.binding_class()
        ),
        ClassKind::Activity => format!("binding = {}.inflate(layoutInflater)", ctx.binding_class()),
    }
}

fn null_assignment(ctx: &MigrationContext<'_>) -> String {
    format!("{}binding = null", binding_field_prefix(ctx))
}

fn binding_field_prefix(ctx: &MigrationContext<'_>) -> &'static str {
    match ctx.strategy {
        BindingStrategy::NotNull => "_",
        BindingStrategy::Nullable => "",
    }
}

fn teardown_function_text(ctx: &MigrationContext<'_>, indent: &str) -> String {
    format!(
        "override fun {name}() {{\n\
         {indent}    super.{name}()\n\
         {indent}    {null_stmt}\n\
         {indent}}}",
        name = ON_DESTROY_VIEW,
        null_stmt = null_assignment(ctx),
    )
}

// Statement insertion

/// Insert `stmt` as the first statement of a block, preserving whatever
/// statements already follow
pub(crate) fn insert_first_statement(source: &str, block: &Block, stmt: &str, edits: &mut EditSet) {
    let after_lbrace = block.lbrace.offset + 1;
    let indent = statement_indent(source, block);
    let newline_follows = source[after_lbrace..].starts_with('\n')
        || source[after_lbrace..].starts_with("\r\n");
    if newline_follows {
        edits.insert(after_lbrace, format!("\n{}{}", indent, stmt));
    } else {
        edits.insert(after_lbrace, format!("\n{}{}\n{}", indent, stmt, indent));
    }
}

fn statement_indent(source: &str, block: &Block) -> String {
    if let Some(first) = block.statements.first() {
        let stmt_offset = first.span().start.offset;
        if line_start(source, stmt_offset) != line_start(source, block.lbrace.offset) {
            return line_indent(source, stmt_offset);
        }
    }
    format!("{}    ", line_indent(source, block.lbrace.offset))
}

fn member_indent(source: &str, class: &KtClass) -> String {
    if let Some(body) = &class.body {
        if let Some(first) = body.members.first() {
            let offset = first.span().start.offset;
            if line_start(source, offset) != line_start(source, body.lbrace.offset) {
                return line_indent(source, offset);
            }
        }
    }
    format!("{}    ", line_indent(source, class.span().start.offset))
}

// Text position helpers

/// Offset of the first character of the line containing `offset`
pub(crate) fn line_start(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Offset of the line break (or end of input) after `offset`
pub(crate) fn line_end(source: &str, offset: usize) -> usize {
    source[offset.min(source.len())..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len())
}

/// Leading whitespace of the line containing `offset`
pub(crate) fn line_indent(source: &str, offset: usize) -> String {
    let start = line_start(source, offset);
    source[start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_helpers() {
        let source = "line one\n    indented\nlast";
        assert_eq!(line_start(source, 0), 0);
        assert_eq!(line_start(source, 12), 9);
        assert_eq!(line_end(source, 0), 8);
        assert_eq!(line_end(source, 22), source.len());
        assert_eq!(line_indent(source, 12), "    ");
        assert_eq!(line_indent(source, 0), "");
    }
}
