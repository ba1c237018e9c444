//! Synthetic reference discovery and the bulk call-site rewrite.
//!
//! Discovery walks the class once, resolving every bare name reference
//! through the [`SyntheticResolver`] oracle and recording, for references
//! that head a member-access chain, the chain extent and the spans of its
//! access operators. The rewriter then drains a worklist of discovered
//! references, emitting span edits: the reference itself becomes a
//! binding-qualified access, and in nullable mode every operator on the
//! chain spine becomes a safe call so null-safety propagates through the
//! whole chain.

use super::context::MigrationContext;
use super::edits::EditSet;
use crate::ast::*;
use crate::casing::to_camel_case;
use crate::config::BindingStrategy;
use crate::consts::DISCOVERY_MAX_NODES;
use crate::error::{Error, Result};
use crate::layout::LayoutFileId;
use crate::resolve::{PropertyDescriptor, ReferenceScope, SyntheticResolver};
use std::collections::{HashMap, HashSet, VecDeque};

/// One access operator on a chain spine
#[derive(Debug, Clone, Copy)]
pub struct SpineOp {
    pub span: Span,
    pub safe: bool,
}

/// Extent of the member-access chain a reference is the receiver of
#[derive(Debug, Clone)]
pub struct ChainInfo {
    pub span: Span,
    pub ops: Vec<SpineOp>,
}

/// A discovered synthetic accessor reference.
///
/// Handles are only valid against the unmodified source they were
/// discovered in; any tree mutation invalidates them, which is why
/// discovery runs freshly per migration and all edits commit at once.
#[derive(Debug, Clone)]
pub struct SyntheticReference {
    pub name: String,
    /// Span of the bare name reference
    pub span: Span,
    /// Chain context when the reference is the leftmost receiver of a
    /// member-access chain
    pub chain: Option<ChainInfo>,
    pub descriptor: PropertyDescriptor,
    pub layout_files: Vec<LayoutFileId>,
}

/// Discover every synthetic accessor reference in the class, document order
pub fn discover_synthetic_references<R: SyntheticResolver>(
    file: &KtFile,
    class: &KtClass,
    resolver: &R,
) -> Result<Vec<SyntheticReference>> {
    let mut discovery = Discovery {
        file,
        resolver,
        scopes: Vec::new(),
        refs: Vec::new(),
        visited: 0,
    };

    let mut class_scope: HashSet<String> = class.properties().map(|p| p.name.clone()).collect();
    class_scope.extend(class.primary_params.iter().map(|p| p.name.clone()));
    discovery.scopes.push(class_scope);

    if let Some(body) = &class.body {
        for member in &body.members {
            discovery.walk_member(member)?;
        }
    }

    log::debug!("discovery: {} synthetic references", discovery.refs.len());
    Ok(discovery.refs)
}

struct Discovery<'a, R> {
    file: &'a KtFile,
    resolver: &'a R,
    scopes: Vec<HashSet<String>>,
    refs: Vec<SyntheticReference>,
    visited: usize,
}

impl<'a, R: SyntheticResolver> Discovery<'a, R> {
    fn walk_member(&mut self, member: &ClassMember) -> Result<()> {
        match member {
            ClassMember::Property(property) => {
                if let Some(init) = &property.initializer {
                    self.walk_expr(init)?;
                }
                for accessor in &property.accessors {
                    match &accessor.body {
                        Some(AccessorBody::Expression(e)) => self.walk_expr(e)?,
                        Some(AccessorBody::Block(b)) => self.walk_block(b)?,
                        None => {}
                    }
                }
            }
            ClassMember::Function(function) => {
                let params = function.params.iter().map(|p| p.name.clone()).collect();
                self.scopes.push(params);
                match &function.body {
                    Some(FunctionBody::Block(b)) => self.walk_block(b)?,
                    Some(FunctionBody::Expression(e)) => self.walk_expr(e)?,
                    None => {}
                }
                self.scopes.pop();
            }
            ClassMember::Initializer(init) => self.walk_block(&init.body)?,
            ClassMember::Companion(companion) => {
                for inner in &companion.members {
                    self.walk_member(inner)?;
                }
            }
            ClassMember::Nested(nested) => {
                let props = nested.properties().map(|p| p.name.clone()).collect();
                self.scopes.push(props);
                if let Some(body) = &nested.body {
                    for inner in &body.members {
                        self.walk_member(inner)?;
                    }
                }
                self.scopes.pop();
            }
        }
        Ok(())
    }

    fn walk_block(&mut self, block: &Block) -> Result<()> {
        self.scopes.push(HashSet::new());
        for stmt in &block.statements {
            self.walk_stmt(stmt)?;
        }
        self.scopes.pop();
        Ok(())
    }

    fn walk_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expression(e) => self.walk_expr(e)?,
            Stmt::Local(local) => {
                if let Some(init) = &local.initializer {
                    self.walk_expr(init)?;
                }
                // the name shadows only after its declaration
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(local.name.clone());
                }
            }
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.walk_expr(value)?;
                }
            }
            Stmt::While(w) => {
                self.walk_expr(&w.condition)?;
                self.walk_block(&w.body)?;
            }
            Stmt::For(f) => {
                self.walk_expr(&f.iterable)?;
                self.scopes.push(HashSet::from([f.binding.clone()]));
                self.walk_block(&f.body)?;
                self.scopes.pop();
            }
        }
        Ok(())
    }

    fn walk_expr(&mut self, expr: &Expr) -> Result<()> {
        self.visited += 1;
        if self.visited > DISCOVERY_MAX_NODES {
            return Err(Error::internal("source tree exceeds discovery node cap"));
        }

        match expr {
            Expr::Qualified(q) => {
                if let Expr::NameRef(leaf) = q.leftmost() {
                    if let Some((descriptor, layout_files)) = self.resolve(leaf) {
                        self.refs.push(SyntheticReference {
                            name: leaf.name.clone(),
                            span: leaf.span,
                            chain: Some(ChainInfo { span: q.span, ops: spine_ops(q) }),
                            descriptor,
                            layout_files,
                        });
                        return self.walk_chain_selectors(q);
                    }
                }
                self.walk_expr(&q.receiver)?;
                self.walk_selector(&q.selector)
            }
            Expr::NameRef(name_ref) => {
                if let Some((descriptor, layout_files)) = self.resolve(name_ref) {
                    self.refs.push(SyntheticReference {
                        name: name_ref.name.clone(),
                        span: name_ref.span,
                        chain: None,
                        descriptor,
                        layout_files,
                    });
                }
                Ok(())
            }
            Expr::Call(call) => {
                // a bare callee name is a function, not a view property
                if !matches!(&*call.callee, Expr::NameRef(_)) {
                    self.walk_expr(&call.callee)?;
                }
                for arg in &call.args {
                    self.walk_expr(arg)?;
                }
                if let Some(lambda) = &call.trailing_lambda {
                    self.walk_lambda(lambda)?;
                }
                Ok(())
            }
            Expr::Lambda(lambda) => self.walk_lambda(lambda),
            Expr::Index(index) => {
                self.walk_expr(&index.receiver)?;
                self.walk_expr(&index.index)
            }
            Expr::Literal(_) | Expr::This(_) | Expr::Super(_) => Ok(()),
            Expr::Unary(u) => self.walk_expr(&u.operand),
            Expr::NotNull(n) => self.walk_expr(&n.operand),
            Expr::Binary(b) => {
                self.walk_expr(&b.left)?;
                self.walk_expr(&b.right)
            }
            Expr::Assignment(a) => {
                self.walk_expr(&a.target)?;
                self.walk_expr(&a.value)
            }
            Expr::If(i) => {
                self.walk_expr(&i.condition)?;
                self.walk_expr(&i.then_branch)?;
                if let Some(e) = &i.else_branch {
                    self.walk_expr(e)?;
                }
                Ok(())
            }
            Expr::When(w) => {
                if let Some(subject) = &w.subject {
                    self.walk_expr(subject)?;
                }
                for entry in &w.entries {
                    for condition in &entry.conditions {
                        self.walk_expr(condition)?;
                    }
                    self.walk_expr(&entry.body)?;
                }
                Ok(())
            }
            Expr::Paren(p) => self.walk_expr(&p.inner),
            Expr::Block(b) => self.walk_block(b),
        }
    }

    fn walk_lambda(&mut self, lambda: &LambdaExpr) -> Result<()> {
        self.scopes.push(lambda.params.iter().cloned().collect());
        for stmt in &lambda.statements {
            self.walk_stmt(stmt)?;
        }
        self.scopes.pop();
        Ok(())
    }

    /// Walk the selector side of every link on a chain spine, skipping the
    /// member names themselves but descending into call arguments where
    /// further synthetic references can appear
    fn walk_chain_selectors(&mut self, chain: &QualifiedExpr) -> Result<()> {
        let mut current = chain;
        loop {
            self.walk_selector(&current.selector)?;
            match &*current.receiver {
                Expr::Qualified(inner) => current = inner,
                _ => return Ok(()),
            }
        }
    }

    fn walk_selector(&mut self, selector: &Expr) -> Result<()> {
        match selector {
            // a member name is resolved against its receiver, never a
            // standalone synthetic reference
            Expr::NameRef(_) => Ok(()),
            Expr::Call(call) => {
                for arg in &call.args {
                    self.walk_expr(arg)?;
                }
                if let Some(lambda) = &call.trailing_lambda {
                    self.walk_lambda(lambda)?;
                }
                Ok(())
            }
            other => self.walk_expr(other),
        }
    }

    fn resolve(&self, name_ref: &NameRefExpr) -> Option<(PropertyDescriptor, Vec<LayoutFileId>)> {
        let shadowed: HashSet<String> = self.scopes.iter().flatten().cloned().collect();
        let scope = ReferenceScope { file: self.file, shadowed: &shadowed };
        let descriptor = self.resolver.resolve_declaration(&scope, &name_ref.name)?;
        if self.resolver.candidate_xml_attributes(&descriptor).is_empty() {
            return None;
        }
        let layout_files = self.resolver.layout_files_for(&descriptor);
        Some((descriptor, layout_files))
    }
}

fn spine_ops(chain: &QualifiedExpr) -> Vec<SpineOp> {
    let mut ops = Vec::new();
    let mut current = chain;
    loop {
        ops.push(SpineOp { span: current.op_span, safe: current.safe });
        match &*current.receiver {
            Expr::Qualified(inner) => current = inner,
            _ => break,
        }
    }
    ops
}

/// Rewrite every discovered reference into a binding-qualified access.
///
/// References correlated to an included layout go through the include's
/// binding field. Discovery is exhaustive up front and span edits expose
/// nothing new, so the worklist never grows mid-run and the drain is
/// bounded by the initial reference count.
pub fn rewrite_references(
    ctx: &MigrationContext<'_>,
    refs: &[SyntheticReference],
    include_fields: &HashMap<usize, String>,
    edits: &mut EditSet,
) {
    let mut worklist: VecDeque<usize> = (0..refs.len()).collect();
    let mut done: HashSet<usize> = HashSet::new();
    let bound = refs.len();
    let mut iterations = 0usize;

    while let Some(index) = worklist.pop_front() {
        if !done.insert(index) {
            continue;
        }
        iterations += 1;
        debug_assert!(iterations <= bound, "rewrite worklist exceeded its bound");

        let reference = &refs[index];
        let camel = to_camel_case(&reference.name);

        match ctx.strategy {
            BindingStrategy::NotNull => {
                let replacement = match include_fields.get(&index) {
                    Some(field) => format!("binding.{}.{}", field, camel),
                    None => format!("binding.{}", camel),
                };
                edits.replace(reference.span, replacement);
            }
            BindingStrategy::Nullable => {
                let replacement = match include_fields.get(&index) {
                    Some(field) => format!("binding?.{}.{}", field, camel),
                    None => format!("binding?.{}", camel),
                };
                edits.replace(reference.span, replacement);
                if let Some(chain) = &reference.chain {
                    for op in &chain.ops {
                        if !op.safe {
                            edits.replace(op.span, "?.");
                        }
                    }
                }
            }
        }
    }

    log::debug!("rewrite: {} references rewritten", done.len());
}
