use super::*;

/// AST visitor with default depth-first traversal.
///
/// Override the node kinds of interest; every default method delegates to
/// the matching `walk_*` function so overrides can still descend by calling
/// it themselves. Traversal is document order, parent before children.
pub trait KtVisitor {
    fn visit_file(&mut self, file: &KtFile) {
        walk_file(self, file);
    }

    fn visit_import(&mut self, _import: &ImportDecl) {}

    fn visit_class(&mut self, class: &KtClass) {
        walk_class(self, class);
    }

    fn visit_property(&mut self, property: &KtProperty) {
        walk_property(self, property);
    }

    fn visit_function(&mut self, function: &KtFunction) {
        walk_function(self, function);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_file<V: KtVisitor + ?Sized>(v: &mut V, file: &KtFile) {
    for import in &file.imports {
        v.visit_import(import);
    }
    for class in &file.classes {
        v.visit_class(class);
    }
}

pub fn walk_class<V: KtVisitor + ?Sized>(v: &mut V, class: &KtClass) {
    for entry in &class.supertypes {
        if let Some(args) = &entry.call_args {
            for arg in args {
                v.visit_expr(arg);
            }
        }
    }
    if let Some(body) = &class.body {
        for member in &body.members {
            walk_member(v, member);
        }
    }
}

pub fn walk_member<V: KtVisitor + ?Sized>(v: &mut V, member: &ClassMember) {
    match member {
        ClassMember::Property(p) => v.visit_property(p),
        ClassMember::Function(f) => v.visit_function(f),
        ClassMember::Companion(c) => {
            for inner in &c.members {
                walk_member(v, inner);
            }
        }
        ClassMember::Initializer(i) => v.visit_block(&i.body),
        ClassMember::Nested(n) => v.visit_class(n),
    }
}

pub fn walk_property<V: KtVisitor + ?Sized>(v: &mut V, property: &KtProperty) {
    if let Some(init) = &property.initializer {
        v.visit_expr(init);
    }
    for accessor in &property.accessors {
        match &accessor.body {
            Some(AccessorBody::Expression(e)) => v.visit_expr(e),
            Some(AccessorBody::Block(b)) => v.visit_block(b),
            None => {}
        }
    }
}

pub fn walk_function<V: KtVisitor + ?Sized>(v: &mut V, function: &KtFunction) {
    for param in &function.params {
        if let Some(default) = &param.default {
            v.visit_expr(default);
        }
    }
    match &function.body {
        Some(FunctionBody::Block(b)) => v.visit_block(b),
        Some(FunctionBody::Expression(e)) => v.visit_expr(e),
        None => {}
    }
}

pub fn walk_block<V: KtVisitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.statements {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: KtVisitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Expression(e) => v.visit_expr(e),
        Stmt::Local(l) => {
            if let Some(init) = &l.initializer {
                v.visit_expr(init);
            }
        }
        Stmt::Return(r) => {
            if let Some(value) = &r.value {
                v.visit_expr(value);
            }
        }
        Stmt::While(w) => {
            v.visit_expr(&w.condition);
            v.visit_block(&w.body);
        }
        Stmt::For(f) => {
            v.visit_expr(&f.iterable);
            v.visit_block(&f.body);
        }
    }
}

pub fn walk_expr<V: KtVisitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::NameRef(_) | Expr::Literal(_) | Expr::This(_) | Expr::Super(_) => {}
        Expr::Qualified(q) => {
            v.visit_expr(&q.receiver);
            v.visit_expr(&q.selector);
        }
        Expr::Call(c) => {
            v.visit_expr(&c.callee);
            for arg in &c.args {
                v.visit_expr(arg);
            }
            if let Some(lambda) = &c.trailing_lambda {
                for stmt in &lambda.statements {
                    v.visit_stmt(stmt);
                }
            }
        }
        Expr::Index(i) => {
            v.visit_expr(&i.receiver);
            v.visit_expr(&i.index);
        }
        Expr::Lambda(l) => {
            for stmt in &l.statements {
                v.visit_stmt(stmt);
            }
        }
        Expr::Unary(u) => v.visit_expr(&u.operand),
        Expr::NotNull(n) => v.visit_expr(&n.operand),
        Expr::Binary(b) => {
            v.visit_expr(&b.left);
            v.visit_expr(&b.right);
        }
        Expr::Assignment(a) => {
            v.visit_expr(&a.target);
            v.visit_expr(&a.value);
        }
        Expr::If(i) => {
            v.visit_expr(&i.condition);
            v.visit_expr(&i.then_branch);
            if let Some(e) = &i.else_branch {
                v.visit_expr(e);
            }
        }
        Expr::When(w) => {
            if let Some(subject) = &w.subject {
                v.visit_expr(subject);
            }
            for entry in &w.entries {
                for condition in &entry.conditions {
                    v.visit_expr(condition);
                }
                v.visit_expr(&entry.body);
            }
        }
        Expr::Paren(p) => v.visit_expr(&p.inner),
        Expr::Block(b) => v.visit_block(b),
    }
}

/// Collect every expression matching a predicate, in document order.
///
/// Counterpart of the host tree-walk "collect elements" utility the
/// migration uses to locate call sites and `R.layout` references. The
/// trait-based visitor erases lifetimes, so this borrow-preserving walk is
/// spelled out separately.
pub fn collect_exprs<'a, F>(class: &'a KtClass, predicate: F) -> Vec<&'a Expr>
where
    F: Fn(&Expr) -> bool,
{
    let mut found = Vec::new();
    for entry in &class.supertypes {
        if let Some(args) = &entry.call_args {
            for arg in args {
                collect_in_expr(arg, &predicate, &mut found);
            }
        }
    }
    if let Some(body) = &class.body {
        for member in &body.members {
            collect_in_member(member, &predicate, &mut found);
        }
    }
    found
}

fn collect_in_member<'a, F>(member: &'a ClassMember, predicate: &F, found: &mut Vec<&'a Expr>)
where
    F: Fn(&Expr) -> bool,
{
    match member {
        ClassMember::Property(p) => {
            if let Some(init) = &p.initializer {
                collect_in_expr(init, predicate, found);
            }
            for accessor in &p.accessors {
                match &accessor.body {
                    Some(AccessorBody::Expression(e)) => collect_in_expr(e, predicate, found),
                    Some(AccessorBody::Block(b)) => collect_in_block(b, predicate, found),
                    None => {}
                }
            }
        }
        ClassMember::Function(f) => match &f.body {
            Some(FunctionBody::Block(b)) => collect_in_block(b, predicate, found),
            Some(FunctionBody::Expression(e)) => collect_in_expr(e, predicate, found),
            None => {}
        },
        ClassMember::Companion(c) => {
            for inner in &c.members {
                collect_in_member(inner, predicate, found);
            }
        }
        ClassMember::Initializer(i) => collect_in_block(&i.body, predicate, found),
        ClassMember::Nested(n) => {
            for entry in &n.supertypes {
                if let Some(args) = &entry.call_args {
                    for arg in args {
                        collect_in_expr(arg, predicate, found);
                    }
                }
            }
            if let Some(body) = &n.body {
                for inner in &body.members {
                    collect_in_member(inner, predicate, found);
                }
            }
        }
    }
}

fn collect_in_block<'a, F>(block: &'a Block, predicate: &F, found: &mut Vec<&'a Expr>)
where
    F: Fn(&Expr) -> bool,
{
    for stmt in &block.statements {
        collect_in_stmt(stmt, predicate, found);
    }
}

fn collect_in_stmt<'a, F>(stmt: &'a Stmt, predicate: &F, found: &mut Vec<&'a Expr>)
where
    F: Fn(&Expr) -> bool,
{
    match stmt {
        Stmt::Expression(e) => collect_in_expr(e, predicate, found),
        Stmt::Local(l) => {
            if let Some(init) = &l.initializer {
                collect_in_expr(init, predicate, found);
            }
        }
        Stmt::Return(r) => {
            if let Some(value) = &r.value {
                collect_in_expr(value, predicate, found);
            }
        }
        Stmt::While(w) => {
            collect_in_expr(&w.condition, predicate, found);
            collect_in_block(&w.body, predicate, found);
        }
        Stmt::For(f) => {
            collect_in_expr(&f.iterable, predicate, found);
            collect_in_block(&f.body, predicate, found);
        }
    }
}

fn collect_in_expr<'a, F>(expr: &'a Expr, predicate: &F, found: &mut Vec<&'a Expr>)
where
    F: Fn(&Expr) -> bool,
{
    if predicate(expr) {
        found.push(expr);
    }
    match expr {
        Expr::NameRef(_) | Expr::Literal(_) | Expr::This(_) | Expr::Super(_) => {}
        Expr::Qualified(q) => {
            collect_in_expr(&q.receiver, predicate, found);
            collect_in_expr(&q.selector, predicate, found);
        }
        Expr::Call(c) => {
            collect_in_expr(&c.callee, predicate, found);
            for arg in &c.args {
                collect_in_expr(arg, predicate, found);
            }
            if let Some(lambda) = &c.trailing_lambda {
                for stmt in &lambda.statements {
                    collect_in_stmt(stmt, predicate, found);
                }
            }
        }
        Expr::Index(i) => {
            collect_in_expr(&i.receiver, predicate, found);
            collect_in_expr(&i.index, predicate, found);
        }
        Expr::Lambda(l) => {
            for stmt in &l.statements {
                collect_in_stmt(stmt, predicate, found);
            }
        }
        Expr::Unary(u) => collect_in_expr(&u.operand, predicate, found),
        Expr::NotNull(n) => collect_in_expr(&n.operand, predicate, found),
        Expr::Binary(b) => {
            collect_in_expr(&b.left, predicate, found);
            collect_in_expr(&b.right, predicate, found);
        }
        Expr::Assignment(a) => {
            collect_in_expr(&a.target, predicate, found);
            collect_in_expr(&a.value, predicate, found);
        }
        Expr::If(i) => {
            collect_in_expr(&i.condition, predicate, found);
            collect_in_expr(&i.then_branch, predicate, found);
            if let Some(e) = &i.else_branch {
                collect_in_expr(e, predicate, found);
            }
        }
        Expr::When(w) => {
            if let Some(subject) = &w.subject {
                collect_in_expr(subject, predicate, found);
            }
            for entry in &w.entries {
                for condition in &entry.conditions {
                    collect_in_expr(condition, predicate, found);
                }
                collect_in_expr(&entry.body, predicate, found);
            }
        }
        Expr::Paren(p) => collect_in_expr(&p.inner, predicate, found),
        Expr::Block(b) => collect_in_block(b, predicate, found),
    }
}
