use super::*;

/// Renders an AST back to Kotlin source, normalized to four-space indent.
///
/// The rewriter itself edits the original text span-by-span and never goes
/// through this printer; it exists for diagnostics and tests, where a
/// round-trip through the printer is the easiest way to assert structure.
pub struct AstPrinter {
    indent_level: usize,
    output: String,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self { indent_level: 0, output: String::new() }
    }

    pub fn print(&mut self, file: &KtFile) -> String {
        self.output.clear();
        if let Some(package) = &file.package_decl {
            self.writeln(&format!("{}", package));
            self.writeln("");
        }
        for import in &file.imports {
            self.writeln(&format!("{}", import));
        }
        if !file.imports.is_empty() {
            self.writeln("");
        }
        for class in &file.classes {
            self.print_class(class);
        }
        self.output.clone()
    }

    /// Render a single expression on one line
    pub fn expr_text(expr: &Expr) -> String {
        let mut printer = AstPrinter::new();
        printer.write_expr(expr);
        printer.output
    }

    fn indent(&mut self) {
        self.indent_level += 4;
    }

    fn dedent(&mut self) {
        if self.indent_level >= 4 {
            self.indent_level -= 4;
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
    }

    fn writeln(&mut self, s: &str) {
        if !s.is_empty() {
            self.write_indent();
            self.output.push_str(s);
        }
        self.output.push('\n');
    }

    fn print_class(&mut self, class: &KtClass) {
        self.write_indent();
        for modifier in &class.modifiers {
            self.output.push_str(&format!("{} ", modifier_text(modifier)));
        }
        self.output.push_str("class ");
        self.output.push_str(&class.name);
        if !class.supertypes.is_empty() {
            self.output.push_str(" : ");
            let entries: Vec<String> = class
                .supertypes
                .iter()
                .map(|e| {
                    let mut text = e.name.clone();
                    if let Some(args) = &e.call_args {
                        let rendered: Vec<String> = args.iter().map(Self::expr_text).collect();
                        text.push('(');
                        text.push_str(&rendered.join(", "));
                        text.push(')');
                    }
                    text
                })
                .collect();
            self.output.push_str(&entries.join(", "));
        }
        match &class.body {
            None => self.output.push('\n'),
            Some(body) => {
                self.output.push_str(" {\n");
                self.indent();
                for member in &body.members {
                    self.print_member(member);
                }
                self.dedent();
                self.writeln("}");
            }
        }
    }

    fn print_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Property(p) => self.print_property(p),
            ClassMember::Function(f) => self.print_function(f),
            ClassMember::Companion(c) => {
                self.write_indent();
                self.output.push_str("companion object");
                if let Some(name) = &c.name {
                    self.output.push(' ');
                    self.output.push_str(name);
                }
                self.output.push_str(" {\n");
                self.indent();
                for inner in &c.members {
                    self.print_member(inner);
                }
                self.dedent();
                self.writeln("}");
            }
            ClassMember::Initializer(i) => {
                self.write_indent();
                self.output.push_str("init ");
                self.print_block_inline(&i.body);
            }
            ClassMember::Nested(n) => self.print_class(n),
        }
    }

    fn print_property(&mut self, property: &KtProperty) {
        self.write_indent();
        for modifier in &property.modifiers {
            self.output.push_str(&format!("{} ", modifier_text(modifier)));
        }
        self.output.push_str(if property.mutable { "var " } else { "val " });
        self.output.push_str(&property.name);
        if let Some(type_ref) = &property.type_ref {
            self.output.push_str(": ");
            self.output.push_str(&type_ref.text);
        }
        if let Some(init) = &property.initializer {
            self.output.push_str(" = ");
            self.write_expr(init);
        }
        self.output.push('\n');
        for accessor in &property.accessors {
            self.write_indent();
            self.output.push_str("    ");
            self.output.push_str(if accessor.is_getter { "get()" } else { "set(value)" });
            match &accessor.body {
                Some(AccessorBody::Expression(e)) => {
                    self.output.push_str(" = ");
                    self.write_expr(e);
                    self.output.push('\n');
                }
                Some(AccessorBody::Block(b)) => {
                    self.output.push(' ');
                    self.print_block_inline(b);
                }
                None => self.output.push('\n'),
            }
        }
    }

    fn print_function(&mut self, function: &KtFunction) {
        self.write_indent();
        for modifier in &function.modifiers {
            self.output.push_str(&format!("{} ", modifier_text(modifier)));
        }
        self.output.push_str("fun ");
        self.output.push_str(&function.name);
        self.output.push('(');
        let params: Vec<String> = function
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.type_ref.text))
            .collect();
        self.output.push_str(&params.join(", "));
        self.output.push(')');
        if let Some(ret) = &function.return_type {
            self.output.push_str(": ");
            self.output.push_str(&ret.text);
        }
        match &function.body {
            None => self.output.push('\n'),
            Some(FunctionBody::Expression(e)) => {
                self.output.push_str(" = ");
                self.write_expr(e);
                self.output.push('\n');
            }
            Some(FunctionBody::Block(b)) => {
                self.output.push(' ');
                self.print_block_inline(b);
            }
        }
    }

    // Assumes the opening position is already written; emits `{ ... }\n`
    fn print_block_inline(&mut self, block: &Block) {
        self.output.push_str("{\n");
        self.indent();
        for stmt in &block.statements {
            self.print_stmt(stmt);
        }
        self.dedent();
        self.writeln("}");
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(e) => {
                self.write_indent();
                self.write_expr(e);
                self.output.push('\n');
            }
            Stmt::Local(l) => {
                self.write_indent();
                self.output.push_str(if l.mutable { "var " } else { "val " });
                self.output.push_str(&l.name);
                if let Some(type_ref) = &l.type_ref {
                    self.output.push_str(": ");
                    self.output.push_str(&type_ref.text);
                }
                if let Some(init) = &l.initializer {
                    self.output.push_str(" = ");
                    self.write_expr(init);
                }
                self.output.push('\n');
            }
            Stmt::Return(r) => {
                self.write_indent();
                self.output.push_str("return");
                if let Some(value) = &r.value {
                    self.output.push(' ');
                    self.write_expr(value);
                }
                self.output.push('\n');
            }
            Stmt::While(w) => {
                self.write_indent();
                self.output.push_str("while (");
                self.write_expr(&w.condition);
                self.output.push_str(") ");
                self.print_block_inline(&w.body);
            }
            Stmt::For(f) => {
                self.write_indent();
                self.output.push_str("for (");
                self.output.push_str(&f.binding);
                self.output.push_str(" in ");
                self.write_expr(&f.iterable);
                self.output.push_str(") ");
                self.print_block_inline(&f.body);
            }
        }
    }

    fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::NameRef(n) => self.output.push_str(&n.name),
            Expr::Literal(l) => self.output.push_str(&l.text),
            Expr::This(_) => self.output.push_str("this"),
            Expr::Super(_) => self.output.push_str("super"),
            Expr::Qualified(q) => {
                self.write_expr(&q.receiver);
                self.output.push_str(if q.safe { "?." } else { "." });
                self.write_expr(&q.selector);
            }
            Expr::Call(c) => {
                self.write_expr(&c.callee);
                if !(c.args.is_empty() && c.trailing_lambda.is_some()) {
                    self.output.push('(');
                    let args: Vec<String> = c.args.iter().map(Self::expr_text).collect();
                    self.output.push_str(&args.join(", "));
                    self.output.push(')');
                }
                if let Some(lambda) = &c.trailing_lambda {
                    self.output.push(' ');
                    self.write_lambda(lambda);
                }
            }
            Expr::Index(i) => {
                self.write_expr(&i.receiver);
                self.output.push('[');
                self.write_expr(&i.index);
                self.output.push(']');
            }
            Expr::Lambda(l) => self.write_lambda(l),
            Expr::Unary(u) => {
                self.output.push_str(&u.op);
                self.write_expr(&u.operand);
            }
            Expr::NotNull(n) => {
                self.write_expr(&n.operand);
                self.output.push_str("!!");
            }
            Expr::Binary(b) => {
                self.write_expr(&b.left);
                self.output.push_str(&format!(" {} ", b.op));
                self.write_expr(&b.right);
            }
            Expr::Assignment(a) => {
                self.write_expr(&a.target);
                self.output.push_str(&format!(" {} ", a.op));
                self.write_expr(&a.value);
            }
            Expr::If(i) => {
                self.output.push_str("if (");
                self.write_expr(&i.condition);
                self.output.push_str(") ");
                self.write_expr(&i.then_branch);
                if let Some(e) = &i.else_branch {
                    self.output.push_str(" else ");
                    self.write_expr(e);
                }
            }
            Expr::When(w) => {
                self.output.push_str("when ");
                if let Some(subject) = &w.subject {
                    self.output.push('(');
                    self.write_expr(subject);
                    self.output.push_str(") ");
                }
                self.output.push_str("{ ");
                let entries: Vec<String> = w
                    .entries
                    .iter()
                    .map(|entry| {
                        let lhs = if entry.conditions.is_empty() {
                            "else".to_string()
                        } else {
                            entry.conditions.iter().map(Self::expr_text).collect::<Vec<_>>().join(", ")
                        };
                        format!("{} -> {}", lhs, Self::expr_text(&entry.body))
                    })
                    .collect();
                self.output.push_str(&entries.join("; "));
                self.output.push_str(" }");
            }
            Expr::Paren(p) => {
                self.output.push('(');
                self.write_expr(&p.inner);
                self.output.push(')');
            }
            Expr::Block(b) => {
                // Single-line rendition, sufficient for diagnostics
                self.output.push_str("{ ");
                let stmts: Vec<String> = b
                    .statements
                    .iter()
                    .map(|s| {
                        let mut p = AstPrinter::new();
                        p.print_stmt(s);
                        p.output.trim_end().to_string()
                    })
                    .collect();
                self.output.push_str(&stmts.join("; "));
                self.output.push_str(" }");
            }
        }
    }

    fn write_lambda(&mut self, lambda: &LambdaExpr) {
        self.output.push_str("{ ");
        if !lambda.params.is_empty() {
            self.output.push_str(&lambda.params.join(", "));
            self.output.push_str(" -> ");
        }
        let stmts: Vec<String> = lambda
            .statements
            .iter()
            .map(|s| {
                let mut p = AstPrinter::new();
                p.print_stmt(s);
                p.output.trim_end().to_string()
            })
            .collect();
        self.output.push_str(&stmts.join("; "));
        if !lambda.statements.is_empty() {
            self.output.push(' ');
        }
        self.output.push_str("}");
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

fn modifier_text(modifier: &Modifier) -> &'static str {
    match modifier {
        Modifier::Public => "public",
        Modifier::Private => "private",
        Modifier::Protected => "protected",
        Modifier::Internal => "internal",
        Modifier::Open => "open",
        Modifier::Abstract => "abstract",
        Modifier::Final => "final",
        Modifier::Override => "override",
        Modifier::Lateinit => "lateinit",
        Modifier::Inner => "inner",
        Modifier::Data => "data",
    }
}
