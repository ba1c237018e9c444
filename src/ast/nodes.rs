use super::{AstNode, Location, Span};
use std::fmt;

// Package and import declarations

#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub name: String,
    pub span: Span,
}

impl AstNode for PackageDecl {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for PackageDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "package {}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    /// Dotted import path without a trailing `.*`
    pub path: String,
    pub is_wildcard: bool,
    pub span: Span,
}

impl ImportDecl {
    /// Last segment of the import path
    pub fn last_segment(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Path without its last segment
    pub fn parent_path(&self) -> &str {
        match self.path.rfind('.') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }
}

impl AstNode for ImportDecl {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard {
            write!(f, "import {}.*", self.path)
        } else {
            write!(f, "import {}", self.path)
        }
    }
}

// Class declarations

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Open,
    Abstract,
    Final,
    Override,
    Lateinit,
    Inner,
    Data,
}

#[derive(Debug, Clone)]
pub struct KtClass {
    pub annotations: Vec<String>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub primary_params: Vec<Parameter>,
    pub supertypes: Vec<SuperTypeEntry>,
    pub body: Option<ClassBody>,
    pub span: Span,
}

impl KtClass {
    /// Properties declared directly in the class body, in document order
    pub fn properties(&self) -> impl Iterator<Item = &KtProperty> {
        self.body.iter().flat_map(|b| b.members.iter()).filter_map(|m| match m {
            ClassMember::Property(p) => Some(p),
            _ => None,
        })
    }

    /// Functions declared directly in the class body, in document order
    pub fn functions(&self) -> impl Iterator<Item = &KtFunction> {
        self.body.iter().flat_map(|b| b.members.iter()).filter_map(|m| match m {
            ClassMember::Function(f) => Some(f),
            _ => None,
        })
    }

    /// First function with the given name
    pub fn function(&self, name: &str) -> Option<&KtFunction> {
        self.functions().find(|f| f.name == name)
    }
}

impl AstNode for KtClass {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for KtClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)
    }
}

/// One entry of a class's supertype list, e.g. `Fragment(R.layout.main)`
#[derive(Debug, Clone)]
pub struct SuperTypeEntry {
    /// Possibly dotted type name as written
    pub name: String,
    /// Constructor arguments when the entry is a constructor call
    pub call_args: Option<Vec<Expr>>,
    pub span: Span,
}

impl SuperTypeEntry {
    /// Simple (unqualified) name of the supertype
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl AstNode for SuperTypeEntry {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone)]
pub struct ClassBody {
    pub members: Vec<ClassMember>,
    pub lbrace: Location,
    pub rbrace: Location,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ClassMember {
    Property(KtProperty),
    Function(KtFunction),
    Companion(CompanionObject),
    Initializer(InitializerBlock),
    Nested(Box<KtClass>),
}

impl AstNode for ClassMember {
    fn span(&self) -> Span {
        match self {
            ClassMember::Property(p) => p.span(),
            ClassMember::Function(f) => f.span(),
            ClassMember::Companion(c) => c.span,
            ClassMember::Initializer(i) => i.span,
            ClassMember::Nested(n) => n.span(),
        }
    }
}

/// `companion object { ... }`, parsed so a class carrying one still
/// migrates; never an insertion anchor and never a synthetic scope.
#[derive(Debug, Clone)]
pub struct CompanionObject {
    pub name: Option<String>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

/// `init { ... }` block
#[derive(Debug, Clone)]
pub struct InitializerBlock {
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct KtProperty {
    pub annotations: Vec<String>,
    pub modifiers: Vec<Modifier>,
    /// `var` when true, `val` otherwise
    pub mutable: bool,
    pub name: String,
    pub type_ref: Option<TypeRef>,
    pub initializer: Option<Expr>,
    pub accessors: Vec<PropertyAccessor>,
    pub span: Span,
}

impl AstNode for KtProperty {
    fn span(&self) -> Span {
        self.span
    }
}

/// Custom `get`/`set` accessor attached to a property.
///
/// `body` is `None` for a bare visibility-only accessor (`private set`).
#[derive(Debug, Clone)]
pub struct PropertyAccessor {
    pub is_getter: bool,
    pub body: Option<AccessorBody>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AccessorBody {
    Expression(Expr),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct KtFunction {
    pub annotations: Vec<String>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
    pub body: Option<FunctionBody>,
    pub span: Span,
}

impl KtFunction {
    /// Block body of the function, when it has one
    pub fn block_body(&self) -> Option<&Block> {
        match &self.body {
            Some(FunctionBody::Block(b)) => Some(b),
            _ => None,
        }
    }
}

impl AstNode for KtFunction {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for KtFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fun {}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub type_ref: TypeRef,
    pub default: Option<Expr>,
    pub span: Span,
}

impl AstNode for Parameter {
    fn span(&self) -> Span {
        self.span
    }
}

/// A type reference kept as written, plus its nullability marker
#[derive(Debug, Clone)]
pub struct TypeRef {
    pub text: String,
    pub nullable: bool,
    pub span: Span,
}

impl AstNode for TypeRef {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone)]
pub enum FunctionBody {
    Block(Block),
    Expression(Expr),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub lbrace: Location,
    pub rbrace: Location,
    pub span: Span,
}

impl AstNode for Block {
    fn span(&self) -> Span {
        self.span
    }
}

// Statements

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(Expr),
    Local(LocalDecl),
    Return(ReturnStmt),
    While(WhileStmt),
    For(ForStmt),
}

impl AstNode for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Expression(e) => e.span(),
            Stmt::Local(l) => l.span,
            Stmt::Return(r) => r.span,
            Stmt::While(w) => w.span,
            Stmt::For(f) => f.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalDecl {
    pub mutable: bool,
    pub name: String,
    pub type_ref: Option<TypeRef>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub binding: String,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

// Expressions

#[derive(Debug, Clone)]
pub enum Expr {
    NameRef(NameRefExpr),
    Qualified(QualifiedExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Literal(LiteralExpr),
    Lambda(LambdaExpr),
    This(Span),
    Super(Span),
    Unary(UnaryExpr),
    NotNull(NotNullExpr),
    Binary(BinaryExpr),
    Assignment(AssignmentExpr),
    If(IfExpr),
    When(WhenExpr),
    Paren(ParenExpr),
    Block(Block),
}

impl AstNode for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::NameRef(e) => e.span,
            Expr::Qualified(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::Lambda(e) => e.span,
            Expr::This(span) | Expr::Super(span) => *span,
            Expr::Unary(e) => e.span,
            Expr::NotNull(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::If(e) => e.span,
            Expr::When(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::Block(b) => b.span,
        }
    }
}

/// A bare simple-name reference, the shape every synthetic accessor site has
#[derive(Debug, Clone)]
pub struct NameRefExpr {
    pub name: String,
    pub span: Span,
}

/// `receiver.selector` or `receiver?.selector`
#[derive(Debug, Clone)]
pub struct QualifiedExpr {
    pub receiver: Box<Expr>,
    /// True for a `?.` safe call
    pub safe: bool,
    /// Span of the `.` or `?.` operator token
    pub op_span: Span,
    pub selector: Box<Expr>,
    pub span: Span,
}

impl QualifiedExpr {
    /// Leftmost leaf of the receiver spine of this chain
    pub fn leftmost(&self) -> &Expr {
        let mut current: &Expr = &self.receiver;
        while let Expr::Qualified(q) = current {
            current = &q.receiver;
        }
        current
    }
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub trailing_lambda: Option<LambdaExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub receiver: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Char,
    Int,
    Float,
    Bool,
    Null,
}

#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    /// Literal text exactly as written
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub params: Vec<String>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: String,
    pub operand: Box<Expr>,
    pub span: Span,
}

/// Postfix `!!` assertion
#[derive(Debug, Clone)]
pub struct NotNullExpr {
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: String,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: Box<Expr>,
    pub op: String,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhenExpr {
    pub subject: Option<Box<Expr>>,
    pub entries: Vec<WhenEntry>,
    pub span: Span,
}

/// One `conditions -> body` arm; empty conditions mean the `else` arm
#[derive(Debug, Clone)]
pub struct WhenEntry {
    pub conditions: Vec<Expr>,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
    pub span: Span,
}
