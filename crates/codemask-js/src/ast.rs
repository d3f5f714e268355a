//! AST node types for JavaScript and JSX.
//!
//! Everything is an expression, a binding, or a statement. Nodes own their
//! children so the anonymizer can rename in place before code generation.

use crate::span::Span;

/// A parsed program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // === Literals ===
    Null,
    Bool(bool),
    /// Raw numeric text, emitted unchanged.
    Number(String),
    BigInt(String),
    String(String),
    Regex { pattern: String, flags: String },
    /// Template literal; `quasis.len() == exprs.len() + 1`. Quasis are raw.
    Template { quasis: Vec<String>, exprs: Vec<Expr> },

    // === Identifiers ===
    Ident(String),
    This,
    Super,

    // === Compound ===
    Array(Vec<Option<Expr>>),
    Object(Vec<ObjectProp>),
    Function(Box<Function>),
    Arrow(Box<ArrowFunction>),
    Class(Box<Class>),

    // === Operations ===
    Unary { op: UnaryOp, arg: Box<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Sequence(Vec<Expr>),

    // === Member access and calls ===
    Member {
        object: Box<Expr>,
        property: MemberProp,
        /// `a?.b`
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        /// `f?.()`
        optional: bool,
    },
    New { callee: Box<Expr>, args: Vec<Expr> },
    TaggedTemplate {
        tag: Box<Expr>,
        quasis: Vec<String>,
        exprs: Vec<Expr>,
    },

    // === Special ===
    Spread(Box<Expr>),
    Yield {
        arg: Option<Box<Expr>>,
        delegate: bool,
    },
    Await(Box<Expr>),
    /// Dynamic `import(expr)`.
    Import(Box<Expr>),
    /// `new.target`, `import.meta`
    MetaProperty { meta: String, property: String },

    // === JSX ===
    JsxElement(Box<JsxElement>),
    JsxFragment(Box<JsxFragment>),
}

/// The right-hand side of a member access.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    Ident(String),
    Private(String),
    Computed(Box<Expr>),
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // === Declarations ===
    Var {
        kind: VarKind,
        decls: Vec<VarDeclarator>,
    },
    Function(Box<Function>),
    Class(Box<Class>),

    // === Control flow ===
    Block(Vec<Stmt>),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    ForOf {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
        is_await: bool,
    },
    While { test: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, test: Expr },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Return { arg: Option<Expr> },
    Throw { arg: Expr },
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    Labeled { label: String, body: Box<Stmt> },

    // === Other ===
    Expr(Expr),
    /// A prologue string such as `"use strict"`.
    Directive(String),
    Empty,
    Debugger,
    With { object: Expr, body: Box<Stmt> },

    // === Modules ===
    Import(Box<ImportDecl>),
    Export(Box<ExportDecl>),
}

// =============================================================================
// Bindings (patterns)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub kind: BindingKind,
    pub span: Span,
}

impl Binding {
    pub fn new(kind: BindingKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    Ident(String),
    Array(Vec<Option<ArrayPatternElement>>),
    Object(Vec<ObjectPatternProperty>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPatternElement {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub rest: bool,
}

/// One entry of `{ key: value = default }` or `{ ...rest }`. For a rest
/// entry the key is unused.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: PropertyKey,
    pub value: Binding,
    pub default: Option<Expr>,
    pub shorthand: bool,
    pub rest: bool,
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    NullishCoalesce,
    In,
    Instanceof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    BitOrAssign,
    BitXorAssign,
    BitAndAssign,
    AndAssign,
    OrAssign,
    NullishAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

// =============================================================================
// Supporting types
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub binding: Binding,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProp {
    Property(Property),
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub kind: PropertyKind,
    pub shorthand: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Ident(String),
    String(String),
    Number(String),
    Computed(Box<Expr>),
    /// Class members only.
    Private(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
    Method,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Binding>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var {
        kind: VarKind,
        decls: Vec<VarDeclarator>,
    },
    Expr(Expr),
}

// =============================================================================
// Functions and classes
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub params: Vec<Param>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub rest: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<String>,
    pub super_class: Option<Box<Expr>>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    Method {
        key: PropertyKey,
        value: Function,
        kind: MethodKind,
        is_static: bool,
    },
    Property {
        key: PropertyKey,
        value: Option<Expr>,
        is_static: bool,
    },
    StaticBlock(Vec<Stmt>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

// =============================================================================
// Modules
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    Default { local: String },
    Namespace { local: String },
    Named { imported: String, local: String },
}

impl ImportSpecifier {
    pub fn local(&self) -> &str {
        match self {
            ImportSpecifier::Default { local }
            | ImportSpecifier::Namespace { local }
            | ImportSpecifier::Named { local, .. } => local,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    Default(DefaultExport),
    Decl(Stmt),
    All {
        exported: Option<String>,
        source: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultExport {
    Expr(Expr),
    Function(Box<Function>),
    Class(Box<Class>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

// =============================================================================
// JSX
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub name: JsxElementName,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxElementName {
    Ident(String),
    MemberExpr(Vec<String>),
    NamespacedName { namespace: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
    Attribute {
        name: JsxAttrName,
        value: Option<JsxAttrValue>,
    },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttrName {
    Ident(String),
    NamespacedName { namespace: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttrValue {
    String(String),
    Expr(Expr),
    Element(Box<JsxElement>),
    Fragment(Box<JsxFragment>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    /// Raw text between tags.
    Text(String),
    Element(Box<JsxElement>),
    Fragment(Box<JsxFragment>),
    /// `{expr}`; `None` for an empty container such as `{/* note */}`.
    Expr(Option<Expr>),
    Spread(Expr),
}
