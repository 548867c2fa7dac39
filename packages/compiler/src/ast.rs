//! The reduced, source-language-agnostic AST.
//!
//! Parsing the surface grammar is delegated to the frontend crate (backed by
//! a stock TypeScript/JavaScript parser); this module owns only the reduced
//! shape that survives that translation. Nodes are arena-free: every tree is
//! owned outright by the `Program` that contains it, consistent with the
//! "no cross-unit sharing" lifecycle the TAC stage also follows.

use crate::span::SourceSpan;
use crate::types::Type;

/// One parsed input file, already split into the declarations the rest of
/// the pipeline cares about.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub enums: Vec<EnumDecl>,
    pub top_level_consts: Vec<TopLevelConst>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decorator {
    UdonBehaviour { sync_mode: Option<String> },
    UdonStub,
    UdonExport,
    RecursiveMethod,
    SerializeField,
    UdonSynced { mode: String },
    FieldChangeCallback { method: String },
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Decorator>,
    pub is_static: bool,
    pub is_public: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: Type,
    pub initializer: Option<Expr>,
    pub decorators: Vec<Decorator>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub file_path: String,
    pub base_class: Option<String>,
    pub interfaces: Vec<String>,
    pub decorators: Vec<Decorator>,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<MethodDecl>,
    /// `None` for the implicit parameterless default constructor.
    pub constructor: Option<MethodDecl>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct InterfaceMethodSig {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
}

#[derive(Debug, Clone)]
pub struct InterfacePropertySig {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub file_path: String,
    pub methods: Vec<InterfaceMethodSig>,
    pub properties: Vec<InterfacePropertySig>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub enum EnumMember {
    Numeric { name: String, value: i64 },
    StringLit { name: String, value: String },
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub file_path: String,
    pub members: Vec<EnumMember>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct TopLevelConst {
    pub name: String,
    pub ty: Type,
    pub initializer: Expr,
    pub file_path: String,
    pub span: SourceSpan,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl {
        name: String,
        ty: Type,
        initializer: Option<Expr>,
        span: SourceSpan,
    },
    ExprStmt(Expr),
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForOf {
        binding: ForOfBinding,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Switch {
        scrutinee: Expr,
        cases: Vec<SwitchCase>,
    },
    Break,
    Continue,
    Return {
        value: Option<Expr>,
        span: SourceSpan,
    },
    Throw {
        value: Expr,
        span: SourceSpan,
    },
    TryCatch {
        try_block: Vec<Stmt>,
        catch_name: Option<String>,
        catch_block: Vec<Stmt>,
        finally_block: Option<Vec<Stmt>>,
    },
}

#[derive(Debug, Clone)]
pub enum ForOfBinding {
    Simple(String),
    Destructure(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for the `default:` arm.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

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
    Lt,
    Lte,
    Gt,
    Gte,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    Typeof,
    Void,
}

#[derive(Debug, Clone)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

#[derive(Debug, Clone)]
pub struct TemplatePart {
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum ObjectProp {
    KeyValue { key: String, value: Expr },
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum ArrayElement {
    Item(Expr),
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal, SourceSpan),
    Identifier(String, SourceSpan),
    This(SourceSpan),
    Super(SourceSpan),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: SourceSpan,
    },
    Logical {
        /// `true` for `&&`, `false` for `||`.
        is_and: bool,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: SourceSpan,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    NullCoalesce {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    OptionalChain(Box<Expr>),
    PropertyAccess {
        receiver: Box<Expr>,
        property: String,
        span: SourceSpan,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
        span: SourceSpan,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: SourceSpan,
    },
    New {
        class_name: String,
        args: Vec<Expr>,
        span: SourceSpan,
    },
    ArrayLiteral(Vec<ArrayElement>, SourceSpan),
    ObjectLiteral(Vec<ObjectProp>, SourceSpan),
    TemplateLiteral {
        parts: Vec<TemplatePart>,
        exprs: Vec<Expr>,
        span: SourceSpan,
    },
    Instanceof {
        value: Box<Expr>,
        class_name: String,
    },
    Delete(Box<Expr>),
    Cast {
        value: Box<Expr>,
        target: Type,
    },
}

impl Expr {
    pub fn span(&self) -> SourceSpan {
        match self {
            Expr::Literal(_, s)
            | Expr::Identifier(_, s)
            | Expr::This(s)
            | Expr::Super(s)
            | Expr::Binary { span: s, .. }
            | Expr::Unary { span: s, .. }
            | Expr::PropertyAccess { span: s, .. }
            | Expr::ArrayAccess { span: s, .. }
            | Expr::Call { span: s, .. }
            | Expr::New { span: s, .. }
            | Expr::ArrayLiteral(_, s)
            | Expr::ObjectLiteral(_, s)
            | Expr::TemplateLiteral { span: s, .. } => s.clone(),
            Expr::Logical { left, .. }
            | Expr::Assign { target: left, .. }
            | Expr::NullCoalesce { left, .. } => left.span(),
            Expr::Ternary { cond, .. } => cond.span(),
            Expr::OptionalChain(inner) => inner.span(),
            Expr::Instanceof { value, .. } => value.span(),
            Expr::Delete(inner) => inner.span(),
            Expr::Cast { value, .. } => value.span(),
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expr::Literal(Literal::Null, _))
    }
}
