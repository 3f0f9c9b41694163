//! Expression tree nodes.
//!
//! Children are arena indices. A child slot the parser could not fill is
//! `None`; the flow builder treats an absent child as an unknown value.

use std::fmt;

use crate::{DeclId, ExprId, ExprRange, Name, Span, Ty};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Expression variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Literal(Literal),

    /// Simple name reference.
    Ident(Name),

    This,

    /// `{ s1; s2; ... }` as a statement body (not a lambda).
    Block(ExprRange),

    Paren(ExprId),

    /// `return`, `return value`, `return@label value`.
    Return {
        label: Option<Name>,
        value: Option<ExprId>,
    },

    Binary {
        op: BinaryOp,
        left: Option<ExprId>,
        right: Option<ExprId>,
    },

    Prefix {
        op: PrefixOp,
        operand: Option<ExprId>,
    },

    Postfix {
        op: PostfixOp,
        operand: ExprId,
    },

    /// `x is T` / `x !is T`
    TypeTest {
        operand: ExprId,
        ty: Option<Ty>,
        negated: bool,
    },

    If {
        cond: Option<ExprId>,
        then_branch: Option<ExprId>,
        else_branch: Option<ExprId>,
    },

    While {
        cond: Option<ExprId>,
        body: Option<ExprId>,
    },

    DoWhile {
        body: Option<ExprId>,
        cond: Option<ExprId>,
    },

    /// `val x: T = init` / `var x = init`
    LocalDecl {
        decl: DeclId,
        init: Option<ExprId>,
    },

    /// Qualified access `receiver.name`.
    Field {
        receiver: ExprId,
        name: Name,
    },

    Call {
        callee: ExprId,
        args: ExprRange,
    },

    /// `label@ body`
    Labeled {
        label: Name,
        body: ExprId,
    },

    /// `{ statements }` in expression position.
    Lambda {
        body: ExprRange,
    },

    Break,
    Continue,

    /// Placeholder left by parse error recovery.
    Error,
}

impl ExprKind {
    /// Short human-readable name of the node kind, used in diagnostics.
    pub const fn describe(&self) -> &'static str {
        match self {
            ExprKind::Literal(_) => "literal",
            ExprKind::Ident(_) => "name",
            ExprKind::This => "`this`",
            ExprKind::Block(_) => "block",
            ExprKind::Paren(_) => "parenthesized expression",
            ExprKind::Return { .. } => "return",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Prefix { .. } => "prefix expression",
            ExprKind::Postfix { .. } => "postfix expression",
            ExprKind::TypeTest { .. } => "type test",
            ExprKind::If { .. } => "if expression",
            ExprKind::While { .. } => "while loop",
            ExprKind::DoWhile { .. } => "do-while loop",
            ExprKind::LocalDecl { .. } => "local declaration",
            ExprKind::Field { .. } => "qualified access",
            ExprKind::Call { .. } => "call",
            ExprKind::Labeled { .. } => "labeled expression",
            ExprKind::Lambda { .. } => "lambda",
            ExprKind::Break => "`break`",
            ExprKind::Continue => "`continue`",
            ExprKind::Error => "malformed expression",
        }
    }
}

/// Literal constants.
///
/// Floating literals are stored as raw bits so literals stay `Eq + Hash`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    Char(char),
    Bool(bool),
    String(Name),
    Null,
}

impl Literal {
    pub fn float(value: f32) -> Self {
        Literal::Float(value.to_bits())
    }

    pub fn double(value: f64) -> Self {
        Literal::Double(value.to_bits())
    }
}

/// Binary operators, including assignments.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,

    // Infix bitwise functions
    Shl,
    Shr,
    Ushr,
    And,
    Or,
    Xor,

    // Equality
    Eq,
    NotEq,
    Identity,
    NotIdentity,

    // Comparison
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    AndAnd,
    OrOr,

    // Other
    Elvis,
    Range,
    In,
    NotIn,

    // Assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::Ushr => "ushr",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Identity => "===",
            Self::NotIdentity => "!==",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Elvis => "?:",
            Self::Range => "..",
            Self::In => "in",
            Self::NotIn => "!in",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::RemAssign => "%=",
        }
    }

    /// `+ - * / %` and the infix bitwise functions.
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::Rem
                | Self::Shl
                | Self::Shr
                | Self::Ushr
                | Self::And
                | Self::Or
                | Self::Xor
        )
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Shl | Self::Shr | Self::Ushr)
    }

    /// Equality, identity and ordering comparisons.
    pub const fn is_relational(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NotEq
                | Self::Identity
                | Self::NotIdentity
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
        )
    }

    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::DivAssign
                | Self::RemAssign
        )
    }

    /// The arithmetic operator a compound assignment applies.
    ///
    /// `None` for plain `=` and for non-assignments.
    pub const fn compound_base(self) -> Option<BinaryOp> {
        match self {
            Self::AddAssign => Some(Self::Add),
            Self::SubAssign => Some(Self::Sub),
            Self::MulAssign => Some(Self::Mul),
            Self::DivAssign => Some(Self::Div),
            Self::RemAssign => Some(Self::Rem),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrefixOp {
    Plus,
    Minus,
    Inc,
    Dec,
    Not,
}

impl PrefixOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Inc => "++",
            Self::Dec => "--",
            Self::Not => "!",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PostfixOp {
    Inc,
    Dec,
    NotNull,
}

impl PostfixOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Inc => "++",
            Self::Dec => "--",
            Self::NotNull => "!!",
        }
    }
}

/// A local variable or function parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub name: Name,
    /// Declared type, if written in source.
    pub ty: Option<Ty>,
    pub kind: DeclKind,
    pub span: Span,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Local { mutable: bool },
    Parameter,
}
