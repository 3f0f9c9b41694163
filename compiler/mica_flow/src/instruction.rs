//! Stack-machine instructions.
//!
//! Every instruction consumes some values from the top of the abstract
//! stack and pushes some back ([`Instruction::stack_effect`]). Control
//! transfer is explicit: [`Instruction::Goto`] and
//! [`Instruction::CondGoto`] name their target as an [`Offset`], and
//! [`Instruction::Return`] leaves the flow.

use std::sync::Arc;

use mica_ir::{BinaryOp, DeclId, ExprId, Literal, Name, PrimitiveType, Ty};

/// Slot of a local variable in a [`ControlFlow`](crate::ControlFlow).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        VarId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Describes the local a [`VarId`] stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VariableDescriptor {
    /// The declaring `val`, `var` or parameter.
    pub decl: DeclId,
    pub name: Name,
    pub ty: Option<Ty>,
}

/// A forward jump target, bound once the target position is known.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DeferredOffset(u32);

impl DeferredOffset {
    #[inline]
    pub(crate) const fn new(raw: u32) -> Self {
        DeferredOffset(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Jump target.
///
/// Backward jumps use a `Fixed` position taken before the target code was
/// emitted. Forward jumps use a `Deferred` offset resolved later; a sealed
/// [`ControlFlow`](crate::ControlFlow) only contains fixed offsets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Offset {
    Fixed(u32),
    Deferred(DeferredOffset),
}

impl Offset {
    /// The target position, if fixed.
    pub const fn position(self) -> Option<u32> {
        match self {
            Offset::Fixed(pos) => Some(pos),
            Offset::Deferred(_) => None,
        }
    }
}

impl From<DeferredOffset> for Offset {
    fn from(offset: DeferredOffset) -> Self {
        Offset::Deferred(offset)
    }
}

/// Value pushed by [`Instruction::Push`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DfValue {
    /// Any value of any type.
    Top,
    Const(Literal),
}

impl DfValue {
    pub const TRUE: DfValue = DfValue::Const(Literal::Bool(true));
    pub const FALSE: DfValue = DfValue::Const(Literal::Bool(false));

    pub const fn bool(value: bool) -> DfValue {
        DfValue::Const(Literal::Bool(value))
    }
}

/// When a [`Instruction::CondGoto`] jumps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum JumpCondition {
    True,
    False,
    Null,
}

impl JumpCondition {
    pub const fn when(value: bool) -> JumpCondition {
        if value {
            JumpCondition::True
        } else {
            JumpCondition::False
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            JumpCondition::True => "true",
            JumpCondition::False => "false",
            JumpCondition::Null => "null",
        }
    }
}

/// Integral operation of a [`Instruction::NumericBinary`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MathOp {
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Ushr,
    And,
    Or,
    Xor,
}

impl MathOp {
    /// The operation behind an arithmetic or infix operator.
    ///
    /// Compound assignments map through [`BinaryOp::compound_base`] first.
    pub const fn from_binary(op: BinaryOp) -> Option<MathOp> {
        Some(match op {
            BinaryOp::Add => MathOp::Plus,
            BinaryOp::Sub => MathOp::Minus,
            BinaryOp::Mul => MathOp::Mul,
            BinaryOp::Div => MathOp::Div,
            BinaryOp::Rem => MathOp::Mod,
            BinaryOp::Shl => MathOp::Shl,
            BinaryOp::Shr => MathOp::Shr,
            BinaryOp::Ushr => MathOp::Ushr,
            BinaryOp::And => MathOp::And,
            BinaryOp::Or => MathOp::Or,
            BinaryOp::Xor => MathOp::Xor,
            _ => return None,
        })
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, MathOp::Shl | MathOp::Shr | MathOp::Ushr)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            MathOp::Plus => "+",
            MathOp::Minus => "-",
            MathOp::Mul => "*",
            MathOp::Div => "/",
            MathOp::Mod => "%",
            MathOp::Shl => "shl",
            MathOp::Shr => "shr",
            MathOp::Ushr => "ushr",
            MathOp::And => "and",
            MathOp::Or => "or",
            MathOp::Xor => "xor",
        }
    }
}

/// Comparison performed by a [`Instruction::BooleanBinary`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RelationType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelationType {
    /// `===` and `!==` compare identity, so they map to `Eq`/`Ne` too.
    pub const fn from_binary(op: BinaryOp) -> Option<RelationType> {
        Some(match op {
            BinaryOp::Eq | BinaryOp::Identity => RelationType::Eq,
            BinaryOp::NotEq | BinaryOp::NotIdentity => RelationType::Ne,
            BinaryOp::Lt => RelationType::Lt,
            BinaryOp::LtEq => RelationType::Le,
            BinaryOp::Gt => RelationType::Gt,
            BinaryOp::GtEq => RelationType::Ge,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RelationType::Eq => "==",
            RelationType::Ne => "!=",
            RelationType::Lt => "<",
            RelationType::Le => "<=",
            RelationType::Gt => ">",
            RelationType::Ge => ">=",
        }
    }
}

/// A handler a `return` must pass through on its way out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    Catch { anchor: ExprId },
    Finally { anchor: ExprId },
}

/// Immutable list of active traps, innermost first.
///
/// Cloning shares the underlying list; [`Traps::with`] builds a new list
/// without touching the old one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Traps(Option<Arc<[Trap]>>);

impl Traps {
    pub const fn empty() -> Traps {
        Traps(None)
    }

    /// A new list with `trap` as the innermost entry.
    #[must_use]
    pub fn with(&self, trap: Trap) -> Traps {
        let list: Arc<[Trap]> = std::iter::once(trap).chain(self.iter()).collect();
        Traps(Some(list))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn len(&self) -> usize {
        self.0.as_deref().map_or(0, <[Trap]>::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = Trap> + '_ {
        self.0.as_deref().unwrap_or(&[]).iter().copied()
    }
}

/// A single stack-machine instruction.
///
/// Anchors tie an instruction to the expression it was lowered from, so
/// analysis results can be reported back against the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Push {
        value: DfValue,
        anchor: Option<ExprId>,
    },
    PushVar {
        var: VarId,
        anchor: ExprId,
    },
    Pop,
    Dup,
    Swap,
    /// Pop a value and jump to `target` if it matches `when`.
    CondGoto {
        target: Offset,
        when: JumpCondition,
        anchor: Option<ExprId>,
    },
    Goto {
        target: Offset,
    },
    NumericBinary {
        op: MathOp,
        anchor: Option<ExprId>,
    },
    Not {
        anchor: ExprId,
    },
    BooleanBinary {
        relation: RelationType,
        /// `==`/`!=` compare by `equals`, not by identity.
        by_content: bool,
        anchor: ExprId,
    },
    /// Store the top of the stack into `var`, leaving it on the stack.
    Assign {
        var: VarId,
        anchor: ExprId,
    },
    PrimitiveConversion {
        target: PrimitiveType,
    },
    /// Forget everything known about object fields.
    FlushFields,
    Return {
        traps: Traps,
    },
    /// End of a source element's evaluation. `None` marks a plain
    /// statement boundary.
    FinishElement {
        element: Option<ExprId>,
    },
    /// Pop `arity` values and push an unknown result.
    EvalUnknown {
        anchor: ExprId,
        arity: u32,
    },
    ResultOf {
        anchor: ExprId,
    },
}

impl Instruction {
    /// Number of values popped and pushed.
    pub const fn stack_effect(&self) -> (u32, u32) {
        match self {
            Instruction::Push { .. } | Instruction::PushVar { .. } => (0, 1),
            Instruction::Pop | Instruction::CondGoto { .. } | Instruction::Return { .. } => (1, 0),
            Instruction::Dup => (1, 2),
            Instruction::Swap => (2, 2),
            Instruction::Goto { .. }
            | Instruction::FlushFields
            | Instruction::FinishElement { .. }
            | Instruction::ResultOf { .. } => (0, 0),
            Instruction::NumericBinary { .. } | Instruction::BooleanBinary { .. } => (2, 1),
            Instruction::Not { .. }
            | Instruction::Assign { .. }
            | Instruction::PrimitiveConversion { .. } => (1, 1),
            Instruction::EvalUnknown { arity, .. } => (*arity, 1),
        }
    }

    /// Jump target, for `Goto` and `CondGoto`.
    pub const fn target(&self) -> Option<Offset> {
        match self {
            Instruction::Goto { target } | Instruction::CondGoto { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// `true` if execution never continues at the next instruction.
    pub const fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Goto { .. } | Instruction::Return { .. })
    }

    pub(crate) fn set_target(&mut self, offset: Offset) {
        if let Instruction::Goto { target } | Instruction::CondGoto { target, .. } = self {
            *target = offset;
        }
    }

    /// Short lowercase mnemonic used in listings.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push { .. } => "push",
            Instruction::PushVar { .. } => "push_var",
            Instruction::Pop => "pop",
            Instruction::Dup => "dup",
            Instruction::Swap => "swap",
            Instruction::CondGoto { .. } => "cond_goto",
            Instruction::Goto { .. } => "goto",
            Instruction::NumericBinary { .. } => "numeric_binary",
            Instruction::Not { .. } => "not",
            Instruction::BooleanBinary { .. } => "boolean_binary",
            Instruction::Assign { .. } => "assign",
            Instruction::PrimitiveConversion { .. } => "primitive_conversion",
            Instruction::FlushFields => "flush_fields",
            Instruction::Return { .. } => "return",
            Instruction::FinishElement { .. } => "finish_element",
            Instruction::EvalUnknown { .. } => "eval_unknown",
            Instruction::ResultOf { .. } => "result_of",
        }
    }
}
