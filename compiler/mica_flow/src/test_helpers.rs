//! Shared test utilities: build flows from source and run them concretely.

use mica_ir::{ExprId, ExprKind, Literal, PrimitiveType, StringInterner};
use mica_parse::{parse, ParseOutput};
use mica_types::{resolve, Resolution};
use rustc_hash::FxHashMap;

use crate::{
    build_flow_with, BuildError, BuildOptions, ControlFlow, DfValue, Instruction, JumpCondition,
    MathOp, Offset, RelationType, VarId,
};

/// A parsed and resolved source, ready to lower.
pub(crate) struct Source {
    pub interner: StringInterner,
    pub output: ParseOutput,
    pub resolution: Resolution,
}

impl Source {
    /// Parse and resolve `text`, failing the test on any diagnostic.
    pub(crate) fn new(text: &str) -> Self {
        let interner = StringInterner::new();
        let output = parse(text, &interner);
        assert_eq!(output.errors, vec![], "unexpected parse errors");
        let resolution = resolve(&output.arena, &interner, output.root, output.params());
        assert_eq!(resolution.diagnostics, vec![], "unexpected resolve errors");
        Source {
            interner,
            output,
            resolution,
        }
    }

    pub(crate) fn build(&self) -> Result<ControlFlow, BuildError> {
        self.build_with(BuildOptions::default())
    }

    pub(crate) fn build_with(&self, options: BuildOptions) -> Result<ControlFlow, BuildError> {
        build_flow_with(
            &self.output.arena,
            self.output.root,
            &self.resolution.table,
            options,
        )
    }

    /// The root's statements, or the root itself if it is not a block.
    pub(crate) fn statements(&self) -> Vec<ExprId> {
        match *self.output.arena.kind(self.output.root) {
            ExprKind::Block(stmts) => self.output.arena.get_expr_list(stmts).to_vec(),
            _ => vec![self.output.root],
        }
    }
}

/// Build `text` and list the flow.
pub(crate) fn listing(text: &str) -> String {
    let source = Source::new(text);
    let flow = source.build().unwrap();
    flow.display(&source.interner).to_string()
}

/// Concrete value on the interpreter's stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Value {
    Known(Literal),
    Unknown,
}

/// Result of [`run`].
#[derive(Debug, Default)]
pub(crate) struct Trace {
    /// Positions executed, in order.
    pub executed: Vec<u32>,
    pub stack: Vec<Value>,
    pub vars: FxHashMap<VarId, Value>,
    pub returned: bool,
}

impl Trace {
    pub(crate) fn ran(&self, pos: u32) -> bool {
        self.executed.contains(&pos)
    }
}

const STEP_LIMIT: usize = 10_000;

/// Execute `flow` with concrete values.
///
/// Panics if a conditional jump sees an unknown value or the step limit is
/// exceeded.
pub(crate) fn run(flow: &ControlFlow) -> Trace {
    let mut trace = Trace::default();
    let mut pc = 0u32;
    while let Some(inst) = flow.get(pc) {
        assert!(trace.executed.len() < STEP_LIMIT, "step limit exceeded");
        trace.executed.push(pc);
        let stack = &mut trace.stack;
        let mut next = pc + 1;
        match inst {
            Instruction::Push { value, .. } => stack.push(match value {
                DfValue::Top => Value::Unknown,
                DfValue::Const(lit) => Value::Known(*lit),
            }),
            Instruction::PushVar { var, .. } => {
                stack.push(trace.vars.get(var).copied().unwrap_or(Value::Unknown));
            }
            Instruction::Pop => {
                stack.pop().unwrap();
            }
            Instruction::Dup => {
                let top = *stack.last().unwrap();
                stack.push(top);
            }
            Instruction::Swap => {
                let len = stack.len();
                stack.swap(len - 1, len - 2);
            }
            Instruction::CondGoto { target, when, .. } => {
                let value = stack.pop().unwrap();
                let taken = match (when, value) {
                    (JumpCondition::True, Value::Known(Literal::Bool(b))) => b,
                    (JumpCondition::False, Value::Known(Literal::Bool(b))) => !b,
                    (JumpCondition::Null, Value::Known(lit)) => lit == Literal::Null,
                    _ => panic!("condition at {pc} is not concrete: {value:?}"),
                };
                if taken {
                    next = fixed(*target);
                }
            }
            Instruction::Goto { target } => next = fixed(*target),
            Instruction::NumericBinary { op, .. } => {
                let right = stack.pop().unwrap();
                let left = stack.pop().unwrap();
                stack.push(math(*op, left, right));
            }
            Instruction::Not { .. } => {
                let value = match stack.pop().unwrap() {
                    Value::Known(Literal::Bool(b)) => Value::Known(Literal::Bool(!b)),
                    _ => Value::Unknown,
                };
                stack.push(value);
            }
            Instruction::BooleanBinary { relation, .. } => {
                let right = stack.pop().unwrap();
                let left = stack.pop().unwrap();
                stack.push(compare(*relation, left, right));
            }
            Instruction::Assign { var, .. } => {
                let top = *stack.last().unwrap();
                trace.vars.insert(*var, top);
            }
            Instruction::PrimitiveConversion { target } => {
                let value = stack.pop().unwrap();
                stack.push(convert(value, *target));
            }
            Instruction::EvalUnknown { arity, .. } => {
                for _ in 0..*arity {
                    stack.pop().unwrap();
                }
                stack.push(Value::Unknown);
            }
            Instruction::Return { .. } => {
                stack.pop().unwrap();
                trace.returned = true;
                break;
            }
            Instruction::FlushFields
            | Instruction::FinishElement { .. }
            | Instruction::ResultOf { .. } => {}
        }
        pc = next;
    }
    trace
}

fn fixed(offset: Offset) -> u32 {
    offset.position().unwrap()
}

fn as_long(value: Value) -> Option<i64> {
    match value {
        Value::Known(Literal::Int(v)) => Some(i64::from(v)),
        Value::Known(Literal::Long(v)) => Some(v),
        _ => None,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Int arithmetic wraps like the JVM"
)]
fn math(op: MathOp, left: Value, right: Value) -> Value {
    let (Some(a), Some(b)) = (as_long(left), as_long(right)) else {
        return Value::Unknown;
    };
    let result = match op {
        MathOp::Plus => a.wrapping_add(b),
        MathOp::Minus => a.wrapping_sub(b),
        MathOp::Mul => a.wrapping_mul(b),
        _ => return Value::Unknown,
    };
    match left {
        Value::Known(Literal::Int(_)) => Value::Known(Literal::Int(result as i32)),
        _ => Value::Known(Literal::Long(result)),
    }
}

fn compare(relation: RelationType, left: Value, right: Value) -> Value {
    if let (Value::Known(Literal::Bool(a)), Value::Known(Literal::Bool(b))) = (left, right) {
        return match relation {
            RelationType::Eq => Value::Known(Literal::Bool(a == b)),
            RelationType::Ne => Value::Known(Literal::Bool(a != b)),
            _ => Value::Unknown,
        };
    }
    let (Some(a), Some(b)) = (as_long(left), as_long(right)) else {
        return Value::Unknown;
    };
    let result = match relation {
        RelationType::Eq => a == b,
        RelationType::Ne => a != b,
        RelationType::Lt => a < b,
        RelationType::Le => a <= b,
        RelationType::Gt => a > b,
        RelationType::Ge => a >= b,
    };
    Value::Known(Literal::Bool(result))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "narrowing conversion truncates like the JVM"
)]
fn convert(value: Value, target: PrimitiveType) -> Value {
    match (as_long(value), target) {
        (Some(v), PrimitiveType::Long) => Value::Known(Literal::Long(v)),
        (Some(v), PrimitiveType::Int) => Value::Known(Literal::Int(v as i32)),
        _ => Value::Unknown,
    }
}
