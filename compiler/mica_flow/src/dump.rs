//! Textual listing of a [`ControlFlow`].
//!
//! One instruction per line, `index: mnemonic operands`:
//!
//! ```text
//! 0: push 0
//! 1: assign x
//! 2: pop
//! 3: push_var x
//! 4: push 1
//! 5: numeric_binary +
//! 6: assign x
//! 7: finish_element #6
//! 8: pop
//! ```
//!
//! for `var x = 0` followed by `x = x + 1`. Unresolved jump targets print
//! as `?n`, which only happens for hand-built instructions.

use std::fmt;

use mica_ir::pretty::literal_to_string;
use mica_ir::StringInterner;

use crate::{ControlFlow, DfValue, Instruction, Offset, RelationType, VarId};

/// Borrowed view that formats a flow with variable names resolved.
pub struct FlowDisplay<'a> {
    flow: &'a ControlFlow,
    interner: &'a StringInterner,
}

impl ControlFlow {
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> FlowDisplay<'a> {
        FlowDisplay {
            flow: self,
            interner,
        }
    }
}

impl FlowDisplay<'_> {
    fn var(&self, var: VarId) -> &str {
        self.interner.lookup(self.flow.variable(var).name)
    }

    fn write_instruction(&self, f: &mut fmt::Formatter<'_>, inst: &Instruction) -> fmt::Result {
        f.write_str(inst.mnemonic())?;
        match inst {
            Instruction::Push { value, .. } => match value {
                DfValue::Top => f.write_str(" top"),
                DfValue::Const(lit) => write!(f, " {}", literal_to_string(*lit, self.interner)),
            },
            Instruction::PushVar { var, .. } | Instruction::Assign { var, .. } => {
                write!(f, " {}", self.var(*var))
            }
            Instruction::CondGoto { target, when, .. } => {
                write!(f, " {} if {}", OffsetDisplay(*target), when.as_str())
            }
            Instruction::Goto { target } => write!(f, " {}", OffsetDisplay(*target)),
            Instruction::NumericBinary { op, .. } => write!(f, " {}", op.as_str()),
            Instruction::BooleanBinary {
                relation,
                by_content,
                ..
            } => {
                write!(f, " {}", relation.as_str())?;
                if !by_content && matches!(relation, RelationType::Eq | RelationType::Ne) {
                    f.write_str(" identity")?;
                }
                Ok(())
            }
            Instruction::PrimitiveConversion { target } => write!(f, " {target}"),
            Instruction::Return { traps } if !traps.is_empty() => {
                write!(f, " traps={}", traps.len())
            }
            Instruction::FinishElement {
                element: Some(element),
            } => write!(f, " #{}", element.raw()),
            Instruction::EvalUnknown { arity, .. } => write!(f, " {arity}"),
            Instruction::Pop
            | Instruction::Dup
            | Instruction::Swap
            | Instruction::Not { .. }
            | Instruction::FlushFields
            | Instruction::Return { .. }
            | Instruction::FinishElement { element: None }
            | Instruction::ResultOf { .. } => Ok(()),
        }
    }
}

impl fmt::Display for FlowDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, inst) in self.flow.instructions().iter().enumerate() {
            write!(f, "{index}: ")?;
            self.write_instruction(f, inst)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

struct OffsetDisplay(Offset);

impl fmt::Display for OffsetDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Offset::Fixed(pos) => write!(f, "{pos}"),
            Offset::Deferred(offset) => write!(f, "?{}", offset.raw()),
        }
    }
}
