//! Binary operators.
//!
//! Classification order matters: comparisons first, then arithmetic on an
//! integral left operand, then `&&`/`||`, assignments and `?:`. Anything
//! else is evaluated as an unknown call.

use mica_ir::{BinaryOp, ExprId};
use tracing::trace;

use super::{balance_type, FlowBuilder, Lowered};
use crate::{DfValue, Instruction, JumpCondition, MathOp, RelationType};

impl FlowBuilder<'_> {
    pub(crate) fn lower_binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        left: Option<ExprId>,
        right: Option<ExprId>,
    ) -> Lowered {
        if let Some(relation) = RelationType::from_binary(op) {
            let by_content = matches!(op, BinaryOp::Eq | BinaryOp::NotEq);
            return self.lower_relation(id, relation, by_content, left, right);
        }
        if self.ty(left).is_some_and(|ty| ty.is_integral()) {
            if let Some(math) = MathOp::from_binary(op) {
                return self.lower_math(id, math, left, right);
            }
        }
        match op {
            BinaryOp::AndAnd => self.lower_short_circuit(id, true, left, right),
            BinaryOp::OrOr => self.lower_short_circuit(id, false, left, right),
            BinaryOp::Elvis => self.lower_elvis(left, right),
            _ if op.is_assignment() => self.lower_assignment(id, op, left, right),
            _ => {
                trace!(%op, "operator evaluated as unknown");
                self.lower_opt(left)?;
                self.lower_opt(right)?;
                self.emit(Instruction::EvalUnknown {
                    anchor: id,
                    arity: 2,
                });
                self.emit(Instruction::FlushFields);
                Ok(())
            }
        }
    }

    fn lower_relation(
        &mut self,
        id: ExprId,
        relation: RelationType,
        by_content: bool,
        left: Option<ExprId>,
        right: Option<ExprId>,
    ) -> Lowered {
        let balanced = balance_type(self.ty(left), self.ty(right));
        self.lower_opt(left)?;
        self.convert(left, balanced);
        self.lower_opt(right)?;
        self.convert(right, balanced);
        let instruction = if left.is_none() || right.is_none() {
            Instruction::EvalUnknown {
                anchor: id,
                arity: 2,
            }
        } else {
            Instruction::BooleanBinary {
                relation,
                by_content,
                anchor: id,
            }
        };
        self.emit(instruction);
        Ok(())
    }

    fn lower_math(
        &mut self,
        id: ExprId,
        op: MathOp,
        left: Option<ExprId>,
        right: Option<ExprId>,
    ) -> Lowered {
        let result = self.oracle.expr_type(id);
        self.lower_opt(left)?;
        self.convert(left, result);
        self.lower_opt(right)?;
        // The shift distance keeps its own type.
        if !op.is_shift() {
            self.convert(right, result);
        }
        self.emit(Instruction::NumericBinary {
            op,
            anchor: Some(id),
        });
        Ok(())
    }

    /// `left && right` / `left || right`.
    ///
    /// The left value decides whether `right` runs at all; when it does not,
    /// the result is the short-circuit constant.
    fn lower_short_circuit(
        &mut self,
        id: ExprId,
        and: bool,
        left: Option<ExprId>,
        right: Option<ExprId>,
    ) -> Lowered {
        let end = self.stream.deferred();
        self.lower_opt(left)?;
        let next = self.stream.deferred();
        self.emit(Instruction::CondGoto {
            target: next.into(),
            when: JumpCondition::when(and),
            anchor: left,
        });
        self.emit(Instruction::Push {
            value: DfValue::bool(!and),
            anchor: Some(id),
        });
        self.emit(Instruction::Goto { target: end.into() });
        self.stream.resolve(next);
        self.emit(Instruction::FinishElement { element: None });
        self.lower_opt(right)?;
        self.stream.resolve(end);
        self.emit(Instruction::ResultOf { anchor: id });
        Ok(())
    }

    /// `left ?: right`: keep a non-null left value, else evaluate `right`.
    fn lower_elvis(&mut self, left: Option<ExprId>, right: Option<ExprId>) -> Lowered {
        self.lower_opt(left)?;
        self.emit(Instruction::Dup);
        let is_null = self.stream.deferred();
        self.emit(Instruction::CondGoto {
            target: is_null.into(),
            when: JumpCondition::Null,
            anchor: None,
        });
        let end = self.stream.deferred();
        self.emit(Instruction::Goto { target: end.into() });
        self.stream.resolve(is_null);
        self.emit(Instruction::Pop);
        self.lower_opt(right)?;
        self.stream.resolve(end);
        Ok(())
    }

    /// `=` and the compound assignments.
    ///
    /// Only simple names of locals are tracked. Any other target is
    /// evaluated and discarded, and the store becomes a field-flush barrier.
    fn lower_assignment(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        left: Option<ExprId>,
        right: Option<ExprId>,
    ) -> Lowered {
        let left_ty = self.ty(left);
        let Some(var) = left.and_then(|left| self.slot(left)) else {
            trace!("assignment to untracked target");
            self.lower_opt(left)?;
            self.emit(Instruction::Pop);
            self.lower_opt(right)?;
            self.convert(right, left_ty);
            self.emit(Instruction::FlushFields);
            return Ok(());
        };

        if let Some(math) = op.compound_base().and_then(MathOp::from_binary) {
            let result = balance_type(left_ty, self.ty(right));
            self.lower_opt(left)?;
            self.convert(left, result);
            self.lower_opt(right)?;
            self.convert(right, result);
            self.emit(Instruction::NumericBinary {
                op: math,
                anchor: Some(id),
            });
            self.convert_from(right, result, left_ty);
        } else {
            self.lower_opt(right)?;
            self.convert(right, left_ty);
        }
        self.emit(Instruction::Assign { var, anchor: id });
        self.emit(Instruction::FinishElement { element: Some(id) });
        Ok(())
    }
}
