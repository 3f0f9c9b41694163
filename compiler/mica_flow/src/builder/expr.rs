//! Dispatch and the simple leaf and unary constructs.

use mica_ir::stack::grow_if_needed;
use mica_ir::{DeclId, ExprId, ExprKind, Literal, PrefixOp, PrimitiveType, Ty};

use super::{FlowBuilder, Lowered};
use crate::{DfValue, Instruction, MathOp};

impl FlowBuilder<'_> {
    /// Lower `id`, leaving its value on the stack.
    pub(crate) fn lower(&mut self, id: ExprId) -> Lowered {
        grow_if_needed(|| self.lower_inner(id))
    }

    /// Lower an optional expression; an absent one is an unknown value.
    pub(crate) fn lower_opt(&mut self, id: Option<ExprId>) -> Lowered {
        match id {
            Some(id) => self.lower(id),
            None => {
                self.push_unknown();
                Ok(())
            }
        }
    }

    fn lower_inner(&mut self, id: ExprId) -> Lowered {
        match *self.arena.kind(id) {
            ExprKind::Block(stmts) => self.lower_block(stmts),
            ExprKind::Paren(inner) => self.lower(inner),
            ExprKind::Return { label, value } => self.lower_return(id, label, value),
            ExprKind::Binary { op, left, right } => self.lower_binary(id, op, left, right),
            ExprKind::Prefix { op, operand } => self.lower_prefix(id, op, operand),
            ExprKind::Literal(lit) => {
                self.emit(Instruction::Push {
                    value: DfValue::Const(lit),
                    anchor: Some(id),
                });
                Ok(())
            }
            ExprKind::Ident(_) => self.lower_name(id),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(id, cond, then_branch, else_branch),
            ExprKind::While { cond, body } => self.lower_while(id, cond, body),
            ExprKind::DoWhile { body, cond } => self.lower_do_while(id, body, cond),
            ExprKind::LocalDecl { decl, init } => self.lower_local(id, decl, init),
            ExprKind::Field { receiver, .. } => {
                self.lower(receiver)?;
                self.emit(Instruction::EvalUnknown {
                    anchor: id,
                    arity: 1,
                });
                Ok(())
            }
            ExprKind::This
            | ExprKind::Postfix { .. }
            | ExprKind::TypeTest { .. }
            | ExprKind::Call { .. }
            | ExprKind::Labeled { .. }
            | ExprKind::Lambda { .. }
            | ExprKind::Break
            | ExprKind::Continue
            | ExprKind::Error => Err(self.unsupported(id, self.arena.kind(id).describe())),
        }
    }

    fn lower_name(&mut self, id: ExprId) -> Lowered {
        let Some(var) = self.slot(id) else {
            return Err(self.unsupported(id, "non-local reference"));
        };
        self.emit(Instruction::PushVar { var, anchor: id });
        Ok(())
    }

    /// `val x = init`: evaluate, convert to the declared type, assign.
    ///
    /// Without an initializer the declaration only yields an unknown value.
    fn lower_local(&mut self, id: ExprId, decl: DeclId, init: Option<ExprId>) -> Lowered {
        let Some(init) = init else {
            self.push_unknown();
            return Ok(());
        };
        let var = self.variable(decl);
        self.lower(init)?;
        self.convert(Some(init), self.oracle.decl_type(decl));
        self.emit(Instruction::Assign { var, anchor: id });
        Ok(())
    }

    fn lower_prefix(&mut self, id: ExprId, op: PrefixOp, operand: Option<ExprId>) -> Lowered {
        self.lower_opt(operand)?;
        if let Some(operand) = operand {
            let ty = self.oracle.expr_type(operand);
            if let Some(ty) = ty.filter(|ty| ty.is_integral()) {
                match op {
                    PrefixOp::Inc | PrefixOp::Dec => {
                        if let Some(var) = self.slot(operand) {
                            let op = if op == PrefixOp::Inc {
                                MathOp::Plus
                            } else {
                                MathOp::Minus
                            };
                            self.push_integral(ty, 1);
                            self.emit(Instruction::NumericBinary { op, anchor: None });
                            self.emit(Instruction::Assign { var, anchor: id });
                            return Ok(());
                        }
                    }
                    PrefixOp::Plus => return Ok(()),
                    PrefixOp::Minus => {
                        self.push_integral(ty, 0);
                        self.emit(Instruction::Swap);
                        self.emit(Instruction::NumericBinary {
                            op: MathOp::Minus,
                            anchor: Some(id),
                        });
                        return Ok(());
                    }
                    PrefixOp::Not => {}
                }
            }
            if op == PrefixOp::Not && ty.is_some_and(Ty::is_boolean) {
                self.emit(Instruction::Not { anchor: id });
                return Ok(());
            }
        }
        self.emit(Instruction::EvalUnknown {
            anchor: id,
            arity: 1,
        });
        Ok(())
    }

    /// Push `value` as a constant of integral type `ty`.
    ///
    /// There are no `Byte` or `Short` literals, so those constants are
    /// pushed as `Int` and narrowed.
    fn push_integral(&mut self, ty: Ty, value: i32) {
        let lit = if ty.is_long() {
            Literal::Long(i64::from(value))
        } else {
            Literal::Int(value)
        };
        self.emit(Instruction::Push {
            value: DfValue::Const(lit),
            anchor: None,
        });
        if let Some(target @ (PrimitiveType::Byte | PrimitiveType::Short)) = ty.primitive() {
            self.emit(Instruction::PrimitiveConversion { target });
        }
    }
}
