//! Blocks, conditionals, loops and `return`.

use mica_ir::{ExprId, ExprRange, Name};
use tracing::trace;

use super::{FlowBuilder, Lowered};
use crate::{Instruction, JumpCondition};

impl FlowBuilder<'_> {
    /// Statements in order, discarding every value but the last.
    pub(crate) fn lower_block(&mut self, stmts: ExprRange) -> Lowered {
        let arena = self.arena;
        let stmts = arena.get_expr_list(stmts);
        let Some((&last, init)) = stmts.split_last() else {
            self.push_unknown();
            return Ok(());
        };
        for &stmt in init {
            self.lower(stmt)?;
            self.emit(Instruction::Pop);
        }
        self.lower(last)
    }

    pub(crate) fn lower_return(
        &mut self,
        id: ExprId,
        label: Option<Name>,
        value: Option<ExprId>,
    ) -> Lowered {
        if label.is_some() {
            return Err(self.unsupported(id, "labeled return"));
        }
        self.lower_opt(value)?;
        self.emit(Instruction::Return {
            traps: self.traps.clone(),
        });
        Ok(())
    }

    pub(crate) fn lower_if(
        &mut self,
        id: ExprId,
        cond: Option<ExprId>,
        then_branch: Option<ExprId>,
        else_branch: Option<ExprId>,
    ) -> Lowered {
        self.lower_opt(cond)?;
        let skip_then = self.stream.deferred();
        self.emit(Instruction::CondGoto {
            target: skip_then.into(),
            when: JumpCondition::False,
            anchor: cond,
        });
        self.emit(Instruction::FinishElement { element: None });
        self.lower_opt(then_branch)?;

        let skip_else = self.stream.deferred();
        self.emit(Instruction::Goto {
            target: skip_else.into(),
        });
        self.stream.resolve(skip_then);
        self.emit(Instruction::FinishElement { element: None });
        self.lower_opt(else_branch)?;
        self.stream.resolve(skip_else);
        self.emit(Instruction::FinishElement { element: Some(id) });
        Ok(())
    }

    /// The loop head is the condition; the body's value is discarded on
    /// every iteration and the loop itself yields an unknown value.
    pub(crate) fn lower_while(
        &mut self,
        id: ExprId,
        cond: Option<ExprId>,
        body: Option<ExprId>,
    ) -> Lowered {
        let head = self.stream.fixed_here();
        trace!(?head, "while head");
        self.lower_opt(cond)?;
        let exit = self.stream.deferred();
        self.emit(Instruction::CondGoto {
            target: exit.into(),
            when: JumpCondition::False,
            anchor: cond,
        });
        self.lower_opt(body)?;
        self.emit(Instruction::Pop);
        self.emit(Instruction::Goto { target: head });
        self.stream.resolve(exit);
        self.push_unknown();
        self.emit(Instruction::FinishElement { element: Some(id) });
        Ok(())
    }

    pub(crate) fn lower_do_while(
        &mut self,
        id: ExprId,
        body: Option<ExprId>,
        cond: Option<ExprId>,
    ) -> Lowered {
        let head = self.stream.fixed_here();
        trace!(?head, "do-while head");
        self.lower_opt(body)?;
        self.emit(Instruction::Pop);
        self.lower_opt(cond)?;
        self.emit(Instruction::CondGoto {
            target: head,
            when: JumpCondition::True,
            anchor: None,
        });
        self.push_unknown();
        self.emit(Instruction::FinishElement { element: Some(id) });
        Ok(())
    }
}
