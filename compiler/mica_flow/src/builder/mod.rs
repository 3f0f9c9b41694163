//! Expression tree → instruction stream lowering.
//!
//! [`build_flow`] walks the tree post-order. Every lowering step leaves
//! exactly one value on the abstract stack, or fails with
//! [`BuildError::Unsupported`]; a single unsupported construct anywhere
//! fails the whole build and no partial stream escapes.
//!
//! # Layout
//!
//! - `expr.rs`: dispatch, names, constants, prefix operators, declarations
//! - `operators.rs`: binary operators, assignment, short-circuit and elvis
//! - `control_flow.rs`: blocks, `if`, loops, `return`

mod control_flow;
mod expr;
mod operators;

use mica_ir::{DeclId, ExprArena, ExprId, Ty, TypeOracle};
use tracing::{debug, trace};

use crate::{BuildError, ControlFlow, DfValue, Instruction, InstructionStream, Traps, VarId};

/// Knobs for [`build_flow_with`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Pop the root's value at the end of the flow.
    pub trailing_pop: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions { trailing_pop: true }
    }
}

/// Lower the tree rooted at `root` with default options.
pub fn build_flow(
    arena: &ExprArena,
    root: ExprId,
    oracle: &dyn TypeOracle,
) -> Result<ControlFlow, BuildError> {
    build_flow_with(arena, root, oracle, BuildOptions::default())
}

/// Lower the tree rooted at `root`.
pub fn build_flow_with(
    arena: &ExprArena,
    root: ExprId,
    oracle: &dyn TypeOracle,
    options: BuildOptions,
) -> Result<ControlFlow, BuildError> {
    let mut builder = FlowBuilder::new(arena, oracle);
    builder.lower(root)?;
    if options.trailing_pop {
        builder.emit(Instruction::Pop);
    }
    let flow = builder.stream.finish()?;
    debug!(
        instructions = flow.len(),
        variables = flow.variables().len(),
        "built flow"
    );
    Ok(flow)
}

type Lowered = Result<(), BuildError>;

pub(crate) struct FlowBuilder<'a> {
    arena: &'a ExprArena,
    oracle: &'a dyn TypeOracle,
    stream: InstructionStream,
    /// Handlers active at the current point. No lowered construct installs one yet.
    traps: Traps,
}

impl<'a> FlowBuilder<'a> {
    fn new(arena: &'a ExprArena, oracle: &'a dyn TypeOracle) -> Self {
        FlowBuilder {
            arena,
            oracle,
            stream: InstructionStream::new(),
            traps: Traps::empty(),
        }
    }

    fn emit(&mut self, instruction: Instruction) -> u32 {
        self.stream.append(instruction)
    }

    fn push_unknown(&mut self) {
        self.emit(Instruction::Push {
            value: DfValue::Top,
            anchor: None,
        });
    }

    fn unsupported(&self, id: ExprId, kind: &'static str) -> BuildError {
        let span = self.arena.span(id);
        debug!(kind, ?span, "unsupported construct");
        BuildError::Unsupported { kind, span }
    }

    fn ty(&self, id: Option<ExprId>) -> Option<Ty> {
        id.and_then(|id| self.oracle.expr_type(id))
    }

    /// Variable slot for a simple name that refers to a local.
    fn slot(&mut self, id: ExprId) -> Option<VarId> {
        let decl = self.oracle.resolve_local(id)?;
        Some(self.variable(decl))
    }

    fn variable(&mut self, decl: DeclId) -> VarId {
        let name = self.arena.get_decl(decl).name;
        let ty = self.oracle.decl_type(decl);
        self.stream.variable(decl, name, ty)
    }

    /// Convert the value of `expr` from `actual` to `expected`.
    ///
    /// Only primitive-to-primitive conversions are emitted; boxed and
    /// reference types are left alone.
    fn convert_from(&mut self, expr: Option<ExprId>, actual: Option<Ty>, expected: Option<Ty>) {
        if expr.is_none() {
            return;
        }
        let (Some(actual), Some(expected)) = (actual, expected) else {
            return;
        };
        if actual == expected {
            return;
        }
        if let (Some(_), Some(target)) = (actual.primitive(), expected.primitive()) {
            trace!(%actual, %expected, "implicit conversion");
            self.emit(Instruction::PrimitiveConversion { target });
        }
    }

    fn convert(&mut self, expr: Option<ExprId>, expected: Option<Ty>) {
        let actual = self.ty(expr);
        self.convert_from(expr, actual, expected);
    }
}

/// Common type of a comparison or compound assignment's operands.
///
/// `Double` beats `Float` beats `Long`, checking the left side first at
/// each rank. `None` means no conversion is needed.
fn balance_type(left: Option<Ty>, right: Option<Ty>) -> Option<Ty> {
    let (left, right) = (left?, right?);
    let ranks: [fn(Ty) -> bool; 3] = [Ty::is_double, Ty::is_float, Ty::is_long];
    ranks
        .into_iter()
        .find_map(|is_rank| [left, right].into_iter().find(|&ty| is_rank(ty)))
}

#[cfg(test)]
mod tests;
