//! Control-flow construction for dataflow analysis.
//!
//! Lowers a resolved Mica expression tree into a linear stack-machine
//! [`ControlFlow`]: pushes, pops, jumps, numeric and boolean operations,
//! and assignments to local variable slots. An abstract interpreter can
//! then run the flow to track values through branches and loops.
//!
//! ```text
//! ExprArena + TypeOracle ──▶ build_flow ──▶ InstructionStream ──finish──▶ ControlFlow
//! ```
//!
//! Lowering is all-or-nothing: constructs without a lowering (calls,
//! lambdas, labeled returns, ...) fail the whole build with
//! [`BuildError::Unsupported`].

mod builder;
mod dump;
mod error;
mod instruction;
mod stream;

#[cfg(test)]
mod test_helpers;

pub use builder::{build_flow, build_flow_with, BuildOptions};
pub use dump::FlowDisplay;
pub use error::{BuildError, FlowError};
pub use instruction::{
    DeferredOffset, DfValue, Instruction, JumpCondition, MathOp, Offset, RelationType, Trap,
    Traps, VarId, VariableDescriptor,
};
pub use stream::{ControlFlow, InstructionStream};
