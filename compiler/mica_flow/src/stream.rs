//! Append-only instruction storage and the sealed [`ControlFlow`].

use mica_ir::{DeclId, Name, Ty};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{DeferredOffset, FlowError, Instruction, Offset, VarId, VariableDescriptor};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Resolution {
    Pending,
    At(u32),
    Twice,
}

/// An instruction list under construction.
///
/// Instructions are only ever appended. Forward jumps point at
/// [`DeferredOffset`]s, each of which must be [`resolve`](Self::resolve)d
/// exactly once before [`finish`](Self::finish) seals the stream.
#[derive(Debug, Default)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,
    offsets: Vec<Resolution>,
    vars: FxHashMap<DeclId, VarId>,
    variables: Vec<VariableDescriptor>,
}

impl InstructionStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `instruction`, returning its position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "instruction count is bounded by source size"
    )]
    pub fn append(&mut self, instruction: Instruction) -> u32 {
        let pos = self.instructions.len() as u32;
        trace!(pos, op = instruction.mnemonic(), "append");
        self.instructions.push(instruction);
        pos
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "instruction count is bounded by source size"
    )]
    pub fn len(&self) -> u32 {
        self.instructions.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// A fixed offset at the current end of the stream.
    pub fn fixed_here(&self) -> Offset {
        Offset::Fixed(self.len())
    }

    /// Allocate an unresolved forward offset.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "offset count is bounded by instruction count"
    )]
    pub fn deferred(&mut self) -> DeferredOffset {
        let offset = DeferredOffset::new(self.offsets.len() as u32);
        self.offsets.push(Resolution::Pending);
        offset
    }

    /// Bind `offset` to the current end of the stream.
    pub fn resolve(&mut self, offset: DeferredOffset) {
        self.resolve_at(offset, self.len());
    }

    /// Bind `offset` to `position`.
    ///
    /// Resolving the same offset twice is recorded and reported by
    /// [`finish`](Self::finish).
    pub fn resolve_at(&mut self, offset: DeferredOffset, position: u32) {
        trace!(offset = offset.raw(), position, "resolve");
        if let Some(slot) = self.offsets.get_mut(offset.index()) {
            *slot = match *slot {
                Resolution::Pending => Resolution::At(position),
                Resolution::At(_) | Resolution::Twice => Resolution::Twice,
            };
        }
    }

    /// Slot for the local declared by `decl`, created on first use.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "variable count is bounded by declaration count"
    )]
    pub fn variable(&mut self, decl: DeclId, name: Name, ty: Option<Ty>) -> VarId {
        let next = VarId::new(self.variables.len() as u32);
        *self.vars.entry(decl).or_insert_with(|| {
            self.variables.push(VariableDescriptor { decl, name, ty });
            next
        })
    }

    fn fix(&self, target: Offset) -> Result<u32, FlowError> {
        match target {
            Offset::Fixed(pos) => Ok(pos),
            Offset::Deferred(offset) => match self.offsets.get(offset.index()) {
                Some(Resolution::At(pos)) => Ok(*pos),
                Some(Resolution::Pending) => Err(FlowError::Unresolved {
                    offset: offset.raw(),
                }),
                Some(Resolution::Twice) => Err(FlowError::ResolvedTwice {
                    offset: offset.raw(),
                }),
                None => Err(FlowError::UnknownOffset {
                    offset: offset.raw(),
                }),
            },
        }
    }

    /// Validate every offset and jump, and seal the stream.
    ///
    /// All jump targets in the result are [`Offset::Fixed`].
    #[expect(
        clippy::cast_possible_truncation,
        reason = "offset count is bounded by instruction count"
    )]
    pub fn finish(mut self) -> Result<ControlFlow, FlowError> {
        for (index, resolution) in self.offsets.iter().enumerate() {
            let offset = index as u32;
            match resolution {
                Resolution::Pending => return Err(FlowError::Unresolved { offset }),
                Resolution::Twice => return Err(FlowError::ResolvedTwice { offset }),
                Resolution::At(_) => {}
            }
        }

        let len = self.len();
        let mut fixed = Vec::with_capacity(self.instructions.len());
        for (at, instruction) in self.instructions.iter().enumerate() {
            let Some(target) = instruction.target() else {
                continue;
            };
            let target = self.fix(target)?;
            if target > len {
                return Err(FlowError::TargetOutOfRange {
                    at: at as u32,
                    target,
                    len,
                });
            }
            fixed.push((at, target));
        }
        for (at, target) in fixed {
            self.instructions[at].set_target(Offset::Fixed(target));
        }

        trace!(len, variables = self.variables.len(), "finish");
        Ok(ControlFlow {
            instructions: self.instructions,
            vars: self.vars,
            variables: self.variables,
        })
    }
}

/// A sealed, validated instruction list with its variable table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlFlow {
    instructions: Vec<Instruction>,
    vars: FxHashMap<DeclId, VarId>,
    variables: Vec<VariableDescriptor>,
}

impl ControlFlow {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "instruction count is bounded by source size"
    )]
    pub fn len(&self) -> u32 {
        self.instructions.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, pos: u32) -> Option<&Instruction> {
        self.instructions.get(pos as usize)
    }

    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    /// # Panics
    /// Panics if `var` does not belong to this flow.
    #[track_caller]
    pub fn variable(&self, var: VarId) -> &VariableDescriptor {
        &self.variables[var.index()]
    }

    /// Slot of a local declaration, if the flow ever touches it.
    pub fn var_of(&self, decl: DeclId) -> Option<VarId> {
        self.vars.get(&decl).copied()
    }

    /// Abstract stack depth before every reachable instruction.
    ///
    /// Walks all paths from the entry. Index `len()` is the exit position.
    /// Unreachable positions are `None`. Fails if some path pops an empty
    /// stack or two paths reach a position with different depths.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "instruction count is bounded by source size"
    )]
    pub fn stack_depths(&self) -> Result<Vec<Option<u32>>, FlowError> {
        let mut depths = vec![None; self.instructions.len() + 1];
        let mut worklist = vec![(0u32, 0u32)];

        while let Some((at, depth)) = worklist.pop() {
            let slot = &mut depths[at as usize];
            match *slot {
                Some(expected) if expected == depth => continue,
                Some(expected) => {
                    return Err(FlowError::InconsistentStack {
                        at,
                        expected,
                        found: depth,
                    })
                }
                None => *slot = Some(depth),
            }
            let Some(instruction) = self.instructions.get(at as usize) else {
                continue;
            };

            let (pops, pushes) = instruction.stack_effect();
            let after = depth
                .checked_sub(pops)
                .ok_or(FlowError::StackUnderflow { at })?
                + pushes;

            if let Some(target) = instruction.target().and_then(Offset::position) {
                if target as usize >= depths.len() {
                    return Err(FlowError::TargetOutOfRange {
                        at,
                        target,
                        len: self.instructions.len() as u32,
                    });
                }
                worklist.push((target, after));
            }
            if !instruction.is_terminator() {
                worklist.push((at + 1, after));
            }
        }
        Ok(depths)
    }
}

#[cfg(test)]
mod tests;
