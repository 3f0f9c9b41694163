use mica_ir::{DeclId, ExprId, Name, Ty};
use pretty_assertions::assert_eq;

use super::*;
use crate::{DfValue, JumpCondition};

fn push_top() -> Instruction {
    Instruction::Push {
        value: DfValue::Top,
        anchor: None,
    }
}

#[test]
fn append_returns_position() {
    let mut stream = InstructionStream::new();
    assert!(stream.is_empty());
    assert_eq!(stream.append(push_top()), 0);
    assert_eq!(stream.append(Instruction::Pop), 1);
    assert_eq!(stream.len(), 2);
    assert_eq!(stream.fixed_here(), Offset::Fixed(2));
    assert_eq!(stream.instructions()[1], Instruction::Pop);
}

#[test]
fn finish_rewrites_deferred_targets() {
    let mut stream = InstructionStream::new();
    stream.append(push_top());
    let end = stream.deferred();
    stream.append(Instruction::CondGoto {
        target: end.into(),
        when: JumpCondition::False,
        anchor: None,
    });
    stream.append(push_top());
    stream.append(Instruction::Pop);
    stream.resolve(end);

    let flow = stream.finish().unwrap();
    assert_eq!(flow.get(1).and_then(Instruction::target), Some(Offset::Fixed(4)));
    assert_eq!(flow.len(), 4);
}

#[test]
fn resolve_at_explicit_position() {
    let mut stream = InstructionStream::new();
    let target = stream.deferred();
    stream.append(Instruction::Goto {
        target: target.into(),
    });
    stream.append(push_top());
    stream.resolve_at(target, 1);
    let flow = stream.finish().unwrap();
    assert_eq!(flow.instructions()[0].target(), Some(Offset::Fixed(1)));
}

#[test]
fn unresolved_offset_is_rejected() {
    let mut stream = InstructionStream::new();
    let dangling = stream.deferred();
    stream.append(Instruction::Goto {
        target: dangling.into(),
    });
    assert_eq!(
        stream.finish(),
        Err(FlowError::Unresolved { offset: 0 })
    );
}

#[test]
fn offset_resolved_twice_is_rejected() {
    let mut stream = InstructionStream::new();
    let first = stream.deferred();
    let second = stream.deferred();
    stream.resolve(first);
    stream.append(push_top());
    stream.resolve(second);
    stream.resolve(second);
    assert_eq!(
        stream.finish(),
        Err(FlowError::ResolvedTwice { offset: 1 })
    );
}

#[test]
fn jump_past_end_is_rejected() {
    let mut stream = InstructionStream::new();
    let target = stream.deferred();
    stream.append(Instruction::Goto {
        target: target.into(),
    });
    stream.resolve_at(target, 7);
    assert_eq!(
        stream.finish(),
        Err(FlowError::TargetOutOfRange {
            at: 0,
            target: 7,
            len: 1,
        })
    );
}

#[test]
fn foreign_offset_is_rejected() {
    let mut other = InstructionStream::new();
    other.deferred();
    let foreign = other.deferred();

    let mut stream = InstructionStream::new();
    stream.append(Instruction::Goto {
        target: foreign.into(),
    });
    assert_eq!(
        stream.finish(),
        Err(FlowError::UnknownOffset { offset: 1 })
    );
}

#[test]
fn variables_are_interned_per_declaration() {
    let mut stream = InstructionStream::new();
    let a = stream.variable(DeclId::new(3), Name::from_raw(10), Some(Ty::INT));
    let b = stream.variable(DeclId::new(5), Name::from_raw(11), None);
    let again = stream.variable(DeclId::new(3), Name::from_raw(10), Some(Ty::INT));
    assert_eq!(a, again);
    assert_ne!(a, b);

    let flow = stream.finish().unwrap();
    assert_eq!(flow.variables().len(), 2);
    assert_eq!(flow.var_of(DeclId::new(5)), Some(b));
    assert_eq!(flow.var_of(DeclId::new(4)), None);
    assert_eq!(flow.variable(a).ty, Some(Ty::INT));
}

#[test]
fn stack_depths_follow_both_branches() {
    let mut stream = InstructionStream::new();
    stream.append(push_top());
    stream.append(push_top());
    let join = stream.deferred();
    stream.append(Instruction::CondGoto {
        target: join.into(),
        when: JumpCondition::True,
        anchor: None,
    });
    stream.append(Instruction::FinishElement { element: None });
    stream.resolve(join);
    stream.append(Instruction::Pop);
    let flow = stream.finish().unwrap();

    assert_eq!(
        flow.stack_depths().unwrap(),
        vec![Some(0), Some(1), Some(2), Some(1), Some(1), Some(0)]
    );
}

#[test]
fn stack_depths_skip_unreachable_code() {
    let mut stream = InstructionStream::new();
    stream.append(push_top());
    stream.append(Instruction::Return {
        traps: crate::Traps::empty(),
    });
    stream.append(Instruction::Pop);
    let flow = stream.finish().unwrap();
    assert_eq!(
        flow.stack_depths().unwrap(),
        vec![Some(0), Some(1), None, None]
    );
}

#[test]
fn stack_underflow_is_detected() {
    let mut stream = InstructionStream::new();
    stream.append(Instruction::Pop);
    let flow = stream.finish().unwrap();
    assert_eq!(flow.stack_depths(), Err(FlowError::StackUnderflow { at: 0 }));
}

#[test]
fn inconsistent_join_is_detected() {
    let mut stream = InstructionStream::new();
    stream.append(push_top());
    let join = stream.deferred();
    stream.append(Instruction::CondGoto {
        target: join.into(),
        when: JumpCondition::True,
        anchor: None,
    });
    stream.append(push_top());
    stream.resolve(join);
    stream.append(Instruction::EvalUnknown {
        anchor: ExprId::new(0),
        arity: 0,
    });
    let flow = stream.finish().unwrap();
    assert!(matches!(
        flow.stack_depths(),
        Err(FlowError::InconsistentStack { at: 3, .. })
    ));
}
