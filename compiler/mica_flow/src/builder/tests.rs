use mica_ir::{
    DeclId, Expr, ExprArena, ExprId, ExprKind, Literal, Name, PrimitiveType, Span, StringInterner,
    Ty, TypeOracle,
};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{listing, run, Source, Value};
use crate::{JumpCondition, MathOp, Offset, RelationType};

// Lowering listings

#[test]
fn increment_assignment() {
    assert_eq!(
        listing("var x = 0\nx = x + 1"),
        "\
0: push 0
1: assign x
2: pop
3: push_var x
4: push 1
5: numeric_binary +
6: assign x
7: finish_element #6
8: pop
"
    );
}

#[test]
fn labeled_return_is_unsupported() {
    let source = Source::new("return@label 5");
    assert_eq!(
        source.build(),
        Err(BuildError::Unsupported {
            kind: "labeled return",
            span: Span::new(0, 14),
        })
    );
}

#[test]
fn qualified_assignment_degrades_to_flush() {
    assert_eq!(
        listing("fun f(a: Point) {\n  a.b = 5\n}"),
        "\
0: push_var a
1: eval_unknown 1
2: pop
3: push 5
4: flush_fields
5: pop
"
    );
}

#[test]
fn while_false_loop() {
    assert_eq!(
        listing("var x = 0\nwhile (false) { x = x + 1 }"),
        "\
0: push 0
1: assign x
2: pop
3: push false
4: cond_goto 12 if false
5: push_var x
6: push 1
7: numeric_binary +
8: assign x
9: finish_element #7
10: pop
11: goto 3
12: push top
13: finish_element #9
14: pop
"
    );
}

#[test]
fn if_else_lowers_both_branches() {
    assert_eq!(
        listing("val c = true\nif (c) 1 else 2"),
        "\
0: push true
1: assign c
2: pop
3: push_var c
4: cond_goto 8 if false
5: finish_element
6: push 1
7: goto 10
8: finish_element
9: push 2
10: finish_element #5
11: pop
"
    );
}

#[test]
fn if_without_else_pushes_unknown() {
    assert_eq!(
        listing("val c = true\nif (c) 1"),
        "\
0: push true
1: assign c
2: pop
3: push_var c
4: cond_goto 8 if false
5: finish_element
6: push 1
7: goto 10
8: finish_element
9: push top
10: finish_element #4
11: pop
"
    );
}

#[test]
fn short_circuit_and() {
    assert_eq!(
        listing("val a = true\nval b = false\na && b"),
        "\
0: push true
1: assign a
2: pop
3: push false
4: assign b
5: pop
6: push_var a
7: cond_goto 10 if true
8: push false
9: goto 12
10: finish_element
11: push_var b
12: result_of
13: pop
"
    );
}

#[test]
fn short_circuit_or_pushes_true() {
    let source = Source::new("val a = true\nval b = false\na || b");
    let flow = source.build().unwrap();
    assert!(matches!(
        flow.get(7),
        Some(Instruction::CondGoto {
            when: JumpCondition::False,
            ..
        })
    ));
    assert_eq!(
        flow.get(8),
        Some(&Instruction::Push {
            value: DfValue::TRUE,
            anchor: Some(source.statements()[2]),
        })
    );
}

#[test]
fn elvis() {
    assert_eq!(
        listing("val x: Int? = null\nx ?: 0"),
        "\
0: push null
1: assign x
2: pop
3: push_var x
4: dup
5: cond_goto 7 if null
6: goto 9
7: pop
8: push 0
9: pop
"
    );
}

#[test]
fn plain_assignment_converts_to_target_type() {
    assert_eq!(
        listing("var y = 1L\nval i = 2\ny = i"),
        "\
0: push 1L
1: assign y
2: pop
3: push 2
4: assign i
5: pop
6: push_var i
7: primitive_conversion long
8: assign y
9: finish_element #6
10: pop
"
    );
}

#[test]
fn compound_assignment_balances_operands() {
    assert_eq!(
        listing("var y = 1L\nval i = 2\ny += i"),
        "\
0: push 1L
1: assign y
2: pop
3: push 2
4: assign i
5: pop
6: push_var y
7: push_var i
8: primitive_conversion long
9: numeric_binary +
10: assign y
11: finish_element #6
12: pop
"
    );
}

#[test]
fn compound_assignment_converts_back_to_target() {
    assert_eq!(
        listing("var i = 1\nval d = 2.0\ni += d"),
        "\
0: push 1
1: assign i
2: pop
3: push 2.0
4: assign d
5: pop
6: push_var i
7: primitive_conversion double
8: push_var d
9: numeric_binary +
10: primitive_conversion int
11: assign i
12: finish_element #6
13: pop
"
    );
}

#[test]
fn comparison_balances_to_wider_type() {
    assert_eq!(
        listing("val i = 1\nval l = 2L\ni < l"),
        "\
0: push 1
1: assign i
2: pop
3: push 2L
4: assign l
5: pop
6: push_var i
7: primitive_conversion long
8: push_var l
9: boolean_binary <
10: pop
"
    );
}

#[test]
fn equality_by_content_and_identity() {
    let source = Source::new("val a = 1\na == a\na === a\na !== a");
    let flow = source.build().unwrap();
    let relations: Vec<_> = flow
        .instructions()
        .iter()
        .filter_map(|inst| match inst {
            Instruction::BooleanBinary {
                relation,
                by_content,
                ..
            } => Some((*relation, *by_content)),
            _ => None,
        })
        .collect();
    assert_eq!(
        relations,
        vec![
            (RelationType::Eq, true),
            (RelationType::Eq, false),
            (RelationType::Ne, false),
        ]
    );
}

#[test]
fn prefix_operators() {
    assert_eq!(
        listing("var x = 1\n-x\n++x\n!true\n+x"),
        "\
0: push 1
1: assign x
2: pop
3: push_var x
4: push 0
5: swap
6: numeric_binary -
7: pop
8: push_var x
9: push 1
10: numeric_binary +
11: assign x
12: pop
13: push true
14: not
15: pop
16: push_var x
17: pop
"
    );
}

#[test]
fn decrement_of_long_uses_long_constant() {
    let flow = Source::new("var l = 5L\n--l").build().unwrap();
    assert_eq!(
        flow.get(4),
        Some(&Instruction::Push {
            value: DfValue::Const(Literal::Long(1)),
            anchor: None,
        })
    );
    assert_eq!(
        flow.get(5),
        Some(&Instruction::NumericBinary {
            op: MathOp::Minus,
            anchor: None,
        })
    );
}

#[test]
fn increment_of_short_narrows_the_constant() {
    let flow = Source::new("var s: Short = 1\n++s").build().unwrap();
    let expected = [
        Instruction::Push {
            value: DfValue::Const(Literal::Int(1)),
            anchor: None,
        },
        Instruction::PrimitiveConversion {
            target: PrimitiveType::Short,
        },
        Instruction::NumericBinary {
            op: MathOp::Plus,
            anchor: None,
        },
    ];
    assert!(
        flow.instructions().windows(3).any(|w| w == expected),
        "{:?}",
        flow.instructions()
    );
}

#[test]
fn prefix_on_non_integral_is_unknown() {
    let source = Source::new("val d = 1.5\n-d");
    let flow = source.build().unwrap();
    let negation = source.statements()[1];
    assert_eq!(
        flow.get(4),
        Some(&Instruction::EvalUnknown {
            anchor: negation,
            arity: 1,
        })
    );
}

#[test]
fn math_converts_left_operand_but_not_shift_distance() {
    assert_eq!(
        listing("val i = 1\ni + 2L"),
        "\
0: push 1
1: assign i
2: pop
3: push_var i
4: primitive_conversion long
5: push 2L
6: numeric_binary +
7: pop
"
    );
    assert_eq!(
        listing("val l = 1L\nl shl 2"),
        "\
0: push 1L
1: assign l
2: pop
3: push_var l
4: push 2
5: numeric_binary shl
6: pop
"
    );
}

#[test]
fn other_operators_evaluate_as_unknown() {
    assert_eq!(
        listing("val s = \"a\"\ns + 1"),
        "\
0: push \"a\"
1: assign s
2: pop
3: push_var s
4: push 1
5: eval_unknown 2
6: flush_fields
7: pop
"
    );
    let flow = Source::new("val a = 1\na..a").build().unwrap();
    assert_eq!(flow.get(6), Some(&Instruction::FlushFields));
}

#[test]
fn declaration_without_initializer() {
    assert_eq!(listing("var x: Int"), "0: push top\n1: pop\n");
}

#[test]
fn field_read_is_unknown_member() {
    assert_eq!(
        listing("fun f(p: Point) = p.size"),
        "0: push_var p\n1: eval_unknown 1\n2: pop\n"
    );
}

#[test]
fn return_carries_empty_traps() {
    let source = Source::new("fun f(x: Int): Int {\n  return x\n}");
    let flow = source.build().unwrap();
    assert_eq!(
        flow.display(&source.interner).to_string(),
        "0: push_var x\n1: return\n2: pop\n"
    );
    let Some(Instruction::Return { traps }) = flow.get(1) else {
        panic!("expected return");
    };
    assert!(traps.is_empty());
}

#[test]
fn bare_return_pushes_unknown() {
    assert_eq!(listing("return"), "0: push top\n1: return\n2: pop\n");
}

#[test]
fn empty_file_is_unknown() {
    assert_eq!(listing(""), "0: push top\n1: pop\n");
}

#[test]
fn without_trailing_pop() {
    let source = Source::new("1");
    let flow = source
        .build_with(BuildOptions {
            trailing_pop: false,
        })
        .unwrap();
    assert_eq!(flow.display(&source.interner).to_string(), "0: push 1\n");
}

// Failures

#[test]
fn unsupported_constructs() {
    let cases = [
        ("f(1)", "call"),
        ("{ 1 }", "lambda"),
        ("this", "`this`"),
        ("var x = 0\nx++", "postfix expression"),
        ("val x = 0\nx is Int", "type test"),
        ("outer@ while (true) {}", "labeled expression"),
        ("while (true) { break }", "`break`"),
    ];
    for (text, expected) in cases {
        let result = Source::new(text).build();
        assert!(
            matches!(result, Err(BuildError::Unsupported { kind, .. }) if kind == expected),
            "{text:?} gave {result:?}"
        );
    }
}

#[test]
fn nested_failure_fails_whole_build() {
    let source = Source::new("var x = 0\nif (true) {\n  x = 1\n  f()\n}\nx");
    assert!(matches!(
        source.build(),
        Err(BuildError::Unsupported { kind: "call", .. })
    ));
}

/// Oracle that knows nothing: no types, no locals.
struct NoInfo;

impl TypeOracle for NoInfo {
    fn expr_type(&self, _: ExprId) -> Option<Ty> {
        None
    }

    fn decl_type(&self, _: DeclId) -> Option<Ty> {
        None
    }

    fn resolve_local(&self, _: ExprId) -> Option<DeclId> {
        None
    }
}

#[test]
fn unresolved_name_is_unsupported() {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    let name = arena.alloc_expr(Expr::new(
        ExprKind::Ident(interner.intern("x")),
        Span::new(0, 1),
    ));
    assert_eq!(
        build_flow(&arena, name, &NoInfo),
        Err(BuildError::Unsupported {
            kind: "non-local reference",
            span: Span::new(0, 1),
        })
    );
}

#[test]
fn absent_operands_push_unknown() {
    let mut arena = ExprArena::new();
    let one = arena.alloc_expr(Expr::new(
        ExprKind::Literal(Literal::Int(1)),
        Span::new(0, 1),
    ));
    let cmp = arena.alloc_expr(Expr::new(
        ExprKind::Binary {
            op: mica_ir::BinaryOp::Lt,
            left: Some(one),
            right: None,
        },
        Span::new(0, 3),
    ));
    let flow = build_flow(&arena, cmp, &NoInfo).unwrap();
    assert_eq!(
        flow.instructions(),
        &[
            Instruction::Push {
                value: DfValue::Const(Literal::Int(1)),
                anchor: Some(one),
            },
            Instruction::Push {
                value: DfValue::Top,
                anchor: None,
            },
            Instruction::EvalUnknown {
                anchor: cmp,
                arity: 2,
            },
            Instruction::Pop,
        ]
    );
}

// Properties

#[test]
fn block_leaves_exactly_one_value() {
    let source = Source::new("var x = 1\nx += 2\nval c = x < 3\nif (c) x else 0");
    let flow = source
        .build_with(BuildOptions {
            trailing_pop: false,
        })
        .unwrap();
    let depths = flow.stack_depths().unwrap();
    assert_eq!(depths[flow.len() as usize], Some(1));
}

#[test]
fn constant_condition_runs_exactly_one_branch() {
    for (cond, expected) in [("true", 1), ("false", 2)] {
        let source = Source::new(&format!("var x = 0\nif ({cond}) x = 1 else x = 2\nx"));
        let flow = source.build().unwrap();
        let trace = run(&flow);

        let x = flow.variables()[0].decl;
        let slot = flow.var_of(x).unwrap();
        assert_eq!(
            trace.vars.get(&slot),
            Some(&Value::Known(Literal::Int(expected)))
        );
        let assigns = trace
            .executed
            .iter()
            .filter(|&&pos| matches!(flow.get(pos), Some(Instruction::Assign { .. })))
            .count();
        // The declaration plus one branch.
        assert_eq!(assigns, 2, "condition {cond}");
        assert!(trace.stack.is_empty());
    }
}

#[test]
fn and_jump_skips_right_operand() {
    let source = Source::new("val a = false\nval b = true\na && b");
    let flow = source.build().unwrap();
    let b_pos = flow
        .instructions()
        .iter()
        .rposition(|inst| matches!(inst, Instruction::PushVar { .. }))
        .unwrap();
    let trace = run(&flow);
    assert!(!trace.ran(u32::try_from(b_pos).unwrap()));

    // The fall-through path's jump lands after `b`.
    let Some(Instruction::Goto {
        target: Offset::Fixed(end),
    }) = flow.get(9)
    else {
        panic!("expected goto");
    };
    assert!(*end as usize > b_pos);
}

#[test]
fn elvis_takes_right_side_on_null() {
    let source = Source::new("val x: Int? = null\nx ?: 0");
    let flow = source.build().unwrap();
    let trace = run(&flow);
    assert!(trace.ran(8));
    assert!(!trace.ran(6));
    assert!(trace.stack.is_empty());
}

#[test]
fn while_head_precedes_condition() {
    let source = Source::new("var i = 0\nwhile (i < 3) i += 1");
    let flow = source.build().unwrap();
    assert!(matches!(flow.get(3), Some(Instruction::PushVar { .. })));
    let back_edge = flow
        .instructions()
        .iter()
        .find_map(|inst| match inst {
            Instruction::Goto { target } => target.position(),
            _ => None,
        })
        .unwrap();
    assert_eq!(back_edge, 3);

    let trace = run(&flow);
    let slot = flow.var_of(flow.variables()[0].decl).unwrap();
    assert_eq!(trace.vars[&slot], Value::Known(Literal::Int(3)));
}

#[test]
fn do_while_head_precedes_body() {
    let source = Source::new("var i = 0\ndo { i += 1 } while (i < 3)");
    let flow = source.build().unwrap();
    let head = flow
        .instructions()
        .iter()
        .find_map(|inst| match inst {
            Instruction::CondGoto {
                target,
                when: JumpCondition::True,
                ..
            } => target.position(),
            _ => None,
        })
        .unwrap();
    assert_eq!(head, 3);
    assert!(matches!(flow.get(3), Some(Instruction::PushVar { .. })));

    let trace = run(&flow);
    let slot = flow.var_of(flow.variables()[0].decl).unwrap();
    assert_eq!(trace.vars[&slot], Value::Known(Literal::Int(3)));
}

#[test]
fn return_stops_execution() {
    let source = Source::new("fun f(x: Int): Int {\n  if (true) return 1\n  x\n}");
    let flow = source.build().unwrap();
    let trace = run(&flow);
    assert!(trace.returned);
    assert_eq!(trace.stack, vec![]);
}

#[test]
fn building_twice_is_deterministic() {
    let source = Source::new(
        "var x = 0\nval y = 2L\nwhile (x < 10) {\n  x += 1\n  if (x == 5 || y > 1) x = x * 2\n}\nx ?: y",
    );
    assert_eq!(source.build(), source.build());
}

#[test]
fn same_declaration_shares_a_slot() {
    let source = Source::new("var x = 0\nvar y = x\nx = y + x");
    let flow = source.build().unwrap();
    assert_eq!(flow.variables().len(), 2);

    let names: Vec<Name> = flow.variables().iter().map(|v| v.name).collect();
    let x = source.interner.intern("x");
    let y = source.interner.intern("y");
    assert_eq!(names, vec![x, y]);
    assert_eq!(flow.variables()[0].ty, Some(Ty::INT));

    let x_slot = flow.var_of(DeclId::new(0)).unwrap();
    let x_pushes = flow
        .instructions()
        .iter()
        .filter(|inst| matches!(inst, Instruction::PushVar { var, .. } if *var == x_slot))
        .count();
    assert_eq!(x_pushes, 2);
}

#[test]
fn balance_prefers_left_at_equal_rank() {
    assert_eq!(balance_type(Some(Ty::DOUBLE), Some(Ty::FLOAT)), Some(Ty::DOUBLE));
    assert_eq!(balance_type(Some(Ty::INT), Some(Ty::FLOAT)), Some(Ty::FLOAT));
    assert_eq!(balance_type(Some(Ty::LONG), Some(Ty::INT)), Some(Ty::LONG));
    assert_eq!(balance_type(Some(Ty::INT), Some(Ty::SHORT)), None);
    assert_eq!(balance_type(None, Some(Ty::DOUBLE)), None);
    assert_eq!(balance_type(Some(Ty::DOUBLE.nullable()), Some(Ty::INT)), None);
}
