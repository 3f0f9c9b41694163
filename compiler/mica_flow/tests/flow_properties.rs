//! Property tests for flow construction.
//!
//! Random programs over a fixed set of locals are parsed, resolved and
//! lowered. Every generated program is supported, so each one must build,
//! and the resulting stream must be closed: all jumps fixed and in range,
//! and every reachable position entered with a single stack depth.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::uninlined_format_args,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use mica_flow::{build_flow, build_flow_with, BuildOptions, ControlFlow, Offset};
use mica_ir::StringInterner;
use mica_parse::parse;
use mica_types::resolve;
use proptest::prelude::*;

const PRELUDE: &str = "var x = 0\nvar y = 1L\nvar b = true\n";

// -- Code Generation Strategies --

fn int_expr_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("x".to_owned()),
        Just("y".to_owned()),
        (0u8..10).prop_map(|n| n.to_string()),
        (0u8..10).prop_map(|n| format!("{n}L")),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec!["+", "-", "*", "/", "%"]),
                inner.clone()
            )
                .prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            inner.clone().prop_map(|e| format!("-({e})")),
            Just("++x".to_owned()),
            Just("--y".to_owned()),
            inner.prop_map(|e| format!("(x = {e})")),
        ]
    })
}

fn bool_expr_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("b".to_owned()),
        Just("true".to_owned()),
        Just("false".to_owned()),
        (
            int_expr_strategy(),
            prop::sample::select(vec!["<", "<=", ">", ">=", "==", "!="]),
            int_expr_strategy()
        )
            .prop_map(|(l, op, r)| format!("{l} {op} {r}")),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l} && {r})")),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l} || {r})")),
            inner.prop_map(|e| format!("!({e})")),
        ]
    })
}

fn statement_strategy() -> impl Strategy<Value = String> {
    let simple = prop_oneof![
        int_expr_strategy().prop_map(|e| format!("x = {e}")),
        int_expr_strategy().prop_map(|e| format!("y += {e}")),
        bool_expr_strategy().prop_map(|e| format!("b = {e}")),
        int_expr_strategy().prop_map(|e| format!("val t = {e}")),
        int_expr_strategy(),
    ];
    simple.prop_recursive(3, 16, 3, |inner| {
        let body = prop::collection::vec(inner, 0..3).prop_map(|stmts| stmts.join("\n"));
        prop_oneof![
            (bool_expr_strategy(), body.clone(), body.clone())
                .prop_map(|(c, t, e)| format!("if ({c}) {{\n{t}\n}} else {{\n{e}\n}}")),
            (bool_expr_strategy(), body.clone())
                .prop_map(|(c, t)| format!("if ({c}) {{\n{t}\n}}")),
            (bool_expr_strategy(), body.clone())
                .prop_map(|(c, s)| format!("while ({c}) {{\n{s}\n}}")),
            (body.clone(), bool_expr_strategy())
                .prop_map(|(s, c)| format!("do {{\n{s}\n}} while ({c})")),
            int_expr_strategy().prop_map(|e| format!("return {e}")),
        ]
    })
}

fn program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(statement_strategy(), 0..6)
        .prop_map(|stmts| format!("{PRELUDE}{}", stmts.join("\n")))
}

fn build(source: &str, options: BuildOptions) -> ControlFlow {
    let interner = StringInterner::new();
    let output = parse(source, &interner);
    assert!(output.errors.is_empty(), "{source}\n{:?}", output.errors);
    let resolution = resolve(&output.arena, &interner, output.root, output.params());
    assert!(!resolution.has_errors(), "{source}\n{:?}", resolution.diagnostics);
    build_flow_with(&output.arena, output.root, &resolution.table, options)
        .unwrap_or_else(|err| panic!("{source}\n{err}"))
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn jumps_are_fixed_and_in_range(source in program_strategy()) {
        let flow = build(&source, BuildOptions::default());
        for inst in flow.instructions() {
            if let Some(target) = inst.target() {
                let Offset::Fixed(pos) = target else {
                    panic!("deferred target survived: {target:?}");
                };
                prop_assert!(pos <= flow.len());
            }
        }
    }

    #[test]
    fn stack_is_consistent(source in program_strategy()) {
        let flow = build(&source, BuildOptions::default());
        let depths = flow.stack_depths().unwrap();
        let exit = depths[flow.len() as usize];
        prop_assert!(exit.is_none() || exit == Some(0), "exit depth {exit:?}");
    }

    #[test]
    fn root_leaves_one_value(source in program_strategy()) {
        let flow = build(&source, BuildOptions { trailing_pop: false });
        let depths = flow.stack_depths().unwrap();
        let exit = depths[flow.len() as usize];
        prop_assert!(exit.is_none() || exit == Some(1), "exit depth {exit:?}");
    }

    #[test]
    fn construction_is_deterministic(source in program_strategy()) {
        let first = build(&source, BuildOptions::default());
        let second = build(&source, BuildOptions::default());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prelude_locals_get_one_slot_each(source in program_strategy()) {
        let interner = StringInterner::new();
        let output = parse(&source, &interner);
        let resolution = resolve(&output.arena, &interner, output.root, output.params());
        let flow = build_flow(&output.arena, output.root, &resolution.table).unwrap();
        let names: Vec<_> = flow
            .variables()
            .iter()
            .take(3)
            .map(|v| interner.lookup(v.name).to_owned())
            .collect();
        prop_assert_eq!(names, vec!["x", "y", "b"]);
    }
}
