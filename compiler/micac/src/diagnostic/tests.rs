use mica_ir::Span;

use super::*;

#[test]
fn report_names_file_message_and_label() {
    let diagnostic = Diagnostic::new("unsupported call", Span::new(4, 7)).with_label("here");
    let out = render("body.kt", "val f()", &[diagnostic], false);
    assert!(out.contains("unsupported call"), "{out}");
    assert!(out.contains("body.kt"), "{out}");
    assert!(out.contains("here"), "{out}");
}

#[test]
fn span_past_end_is_clamped() {
    let diagnostic = Diagnostic::new("late", Span::new(50, 60));
    let out = render("body.kt", "x", &[diagnostic], false);
    assert!(out.contains("late"), "{out}");
}

#[test]
fn each_diagnostic_gets_a_report() {
    let diagnostics = [
        Diagnostic::new("first", Span::new(0, 1)),
        Diagnostic::new("second", Span::new(2, 3)),
    ];
    let out = render("body.kt", "a b", &diagnostics, false);
    let first = out.find("first").unwrap();
    let second = out.find("second").unwrap();
    assert!(first < second, "{out}");
}

#[test]
fn build_error_without_span_uses_file_start() {
    let err = BuildError::Malformed(mica_flow::FlowError::StackUnderflow { at: 3 });
    let diagnostic = Diagnostic::from(&err);
    assert_eq!(diagnostic.span, Span::DUMMY);
    assert_eq!(diagnostic.label, None);
    assert!(diagnostic.message.contains("stack underflow at 3"));
}
