use pretty_assertions::assert_eq;

use mica_ir::Name;

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    let interner = StringInterner::new();
    lex(source, &interner)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn keywords_and_identifiers() {
    let interner = StringInterner::new();
    let tokens = lex("var counter while", &interner).unwrap();
    let counter = interner.intern("counter");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Var,
            TokenKind::Ident(counter),
            TokenKind::While,
            TokenKind::Eof
        ]
    );
    assert_eq!(tokens[1].span, Span::new(4, 11));
}

#[test]
fn integer_literals() {
    assert_eq!(
        kinds("42 1_000 0xFF 0b101 7L 0x10L"),
        vec![
            TokenKind::Int(42),
            TokenKind::Int(1000),
            TokenKind::Int(255),
            TokenKind::Int(5),
            TokenKind::Long(7),
            TokenKind::Long(16),
            TokenKind::Eof
        ]
    );
}

#[test]
fn integer_overflow_is_an_error_token() {
    assert_eq!(
        kinds("99999999999999999999999"),
        vec![TokenKind::Error, TokenKind::Eof]
    );
}

#[test]
fn floating_literals() {
    assert_eq!(
        kinds("1.5 2e3 0.5f 3f"),
        vec![
            TokenKind::Double(1.5f64.to_bits()),
            TokenKind::Double(2000f64.to_bits()),
            TokenKind::Float(0.5f32.to_bits()),
            TokenKind::Float(3f32.to_bits()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn range_is_not_a_double() {
    assert_eq!(
        kinds("1..5"),
        vec![
            TokenKind::Int(1),
            TokenKind::DotDot,
            TokenKind::Int(5),
            TokenKind::Eof
        ]
    );
}

#[test]
fn char_and_string_literals() {
    let interner = StringInterner::new();
    let tokens = lex(r#"'a' '\n' 'A' "hi\tthere""#, &interner).unwrap();
    let text = interner.intern("hi\tthere");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Char('a'),
            TokenKind::Char('\n'),
            TokenKind::Char('A'),
            TokenKind::String(text),
            TokenKind::Eof
        ]
    );
}

#[test]
fn operators_take_longest_match() {
    assert_eq!(
        kinds("=== !== == = ?: ? !! ! ++ += -- -="),
        vec![
            TokenKind::EqEqEq,
            TokenKind::NotEqEq,
            TokenKind::EqEq,
            TokenKind::Eq,
            TokenKind::Elvis,
            TokenKind::Question,
            TokenKind::BangBang,
            TokenKind::Bang,
            TokenKind::PlusPlus,
            TokenKind::PlusEq,
            TokenKind::MinusMinus,
            TokenKind::MinusEq,
            TokenKind::Eof
        ]
    );
}

#[test]
fn comments_are_dropped_and_newlines_kept() {
    assert_eq!(
        kinds("a // trailing\n/* block */ b"),
        vec![
            TokenKind::Ident(Name::from_raw(kinds_name("a"))),
            TokenKind::Newline,
            TokenKind::Ident(Name::from_raw(kinds_name("b"))),
            TokenKind::Eof
        ]
    );
}

#[test]
fn block_comments_span_lines_and_stars() {
    assert_eq!(
        kinds("a /* one\n ** two */ + /**/ 1"),
        vec![
            TokenKind::Ident(Name::from_raw(kinds_name("a"))),
            TokenKind::Plus,
            TokenKind::Int(1),
            TokenKind::Eof
        ]
    );
}

#[test]
fn unclosed_block_comment_is_an_error() {
    let interner = StringInterner::new();
    let tokens = lex("a /* never closed", &interner).unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1].kind, TokenKind::Error);
    assert_eq!(tokens[1].span, Span::new(2, 17));
}

/// Names interned by a fresh interner are deterministic, so a second
/// interner agrees with the one inside `kinds`.
fn kinds_name(s: &str) -> u32 {
    StringInterner::new().intern(s).raw()
}

#[test]
fn labels_lex_as_separate_tokens() {
    let interner = StringInterner::new();
    let tokens = lex("return@outer", &interner).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Return);
    assert_eq!(tokens[1].kind, TokenKind::At);
    assert_eq!(tokens[2].kind, TokenKind::Ident(interner.intern("outer")));
    assert_eq!(tokens[0].span.end, tokens[1].span.start);
}

#[test]
fn unknown_characters_become_error_tokens() {
    assert_eq!(kinds("#"), vec![TokenKind::Error, TokenKind::Eof]);
}
