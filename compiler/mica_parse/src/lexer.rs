//! Lexer for Mica using logos, with string interning.
//!
//! Newlines are significant statement separators and are kept as tokens.
//! Comments are dropped. The token list always ends with `Eof`.

use logos::Logos;
use mica_ir::{Span, SpanError, StringInterner};

use crate::token::{Token, TokenKind};

/// Skip to the closing `*/`. An unclosed comment consumes the rest of the
/// input and lexes as an error.
fn block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Raw token from logos (before interning and literal decoding).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("\n")]
    Newline,

    #[token("fun")]
    Fun,
    #[token("val")]
    Val,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("this")]
    This,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("shl")]
    Shl,
    #[token("shr")]
    Shr,
    #[token("ushr")]
    Ushr,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("xor")]
    Xor,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("@")]
    At,
    #[token("?")]
    Question,
    #[token("?:")]
    Elvis,
    #[token("->")]
    Arrow,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("!")]
    Bang,
    #[token("!!")]
    BangBang,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*", |lex| parse_digits(&lex.slice()[2..], 16))]
    HexInt(u64),
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*L", |lex| {
        let s = lex.slice();
        parse_digits(&s[2..s.len() - 1], 16)
    })]
    HexLong(u64),

    #[regex(r"0[bB][01][01_]*", |lex| parse_digits(&lex.slice()[2..], 2))]
    BinInt(u64),
    #[regex(r"0[bB][01][01_]*L", |lex| {
        let s = lex.slice();
        parse_digits(&s[2..s.len() - 1], 2)
    })]
    BinLong(u64),

    #[regex(r"[0-9][0-9_]*", |lex| parse_digits(lex.slice(), 10))]
    Int(u64),
    #[regex(r"[0-9][0-9_]*L", |lex| {
        let s = lex.slice();
        parse_digits(&s[..s.len() - 1], 10)
    })]
    Long(u64),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| parse_double(lex.slice()))]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| parse_double(lex.slice()))]
    Double(u64),

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?[fF]", |lex| {
        let s = lex.slice();
        parse_float(&s[..s.len() - 1])
    })]
    Float(u32),

    #[regex(r"'([^'\\\n]|\\[^\n]|\\u[0-9a-fA-F]{4})'", |lex| {
        let s = lex.slice();
        unescape_char(&s[1..s.len() - 1])
    })]
    Char(char),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Lex `source` into tokens.
///
/// Malformed input becomes `TokenKind::Error` tokens rather than a failure;
/// the only error is a source too large for 32-bit spans.
pub fn lex(source: &str, interner: &StringInterner) -> Result<Vec<Token>, SpanError> {
    let mut tokens = Vec::with_capacity(source.len() / 4 + 1);
    let mut raw = RawToken::lexer(source);

    while let Some(result) = raw.next() {
        let span = Span::try_from_range(raw.span())?;
        let kind = match result {
            Ok(RawToken::LineComment | RawToken::BlockComment) => continue,
            Ok(token) => convert_token(token, raw.slice(), interner),
            Err(()) => TokenKind::Error,
        };
        tokens.push(Token::new(kind, span));
    }

    let end = u32::try_from(source.len()).map_err(|_| SpanError::EndTooLarge(source.len()))?;
    tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
    Ok(tokens)
}

fn convert_token(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        RawToken::Int(n) | RawToken::HexInt(n) | RawToken::BinInt(n) => TokenKind::Int(n),
        RawToken::Long(n) | RawToken::HexLong(n) | RawToken::BinLong(n) => TokenKind::Long(n),
        RawToken::Double(bits) => TokenKind::Double(bits),
        RawToken::Float(bits) => TokenKind::Float(bits),
        RawToken::Char(c) => TokenKind::Char(c),
        RawToken::String => match unescape_string(&slice[1..slice.len() - 1]) {
            Some(text) => TokenKind::String(interner.intern(&text)),
            None => TokenKind::Error,
        },
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        RawToken::Fun => TokenKind::Fun,
        RawToken::Val => TokenKind::Val,
        RawToken::Var => TokenKind::Var,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::This => TokenKind::This,
        RawToken::In => TokenKind::In,
        RawToken::Is => TokenKind::Is,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::Ushr => TokenKind::Ushr,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Xor => TokenKind::Xor,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::At => TokenKind::At,
        RawToken::Question => TokenKind::Question,
        RawToken::Elvis => TokenKind::Elvis,
        RawToken::Arrow => TokenKind::Arrow,

        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::Bang => TokenKind::Bang,
        RawToken::BangBang => TokenKind::BangBang,
        RawToken::Eq => TokenKind::Eq,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::NotEqEq => TokenKind::NotEqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,

        RawToken::Newline => TokenKind::Newline,
        // Filtered out by `lex` before conversion.
        RawToken::LineComment | RawToken::BlockComment => TokenKind::Error,
    }
}

/// Parse an integer, skipping `_` separators. `None` on overflow.
fn parse_digits(s: &str, radix: u32) -> Option<u64> {
    let mut value: u64 = 0;
    for c in s.chars().filter(|&c| c != '_') {
        let digit = c.to_digit(radix)?;
        value = value.checked_mul(u64::from(radix))?;
        value = value.checked_add(u64::from(digit))?;
    }
    Some(value)
}

fn parse_double(s: &str) -> Option<u64> {
    s.replace('_', "").parse::<f64>().ok().map(f64::to_bits)
}

fn parse_float(s: &str) -> Option<u32> {
    s.replace('_', "").parse::<f32>().ok().map(f32::to_bits)
}

fn unescape_char(content: &str) -> Option<char> {
    let text = unescape_string(content)?;
    let mut chars = text.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Decode escape sequences. `None` on an unknown escape.
fn unescape_string(content: &str) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{8}',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '$' => '$',
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?
            }
            _ => return None,
        };
        out.push(decoded);
    }
    Some(out)
}

#[cfg(test)]
mod tests;
