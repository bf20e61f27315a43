use expect_test::{expect, Expect};

use super::*;

/// Render one token per line: kind, lexeme, end position.
fn check_tokens(input: &str, expect: Expect) {
    let tokens = lex(input).unwrap();
    let rendered = tokens
        .iter()
        .map(|t| format!("{:?} {:?} {}:{}", t.kind, t.lexeme, t.position.line, t.position.column))
        .collect::<Vec<_>>()
        .join("\n");
    expect.assert_eq(&rendered);
}

#[test]
fn lex_mixed_literal_stream() {
    check_tokens(
        "1 + 2 * 3.14 \"hello\" true false",
        expect![[r#"
            Number "1" 1:2
            Plus "+" 1:4
            Number "2" 1:6
            Star "*" 1:8
            Number "3.14" 1:13
            Str "hello" 1:21
            True "true" 1:26
            False "false" 1:32
            Eof "\0" 1:32"#]],
    );
}

#[test]
fn lex_decimal_requires_trailing_digit() {
    check_tokens(
        "1.",
        expect![[r#"
            Number "1" 1:2
            Dot "." 1:3
            Eof "\0" 1:3"#]],
    );
}

#[test]
fn lex_string_escapes_are_decoded() {
    check_tokens(
        "\"\\n\\r\\t\\\\\\\"\"",
        expect![[r#"
            Str "\n\r\t\\\"" 1:13
            Eof "\0" 1:13"#]],
    );
}

#[test]
fn lex_invalid_escape_fails() {
    let result = lex("\"\\x\"");
    assert!(matches!(result, Err(LexError::InvalidEscape { ch: 'x', .. })));
}

#[test]
fn lex_unterminated_string_fails() {
    let result = lex("\"abc");
    assert!(matches!(result, Err(LexError::UnterminatedString { .. })));
}

#[test]
fn lex_unterminated_block_comment_fails() {
    let result = lex("/* no end");
    assert!(matches!(result, Err(LexError::UnterminatedComment { .. })));
}

#[test]
fn lex_line_comments_are_skipped() {
    check_tokens(
        "// comment\n1",
        expect![[r#"
            Number "1" 2:2
            Eof "\0" 2:2"#]],
    );
}

#[test]
fn lex_block_comments_are_skipped() {
    check_tokens(
        "/* one\n   two */ 42",
        expect![[r#"
            Number "42" 2:13
            Eof "\0" 2:13"#]],
    );
}

#[test]
fn lex_keywords_and_identifiers() {
    check_tokens(
        "if iffy fn fnord",
        expect![[r#"
            If "if" 1:3
            Identifier "iffy" 1:8
            Fn "fn" 1:11
            Identifier "fnord" 1:17
            Eof "\0" 1:17"#]],
    );
}

#[test]
fn lex_arrow_is_not_fused() {
    check_tokens(
        "->",
        expect![[r#"
            Minus "-" 1:2
            Greater ">" 1:3
            Eof "\0" 1:3"#]],
    );
}

#[test]
fn lex_invalid_byte_is_total() {
    check_tokens(
        "@",
        expect![[r#"
            Invalid "@" 1:2
            Eof "\0" 1:2"#]],
    );
}

#[test]
fn lex_empty_input() {
    check_tokens(
        "",
        expect![[r#"Eof "\0" 1:1"#]],
    );
}

#[test]
fn reserved_lexemes_round_trip() {
    for (lexeme, kind) in token::SYMBOLS
        .iter()
        .chain(token::OPERATORS)
        .chain(token::KEYWORDS)
    {
        let tokens = lex(lexeme).unwrap();
        assert_eq!(tokens.len(), 2, "lexing {:?}", lexeme);
        assert_eq!(tokens[0].kind, *kind, "lexing {:?}", lexeme);
        assert_eq!(tokens[0].lexeme, *lexeme);
        assert!(tokens[1].is(TokenKind::Eof));

        assert_eq!(token::lexeme_of(*kind), Some(*lexeme));
    }
}

#[test]
fn token_positions_are_monotonic() {
    let source = "fn main() -> int {\n    x: int = 1;\n    return x + 2;\n}\n";
    let tokens = lex(source).unwrap();

    for pair in tokens.windows(2) {
        let (a, b) = (&pair[0].position, &pair[1].position);
        assert!(a.line <= b.line);
        if a.line == b.line {
            assert!(a.column <= b.column);
        }
    }
    assert!(tokens.last().unwrap().is(TokenKind::Eof));
}

#[test]
fn precedence_table_orders_operators() {
    assert_eq!(token::precedence(TokenKind::Or), 1);
    assert_eq!(token::precedence(TokenKind::And), 1);
    assert_eq!(token::precedence(TokenKind::Equal), 2);
    assert_eq!(token::precedence(TokenKind::NotEqual), 2);
    assert_eq!(token::precedence(TokenKind::Less), 3);
    assert_eq!(token::precedence(TokenKind::GreaterEqual), 3);
    assert_eq!(token::precedence(TokenKind::Plus), 4);
    assert_eq!(token::precedence(TokenKind::Minus), 4);
    assert_eq!(token::precedence(TokenKind::Star), 5);
    assert_eq!(token::precedence(TokenKind::Slash), 5);
    assert_eq!(token::precedence(TokenKind::Bang), 6);

    // Unlisted kinds terminate an expression.
    assert_eq!(token::precedence(TokenKind::Percent), -1);
    assert_eq!(token::precedence(TokenKind::Semicolon), -1);
    assert_eq!(token::precedence(TokenKind::Identifier), -1);
}

#[test]
fn binary_operator_set_includes_and() {
    assert!(token::BINARY_OPERATORS.contains(&TokenKind::And));
    assert!(token::BINARY_OPERATORS.contains(&TokenKind::Or));
    assert!(!token::BINARY_OPERATORS.contains(&TokenKind::Percent));
    assert!(!token::BINARY_OPERATORS.contains(&TokenKind::Bang));
}
