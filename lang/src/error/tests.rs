use super::*;
use crate::lexer::Position;

#[test]
fn display_includes_the_position_for_frontend_errors() {
    let error = CinderError::parse("Expected a `;` after the expression.", 3, 7);
    assert_eq!(
        error.to_string(),
        "ParserError at 3:7: Expected a `;` after the expression."
    );

    let error = CinderError::lex("Unterminated string literal", 1, 12);
    assert_eq!(
        error.to_string(),
        "LexicalError at 1:12: Unterminated string literal"
    );
}

#[test]
fn display_without_a_position() {
    let error = CinderError::codegen("Unknown variable referenced: foo");
    assert_eq!(
        error.to_string(),
        "CodegenError: Unknown variable referenced: foo"
    );
}

#[test]
fn lex_error_conversion_keeps_the_position() {
    let error = LexError::UnterminatedString {
        position: Position::new(2, 5),
    };
    let unified: CinderError = error.into();

    assert_eq!(unified.kind(), "LexicalError");
    assert_eq!(unified.position(), Some((2, 5)));
}

#[test]
fn invalid_escape_conversion_names_the_character() {
    let error = LexError::InvalidEscape {
        ch: 'x',
        position: Position::new(1, 3),
    };
    let unified: CinderError = error.into();

    assert_eq!(unified.message(), "Invalid escape sequence `\\x`");
}

#[test]
fn parse_error_conversion() {
    let error = ParseError {
        message: "Expected a primary expression.".to_string(),
        line: 4,
        column: 9,
    };
    let unified: CinderError = error.into();

    assert_eq!(unified.kind(), "ParserError");
    assert_eq!(unified.position(), Some((4, 9)));
}

#[test]
fn codegen_error_conversion() {
    let unified: CinderError = CodegenError::UnknownVariable("foo".to_string()).into();
    assert_eq!(
        unified.to_string(),
        "CodegenError: Unknown variable referenced: foo"
    );

    let unified: CinderError = CodegenError::NonConstantGlobal("total".to_string()).into();
    assert_eq!(
        unified.to_string(),
        "CodegenError: Global variable must be constant: total"
    );
}

#[test]
fn internal_codegen_errors_keep_their_kind() {
    let unified: CinderError = CodegenError::Internal("broken invariant".to_string()).into();
    assert_eq!(unified.kind(), "InternalError");
}

#[test]
fn io_error_conversion() {
    let error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let unified: CinderError = error.into();

    assert_eq!(unified.kind(), "IOError");
    assert_eq!(unified.position(), None);
}
