//! Unified error handling for the cinder compiler.
//!
//! Each stage has its own error type; this module folds them into one enum
//! with source locations where available, so the driver reports every
//! failure the same way.

#[cfg(test)]
mod tests;

use crate::codegen::compiler::CodegenError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use std::fmt;
use std::io;

#[derive(Debug, Clone, PartialEq)]
pub enum CinderError {
    /// File not found or unreadable (driver boundary).
    Io { message: String },

    /// Tokenization failed.
    Lex {
        message: String,
        line: u32,
        column: u32,
    },

    /// Syntax error.
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// Code generation failed.
    Codegen { message: String },

    /// The system linker failed.
    Link { message: String },

    /// A broken invariant; not a user error.
    Internal { message: String },
}

impl CinderError {
    pub fn io(message: impl Into<String>) -> Self {
        CinderError::Io {
            message: message.into(),
        }
    }

    pub fn lex(message: impl Into<String>, line: u32, column: u32) -> Self {
        CinderError::Lex {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        CinderError::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn codegen(message: impl Into<String>) -> Self {
        CinderError::Codegen {
            message: message.into(),
        }
    }

    pub fn link(message: impl Into<String>) -> Self {
        CinderError::Link {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CinderError::Internal {
            message: message.into(),
        }
    }

    /// Short kind description, e.g. "ParserError".
    pub fn kind(&self) -> &'static str {
        match self {
            CinderError::Io { .. } => "IOError",
            CinderError::Lex { .. } => "LexicalError",
            CinderError::Parse { .. } => "ParserError",
            CinderError::Codegen { .. } => "CodegenError",
            CinderError::Link { .. } => "LinkError",
            CinderError::Internal { .. } => "InternalError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CinderError::Io { message }
            | CinderError::Lex { message, .. }
            | CinderError::Parse { message, .. }
            | CinderError::Codegen { message }
            | CinderError::Link { message }
            | CinderError::Internal { message } => message,
        }
    }

    /// Source position, when the stage tracks one.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            CinderError::Lex { line, column, .. } | CinderError::Parse { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}

impl fmt::Display for CinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position() {
            Some((line, column)) => {
                write!(f, "{} at {}:{}: {}", self.kind(), line, column, self.message())
            }
            None => write!(f, "{}: {}", self.kind(), self.message()),
        }
    }
}

impl std::error::Error for CinderError {}

impl From<io::Error> for CinderError {
    fn from(err: io::Error) -> Self {
        CinderError::io(err.to_string())
    }
}

impl From<LexError> for CinderError {
    fn from(err: LexError) -> Self {
        match err {
            LexError::UnterminatedString { position } => CinderError::lex(
                "Unterminated string literal",
                position.line,
                position.column,
            ),
            LexError::InvalidEscape { ch, position } => CinderError::lex(
                format!("Invalid escape sequence `\\{}`", ch),
                position.line,
                position.column,
            ),
            LexError::UnterminatedComment { position } => CinderError::lex(
                "Unterminated block comment",
                position.line,
                position.column,
            ),
        }
    }
}

impl From<ParseError> for CinderError {
    fn from(err: ParseError) -> Self {
        CinderError::parse(err.message, err.line, err.column)
    }
}

impl From<CodegenError> for CinderError {
    fn from(err: CodegenError) -> Self {
        let message = match err {
            CodegenError::UnknownVariable(name) => {
                format!("Unknown variable referenced: {}", name)
            }
            CodegenError::UnknownFunction(name) => {
                format!("Unknown function referenced: {}", name)
            }
            CodegenError::AssignToConstant(name) => {
                format!("Cannot assign to a constant: {}", name)
            }
            CodegenError::AssignToGlobal(name) => {
                format!("Cannot assign to a global variable: {}", name)
            }
            CodegenError::NonConstantGlobal(name) => {
                format!("Global variable must be constant: {}", name)
            }
            CodegenError::NonConstantInitializer(what) => {
                format!("Global initializer must be a constant expression: {}", what)
            }
            CodegenError::TypeMismatch(message) => format!("Type mismatch: {}", message),
            CodegenError::InvalidOperator(op) => format!("Invalid operator: {}", op),
            CodegenError::InvalidLiteral(message) => format!("Invalid literal: {}", message),
            CodegenError::InvalidType(name) => format!("Invalid type: {}", name),
            CodegenError::Internal(message) => return CinderError::internal(message),
        };

        CinderError::codegen(message)
    }
}
