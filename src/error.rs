// ABOUTME: Error types and the diagnostics sink for scanner/parser/interpreter failures

use crate::token::{Token, TokenKind};
use std::cell::Cell;
use thiserror::Error;

// ===== Common error message strings (eliminates allocations in error paths) =====
pub const ERR_OPERAND_NOT_NUMBER: &str = "Operand must be a number.";
pub const ERR_OPERANDS_NOT_NUMBERS: &str = "Operands must be numbers.";
pub const ERR_OPERANDS_NOT_NUM_OR_STR: &str = "Operands must be two numbers or two strings.";
pub const ERR_NOT_CALLABLE: &str = "Can only call functions and classes.";

/// A compile-time failure (scanning or parsing). Carries enough context to
/// format the `[REPORT] <where>:<line>: <message>` line without the caller
/// needing to know which phase raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[REPORT] {where_}:{line}: {message}")]
pub struct CompileError {
    pub line: u32,
    pub where_: String,
    pub message: String,
}

impl CompileError {
    pub fn at_line(line: u32, message: impl Into<String>) -> Self {
        CompileError {
            line,
            where_: String::new(),
            message: message.into(),
        }
    }

    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let where_ = if token.kind == TokenKind::EndOfFile {
            "at end".to_string()
        } else {
            format!("at '{}'", token.lexeme)
        };
        CompileError {
            line: token.line,
            where_,
            message: message.into(),
        }
    }
}

/// A runtime failure raised while walking the AST.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{token} {message}")]
    Type { token: Token, message: String },

    #[error("{token} Undefined variable '{}'.", token.lexeme)]
    UndefinedVariable { token: Token },

    #[error("{token} {}", ERR_NOT_CALLABLE)]
    NotCallable { token: Token },

    #[error("{token} Expected {expected} arguments but got {actual}.")]
    ArityMismatch {
        token: Token,
        expected: usize,
        actual: usize,
    },

    #[error("{token} Stack overflow.")]
    StackOverflow { token: Token },
}

impl RuntimeError {
    pub fn operand_must_be_number(token: &Token) -> Self {
        RuntimeError::Type {
            token: token.clone(),
            message: ERR_OPERAND_NOT_NUMBER.to_string(),
        }
    }

    pub fn operands_must_be_numbers(token: &Token) -> Self {
        RuntimeError::Type {
            token: token.clone(),
            message: ERR_OPERANDS_NOT_NUMBERS.to_string(),
        }
    }

    pub fn operands_must_be_numbers_or_strings(token: &Token) -> Self {
        RuntimeError::Type {
            token: token.clone(),
            message: ERR_OPERANDS_NOT_NUM_OR_STR.to_string(),
        }
    }
}

/// Replaces the global mutable `had_error` / `had_runtime_error` flags from the
/// reference implementation with a single sink object threaded through the
/// scanner, parser, and interpreter.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Reports a compile-time error at a bare line (used by the scanner, which
    /// has no token to attach the error to yet).
    pub fn error(&self, line: u32, message: impl Into<String>) {
        self.report(CompileError::at_line(line, message));
    }

    /// Reports a compile-time error tied to a specific token (used by the parser).
    pub fn error_at(&self, token: &Token, message: impl Into<String>) {
        self.report(CompileError::at_token(token, message));
    }

    fn report(&self, err: CompileError) {
        eprintln!("{}", err);
        self.had_error.set(true);
    }

    pub fn runtime_error(&self, err: &RuntimeError) {
        eprintln!("{}", err);
        self.had_runtime_error.set(true);
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }
}
