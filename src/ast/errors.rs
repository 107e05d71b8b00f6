use serde::{Deserialize, Serialize};

use crate::ast::Span;

/// Classification of a syntax error, serialized as the upper-case tag the
/// editor UI switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorType {
    /// Input ended in the middle of a clause
    UnexpectedEof,
    /// A token that does not fit the grammar at its position
    UnexpectedToken,
    /// Query does not start with `SELECT`
    NoSelect,
    /// `SELECT` with no select expressions
    NoSelections,
    /// No `FROM` clause
    NoFrom,
    /// `FROM` without an object name
    IncompleteFrom,
    /// `LIMIT` without a count
    IncompleteLimit,
    /// String literal missing its closing quote
    UnterminatedString,
    /// Character that cannot start any token
    UnrecognizedCharacter,
    Unknown,
}

/// A syntax error collected while parsing. Parsing never stops at the first
/// error; each one is recorded and the parser resumes at the next clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub error_type: ErrorType,
    pub message: String,
    pub span: Span,
    /// 1-based
    pub line: usize,
    /// 0-based
    pub column: usize,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}
