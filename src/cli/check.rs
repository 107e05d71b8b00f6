//! Report syntax errors in a query

use crate::{ast::SyntaxError, parser::Parser};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query text to check
    pub query: String,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// No syntax errors
    Valid,
    /// Every syntax error found, in source order
    Invalid(Vec<SyntaxError>),
}

impl CheckResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckResult::Valid)
    }
}

/// Parse the query and collect its syntax errors
pub fn execute_check(options: &CheckOptions) -> CheckResult {
    let tree = Parser::parse(&options.query);
    if tree.has_errors() {
        CheckResult::Invalid(tree.errors)
    } else {
        CheckResult::Valid
    }
}
