//! # SOQL Syntax Tree
//!
//! This module defines the token-addressable syntax tree produced by the
//! [`Parser`](crate::parser::Parser) for one SOQL query string.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens with byte spans produced by the lexer
//! - **[query]** - Query node, clause nodes and the [`SyntaxTree`] container
//! - **[errors]** - Syntax errors and their type tags
//!
//! ## Shape
//!
//! The tree is shallow. `SELECT` expressions and `FROM`
//! expressions get their own nodes; every later clause is only delimited:
//!
//! ```text
//! SELECT Name, Owner.Name, (SELECT Id FROM Contacts) FROM Account WHERE Name = 'x' LIMIT 5
//! |----- select: Column, Column, Subquery ----------| |-from-| |-- where ---| |limit|
//! ```
//!
//! Nodes refer to tokens through inclusive [`TokenRange`]s. The text of a node
//! is always cut from the source between the first and last token, never
//! re-rendered, so constructs the model does not understand survive unchanged.
//!
//! ## Error Recovery
//!
//! Syntax errors are collected rather than raised. An incomplete clause such
//! as a trailing `GROUP BY` still produces a node covering its keywords and is
//! flagged with `complete: false`.
pub mod errors;
pub mod query;
pub mod tokens;

pub use errors::{ErrorType, SyntaxError};
pub use query::{
    ClauseKind, ClauseNode, FromClauseNode, FromExprNode, QueryNode, SelectClauseNode,
    SelectExprNode, SyntaxTree, TokenRange,
};
pub use tokens::{Keyword, Span, Token, TokenKind};
