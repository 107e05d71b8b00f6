use crate::ast::{Span, SyntaxError, Token};

/// Inclusive range of token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRange {
    pub start: usize,
    pub stop: usize,
}

impl TokenRange {
    pub fn new(start: usize, stop: usize) -> Self {
        TokenRange { start, stop }
    }

    pub fn single(index: usize) -> Self {
        TokenRange { start: index, stop: index }
    }
}

/// Clauses following `FROM`, in the order the grammar accepts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClauseKind {
    Where,
    With,
    GroupBy,
    OrderBy,
    Limit,
    Offset,
    Bind,
    RecordTracking,
    Update,
}

impl ClauseKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClauseKind::Where => "WHERE",
            ClauseKind::With => "WITH",
            ClauseKind::GroupBy => "GROUP BY",
            ClauseKind::OrderBy => "ORDER BY",
            ClauseKind::Limit => "LIMIT",
            ClauseKind::Offset => "OFFSET",
            ClauseKind::Bind => "BIND",
            ClauseKind::RecordTracking => "FOR",
            ClauseKind::Update => "UPDATE",
        }
    }
}

/// A clause whose body the parser only delimits.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseNode {
    pub kind: ClauseKind,
    /// From the clause keyword through the last body token
    pub range: TokenRange,
    /// False when a syntax error was reported inside this clause
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectExprNode {
    /// Field path or function call, with an optional alias
    ///
    /// # Examples
    /// ```text
    /// Name
    /// Owner.Name
    /// COUNT(Id) total
    /// ```
    Column {
        range: TokenRange,
        field: TokenRange,
        alias: Option<TokenRange>,
    },

    /// Parenthesized relationship subquery
    Subquery { range: TokenRange },

    /// `TYPEOF ... END` polymorphic expression
    TypeOf { range: TokenRange },
}

impl SelectExprNode {
    pub fn range(&self) -> TokenRange {
        match self {
            SelectExprNode::Column { range, .. }
            | SelectExprNode::Subquery { range }
            | SelectExprNode::TypeOf { range } => *range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectClauseNode {
    /// `SELECT expr, expr, ...`
    Exprs {
        range: TokenRange,
        exprs: Vec<SelectExprNode>,
    },
    /// `SELECT COUNT()`
    Count { range: TokenRange },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromExprNode {
    pub range: TokenRange,
    pub object: TokenRange,
    /// Index of the `AS` token, when written
    pub as_keyword: Option<usize>,
    pub alias: Option<TokenRange>,
    /// `USING SCOPE name`
    pub using: Option<TokenRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClauseNode {
    pub range: TokenRange,
    pub exprs: Vec<FromExprNode>,
}

/// Top-level query node. Every part is optional so that a partially valid
/// query still yields a tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryNode {
    pub select: Option<SelectClauseNode>,
    pub from: Option<FromClauseNode>,
    pub where_clause: Option<ClauseNode>,
    pub with: Option<ClauseNode>,
    pub group_by: Option<ClauseNode>,
    pub order_by: Option<ClauseNode>,
    pub limit: Option<ClauseNode>,
    pub offset: Option<ClauseNode>,
    pub bind: Option<ClauseNode>,
    pub record_tracking: Option<ClauseNode>,
    pub update: Option<ClauseNode>,
}

impl QueryNode {
    pub fn clause(&self, kind: ClauseKind) -> Option<&ClauseNode> {
        self.slot(kind).as_ref()
    }

    pub(crate) fn slot_mut(&mut self, kind: ClauseKind) -> &mut Option<ClauseNode> {
        match kind {
            ClauseKind::Where => &mut self.where_clause,
            ClauseKind::With => &mut self.with,
            ClauseKind::GroupBy => &mut self.group_by,
            ClauseKind::OrderBy => &mut self.order_by,
            ClauseKind::Limit => &mut self.limit,
            ClauseKind::Offset => &mut self.offset,
            ClauseKind::Bind => &mut self.bind,
            ClauseKind::RecordTracking => &mut self.record_tracking,
            ClauseKind::Update => &mut self.update,
        }
    }

    fn slot(&self, kind: ClauseKind) -> &Option<ClauseNode> {
        match kind {
            ClauseKind::Where => &self.where_clause,
            ClauseKind::With => &self.with,
            ClauseKind::GroupBy => &self.group_by,
            ClauseKind::OrderBy => &self.order_by,
            ClauseKind::Limit => &self.limit,
            ClauseKind::Offset => &self.offset,
            ClauseKind::Bind => &self.bind,
            ClauseKind::RecordTracking => &self.record_tracking,
            ClauseKind::Update => &self.update,
        }
    }
}

/// Parse result for one query string.
///
/// Holds the source, every token read from it (ending with `Eof`), the query
/// node and the syntax errors. Text of any node is recovered from token spans,
/// so captured text is always an exact substring of the source.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub source: String,
    pub tokens: Vec<Token>,
    pub query: Option<QueryNode>,
    pub errors: Vec<SyntaxError>,
}

impl SyntaxTree {
    /// Exact source text from the first token of `range` through its last.
    pub fn text(&self, range: TokenRange) -> &str {
        let span = self.span(range);
        &self.source[span.start..span.end]
    }

    pub fn span(&self, range: TokenRange) -> Span {
        let start = self.tokens[range.start].span.start;
        let end = self.tokens[range.stop].span.end.max(start);
        Span::new(start, end)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
