use crate::{
    ast::{
        ClauseKind, ClauseNode, ErrorType, FromClauseNode, FromExprNode, Keyword, QueryNode,
        SelectClauseNode, SelectExprNode, Span, SyntaxError, SyntaxTree, Token, TokenKind,
        TokenRange,
    },
    lexer::{LexError, Lexer, Position},
};

/// Recursive-descent parser producing a [`SyntaxTree`].
///
/// The parser never fails: errors are collected on the tree and parsing resumes
/// at the next clause boundary.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let (tokens, lex_error) = Lexer::new(source).tokenize();
        let mut parser = Parser {
            source,
            tokens,
            position: 0,
            errors: Vec::new(),
        };
        if let Some(e) = lex_error {
            parser.push_lex_error(e);
        }
        parser
    }

    /// Parse `source` into a syntax tree.
    pub fn parse(source: &str) -> SyntaxTree {
        let mut parser = Parser::new(source);
        let query = parser.parse_query();
        SyntaxTree {
            source: source.to_string(),
            tokens: parser.tokens,
            query,
            errors: parser.errors,
        }
    }

    fn push_lex_error(&mut self, e: LexError) {
        let error_type = match e {
            LexError::UnterminatedString(_) => ErrorType::UnterminatedString,
            LexError::UnterminatedComment(_) => ErrorType::UnexpectedEof,
            LexError::UnexpectedCharacter { .. } => ErrorType::UnrecognizedCharacter,
        };
        let position = e.position();
        self.errors.push(SyntaxError {
            error_type,
            message: e.to_string(),
            span: Span::new(position.offset, position.offset),
            line: position.line,
            column: position.column,
        });
    }

    fn error(&mut self, error_type: ErrorType, message: impl Into<String>) {
        let span = self.current().span;
        let position = Position::at(self.source, span.start);
        self.errors.push(SyntaxError {
            error_type,
            message: message.into(),
            span,
            line: position.line,
            column: position.column,
        });
    }

    /// Reports `UNEXPECTEDEOF` at end of input, `fallback` otherwise.
    fn error_here(&mut self, fallback: ErrorType, what: &str) {
        if self.current().is_eof() {
            self.error(
                ErrorType::UnexpectedEof,
                format!("unexpected end of input, expected {}", what),
            );
        } else {
            let found = self.current().kind.to_string();
            self.error(fallback, format!("expected {}, found '{}'", what, found));
        }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        let index = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) {
        if !self.current().is_eof() {
            self.position += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn is_identifier(&self) -> bool {
        matches!(self.current().kind, TokenKind::Identifier(_))
    }

    /// Which clause, if any, starts at `position + offset`, and how many
    /// tokens its introducing keywords take.
    fn clause_start_at(&self, offset: usize) -> Option<(ClauseKind, usize)> {
        let token = self.peek(offset);
        let next = self.peek(offset + 1);
        match &token.kind {
            TokenKind::Keyword(Keyword::Where) => Some((ClauseKind::Where, 1)),
            TokenKind::Keyword(Keyword::With) => Some((ClauseKind::With, 1)),
            TokenKind::Keyword(Keyword::Limit) => Some((ClauseKind::Limit, 1)),
            TokenKind::Keyword(Keyword::Group) if next.is_word("BY") => {
                Some((ClauseKind::GroupBy, 2))
            }
            TokenKind::Identifier(_) => {
                if token.is_word("ORDER") && next.is_word("BY") {
                    Some((ClauseKind::OrderBy, 2))
                } else if token.is_word("OFFSET") {
                    Some((ClauseKind::Offset, 1))
                } else if token.is_word("BIND") {
                    Some((ClauseKind::Bind, 1))
                } else if token.is_word("FOR")
                    && (next.is_word("VIEW") || next.is_word("REFERENCE") || next.is_word("UPDATE"))
                {
                    Some((ClauseKind::RecordTracking, 2))
                } else if token.is_word("UPDATE")
                    && (next.is_word("TRACKING") || next.is_word("VIEWSTAT"))
                {
                    Some((ClauseKind::Update, 2))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn at_clause_start(&self) -> bool {
        self.clause_start_at(0).is_some()
    }

    /// Parse a complete query
    pub fn parse_query(&mut self) -> Option<QueryNode> {
        if !self.check_keyword(Keyword::Select) {
            self.error_here(ErrorType::NoSelect, "SELECT");
            return None;
        }

        let mut query = QueryNode {
            select: Some(self.parse_select()),
            ..QueryNode::default()
        };

        if self.check_keyword(Keyword::From) {
            query.from = Some(self.parse_from());
        } else {
            self.error(ErrorType::NoFrom, "expected FROM clause");
        }

        self.parse_trailing_clauses(&mut query);
        Some(query)
    }

    fn parse_select(&mut self) -> SelectClauseNode {
        let start = self.position;
        self.advance(); // consume SELECT

        // SELECT COUNT() stands alone; COUNT(field) is an ordinary column
        if self.current().is_word("COUNT")
            && self.peek(1).kind == TokenKind::LParen
            && self.peek(2).kind == TokenKind::RParen
            && self.peek(3).kind != TokenKind::Comma
            && !matches!(self.peek(3).kind, TokenKind::Identifier(_))
        {
            self.advance();
            self.advance();
            let stop = self.position;
            self.advance();
            return SelectClauseNode::Count {
                range: TokenRange::new(start, stop),
            };
        }

        let mut exprs = Vec::new();
        if self.check_keyword(Keyword::From) || self.current().is_eof() {
            self.error_here(ErrorType::NoSelections, "a field to select");
            return SelectClauseNode::Exprs {
                range: TokenRange::single(start),
                exprs,
            };
        }

        loop {
            if let Some(expr) = self.parse_select_expr() {
                exprs.push(expr);
            }
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            if self.check_keyword(Keyword::From) || self.current().is_eof() {
                break;
            }
            self.error_here(ErrorType::UnexpectedToken, "',' or FROM");
            self.skip_to_select_boundary();
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let stop = exprs.last().map(|e| e.range().stop).unwrap_or(start);
        SelectClauseNode::Exprs {
            range: TokenRange::new(start, stop),
            exprs,
        }
    }

    fn skip_to_select_boundary(&mut self) {
        while !(self.check(&TokenKind::Comma)
            || self.check_keyword(Keyword::From)
            || self.current().is_eof())
        {
            self.advance();
        }
    }

    fn parse_select_expr(&mut self) -> Option<SelectExprNode> {
        let start = self.position;

        if self.check(&TokenKind::LParen) {
            let stop = self.skip_parenthesized()?;
            return Some(SelectExprNode::Subquery {
                range: TokenRange::new(start, stop),
            });
        }

        if self.current().is_word("TYPEOF") {
            let mut depth = 0usize;
            loop {
                if self.current().is_eof() {
                    self.error_here(ErrorType::UnexpectedEof, "END");
                    return None;
                }
                match self.current().kind {
                    TokenKind::LParen => depth += 1,
                    TokenKind::RParen => depth = depth.saturating_sub(1),
                    _ => {}
                }
                if depth == 0 && self.current().is_word("END") {
                    let stop = self.position;
                    self.advance();
                    return Some(SelectExprNode::TypeOf {
                        range: TokenRange::new(start, stop),
                    });
                }
                self.advance();
            }
        }

        if !self.is_identifier() {
            self.error_here(ErrorType::UnexpectedToken, "a field");
            self.skip_to_select_boundary();
            return None;
        }

        let field_stop = self.parse_field_path()?;
        let field = TokenRange::new(start, field_stop);

        let alias = if self.is_identifier() && !self.at_clause_start() {
            let index = self.position;
            self.advance();
            Some(TokenRange::single(index))
        } else {
            None
        };

        let stop = alias.map(|a| a.stop).unwrap_or(field_stop);
        Some(SelectExprNode::Column {
            range: TokenRange::new(start, stop),
            field,
            alias,
        })
    }

    /// `name(.name)*` optionally followed by a parenthesized argument list.
    /// Returns the index of the last consumed token.
    fn parse_field_path(&mut self) -> Option<usize> {
        let mut stop = self.position;
        self.advance();
        while self.check(&TokenKind::Dot) {
            self.advance();
            if !self.is_identifier() {
                self.error_here(ErrorType::UnexpectedToken, "a field name after '.'");
                return None;
            }
            stop = self.position;
            self.advance();
        }
        if self.check(&TokenKind::LParen) {
            stop = self.skip_parenthesized()?;
        }
        Some(stop)
    }

    /// Consumes a balanced parenthesized group, returning the index of the
    /// closing parenthesis.
    fn skip_parenthesized(&mut self) -> Option<usize> {
        let mut depth = 0usize;
        loop {
            match self.current().kind.clone() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        let stop = self.position;
                        self.advance();
                        return Some(stop);
                    }
                }
                TokenKind::Eof => {
                    self.error_here(ErrorType::UnexpectedEof, "')'");
                    return None;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_from(&mut self) -> FromClauseNode {
        let start = self.position;
        self.advance(); // consume FROM

        let mut exprs = Vec::new();
        loop {
            match self.parse_from_expr() {
                Some(expr) => exprs.push(expr),
                None => break,
            }
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let stop = exprs.last().map(|e| e.range.stop).unwrap_or(start);
        FromClauseNode {
            range: TokenRange::new(start, stop),
            exprs,
        }
    }

    fn parse_from_expr(&mut self) -> Option<FromExprNode> {
        if !self.is_identifier() || self.at_clause_start() {
            self.error_here(ErrorType::IncompleteFrom, "an object name");
            return None;
        }

        let start = self.position;
        let mut stop = start;
        self.advance();

        let mut as_keyword = None;
        let mut alias = None;
        if self.current().is_word("AS") {
            as_keyword = Some(self.position);
            self.advance();
            if self.is_identifier() && !self.at_clause_start() {
                alias = Some(TokenRange::single(self.position));
                self.advance();
            } else {
                self.error_here(ErrorType::UnexpectedToken, "an alias after AS");
            }
        } else if self.is_identifier() && !self.at_clause_start() && !self.current().is_word("USING")
        {
            alias = Some(TokenRange::single(self.position));
            self.advance();
        }
        if let Some(alias) = alias {
            stop = alias.stop;
        } else if let Some(index) = as_keyword {
            stop = index;
        }

        let mut using = None;
        if self.current().is_word("USING") {
            let using_start = self.position;
            self.advance();
            if self.current().is_word("SCOPE") {
                self.advance();
                if self.is_identifier() {
                    using = Some(TokenRange::new(using_start, self.position));
                    stop = self.position;
                    self.advance();
                } else {
                    self.error_here(ErrorType::UnexpectedToken, "a scope name");
                }
            } else {
                self.error_here(ErrorType::UnexpectedToken, "SCOPE");
            }
        }

        Some(FromExprNode {
            range: TokenRange::new(start, stop),
            object: TokenRange::single(start),
            as_keyword,
            alias,
            using,
        })
    }

    fn parse_trailing_clauses(&mut self, query: &mut QueryNode) {
        let mut last_kind: Option<ClauseKind> = None;

        while !self.current().is_eof() {
            let Some((kind, keyword_len)) = self.clause_start_at(0) else {
                self.error_here(ErrorType::UnexpectedToken, "a clause keyword");
                while !self.current().is_eof() && !self.at_clause_start() {
                    self.advance();
                }
                continue;
            };

            let in_order = last_kind.is_none_or(|last| kind > last);
            if !in_order {
                self.error(
                    ErrorType::UnexpectedToken,
                    format!("{} clause is duplicated or out of order", kind.name()),
                );
            }

            let node = self.parse_clause(kind, keyword_len);
            let slot = query.slot_mut(kind);
            if slot.is_none() {
                *slot = Some(node);
            }
            if in_order {
                last_kind = Some(kind);
            }
        }
    }

    fn parse_clause(&mut self, kind: ClauseKind, keyword_len: usize) -> ClauseNode {
        let start = self.position;
        for _ in 0..keyword_len {
            self.advance();
        }
        let keywords_stop = self.position - 1;
        let errors_before = self.errors.len();

        let stop = match kind {
            ClauseKind::RecordTracking | ClauseKind::Update => keywords_stop,
            ClauseKind::Limit | ClauseKind::Offset => self.parse_count_body(kind, keywords_stop),
            _ => self.parse_clause_body(kind, keywords_stop),
        };

        ClauseNode {
            kind,
            range: TokenRange::new(start, stop),
            complete: self.errors.len() == errors_before,
        }
    }

    /// Body of `LIMIT` / `OFFSET`: a single number or bind variable.
    fn parse_count_body(&mut self, kind: ClauseKind, keywords_stop: usize) -> usize {
        match self.current().kind.clone() {
            TokenKind::Number(_) | TokenKind::Bind(_) => {
                let stop = self.position;
                self.advance();
                stop
            }
            _ => {
                let error_type = match kind {
                    ClauseKind::Limit => ErrorType::IncompleteLimit,
                    _ => ErrorType::UnexpectedToken,
                };
                if self.at_clause_start() {
                    self.error(error_type, format!("{} requires a number", kind.name()));
                } else {
                    self.error_here(error_type, "a number");
                }
                keywords_stop
            }
        }
    }

    /// Scans to the next clause keyword at parenthesis depth zero.
    fn parse_clause_body(&mut self, kind: ClauseKind, keywords_stop: usize) -> usize {
        let mut depth = 0usize;
        let mut stop = keywords_stop;

        loop {
            let kind = self.current().kind.clone();
            if kind == TokenKind::Eof {
                break;
            }
            if depth == 0 && self.at_clause_start() {
                break;
            }
            match kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    if depth == 0 {
                        self.error(ErrorType::UnexpectedToken, "unbalanced ')'");
                        self.advance();
                        continue;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            stop = self.position;
            self.advance();
        }

        if depth > 0 {
            self.error_here(ErrorType::UnexpectedEof, "')'");
        }
        if stop == keywords_stop {
            if self.current().is_eof() {
                self.error(
                    ErrorType::UnexpectedEof,
                    format!("unexpected end of input after {}", kind.name()),
                );
            } else {
                self.error(
                    ErrorType::UnexpectedToken,
                    format!("{} clause is empty", kind.name()),
                );
            }
        }
        stop
    }
}
