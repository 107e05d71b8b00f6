//! Interpretation of the verbatim WHERE, ORDER BY and LIMIT text into flat
//! model structures. Each interpreter works on the clause text alone, so it
//! can run on any captured span independently of the rest of the query.

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    ast::{Keyword, Token, TokenKind},
    lexer::Lexer,
    model::{
        AndOr, CompareValue, Condition, FieldRef, LiteralType, Nulls, Operator, Order,
        OrderByExpression,
    },
    tooling_model::UnsupportedReason,
};

static DATE_RANGE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(YESTERDAY|TODAY|TOMORROW|(LAST|THIS|NEXT)_(WEEK|MONTH|QUARTER|YEAR|FISCAL_QUARTER|FISCAL_YEAR)|(LAST|NEXT)_90_DAYS)$",
    )
    .expect("date range pattern is valid")
});

static DATE_N_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^((LAST|NEXT)_N_(DAYS|WEEKS|MONTHS|QUARTERS|YEARS|FISCAL_QUARTERS|FISCAL_YEARS)|N_(DAYS|WEEKS|MONTHS|QUARTERS|YEARS|FISCAL_QUARTERS|FISCAL_YEARS)_AGO)$",
    )
    .expect("date N literal pattern is valid")
});

/// Token cursor over one clause's text.
struct Cursor<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Cursor<'a> {
    /// `None` when the text does not even lex.
    fn new(text: &'a str) -> Option<Self> {
        let (tokens, error) = Lexer::new(text).tokenize();
        if error.is_some() {
            return None;
        }
        Some(Cursor {
            text,
            tokens,
            position: 0,
        })
    }

    fn current(&self) -> &Token {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
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

    fn slice(&self, first: usize, last: usize) -> &'a str {
        &self.text[self.tokens[first].span.start..self.tokens[last].span.end]
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.current().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.current().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `name(.name)*`, rejected when followed by a call.
    fn field_path(&mut self) -> Option<String> {
        if !matches!(self.current().kind, TokenKind::Identifier(_)) {
            return None;
        }
        let first = self.position;
        let mut last = first;
        self.advance();
        while self.current().kind == TokenKind::Dot {
            self.advance();
            if !matches!(self.current().kind, TokenKind::Identifier(_)) {
                return None;
            }
            last = self.position;
            self.advance();
        }
        if self.current().kind == TokenKind::LParen {
            return None;
        }
        Some(self.slice(first, last).to_string())
    }
}

/// Lift `WHERE a = 1 AND b = 'x'` into conditions and the joining operator.
///
/// Only comparisons joined by one uniform `AND` or `OR` are accepted.
/// Parenthesized groups and mixed operators are reported as
/// [`UnsupportedReason::ComplexGroup`]; anything else that is not a plain
/// comparison as [`UnsupportedReason::Condition`].
pub(crate) fn interpret_where(
    text: &str,
) -> Result<(Vec<Condition>, Option<AndOr>), UnsupportedReason> {
    let mut cursor = Cursor::new(text).ok_or(UnsupportedReason::Condition)?;
    if !cursor.eat_keyword(Keyword::Where) {
        return Err(UnsupportedReason::Condition);
    }

    if has_mixed_operators(&cursor.tokens[cursor.position..]) {
        return Err(UnsupportedReason::ComplexGroup);
    }

    let mut conditions = Vec::new();
    let mut and_or = None;
    loop {
        conditions.push(parse_condition(&mut cursor)?);

        let next = match cursor.current().kind {
            TokenKind::Eof => break,
            TokenKind::Keyword(Keyword::And) => AndOr::And,
            TokenKind::Keyword(Keyword::Or) => AndOr::Or,
            _ => return Err(UnsupportedReason::Condition),
        };
        and_or = Some(next);
        cursor.advance();
    }

    Ok((conditions, and_or))
}

fn has_mixed_operators(tokens: &[Token]) -> bool {
    let mut depth = 0usize;
    let (mut ands, mut ors) = (false, false);
    for token in tokens {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Keyword(Keyword::And) if depth == 0 => ands = true,
            TokenKind::Keyword(Keyword::Or) if depth == 0 => ors = true,
            _ => {}
        }
    }
    ands && ors
}

fn parse_condition(cursor: &mut Cursor<'_>) -> Result<Condition, UnsupportedReason> {
    match cursor.current().kind {
        TokenKind::LParen => return Err(UnsupportedReason::ComplexGroup),
        TokenKind::Keyword(Keyword::Not) => return Err(UnsupportedReason::Condition),
        _ => {}
    }

    let field_name = cursor.field_path().ok_or(UnsupportedReason::Condition)?;

    let operator = match cursor.current().kind {
        TokenKind::Eq => Operator::Eq,
        TokenKind::NotEq => Operator::NotEq,
        TokenKind::Lt => Operator::LessThan,
        TokenKind::LtEq => Operator::LessOrEqual,
        TokenKind::Gt => Operator::GreaterThan,
        TokenKind::GtEq => Operator::GreaterOrEqual,
        TokenKind::Keyword(Keyword::Like) => Operator::Like,
        // IN, NOT IN, INCLUDES, EXCLUDES
        _ => return Err(UnsupportedReason::Condition),
    };
    cursor.advance();

    let compare_value = parse_compare_value(cursor).ok_or(UnsupportedReason::Condition)?;

    Ok(Condition {
        field: FieldRef::new(field_name),
        operator,
        compare_value,
    })
}

fn parse_compare_value(cursor: &mut Cursor<'_>) -> Option<CompareValue> {
    let first = cursor.position;
    let kind = cursor.current().kind.clone();
    let value_type = match &kind {
        TokenKind::String(_) => LiteralType::String,
        TokenKind::Number(n) => {
            Decimal::from_str(n).ok()?;
            LiteralType::Number
        }
        TokenKind::Minus | TokenKind::Plus => {
            let TokenKind::Number(_) = cursor.peek(1).kind else {
                return None;
            };
            cursor.advance();
            let signed = cursor.slice(first, cursor.position);
            Decimal::from_str(signed).ok()?;
            LiteralType::Number
        }
        TokenKind::Keyword(Keyword::True) | TokenKind::Keyword(Keyword::False) => {
            LiteralType::Boolean
        }
        TokenKind::Keyword(Keyword::Null) => LiteralType::Null,
        TokenKind::DateTime(_) => LiteralType::Date,
        TokenKind::Identifier(word) if DATE_RANGE_LITERAL.is_match(word) => LiteralType::Date,
        TokenKind::Identifier(word) if DATE_N_LITERAL.is_match(word) => {
            let TokenKind::Number(_) = cursor.peek(2).kind else {
                return None;
            };
            if cursor.peek(1).kind != TokenKind::Colon {
                return None;
            }
            cursor.advance();
            cursor.advance();
            LiteralType::Date
        }
        _ => return None,
    };
    let last = cursor.position;
    cursor.advance();

    Some(CompareValue {
        value_type,
        value: cursor.slice(first, last).to_string(),
    })
}

/// Lift `ORDER BY a DESC NULLS LAST, b` into order items.
pub(crate) fn interpret_order_by(text: &str) -> Option<Vec<OrderByExpression>> {
    let mut cursor = Cursor::new(text)?;
    if !(cursor.eat_word("ORDER") && cursor.eat_word("BY")) {
        return None;
    }

    let mut items = Vec::new();
    loop {
        let field = cursor.field_path()?;

        let order = if cursor.eat_keyword(Keyword::Asc) {
            Some(Order::Asc)
        } else if cursor.eat_keyword(Keyword::Desc) {
            Some(Order::Desc)
        } else {
            None
        };

        let nulls = if cursor.eat_keyword(Keyword::Nulls) {
            if cursor.eat_keyword(Keyword::First) {
                Some(Nulls::First)
            } else if cursor.eat_keyword(Keyword::Last) {
                Some(Nulls::Last)
            } else {
                return None;
            }
        } else {
            None
        };

        items.push(OrderByExpression {
            field,
            order,
            nulls,
        });

        match cursor.current().kind {
            TokenKind::Comma => cursor.advance(),
            TokenKind::Eof => return Some(items),
            _ => return None,
        }
    }
}

/// Lift `LIMIT 20` into its canonical integer text; `LIMIT 007` gives `7`.
pub(crate) fn interpret_limit(text: &str) -> Option<String> {
    let mut cursor = Cursor::new(text)?;
    if !cursor.eat_keyword(Keyword::Limit) {
        return None;
    }
    let TokenKind::Number(count) = cursor.current().kind.clone() else {
        return None;
    };
    if !count.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let count = count.parse::<u64>().ok()?;
    cursor.advance();
    cursor.current().is_eof().then(|| count.to_string())
}
