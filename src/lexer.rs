use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::ast::{Keyword, Span, Token, TokenKind};

/// `YYYY-MM-DD`, optionally followed by a time and zone offset.
static DATE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(?:T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?)?")
        .expect("date literal pattern is valid")
});

/// Line/column location of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    /// 1-based
    pub line: usize,
    /// 0-based, counted in characters
    pub column: usize,
}

impl Position {
    pub fn at(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count();
        Position { offset, line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unterminated string literal starting at line {}, column {}", .0.line, .0.column)]
    UnterminatedString(Position),

    #[error("unterminated block comment starting at line {}, column {}", .0.line, .0.column)]
    UnterminatedComment(Position),

    #[error("unrecognized character '{character}' at line {}, column {}", position.line, position.column)]
    UnexpectedCharacter { character: char, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString(p) | LexError::UnterminatedComment(p) => *p,
            LexError::UnexpectedCharacter { position, .. } => *position,
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Read every token up to and including `Eof`. On a lexical error the
    /// tokens read so far are returned, terminated by an `Eof` at the error.
    pub fn tokenize(mut self) -> (Vec<Token>, Option<LexError>) {
        let mut tokens = Vec::new();
        loop {
            match self.next_token() {
                Ok(token) => {
                    let done = token.is_eof();
                    tokens.push(token);
                    if done {
                        return (tokens, None);
                    }
                }
                Err(e) => {
                    let at = e.position().offset;
                    tokens.push(Token::new(TokenKind::Eof, Span::new(at, at)));
                    return (tokens, Some(e));
                }
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn here(&self) -> Position {
        Position::at(self.input, self.position)
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.current_char(), self.peek_char(1)) {
                (Some(ch), _) if ch.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match (self.current_char(), self.peek_char(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => self.advance(),
                            (None, _) => return Err(LexError::UnterminatedComment(start)),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.position].to_string()
    }

    /// Reads a quoted literal, keeping quotes and escapes in the token text.
    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let start_position = self.here();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '\'' => {
                    self.advance();
                    return Ok(self.input[start..self.position].to_string());
                }
                '\\' => {
                    self.advance();
                    if self.current_char().is_none() {
                        break;
                    }
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        Err(LexError::UnterminatedString(start_position))
    }

    fn read_number(&mut self) -> TokenKind {
        if let Some(m) = DATE_LITERAL.find(&self.input[self.position..]) {
            let text = m.as_str().to_string();
            self.position += m.end();
            return TokenKind::DateTime(text);
        }

        let start = self.position;
        let mut seen_dot = false;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.'
                && !seen_dot
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Number(self.input[start..self.position].to_string())
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let start = self.position;
        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('\'') => TokenKind::String(self.read_string()?),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let word = self.read_identifier();
                match Keyword::from_word(&word) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Identifier(word),
                }
            }
            Some(':') => {
                self.advance();
                if self
                    .current_char()
                    .is_some_and(|c| c.is_alphabetic() || c == '_')
                {
                    TokenKind::Bind(self.read_identifier())
                } else {
                    TokenKind::Colon
                }
            }
            Some('=') => {
                self.advance();
                TokenKind::Eq
            }
            Some('!') if self.peek_char(1) == Some('=') => {
                self.advance();
                self.advance();
                TokenKind::NotEq
            }
            Some('<') => {
                self.advance();
                match self.current_char() {
                    Some('=') => {
                        self.advance();
                        TokenKind::LtEq
                    }
                    Some('>') => {
                        self.advance();
                        TokenKind::NotEq
                    }
                    _ => TokenKind::Lt,
                }
            }
            Some('>') => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            Some('+') => {
                self.advance();
                TokenKind::Plus
            }
            Some('-') => {
                self.advance();
                TokenKind::Minus
            }
            Some('(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.advance();
                TokenKind::RParen
            }
            Some(',') => {
                self.advance();
                TokenKind::Comma
            }
            Some('.') => {
                self.advance();
                TokenKind::Dot
            }
            Some(character) => {
                return Err(LexError::UnexpectedCharacter {
                    character,
                    position: self.here(),
                });
            }
        };

        Ok(Token::new(kind, Span::new(start, self.position)))
    }
}

#[test]
fn test_keywords_are_case_insensitive() {
    let mut lexer = Lexer::new("select From wHeRe");
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Keyword(Keyword::Select)
    );
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Keyword(Keyword::From)
    );
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Keyword(Keyword::Where)
    );
    assert!(lexer.next_token().unwrap().is_eof());
}

#[test]
fn test_spans_cover_source_text() {
    let source = "SELECT Name FROM Account";
    let (tokens, error) = Lexer::new(source).tokenize();
    assert!(error.is_none());
    let texts: Vec<&str> = tokens
        .iter()
        .map(|t| &source[t.span.start..t.span.end])
        .collect();
    assert_eq!(texts, vec!["SELECT", "Name", "FROM", "Account", ""]);
}

#[test]
fn test_comments_are_skipped() {
    let (tokens, _) = Lexer::new("// header\nSELECT /* inline */ Id").tokenize();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1].kind, TokenKind::Identifier("Id".to_string()));
}

#[test]
fn test_position_counts_lines() {
    let position = Position::at("SELECT\n  Name", 9);
    assert_eq!(position.line, 2);
    assert_eq!(position.column, 2);
}
