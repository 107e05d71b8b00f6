use std::fmt;

/// Half-open byte range into the query source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// Reserved SOQL words.
///
/// Only the words SOQL reserves are lexed as keywords. Words such as `ORDER`,
/// `OFFSET`, `AS` or `USING` can also name objects and fields (`FROM Order` is
/// valid), so they stay identifiers and the parser recognizes them by context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Asc,
    Desc,
    Excludes,
    False,
    First,
    From,
    Group,
    Having,
    In,
    Includes,
    Last,
    Like,
    Limit,
    Not,
    Null,
    Nulls,
    Or,
    Select,
    True,
    Where,
    With,
}

impl Keyword {
    /// Case-insensitive lookup of a reserved word.
    pub fn from_word(word: &str) -> Option<Keyword> {
        let keyword = match word.to_ascii_uppercase().as_str() {
            "AND" => Keyword::And,
            "ASC" => Keyword::Asc,
            "DESC" => Keyword::Desc,
            "EXCLUDES" => Keyword::Excludes,
            "FALSE" => Keyword::False,
            "FIRST" => Keyword::First,
            "FROM" => Keyword::From,
            "GROUP" => Keyword::Group,
            "HAVING" => Keyword::Having,
            "IN" => Keyword::In,
            "INCLUDES" => Keyword::Includes,
            "LAST" => Keyword::Last,
            "LIKE" => Keyword::Like,
            "LIMIT" => Keyword::Limit,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "NULLS" => Keyword::Nulls,
            "OR" => Keyword::Or,
            "SELECT" => Keyword::Select,
            "TRUE" => Keyword::True,
            "WHERE" => Keyword::Where,
            "WITH" => Keyword::With,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::And => "AND",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::Excludes => "EXCLUDES",
            Keyword::False => "FALSE",
            Keyword::First => "FIRST",
            Keyword::From => "FROM",
            Keyword::Group => "GROUP",
            Keyword::Having => "HAVING",
            Keyword::In => "IN",
            Keyword::Includes => "INCLUDES",
            Keyword::Last => "LAST",
            Keyword::Like => "LIKE",
            Keyword::Limit => "LIMIT",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::Nulls => "NULLS",
            Keyword::Or => "OR",
            Keyword::Select => "SELECT",
            Keyword::True => "TRUE",
            Keyword::Where => "WHERE",
            Keyword::With => "WITH",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Reserved word, matched case-insensitively
    ///
    /// # Examples
    /// ```text
    /// SELECT
    /// from
    /// Nulls
    /// ```
    Keyword(Keyword),

    /// Object, field, alias or contextual word
    ///
    /// Must start with a letter or underscore, followed by letters, digits, or
    /// underscores. Dotted relationship paths are separate identifier and dot
    /// tokens.
    ///
    /// # Examples
    /// ```text
    /// Account
    /// Custom_Field__c
    /// ORDER
    /// ```
    Identifier(String),

    /// Integer or decimal number, source text preserved
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number(String),

    /// Date or datetime literal, source text preserved
    ///
    /// # Examples
    /// ```text
    /// 2020-12-31
    /// 2020-12-31T23:59:59Z
    /// 2020-12-31T23:59:59.000+01:00
    /// ```
    DateTime(String),

    /// Single-quoted string literal, stored exactly as written (quotes and
    /// escapes included)
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// 'it\'s'
    /// ```
    String(String),

    /// Apex bind variable, stored without the leading colon
    ///
    /// # Examples
    /// ```text
    /// :accountId
    /// ```
    Bind(String),

    // Comparison
    /// `=`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Punctuation
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:` not followed by an identifier, as in `LAST_N_DAYS:30`
    Colon,

    /// End of input
    Eof,
}

/// A token together with the byte range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// True for an identifier spelling `word`, ignoring case.
    pub fn is_word(&self, word: &str) -> bool {
        match &self.kind {
            TokenKind::Identifier(name) => name.eq_ignore_ascii_case(word),
            _ => false,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "{}", k.as_str()),
            TokenKind::Identifier(s) | TokenKind::Number(s) | TokenKind::DateTime(s) => {
                write!(f, "{}", s)
            }
            TokenKind::String(s) => write!(f, "{}", s),
            TokenKind::Bind(s) => write!(f, ":{}", s),
            TokenKind::Eq => write!(f, "="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Eof => write!(f, "<EOF>"),
        }
    }
}
