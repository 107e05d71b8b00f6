//! SOQL string literal codec.
//!
//! [`encode`] turns a display value into a quoted literal, escaping `'`, `"`
//! and `\`. [`decode`] reverses it. Both accept any input, and
//! `decode(&encode(s)) == s` for every string `s`.
//!
//! ```
//! use soql_model::literal::{decode, encode};
//!
//! assert_eq!(encode("it's"), r"'it\'s'");
//! assert_eq!(decode(r"'it\'s'"), "it's");
//! ```

const QUOTE: char = '\'';

fn needs_escape(ch: char) -> bool {
    matches!(ch, '\'' | '"' | '\\')
}

/// Surround with quotes and escape characters SOQL requires escaped.
pub fn encode(display_value: &str) -> String {
    let mut literal = String::with_capacity(display_value.len() + 2);
    literal.push(QUOTE);
    for ch in display_value.chars() {
        if needs_escape(ch) {
            literal.push('\\');
        }
        literal.push(ch);
    }
    literal.push(QUOTE);
    literal
}

/// Strip surrounding quotes and un-escape `\'`, `\"` and `\\`. Any other
/// backslash sequence is left as written.
pub fn decode(literal: &str) -> String {
    let inner = strip_quotes(literal);
    let mut display_value = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if needs_escape(next) {
                    display_value.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        display_value.push(ch);
    }
    display_value
}

/// True when `text` is a complete quoted literal whose closing quote is not
/// escaped.
pub fn is_quoted(text: &str) -> bool {
    if text.len() < 2 || !text.starts_with(QUOTE) || !text.ends_with(QUOTE) {
        return false;
    }
    let inner = &text[1..text.len() - 1];
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            QUOTE => return false,
            _ => {}
        }
    }
    true
}

fn strip_quotes(literal: &str) -> &str {
    if literal.len() >= 2 && literal.starts_with(QUOTE) && literal.ends_with(QUOTE) {
        &literal[1..literal.len() - 1]
    } else {
        literal
    }
}
