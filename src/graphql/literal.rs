//! GraphQL string literals
//!
//! The configuration document travels inside the mutation text as a
//! double-quoted GraphQL string, so it has to be escaped on the way out.
//! Older rows were written with the quotes escaped twice; those are
//! unescaped once on the way in.

use std::borrow::Cow;

/// Escape `value` for use between the quotes of a GraphQL string literal
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Quote and escape `value` as a complete GraphQL string literal
pub fn quote(value: &str) -> String {
    format!("\"{}\"", escape_string(value))
}

/// Undo one level of quote escaping (`\"` becomes `"`)
pub fn unescape_quotes_once(value: &str) -> Cow<'_, str> {
    if value.contains("\\\"") {
        Cow::Owned(value.replace("\\\"", "\""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Read a GraphQL string literal at the start of `src`
///
/// Leading whitespace is skipped. Returns the unescaped value and the rest of
/// the input after the closing quote, or `None` if `src` does not start with a
/// well-formed literal.
pub fn read_string(src: &str) -> Option<(String, &str)> {
    let src = src.trim_start();
    let body = src.strip_prefix('"')?;

    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, &body[i + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    '/' => out.push('/'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'b' => out.push('\u{8}'),
                    'f' => out.push('\u{c}'),
                    'u' => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            let (_, digit) = chars.next()?;
                            code = code * 16 + digit.to_digit(16)?;
                        }
                        out.push(char::from_u32(code)?);
                    }
                    _ => return None,
                }
            }
            c => out.push(c),
        }
    }

    None
}
