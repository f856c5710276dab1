// C string literal encoding and decoding
//
//  Copyright (C) 2026 The faustpp contributors
//
//  This file is part of faustpp.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Escaping and unescaping of C string literals.
//!
//! The compiler emits string literals in generated source using the usual
//!   C escape grammar.
//! [`decode`] turns such a literal (including its surrounding quotes)
//!   back into text,
//!     and [`encode`] produces a literal from text that is suitable for
//!     splicing into generated source.
//!
//! Recognized escapes are `\0 \a \b \t \n \v \f \r`.
//! Any other escaped character stands for itself,
//!   including `\"` and `\\`.
//! Octal escapes are not recognized:
//!   `\0` is always a single NUL,
//!     and any digits after it are ordinary text.
//!
//! Decoding operates on bytes;
//!   the result must be valid UTF-8.

use std::fmt::Display;

/// A string literal could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CStrError {
    /// The literal is not surrounded by double quotes.
    Unquoted(String),
    /// A backslash at the end of the literal escapes the closing quote.
    DanglingEscape(String),
    /// A double quote appears unescaped inside the literal.
    StrayQuote(String),
    /// The decoded bytes are not valid UTF-8.
    InvalidUtf8(String),
}

impl Display for CStrError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        use CStrError::*;

        match self {
            Unquoted(lit) => {
                write!(fmt, "invalid C string literal `{lit}`: missing quotes")
            }
            DanglingEscape(lit) => write!(
                fmt,
                "invalid C string literal `{lit}`: unterminated escape"
            ),
            StrayQuote(lit) => write!(
                fmt,
                "invalid C string literal `{lit}`: unescaped quote"
            ),
            InvalidUtf8(lit) => write!(
                fmt,
                "invalid C string literal `{lit}`: not valid UTF-8"
            ),
        }
    }
}

impl std::error::Error for CStrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Decode a quoted C string literal into the text it denotes.
pub fn decode(lit: &str) -> Result<String, CStrError> {
    let src = lit.as_bytes();
    let n = src.len();

    if n < 2 || src[0] != b'"' || src[n - 1] != b'"' {
        return Err(CStrError::Unquoted(lit.into()));
    }

    let body = &src[1..n - 1];
    let mut dst = Vec::with_capacity(body.len());
    let mut i = 0;

    while i < body.len() {
        let c = body[i];
        i += 1;

        match c {
            b'"' => return Err(CStrError::StrayQuote(lit.into())),
            b'\\' => {
                let Some(&esc) = body.get(i) else {
                    return Err(CStrError::DanglingEscape(lit.into()));
                };
                i += 1;

                dst.push(match esc {
                    b'0' => 0x00,
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b't' => b'\t',
                    b'n' => b'\n',
                    b'v' => 0x0b,
                    b'f' => 0x0c,
                    b'r' => b'\r',
                    other => other,
                });
            }
            other => dst.push(other),
        }
    }

    String::from_utf8(dst).map_err(|_| CStrError::InvalidUtf8(lit.into()))
}

/// Encode text as a quoted C string literal.
///
/// The result is always accepted by [`decode`],
///   which yields `text` again.
/// NUL is written as `\0` even before a digit,
///   mirroring [`decode`].
pub fn encode(text: &str) -> String {
    let mut lit = String::with_capacity(text.len() + 2);
    lit.push('"');

    for c in text.chars() {
        match c {
            '\0' => lit.push_str("\\0"),
            '\x07' => lit.push_str("\\a"),
            '\x08' => lit.push_str("\\b"),
            '\t' => lit.push_str("\\t"),
            '\n' => lit.push_str("\\n"),
            '\x0b' => lit.push_str("\\v"),
            '\x0c' => lit.push_str("\\f"),
            '\r' => lit.push_str("\\r"),
            '"' | '\\' => {
                lit.push('\\');
                lit.push(c);
            }
            _ => lit.push(c),
        }
    }

    lit.push('"');
    lit
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_plain_literal() {
        assert_eq!(decode(r#""hello""#), Ok("hello".into()));
        assert_eq!(decode(r#""""#), Ok("".into()));
    }

    #[test]
    fn decodes_named_escapes() {
        assert_eq!(
            decode(r#""\a\b\t\n\v\f\r\"\\""#),
            Ok("\x07\x08\t\n\x0b\x0c\r\"\\".into())
        );
    }

    #[test]
    fn nul_escape_does_not_absorb_digits() {
        assert_eq!(decode(r#""a\0b""#), Ok("a\0b".into()));
        assert_eq!(decode(r#""\012""#), Ok("\u{0}12".into()));
        assert_eq!(decode(r#""\0009""#), Ok("\u{0}009".into()));
    }

    #[test]
    fn other_digits_stand_for_themselves() {
        assert_eq!(decode(r#""\101\7""#), Ok("1017".into()));
    }

    #[test]
    fn unknown_escape_stands_for_itself() {
        assert_eq!(decode(r#""\q\'""#), Ok("q'".into()));
    }

    #[test]
    fn decodes_utf8_content() {
        assert_eq!(decode("\"gain (dB) \u{b5}\""), Ok("gain (dB) \u{b5}".into()));
    }

    #[test]
    fn rejects_missing_quotes() {
        assert!(matches!(decode("abc"), Err(CStrError::Unquoted(_))));
        assert!(matches!(decode("\""), Err(CStrError::Unquoted(_))));
        assert!(matches!(decode("\"abc"), Err(CStrError::Unquoted(_))));
        assert!(matches!(decode(""), Err(CStrError::Unquoted(_))));
    }

    #[test]
    fn rejects_escaped_closing_quote() {
        assert!(matches!(
            decode(r#""abc\""#),
            Err(CStrError::DanglingEscape(_))
        ));
    }

    #[test]
    fn rejects_stray_quote() {
        assert!(matches!(
            decode(r#""a"b""#),
            Err(CStrError::StrayQuote(_))
        ));
    }

    #[test]
    fn escaped_multibyte_character_stands_for_itself() {
        assert_eq!(decode("\"\\\u{b5}s\""), Ok("\u{b5}s".into()));
    }

    #[test]
    fn encodes_special_characters() {
        assert_eq!(encode("plain"), r#""plain""#);
        assert_eq!(encode("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(encode("x\ny\tz"), r#""x\ny\tz""#);
    }

    #[test]
    fn encodes_nul() {
        assert_eq!(encode("a\0b"), r#""a\0b""#);
        assert_eq!(encode("\09"), r#""\09""#);
        assert_eq!(encode("\0"), r#""\0""#);
        assert_eq!(encode("\012"), r#""\012""#);
    }

    #[test]
    fn encoding_is_reversible() {
        let text = "\0\x07\x08\t\n\x0b\x0c\r\"\\ mixed \0 9 \012 text";
        assert_eq!(decode(&encode(text)), Ok(text.into()));
    }
}
