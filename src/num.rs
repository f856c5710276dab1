// Numeric literals emitted by the Faust compiler
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

//! General numeric parsing used throughout the system.

use std::fmt::Display;

/// Text that is not a float literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatLiteralError(pub String);

impl Display for FloatLiteralError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "invalid float literal `{}`", self.0)
    }
}

impl std::error::Error for FloatLiteralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Parse a C float literal,
///   which may carry a single trailing `f` or `F` suffix.
///
/// Surrounding whitespace is ignored,
///   since the text usually comes straight from an XML element.
pub fn parse_cfloat(text: &str) -> Result<f64, FloatLiteralError> {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix(&['f', 'F'][..]).unwrap_or(trimmed);

    digits
        .parse()
        .map_err(|_| FloatLiteralError(text.to_string()))
}

/// Whether `text` is a decimal integer,
///   optionally negative.
///
/// ```
/// use faustpp::num::is_decint;
///
/// assert!(is_decint("12"));
/// assert!(is_decint("-7"));
/// assert!(!is_decint("-"));
/// assert!(!is_decint("1.0"));
/// ```
pub fn is_decint(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);

    !digits.is_empty() && digits.bytes().all(|c| c.is_ascii_digit())
}
