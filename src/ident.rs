// Identifier mangling
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

//! Mapping of arbitrary label text onto C identifiers.

/// Produce a valid C identifier from arbitrary text.
///
/// Every byte that is not an ASCII letter or digit becomes `_`,
///   so a multi-byte UTF-8 character yields one `_` per byte.
/// A leading digit is preceded by `_`,
///   and empty input yields `_`.
/// The mapping is deterministic but not injective.
pub fn mangle(name: &str) -> String {
    let src = (if name.is_empty() { "_" } else { name }).as_bytes();
    let mut id = String::with_capacity(src.len() + 1);

    if src[0].is_ascii_digit() {
        id.push('_');
    }

    id.extend(src.iter().map(|&c| {
        if c.is_ascii_alphanumeric() {
            c as char
        } else {
            '_'
        }
    }));

    id
}
