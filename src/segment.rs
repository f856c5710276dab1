// Class body segmentation
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

//! Extraction of the generated class body.
//!
//! The compiler is run with an architecture file
//!   (see [`crate::faust::ARCHITECTURE`])
//!   that brackets the class between [`BEGIN_CLASS`] and [`END_CLASS`].
//! [`segment`] keeps only the bracketed lines and wraps them in namespace
//!   macros,
//!     closing the namespace around any `#include` so that headers are
//!     never included from within it.
//!
//! The output is self-contained:
//!   it begins with default definitions for every macro it uses,
//!   each of which the embedding source may define beforehand.

use crate::patch::Keyword;
use lazy_static::lazy_static;
use regex::Regex;

/// Line preceding the class body.
pub const BEGIN_CLASS: &str = "<<<<BeginFaustClass>>>>";

/// Line following the class body.
pub const END_CLASS: &str = "<<<<EndFaustClass>>>>";

pub const BEGIN_NAMESPACE: &str = "FAUSTPP_BEGIN_NAMESPACE";
pub const END_NAMESPACE: &str = "FAUSTPP_END_NAMESPACE";

lazy_static! {
    static ref RE_INCLUDE: Regex =
        Regex::new(r"^\s*#\s*include\s+(.*)$").expect("valid include pattern");
}

const WARNINGS_PUSH: &str = "\
#if defined(__GNUC__)
#   pragma GCC diagnostic push
#   pragma GCC diagnostic ignored \"-Wunused-parameter\"
#endif

";

const WARNINGS_POP: &str = "
#if defined(__GNUC__)
#   pragma GCC diagnostic pop
#endif
";

/// Whether a line is a preprocessor `#include`.
pub fn is_include(line: &str) -> bool {
    RE_INCLUDE.is_match(line)
}

/// Extract the class body from generated source,
///   wrapped in namespace and warning-suppression macros.
///
/// Lines outside of the class body are discarded,
///   as are the bracketing lines themselves.
pub fn segment(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 1024);

    out.push_str(WARNINGS_PUSH);

    for keyword in Keyword::ALL {
        define_default(&mut out, keyword.placeholder(), keyword.as_str());
    }
    out.push('\n');

    define_default(&mut out, BEGIN_NAMESPACE, "");
    define_default(&mut out, END_NAMESPACE, "");
    out.push('\n');

    out.push_str(BEGIN_NAMESPACE);
    out.push_str("\n\n");

    let mut in_class = false;
    let mut in_namespace = true;

    for line in source.lines() {
        if !in_class {
            in_class = line == BEGIN_CLASS;
            continue;
        }

        if line == END_CLASS {
            in_class = false;
            continue;
        }

        match (is_include(line), in_namespace) {
            (true, true) => {
                out.push_str(END_NAMESPACE);
                out.push('\n');
                in_namespace = false;
            }
            (false, false) => {
                out.push_str(BEGIN_NAMESPACE);
                out.push('\n');
                in_namespace = true;
            }
            _ => (),
        }

        out.push_str(line);
        out.push('\n');
    }

    if in_namespace {
        out.push_str(END_NAMESPACE);
        out.push_str("\n\n");
    }

    out.push_str(WARNINGS_POP);
    out
}

/// Define `name` as `value` unless already defined.
fn define_default(out: &mut String, name: &str, value: &str) {
    let sep = if value.is_empty() { "" } else { " " };

    out.push_str(&format!(
        "#ifndef {name}\n#   define {name}{sep}{value}\n#endif\n"
    ));
}
