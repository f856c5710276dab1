// Workarounds for defects in compiler output
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

//! Repair of generated source and its XML description.
//!
//! Two independent fixups are applied by [`apply_workarounds`]:
//!
//!   1. When the XML document has no top-level `meta` element,
//!        the compiler's annotation pass was bypassed and the metadata
//!        exists only as `declare` calls in the generated source.
//!      [`synthesize_meta`] recovers them as a [`Diff`] against the
//!        document.
//!   2. The access-control and `virtual` keywords at the start of a line
//!        are replaced by placeholder macros (see [`Keyword`]) so that the
//!        class body can be spliced into a wrapper that decides what they
//!        mean.
//!
//! The source is processed line by line;
//!   every pattern is anchored to the start of the line.

use crate::cstr::{self, CStrError};
use crate::xml::{Diff, Document, Element, NodePath};
use fxhash::FxHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;
use tracing::{debug, info};

/// A quoted C string literal with escapes.
const RE_STRLIT: &str = r#""(?:\\.|[^"\\])*""#;
/// A C identifier.
const RE_IDENT: &str = r"[A-Za-z_][0-9A-Za-z_]*";

lazy_static! {
    /// `m->declare("key", "value");`
    static ref RE_GLOBAL_DECLARE: Regex = Regex::new(&format!(
        r"^\s*{RE_IDENT}\s*(?:->|\.)\s*declare\(\s*({RE_STRLIT})\s*,\s*({RE_STRLIT})\s*\);"
    ))
    .expect("valid global declare pattern");

    /// `ui_interface->declare(&fVslider0, "key", "value");`
    static ref RE_CONTROL_DECLARE: Regex = Regex::new(&format!(
        r"^\s*{RE_IDENT}\s*(?:->|\.)\s*declare\(\s*&\s*({RE_IDENT})\s*,\s*({RE_STRLIT})\s*,\s*({RE_STRLIT})\s*\);"
    ))
    .expect("valid control declare pattern");

    static ref RE_PRIVATE: Regex =
        Regex::new(r"^(\s*)private(\s*:.*)$").expect("valid private pattern");
    static ref RE_PROTECTED: Regex = Regex::new(r"^(\s*)protected(\s*:.*)$")
        .expect("valid protected pattern");
    static ref RE_VIRTUAL: Regex =
        Regex::new(r"^(\s*)virtual([ \t].*$|$)").expect("valid virtual pattern");
}

/// Keywords of the generated class that are replaced by placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Private,
    Protected,
    Virtual,
}

impl Keyword {
    pub const ALL: [Keyword; 3] =
        [Keyword::Private, Keyword::Protected, Keyword::Virtual];

    /// The keyword as it appears in source.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Virtual => "virtual",
        }
    }

    /// Macro substituted for the keyword.
    ///
    /// The wrapping source may define it to anything,
    ///   including nothing;
    ///     see [`crate::segment`] for its default definition.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Private => "FAUSTPP_PRIVATE",
            Self::Protected => "FAUSTPP_PROTECTED",
            Self::Virtual => "FAUSTPP_VIRTUAL",
        }
    }

    /// Line pattern capturing the text before and after the keyword.
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Private => &*RE_PRIVATE,
            Self::Protected => &*RE_PROTECTED,
            Self::Virtual => &*RE_VIRTUAL,
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

/// Generated source and XML after [`apply_workarounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub source: String,
    pub doc: Document,
}

/// Error while repairing compiler output.
///
/// These represent malformed compiler output and are not recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// A `declare` call names a control not present in the XML.
    UnknownControlVariable(String),
    /// A `declare` call contains a string literal that cannot be decoded.
    InvalidLiteral(CStrError),
}

impl From<CStrError> for PatchError {
    fn from(e: CStrError) -> Self {
        Self::InvalidLiteral(e)
    }
}

impl Display for PatchError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::UnknownControlVariable(var) => write!(
                fmt,
                "metadata declared for unknown control variable `{var}`"
            ),
            Self::InvalidLiteral(e) => Display::fmt(e, fmt),
        }
    }
}

impl std::error::Error for PatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownControlVariable(_) => None,
            Self::InvalidLiteral(e) => Some(e),
        }
    }
}

/// Apply all workarounds to the compiler's output.
///
/// The document is consumed and returned updated;
///   it is changed only if it lacks top-level `meta` elements.
pub fn apply_workarounds(
    source: &str,
    doc: Document,
) -> Result<Patched, PatchError> {
    let doc = if doc.root().child("meta").is_none() {
        let diff = synthesize_meta(source, &doc)?;

        info!(
            recovered = diff.len(),
            "XML lacks metadata; recovering it from generated source"
        );

        doc.apply(diff)
    } else {
        doc
    };

    Ok(Patched {
        source: substitute_keywords(source),
        doc,
    })
}

/// Recover `meta` elements from `declare` calls in generated source.
///
/// Global declarations become top-level `meta` elements;
///   per-control declarations are appended to the `widget` whose
///   `varname` matches.
/// This does not check whether the document already has metadata.
pub fn synthesize_meta(source: &str, doc: &Document) -> Result<Diff, PatchError> {
    let widgets = widget_paths(doc);
    let mut diff = Diff::default();

    for line in source.lines() {
        if let Some(caps) = RE_GLOBAL_DECLARE.captures(line) {
            let key = cstr::decode(&caps[1])?;
            let value = cstr::decode(&caps[2])?;

            diff.append(NodePath::default(), meta_element(key, value));
        } else if let Some(caps) = RE_CONTROL_DECLARE.captures(line) {
            let var = &caps[1];
            let key = cstr::decode(&caps[2])?;
            let value = cstr::decode(&caps[3])?;

            let path = widgets
                .get(var)
                .ok_or_else(|| PatchError::UnknownControlVariable(var.into()))?;

            diff.append(path.clone(), meta_element(key, value));
        }
    }

    debug!(elements = diff.len(), "synthesized meta elements");

    Ok(diff)
}

/// Index widgets by variable name.
///
/// Active widgets are indexed before passive ones,
///   so a passive widget shadows an active widget of the same name.
fn widget_paths(doc: &Document) -> FxHashMap<String, NodePath> {
    ["ui/activewidgets/widget", "ui/passivewidgets/widget"]
        .into_iter()
        .flat_map(|path| doc.select_indexed(path))
        .map(|(path, widget)| {
            (widget.child_text("varname").unwrap_or_default(), path)
        })
        .collect()
}

fn meta_element(key: String, value: String) -> Element {
    Element::new("meta").with_attr("key", key).with_text(value)
}

/// Replace leading keywords with their placeholders.
///
/// Every output line is terminated by a newline,
///   including the last.
pub fn substitute_keywords(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 64);
    let mut rewritten = 0usize;

    for line in source.lines() {
        match substitute_line(line) {
            Some((leading, keyword, trailing)) => {
                out.push_str(leading);
                out.push_str(keyword.placeholder());
                out.push_str(trailing);
                rewritten += 1;
            }
            None => out.push_str(line),
        }

        out.push('\n');
    }

    debug!(lines = rewritten, "substituted keyword placeholders");

    out
}

/// Split a line around a leading [`Keyword`],
///   if it has one.
fn substitute_line(line: &str) -> Option<(&str, Keyword, &str)> {
    Keyword::ALL.into_iter().find_map(|keyword| {
        keyword.pattern().captures(line).map(|caps| {
            let leading = caps.get(1).map_or("", |m| m.as_str());
            let trailing = caps.get(2).map_or("", |m| m.as_str());

            (leading, keyword, trailing)
        })
    })
}
