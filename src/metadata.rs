// DSP unit metadata
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

//! The public description of a DSP unit.
//!
//! [`Metadata::extract`] assembles the description from the compiler's
//!   XML document and its (patched) generated source.
//! The source file name is not part of the XML;
//!   it is provided afterward using [`Metadata::with_origin`],
//!     which also labels the unit's channels.
//!
//! Channel Labels
//! ==============
//! The compiler records a label for each channel as a top-level `meta`
//!   element keyed `<file>/<process>:input<n>`
//!   (or `:output<n>`).
//! The value uses the same syntax as a control label,
//!   `name [key:value][key:value]`;
//!     see [`Port::from_label`].
//! Channels without such an entry have an empty name.

use crate::segment::segment;
use crate::widget::{Role, Widget, WidgetError};
use crate::xml::{Document, Element};
use std::fmt::Display;

/// Process name used when none is given to the compiler.
pub const DEFAULT_PROCESS_NAME: &str = "process";

/// An input or output channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub meta: Vec<(String, String)>,
}

impl Port {
    /// Parse a label of the form `name [key:value][key:value]`.
    ///
    /// Text outside of brackets forms the name.
    /// A bracket group without `:` has an empty value,
    ///   and an unclosed final group extends to the end of the label.
    /// Names,
    ///   keys,
    ///   and values are trimmed.
    pub fn from_label(label: &str) -> Self {
        let mut name = String::new();
        let mut meta = Vec::new();
        let mut rest = label;

        while !rest.is_empty() {
            let Some(open) = rest.find('[') else {
                name.push_str(rest);
                break;
            };

            name.push_str(&rest[..open]);
            rest = &rest[open + 1..];

            let group = match rest.find(']') {
                Some(close) => {
                    let group = &rest[..close];
                    rest = &rest[close + 1..];
                    group
                }
                None => std::mem::take(&mut rest),
            };

            let (key, value) = group.split_once(':').unwrap_or((group, ""));
            meta.push((key.trim().to_string(), value.trim().to_string()));
        }

        Self {
            name: name.trim().to_string(),
            meta,
        }
    }
}

/// Complete description of a DSP unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub author: String,
    pub copyright: String,
    pub license: String,
    pub version: String,
    pub class_name: String,
    /// Base name of the DSP source file,
    ///   empty until [`Metadata::with_origin`].
    pub file_name: String,
    pub process_name: String,

    pub inputs: usize,
    pub outputs: usize,

    /// Top-level metadata pairs in document order.
    pub meta: Vec<(String, String)>,

    /// User-writable controls.
    pub active: Vec<Widget>,
    /// Readouts reported by the DSP.
    pub passive: Vec<Widget>,

    /// One entry per input channel,
    ///   empty until [`Metadata::with_origin`].
    pub ins: Vec<Port>,
    /// One entry per output channel,
    ///   empty until [`Metadata::with_origin`].
    pub outs: Vec<Port>,

    /// Class body ready for embedding;
    ///   see [`crate::segment`].
    pub class_code: String,
}

impl Metadata {
    /// Assemble metadata from the compiler's XML description and the
    ///   generated source.
    ///
    /// Both must already have had workarounds applied
    ///   (see [`crate::patch`]).
    pub fn extract(doc: &Document, source: &str) -> Result<Self, MetadataError> {
        let root = doc.root();
        let text = |name: &str| root.child_text(name).unwrap_or_default();

        let inputs = channel_count(root, "inputs")?;
        let outputs = channel_count(root, "outputs")?;

        Ok(Self {
            name: text("name"),
            author: text("author"),
            copyright: text("copyright"),
            license: text("license"),
            version: text("version"),
            class_name: text("classname"),
            file_name: String::new(),
            process_name: DEFAULT_PROCESS_NAME.into(),
            inputs,
            outputs,
            meta: root
                .children_named("meta")
                .map(|meta| {
                    (meta.attr("key").unwrap_or_default().to_string(), meta.text())
                })
                .collect(),
            active: widgets(root, "./ui/activewidgets/widget", Role::Active)?,
            passive: widgets(root, "./ui/passivewidgets/widget", Role::Passive)?,
            ins: Vec::new(),
            outs: Vec::new(),
            class_code: segment(source),
        })
    }

    /// Record where the unit came from and label its channels
    ///   accordingly.
    pub fn with_origin<F, P>(mut self, file_name: F, process_name: P) -> Self
    where
        F: Into<String>,
        P: Into<String>,
    {
        self.file_name = file_name.into();
        self.process_name = process_name.into();

        self.ins = (0..self.inputs).map(|i| self.port("input", i)).collect();
        self.outs = (0..self.outputs).map(|i| self.port("output", i)).collect();

        self
    }

    /// Channel label for `direction` channel `index`.
    fn port(&self, direction: &str, index: usize) -> Port {
        let key = format!(
            "{}/{}:{direction}{index}",
            self.file_name, self.process_name
        );

        self.meta
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, label)| Port::from_label(label))
            .unwrap_or_default()
    }
}

fn channel_count(
    root: &Element,
    name: &'static str,
) -> Result<usize, MetadataError> {
    let text = root.child_text(name).unwrap_or_else(|| "0".into());

    text.trim()
        .parse()
        .map_err(|_| MetadataError::MalformedChannelCount { name, text })
}

fn widgets(
    root: &Element,
    path: &str,
    role: Role,
) -> Result<Vec<Widget>, MetadataError> {
    root.select(path)
        .into_iter()
        .map(|node| Widget::extract(node, role).map_err(MetadataError::from))
        .collect()
}

/// Error while assembling [`Metadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// `inputs` or `outputs` is not a non-negative integer.
    MalformedChannelCount { name: &'static str, text: String },
    Widget(WidgetError),
}

impl From<WidgetError> for MetadataError {
    fn from(e: WidgetError) -> Self {
        Self::Widget(e)
    }
}

impl Display for MetadataError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::MalformedChannelCount { name, text } => {
                write!(fmt, "malformed number of {name} `{text}`")
            }
            Self::Widget(e) => Display::fmt(e, fmt),
        }
    }
}

impl std::error::Error for MetadataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedChannelCount { .. } => None,
            Self::Widget(e) => Some(e),
        }
    }
}
