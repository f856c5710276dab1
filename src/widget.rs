// Widget descriptors
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

//! Controls and readouts of a DSP unit.
//!
//! Each `widget` element of the compiler's XML description becomes a
//!   [`Widget`].
//! Whether a widget kind may appear as an [`Role::Active`] control or a
//!   [`Role::Passive`] readout is fixed:
//!
//! | kind                         | role    | range                    |
//! |------------------------------|---------|--------------------------|
//! | `vslider` `hslider` `nentry` | active  | from `init min max step` |
//! | `button` `checkbox`          | active  | `0 0 1 1`                |
//! | `vbargraph` `hbargraph`      | passive | from `min max`           |
//!
//! Any other combination is rejected with
//!   [`WidgetError::UnsupportedWidgetKind`].
//!
//! Of the widget's metadata,
//!   `unit`, `scale`, and `tooltip` are interpreted;
//!     everything else is carried along verbatim.

use crate::num::{is_decint, parse_cfloat};
use crate::xml::Element;
use std::fmt::Display;

/// Kind of widget,
///   as named by the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Button,
    CheckBox,
    VSlider,
    HSlider,
    NEntry,
    VBarGraph,
    HBarGraph,
}

impl WidgetKind {
    /// Kind for the given `type` name,
    ///   which must match exactly.
    pub fn from_name(name: &str) -> Option<Self> {
        use WidgetKind::*;

        Some(match name {
            "button" => Button,
            "checkbox" => CheckBox,
            "vslider" => VSlider,
            "hslider" => HSlider,
            "nentry" => NEntry,
            "vbargraph" => VBarGraph,
            "hbargraph" => HBarGraph,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        use WidgetKind::*;

        match self {
            Button => "button",
            CheckBox => "checkbox",
            VSlider => "vslider",
            HSlider => "hslider",
            NEntry => "nentry",
            VBarGraph => "vbargraph",
            HBarGraph => "hbargraph",
        }
    }
}

impl Display for WidgetKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

/// Whether a widget is written by the user or reported by the DSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Active,
    Passive,
}

impl Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Active => write!(fmt, "active"),
            Self::Passive => write!(fmt, "passive"),
        }
    }
}

/// Mapping between a control's raw value and its meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scale {
    #[default]
    Linear,
    Log,
    Exp,
}

impl Scale {
    /// Scale named by a `scale` metadata value.
    ///
    /// Linear is the absence of a `scale` key,
    ///   and so has no name here.
    pub fn from_name(name: &str) -> Result<Self, WidgetError> {
        match name {
            "log" => Ok(Self::Log),
            "exp" => Ok(Self::Exp),
            _ => Err(WidgetError::InvalidScaleName(name.into())),
        }
    }
}

impl Display for Scale {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Linear => write!(fmt, "linear"),
            Self::Log => write!(fmt, "log"),
            Self::Exp => write!(fmt, "exp"),
        }
    }
}

/// Numeric range of a widget.
///
/// Fields that a kind does not define are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    pub init: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Range {
    /// Range of a two-state control.
    pub const TOGGLE: Range = Range {
        init: 0.,
        min: 0.,
        max: 1.,
        step: 1.,
    };
}

/// A single control or readout.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub kind: WidgetKind,
    /// The `type` attribute as it appeared in the XML.
    pub kind_name: String,
    pub id: i64,
    pub label: String,
    /// Name of the member variable in generated source.
    pub var: String,
    pub range: Range,
    /// Metadata pairs in document order,
    ///   less empty positional hints.
    pub meta: Vec<(String, String)>,

    /// Value of the `unit` key.
    pub unit: String,
    /// Interpretation of the `scale` key.
    pub scale: Scale,
    /// Value of the `scale` key.
    pub scale_name: String,
    /// Value of the `tooltip` key.
    pub tooltip: String,
}

impl Widget {
    /// Interpret a `widget` element found under the given role.
    pub fn extract(node: &Element, role: Role) -> Result<Self, WidgetError> {
        use Role::*;
        use WidgetKind::*;

        let kind_name = node.attr("type").unwrap_or_default();
        let unsupported = || WidgetError::UnsupportedWidgetKind {
            name: kind_name.into(),
            role,
        };

        let kind = WidgetKind::from_name(kind_name).ok_or_else(unsupported)?;

        let range = match (kind, role) {
            (VSlider | HSlider | NEntry, Active) => Range {
                init: child_number(node, "init")?,
                min: child_number(node, "min")?,
                max: child_number(node, "max")?,
                step: child_number(node, "step")?,
            },
            (Button | CheckBox, Active) => Range::TOGGLE,
            (VBarGraph | HBarGraph, Passive) => Range {
                min: child_number(node, "min")?,
                max: child_number(node, "max")?,
                ..Default::default()
            },
            (VBarGraph | HBarGraph, Active)
            | (Button | CheckBox | VSlider | HSlider | NEntry, Passive) => {
                return Err(unsupported())
            }
        };

        let id_text = node.attr("id").unwrap_or("0");
        let id = id_text
            .trim()
            .parse::<i64>()
            .map_err(|_| WidgetError::InvalidId(id_text.into()))?;

        let mut widget = Self {
            kind,
            kind_name: kind_name.into(),
            id,
            label: node.child_text("label").unwrap_or_default(),
            var: node.child_text("varname").unwrap_or_default(),
            range,
            meta: Vec::new(),
            unit: String::new(),
            scale: Scale::Linear,
            scale_name: String::new(),
            tooltip: String::new(),
        };

        for meta in node.children_named("meta") {
            widget.add_meta(meta.attr("key").unwrap_or_default(), meta.text())?;
        }

        Ok(widget)
    }

    /// Record a metadata pair and interpret it if its key is known.
    fn add_meta(&mut self, key: &str, value: String) -> Result<(), WidgetError> {
        // Positional hints carry no meaning without a value.
        if is_decint(key) && value.is_empty() {
            return Ok(());
        }

        match key {
            "unit" => self.unit = value.clone(),
            "scale" => {
                self.scale = Scale::from_name(&value)?;
                self.scale_name = value.clone();
            }
            "tooltip" => self.tooltip = value.clone(),
            _ => (),
        }

        self.meta.push((key.into(), value));
        Ok(())
    }
}

/// Parse numeric child text,
///   defaulting to zero when absent.
fn child_number(node: &Element, name: &'static str) -> Result<f64, WidgetError> {
    let text = node.child_text(name).unwrap_or_else(|| "0".into());

    parse_cfloat(&text).map_err(|_| WidgetError::InvalidNumber { name, text })
}

/// Error while interpreting a `widget` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// Unknown `type`,
    ///   or a kind that may not appear in the given role.
    UnsupportedWidgetKind { name: String, role: Role },
    /// A `scale` metadata value other than `log` or `exp`.
    InvalidScaleName(String),
    /// Numeric child element text is not a float literal.
    InvalidNumber { name: &'static str, text: String },
    /// The `id` attribute is not an integer.
    InvalidId(String),
}

impl Display for WidgetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        use WidgetError::*;

        match self {
            UnsupportedWidgetKind { name, role } => {
                write!(fmt, "unsupported {role} widget type `{name}`")
            }
            InvalidScaleName(name) => {
                write!(fmt, "invalid widget scale name `{name}`")
            }
            InvalidNumber { name, text } => {
                write!(fmt, "invalid widget `{name}` value `{text}`")
            }
            InvalidId(text) => write!(fmt, "invalid widget id `{text}`"),
        }
    }
}

impl std::error::Error for WidgetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
