// Rendering of DSP unit metadata
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

//! Flattening of [`Metadata`] for output.
//!
//! A [`Context`] is a flat mapping from names to JSON-like values.
//! Any [`Renderer`] turns a context into output text:
//!   [`TemplateRenderer`] renders a Jinja template file,
//!     in which the [`Callable`]s are available as functions,
//!   and [`JsonRenderer`] simply writes the values as a JSON object.
//!
//! Context Keys
//! ============
//! | key            | value                                          |
//! |----------------|------------------------------------------------|
//! | `class_code`   | segmented class body                           |
//! | `name` `author` `copyright` `license` `version` | descriptive strings |
//! | `class_name`   | name of the generated class                    |
//! | `process_name` | name of the compiled process                   |
//! | `file_name`    | base name of the DSP source                    |
//! | `inputs`       | number of input channels                       |
//! | `outputs`      | number of output channels                      |
//! | `meta`         | top-level metadata as an object                |
//! | `active`       | array of control records                       |
//! | `passive`      | array of readout records                       |
//! | `ins` `outs`   | arrays of `{name, meta}` channel records       |
//!
//! Control records have the keys
//!   `type id label var init min max step unit scale tooltip meta`.
//! Metadata values in every `meta` object are interpreted by
//!   [`parse_value_string`],
//!     as are user definitions,
//!       which are layered on top of everything else.

use crate::cstr;
use crate::ident::mangle;
use crate::metadata::{Metadata, Port};
use crate::widget::Widget;
use minijinja::{value::Rest, Environment, ErrorKind};
use serde_json::{Map, Number, Value};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Message of a [`Callable::Fail`] invoked without one.
pub const DEFAULT_FAILURE_MESSAGE: &str = "failure without a message";

/// Values available to a [`Renderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    values: Map<String, Value>,
}

impl Context {
    /// Flatten `md` and layer `defines` on top.
    ///
    /// Definitions are applied in order,
    ///   so a later definition of a name replaces an earlier one.
    pub fn new<I, K, V>(md: &Metadata, defines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut values = Map::new();
        let mut set = |key: &str, value: Value| {
            values.insert(key.into(), value);
        };

        set("class_code", md.class_code.as_str().into());
        set("name", md.name.as_str().into());
        set("author", md.author.as_str().into());
        set("copyright", md.copyright.as_str().into());
        set("license", md.license.as_str().into());
        set("version", md.version.as_str().into());
        set("class_name", md.class_name.as_str().into());
        set("process_name", md.process_name.as_str().into());
        set("file_name", md.file_name.as_str().into());
        set("inputs", md.inputs.into());
        set("outputs", md.outputs.into());
        set("meta", meta_object(&md.meta));
        set("active", md.active.iter().map(widget_record).collect());
        set("passive", md.passive.iter().map(widget_record).collect());
        set("ins", md.ins.iter().map(port_record).collect());
        set("outs", md.outs.iter().map(port_record).collect());

        for (key, value) in defines {
            values.insert(key.into(), parse_value_string(value.as_ref()));
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Functions exposed to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callable {
    /// Encode the argument as a C string literal.
    CStr,
    /// Mangle the argument into a C identifier.
    CId,
    /// Abort rendering with [`RenderError::Failure`].
    Fail,
}

impl Callable {
    pub const ALL: [Callable; 3] = [Callable::CStr, Callable::CId, Callable::Fail];

    pub fn name(self) -> &'static str {
        match self {
            Self::CStr => "cstr",
            Self::CId => "cid",
            Self::Fail => "fail",
        }
    }

    /// Apply the callable to its arguments.
    ///
    /// Only the first argument is considered;
    ///   a missing argument is the empty string and a non-string argument
    ///   is first converted to its JSON text.
    pub fn call(self, args: &[Value]) -> Result<Value, RenderError> {
        let arg = match args.first() {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        match self {
            Self::CStr => Ok(Value::String(cstr::encode(&arg))),
            Self::CId => Ok(Value::String(mangle(&arg))),
            Self::Fail if arg.is_empty() => {
                Err(RenderError::Failure(DEFAULT_FAILURE_MESSAGE.into()))
            }
            Self::Fail => Err(RenderError::Failure(arg)),
        }
    }
}

impl Display for Callable {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.name())
    }
}

/// Interpret user-provided text as an integer,
///   else a float,
///   else a string.
///
/// Floats that JSON cannot represent (infinities and NaN) remain strings.
///
/// ```
/// use faustpp::render::parse_value_string;
/// use serde_json::json;
///
/// assert_eq!(parse_value_string("42"), json!(42));
/// assert_eq!(parse_value_string("0.5"), json!(0.5));
/// assert_eq!(parse_value_string("hello"), json!("hello"));
/// ```
pub fn parse_value_string(text: &str) -> Value {
    let trimmed = text.trim();

    if let Ok(int) = trimmed.parse::<i64>() {
        return int.into();
    }

    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.into()))
}

fn number(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn meta_object(meta: &[(String, String)]) -> Value {
    Value::Object(
        meta.iter()
            .map(|(key, value)| (key.clone(), parse_value_string(value)))
            .collect(),
    )
}

fn widget_record(w: &Widget) -> Value {
    let mut rec = Map::new();

    rec.insert("type".into(), w.kind_name.as_str().into());
    rec.insert("id".into(), w.id.into());
    rec.insert("label".into(), w.label.as_str().into());
    rec.insert("var".into(), w.var.as_str().into());
    rec.insert("init".into(), number(w.range.init));
    rec.insert("min".into(), number(w.range.min));
    rec.insert("max".into(), number(w.range.max));
    rec.insert("step".into(), number(w.range.step));
    rec.insert("unit".into(), w.unit.as_str().into());
    rec.insert("scale".into(), w.scale_name.as_str().into());
    rec.insert("tooltip".into(), w.tooltip.as_str().into());
    rec.insert("meta".into(), meta_object(&w.meta));

    Value::Object(rec)
}

fn port_record(port: &Port) -> Value {
    let mut rec = Map::new();

    rec.insert("name".into(), port.name.as_str().into());
    rec.insert("meta".into(), meta_object(&port.meta));

    Value::Object(rec)
}

/// Produces output text from a [`Context`].
pub trait Renderer {
    fn render<W: Write>(&self, ctx: &Context, out: &mut W) -> Result<(), RenderError>;
}

/// Renders a Jinja template file.
///
/// Templates included or extended by the file are looked up in its
///   directory.
/// As with Jinja,
///   a single trailing newline of the template is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRenderer {
    path: PathBuf,
}

impl TemplateRenderer {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn environment(&self) -> Environment<'static> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new(""));

        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir));

        for callable in Callable::ALL {
            env.add_function(callable.name(), move |args: Rest<minijinja::Value>| {
                bind_call(callable, &args)
            });
        }

        env
    }
}

/// Invoke `callable` on template values.
fn bind_call(
    callable: Callable,
    args: &[minijinja::Value],
) -> Result<minijinja::Value, minijinja::Error> {
    let args = args
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string())
        })?;

    callable
        .call(&args)
        .map(|value| minijinja::Value::from_serialize(&value))
        .map_err(|e| {
            minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string())
                .with_source(e)
        })
}

impl Renderer for TemplateRenderer {
    fn render<W: Write>(&self, ctx: &Context, out: &mut W) -> Result<(), RenderError> {
        let name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| RenderError::InvalidTemplatePath(self.path.clone()))?;

        let env = self.environment();
        let text = env.get_template(name)?.render(ctx.values())?;

        out.write_all(text.as_bytes())?;

        Ok(())
    }
}

/// Writes the context values as a pretty-printed JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render<W: Write>(&self, ctx: &Context, out: &mut W) -> Result<(), RenderError> {
        serde_json::to_writer_pretty(&mut *out, ctx.values())?;
        writeln!(out)?;

        Ok(())
    }
}

/// Error while rendering.
#[derive(Debug)]
pub enum RenderError {
    /// Rendering was aborted by [`Callable::Fail`].
    Failure(String),
    /// The template path does not name a file.
    InvalidTemplatePath(PathBuf),
    Template(minijinja::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl From<minijinja::Error> for RenderError {
    /// A failure requested by the template is reported as such,
    ///   however deeply the engine has wrapped it.
    fn from(e: minijinja::Error) -> Self {
        let mut source = std::error::Error::source(&e);

        while let Some(inner) = source {
            if let Some(Self::Failure(msg)) = inner.downcast_ref::<Self>() {
                return Self::Failure(msg.clone());
            }

            source = inner.source();
        }

        Self::Template(e)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Display for RenderError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Failure(msg) => write!(fmt, "render failure: {msg}"),
            Self::InvalidTemplatePath(path) => {
                write!(fmt, "invalid template path `{}`", path.display())
            }
            Self::Template(e) => write!(fmt, "template error: {e}"),
            Self::Json(e) => Display::fmt(e, fmt),
            Self::Io(e) => Display::fmt(e, fmt),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Template(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test;
