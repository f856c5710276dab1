// Immutable XML document tree
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

//! XML documents produced by the compiler's `-xml` option.
//!
//! The document is read in full using [`quick_xml`] into a small tree of
//!   [`Element`]s and text [`Node`]s.
//! This is not a general-purpose DOM:
//!   namespaces,
//!   comments,
//!   and processing instructions are discarded,
//!     since the compiler's UI description uses none of them.
//!
//! Documents are never mutated through shared references.
//! Changes are described as a [`Diff`] and applied by consuming the
//!   document with [`Document::apply`],
//!     which yields the updated document.
//! A [`NodePath`] obtained from [`Document::select_indexed`] identifies
//!   the element to which new children are appended.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Display;

/// Thin wrapper around [`quick_xml::Error`] to implement [`PartialEq`].
///
/// This will always yield `false`,
///   but allows us to derive the trait on types using [`Error`].
#[derive(Debug)]
pub struct QuickXmlError(pub quick_xml::Error);

impl PartialEq for QuickXmlError {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

/// Error while reading a document.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// The document is not well-formed.
    Xml(QuickXmlError),
    /// The document contains no element.
    NoRoot,
    /// A second top-level element follows the root.
    ExtraRoot(String),
    /// End of input was reached with the given element still open.
    Unclosed(String),
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(QuickXmlError(e))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(QuickXmlError(e.into()))
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Xml(QuickXmlError(e)) => write!(fmt, "malformed XML: {e}"),
            Self::NoRoot => write!(fmt, "XML document has no root element"),
            Self::ExtraRoot(name) => {
                write!(fmt, "unexpected second root element `{name}`")
            }
            Self::Unclosed(name) => {
                write!(fmt, "unexpected end of XML inside `{name}`")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(QuickXmlError(e)) => Some(e),
            _ => None,
        }
    }
}

/// Child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data,
    ///   already unescaped.
    Text(String),
}

/// An element and everything beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute,
    ///   replacing any existing attribute of the same name.
    pub fn with_attr<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();

        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key, value)),
        }

        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in document order,
    ///   skipping text.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(ele) => Some(ele),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.children().filter(move |ele| ele.name == name)
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|ele| ele.name == name)
    }

    /// Concatenation of this element's own text nodes.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Text of the first child named `name`,
    ///   or [`None`] if there is no such child or it has no text.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(Element::text)
            .filter(|text| !text.is_empty())
    }

    /// All elements reached by following a `/`-separated path of child
    ///   names,
    ///     in document order.
    ///
    /// Every matching child is followed at each step,
    ///   so `ui/activewidgets/widget` yields the widgets of every
    ///   `activewidgets` of every `ui`.
    pub fn select<'a>(&'a self, path: &str) -> Vec<&'a Element> {
        self.select_indexed(path)
            .into_iter()
            .map(|(_, ele)| ele)
            .collect()
    }

    fn select_indexed<'a>(&'a self, path: &str) -> Vec<(NodePath, &'a Element)> {
        let mut found = vec![(NodePath::default(), self)];

        for step in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            found = found
                .into_iter()
                .flat_map(|(at, ele)| {
                    ele.children.iter().enumerate().filter_map(
                        move |(i, node)| match node {
                            Node::Element(child) if child.name == step => {
                                Some((at.child(i), child))
                            }
                            _ => None,
                        },
                    )
                })
                .collect();
        }

        found
    }

    fn descendant_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        path.0.iter().try_fold(self, |ele, &i| match ele.children.get_mut(i) {
            Some(Node::Element(child)) => Some(child),
            _ => None,
        })
    }

    fn from_start(start: &BytesStart) -> Result<Self, Error> {
        let mut ele = Self::new(String::from_utf8_lossy(start.name().as_ref()));

        for attr in start.attributes() {
            let attr = attr?;
            ele.attrs.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                attr.unescape_value()?.into_owned(),
            ));
        }

        Ok(ele)
    }
}

/// Location of an element as child indices from the root element.
///
/// The empty path denotes the root itself.
/// Paths are only meaningful for the document that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

/// Elements to be appended to existing elements of a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    appends: Vec<(NodePath, Element)>,
}

impl Diff {
    /// Append `child` as the last child of the element at `parent`.
    ///
    /// Appends to the same parent retain the order of this call.
    pub fn append(&mut self, parent: NodePath, child: Element) {
        self.appends.push((parent, child));
    }

    pub fn len(&self) -> usize {
        self.appends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appends.is_empty()
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Read a complete document from text.
    pub fn parse(src: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(src);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        let mut close = |ele: Element, stack: &mut Vec<Element>| match stack
            .last_mut()
        {
            Some(parent) => {
                parent.children.push(Node::Element(ele));
                Ok(())
            }
            None if root.is_some() => Err(Error::ExtraRoot(ele.name)),
            None => {
                root = Some(ele);
                Ok(())
            }
        };

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    close(Element::from_start(&start)?, &mut stack)?
                }
                // The reader verifies that end names match.
                Event::End(_) => match stack.pop() {
                    Some(ele) => close(ele, &mut stack)?,
                    None => return Err(Error::NoRoot),
                },
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(Node::Text(text.unescape()?.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(
                            String::from_utf8_lossy(&data.into_inner())
                                .into_owned(),
                        ));
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if let Some(open) = stack.pop() {
            return Err(Error::Unclosed(open.name));
        }

        root.map(Self::new).ok_or(Error::NoRoot)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Like [`Element::select`] from the root,
    ///   but also yielding the [`NodePath`] of each element.
    pub fn select_indexed(&self, path: &str) -> Vec<(NodePath, &Element)> {
        self.root.select_indexed(path)
    }

    /// Consume the document and produce a new one with `diff` applied.
    ///
    /// Paths are resolved against the original document;
    ///   appending never shifts the index of an existing child,
    ///     so the order in which appends are applied does not affect
    ///     resolution.
    /// A path that does not resolve to an element is ignored,
    ///   which can happen only if it came from a different document.
    pub fn apply(mut self, diff: Diff) -> Self {
        for (path, child) in diff.appends {
            if let Some(parent) = self.root.descendant_mut(&path) {
                parent.children.push(Node::Element(child));
            }
        }

        self
    }
}

#[cfg(test)]
mod test;
