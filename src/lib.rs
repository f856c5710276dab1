// Post-processor for the Faust compiler
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

//! A post-processor for the Faust compiler.
//!
//! The Faust compiler emits a C++ class together with an XML description
//!   of its controls.
//! This crate repairs known defects in that output,
//!   describes the DSP unit as [`metadata::Metadata`],
//!   and extracts the class body in a form that can be embedded into
//!     other source files.
//!
//! The stages of a run are found in [`pipeline`];
//!   output is produced through [`render`].

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod cstr;
pub mod faust;
pub mod ident;
pub mod metadata;
pub mod num;
pub mod patch;
pub mod pipeline;
pub mod render;
pub mod segment;
pub mod version;
pub mod widget;
pub mod xml;
