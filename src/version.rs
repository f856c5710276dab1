// Compiler version triples
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

//! Compiler version triples and the minimum-version gate.
//!
//! The compiler reports its version as free-form text
//!   (e.g. `FAUST Version 2.54.9`);
//!     the first `major.minor.patch` group found in that text is taken to
//!     be the version.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;

/// Oldest compiler able to produce the output we rely upon.
pub const MIN_FAUST_VERSION: Version = Version::new(0, 9, 85);

lazy_static! {
    static ref RE_VERSION: Regex =
        Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("valid version pattern");
}

/// A `major.minor.patch` version.
///
/// Ordering is lexicographic over the three components,
///   which falls out of field declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Locate the first version triple within free-form text.
    pub fn find_in(text: &str) -> Result<Self, VersionError> {
        let unrecognized = || VersionError::Unrecognized(text.trim().into());

        let caps = RE_VERSION.captures(text).ok_or_else(unrecognized)?;
        let part = |i: usize| caps[i].parse::<u32>().map_err(|_| unrecognized());

        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }

    /// Fail unless this version is at least `required`.
    pub fn ensure_at_least(self, required: Version) -> Result<(), VersionError> {
        if self < required {
            return Err(VersionError::TooOld {
                found: self,
                required,
            });
        }

        Ok(())
    }
}

impl Display for Version {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The compiler version is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Version text contained no `major.minor.patch` group
    ///   (or its components do not fit in 32 bits).
    Unrecognized(String),
    /// The compiler is older than we support.
    TooOld { found: Version, required: Version },
}

impl Display for VersionError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Unrecognized(text) => {
                write!(fmt, "cannot extract the compiler version from `{text}`")
            }
            Self::TooOld { found, required } => write!(
                fmt,
                "the Faust version {found} is too old, \
                   the requirement is {required}"
            ),
        }
    }
}

impl std::error::Error for VersionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
