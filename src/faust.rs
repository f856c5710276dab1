// Faust compiler invocation
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

//! Running the Faust compiler.
//!
//! The compiler command is configuration:
//!   a [`FaustCommand`] is resolved once by the caller
//!     (see [`FaustCommand::from_env`])
//!   and handed to [`Compiler::new`].
//!
//! Each [`Compiler::invoke`] works within its own temporary directory,
//!   which is removed once the compiler's output has been read,
//!     so that concurrent invocations never share files.

use crate::version::{Version, VersionError};
use crate::xml::{self, Document};
use std::ffi::{OsStr, OsString};
use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

/// Environment variable naming the compiler command.
pub const FAUST_ENV: &str = "FAUST";

/// Compiler command used when [`FAUST_ENV`] is not set.
pub const DEFAULT_FAUST_COMMAND: &str = "faust";

/// Architecture file that brackets the generated class with the sentinels
///   expected by [`crate::segment`].
pub const ARCHITECTURE: &str = "\
<<<<BeginFaustClass>>>>
<<includeIntrinsic>>
<<includeclass>>
<<<<EndFaustClass>>>>
";

/// Program used to run the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaustCommand(OsString);

impl FaustCommand {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self(program.into())
    }

    /// Command named by [`FAUST_ENV`],
    ///   falling back to [`DEFAULT_FAUST_COMMAND`] if unset or empty.
    pub fn from_env() -> Self {
        Self::from_var(std::env::var_os(FAUST_ENV))
    }

    fn from_var(var: Option<OsString>) -> Self {
        var.filter(|cmd| !cmd.is_empty())
            .map(Self)
            .unwrap_or_default()
    }

    pub fn program(&self) -> &OsStr {
        &self.0
    }
}

impl Default for FaustCommand {
    fn default() -> Self {
        Self::new(DEFAULT_FAUST_COMMAND)
    }
}

impl Display for FaustCommand {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.0.to_string_lossy())
    }
}

/// Raw output of a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Generated C++ source.
    pub source: String,
    /// XML description of the DSP unit.
    pub doc: Document,
}

/// Handle to the Faust compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    cmd: FaustCommand,
}

impl Compiler {
    pub fn new(cmd: FaustCommand) -> Self {
        Self { cmd }
    }

    pub fn command(&self) -> &FaustCommand {
        &self.cmd
    }

    /// Version reported by `--version`.
    pub fn version(&self) -> Result<Version, FaustError> {
        debug!(command = %self.cmd, "querying Faust version");

        let output = Command::new(self.cmd.program())
            .arg("--version")
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| FaustError::Spawn(self.cmd.to_string(), e))?;

        if !output.status.success() {
            return Err(FaustError::Status(output.status));
        }

        let version = Version::find_in(&String::from_utf8_lossy(&output.stdout))?;

        debug!(%version, "found Faust");
        Ok(version)
    }

    /// Fail unless the compiler is at least version `required`.
    pub fn ensure_version(&self, required: Version) -> Result<Version, FaustError> {
        let version = self.version()?;
        version.ensure_at_least(required)?;

        Ok(version)
    }

    /// Compile `dsp` to C++ and its XML description.
    ///
    /// The compiler is run as
    ///   `<cmd> -O <dir> -o <name>.cpp -xml <dsp> <args...>`,
    ///     where `<name>` is the file name of `dsp` and `<dir>` is a fresh
    ///     temporary directory.
    /// The XML is expected beside the source as `<name>.xml`.
    pub fn invoke<S: AsRef<OsStr>>(
        &self,
        dsp: &Path,
        args: &[S],
    ) -> Result<Generated, FaustError> {
        let name = dsp
            .file_name()
            .ok_or_else(|| FaustError::InvalidPath(dsp.into()))?;

        let workdir = TempDir::new().map_err(FaustError::TempDir)?;

        let mut cpp_name = name.to_os_string();
        cpp_name.push(".cpp");
        let mut xml_name = name.to_os_string();
        xml_name.push(".xml");

        let mut cmd = Command::new(self.cmd.program());
        cmd.arg("-O")
            .arg(workdir.path())
            .arg("-o")
            .arg(&cpp_name)
            .arg("-xml")
            .arg(dsp)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(io::stderr()));

        debug!(command = ?cmd, "running Faust");

        let status = cmd
            .status()
            .map_err(|e| FaustError::Spawn(self.cmd.to_string(), e))?;

        if !status.success() {
            return Err(FaustError::Status(status));
        }

        let source = read(workdir.path().join(cpp_name))?;
        let doc = Document::parse(&read(workdir.path().join(xml_name))?)?;

        Ok(Generated { source, doc })
    }
}

fn read(path: PathBuf) -> Result<String, FaustError> {
    fs::read_to_string(&path).map_err(|e| FaustError::Io(path, e))
}

/// Write [`ARCHITECTURE`] to a temporary file for use with `-a`.
///
/// The file is removed when the returned handle is dropped.
pub fn write_architecture() -> Result<NamedTempFile, FaustError> {
    let mut file = tempfile::Builder::new()
        .prefix("faustpp-arch")
        .suffix(".cpp")
        .tempfile()
        .map_err(FaustError::TempDir)?;

    let written = file.write_all(ARCHITECTURE.as_bytes()).and_then(|()| file.flush());
    written.map_err(|e| FaustError::Io(file.path().into(), e))?;

    Ok(file)
}

/// Error while running the compiler.
#[derive(Debug)]
pub enum FaustError {
    /// The compiler could not be started.
    Spawn(String, io::Error),
    /// The compiler exited unsuccessfully.
    Status(ExitStatus),
    Version(VersionError),
    /// The DSP path does not name a file.
    InvalidPath(PathBuf),
    /// Temporary files could not be created.
    TempDir(io::Error),
    /// Compiler output could not be read,
    ///   or its input could not be written.
    Io(PathBuf, io::Error),
    Xml(xml::Error),
}

impl From<VersionError> for FaustError {
    fn from(e: VersionError) -> Self {
        Self::Version(e)
    }
}

impl From<xml::Error> for FaustError {
    fn from(e: xml::Error) -> Self {
        Self::Xml(e)
    }
}

impl Display for FaustError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        use FaustError::*;

        match self {
            Spawn(cmd, e) => write!(fmt, "cannot run `{cmd}`: {e}"),
            Status(status) => write!(fmt, "the Faust command has failed ({status})"),
            Version(e) => Display::fmt(e, fmt),
            InvalidPath(path) => {
                write!(fmt, "`{}` is not a DSP file path", path.display())
            }
            TempDir(e) => write!(fmt, "cannot create temporary file: {e}"),
            Io(path, e) => write!(fmt, "{}: {e}", path.display()),
            Xml(e) => Display::fmt(e, fmt),
        }
    }
}

impl std::error::Error for FaustError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use FaustError::*;

        match self {
            Spawn(_, e) | TempDir(e) | Io(_, e) => Some(e),
            Version(e) => Some(e),
            Xml(e) => Some(e),
            Status(_) | InvalidPath(_) => None,
        }
    }
}
