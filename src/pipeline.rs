// Post-processing pipeline
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

//! A complete post-processing run.
//!
//! [`run`] connects the stages in series:
//!
//!   1. The compiler version is checked against
//!        [`MIN_FAUST_VERSION`].
//!   2. The DSP file is compiled with the architecture of
//!        [`faust::ARCHITECTURE`].
//!   3. Compiler defects are repaired by [`patch::apply_workarounds`].
//!   4. [`Metadata`] is assembled from the repaired output.
//!   5. The DSP file name and process name are recorded,
//!        labeling channels.
//!
//! Any failure aborts the run;
//!   no partial [`Metadata`] is ever produced.

use crate::faust::{self, Compiler, FaustError};
use crate::metadata::{Metadata, MetadataError, DEFAULT_PROCESS_NAME};
use crate::patch::{self, PatchError};
use crate::version::MIN_FAUST_VERSION;
use std::ffi::OsString;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::info;

/// Inputs to a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// DSP source file.
    pub dsp: PathBuf,
    /// Additional compiler arguments,
    ///   passed before those added by the run itself.
    pub faust_args: Vec<String>,
    /// Name of the process to compile,
    ///   if not the compiler's default.
    pub process_name: Option<String>,
}

impl Options {
    pub fn new<P: Into<PathBuf>>(dsp: P) -> Self {
        Self {
            dsp: dsp.into(),
            ..Default::default()
        }
    }

    /// Compiler arguments for this run,
    ///   excluding the architecture file.
    fn compiler_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            self.faust_args.iter().map(OsString::from).collect();

        if let Some(name) = &self.process_name {
            args.push("-pn".into());
            args.push(name.into());
        }

        args
    }
}

/// Compile `opts.dsp` and describe the result.
pub fn run(compiler: &Compiler, opts: &Options) -> Result<Metadata, PipelineError> {
    let version = compiler.ensure_version(MIN_FAUST_VERSION)?;
    info!(%version, dsp = %opts.dsp.display(), "post-processing");

    let arch = faust::write_architecture()?;

    let mut args = opts.compiler_args();
    args.push("-a".into());
    args.push(arch.path().into());

    let generated = compiler.invoke(&opts.dsp, &args)?;

    // The architecture file is no longer needed once compiled.
    drop(arch);

    let patched = patch::apply_workarounds(&generated.source, generated.doc)?;
    let md = Metadata::extract(&patched.doc, &patched.source)?;

    let file_name = opts
        .dsp
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let process_name = opts
        .process_name
        .clone()
        .unwrap_or_else(|| DEFAULT_PROCESS_NAME.into());

    Ok(md.with_origin(file_name, process_name))
}

/// Error from any stage of [`run`].
#[derive(Debug)]
pub enum PipelineError {
    Faust(FaustError),
    Patch(PatchError),
    Metadata(MetadataError),
}

impl From<FaustError> for PipelineError {
    fn from(e: FaustError) -> Self {
        Self::Faust(e)
    }
}

impl From<PatchError> for PipelineError {
    fn from(e: PatchError) -> Self {
        Self::Patch(e)
    }
}

impl From<MetadataError> for PipelineError {
    fn from(e: MetadataError) -> Self {
        Self::Metadata(e)
    }
}

impl Display for PipelineError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Faust(e) => Display::fmt(e, fmt),
            Self::Patch(e) => Display::fmt(e, fmt),
            Self::Metadata(e) => Display::fmt(e, fmt),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Faust(e) => Some(e),
            Self::Patch(e) => Some(e),
            Self::Metadata(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compiler_args_without_process_name() {
        let opts = Options {
            faust_args: vec!["-double".into(), "-vec".into()],
            ..Options::new("tone.dsp")
        };

        assert_eq!(
            opts.compiler_args(),
            vec![OsString::from("-double"), OsString::from("-vec")]
        );
    }

    #[test]
    fn compiler_args_with_process_name() {
        let opts = Options {
            faust_args: vec!["-double".into()],
            process_name: Some("effect".into()),
            ..Options::new("tone.dsp")
        };

        assert_eq!(
            opts.compiler_args(),
            vec![
                OsString::from("-double"),
                OsString::from("-pn"),
                OsString::from("effect"),
            ]
        );
    }
}
