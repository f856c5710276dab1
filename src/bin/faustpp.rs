// Faust post-processor
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

//! This is the Faust post-processor.
//!
//! `faustpp` compiles a DSP file with the Faust compiler and renders a
//!   description of the result,
//!     including the class body ready for embedding.
//! Output is rendered through the Jinja template given by `-a`,
//!   or written as JSON without one.
//! The compiler is taken from `--faust`,
//!   else the `FAUST` environment variable,
//!   else `faust` on the `PATH`.

extern crate faustpp;

use faustpp::{
    faust::{Compiler, FaustCommand},
    pipeline::{self, Options as RunOptions, PipelineError},
    render::{Context, JsonRenderer, RenderError, Renderer, TemplateRenderer},
};
use getopts::{Fail, Options};
use std::{
    env,
    error::Error,
    fmt::{self, Display},
    fs,
    io::{self, Write},
};
use tracing::Level;

/// Types of commands
#[derive(Debug)]
enum Command {
    Process(Config),
    Usage,
}

/// Everything needed to process a DSP file.
#[derive(Debug, Default, PartialEq)]
struct Config {
    run: RunOptions,
    template: Option<String>,
    output: Option<String>,
    defines: Vec<(String, String)>,
    faust: Option<String>,
    verbose: bool,
}

/// Entrypoint for the post-processor
pub fn main() {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = get_opts();
    let usage = opts.usage(&format!("Usage: {} [OPTIONS] DSPFILE", program));

    match parse_options(opts, args) {
        Ok(Command::Process(config)) => {
            init_logging(config.verbose);

            if let Err(e) = process(&config) {
                eprintln!("fatal: {e}");
                std::process::exit(1);
            }
        }
        Ok(Command::Usage) => {
            println!("{}", usage);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("{}", usage);
            std::process::exit(exitcode::USAGE);
        }
    }
}

/// Log to stderr so that output on stdout is never interleaved with
///   diagnostics.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Run the pipeline and write the rendered result.
///
/// Rendering completes into memory before anything is written,
///   so a failed run never leaves partial output behind.
fn process(config: &Config) -> Result<(), FaustppError> {
    let cmd = match &config.faust {
        Some(cmd) => FaustCommand::new(cmd),
        None => FaustCommand::from_env(),
    };

    let md = pipeline::run(&Compiler::new(cmd), &config.run)?;
    let ctx = Context::new(&md, config.defines.iter().cloned());

    let mut buf = Vec::new();

    match &config.template {
        Some(path) => TemplateRenderer::new(path).render(&ctx, &mut buf)?,
        None => JsonRenderer.render(&ctx, &mut buf)?,
    }

    match &config.output {
        Some(path) => fs::write(path, &buf)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&buf)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Get 'Options'
fn get_opts() -> Options {
    let mut opts = Options::new();
    opts.optopt("a", "template", "render through a template file", "FILE");
    opts.optopt("o", "output", "set output file name", "FILE");
    opts.optmulti("D", "define", "define a render value", "NAME=VALUE");
    opts.optmulti("X", "faust-arg", "pass an argument to Faust", "ARG");
    opts.optopt("", "process-name", "name of the process to compile", "NAME");
    opts.optopt("", "faust", "Faust compiler command", "CMD");
    opts.optflag("v", "verbose", "log progress to stderr");
    opts.optflag("h", "help", "print this help menu");

    opts
}

/// Option parser
fn parse_options(opts: Options, args: Vec<String>) -> Result<Command, Fail> {
    let matches = opts.parse(&args[1..])?;

    if matches.opt_present("h") {
        return Ok(Command::Usage);
    }

    let dsp = match matches.free.len() {
        0 => return Err(Fail::OptionMissing(String::from("DSPFILE"))),
        1 => matches.free[0].clone(),
        _ => return Err(Fail::UnrecognizedOption(matches.free[1].clone())),
    };

    let defines = matches
        .opt_strs("D")
        .into_iter()
        .map(|def| match def.split_once('=') {
            Some((name, value)) => Ok((name.to_string(), value.to_string())),
            None => Err(Fail::ArgumentMissing(format!("-D {def}=VALUE"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Command::Process(Config {
        run: RunOptions {
            dsp: dsp.into(),
            faust_args: matches.opt_strs("X"),
            process_name: matches.opt_str("process-name"),
        },
        template: matches.opt_str("a"),
        output: matches.opt_str("o"),
        defines,
        faust: matches.opt_str("faust"),
        verbose: matches.opt_present("v"),
    }))
}

/// Post-processor (`faustpp`) error.
///
/// This represents the aggregation of all possible errors that can occur
///   during a run.
#[derive(Debug)]
pub enum FaustppError {
    Pipeline(PipelineError),
    Render(RenderError),
    Io(io::Error),
}

impl From<PipelineError> for FaustppError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl From<RenderError> for FaustppError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<io::Error> for FaustppError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl Display for FaustppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(e) => Display::fmt(e, f),
            Self::Render(e) => Display::fmt(e, f),
            Self::Io(e) => Display::fmt(e, f),
        }
    }
}

impl Error for FaustppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pipeline(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, Fail> {
        let args = std::iter::once("program")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();

        parse_options(get_opts(), args)
    }

    fn config(args: &[&str]) -> Config {
        match parse(args) {
            Ok(Command::Process(config)) => config,
            other => panic!("expected a processing command, got {other:?}"),
        }
    }

    #[test]
    fn parse_options_help() {
        match parse(&["-h"]) {
            Ok(Command::Usage) => {}
            _ => panic!("Help option did not parse"),
        }
    }

    #[test]
    fn parse_options_help_long() {
        match parse(&["--help"]) {
            Ok(Command::Usage) => {}
            _ => panic!("Long help option did not parse"),
        }
    }

    #[test]
    fn parse_options_invalid() {
        match parse(&["-q"]) {
            Err(Fail::UnrecognizedOption(_)) => {}
            _ => panic!("Invalid option not caught"),
        }
    }

    #[test]
    fn parse_options_missing_input() {
        match parse(&[]) {
            Err(Fail::OptionMissing(message)) => {
                assert_eq!("DSPFILE", message);
            }
            _ => panic!("Missing input not caught"),
        }
    }

    #[test]
    fn parse_options_too_many_args() {
        match parse(&["foo.dsp", "bar.dsp"]) {
            Err(Fail::UnrecognizedOption(message)) => {
                assert_eq!("bar.dsp", message);
            }
            _ => panic!("Extra argument not caught"),
        }
    }

    #[test]
    fn parse_options_defaults() {
        assert_eq!(
            config(&["tone.dsp"]),
            Config {
                run: RunOptions::new("tone.dsp"),
                ..Default::default()
            }
        );
    }

    #[test]
    fn parse_options_all() {
        assert_eq!(
            config(&[
                "-a",
                "lv2.cpp",
                "-o",
                "out.json",
                "-D",
                "rate=48000",
                "--define",
                "expr=a=b",
                "-X",
                "-double",
                "--faust-arg=-vec",
                "--process-name",
                "effect",
                "--faust",
                "/opt/faust",
                "-v",
                "tone.dsp",
            ]),
            Config {
                run: RunOptions {
                    dsp: "tone.dsp".into(),
                    faust_args: vec!["-double".into(), "-vec".into()],
                    process_name: Some("effect".into()),
                },
                template: Some("lv2.cpp".into()),
                output: Some("out.json".into()),
                defines: vec![
                    ("rate".into(), "48000".into()),
                    ("expr".into(), "a=b".into()),
                ],
                faust: Some("/opt/faust".into()),
                verbose: true,
            }
        );
    }

    #[test]
    fn parse_options_template_long() {
        assert_eq!(
            config(&["--template=tmpl/out.hpp", "tone.dsp"]).template,
            Some("tmpl/out.hpp".into())
        );
    }

    #[test]
    fn parse_options_empty_define_value() {
        assert_eq!(
            config(&["-D", "flag=", "tone.dsp"]).defines,
            vec![("flag".to_string(), String::new())]
        );
    }

    #[test]
    fn parse_options_malformed_define() {
        match parse(&["-D", "rate", "tone.dsp"]) {
            Err(Fail::ArgumentMissing(message)) => {
                assert_eq!("-D rate=VALUE", message);
            }
            _ => panic!("Malformed definition not caught"),
        }
    }
}
