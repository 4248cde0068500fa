use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
    num::NonZeroUsize,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use plasma::{Diagnostic, Options};
use tracing::{info, level_filters::LevelFilter};

/// Compiles Plasma programs into Python.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The Plasma source file.
    input: PathBuf,

    /// Where to write the result. Defaults to the input path with a `.py`
    /// extension, or to the standard output for `--emit-*`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Spaces per indentation level of the generated Python.
    #[arg(long, default_value = "4")]
    indent_width: NonZeroUsize,

    /// Call `main` from an `if __name__ == "__main__":` guard.
    #[arg(long)]
    entry_point: bool,

    /// Only report diagnostics, without writing anything.
    #[arg(long)]
    check: bool,

    /// Print the tokens instead of compiling.
    #[arg(long, conflicts_with = "emit_ast")]
    emit_tokens: bool,

    /// Print the typed tree instead of compiling.
    #[arg(long)]
    emit_ast: bool,

    /// Increases the log verbosity. May be repeated.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            indent_width: self.indent_width,
            entry_point: self.entry_point,
        }
    }

    fn emits(&self) -> bool {
        self.emit_tokens || self.emit_ast
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("plasmac: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Returns whether the source compiled without diagnostics.
fn run(cli: &Cli) -> Result<bool> {
    let destination = if cli.check { None } else { destination(cli)? };
    let src = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    info!(path = %cli.input.display(), bytes = src.len(), "read source");

    let result = if cli.emit_tokens {
        plasma::tokenize(&src).map(|tokens| {
            tokens.iter().fold(String::new(), |mut out, token| {
                _ = writeln!(out, "{token:?}");
                out
            })
        })
    } else if cli.emit_ast {
        plasma::print_tree(&src)
    } else {
        plasma::compile(&src, &cli.options())
    };

    let text = match result {
        Ok(text) => text,
        Err(diagnostics) => {
            report(&cli.input, &diagnostics);
            return Ok(false);
        }
    };

    if cli.check {
        return Ok(true);
    }
    match destination {
        Some(path) => write_output(&path, &text)?,
        None => io::stdout()
            .write_all(text.as_bytes())
            .context("failed to write to the standard output")?,
    }
    Ok(true)
}

/// Where the result goes, or `None` for the standard output. The input file
/// is never a destination.
fn destination(cli: &Cli) -> Result<Option<PathBuf>> {
    let path = match (&cli.output, cli.emits()) {
        (Some(path), _) => path.clone(),
        (None, true) => return Ok(None),
        (None, false) => cli.input.with_extension("py"),
    };
    if path == cli.input {
        bail!("refusing to overwrite the input file {}", path.display());
    }
    Ok(Some(path))
}

fn report(path: &Path, diagnostics: &[Diagnostic]) {
    info!(count = diagnostics.len(), "compilation failed");
    for diagnostic in diagnostics {
        eprintln!("{}:{diagnostic}", path.display());
    }
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("plasmac").chain(args.iter().copied()))
    }

    #[test]
    fn test_indent_width_must_be_positive() {
        assert!(parse(&["prog.pls", "--indent-width", "0"]).is_err());
        let cli = parse(&["prog.pls", "--indent-width", "2"]).unwrap();
        assert_eq!(cli.options().indent_width.get(), 2);
        assert_eq!(parse(&["prog.pls"]).unwrap().options(), Options::default());
    }

    #[test]
    fn test_emit_flags_conflict() {
        assert!(parse(&["prog.pls", "--emit-tokens", "--emit-ast"]).is_err());
    }

    #[test]
    fn test_destination() {
        let cli = parse(&["dir/prog.pls"]).unwrap();
        assert_eq!(destination(&cli).unwrap(), Some(PathBuf::from("dir/prog.py")));

        let cli = parse(&["prog.pls", "--emit-ast"]).unwrap();
        assert_eq!(destination(&cli).unwrap(), None);

        let cli = parse(&["prog.pls", "--emit-ast", "-o", "tree.txt"]).unwrap();
        assert_eq!(destination(&cli).unwrap(), Some(PathBuf::from("tree.txt")));
    }

    #[test]
    fn test_input_is_never_overwritten() {
        let cli = parse(&["prog.py"]).unwrap();
        assert!(destination(&cli).is_err());

        let cli = parse(&["prog.pls", "-o", "prog.pls"]).unwrap();
        assert!(destination(&cli).is_err());
    }
}
