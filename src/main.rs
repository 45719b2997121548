use std::{
    fs, io,
    path::{Path, PathBuf},
    process,
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use tracing_subscriber::EnvFilter;

use loxwalk::{run_file, run_prompt, Lox};

/// Tree-walking interpreter for a small Lox-like scripting language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run. Starts an interactive prompt when omitted.
    script: Option<PathBuf>,

    /// Print the parsed syntax tree of the script instead of running it.
    #[arg(long, requires = "script")]
    ast: bool,
}

fn main() -> Result<()> {
    install_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            process::exit(usage_exit_code(err.kind()));
        }
    };

    let Some(script) = args.script else {
        run_prompt().context("prompt failed")?;
        return Ok(());
    };

    let status = if args.ast {
        match fs::read_to_string(&script) {
            Ok(source) => Lox::new().print_ast(&source),
            Err(err) => exit_unreadable(&script, err),
        }
    } else {
        match run_file(&script, None) {
            Ok(status) => status,
            Err(err) => exit_unreadable(&script, err),
        }
    };

    process::exit(status.exit_code())
}

/// Help and version requests succeed; any other argument error is a usage
/// error (64).
fn usage_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 64,
    }
}

fn exit_unreadable(script: &Path, err: io::Error) -> ! {
    eprintln!("Could not read '{}': {err}", script.display());
    process::exit(74)
}

fn install_tracing() {
    // logs go to stderr so they never interleave with program output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit_code_for(argv: &[&str]) -> i32 {
        match Args::try_parse_from(argv) {
            Ok(_) => 0,
            Err(err) => usage_exit_code(err.kind()),
        }
    }

    #[test]
    fn extra_arguments_are_a_usage_error() {
        assert_eq!(exit_code_for(&["loxwalk", "a.lox", "b.lox"]), 64);
        assert_eq!(exit_code_for(&["loxwalk", "--bogus"]), 64);
        // --ast needs a script to print
        assert_eq!(exit_code_for(&["loxwalk", "--ast"]), 64);
    }

    #[test]
    fn help_and_version_exit_cleanly() {
        assert_eq!(exit_code_for(&["loxwalk", "--help"]), 0);
        assert_eq!(exit_code_for(&["loxwalk", "--version"]), 0);
    }

    #[test]
    fn accepted_command_lines() {
        assert_eq!(exit_code_for(&["loxwalk"]), 0);
        assert_eq!(exit_code_for(&["loxwalk", "script.lox", "--ast"]), 0);
    }
}
