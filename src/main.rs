// cpprecon: parse a C++ file and write its reconstruction next to it

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cpprecon::parser::ast::ProgramUnit;
use cpprecon::{parse_file, parse_str, BraceStyle, Error, Writer, WriterOptions};

const EXIT_USAGE: u8 = 1;
const EXIT_PARSE: u8 = 2;
const EXIT_IO: u8 = 3;
const EXIT_MISMATCH: u8 = 4;

/// Parse a C++ translation unit and write an equivalent reconstruction
/// to `<file>.reconstructed`
#[derive(Debug, Parser)]
#[command(name = "cpprecon", version)]
struct Cli {
    /// C++ source file
    file: PathBuf,

    /// Verbosity level (-v, -vv, -vvv), logged to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Spaces per indentation level
    #[arg(long, value_name = "N", default_value_t = 2)]
    indent: usize,

    /// Placement of opening braces
    #[arg(long, value_enum, default_value = "next-line")]
    brace_style: BraceArg,

    /// Re-parse the output and check it matches the input structurally
    #[arg(long)]
    verify: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BraceArg {
    SameLine,
    NextLine,
}

impl From<BraceArg> for BraceStyle {
    fn from(arg: BraceArg) -> Self {
        match arg {
            BraceArg::SameLine => BraceStyle::SameLine,
            BraceArg::NextLine => BraceStyle::NextLine,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{}", e);
                return ExitCode::SUCCESS;
            }
            _ => {
                print!("{}", e.render());
                return ExitCode::from(EXIT_USAGE);
            }
        },
    };

    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let options = WriterOptions {
        indent_width: cli.indent,
        brace_style: cli.brace_style.into(),
    };
    run(&cli.file, Writer::new(options), cli.verify)
}

fn run(input: &Path, writer: Writer, verify: bool) -> ExitCode {
    let unit = match parse_file(input) {
        Ok(unit) => unit,
        Err(e) => return report(&e),
    };
    info!(declarations = unit.declarations.len(), "parsed {}", input.display());

    let output = output_path(input);
    if let Err(e) = write_unit(&writer, &unit, &output) {
        return report(&e);
    }
    info!("wrote {}", output.display());

    if verify && !reconstruction_matches(&writer, &unit) {
        println!("Verification failed: {}", output.display());
        return ExitCode::from(EXIT_MISMATCH);
    }
    ExitCode::SUCCESS
}

/// Print the failure on stdout and pick its exit code
fn report(error: &Error) -> ExitCode {
    println!("{}", error);
    match error.parse_error() {
        Some(diagnostic) => {
            println!("{}", diagnostic);
            ExitCode::from(EXIT_PARSE)
        }
        None => {
            if let Error::Io { source, .. } = error {
                debug!("{}", source);
            }
            ExitCode::from(EXIT_IO)
        }
    }
}

/// `<input>.reconstructed`, keeping the input's own extension
fn output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".reconstructed");
    PathBuf::from(name)
}

fn write_unit(writer: &Writer, unit: &ProgramUnit, path: &Path) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut sink = BufWriter::new(file);
    writer.emit(unit, &mut sink).map_err(io_error)?;
    sink.flush().map_err(io_error)
}

fn reconstruction_matches(writer: &Writer, unit: &ProgramUnit) -> bool {
    match parse_str(&writer.render(unit)) {
        Ok(reparsed) if reparsed == *unit => true,
        Ok(_) => {
            warn!("reconstruction parses to a different program unit");
            false
        }
        Err(e) => {
            warn!("reconstruction does not parse: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            output_path(Path::new("src/main.cpp")),
            PathBuf::from("src/main.cpp.reconstructed")
        );
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "cpprecon",
            "-vv",
            "--indent",
            "4",
            "--brace-style",
            "same-line",
            "--verify",
            "a.cpp",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.indent, 4);
        assert!(matches!(cli.brace_style, BraceArg::SameLine));
        assert!(cli.verify);
        assert_eq!(cli.file, PathBuf::from("a.cpp"));
    }

    #[test]
    fn test_missing_file_argument_is_usage_error() {
        let err = Cli::try_parse_from(["cpprecon"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
