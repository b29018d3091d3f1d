//! Definition of the command-line interface and its resolution into a [`TestConfig`].

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use tracing::debug;

use crate::config::{Choice, Compression, ReadBehavior, TestConfig, TestMode, WriteBehavior};
use crate::error::ResolveError;
pub use size::FileSize;

mod size;

const BIN_NAME: &str = "iotest";

#[derive(Parser, Debug)]
#[command(
    name = BIN_NAME,
    version,
    about = "Measure write and read throughput of files in a storage cluster",
    propagate_version = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a set of files into the benchmark directory.
    Write(WriteArgs),
    /// Read back a set of files from the benchmark directory.
    Read(ReadArgs),
    /// Remove the benchmark directory.
    Clean(CleanArgs),
}

// Every option is optional as far as clap is concerned. Presence and values are checked in
// `resolve_*`, in the order the fields are declared.

#[derive(Args, Debug)]
struct WriteArgs {
    /// The number of files to write. Required.
    #[arg(long = "numFiles", value_name = "NUM", allow_hyphen_values = true)]
    num_files: Option<String>,

    /// The size of each file, e.g. `128B`, `64KB`, `1.5MB` or `2GB`. Required.
    #[arg(long = "fileSize", value_name = "SIZE", allow_hyphen_values = true)]
    file_size: Option<String>,

    /// The directory the files are written into. Required.
    #[arg(long = "outputDir", value_name = "DIR")]
    output_dir: Option<String>,

    /// One of MUST_CACHE, CACHE_THROUGH, THROUGH, ASYNC_THROUGH.
    ///
    /// Defaults to MUST_CACHE.
    #[arg(long = "writeBehavior", value_name = "BEHAVIOR")]
    write_behavior: Option<String>,

    /// One of lz4, snappy, gzip, bzip2. Uncompressed if absent.
    #[arg(long, value_name = "CODEC")]
    compression: Option<String>,
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// The number of files to read. Required.
    #[arg(long = "numFiles", value_name = "NUM", allow_hyphen_values = true)]
    num_files: Option<String>,

    /// The size of each file, e.g. `128B`, `64KB`, `1.5MB` or `2GB`. Required.
    #[arg(long = "fileSize", value_name = "SIZE", allow_hyphen_values = true)]
    file_size: Option<String>,

    /// The directory the files are read from. Required.
    #[arg(long = "inputDir", value_name = "DIR")]
    input_dir: Option<String>,

    /// One of CACHE_PROMOTE, CACHE, NO_CACHE.
    ///
    /// Defaults to CACHE_PROMOTE.
    #[arg(long = "readBehavior", value_name = "BEHAVIOR")]
    read_behavior: Option<String>,

    /// One of lz4, snappy, gzip, bzip2. Uncompressed if absent.
    #[arg(long, value_name = "CODEC")]
    compression: Option<String>,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// The directory to remove. Required.
    #[arg(long = "outputDir", value_name = "DIR")]
    output_dir: Option<String>,
}

/// The result of resolving a command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Config(TestConfig),
    /// Help was asked for. Holds the rendered usage text.
    Help(String),
    /// The version was asked for. Holds the rendered version line.
    Version(String),
}

/// What [`run`] ended up doing.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<R> {
    /// The handler ran and returned this.
    Ran(R),
    Help,
    Version,
}

/// Turns the arguments following the program name into a configuration.
///
/// Nothing is printed. Malformed tokens (unknown options, options without a value, arguments
/// that are not UTF-8) are reported first. After that each option of the command is checked for
/// presence and validity in the order the options are declared, and the first failure wins.
pub fn resolve<I, T>(args: I) -> Result<Resolution, ResolveError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let cmd = Cli::command();

    let Some(first) = args.first() else {
        return Err(ResolveError::MissingCommand);
    };
    let first = first.to_str().unwrap_or_default();
    let is_flag = matches!(first, "-h" | "--help" | "-V" | "--version");
    if !is_flag && !cmd.get_subcommands().any(|sub| sub.get_name() == first) {
        debug!(token = %first, "first argument is not a command");
        return Err(ResolveError::MissingCommand);
    }

    let argv = std::iter::once(OsString::from(BIN_NAME)).chain(args);
    let matches = match cmd.try_get_matches_from(argv) {
        Ok(matches) => matches,
        Err(err) => return from_clap(err),
    };
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => return from_clap(err),
    };

    let config = match cli.command {
        Command::Write(args) => resolve_write(args)?,
        Command::Read(args) => resolve_read(args)?,
        Command::Clean(args) => resolve_clean(args)?,
    };
    debug_assert!(config.mode().is_runnable());
    debug!(%config, "resolved configuration");
    Ok(Resolution::Config(config))
}

/// Resolves `args` and hands the configuration to `handler`.
///
/// Help and version text go to stdout and the handler is not called. On error nothing is printed;
/// reporting and the exit status are up to the caller.
pub fn run<I, T, F, R>(args: I, handler: F) -> Result<Outcome<R>, ResolveError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    F: FnOnce(TestConfig) -> R,
{
    match resolve(args)? {
        Resolution::Config(config) => Ok(Outcome::Ran(handler(config))),
        Resolution::Help(text) => {
            print!("{text}");
            Ok(Outcome::Help)
        }
        Resolution::Version(text) => {
            print!("{text}");
            Ok(Outcome::Version)
        }
    }
}

fn resolve_write(args: WriteArgs) -> Result<TestConfig, ResolveError> {
    let mut config = TestConfig::default()
        .with_mode(TestMode::Write)
        .with_num_files(parse_num_files(required("numFiles", args.num_files)?)?)
        .with_file_size(parse_file_size(required("fileSize", args.file_size)?)?)
        .with_benchmark_dir(required("outputDir", args.output_dir)?);
    if let Some(value) = args.write_behavior {
        config = config.with_write_behavior(parse_choice::<WriteBehavior>("writeBehavior", value)?);
    }
    if let Some(value) = args.compression {
        config = config.with_compression(parse_choice::<Compression>("compression", value)?);
    }
    Ok(config)
}

fn resolve_read(args: ReadArgs) -> Result<TestConfig, ResolveError> {
    let mut config = TestConfig::default()
        .with_mode(TestMode::Read)
        .with_num_files(parse_num_files(required("numFiles", args.num_files)?)?)
        .with_file_size(parse_file_size(required("fileSize", args.file_size)?)?)
        .with_benchmark_dir(required("inputDir", args.input_dir)?);
    if let Some(value) = args.read_behavior {
        config = config.with_read_behavior(parse_choice::<ReadBehavior>("readBehavior", value)?);
    }
    if let Some(value) = args.compression {
        config = config.with_compression(parse_choice::<Compression>("compression", value)?);
    }
    Ok(config)
}

fn resolve_clean(args: CleanArgs) -> Result<TestConfig, ResolveError> {
    Ok(TestConfig::default()
        .with_mode(TestMode::Clean)
        .with_benchmark_dir(required("outputDir", args.output_dir)?))
}

fn required(option: &str, value: Option<String>) -> Result<String, ResolveError> {
    value.ok_or_else(|| ResolveError::MissingRequiredOption(format!("--{option}")))
}

fn parse_num_files(value: String) -> Result<u32, ResolveError> {
    value
        .parse()
        .map_err(|_| ResolveError::InvalidNumber(value))
}

fn parse_file_size(value: String) -> Result<u64, ResolveError> {
    match value.parse::<FileSize>() {
        Ok(size) => Ok(size.to_bytes()),
        Err(err) => {
            debug!(token = %value, "rejected size: {err}");
            Err(ResolveError::InvalidSize(value))
        }
    }
}

fn parse_choice<C: Choice>(option: &'static str, value: String) -> Result<C, ResolveError> {
    C::from_name(&value).ok_or_else(|| ResolveError::InvalidEnumValue {
        option,
        value,
        allowed: C::names(),
    })
}

fn from_clap(err: clap::Error) -> Result<Resolution, ResolveError> {
    match err.kind() {
        ErrorKind::DisplayHelp => Ok(Resolution::Help(err.render().to_string())),
        ErrorKind::DisplayVersion => Ok(Resolution::Version(err.render().to_string())),
        ErrorKind::MissingSubcommand
        | ErrorKind::InvalidSubcommand
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Err(ResolveError::MissingCommand),
        ErrorKind::UnknownArgument => Err(ResolveError::UnknownOption(offending_arg(&err))),
        _ => Err(ResolveError::Usage(first_line(&err))),
    }
}

/// The option clap complained about, without any value attached to it.
fn offending_arg(err: &clap::Error) -> String {
    let arg = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.as_str()),
        Some(ContextValue::Strings(args)) => args.first().map(String::as_str),
        _ => None,
    };
    match arg.and_then(|arg| arg.split_whitespace().next()) {
        Some(name) => name.to_owned(),
        None => first_line(err),
    }
}

fn first_line(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_owned()
}
