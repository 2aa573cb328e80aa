//! Command-line interface for sleep-tracker.
//!
//! Uses lexopt for minimal binary size overhead (~34KB).

use std::ffi::OsString;
use std::path::PathBuf;

use crate::session::{SessionId, SleepQuality};

/// Action requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Show whether a night is being tracked.
    #[default]
    Status,
    /// Start tracking a night.
    Start,
    /// Stop tracking the current night.
    Stop,
    /// Rate a finished night.
    Rate(SessionId, SleepQuality),
    /// Print the sleep history.
    History,
    /// Delete all recorded nights.
    Clear,
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Action to run.
    pub command: Command,
    /// Path to the session database (overrides config file).
    pub database: Option<PathBuf>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Display offset from UTC in minutes.
    pub utc_offset: Option<i32>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut positional: Vec<String> = Vec::new();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('d') | Long("database") => {
                result.database = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("utc-offset") => {
                let value: String = parser.value()?.parse()?;
                result.utc_offset = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("utc-offset", value))?,
                );
            }
            Value(val) => {
                positional.push(val.string()?);
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if !positional.is_empty() {
        result.command = parse_command(&positional)?;
    }

    Ok(result)
}

fn parse_command(words: &[String]) -> Result<Command, ArgsError> {
    let (name, rest) = match words.split_first() {
        Some((name, rest)) => (name.as_str(), rest),
        None => return Ok(Command::default()),
    };

    let command = match name {
        "status" => Command::Status,
        "start" => Command::Start,
        "stop" => Command::Stop,
        "history" => Command::History,
        "clear" => Command::Clear,
        "rate" => {
            let [id, quality] = rest else {
                return Err(ArgsError::MissingArgument("rate <ID> <0-5>"));
            };
            let id: SessionId = id
                .parse()
                .map_err(|_| ArgsError::InvalidValue("ID", id.clone()))?;
            let quality = quality
                .parse::<i64>()
                .ok()
                .filter(|q| *q >= 0)
                .and_then(|q| SleepQuality::try_from(q).ok())
                .ok_or_else(|| ArgsError::InvalidValue("quality", quality.clone()))?;
            return Ok(Command::Rate(id, quality));
        }
        other => return Err(ArgsError::UnexpectedArgument(other.to_string())),
    };

    match rest.first() {
        Some(extra) => Err(ArgsError::UnexpectedArgument(extra.clone())),
        None => Ok(command),
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"sleep-tracker {version}
Track sleep sessions in a local SQLite database

USAGE:
    sleep-tracker [OPTIONS] [COMMAND]

COMMANDS:
    status                  Show whether a night is being tracked [default]
    start                   Start tracking a night
    stop                    Stop tracking the current night
    rate <ID> <0-5>         Rate a finished night
    history                 Print all recorded nights
    clear                   Delete all recorded nights

OPTIONS:
    -d, --database <FILE>   Session database [default: sleep-tracker.db]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --utc-offset <MIN>  Display offset from UTC in minutes
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SLEEP_TRACKER_DB         Database path (overrides config)
    SLEEP_TRACKER_LOG_LEVEL  Log level (overrides config)
    SLEEP_TRACKER_UTC_OFFSET Display offset in minutes (overrides config)
    RUST_LOG                 Alternative log level setting

QUALITY SCALE:
    0 Very bad, 1 Poor, 2 So-so, 3 OK, 4 Pretty good, 5 Excellent

EXAMPLES:
    # Going to bed
    sleep-tracker start

    # Waking up, then rating the night
    sleep-tracker stop
    sleep-tracker rate night-3 4

    # History in Central European Time
    sleep-tracker --utc-offset 60 history
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("sleep-tracker {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
    /// A command is missing its operands.
    MissingArgument(&'static str),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for {}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
            Self::MissingArgument(usage) => {
                write!(f, "missing arguments, usage: {}", usage)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
