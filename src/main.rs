//! sleep-tracker binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::FixedOffset;
use sleep_tracker::cli::{self, Command};
use sleep_tracker::config::Config;
use sleep_tracker::summary::{format_duration, format_timestamp};
use sleep_tracker::{logging, SleepTracker, SqliteStore};
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    let offset = match config.utc_offset() {
        Ok(offset) => offset,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init_with(config.log_filter()).ok();
    debug!("sleep-tracker v{}", env!("CARGO_PKG_VERSION"));

    match run(args.command, &config, &offset).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Command,
    config: &Config,
    offset: &FixedOffset,
) -> sleep_tracker::Result<()> {
    let store = Arc::new(SqliteStore::open(&config.database.path)?);
    let tracker = SleepTracker::new(store).await?;

    match command {
        Command::Status => {}
        Command::Start => {
            let id = tracker.start_tracking().await?;
            println!("Tracking {}. Sleep well.", id);
        }
        Command::Stop => {
            if tracker.stop_tracking().await?.is_none() {
                println!("Nothing is being tracked.");
            }
        }
        Command::Rate(id, quality) => {
            let night = tracker.set_quality(id, quality).await?;
            println!("Rated {} as {}.", night.id, night.quality);
        }
        Command::History => {
            print!("{}", tracker.history_summary(offset));
        }
        Command::Clear => {
            tracker.clear_history().await?;
        }
    }

    report(&tracker, offset);
    Ok(())
}

/// Act on pending one-shot signals, then show which actions are available.
fn report(tracker: &SleepTracker<SqliteStore>, offset: &FixedOffset) {
    if let Some(night) = tracker.consume_navigation() {
        let slept = night.duration().map(format_duration).unwrap_or_default();
        println!(
            "Stopped {} at {} after {}.",
            night.id,
            format_timestamp(night.end_time_ms, offset),
            slept
        );
        println!("How was it? sleep-tracker rate {} <0-5>", night.id);
    }

    if tracker.consume_notification() {
        println!("All your sleep data is gone.");
    }

    match tracker.tonight() {
        Some(night) => println!(
            "Tracking {} since {}.",
            night.id,
            format_timestamp(night.start_time_ms, offset)
        ),
        None => println!("Not tracking."),
    }

    let buttons = tracker.buttons();
    let mut actions = Vec::new();
    if buttons.start {
        actions.push("start");
    }
    if buttons.stop {
        actions.push("stop");
    }
    if buttons.clear {
        actions.push("history");
        actions.push("clear");
    }
    println!("Available: {}", actions.join(", "));
}
