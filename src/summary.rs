//! Human-readable rendering of sleep history.

use chrono::{DateTime, FixedOffset, Utc};

use crate::session::Session;

const HEADER: &str = "Here is your sleep data:";
const EMPTY: &str = "No sleep recorded yet.";
const TIME_FORMAT: &str = "%A %b-%d-%Y Time: %H:%M";

/// Format an epoch-millisecond timestamp in the given offset.
pub fn format_timestamp(millis: i64, offset: &FixedOffset) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(offset).format(TIME_FORMAT).to_string(),
        None => format!("<invalid time {millis}>"),
    }
}

/// Format a duration as `H:MM:SS`.
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Render the history list, one block per night.
///
/// Sessions are rendered in the order given, which for the store is most
/// recent first.
pub fn render_history(sessions: &[Session], offset: &FixedOffset) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    if sessions.is_empty() {
        out.push_str(EMPTY);
        out.push('\n');
        return out;
    }

    for night in sessions {
        out.push('\n');
        out.push_str(&format!(
            "Start: {}\n",
            format_timestamp(night.start_time_ms, offset)
        ));

        match night.duration() {
            Some(slept) => {
                out.push_str(&format!(
                    "End: {}\n",
                    format_timestamp(night.end_time_ms, offset)
                ));
                if night.quality.is_rated() {
                    out.push_str(&format!("Quality: {}\n", night.quality));
                } else {
                    out.push_str("Quality: not rated\n");
                }
                out.push_str(&format!("Hours:Minutes:Seconds: {}\n", format_duration(slept)));
            }
            None => out.push_str("End: still tracking\n"),
        }
    }

    out
}
