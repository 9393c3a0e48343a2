//! Human-friendly time values for command-line flags.
//!
//! Durations resolve to whole seconds; timestamps resolve to unix seconds.
//! Naive timestamps (no offset) are read as UTC.

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Parses `"3600"`, `"4 hours"`, `"30 min"` or `"last day"` into seconds.
pub fn parse_duration(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("empty time range");
    }
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "last hour" => return Ok(HOUR),
        "last day" => return Ok(DAY),
        "last week" => return Ok(WEEK),
        _ => {}
    }

    if let Ok(n) = lower.parse::<i64>() {
        return non_negative(n, trimmed);
    }

    let fields: Vec<&str> = lower.split_whitespace().collect();
    let [count, unit] = fields.as_slice() else {
        bail!("unrecognized time range format: {trimmed:?}");
    };
    let count: i64 = count
        .parse()
        .map_err(|e| anyhow!("invalid number in time range {trimmed:?}: {e}"))?;
    let count = non_negative(count, trimmed)?;

    let multiplier = match *unit {
        "second" | "seconds" | "sec" | "secs" => 1,
        "minute" | "minutes" | "min" | "mins" => MINUTE,
        "hour" | "hours" | "hr" | "hrs" => HOUR,
        "day" | "days" => DAY,
        "week" | "weeks" => WEEK,
        other => bail!("unknown time unit {other:?} in {trimmed:?}"),
    };

    count
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow!("time range {trimmed:?} is too large"))
}

fn non_negative(n: i64, input: &str) -> Result<u64> {
    u64::try_from(n).map_err(|_| anyhow!("time range must not be negative: {input:?}"))
}

/// Parses unix seconds, RFC 3339, `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DD`.
pub fn parse_timestamp(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("empty timestamp");
    }

    if let Ok(secs) = trimmed.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.timestamp());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.and_utc().timestamp());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc().timestamp());
    }

    bail!("unrecognized timestamp format: {trimmed:?}")
}
