// src/sender/line.rs

//! Wavefront data format encoding.
//!
//! One point per line:
//! `"<metricName>" <metricValue> [<timestamp>] source="<source>" ["<tagKey>"="<tagValue>" ...]`

use crate::config::PointTags;
use crate::error::SendError;
use std::fmt::Write;

/// Prefix the backend uses to recognise delta counters.
pub const DELTA_PREFIX: char = '\u{2206}';
const ALT_DELTA_PREFIX: char = '\u{0394}';

/// Returns `name` with the delta prefix, unless it already has one.
pub fn delta_counter_name(name: &str) -> String {
    if has_delta_prefix(name) {
        name.to_string()
    } else {
        let mut prefixed = String::with_capacity(name.len() + DELTA_PREFIX.len_utf8());
        prefixed.push(DELTA_PREFIX);
        prefixed.push_str(name);
        prefixed
    }
}

pub fn has_delta_prefix(name: &str) -> bool {
    name.starts_with(DELTA_PREFIX) || name.starts_with(ALT_DELTA_PREFIX)
}

/// Encodes a single point. Delta counters are passed without a timestamp.
pub fn metric_line(
    name: &str,
    value: f64,
    timestamp: Option<i64>,
    source: &str,
    tags: &PointTags,
) -> Result<String, SendError> {
    if name.is_empty() {
        return Err(SendError::InvalidPoint("empty metric name".into()));
    }
    if source.is_empty() {
        return Err(SendError::InvalidPoint("empty source".into()));
    }
    if !value.is_finite() {
        return Err(SendError::InvalidPoint(format!(
            "non-finite value {value} for metric {name}"
        )));
    }

    let mut line = String::with_capacity(64 + name.len() + source.len());
    line.push('"');
    line.push_str(&sanitize_name(name));
    line.push('"');
    // Writing into a String cannot fail.
    let _ = write!(line, " {value}");
    if let Some(ts) = timestamp {
        let _ = write!(line, " {ts}");
    }
    line.push_str(" source=");
    push_quoted_value(&mut line, source);

    for (key, tag_value) in tags {
        if key.is_empty() {
            return Err(SendError::InvalidPoint("empty point tag key".into()));
        }
        if tag_value.is_empty() {
            continue;
        }
        line.push_str(" \"");
        line.push_str(&sanitize_tag_key(key));
        line.push_str("\"=");
        push_quoted_value(&mut line, tag_value);
    }

    Ok(line)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| match c {
            c if c.is_ascii_alphanumeric() => c,
            '-' | '_' | '.' | '/' | ',' => c,
            '~' | DELTA_PREFIX | ALT_DELTA_PREFIX if i == 0 => c,
            _ => '-',
        })
        .collect()
}

fn sanitize_tag_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() => c,
            '-' | '_' | '.' => c,
            _ => '-',
        })
        .collect()
}

fn push_quoted_value(line: &mut String, value: &str) {
    line.push('"');
    for c in value.chars() {
        match c {
            '"' => line.push_str("\\\""),
            '\n' => line.push_str("\\n"),
            _ => line.push(c),
        }
    }
    line.push('"');
}
