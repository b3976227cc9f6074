//! Remote-control key names and input validation for the remote operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::InvalidArgumentError;

/// Longest delay a caller may request between or after keys.
pub const MAX_DELAY_MS: u64 = 30_000;

/// Default gap between channel digits.
pub const TUNE_DELAY_MS: u64 = 100;

/// Gap between characters of [`text_keys`] input.
pub const TEXT_DELAY_MS: u64 = 500;

/// Key appended to a channel when the box does not tune on its own.
pub const SELECT_KEY: &str = "SELECT";

/// Harmless key pressed to wake a device the hub reports as disconnected.
pub const WAKE_KEY: &str = "VOLUP";

/// Keyset used for the wake-up press.
pub const WAKE_KEYSET: &str = "PC_REMOTE";

const DIGITS: [&str; 10] = [
    "ZERO", "ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE",
];

/// One step of a custom key sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStep {
    pub key: String,
    /// Hold the key for this many repeats; zero means a plain press.
    #[serde(default)]
    pub repeats: u32,
    /// Pause after the step, in milliseconds.
    #[serde(default)]
    pub delay_ms: i64,
}

/// Validate a caller-supplied delay.
///
/// # Errors
///
/// Returns [`InvalidArgumentError::DelayOutOfRange`] outside `0..=30000` ms.
pub fn verify_delay(delay_ms: i64) -> Result<Duration, InvalidArgumentError> {
    match u64::try_from(delay_ms) {
        Ok(ms) if ms <= MAX_DELAY_MS => Ok(Duration::from_millis(ms)),
        _ => Err(InvalidArgumentError::DelayOutOfRange {
            delay_ms,
            max_ms: MAX_DELAY_MS,
        }),
    }
}

/// Key name for a decimal digit.
#[must_use]
pub fn digit_key(digit: char) -> Option<&'static str> {
    digit
        .to_digit(10)
        .and_then(|d| DIGITS.get(usize::try_from(d).ok()?).copied())
}

/// Keys for a channel number of one to four digits.
///
/// # Errors
///
/// Returns [`InvalidArgumentError::InvalidChannel`] for anything else.
pub fn channel_keys(channel: &str) -> Result<Vec<&'static str>, InvalidArgumentError> {
    let invalid = || InvalidArgumentError::InvalidChannel {
        channel: channel.to_string(),
    };
    if channel.is_empty() || channel.len() > 4 {
        return Err(invalid());
    }
    channel.chars().map(|c| digit_key(c).ok_or_else(invalid)).collect()
}

/// One key per character, taken literally.
///
/// # Errors
///
/// Returns [`InvalidArgumentError::EmptyText`] for empty input.
pub fn text_keys(text: &str) -> Result<Vec<String>, InvalidArgumentError> {
    if text.is_empty() {
        return Err(InvalidArgumentError::EmptyText);
    }
    Ok(text.chars().map(String::from).collect())
}

/// Expand a shorthand sequence such as `"M]]O"` into key names.
///
/// Unknown characters are dropped.
#[must_use]
pub fn shorthand_keys(sequence: &str) -> Vec<String> {
    sequence.chars().filter_map(shorthand_key).collect()
}

fn shorthand_key(c: char) -> Option<String> {
    let key = match c {
        '0'..='9' => return digit_key(c).map(String::from),
        'a'..='d' => return Some(c.to_ascii_uppercase().to_string()),
        'U' => "UP",
        'D' => "DOWN",
        'L' => "LEFT",
        'R' => "RIGHT",
        'M' => "MENU",
        'G' => "GUIDE",
        'X' => "EXIT",
        'S' => "SEARCH",
        'I' => "INFO",
        'O' => "OK",
        'P' => "PLAY",
        'C' => "REC",
        '[' => "CHDN",
        ']' => "CHUP",
        '<' => "PGDN",
        '>' => "PGUP",
        '~' => "LAST",
        '!' => "MUTE",
        _ => return None,
    };
    Some(key.to_string())
}

/// Largest repeat count that still fits in the hub read timeout.
#[must_use]
pub fn max_repeat_count(read_timeout: Duration) -> u32 {
    let ticks = read_timeout.as_millis() / 100;
    u32::try_from(ticks.saturating_sub(30)).unwrap_or(u32::MAX)
}
