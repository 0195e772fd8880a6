use crate::check_tick_interval;
use once_cell::sync::Lazy;
use regex::Regex;

// Compiled regexes for game speed parsing
static INTERVAL_MS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s*ms$").unwrap());
static INTERVAL_SEC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\.(\d{1,3}))?\s*s$").unwrap());

/// Game speed parsing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalParseError {
    EmptyInput,
    InvalidFormat(String),
    TooLarge,
}

impl std::fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalParseError::EmptyInput => write!(f, "Game speed cannot be empty"),
            IntervalParseError::InvalidFormat(hint) => {
                write!(f, "Invalid game speed format. {}", hint)
            }
            IntervalParseError::TooLarge => write!(f, "Game speed value is too large"),
        }
    }
}

impl std::error::Error for IntervalParseError {}

/// Parse a game speed string to milliseconds.
///
/// Supported formats:
/// - Pure number: "1000" (milliseconds)
/// - Milliseconds with unit: "750ms"
/// - Seconds, optionally fractional: "2s", "1.5s", "0.25 s"
pub fn parse_interval_ms(input: &str) -> Result<u32, IntervalParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IntervalParseError::EmptyInput);
    }

    if let Ok(ms) = trimmed.parse::<u32>() {
        return Ok(ms);
    }

    if let Some(captures) = INTERVAL_MS_REGEX.captures(trimmed) {
        return captures[1]
            .parse()
            .map_err(|_| IntervalParseError::TooLarge);
    }

    if let Some(captures) = INTERVAL_SEC_REGEX.captures(trimmed) {
        let seconds: u32 = captures[1]
            .parse()
            .map_err(|_| IntervalParseError::TooLarge)?;
        // 1 digit = x100, 2 digits = x10, 3 digits = as is
        let fraction = match captures.get(2) {
            Some(digits) => {
                let value: u32 = digits
                    .as_str()
                    .parse()
                    .map_err(|_| IntervalParseError::TooLarge)?;
                match digits.as_str().len() {
                    1 => value * 100,
                    2 => value * 10,
                    _ => value,
                }
            }
            None => 0,
        };
        return seconds
            .checked_mul(1_000)
            .and_then(|ms| ms.checked_add(fraction))
            .ok_or(IntervalParseError::TooLarge);
    }

    Err(IntervalParseError::InvalidFormat(
        "Use: 1000, 750ms, 2s or 1.5s".to_string(),
    ))
}

/// Parse and range-check the game speed field.
pub fn validate_tick_interval(input: &str) -> Result<u32, String> {
    let ms = parse_interval_ms(input).map_err(|e| e.to_string())?;
    check_tick_interval(ms).map_err(|e| e.to_string())
}

/// Format milliseconds for display, e.g. "750 ms" or "1.5 s".
pub fn format_interval(ms: u32) -> String {
    if ms < 1_000 {
        format!("{} ms", ms)
    } else if ms % 1_000 == 0 {
        format!("{} s", ms / 1_000)
    } else {
        let text = format!("{}.{:03}", ms / 1_000, ms % 1_000);
        format!("{} s", text.trim_end_matches('0'))
    }
}
