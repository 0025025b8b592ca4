//! Human duration strings ("12h", "2w", "90") to and from whole seconds.

use alloc::format;
use alloc::string::String;

/// Seconds in one minute.
pub const MINUTE: i64 = 60;
/// Seconds in one hour.
pub const HOUR: i64 = 60 * MINUTE;
/// Seconds in one day.
pub const DAY: i64 = 24 * HOUR;
/// Seconds in one week.
pub const WEEK: i64 = 7 * DAY;
/// Seconds in one (365 day) year.
pub const YEAR: i64 = 365 * DAY;

/// Suffix to seconds multiplier, tried in order.
const UNITS: &[(char, i64)] = &[('y', YEAR), ('w', WEEK), ('d', DAY), ('h', HOUR), ('m', MINUTE)];

/// Outcome of [`parse_duration`].
///
/// Only [`DurationParse::Matched`] comes from a recognised unit pattern.
/// [`DurationParse::Lenient`] is the best-effort integer read of text that
/// matched no pattern (`"12 hours"` reads as 12 seconds), kept separate so
/// callers decide whether to trust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationParse {
    /// The whole string matched `<n>y|w|d|h|m|s` or a bare number.
    Matched(i64),
    /// No pattern matched; the leading integer of the text was used.
    Lenient(i64),
    /// Nothing numeric could be read.
    NotANumber,
}

impl DurationParse {
    /// Parsed seconds, if any were read.
    pub fn seconds(&self) -> Option<i64> {
        match *self {
            DurationParse::Matched(s) | DurationParse::Lenient(s) => Some(s),
            DurationParse::NotANumber => None,
        }
    }

    /// True if the text matched a unit pattern exactly.
    pub fn is_exact(&self) -> bool {
        matches!(self, DurationParse::Matched(_))
    }
}

/// Parse duration strings like "5y", "2w", "3d", "12h", "30m", "45s" or "45".
///
/// The captured number must be all ASCII digits; there is no whitespace
/// trimming and no fractional support.
pub fn parse_duration(s: &str) -> DurationParse {
    for (suffix, multiplier) in UNITS {
        if let Some(digits) = s.strip_suffix(*suffix) {
            if let Some(n) = parse_digits(digits) {
                return match n.checked_mul(*multiplier) {
                    Some(secs) => DurationParse::Matched(secs),
                    None => DurationParse::NotANumber,
                };
            }
        }
    }

    let bare = s.strip_suffix('s').unwrap_or(s);
    if let Some(n) = parse_digits(bare) {
        return DurationParse::Matched(n);
    }

    match leading_integer(s) {
        Some(n) => DurationParse::Lenient(n),
        None => DurationParse::NotANumber,
    }
}

/// Format seconds as a single-unit human duration, largest unit first.
///
/// The value is floored to the chosen unit, so `format_duration(90)` is
/// `"1m"`. Years are only used strictly above one year. Returns `None` for
/// zero or negative input.
pub fn format_duration(seconds: i64) -> Option<String> {
    let (unit, suffix) = if seconds > YEAR {
        (YEAR, 'y')
    } else if seconds >= WEEK {
        (WEEK, 'w')
    } else if seconds >= DAY {
        (DAY, 'd')
    } else if seconds >= HOUR {
        (HOUR, 'h')
    } else if seconds >= MINUTE {
        (MINUTE, 'm')
    } else if seconds > 0 {
        (1, 's')
    } else {
        return None;
    };
    Some(format!("{}{}", seconds / unit, suffix))
}

/// A non-empty run of ASCII digits, and nothing else.
fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Leading whitespace, an optional sign, then as many digits as follow.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    let n: i64 = rest[..end].parse().ok()?;
    Some(if negative { -n } else { n })
}
