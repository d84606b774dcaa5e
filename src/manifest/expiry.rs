//! Expiry duration expressions
//!
//! An expression is a run of `<integer><unit>` tokens, unit one of
//! `s`, `m`, `h`, `d`, `w`, optionally separated by whitespace. Token
//! durations add up: `1d2h` and `1d 2h` are both 26 hours.

use chrono::{DateTime, Duration, Utc};
use regex_lite::Regex;
use std::sync::OnceLock;

/// Errors for expiry expressions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryError {
    #[error("Invalid expiry expression '{expr}': {reason}")]
    Invalid { expr: String, reason: String },
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"(\d+)([smhdw])").expect("static regex is valid"))
}

fn unit_seconds(unit: &str) -> i64 {
    match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => 7 * 24 * 60 * 60,
    }
}

/// Total duration of an expiry expression. Empty means zero.
pub fn parse_expiry_duration(expr: &str) -> Result<Duration, ExpiryError> {
    let trimmed = expr.trim();
    let invalid = |reason: &str| ExpiryError::Invalid {
        expr: expr.to_string(),
        reason: reason.to_string(),
    };

    let mut total: i64 = 0;
    let mut pos = 0;
    for caps in token_regex().captures_iter(trimmed) {
        let (Some(whole), Some(value), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let gap = &trimmed[pos..whole.start()];
        if !gap.trim().is_empty() {
            return Err(invalid(&format!("unexpected '{}'", gap.trim())));
        }
        pos = whole.end();

        let value: i64 = value
            .as_str()
            .parse()
            .map_err(|_| invalid("value out of range"))?;
        total = value
            .checked_mul(unit_seconds(unit.as_str()))
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| invalid("duration out of range"))?;
    }

    if pos != trimmed.len() {
        return Err(invalid(&format!("unexpected '{}'", &trimmed[pos..])));
    }

    Duration::try_seconds(total).ok_or_else(|| invalid("duration out of range"))
}

/// Expiry time for an expression evaluated at `now`.
///
/// A zero-length expression has no expiry, so `None` is returned rather
/// than `now` itself.
pub fn expiry_after(now: DateTime<Utc>, expr: &str) -> Result<Option<DateTime<Utc>>, ExpiryError> {
    let duration = parse_expiry_duration(expr)?;
    if duration.is_zero() {
        return Ok(None);
    }
    now.checked_add_signed(duration)
        .map(Some)
        .ok_or_else(|| ExpiryError::Invalid {
            expr: expr.to_string(),
            reason: "expiry out of range".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_tokens_add_up() {
        assert_eq!(parse_expiry_duration("1d2h").unwrap(), Duration::hours(26));
        assert_eq!(parse_expiry_duration("2w").unwrap(), Duration::days(14));
        assert_eq!(
            parse_expiry_duration("1h30m15s").unwrap(),
            Duration::seconds(3600 + 1800 + 15)
        );
    }

    #[test]
    fn test_expiry_after() {
        let expiry = expiry_after(now(), "1d2h").unwrap().unwrap();
        assert_eq!(expiry, now() + Duration::hours(26));
        assert_eq!(expiry.timestamp(), now().timestamp() + 26 * 3600);
    }

    #[test]
    fn test_zero_duration_has_no_expiry() {
        assert_eq!(expiry_after(now(), "").unwrap(), None);
        assert_eq!(expiry_after(now(), "0d").unwrap(), None);
        assert_eq!(expiry_after(now(), "  ").unwrap(), None);
    }

    #[test]
    fn test_whitespace_between_tokens() {
        assert_eq!(parse_expiry_duration("1d 2h").unwrap(), Duration::hours(26));
        assert_eq!(parse_expiry_duration(" 1w\t1d ").unwrap(), Duration::days(8));
        assert!(parse_expiry_duration("1 d").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_expiry_duration("30").is_err());
        assert!(parse_expiry_duration("1y").is_err());
        assert!(parse_expiry_duration("1d x").is_err());
        assert!(parse_expiry_duration("d1").is_err());
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(parse_expiry_duration("99999999999999999999d").is_err());
        assert!(parse_expiry_duration("9223372036854775807w").is_err());
    }
}
