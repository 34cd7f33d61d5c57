//! Wall-clock helpers for the `get_current_time` tool.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

use crate::types::{WorkbenchError, WorkbenchResult};

/// Current UTC time as an RFC 3339 string with a `Z` suffix.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timezone designator.
///
/// Accepts `UTC`, `GMT`, `Z` and fixed offsets such as `+05:30`, `-0800`
/// or `UTC+02:00`. Named zones other than UTC are not supported.
pub fn parse_timezone(tz: &str) -> WorkbenchResult<FixedOffset> {
    let trimmed = tz.trim();
    let upper = trimmed.to_ascii_uppercase();

    if matches!(upper.as_str(), "" | "UTC" | "GMT" | "Z") {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| WorkbenchError::UnsupportedTimezone(tz.to_string()));
    }

    let offset = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    parse_offset(offset).ok_or_else(|| WorkbenchError::UnsupportedTimezone(tz.to_string()))
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Current time in the given timezone.
pub fn now_in(tz: &str) -> WorkbenchResult<DateTime<FixedOffset>> {
    let offset = parse_timezone(tz)?;
    Ok(Utc::now().with_timezone(&offset))
}

/// Current time in the given timezone, RFC 3339 formatted.
pub fn format_now(tz: &str) -> WorkbenchResult<String> {
    let now = now_in(tz)?;
    Ok(now.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_aliases() {
        for tz in ["UTC", "utc", "GMT", "Z", ""] {
            assert_eq!(parse_timezone(tz).unwrap().local_minus_utc(), 0, "{tz}");
        }
    }

    #[test]
    fn test_fixed_offsets() {
        assert_eq!(parse_timezone("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_timezone("-0800").unwrap().local_minus_utc(), -28_800);
        assert_eq!(parse_timezone("UTC+2").unwrap().local_minus_utc(), 7_200);
    }

    #[test]
    fn test_named_zone_unsupported() {
        assert_eq!(
            parse_timezone("America/New_York"),
            Err(WorkbenchError::UnsupportedTimezone(
                "America/New_York".to_string()
            ))
        );
        assert!(parse_timezone("+25:00").is_err());
    }

    #[test]
    fn test_format_now_utc_suffix() {
        let now = format_now("UTC").unwrap();
        assert!(now.ends_with('Z'), "{now}");
        assert!(utc_timestamp().ends_with('Z'));
    }
}
