use chrono::{DateTime, Duration, NaiveDate, Utc};

const DATE_FORMATS: &[&str] = &["%a, %b %d, %Y", "%b %d, %Y", "%B %d, %Y", "%Y-%m-%d"];

/// Cleans a chapter release label into display text.
///
/// Paid chapters carry a `Locked` marker next to the date. Relative labels
/// (`5 hours ago`) are pinned to `now` and rendered as RFC 3339.
pub fn normalize_release_date(raw: &str, now: DateTime<Utc>) -> String {
    let text = raw.replace("Locked", "");
    let text = text.trim();

    match relative_offset(text).and_then(|offset| now.checked_sub_signed(offset)) {
        Some(pinned) => pinned.to_rfc3339(),
        None => text.to_owned(),
    }
}

fn relative_offset(text: &str) -> Option<Duration> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [amount, unit, "ago"] = tokens.as_slice() else {
        return None;
    };
    let amount: i64 = amount.parse().ok()?;
    match *unit {
        "hour" | "hours" => Duration::try_hours(amount),
        "minute" | "minutes" => Duration::try_minutes(amount),
        "day" | "days" => Duration::try_days(amount),
        _ => None,
    }
}

/// Parses an absolute timestamp in any of the shapes the site renders.
/// Date-only forms resolve to midnight UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn normalize_strips_locked_marker() {
        assert_eq!(
            normalize_release_date("LockedJan 2, 2024", fixed_now()),
            "Jan 2, 2024"
        );
        assert_eq!(
            normalize_release_date(" Mon, Jan 8, 2024 Locked ", fixed_now()),
            "Mon, Jan 8, 2024"
        );
    }

    #[test]
    fn normalize_pins_relative_hours_to_now() {
        let text = normalize_release_date("5 hours ago", fixed_now());
        let parsed = parse_timestamp(&text).expect("relative date becomes rfc3339");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap());
    }

    #[test]
    fn normalize_keeps_unrecognized_text() {
        assert_eq!(normalize_release_date("soon", fixed_now()), "soon");
        assert_eq!(
            normalize_release_date("many hours ago", fixed_now()),
            "many hours ago"
        );
    }

    #[test]
    fn parse_timestamp_accepts_site_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        for input in [
            "Mon, Jan 8, 2024",
            "Jan 8, 2024",
            "Jan 08, 2024",
            "January 8, 2024",
            "2024-01-08",
            "2024-01-08T00:00:00+00:00",
        ] {
            assert_eq!(parse_timestamp(input), Some(expected), "input={input}");
        }
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday-ish"), None);
    }
}
