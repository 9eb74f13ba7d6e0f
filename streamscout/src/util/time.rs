use chrono::{DateTime, Local, SecondsFormat, Utc};
use chrono_tz::Tz;

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Get the current time as a UTC datetime.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO 8601 form used in the structured output, e.g. `2026-02-08T05:00:00.000000+00:00`.
pub fn format_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Human-readable wall-clock time in `timezone`, or the system zone.
///
/// Unknown zone names fall back to the system zone.
pub fn format_local(at: DateTime<Utc>, timezone: Option<&str>) -> String {
    match timezone.and_then(|tz| tz.parse::<Tz>().ok()) {
        Some(tz) => at.with_timezone(&tz).format(LOCAL_FORMAT).to_string(),
        None => at.with_timezone(&Local).format(LOCAL_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed() -> DateTime<Utc> {
        Utc.timestamp_opt(1770526800, 0).unwrap()
    }

    #[test]
    fn test_format_utc() {
        assert_eq!(format_utc(fixed()), "2026-02-08T05:00:00.000000+00:00");
    }

    #[test]
    fn test_format_local_named_zone() {
        assert_eq!(
            format_local(fixed(), Some("Asia/Tokyo")),
            "2026-02-08 14:00:00 JST"
        );
        assert_eq!(format_local(fixed(), Some("UTC")), "2026-02-08 05:00:00 UTC");
    }

    #[test]
    fn test_format_local_unknown_zone_falls_back() {
        assert_eq!(
            format_local(fixed(), Some("Nowhere/Land")),
            format_local(fixed(), None)
        );
    }
}
