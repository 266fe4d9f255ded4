use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Human-readable timestamp layout written into the journal,
/// e.g. `Friday, October 16, 2026 09:30:12 AM EDT`.
pub const TIMESTAMP_FORMAT: &str = "%A, %B %d, %Y %I:%M:%S %p %Z";

/// Same layout without the trailing zone abbreviation, which chrono cannot parse.
const TIMESTAMP_PARSE_FORMAT: &str = "%A, %B %d, %Y %I:%M:%S %p";

/// Wall clock pinned to the reference timezone chosen at process start.
/// Every day boundary in the journal is computed in this zone.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceClock {
    tz: Tz,
}

impl ReferenceClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// US equity market time (`America/New_York`).
    pub fn market() -> Self {
        Self::new(chrono_tz::America::New_York)
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn format(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn timestamp(&self) -> String {
        self.format(Utc::now())
    }

    /// Calendar date of a journal timestamp.
    ///
    /// Accepts the journal layout (already in reference time) or RFC 3339,
    /// which is converted into the reference zone first.
    pub fn day_of(&self, timestamp: &str) -> Result<NaiveDate, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
            return Ok(dt.with_timezone(&self.tz).date_naive());
        }
        let without_zone = timestamp
            .trim()
            .rsplit_once(' ')
            .map(|(head, _zone)| head)
            .unwrap_or(timestamp);
        NaiveDateTime::parse_from_str(without_zone, TIMESTAMP_PARSE_FORMAT)
            .map(|dt| dt.date())
            .map_err(|e| format!("{timestamp:?}: {e}"))
    }
}

impl Default for ReferenceClock {
    fn default() -> Self {
        Self::market()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uses_reference_zone() {
        let clock = ReferenceClock::market();
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 13, 30, 12).unwrap();
        assert_eq!(clock.format(at), "Friday, October 16, 2026 09:30:12 AM EDT");
    }

    #[test]
    fn test_day_of_journal_timestamp() {
        let clock = ReferenceClock::market();
        let day = clock
            .day_of("Friday, October 16, 2026 11:59:59 PM EDT")
            .unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn test_day_of_rfc3339_crosses_midnight() {
        let clock = ReferenceClock::market();
        // 02:00 UTC is still the previous evening in New York.
        let day = clock.day_of("2026-10-17T02:00:00Z").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn test_day_of_garbage() {
        assert!(ReferenceClock::market().day_of("yesterday-ish").is_err());
    }

    #[test]
    fn test_format_roundtrips_through_day_of() {
        let clock = ReferenceClock::new(chrono_tz::Asia::Tokyo);
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 20, 0, 0).unwrap();
        let ts = clock.format(at);
        assert_eq!(
            clock.day_of(&ts).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 6).unwrap()
        );
    }
}
