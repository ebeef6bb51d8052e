//! # Argentina Time Helpers
//!
//! Everything is stored in UTC. Argentina runs on fixed UTC-3 with no
//! daylight saving, so local time is plain offset arithmetic.
//!
//! ## Why a business date?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A sale at 23:30 local on March 5 is 02:30 UTC on March 6.              │
//! │                                                                         │
//! │  Grouping by the UTC timestamp would put it in the wrong day's          │
//! │  report. Every sale therefore stores its UTC-3 calendar day in a        │
//! │  business_date column, computed once at insert:                         │
//! │                                                                         │
//! │    created_at (UTC)  ──► business_date(created_at) ──► "2026-03-05"     │
//! │                                                                         │
//! │  Dashboards and reports group on business_date directly.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Hours Argentina sits behind UTC. Fixed, no DST.
pub const UTC_OFFSET_HOURS: i64 = 3;

/// The Argentina calendar day a UTC instant falls on.
pub fn business_date(ts: DateTime<Utc>) -> NaiveDate {
    (ts - Duration::hours(UTC_OFFSET_HOURS)).date_naive()
}

/// UTC bounds of one Argentina business day: `[start, end)`.
///
/// Used by reports so "sales of March 5" means the local day, not the UTC one.
pub fn business_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_naive = date.and_time(NaiveTime::MIN) + Duration::hours(UTC_OFFSET_HOURS);
    let start = DateTime::<Utc>::from_naive_utc_and_offset(start_naive, Utc);
    (start, start + Duration::days(1))
}

/// Formats a UTC instant as Argentina local time for tickets and reports.
pub fn format_local(ts: DateTime<Utc>) -> String {
    (ts - Duration::hours(UTC_OFFSET_HOURS))
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_business_date_shifts_across_midnight() {
        // 02:30 UTC on March 6 is 23:30 local on March 5
        let late_night = Utc.with_ymd_and_hms(2026, 3, 6, 2, 30, 0).unwrap();
        assert_eq!(
            business_date(late_night),
            NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
        );

        // 12:00 UTC is 09:00 local, same day
        let midday = Utc.with_ymd_and_hms(2026, 3, 6, 12, 0, 0).unwrap();
        assert_eq!(
            business_date(midday),
            NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()
        );
    }

    #[test]
    fn test_business_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let (start, end) = business_day_bounds(date);

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 5, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 6, 3, 0, 0).unwrap());

        // An instant inside the local day is inside the bounds
        let inside = Utc.with_ymd_and_hms(2026, 3, 6, 2, 30, 0).unwrap();
        assert!(inside >= start && inside < end);
    }

    #[test]
    fn test_format_local() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 6, 2, 30, 0).unwrap();
        assert_eq!(format_local(ts), "05/03/2026 23:30");
    }
}
