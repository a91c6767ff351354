//! Recovery calendar arithmetic.
//!
//! Maps "today" and the surgery date to a signed day offset, a week
//! index, and a healing-percentage estimate. Total over any two dates;
//! there are no error paths here.

use crate::RecoveryContext;
use chrono::{DateTime, NaiveDate, TimeZone};

/// Days after surgery at which the healing estimate saturates at 100%
const FULL_RECOVERY_DAYS: i64 = 28;

/// Resolve the recovery context for `today`.
///
/// `day_offset` is negative while the surgery is still ahead. The week
/// index is `floor(day_offset / 7)` and only meaningful once the offset
/// is non-negative (pre-op is a countdown, not a week).
pub fn recovery_context(today: NaiveDate, surgery_date: NaiveDate) -> RecoveryContext {
    let day_offset = (today - surgery_date).num_days();
    let week_index = day_offset.div_euclid(7);
    let healing_percent =
        (day_offset as f64 / FULL_RECOVERY_DAYS as f64 * 100.0).clamp(0.0, 100.0);

    RecoveryContext {
        day_offset,
        week_index,
        healing_percent,
    }
}

/// Resolve from full timestamps.
///
/// Both instants collapse to their civil date first, so time of day
/// never shifts the day offset.
pub fn recovery_context_at<Tz: TimeZone>(
    now: DateTime<Tz>,
    surgery_at: DateTime<Tz>,
) -> RecoveryContext {
    recovery_context(now.date_naive(), surgery_at.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_offset_and_week_index() {
        let surgery = date(2025, 3, 1);

        let ctx = recovery_context(date(2025, 3, 10), surgery);
        assert_eq!(ctx.day_offset, 9);
        assert_eq!(ctx.week_index, 1);

        let ctx = recovery_context(surgery, surgery);
        assert_eq!(ctx.day_offset, 0);
        assert_eq!(ctx.week_index, 0);
    }

    #[test]
    fn test_preop_offset_is_negative() {
        let ctx = recovery_context(date(2025, 2, 26), date(2025, 3, 1));
        assert_eq!(ctx.day_offset, -3);
        assert!(ctx.is_preop());
    }

    #[test]
    fn test_healing_percent_saturates() {
        let surgery = date(2025, 3, 1);

        assert_eq!(recovery_context(date(2025, 2, 1), surgery).healing_percent, 0.0);
        assert_eq!(recovery_context(surgery, surgery).healing_percent, 0.0);
        assert_eq!(
            recovery_context(date(2025, 3, 29), surgery).healing_percent,
            100.0
        );
        assert_eq!(
            recovery_context(date(2025, 6, 1), surgery).healing_percent,
            100.0
        );

        let halfway = recovery_context(date(2025, 3, 15), surgery);
        assert_eq!(halfway.healing_percent, 50.0);
    }

    #[test]
    fn test_healing_percent_monotone() {
        let surgery = date(2025, 3, 1);
        let mut last = -1.0;
        for offset in 0..40 {
            let today = surgery + chrono::Duration::days(offset);
            let pct = recovery_context(today, surgery).healing_percent;
            assert!(pct >= last, "healing regressed at offset {}", offset);
            last = pct;
        }
    }

    #[test]
    fn test_time_of_day_does_not_shift_offset() {
        let surgery = Utc.with_ymd_and_hms(2025, 3, 1, 23, 50, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 5, 0).unwrap();

        let ctx = recovery_context_at(now, surgery);
        assert_eq!(ctx.day_offset, 9);
    }
}
