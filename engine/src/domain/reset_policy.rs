//! Cutover policy: pure functions of the clock and the reset watermark.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar-day key (`YYYY-MM-DD`) used to group strikes. This is the
/// plain date, independent of the cutover hour.
pub fn day_key(now: NaiveDateTime) -> String {
    now.date().format("%Y-%m-%d").to_string()
}

/// The cutover instant on a given calendar day.
pub fn cutover_on(day: NaiveDate, cutover_hour: u32) -> NaiveDateTime {
    day.and_hms_opt(cutover_hour.min(23), 0, 0)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN))
}

/// Whether the daily reset is due.
///
/// True once `now` has passed today's cutover while the watermark still
/// points before it, or whenever the watermark has fallen more than a
/// full day behind. Missed days collapse into a single reset; there is no
/// back-dated multi-day compounding.
pub fn should_reset(last_reset_date: NaiveDate, now: NaiveDateTime, cutover_hour: u32) -> bool {
    let today_cutover = cutover_on(now.date(), cutover_hour);
    let last_cutover = cutover_on(last_reset_date, cutover_hour);

    if now >= today_cutover && last_cutover < today_cutover {
        return true;
    }
    last_cutover < cutover_on(now.date() - Duration::days(1), cutover_hour)
}
