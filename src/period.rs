//! Window resolution: the current window and the equal-length window
//! immediately before it.

use crate::types::{DateRange, Periods, TripRecord};
use chrono::{Months, NaiveDate};

/// Resolve the requested window into a current/previous pair.
///
/// With no request the current window is the last `lookback_months` months
/// ending `today`. The previous window ends where the current one starts and
/// has exactly the same length.
pub fn resolve_periods(
    requested: Option<DateRange>,
    today: NaiveDate,
    lookback_months: u32,
) -> Periods {
    let current = match requested {
        // Fields are public, so a caller can still hand us reversed ends.
        Some(r) => DateRange::new(r.from, r.to),
        None => {
            let from = today
                .checked_sub_months(Months::new(lookback_months))
                .unwrap_or(NaiveDate::MIN);
            DateRange::new(from, today)
        }
    };

    let span = current.to - current.from;
    let previous_from = current
        .from
        .checked_sub_signed(span)
        .unwrap_or(NaiveDate::MIN);
    let previous = DateRange {
        from: previous_from,
        to: current.from,
    };

    Periods { current, previous }
}

/// Trips whose start date falls inside `range`, both ends inclusive.
pub fn trips_in_window<'a>(trips: &'a [TripRecord], range: &DateRange) -> Vec<&'a TripRecord> {
    trips
        .iter()
        .filter(|t| range.contains(t.start_date))
        .collect()
}
