//! Turning parsed fragments into the table handed back to the caller.

use chrono_tz::Tz;

use crate::reports::Truncation;
use crate::table::Table;
use crate::window::TimeWindow;

/// How two independently fetched results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Same cadence: keep timestamps present in both.
    Inner,
    /// Mixed cadence: union of timestamps, gaps forward-filled.
    ForwardFillOuter,
}

/// Merge fragments in arrival order, localize, and cut to the caller's window.
pub fn assemble(
    fragments: impl IntoIterator<Item = Table>,
    tz: Tz,
    window: &TimeWindow,
    truncation: Truncation,
) -> Table {
    let mut merged = Table::new(tz);
    for fragment in fragments {
        merged.merge(fragment);
    }
    let bounds = match truncation {
        Truncation::Window => *window,
        Truncation::YearBounds => window.year_bounds(),
    };
    merged
        .with_timezone(tz)
        .truncate(bounds.start_utc(), bounds.end_utc())
}

pub fn combine(left: Table, right: Table, policy: JoinPolicy) -> Table {
    match policy {
        JoinPolicy::Inner => left.inner_join(right),
        JoinPolicy::ForwardFillOuter => left.outer_join_ffill(right),
    }
}
