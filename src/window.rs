use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Wire format for `periodStart`/`periodEnd`: UTC, hour resolution.
pub const API_DATETIME_FORMAT: &str = "%Y%m%d%H00";

/// A half-open query window `[start, end)` expressed in zoned instants.
///
/// Calendar splitting (years, days) follows the timezone of `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    /// Rejects windows that are empty once truncated to the hour, since the
    /// provider only sees `periodStart`/`periodEnd` at hour resolution.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidRequest(format!(
                "window start {start} must be before end {end}"
            )));
        }
        if hour_empty(start.with_timezone(&Utc), end.with_timezone(&Utc)) {
            return Err(Error::InvalidRequest(format!(
                "window {start} to {end} is empty at hour resolution"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn utc(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        Self::new(start.with_timezone(&Tz::UTC), end.with_timezone(&Tz::UTC))
    }

    /// Build a window from wall-clock times in `tz`.
    pub fn local(tz: Tz, start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        let start = localize(tz, start)?;
        let end = localize(tz, end)?;
        Self::new(start, end)
    }

    /// Convenience for whole local days: `[start 00:00, end 00:00)`.
    pub fn days(tz: Tz, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(local_midnight(tz, start), local_midnight(tz, end))
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Inclusive containment, used for result truncation.
    pub fn contains_inclusive(&self, t: DateTime<Utc>) -> bool {
        t >= self.start_utc() && t <= self.end_utc()
    }

    pub fn period_start_param(&self) -> String {
        api_datetime(self.start_utc())
    }

    pub fn period_end_param(&self) -> String {
        api_datetime(self.end_utc())
    }

    /// Consecutive calendar-year aligned sub-windows covering `[start, end)`.
    pub fn split_years(&self) -> Vec<TimeWindow> {
        let tz = self.timezone();
        self.split_at(|cur| {
            let next = NaiveDate::from_ymd_opt(cur.year() + 1, 1, 1)?;
            Some(local_midnight(tz, next))
        })
    }

    /// Consecutive local-day aligned sub-windows covering `[start, end)`.
    pub fn split_days(&self) -> Vec<TimeWindow> {
        let tz = self.timezone();
        self.split_at(|cur| {
            let next = cur.date_naive().succ_opt()?;
            Some(local_midnight(tz, next))
        })
    }

    fn split_at(&self, next_boundary: impl Fn(&DateTime<Tz>) -> Option<DateTime<Tz>>) -> Vec<TimeWindow> {
        let end_utc = self.end_utc();
        let mut out = Vec::new();
        let mut piece = self.start;
        let mut cursor = self.start;
        loop {
            match next_boundary(&cursor) {
                Some(next) if next > cursor && next < self.end => {
                    cursor = next;
                    let next_utc = next.with_timezone(&Utc);
                    // A boundary that leaves either side empty on the wire is skipped.
                    if hour_empty(piece.with_timezone(&Utc), next_utc)
                        || hour_empty(next_utc, end_utc)
                    {
                        continue;
                    }
                    out.push(TimeWindow { start: piece, end: next });
                    piece = next;
                }
                _ => {
                    out.push(TimeWindow { start: piece, end: self.end });
                    break;
                }
            }
        }
        out
    }

    /// Split in two halves at an hour-aligned pivot.
    ///
    /// Both halves are non-empty on the wire; returns `None` when the window
    /// spans fewer than two whole hours once truncated.
    pub fn bisect(&self) -> Option<(TimeWindow, TimeWindow)> {
        let lo = truncate_to_hour(self.start_utc());
        let hi = truncate_to_hour(self.end_utc());
        if hi - lo < Duration::hours(2) {
            return None;
        }
        let pivot = truncate_to_hour(lo + (hi - lo) / 2).with_timezone(&self.timezone());
        Some((
            TimeWindow { start: self.start, end: pivot },
            TimeWindow { start: pivot, end: self.end },
        ))
    }

    /// Widen to whole calendar years: `[Jan 1 of start year, Jan 1 after end year)`.
    pub fn year_bounds(&self) -> TimeWindow {
        let tz = self.timezone();
        let first = NaiveDate::from_ymd_opt(self.start.year(), 1, 1).map(|d| local_midnight(tz, d));
        let end_local = self.end.with_timezone(&tz);
        let last = NaiveDate::from_ymd_opt(end_local.year() + 1, 1, 1).map(|d| local_midnight(tz, d));
        match (first, last) {
            (Some(start), Some(end)) => TimeWindow { start, end },
            _ => *self,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Format an instant as `YYYYMMDDHH00` in UTC; minutes and seconds are dropped.
pub fn api_datetime(dt: DateTime<Utc>) -> String {
    dt.format(API_DATETIME_FORMAT).to_string()
}

pub fn truncate_to_hour(dt: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), dt.hour(), 0, 0)
        .single()
        .unwrap_or(dt)
}

fn hour_empty(start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    truncate_to_hour(start) >= truncate_to_hour(end)
}

fn localize(tz: Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| Error::InvalidRequest(format!("{naive} does not exist in {tz}")))
}

/// Local midnight of `date`; falls back to UTC midnight if a DST gap swallows it.
fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(chrono::NaiveTime::default());
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
