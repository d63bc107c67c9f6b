//! Turns one logical query into the physical requests the provider accepts.
//!
//! Stages run in a fixed order, selected by the report's [`ReportPolicy`]:
//! calendar splitting (years or days), then per sub-window either the offset
//! loop (reports with a page ceiling) or a single request that may be bisected
//! when the provider reports too many documents. Sub-windows the provider
//! reports as empty are skipped; the query only fails with `NoMatchingData`
//! when every one of them was empty. Any other failure aborts immediately.

use chrono_tz::Tz;
use tracing::debug;

use crate::assemble::assemble;
use crate::error::{Error, Result};
use crate::parse::ResponseParser;
use crate::reports::{ReportPolicy, WindowSplit};
use crate::request::{PageRequest, QuerySpec, RawResult};
use crate::table::Table;
use crate::transport::{Outcome, RawProvider};
use crate::window::TimeWindow;

pub struct Orchestrator<'a, P: ?Sized, R: ?Sized> {
    provider: &'a P,
    parser: &'a R,
}

impl<'a, P, R> Orchestrator<'a, P, R>
where
    P: RawProvider + ?Sized,
    R: ResponseParser + ?Sized,
{
    pub fn new(provider: &'a P, parser: &'a R) -> Self {
        Self { provider, parser }
    }

    /// Fetch, merge, localize to `tz` and truncate per the report's policy.
    pub fn run(&self, spec: &QuerySpec, window: &TimeWindow, tz: Tz) -> Result<Table> {
        let fragments = self.fragments(spec, window)?;
        Ok(assemble(fragments, tz, window, spec.policy().truncate))
    }

    /// Parsed fragments of every non-empty sub-window, in request order.
    pub fn fragments(&self, spec: &QuerySpec, window: &TimeWindow) -> Result<Vec<Table>> {
        let policy = spec.policy();
        let parts = match policy.split {
            WindowSplit::Whole => vec![*window],
            WindowSplit::Years => window.split_years(),
            WindowSplit::Days => window.split_days(),
        };
        debug!(kind = ?spec.kind(), %window, sub_windows = parts.len(), "logical query");

        let query = Query {
            spec,
            policy,
            provider: self.provider,
            parser: self.parser,
        };
        let mut fragments = Vec::new();
        let mut any_data = false;
        for part in parts {
            match query.sub_window(part) {
                Ok(mut found) => {
                    any_data = true;
                    fragments.append(&mut found);
                }
                Err(Error::NoMatchingData) => debug!(window = %part, "no matching data, skipping"),
                Err(e) => return Err(e),
            }
        }
        if !any_data {
            return Err(Error::NoMatchingData);
        }
        Ok(fragments)
    }
}

struct Query<'q, P: ?Sized, R: ?Sized> {
    spec: &'q QuerySpec,
    policy: ReportPolicy,
    provider: &'q P,
    parser: &'q R,
}

impl<P, R> Query<'_, P, R>
where
    P: RawProvider + ?Sized,
    R: ResponseParser + ?Sized,
{
    fn sub_window(&self, window: TimeWindow) -> Result<Vec<Table>> {
        match self.policy.page_ceiling {
            Some(ceiling) => self.paged(window, ceiling),
            None => self.single(window),
        }
    }

    fn parse(&self, raw: &RawResult) -> Result<Table> {
        self.parser.parse(self.spec.kind(), raw)
    }

    /// Offset loop: a document-count refusal at the known ceiling means
    /// "ask for the next page of the same window".
    fn paged(&self, window: TimeWindow, ceiling: u32) -> Result<Vec<Table>> {
        let mut offset = 0u32;
        loop {
            let page = PageRequest::new(self.spec, window).with_offset(offset);
            match self.provider.send(&page) {
                Outcome::RateLimited { requested, allowed } if allowed == u64::from(ceiling) => {
                    debug!(%window, offset, requested, allowed, "page full, advancing offset");
                    offset = offset.checked_add(ceiling).ok_or(Error::Pagination {
                        requested: Some(requested),
                        allowed: Some(allowed),
                    })?;
                }
                outcome => {
                    let raw = outcome.into_result()?;
                    return Ok(vec![self.parse(&raw)?]);
                }
            }
        }
    }

    fn single(&self, window: TimeWindow) -> Result<Vec<Table>> {
        match self.provider.send(&PageRequest::new(self.spec, window)) {
            Outcome::RateLimited { requested, allowed } if self.policy.bisect_on_limit => {
                self.bisect(window, requested, allowed)
            }
            outcome => {
                let raw = outcome.into_result()?;
                Ok(vec![self.parse(&raw)?])
            }
        }
    }

    fn bisect(&self, window: TimeWindow, requested: u64, allowed: u64) -> Result<Vec<Table>> {
        let Some((left, right)) = window.bisect() else {
            return Err(Error::Pagination {
                requested: Some(requested),
                allowed: Some(allowed),
            });
        };
        debug!(%window, requested, allowed, "too many documents, halving window");
        let mut out = Vec::new();
        let mut any_data = false;
        for half in [left, right] {
            match self.single(half) {
                Ok(mut found) => {
                    any_data = true;
                    out.append(&mut found);
                }
                Err(Error::NoMatchingData) => debug!(window = %half, "no matching data in half"),
                Err(e) => return Err(e),
            }
        }
        if !any_data {
            return Err(Error::NoMatchingData);
        }
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::area::{Area, AreaRegistry};
    use crate::error::ParameterKind;
    use crate::reports::{self, ReportKind};
    use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
    use chrono_tz::Europe::Brussels;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Plays back outcomes in order and records what was asked for.
    #[derive(Default)]
    pub(crate) struct Scripted {
        pub script: RefCell<VecDeque<Outcome>>,
        pub seen: RefCell<Vec<(TimeWindow, Option<u32>)>>,
    }

    impl Scripted {
        pub fn new(script: Vec<Outcome>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                seen: RefCell::new(Vec::new()),
            }
        }

        pub fn offsets(&self) -> Vec<Option<u32>> {
            self.seen.borrow().iter().map(|(_, o)| *o).collect()
        }

        pub fn windows(&self) -> Vec<TimeWindow> {
            self.seen.borrow().iter().map(|(w, _)| *w).collect()
        }
    }

    impl RawProvider for Scripted {
        fn send(&self, page: &PageRequest<'_>) -> Outcome {
            self.seen.borrow_mut().push((page.window, page.offset));
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or(Outcome::FatalFailure {
                    status: None,
                    body: "script exhausted".into(),
                })
        }
    }

    /// Bodies are lines of `<rfc3339> <value>`, stored under the report label.
    pub(crate) struct LineParser;

    impl ResponseParser for LineParser {
        fn parse(&self, kind: ReportKind, raw: &RawResult) -> Result<Table> {
            let mut t = Table::new(chrono_tz::UTC);
            for line in raw.text()?.lines().filter(|l| !l.trim().is_empty()) {
                let (ts, v) = line
                    .split_once(' ')
                    .ok_or_else(|| Error::Parse(line.to_string()))?;
                let at = DateTime::parse_from_rfc3339(ts)
                    .map_err(|e| Error::Parse(e.to_string()))?
                    .with_timezone(&Utc);
                let v = v.parse().map_err(|_| Error::Parse(v.to_string()))?;
                t.set(at, kind.label(), v);
            }
            Ok(t)
        }
    }

    pub(crate) fn ok(lines: &[(&str, f64)]) -> Outcome {
        let body: String = lines.iter().map(|(t, v)| format!("{t} {v}\n")).collect();
        Outcome::Success(RawResult::xml(body))
    }

    fn be() -> Area {
        AreaRegistry::builtin().resolve("BE").unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn limited(requested: u64, allowed: u64) -> Outcome {
        Outcome::RateLimited { requested, allowed }
    }

    #[test]
    fn one_year_window_is_one_request() {
        let provider = Scripted::new(vec![ok(&[("2023-03-01T00:00:00Z", 1.0)])]);
        let spec = reports::day_ahead_prices(&be());
        let window = TimeWindow::days(Brussels, day(2023, 1, 1), day(2024, 1, 1)).unwrap();
        let t = Orchestrator::new(&provider, &LineParser)
            .run(&spec, &window, Brussels)
            .unwrap();
        assert_eq!(provider.seen.borrow().len(), 1);
        assert_eq!(provider.offsets(), vec![None]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn multi_year_window_is_calendar_aligned() {
        let provider = Scripted::new((0..4).map(|_| ok(&[])).collect());
        let spec = reports::load(&be());
        let window = TimeWindow::days(Brussels, day(2021, 6, 1), day(2024, 3, 1)).unwrap();
        Orchestrator::new(&provider, &LineParser)
            .fragments(&spec, &window)
            .unwrap();
        let windows = provider.windows();
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].start(), window.start());
        assert_eq!(windows[3].end(), window.end());
        for w in &windows[1..] {
            let s = w.start();
            assert_eq!((s.month(), s.day(), s.hour()), (1, 1, 0));
        }
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
    }

    #[test]
    fn offset_pagination_advances_by_the_ceiling() {
        let provider = Scripted::new(vec![
            limited(250, 100),
            limited(150, 100),
            ok(&[("2024-01-01T00:00:00Z", 5.0), ("2024-01-01T01:00:00Z", 6.0)]),
        ]);
        let spec = reports::contracted_reserve_prices(&be(), "A01", None).unwrap();
        let window = TimeWindow::days(Brussels, day(2024, 1, 1), day(2024, 1, 2)).unwrap();
        let t = Orchestrator::new(&provider, &LineParser)
            .run(&spec, &window, Brussels)
            .unwrap();
        assert_eq!(provider.offsets(), vec![Some(0), Some(100), Some(200)]);
        assert!(provider.windows().iter().all(|w| *w == window));
        assert_eq!(t.column("Procurement Price").unwrap(), vec![Some(5.0), Some(6.0)]);
    }

    #[test]
    fn unrecognised_allowed_count_is_a_pagination_error() {
        let provider = Scripted::new(vec![limited(300, 50)]);
        let spec = reports::contracted_reserve_amount(&be(), "A01", None).unwrap();
        let window = TimeWindow::days(Brussels, day(2024, 1, 1), day(2024, 1, 2)).unwrap();
        let err = Orchestrator::new(&provider, &LineParser)
            .run(&spec, &window, Brussels)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Pagination {
                requested: Some(300),
                allowed: Some(50)
            }
        ));
        assert_eq!(provider.seen.borrow().len(), 1);
    }

    #[test]
    fn limit_without_ceiling_or_bisection_is_fatal() {
        let provider = Scripted::new(vec![limited(150, 100)]);
        let spec = reports::day_ahead_prices(&be());
        let window = TimeWindow::days(Brussels, day(2024, 1, 1), day(2024, 1, 2)).unwrap();
        let err = Orchestrator::new(&provider, &LineParser)
            .fragments(&spec, &window)
            .unwrap_err();
        assert!(matches!(err, Error::Pagination { .. }));
    }

    #[test]
    fn all_years_empty_is_no_matching_data() {
        let provider = Scripted::new(vec![Outcome::Empty, Outcome::Empty, Outcome::Empty]);
        let spec = reports::load(&be());
        let window = TimeWindow::days(Brussels, day(2021, 6, 1), day(2023, 6, 1)).unwrap();
        let err = Orchestrator::new(&provider, &LineParser)
            .run(&spec, &window, Brussels)
            .unwrap_err();
        assert!(err.is_no_data());
        assert_eq!(provider.seen.borrow().len(), 3);
    }

    #[test]
    fn empty_years_contribute_no_rows() {
        let provider = Scripted::new(vec![
            Outcome::Empty,
            ok(&[("2022-05-01T00:00:00Z", 2.0)]),
            Outcome::Empty,
        ]);
        let spec = reports::load(&be());
        let window = TimeWindow::days(Brussels, day(2021, 6, 1), day(2023, 6, 1)).unwrap();
        let t = Orchestrator::new(&provider, &LineParser)
            .run(&spec, &window, Brussels)
            .unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.timezone(), Brussels);
    }

    #[test]
    fn failure_in_one_year_aborts_the_rest() {
        let provider = Scripted::new(vec![
            ok(&[("2021-07-01T00:00:00Z", 1.0)]),
            Outcome::InvalidParameter {
                kind: ParameterKind::PsrType,
                message: "B20 is not valid for this area".into(),
            },
            ok(&[]),
        ]);
        let spec = reports::generation(&be(), Some("B20")).unwrap();
        let window = TimeWindow::days(Brussels, day(2021, 6, 1), day(2023, 6, 1)).unwrap();
        let err = Orchestrator::new(&provider, &LineParser)
            .run(&spec, &window, Brussels)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter {
                kind: ParameterKind::PsrType,
                ..
            }
        ));
        assert_eq!(provider.seen.borrow().len(), 2);
    }

    #[test]
    fn bisection_halves_until_accepted() {
        let provider = Scripted::new(vec![
            limited(120, 100),
            ok(&[("2024-01-01T06:00:00Z", 1.0)]),
            ok(&[("2024-01-02T06:00:00Z", 2.0)]),
        ]);
        let spec = reports::aggregate_water_reservoirs_and_hydro_storage(&be());
        let window = TimeWindow::utc(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let t = Orchestrator::new(&provider, &LineParser)
            .run(&spec, &window, Brussels)
            .unwrap();
        let windows = provider.windows();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].end_utc(), Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(windows[2].start(), windows[1].end());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn bisection_stops_at_a_single_hour() {
        let provider = Scripted::new(vec![limited(120, 100)]);
        let spec = reports::procured_balancing_capacity(&be(), "A51", None).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let window = TimeWindow::utc(start, start + chrono::Duration::hours(1)).unwrap();
        let err = Orchestrator::new(&provider, &LineParser)
            .fragments(&spec, &window)
            .unwrap_err();
        assert!(matches!(err, Error::Pagination { .. }));
    }

    #[test]
    fn generation_per_plant_is_fetched_per_day() {
        let provider = Scripted::new((0..3).map(|_| ok(&[])).collect());
        let spec = reports::generation_per_plant(&be(), None).unwrap();
        let window = TimeWindow::days(Brussels, day(2024, 3, 30), day(2024, 4, 2)).unwrap();
        Orchestrator::new(&provider, &LineParser)
            .fragments(&spec, &window)
            .unwrap();
        let windows = provider.windows();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].duration(), chrono::Duration::hours(23));
    }

    #[test]
    fn rerunning_against_the_same_provider_is_identical() {
        let script = || {
            vec![
                Outcome::Empty,
                ok(&[("2022-05-01T00:00:00Z", 2.0), ("2022-05-01T01:00:00Z", 3.0)]),
                ok(&[("2023-01-01T00:00:00Z", 4.0)]),
            ]
        };
        let spec = reports::load(&be());
        let window = TimeWindow::days(Brussels, day(2021, 6, 1), day(2023, 6, 1)).unwrap();
        let run = |p: &Scripted| {
            Orchestrator::new(p, &LineParser)
                .run(&spec, &window, Brussels)
                .unwrap()
                .to_json()
                .unwrap()
        };
        assert_eq!(run(&Scripted::new(script())), run(&Scripted::new(script())));
    }
}
