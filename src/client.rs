use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use tracing::debug;
use url::Url;

use crate::area::{Area, AreaRef, AreaRegistry};
use crate::assemble::{combine, JoinPolicy};
use crate::error::{Error, Result as EResult};
use crate::orchestrator::Orchestrator;
use crate::parse::{DocumentParser, ResponseParser};
use crate::reports::{self, Horizon, UnavailabilityFilter};
use crate::request::QuerySpec;
use crate::sources::{endpoint_to_url, is_http_url};
use crate::table::Table;
use crate::transport::{Backoff, RawClient, RawProvider, RetryPolicy};
use crate::window::TimeWindow;

pub type Result = EResult<Table>;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: String,
    /// Full URL, or one of the known aliases (`entsoe`, `legacy`, `iop`).
    pub endpoint: String,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub backoff: Backoff,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "entsoe".to_string(),
            retry_count: 1,
            retry_delay: Duration::ZERO,
            backoff: Backoff::Fixed,
            timeout: None,
            proxy: None,
            user_agent: "entsoe-rs/0.1".to_string(),
        }
    }
}

impl ClientOptions {
    /// Read options from `ENTSOE_*` environment variables.
    ///
    /// `ENTSOE_API_KEY` is required; `ENTSOE_ENDPOINT`, `ENTSOE_RETRY_COUNT`,
    /// `ENTSOE_RETRY_DELAY_SECS`, `ENTSOE_TIMEOUT_SECS` and `ENTSOE_PROXY` are
    /// optional.
    pub fn from_env() -> EResult<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EResult<Self> {
        let api_key = lookup("ENTSOE_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidRequest("ENTSOE_API_KEY is not set".into()))?;
        let number = |key: &str| -> EResult<Option<u64>> {
            lookup(key)
                .map(|v| {
                    v.trim()
                        .parse()
                        .map_err(|_| Error::InvalidRequest(format!("{key} must be a whole number: {v}")))
                })
                .transpose()
        };

        let mut opts = Self {
            api_key,
            ..Self::default()
        };
        if let Some(endpoint) = lookup("ENTSOE_ENDPOINT") {
            opts.endpoint = endpoint;
        }
        if let Some(n) = number("ENTSOE_RETRY_COUNT")? {
            opts.retry_count = u32::try_from(n)
                .map_err(|_| Error::InvalidRequest(format!("ENTSOE_RETRY_COUNT too large: {n}")))?;
        }
        if let Some(secs) = number("ENTSOE_RETRY_DELAY_SECS")? {
            opts.retry_delay = Duration::from_secs(secs);
        }
        opts.timeout = number("ENTSOE_TIMEOUT_SECS")?.map(Duration::from_secs);
        opts.proxy = lookup("ENTSOE_PROXY").filter(|p| !p.is_empty());
        Ok(opts)
    }

    pub(crate) fn endpoint_url(&self) -> EResult<Url> {
        let raw = if is_http_url(&self.endpoint) {
            self.endpoint.as_str()
        } else {
            endpoint_to_url(&self.endpoint)
                .ok_or_else(|| Error::InvalidRequest(format!("unknown endpoint: {}", self.endpoint)))?
        };
        Ok(Url::parse(raw)?)
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retry_count: self.retry_count,
            delay: self.retry_delay,
            backoff: self.backoff,
        }
    }
}

/// Typed access to every report, returning localized, window-exact tables.
///
/// Composes a [`RawProvider`] (how pages are fetched), a [`ResponseParser`]
/// (how payloads become tables) and the area registry.
#[derive(Debug, Clone)]
pub struct Client<P = RawClient, R = DocumentParser> {
    raw: P,
    parser: R,
    registry: Arc<AreaRegistry>,
}

impl Client {
    pub fn new(opts: ClientOptions) -> EResult<Self> {
        Ok(Self::with_provider(RawClient::new(&opts)?, DocumentParser))
    }

    pub fn from_env() -> EResult<Self> {
        Self::new(ClientOptions::from_env()?)
    }
}

impl<P: RawProvider, R: ResponseParser> Client<P, R> {
    pub fn with_provider(raw: P, parser: R) -> Self {
        Self {
            raw,
            parser,
            registry: AreaRegistry::builtin(),
        }
    }

    pub fn raw(&self) -> &P {
        &self.raw
    }

    pub fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    pub fn resolve<'a>(&self, area: impl Into<AreaRef<'a>>) -> EResult<Area> {
        self.registry.resolve(area)
    }

    fn pair<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
    ) -> EResult<(Area, Area)> {
        Ok((self.resolve(from)?, self.resolve(to)?))
    }

    /// Run any prepared query through splitting, paging and assembly.
    pub fn query(&self, spec: &QuerySpec, window: &TimeWindow, tz: Tz) -> Result {
        Orchestrator::new(&self.raw, &self.parser).run(spec, window, tz)
    }

    pub fn day_ahead_prices<'a>(&self, area: impl Into<AreaRef<'a>>, window: &TimeWindow) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::day_ahead_prices(&area), window, area.tz())
    }

    pub fn net_position<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        dayahead: bool,
    ) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::net_position(&area, dayahead), window, area.tz())
    }

    pub fn load<'a>(&self, area: impl Into<AreaRef<'a>>, window: &TimeWindow) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::load(&area), window, area.tz())
    }

    pub fn load_forecast<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        process_type: &str,
    ) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::load_forecast(&area, process_type)?, window, area.tz())
    }

    /// Day-ahead forecast next to the realised load, on common timestamps only.
    pub fn load_and_forecast<'a>(&self, area: impl Into<AreaRef<'a>>, window: &TimeWindow) -> Result {
        let area = self.resolve(area)?;
        let forecast = self.load_forecast(area, window, "A01")?;
        let actual = self.load(area, window)?;
        Ok(combine(forecast, actual, JoinPolicy::Inner))
    }

    pub fn generation_forecast<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        process_type: &str,
    ) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::generation_forecast(&area, process_type)?, window, area.tz())
    }

    pub fn wind_and_solar_forecast<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        psr_type: Option<&str>,
        process_type: &str,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::wind_and_solar_forecast(&area, psr_type, process_type)?;
        self.query(&spec, window, area.tz())
    }

    /// Actual generation per production type; `nett` folds consumption
    /// columns into signed production columns.
    pub fn generation<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        psr_type: Option<&str>,
        nett: bool,
    ) -> Result {
        let area = self.resolve(area)?;
        let table = self.query(&reports::generation(&area, psr_type)?, window, area.tz())?;
        Ok(if nett { table.nett() } else { table })
    }

    pub fn generation_per_plant<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::generation_per_plant(&area, psr_type)?, window, area.tz())
    }

    /// Yearly figures; the result covers every calendar year the window
    /// touches, not just `window` itself.
    pub fn installed_generation_capacity<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::installed_generation_capacity(&area, psr_type)?;
        self.query(&spec, window, area.tz())
    }

    pub fn installed_generation_capacity_per_unit<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::installed_generation_capacity_per_unit(&area, psr_type)?;
        self.query(&spec, window, area.tz())
    }

    pub fn aggregate_water_reservoirs_and_hydro_storage<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::aggregate_water_reservoirs_and_hydro_storage(&area);
        self.query(&spec, window, area.tz())
    }

    /// Physical flows from `from` into `to`, in the timezone of `from`.
    pub fn crossborder_flows<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
    ) -> Result {
        let (from, to) = self.pair(from, to)?;
        self.query(&reports::crossborder_flows(&from, &to), window, from.tz())
    }

    pub fn scheduled_exchanges<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
        dayahead: bool,
    ) -> Result {
        let (from, to) = self.pair(from, to)?;
        self.query(&reports::scheduled_exchanges(&from, &to, dayahead), window, from.tz())
    }

    pub fn net_transfer_capacity<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
        horizon: Horizon,
    ) -> Result {
        let (from, to) = self.pair(from, to)?;
        self.query(&reports::net_transfer_capacity(&from, &to, horizon), window, from.tz())
    }

    pub fn net_transfer_capacity_dayahead<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
    ) -> Result {
        self.net_transfer_capacity(from, to, window, Horizon::DayAhead)
    }

    pub fn net_transfer_capacity_weekahead<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
    ) -> Result {
        self.net_transfer_capacity(from, to, window, Horizon::WeekAhead)
    }

    pub fn net_transfer_capacity_monthahead<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
    ) -> Result {
        self.net_transfer_capacity(from, to, window, Horizon::MonthAhead)
    }

    pub fn net_transfer_capacity_yearahead<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
    ) -> Result {
        self.net_transfer_capacity(from, to, window, Horizon::YearAhead)
    }

    pub fn intraday_offered_capacity<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
        implicit: bool,
    ) -> Result {
        let (from, to) = self.pair(from, to)?;
        let spec = reports::intraday_offered_capacity(&from, &to, implicit);
        self.query(&spec, window, from.tz())
    }

    pub fn offered_capacity<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
        contract_type: &str,
        implicit: bool,
    ) -> Result {
        let (from, to) = self.pair(from, to)?;
        let spec = reports::offered_capacity(&from, &to, contract_type, implicit)?;
        self.query(&spec, window, from.tz())
    }

    pub fn imbalance_prices<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::imbalance_prices(&area, psr_type)?, window, area.tz())
    }

    pub fn imbalance_volumes<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        self.query(&reports::imbalance_volumes(&area, psr_type)?, window, area.tz())
    }

    pub fn procured_balancing_capacity<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        process_type: &str,
        market_agreement: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::procured_balancing_capacity(&area, process_type, market_agreement)?;
        self.query(&spec, window, area.tz())
    }

    pub fn activated_balancing_energy<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        business_type: &str,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::activated_balancing_energy(&area, business_type, psr_type)?;
        self.query(&spec, window, area.tz())
    }

    pub fn contracted_reserve_prices<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        market_agreement: &str,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::contracted_reserve_prices(&area, market_agreement, psr_type)?;
        self.query(&spec, window, area.tz())
    }

    pub fn contracted_reserve_amount<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        market_agreement: &str,
        psr_type: Option<&str>,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::contracted_reserve_amount(&area, market_agreement, psr_type)?;
        self.query(&spec, window, area.tz())
    }

    pub fn unavailability_of_generation_units<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        filter: &UnavailabilityFilter,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::unavailability_of_generation_units(&area, filter)?;
        self.query(&spec, window, area.tz())
    }

    pub fn unavailability_of_production_units<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
        filter: &UnavailabilityFilter,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::unavailability_of_production_units(&area, filter)?;
        self.query(&spec, window, area.tz())
    }

    pub fn unavailability_transmission<'a, 'b>(
        &self,
        from: impl Into<AreaRef<'a>>,
        to: impl Into<AreaRef<'b>>,
        window: &TimeWindow,
        filter: &UnavailabilityFilter,
    ) -> Result {
        let (from, to) = self.pair(from, to)?;
        let spec = reports::unavailability_transmission(&from, &to, filter)?;
        self.query(&spec, window, from.tz())
    }

    pub fn withdrawn_unavailability_of_generation_units<'a>(
        &self,
        area: impl Into<AreaRef<'a>>,
        window: &TimeWindow,
    ) -> Result {
        let area = self.resolve(area)?;
        let spec = reports::withdrawn_unavailability_of_generation_units(&area);
        self.query(&spec, window, area.tz())
    }

    /// Flows into `area` from each neighbour, one column per neighbour.
    ///
    /// Neighbours without data are skipped, as are columns that are zero
    /// throughout.
    pub fn import<'a>(&self, area: impl Into<AreaRef<'a>>, window: &TimeWindow) -> Result {
        let area = self.resolve(area)?;
        let mut out = Table::new(area.tz());
        let mut any_data = false;
        for neighbour in self.registry.neighbours(&area) {
            let mut flows = match self.crossborder_flows(neighbour, area, window) {
                Ok(t) => t,
                Err(Error::NoMatchingData) => {
                    debug!(from = %neighbour, to = %area, "no flows, skipping neighbour");
                    continue;
                }
                Err(e) => return Err(e),
            };
            any_data = true;
            for column in flows.columns().to_vec() {
                flows.rename_column(&column, neighbour.name());
            }
            out.merge(flows);
        }
        if !any_data {
            return Err(Error::NoMatchingData);
        }
        Ok(out.drop_zero_columns())
    }

    /// Nett generation and imports side by side, forward-filled onto a
    /// common index.
    pub fn generation_import<'a>(&self, area: impl Into<AreaRef<'a>>, window: &TimeWindow) -> Result {
        let area = self.resolve(area)?;
        let generation = self
            .generation(area, window, None, true)?
            .drop_zero_columns()
            .prefix_columns("Generation/");
        let imports = self.import(area, window)?.prefix_columns("Import/");
        Ok(combine(generation, imports, JoinPolicy::ForwardFillOuter)
            .truncate(window.start_utc(), window.end_utc()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::tests::{ok, LineParser, Scripted};
    use crate::transport::Outcome;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Europe::{Brussels, London, Paris};
    use std::collections::HashMap;

    fn client(script: Vec<Outcome>) -> Client<Scripted, LineParser> {
        Client::with_provider(Scripted::new(script), LineParser)
    }

    fn jan(d0: u32, d1: u32) -> TimeWindow {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        TimeWindow::days(Brussels, day(d0), day(d1)).unwrap()
    }

    #[test]
    fn options_from_environment() {
        let vars: HashMap<&str, &str> = [
            ("ENTSOE_API_KEY", "abc"),
            ("ENTSOE_ENDPOINT", "iop"),
            ("ENTSOE_RETRY_COUNT", "3"),
            ("ENTSOE_RETRY_DELAY_SECS", "2"),
            ("ENTSOE_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();
        let opts = ClientOptions::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(opts.api_key, "abc");
        assert_eq!(opts.retry_count, 3);
        assert_eq!(opts.retry_delay, Duration::from_secs(2));
        assert_eq!(opts.timeout, Some(Duration::from_secs(30)));
        assert_eq!(opts.proxy, None);
        assert_eq!(
            opts.endpoint_url().unwrap().as_str(),
            "https://iop-transparency.entsoe.eu/api"
        );

        assert!(ClientOptions::from_lookup(|_| None).is_err());
        let bad = ClientOptions::from_lookup(|k| match k {
            "ENTSOE_API_KEY" => Some("abc".into()),
            "ENTSOE_RETRY_COUNT" => Some("many".into()),
            _ => None,
        });
        assert!(matches!(bad, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn default_options_point_at_production() {
        let opts = ClientOptions::default();
        assert_eq!(opts.endpoint_url().unwrap().host_str(), Some("web-api.tp.entsoe.eu"));
        assert_eq!(opts.retry_policy(), RetryPolicy::default());
        let custom = ClientOptions {
            endpoint: "nowhere".into(),
            ..ClientOptions::default()
        };
        assert!(custom.endpoint_url().is_err());
    }

    #[test]
    fn unknown_area_fails_before_any_request() {
        let c = client(vec![]);
        let err = c.day_ahead_prices("XX", &jan(1, 2)).unwrap_err();
        assert!(matches!(err, Error::UnknownArea(ref a) if a == "XX"));
        assert!(c.raw().seen.borrow().is_empty());
    }

    #[test]
    fn invalid_process_type_fails_before_any_request() {
        let c = client(vec![]);
        let err = c
            .procured_balancing_capacity("BE", &jan(1, 2), "A16", None)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid request: process_type not in {A51, A47}");
        assert!(c.raw().seen.borrow().is_empty());
    }

    #[test]
    fn results_are_localized_to_the_area() {
        let c = client(vec![ok(&[("2024-01-01T12:00:00Z", 1.0)])]);
        let t = c.day_ahead_prices("FR", &jan(1, 2)).unwrap();
        assert_eq!(t.timezone(), Paris);

        let c = client(vec![ok(&[("2024-01-01T12:00:00Z", 1.0)])]);
        let t = c.crossborder_flows("GB", "BE", &jan(1, 2)).unwrap();
        assert_eq!(t.timezone(), London);
    }

    #[test]
    fn load_and_forecast_keeps_common_timestamps() {
        let c = client(vec![
            ok(&[
                ("2024-01-01T00:00:00Z", 10.0),
                ("2024-01-01T01:00:00Z", 11.0),
                ("2024-01-01T02:00:00Z", 12.0),
            ]),
            ok(&[
                ("2024-01-01T01:00:00Z", 10.5),
                ("2024-01-01T02:00:00Z", 11.5),
                ("2024-01-01T03:00:00Z", 12.5),
            ]),
        ]);
        let t = c.load_and_forecast("BE", &jan(1, 2)).unwrap();
        assert_eq!(t.columns(), ["Forecasted Load", "Actual Load"]);
        assert_eq!(t.len(), 2);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        assert_eq!(t.get(at, "Actual Load"), Some(11.5));
    }

    #[test]
    fn import_skips_empty_neighbours_and_zero_columns() {
        // BE borders FR, DE_LU, NL and GB, queried in that order.
        let c = client(vec![
            ok(&[("2024-01-01T00:00:00Z", 100.0)]),
            Outcome::Empty,
            ok(&[("2024-01-01T00:00:00Z", 0.0), ("2024-01-01T01:00:00Z", 0.0)]),
            ok(&[("2024-01-01T00:00:00Z", 40.0), ("2024-01-01T01:00:00Z", 0.0)]),
        ]);
        let t = c.import("BE", &jan(1, 2)).unwrap();
        assert_eq!(c.raw().seen.borrow().len(), 4);
        assert_eq!(t.columns(), ["FR", "GB"]);
        assert_eq!(t.timezone(), Brussels);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        assert_eq!(t.get(at, "FR"), None);
        assert_eq!(t.get(at, "GB"), Some(0.0));
    }

    #[test]
    fn import_with_no_data_anywhere() {
        let c = client(vec![Outcome::Empty; 4]);
        assert!(c.import("BE", &jan(1, 2)).unwrap_err().is_no_data());
    }

    #[test]
    fn import_aborts_on_real_failures() {
        let c = client(vec![
            ok(&[]),
            Outcome::FatalFailure {
                status: Some(401),
                body: "denied".into(),
            },
        ]);
        let err = c.import("BE", &jan(1, 2)).unwrap_err();
        assert!(matches!(err, Error::FatalTransport { status: Some(401), .. }));
        assert_eq!(c.raw().seen.borrow().len(), 2);
    }

    #[test]
    fn generation_import_forward_fills_imports() {
        let c = client(vec![
            ok(&[
                ("2024-01-01T00:00:00Z", 500.0),
                ("2024-01-01T00:15:00Z", 510.0),
                ("2024-01-01T00:30:00Z", 520.0),
            ]),
            ok(&[("2024-01-01T00:00:00Z", 30.0)]),
            Outcome::Empty,
            Outcome::Empty,
            Outcome::Empty,
        ]);
        let t = c.generation_import("BE", &jan(1, 2)).unwrap();
        assert_eq!(t.columns(), ["Generation/Generation", "Import/FR"]);
        assert_eq!(t.column("Import/FR").unwrap(), vec![Some(30.0); 3]);
    }
}
