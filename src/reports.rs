//! Report catalogue: one builder per report kind plus the per-kind policy the
//! orchestrator follows (window splitting, page ceiling, bisection, truncation).

use crate::area::Area;
use crate::codes::{
    validate_code, validate_one_of, BALANCING_PROCESSES, BUSINESS_TYPES, DOC_STATUSES,
    GENERATION_FORECAST_PROCESSES, LOAD_FORECAST_PROCESSES, MARKET_AGREEMENT_TYPES, PSR_TYPES,
};
use crate::error::Result;
use crate::request::QuerySpec;
use crate::window::{api_datetime, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    DayAheadPrices,
    NetPosition,
    Load,
    LoadForecast,
    GenerationForecast,
    WindAndSolarForecast,
    Generation,
    GenerationPerPlant,
    InstalledGenerationCapacity,
    InstalledGenerationCapacityPerUnit,
    WaterReservoirsAndHydroStorage,
    CrossborderFlows,
    ScheduledExchanges,
    NetTransferCapacity,
    IntradayOfferedCapacity,
    OfferedCapacity,
    ImbalancePrices,
    ImbalanceVolumes,
    ProcuredBalancingCapacity,
    ActivatedBalancingEnergy,
    ContractedReservePrices,
    ContractedReserveAmount,
    UnavailabilityOfGenerationUnits,
    UnavailabilityOfProductionUnits,
    UnavailabilityTransmission,
}

/// How a logical window is cut into independent sub-queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSplit {
    Whole,
    Years,
    Days,
}

/// What the assembled result is truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// The caller's `[start, end]`.
    Window,
    /// The whole calendar years touched by the caller's window.
    ///
    /// Rows may fall outside the requested `[start, end]`: installed capacity
    /// is published once per year, so a window inside a year still returns
    /// that year's figure. Only the installed-capacity reports use this.
    YearBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPolicy {
    pub split: WindowSplit,
    /// Documents per page; `Some` turns on the offset loop.
    pub page_ceiling: Option<u32>,
    /// Halve the window when the provider reports too many documents.
    pub bisect_on_limit: bool,
    pub truncate: Truncation,
}

impl ReportPolicy {
    const YEARLY: Self = Self {
        split: WindowSplit::Years,
        page_ceiling: None,
        bisect_on_limit: false,
        truncate: Truncation::Window,
    };

    pub const fn needs_year_split(&self) -> bool {
        matches!(self.split, WindowSplit::Years)
    }

    const fn paged(ceiling: u32) -> Self {
        Self {
            page_ceiling: Some(ceiling),
            ..Self::YEARLY
        }
    }

    const fn bisecting(split: WindowSplit) -> Self {
        Self {
            split,
            bisect_on_limit: true,
            ..Self::YEARLY
        }
    }
}

impl ReportKind {
    pub const fn policy(self) -> ReportPolicy {
        use ReportKind::*;
        match self {
            GenerationPerPlant => ReportPolicy {
                split: WindowSplit::Days,
                ..ReportPolicy::YEARLY
            },
            InstalledGenerationCapacity | InstalledGenerationCapacityPerUnit => ReportPolicy {
                truncate: Truncation::YearBounds,
                ..ReportPolicy::YEARLY
            },
            WaterReservoirsAndHydroStorage | ProcuredBalancingCapacity => {
                ReportPolicy::bisecting(WindowSplit::Years)
            }
            UnavailabilityTransmission => ReportPolicy::bisecting(WindowSplit::Whole),
            OfferedCapacity | ContractedReservePrices | ContractedReserveAmount => {
                ReportPolicy::paged(100)
            }
            UnavailabilityOfGenerationUnits | UnavailabilityOfProductionUnits => {
                ReportPolicy::paged(200)
            }
            _ => ReportPolicy::YEARLY,
        }
    }

    /// Element holding the point value in this report's documents.
    pub const fn value_element(self) -> &'static str {
        use ReportKind::*;
        match self {
            DayAheadPrices => "price.amount",
            ImbalancePrices => "imbalance_Price.amount",
            ContractedReservePrices | ProcuredBalancingCapacity => "procurement_Price.amount",
            _ => "quantity",
        }
    }

    /// Column label used when a series carries no more specific name.
    pub const fn label(self) -> &'static str {
        use ReportKind::*;
        match self {
            DayAheadPrices => "Day-ahead Price",
            NetPosition => "Net Position",
            Load => "Actual Load",
            LoadForecast => "Forecasted Load",
            GenerationForecast => "Scheduled Generation",
            WindAndSolarForecast | Generation | GenerationPerPlant => "Generation",
            InstalledGenerationCapacity | InstalledGenerationCapacityPerUnit => "Installed Capacity",
            WaterReservoirsAndHydroStorage => "Stored Energy",
            CrossborderFlows => "Flow",
            ScheduledExchanges => "Scheduled Exchange",
            NetTransferCapacity => "Net Transfer Capacity",
            IntradayOfferedCapacity | OfferedCapacity => "Offered Capacity",
            ImbalancePrices => "Imbalance Price",
            ImbalanceVolumes => "Imbalance Volume",
            ProcuredBalancingCapacity => "Procurement Price",
            ActivatedBalancingEnergy => "Activated Energy",
            ContractedReservePrices => "Procurement Price",
            ContractedReserveAmount => "Contracted Reserve",
            UnavailabilityOfGenerationUnits
            | UnavailabilityOfProductionUnits
            | UnavailabilityTransmission => "Available Capacity",
        }
    }
}

/// Forecast horizon of net transfer capacity reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    DayAhead,
    WeekAhead,
    MonthAhead,
    YearAhead,
}

impl Horizon {
    const fn contract_type(self) -> &'static str {
        match self {
            Horizon::DayAhead => "A01",
            Horizon::WeekAhead => "A02",
            Horizon::MonthAhead => "A03",
            Horizon::YearAhead => "A04",
        }
    }
}

/// Optional filters shared by the unavailability reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnavailabilityFilter {
    pub doc_status: Option<String>,
    /// Restrict to documents updated within this window.
    pub updated: Option<TimeWindow>,
}

fn validate_psr(psr_type: Option<&str>) -> Result<()> {
    match psr_type {
        Some(p) => validate_code("psr_type", p, PSR_TYPES),
        None => Ok(()),
    }
}

fn single_area(kind: ReportKind, document_type: &str, area: &Area) -> QuerySpec {
    QuerySpec::new(kind)
        .kw("documentType", document_type)
        .kw("in_Domain", area.code())
}

pub fn day_ahead_prices(area: &Area) -> QuerySpec {
    single_area(ReportKind::DayAheadPrices, "A44", area).kw("out_Domain", area.code())
}

pub fn net_position(area: &Area, dayahead: bool) -> QuerySpec {
    QuerySpec::new(ReportKind::NetPosition)
        .kw("documentType", "A25")
        .kw("businessType", "B09")
        .kw(
            "Contract_MarketAgreement.Type",
            if dayahead { "A01" } else { "A07" },
        )
        .kw("in_Domain", area.code())
        .kw("out_Domain", area.code())
}

pub fn load(area: &Area) -> QuerySpec {
    QuerySpec::new(ReportKind::Load)
        .kw("documentType", "A65")
        .kw("processType", "A16")
        .kw("outBiddingZone_Domain", area.code())
        .kw("out_Domain", area.code())
}

pub fn load_forecast(area: &Area, process_type: &str) -> Result<QuerySpec> {
    validate_one_of("process_type", process_type, LOAD_FORECAST_PROCESSES)?;
    Ok(QuerySpec::new(ReportKind::LoadForecast)
        .kw("documentType", "A65")
        .kw("processType", process_type)
        .kw("outBiddingZone_Domain", area.code()))
}

pub fn generation_forecast(area: &Area, process_type: &str) -> Result<QuerySpec> {
    validate_one_of("process_type", process_type, GENERATION_FORECAST_PROCESSES)?;
    Ok(single_area(ReportKind::GenerationForecast, "A71", area).kw("processType", process_type))
}

pub fn wind_and_solar_forecast(
    area: &Area,
    psr_type: Option<&str>,
    process_type: &str,
) -> Result<QuerySpec> {
    validate_one_of("process_type", process_type, GENERATION_FORECAST_PROCESSES)?;
    validate_psr(psr_type)?;
    Ok(single_area(ReportKind::WindAndSolarForecast, "A69", area)
        .kw("processType", process_type)
        .kw_opt("psrType", psr_type))
}

pub fn generation(area: &Area, psr_type: Option<&str>) -> Result<QuerySpec> {
    validate_psr(psr_type)?;
    Ok(single_area(ReportKind::Generation, "A75", area)
        .kw("processType", "A16")
        .kw_opt("psrType", psr_type))
}

pub fn generation_per_plant(area: &Area, psr_type: Option<&str>) -> Result<QuerySpec> {
    validate_psr(psr_type)?;
    Ok(single_area(ReportKind::GenerationPerPlant, "A73", area)
        .kw("processType", "A16")
        .kw_opt("psrType", psr_type))
}

pub fn installed_generation_capacity(area: &Area, psr_type: Option<&str>) -> Result<QuerySpec> {
    validate_psr(psr_type)?;
    Ok(single_area(ReportKind::InstalledGenerationCapacity, "A68", area)
        .kw("processType", "A33")
        .kw_opt("psrType", psr_type))
}

pub fn installed_generation_capacity_per_unit(
    area: &Area,
    psr_type: Option<&str>,
) -> Result<QuerySpec> {
    validate_psr(psr_type)?;
    Ok(
        single_area(ReportKind::InstalledGenerationCapacityPerUnit, "A71", area)
            .kw("processType", "A33")
            .kw_opt("psrType", psr_type),
    )
}

pub fn aggregate_water_reservoirs_and_hydro_storage(area: &Area) -> QuerySpec {
    single_area(ReportKind::WaterReservoirsAndHydroStorage, "A72", area).kw("processType", "A16")
}

/// Shared shape of the paired-area reports: `in_Domain` is the receiving side.
fn crossborder(kind: ReportKind, document_type: &str, from: &Area, to: &Area) -> QuerySpec {
    QuerySpec::new(kind)
        .kw("documentType", document_type)
        .kw("in_Domain", to.code())
        .kw("out_Domain", from.code())
}

pub fn crossborder_flows(from: &Area, to: &Area) -> QuerySpec {
    crossborder(ReportKind::CrossborderFlows, "A11", from, to)
}

pub fn scheduled_exchanges(from: &Area, to: &Area, dayahead: bool) -> QuerySpec {
    crossborder(ReportKind::ScheduledExchanges, "A09", from, to).kw(
        "contract_MarketAgreement.Type",
        if dayahead { "A01" } else { "A05" },
    )
}

pub fn net_transfer_capacity(from: &Area, to: &Area, horizon: Horizon) -> QuerySpec {
    crossborder(ReportKind::NetTransferCapacity, "A61", from, to)
        .kw("contract_MarketAgreement.Type", horizon.contract_type())
}

pub fn intraday_offered_capacity(from: &Area, to: &Area, implicit: bool) -> QuerySpec {
    crossborder(ReportKind::IntradayOfferedCapacity, "A31", from, to)
        .kw("contract_MarketAgreement.Type", "A07")
        .kw("Auction.Type", if implicit { "A01" } else { "A02" })
}

/// Allocated offered capacity; explicit auctions are published as allocation results.
pub fn offered_capacity(
    from: &Area,
    to: &Area,
    contract_type: &str,
    implicit: bool,
) -> Result<QuerySpec> {
    validate_code("contract_type", contract_type, MARKET_AGREEMENT_TYPES)?;
    let doc = if implicit { "A31" } else { "A25" };
    Ok(crossborder(ReportKind::OfferedCapacity, doc, from, to)
        .kw("contract_MarketAgreement.Type", contract_type)
        .kw("Auction.Type", if implicit { "A01" } else { "A02" })
        .kw_opt("businessType", (!implicit).then_some("B05")))
}

fn control_area(kind: ReportKind, document_type: &str, area: &Area) -> QuerySpec {
    QuerySpec::new(kind)
        .kw("documentType", document_type)
        .kw("controlArea_Domain", area.code())
}

pub fn imbalance_prices(area: &Area, psr_type: Option<&str>) -> Result<QuerySpec> {
    validate_psr(psr_type)?;
    Ok(control_area(ReportKind::ImbalancePrices, "A85", area).kw_opt("psrType", psr_type))
}

pub fn imbalance_volumes(area: &Area, psr_type: Option<&str>) -> Result<QuerySpec> {
    validate_psr(psr_type)?;
    Ok(control_area(ReportKind::ImbalanceVolumes, "A86", area).kw_opt("psrType", psr_type))
}

pub fn procured_balancing_capacity(
    area: &Area,
    process_type: &str,
    market_agreement: Option<&str>,
) -> Result<QuerySpec> {
    validate_one_of("process_type", process_type, BALANCING_PROCESSES)?;
    if let Some(t) = market_agreement {
        validate_code("market_agreement", t, MARKET_AGREEMENT_TYPES)?;
    }
    Ok(QuerySpec::new(ReportKind::ProcuredBalancingCapacity)
        .kw("documentType", "A15")
        .kw("area_Domain", area.code())
        .kw("processType", process_type)
        .kw_opt("type_MarketAgreement.Type", market_agreement))
}

pub fn activated_balancing_energy(
    area: &Area,
    business_type: &str,
    psr_type: Option<&str>,
) -> Result<QuerySpec> {
    validate_code("business_type", business_type, BUSINESS_TYPES)?;
    validate_psr(psr_type)?;
    Ok(control_area(ReportKind::ActivatedBalancingEnergy, "A83", area)
        .kw("businessType", business_type)
        .kw_opt("psrType", psr_type))
}

pub fn contracted_reserve_prices(
    area: &Area,
    market_agreement: &str,
    psr_type: Option<&str>,
) -> Result<QuerySpec> {
    validate_code("market_agreement", market_agreement, MARKET_AGREEMENT_TYPES)?;
    validate_psr(psr_type)?;
    Ok(control_area(ReportKind::ContractedReservePrices, "A89", area)
        .kw("type_MarketAgreement.Type", market_agreement)
        .kw_opt("psrType", psr_type))
}

pub fn contracted_reserve_amount(
    area: &Area,
    market_agreement: &str,
    psr_type: Option<&str>,
) -> Result<QuerySpec> {
    validate_code("market_agreement", market_agreement, MARKET_AGREEMENT_TYPES)?;
    validate_psr(psr_type)?;
    Ok(control_area(ReportKind::ContractedReserveAmount, "A81", area)
        .kw("type_MarketAgreement.Type", market_agreement)
        .kw_opt("psrType", psr_type))
}

fn with_unavailability_filter(spec: QuerySpec, filter: &UnavailabilityFilter) -> Result<QuerySpec> {
    if let Some(status) = &filter.doc_status {
        validate_code("doc_status", status, DOC_STATUSES)?;
    }
    let (update_start, update_end) = match &filter.updated {
        Some(w) => (Some(api_datetime(w.start_utc())), Some(api_datetime(w.end_utc()))),
        None => (None, None),
    };
    Ok(spec
        .kw_opt("docStatus", filter.doc_status.clone())
        .kw_opt("periodStartUpdate", update_start)
        .kw_opt("periodEndUpdate", update_end))
}

fn unavailability(
    kind: ReportKind,
    document_type: &str,
    area: &Area,
    filter: &UnavailabilityFilter,
) -> Result<QuerySpec> {
    let spec = QuerySpec::new(kind)
        .kw("documentType", document_type)
        .kw("biddingZone_domain", area.code());
    with_unavailability_filter(spec, filter)
}

pub fn unavailability_of_generation_units(
    area: &Area,
    filter: &UnavailabilityFilter,
) -> Result<QuerySpec> {
    unavailability(ReportKind::UnavailabilityOfGenerationUnits, "A80", area, filter)
}

pub fn unavailability_of_production_units(
    area: &Area,
    filter: &UnavailabilityFilter,
) -> Result<QuerySpec> {
    unavailability(ReportKind::UnavailabilityOfProductionUnits, "A77", area, filter)
}

pub fn unavailability_transmission(
    from: &Area,
    to: &Area,
    filter: &UnavailabilityFilter,
) -> Result<QuerySpec> {
    let spec = crossborder(ReportKind::UnavailabilityTransmission, "A78", from, to);
    with_unavailability_filter(spec, filter)
}

pub fn withdrawn_unavailability_of_generation_units(area: &Area) -> QuerySpec {
    QuerySpec::new(ReportKind::UnavailabilityOfGenerationUnits)
        .kw("documentType", "A80")
        .kw("biddingZone_domain", area.code())
        .kw("docStatus", "A13")
}
