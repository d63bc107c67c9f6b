//! Provider code lists used for validation and column labels.

use crate::error::{Error, Result};

pub const PSR_TYPES: &[(&str, &str)] = &[
    ("A03", "Mixed"),
    ("A04", "Generation"),
    ("A05", "Load"),
    ("B01", "Biomass"),
    ("B02", "Fossil Brown coal/Lignite"),
    ("B03", "Fossil Coal-derived gas"),
    ("B04", "Fossil Gas"),
    ("B05", "Fossil Hard coal"),
    ("B06", "Fossil Oil"),
    ("B07", "Fossil Oil shale"),
    ("B08", "Fossil Peat"),
    ("B09", "Geothermal"),
    ("B10", "Hydro Pumped Storage"),
    ("B11", "Hydro Run-of-river and poundage"),
    ("B12", "Hydro Water Reservoir"),
    ("B13", "Marine"),
    ("B14", "Nuclear"),
    ("B15", "Other renewable"),
    ("B16", "Solar"),
    ("B17", "Waste"),
    ("B18", "Wind Offshore"),
    ("B19", "Wind Onshore"),
    ("B20", "Other"),
    ("B21", "AC Link"),
    ("B22", "DC Link"),
    ("B23", "Substation"),
    ("B24", "Transformer"),
    ("B25", "Energy storage"),
];

pub const MARKET_AGREEMENT_TYPES: &[(&str, &str)] = &[
    ("A01", "Daily"),
    ("A02", "Weekly"),
    ("A03", "Monthly"),
    ("A04", "Yearly"),
    ("A05", "Total"),
    ("A06", "Long term"),
    ("A07", "Intraday"),
    ("A13", "Hourly"),
];

pub const BUSINESS_TYPES: &[(&str, &str)] = &[
    ("A25", "General Capacity Information"),
    ("A29", "Already allocated capacity (AAC)"),
    ("A43", "Requested capacity (without price)"),
    ("A46", "System Operator redispatching"),
    ("A53", "Planned maintenance"),
    ("A54", "Unplanned outage"),
    ("A85", "Internal redispatch"),
    ("A95", "Frequency containment reserve"),
    ("A96", "Automatic frequency restoration reserve"),
    ("A97", "Manual frequency restoration reserve"),
    ("A98", "Replacement reserve"),
    ("B01", "Interconnector network evolution"),
    ("B02", "Interconnector network dismantling"),
    ("B03", "Counter trade"),
    ("B04", "Congestion costs"),
    ("B05", "Capacity allocated (including price)"),
    ("B07", "Auction revenue"),
    ("B08", "Total nominated capacity"),
    ("B09", "Net position"),
    ("B10", "Congestion income"),
    ("B11", "Production unit"),
    ("B33", "Area Control Error"),
    ("B95", "Procured capacity"),
];

pub const DOC_STATUSES: &[(&str, &str)] = &[
    ("A01", "Intermediate"),
    ("A02", "Final"),
    ("A05", "Active"),
    ("A09", "Cancelled"),
    ("A13", "Withdrawn"),
    ("X01", "Estimated"),
];

/// Processes accepted by load forecast queries.
pub const LOAD_FORECAST_PROCESSES: &[&str] = &["A01", "A31", "A32", "A33"];
/// Processes accepted by generation and wind/solar forecast queries.
pub const GENERATION_FORECAST_PROCESSES: &[&str] = &["A01", "A18", "A40"];
/// Processes accepted by procured balancing capacity queries (aFRR, mFRR).
pub const BALANCING_PROCESSES: &[&str] = &["A51", "A47"];

pub fn psr_type_name(code: &str) -> Option<&'static str> {
    lookup(PSR_TYPES, code)
}

fn lookup(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

/// Check `value` against a code table, naming the field in the error.
pub fn validate_code(field: &str, value: &str, table: &[(&str, &str)]) -> Result<()> {
    if table.iter().any(|(c, _)| *c == value) {
        return Ok(());
    }
    Err(Error::InvalidRequest(format!(
        "{field} {value} is not a known code"
    )))
}

/// Check `value` against a closed set, listing the set in the error.
pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(Error::InvalidRequest(format!(
        "{field} not in {{{}}}",
        allowed.join(", ")
    )))
}
