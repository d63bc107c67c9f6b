#![forbid(unsafe_code)]

//! Rust client for the ENTSO-E Transparency Platform.
//!
//! Every report the platform publishes (prices, load, generation, cross-border
//! flows, balancing, unavailabilities) is one method on [`Client`]. A call takes
//! an area (name like `"DE_LU"` or EIC code), a [`TimeWindow`] and the report's
//! typed options, and returns a [`Table`] localized to the area's timezone and
//! cut to exactly the requested window.
//!
//! Behind each call the client issues as many HTTP requests as the platform's
//! limits require: year-long windows for most reports, offset paging for the
//! document-limited ones, halving the window for the rest. Sub-windows without
//! data are skipped; a query only fails with [`Error::NoMatchingData`] when the
//! platform had nothing for any of them.
//!
//! **Quick start**
//! ```no_run
//! use chrono::NaiveDate;
//! use entsoe::{Client, ClientOptions, TimeWindow};
//!
//! let client = Client::new(ClientOptions {
//!     api_key: "your-security-token".to_string(),
//!     retry_count: 3,
//!     ..ClientOptions::default()
//! })?;
//!
//! let area = client.resolve("BE")?;
//! let window = TimeWindow::days(
//!     area.tz(),
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
//! )?;
//! let prices = client.day_ahead_prices(area, &window)?;
//! for ts in prices.timestamps().take(3) {
//!     println!("{ts}");
//! }
//! # Ok::<(), entsoe::Error>(())
//! ```
//!
//! **Raw documents**
//! ```no_run
//! use entsoe::{reports, AreaRegistry, ClientOptions, RawClient, TimeWindow};
//! use chrono::{TimeZone, Utc};
//!
//! let raw = RawClient::new(&ClientOptions::from_env()?)?;
//! let nl = AreaRegistry::builtin().resolve("NL")?;
//! let window = TimeWindow::utc(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
//! )?;
//! let doc = raw.query(&reports::load(&nl), window)?;
//! println!("{}", doc.text()?);
//! # Ok::<(), entsoe::Error>(())
//! ```
//!
//! Notes:
//! - A security token is issued on request by the platform operator.
//! - The library logs through `tracing`; install a subscriber to see the
//!   requests it makes (the token is masked).

mod acknowledgement;
mod area;
mod assemble;
mod client;
mod codes;
mod error;
mod orchestrator;
mod parse;
pub mod reports;
mod request;
mod sources;
mod table;
mod transport;
mod url_builder;
mod window;

pub use crate::area::{Area, AreaRef, AreaRegistry};
pub use crate::assemble::{assemble, combine, JoinPolicy};
pub use crate::client::{Client, ClientOptions};
pub use crate::codes::psr_type_name;
pub use crate::error::{Error, ParameterKind, Result as EResult};
pub use crate::orchestrator::Orchestrator;
pub use crate::parse::{DocumentParser, Resolution, ResponseParser};
pub use crate::reports::{Horizon, ReportKind, ReportPolicy, Truncation, UnavailabilityFilter, WindowSplit};
pub use crate::request::{ContentKind, PageRequest, QuerySpec, RawResult};
pub use crate::table::{Record, Table};
pub use crate::transport::{
    classify_response, Backoff, HttpGet, HttpResponse, Outcome, RawClient, RawProvider, ReqwestHttp,
    RetryPolicy,
};
pub use crate::window::{TimeWindow, API_DATETIME_FORMAT};
