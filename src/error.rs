use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which request parameter the provider rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Business,
    PsrType,
    Other,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterKind::Business => "businessType",
            ParameterKind::PsrType => "psrType",
            ParameterKind::Other => "parameter",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown area: {0}")]
    UnknownArea(String),

    #[error("invalid {kind} for this query: {message}")]
    InvalidParameter { kind: ParameterKind, message: String },

    #[error("no matching data found")]
    NoMatchingData,

    #[error("pagination limit exceeded (requested {requested:?}, allowed {allowed:?})")]
    Pagination {
        requested: Option<u64>,
        allowed: Option<u64>,
    },

    #[error("transient transport failure: {0}")]
    TransientTransport(String),

    #[error("transport failure (status {status:?}): {body}")]
    FatalTransport { status: Option<u16>, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml error: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl Error {
    /// `true` when the provider legitimately had nothing for the query.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Error::NoMatchingData)
    }
}
