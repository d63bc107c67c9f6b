use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::reports::{ReportKind, ReportPolicy};
use crate::window::TimeWindow;

/// The fully resolved wire parameters for one report query.
///
/// Built by the functions in [`crate::reports`]; it excludes the credential,
/// the period and the page offset, which are added per physical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    kind: ReportKind,
    params: BTreeMap<&'static str, String>,
}

impl QuerySpec {
    pub(crate) fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    pub(crate) fn kw(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.insert(key, value.into());
        self
    }

    pub(crate) fn kw_opt<V: Into<String>>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.kw(key, v),
            None => self,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn policy(&self) -> ReportPolicy {
        self.kind.policy()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn document_type(&self) -> Option<&str> {
        self.get("documentType")
    }

    pub fn process_type(&self) -> Option<&str> {
        self.get("processType")
    }

    pub fn business_type(&self) -> Option<&str> {
        self.get("businessType")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.params.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// One physical request: a query, the slice of the window it covers and an
/// optional page offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<'a> {
    pub spec: &'a QuerySpec,
    pub window: TimeWindow,
    pub offset: Option<u32>,
}

impl<'a> PageRequest<'a> {
    pub fn new(spec: &'a QuerySpec, window: TimeWindow) -> Self {
        Self {
            spec,
            window,
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Declared content type of a successful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Xml,
    Zip,
    Other(String),
}

impl ContentKind {
    pub fn from_content_type(value: Option<&str>) -> Self {
        let Some(v) = value else {
            return ContentKind::Other(String::new());
        };
        let mime = v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/xml" | "text/xml" => ContentKind::Xml,
            "application/zip" | "application/x-zip-compressed" | "application/octet-stream" => {
                ContentKind::Zip
            }
            _ => ContentKind::Other(mime),
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ContentKind::Xml)
    }
}

/// Unparsed success payload of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub content: ContentKind,
    pub body: Vec<u8>,
}

impl RawResult {
    pub fn new(content: ContentKind, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content,
            body: body.into(),
        }
    }

    pub fn xml(body: impl Into<Vec<u8>>) -> Self {
        Self::new(ContentKind::Xml, body)
    }

    pub fn zip(body: impl Into<Vec<u8>>) -> Self {
        Self::new(ContentKind::Zip, body)
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| Error::Parse(format!("response body is not utf-8: {e}")))
    }
}
