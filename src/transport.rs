use std::thread;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

use crate::acknowledgement::{classify, reason_text, signals_no_data, Acknowledgement};
use crate::client::ClientOptions;
use crate::error::{Error, ParameterKind, Result};
use crate::request::{ContentKind, PageRequest, QuerySpec, RawResult};
use crate::url_builder::{page_url, redacted};
use crate::window::TimeWindow;

/// Status line, declared content type and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// The plain GET capability the client needs from an HTTP stack.
///
/// Errors returned here are connection-level; any response with a status line
/// comes back as `Ok`.
pub trait HttpGet {
    fn get(&self, url: &Url) -> Result<HttpResponse>;
}

/// `HttpGet` over a blocking `reqwest` client with pooled connections.
#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    http: HttpClient,
}

impl ReqwestHttp {
    pub fn new(opts: &ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&opts.user_agent)
            .map_err(|_| Error::InvalidRequest(format!("bad user agent: {}", opts.user_agent)))?;
        headers.insert(USER_AGENT, agent);

        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &opts.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }
}

impl HttpGet for ReqwestHttp {
    fn get(&self, url: &Url) -> Result<HttpResponse> {
        let resp = self.http.get(url.clone()).send().map_err(connection_error)?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().map_err(connection_error)?.to_vec();
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

fn connection_error(e: reqwest::Error) -> Error {
    if e.is_builder() {
        return Error::Http(e);
    }
    if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
        Error::TransientTransport(e.to_string())
    } else {
        Error::Http(e)
    }
}

/// What one physical request amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(RawResult),
    /// The provider explicitly reported no data for this request.
    Empty,
    /// Too many documents for one call, or the offset limit was reached.
    RateLimited { requested: u64, allowed: u64 },
    InvalidParameter { kind: ParameterKind, message: String },
    TransientFailure(String),
    FatalFailure { status: Option<u16>, body: String },
}

impl Outcome {
    /// Collapse into the error taxonomy; only `Success` yields a value.
    pub fn into_result(self) -> Result<RawResult> {
        match self {
            Outcome::Success(raw) => Ok(raw),
            Outcome::Empty => Err(Error::NoMatchingData),
            Outcome::RateLimited { requested, allowed } => Err(Error::Pagination {
                requested: Some(requested),
                allowed: Some(allowed),
            }),
            Outcome::InvalidParameter { kind, message } => {
                Err(Error::InvalidParameter { kind, message })
            }
            Outcome::TransientFailure(msg) => Err(Error::TransientTransport(msg)),
            Outcome::FatalFailure { status, body } => Err(Error::FatalTransport { status, body }),
        }
    }
}

/// Classify one HTTP exchange.
pub fn classify_response(resp: HttpResponse) -> Outcome {
    if (200..300).contains(&resp.status) {
        let content = ContentKind::from_content_type(resp.content_type.as_deref());
        if content.is_textual() && signals_no_data(&String::from_utf8_lossy(&resp.body)) {
            return Outcome::Empty;
        }
        return Outcome::Success(RawResult::new(content, resp.body));
    }

    let body = String::from_utf8_lossy(&resp.body).into_owned();
    let reason = reason_text(&body);
    match reason.as_deref().map(classify) {
        Some(Some(Acknowledgement::NoData)) => Outcome::Empty,
        Some(Some(Acknowledgement::InvalidParameter(kind, message))) => {
            Outcome::InvalidParameter { kind, message }
        }
        Some(Some(Acknowledgement::LimitExceeded { requested, allowed })) => {
            Outcome::RateLimited { requested, allowed }
        }
        // Not an acknowledgement at all, e.g. a gateway page.
        None if resp.status >= 500 || resp.status == 429 => {
            Outcome::TransientFailure(format!("status {}", resp.status))
        }
        Some(None) | None => Outcome::FatalFailure {
            status: Some(resp.status),
            body,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    #[default]
    Fixed,
    /// Double the delay after every attempt, up to `max_delay`.
    Exponential { max_delay: Duration },
}

/// Bounded retry of transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_count: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 1,
            delay: Duration::ZERO,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max_delay } => {
                let factor = 1u32 << attempt.saturating_sub(1).min(16);
                self.delay.saturating_mul(factor).min(max_delay)
            }
        }
    }
}

/// Issues one physical request and reports its outcome.
///
/// This is the seam between the orchestrator and the network: the typed
/// client drives any implementation through the same splitting and paging
/// pipeline.
pub trait RawProvider {
    fn send(&self, page: &PageRequest<'_>) -> Outcome;
}

impl<P: RawProvider + ?Sized> RawProvider for &P {
    fn send(&self, page: &PageRequest<'_>) -> Outcome {
        (**self).send(page)
    }
}

/// Unparsed access to the API: one GET per page, with retries.
#[derive(Debug, Clone)]
pub struct RawClient<H = ReqwestHttp> {
    http: H,
    endpoint: Url,
    api_key: String,
    retry: RetryPolicy,
}

impl RawClient<ReqwestHttp> {
    pub fn new(opts: &ClientOptions) -> Result<Self> {
        let http = ReqwestHttp::new(opts)?;
        Self::with_http(http, opts)
    }
}

impl<H: HttpGet> RawClient<H> {
    /// Build on any `HttpGet`, e.g. an in-memory fake.
    pub fn with_http(http: H, opts: &ClientOptions) -> Result<Self> {
        if opts.api_key.trim().is_empty() {
            return Err(Error::InvalidRequest("api key must not be empty".into()));
        }
        Ok(Self {
            http,
            endpoint: opts.endpoint_url()?,
            api_key: opts.api_key.clone(),
            retry: opts.retry_policy(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Single-shot query over the whole window, without splitting or paging.
    pub fn query(&self, spec: &QuerySpec, window: TimeWindow) -> Result<RawResult> {
        self.send(&PageRequest::new(spec, window)).into_result()
    }

    fn attempt(&self, url: &Url) -> Outcome {
        match self.http.get(url) {
            Ok(resp) => classify_response(resp),
            Err(Error::TransientTransport(msg)) => Outcome::TransientFailure(msg),
            Err(e) => Outcome::FatalFailure {
                status: None,
                body: e.to_string(),
            },
        }
    }
}

impl<H: HttpGet> RawProvider for RawClient<H> {
    fn send(&self, page: &PageRequest<'_>) -> Outcome {
        let url = page_url(&self.endpoint, &self.api_key, page);
        let mut attempt = 0;
        loop {
            debug!(url = %redacted(&url), attempt, "GET");
            match self.attempt(&url) {
                Outcome::TransientFailure(msg) if attempt < self.retry.retry_count => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(reason = %msg, attempt, ?delay, "transient failure, retrying");
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
                outcome => return outcome,
            }
        }
    }
}
