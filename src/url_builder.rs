use url::Url;

use crate::request::PageRequest;

const TOKEN_KEY: &str = "securityToken";

/// Assemble the full GET URL for one physical request.
///
/// Parameter order is stable: credential, report parameters (sorted), period,
/// then the optional page offset.
pub fn page_url(endpoint: &Url, token: &str, page: &PageRequest<'_>) -> Url {
    let mut url = endpoint.clone();
    {
        let mut q = url.query_pairs_mut();
        q.append_pair(TOKEN_KEY, token);
        for (k, v) in page.spec.iter() {
            q.append_pair(k, v);
        }
        q.append_pair("periodStart", &page.window.period_start_param());
        q.append_pair("periodEnd", &page.window.period_end_param());
        if let Some(offset) = page.offset {
            q.append_pair("offset", &offset.to_string());
        }
    }
    url
}

/// Render a request URL for logs with the credential masked.
pub fn redacted(url: &Url) -> String {
    let mut out = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == TOKEN_KEY { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out.to_string()
}
