/// Known API endpoints.
///
/// If the configured endpoint is already an `http(s)` URL, it is used as-is.
pub fn endpoint_to_url(endpoint: &str) -> Option<&'static str> {
    match endpoint {
        "entsoe" | "production" => Some("https://web-api.tp.entsoe.eu/api"),
        "legacy" => Some("https://transparency.entsoe.eu/api"),
        "iop" => Some("https://iop-transparency.entsoe.eu/api"),
        _ => None,
    }
}

pub fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
