//! URL normalization and domain comparison — pure helpers with no I/O.
//!
//! The normalized form produced here doubles as the Frontier's dedup key and
//! as the `url` field emitted in every `CrawlResult`.

use url::Url;

use crate::common::error::{Error, Result};

/// Canonicalize a raw URL string.
///
/// Rules, applied in order: require scheme + host; lowercase scheme and host;
/// drop the fragment; strip a trailing `/` from the path unless it is `/` or
/// empty; sort query parameters by key (stable on multi-values); drop default
/// ports (80/http, 443/https).
pub fn normalize_url(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    if url.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("no host in URL: {raw}")));
    }

    url.set_fragment(None);

    let scheme = url.scheme().to_ascii_lowercase();
    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("no host in URL: {raw}")))?
        .to_ascii_lowercase();

    let default_port = match scheme.as_str() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    let port = url.port().filter(|p| Some(*p) != default_port);

    let path = match url.path() {
        "" | "/" => "/".to_string(),
        p => p.trim_end_matches('/').to_string(),
    };
    let path = if path.is_empty() { "/".to_string() } else { path };

    let query = sorted_query(url.query());

    let mut out = format!("{scheme}://{host}");
    if let Some(port) = port {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(&path);
    if let Some(query) = query {
        out.push('?');
        out.push_str(&query);
    }

    Ok(out)
}

/// Stable sort of `a=1&b=2` query pairs by key, preserving encounter order for
/// repeated keys.
fn sorted_query(query: Option<&str>) -> Option<String> {
    let query = query?;
    if query.is_empty() {
        return None;
    }
    let mut pairs: Vec<&str> = query.split('&').collect();
    pairs.sort_by_key(|pair| pair.split('=').next().unwrap_or(pair));
    Some(pairs.join("&"))
}

/// Extract the host portion of a URL, with any port stripped.
pub fn get_domain(raw: &str) -> Result<String> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    url.host_str()
        .map(|h| h.to_string())
        .ok_or_else(|| Error::InvalidUrl(format!("no host in URL: {raw}")))
}

/// Compare two URLs' domains, case-insensitively, with exact string equality.
/// Subdomains are *not* treated as the same domain as their parent.
pub fn is_same_domain(a: &str, b: &str) -> bool {
    match (get_domain(a), get_domain(b)) {
        (Ok(a), Ok(b)) => a.eq_ignore_ascii_case(&b),
        _ => false,
    }
}
