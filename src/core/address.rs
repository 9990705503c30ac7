//! Purpose: Resolve request targets against the configured base address.
//! Exports: `normalize_base_url`, `is_absolute`, `resolve_url`, `endpoint_path`.
//! Role: Pure URL helpers shared by the request wrapper and the domain APIs.
//! Invariants: Relative inputs resolve to exactly `base + input`.
//! Invariants: Absolute http(s) inputs are returned unchanged.
use super::error::{Error, ErrorKind};
use url::{Position, Url};

type ApiResult<T> = Result<T, Error>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Validates a base address and returns it without a trailing slash.
pub fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let url = Url::parse(raw.trim()).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_url(raw)
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("base url must use http or https scheme")
            .with_url(raw));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("base url must not include a query or fragment")
            .with_url(raw));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

pub fn is_absolute(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

pub fn resolve_url(base: &str, input: &str) -> ApiResult<String> {
    if is_absolute(input) {
        return Ok(input.to_string());
    }
    let resolved = format!("{base}{input}");
    Url::parse(&resolved).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("request target does not form a valid url")
            .with_url(resolved.clone())
            .with_source(err)
    })?;
    Ok(resolved)
}

/// Builds a relative path such as `/novel/42/content?format=txt`.
///
/// Segments are percent-encoded individually, so ids containing `/` or `?`
/// stay inside their segment. Query pairs are form-urlencoded.
pub fn endpoint_path(segments: &[&str], query: &[(&str, &str)]) -> String {
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return String::from("/"),
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear();
        for segment in segments {
            path.push(segment);
        }
    }
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    url[Position::BeforePath..].to_string()
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BASE_URL, endpoint_path, is_absolute, normalize_base_url, resolve_url};
    use crate::core::error::ErrorKind;

    #[test]
    fn normalize_base_url_trims_trailing_slash() {
        let base = normalize_base_url("http://127.0.0.1:8000/").expect("base");
        assert_eq!(base, DEFAULT_BASE_URL);
    }

    #[test]
    fn normalize_base_url_keeps_path_prefix() {
        let base = normalize_base_url("https://example.com/api/").expect("base");
        assert_eq!(base, "https://example.com/api");
    }

    #[test]
    fn normalize_base_url_rejects_other_schemes() {
        let err = normalize_base_url("ftp://example.com").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn normalize_base_url_rejects_query() {
        let err = normalize_base_url("http://example.com/?a=1").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn relative_paths_concatenate_with_base() {
        for path in ["/novel/1", "/novel/search?keyword=a&page=2", "/"] {
            let resolved = resolve_url(DEFAULT_BASE_URL, path).expect("resolve");
            assert_eq!(resolved, format!("{DEFAULT_BASE_URL}{path}"));
        }
    }

    #[test]
    fn absolute_urls_pass_through_unchanged() {
        for url in ["http://other.host:9000/x?y=1", "https://example.com/A%20B"] {
            assert!(is_absolute(url));
            assert_eq!(resolve_url(DEFAULT_BASE_URL, url).expect("resolve"), url);
        }
    }

    #[test]
    fn non_http_scheme_is_not_absolute() {
        assert!(!is_absolute("mailto:someone@example.com"));
        assert!(!is_absolute("/novel/1"));
    }

    #[test]
    fn endpoint_path_encodes_segments_and_query() {
        assert_eq!(endpoint_path(&["novel", "123"], &[]), "/novel/123");
        assert_eq!(
            endpoint_path(&["novel", "search"], &[("keyword", "魔法 少女"), ("page", "2")]),
            "/novel/search?keyword=%E9%AD%94%E6%B3%95+%E5%B0%91%E5%A5%B3&page=2"
        );
        assert_eq!(endpoint_path(&["series", "a/b"], &[]), "/series/a%2Fb");
    }
}
