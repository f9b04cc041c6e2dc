use axum::http::HeaderMap;

pub const UNKNOWN: &str = "unknown";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Client identity for rate limiting: the first `x-forwarded-for` entry,
/// else `x-real-ip`, else `"unknown"`.
pub fn client_identity(headers: &HeaderMap) -> String {
    if let Some(first) = header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }
    header(headers, "x-real-ip")
        .unwrap_or(UNKNOWN)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn first_forwarded_entry_wins() {
        let h = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(client_identity(&h), "203.0.113.7");
    }

    #[test]
    fn real_ip_is_the_fallback() {
        let h = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(client_identity(&h), "198.51.100.4");
    }

    #[test]
    fn blank_forwarded_header_is_skipped() {
        let h = headers(&[("x-forwarded-for", " , 10.0.0.1"), ("x-real-ip", "10.0.0.2")]);
        assert_eq!(client_identity(&h), "10.0.0.2");
    }

    #[test]
    fn no_headers_is_unknown() {
        assert_eq!(client_identity(&HeaderMap::new()), UNKNOWN);
    }
}
