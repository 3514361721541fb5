use axum::http::HeaderMap;
use std::net::IpAddr;

pub const UNKNOWN_IP: &str = "unknown";

/// Best-effort client address for transcripts
///
/// The first present source wins: the first `X-Forwarded-For` entry, then
/// `Client-IP`, then the socket peer. The winner must parse as an IP address
/// or the result is `"unknown"`.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trust_forwarded: bool) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let forwarded = trust_forwarded
        .then(|| header("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.split(',').next().map(|first| first.trim().to_string()));
    let client = trust_forwarded.then(|| header("client-ip")).flatten();

    let candidate = forwarded
        .or(client)
        .or_else(|| peer.map(|ip| ip.to_string()));

    match candidate {
        Some(ip) if ip.parse::<IpAddr>().is_ok() => ip,
        _ => UNKNOWN_IP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("client-ip", "198.51.100.1"),
        ]);
        assert_eq!(client_ip(&h, Some("127.0.0.1".parse().unwrap()), true), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_header_then_peer() {
        let h = headers(&[("client-ip", "198.51.100.1")]);
        assert_eq!(client_ip(&h, None, true), "198.51.100.1");

        let peer: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer), true), "2001:db8::1");
    }

    #[test]
    fn test_invalid_candidate_is_unknown() {
        let h = headers(&[("x-forwarded-for", "not-an-ip")]);
        assert_eq!(client_ip(&h, Some("127.0.0.1".parse().unwrap()), true), "unknown");
        assert_eq!(client_ip(&HeaderMap::new(), None, true), "unknown");
    }

    #[test]
    fn test_untrusted_headers_are_ignored() {
        let h = headers(&[("x-forwarded-for", "203.0.113.9")]);
        assert_eq!(client_ip(&h, Some("10.1.2.3".parse().unwrap()), false), "10.1.2.3");
    }
}
