use actix_web::HttpRequest;
use std::net::IpAddr;

pub const NOT_AUTHORIZED: &str = "Client not authorized";

const LOCALHOST_NAMES: [&str; 4] = ["localhost", "127.0.0.1", "::1", "0:0:0:0:0:0:0:1"];

/// Check the peer address of `req` against the allowlist.
pub fn is_request_authorized(req: &HttpRequest, allowed: &[String]) -> bool {
    let peer = req.peer_addr().map(|addr| addr.ip());
    log::debug!("Client remote IP {:?}", peer);
    is_ip_allowed(allowed, peer)
}

/// An empty allowlist accepts every client. A localhost entry accepts
/// `127.0.0.1` and `::1`, whichever spelling is listed.
pub fn is_ip_allowed(allowed: &[String], peer: Option<IpAddr>) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let ip = match peer {
        Some(ip) => ip,
        None => return false,
    };

    let exact = allowed.iter().any(|entry| match entry.parse::<IpAddr>() {
        Ok(allowed_ip) => allowed_ip == ip,
        Err(_) => entry == &ip.to_string(),
    });
    if exact {
        return true;
    }

    is_localhost(ip)
        && allowed
            .iter()
            .any(|entry| LOCALHOST_NAMES.contains(&entry.as_str()))
}

fn is_localhost(ip: IpAddr) -> bool {
    LOCALHOST_NAMES
        .iter()
        .filter_map(|name| name.parse::<IpAddr>().ok())
        .any(|localhost| localhost == ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ip(value: &str) -> Option<IpAddr> {
        Some(value.parse().unwrap())
    }

    #[test]
    fn test_empty_list_allows_everyone() {
        assert!(is_ip_allowed(&[], ip("10.0.0.1")));
        assert!(is_ip_allowed(&[], None));
    }

    #[test]
    fn test_exact_match() {
        let allowed = list(&["192.168.1.10"]);
        assert!(is_ip_allowed(&allowed, ip("192.168.1.10")));
        assert!(!is_ip_allowed(&allowed, ip("192.168.1.11")));
        assert!(!is_ip_allowed(&allowed, None));
    }

    #[test]
    fn test_localhost_spellings_are_equivalent() {
        for entry in ["localhost", "127.0.0.1", "::1", "0:0:0:0:0:0:0:1"] {
            let allowed = list(&[entry]);
            assert!(is_ip_allowed(&allowed, ip("127.0.0.1")), "{}", entry);
            assert!(is_ip_allowed(&allowed, ip("::1")), "{}", entry);
            assert!(!is_ip_allowed(&allowed, ip("192.168.1.10")), "{}", entry);
        }
    }

    #[test]
    fn test_other_loopback_addresses_are_not_localhost() {
        let allowed = list(&["localhost"]);
        assert!(!is_ip_allowed(&allowed, ip("127.0.0.2")));
        assert!(!is_ip_allowed(&allowed, ip("127.1.2.3")));
    }

    #[test]
    fn test_loopback_client_needs_localhost_entry() {
        let allowed = list(&["192.168.1.10"]);
        assert!(!is_ip_allowed(&allowed, ip("127.0.0.1")));
    }
}
