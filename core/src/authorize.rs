//! Target authorization: a fixed allow-list of scannable prefixes covering
//! loopback and RFC1918 private ranges.
//!
//! Matching is a raw string-prefix check, no DNS resolution and no CIDR
//! parsing: `"10.0.0.5.evil.com"` matches the `"10."` prefix.

const ALLOWED_PREFIXES: &[&str] = &[
    "127.0.0.1",
    "localhost",
    "192.168.",
    "10.",
    "172.16.",
    "172.17.",
    "172.18.",
    "172.19.",
    "172.20.",
    "172.21.",
    "172.22.",
    "172.23.",
    "172.24.",
    "172.25.",
    "172.26.",
    "172.27.",
    "172.28.",
    "172.29.",
    "172.30.",
    "172.31.",
];

/// Whether `target` may be scanned. Empty and whitespace-only strings match
/// no prefix and are rejected.
pub fn is_authorized(target: &str) -> bool {
    ALLOWED_PREFIXES.iter().any(|p| target.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_and_private_ranges_are_allowed() {
        assert!(is_authorized("127.0.0.1"));
        assert!(is_authorized("localhost"));
        assert!(is_authorized("10.0.0.5"));
        assert!(is_authorized("192.168.1.1"));
        assert!(is_authorized("172.20.4.2"));
    }

    #[test]
    fn public_targets_are_rejected() {
        assert!(!is_authorized("8.8.8.8"));
        assert!(!is_authorized("evil.example.com"));
        assert!(!is_authorized("172.32.0.1"));
    }

    #[test]
    fn empty_targets_are_rejected() {
        assert!(!is_authorized(""));
        assert!(!is_authorized("   "));
    }

    #[test]
    fn prefix_matching_ignores_token_boundaries() {
        assert!(is_authorized("10.0.0.5.evil.com"));
        assert!(is_authorized("192.168.1.1a"));
    }
}
