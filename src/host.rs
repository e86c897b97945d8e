//! Host literal and DNS name checks.
//!
//! # Grammar Reference
//!
//! ```abnf
//! host       = dns-name / ipv4-literal / "[" ipv6-literal "]"
//! dns-name   = label *( "." label )       ; at most 253 chars
//! label      = 1*63( ALPHA / DIGIT / "-" ) ; no leading/trailing "-"
//! ipv4       = dec-octet 3( "." dec-octet ) ; 0-255, leading zeros tolerated
//! ```

use std::fmt;
use std::net::Ipv6Addr;

use crate::chars::{is_hex_digit, is_ldh, is_non_ascii};
use crate::constants::{MAX_DNS_DOMAIN_LENGTH, MAX_DNS_LABEL_LENGTH};

/// A validated host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Host {
    /// A DNS name, lower-cased (e.g. "example.com")
    Domain(String),
    /// A dotted-quad IPv4 literal with leading zeros removed
    Ipv4(String),
    /// An IPv6 literal without brackets, in RFC 5952 form
    Ipv6(String),
}

impl Host {
    /// Parses a host: a bracketed IPv6 literal, an IPv4 literal, or a DNS name.
    ///
    /// A name whose last label is numeric is treated as a failed IPv4
    /// literal rather than a DNS name.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        if let Some(inner) = input.strip_prefix('[') {
            let inner = inner.strip_suffix(']')?;
            return is_ipv6(inner).then(|| Self::Ipv6(canonical_ipv6(inner)));
        }

        if let Some(octets) = ipv4_octets(input) {
            let [a, b, c, d] = octets;
            return Some(Self::Ipv4(format!("{a}.{b}.{c}.{d}")));
        }

        let last_label = input.rsplit('.').next().unwrap_or(input);
        if !last_label.is_empty() && last_label.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        check_dns_name(input, false).ok()?;
        Some(Self::Domain(input.to_ascii_lowercase()))
    }

    /// Returns true for IPv4 and IPv6 literals.
    #[must_use]
    pub const fn is_ip(&self) -> bool {
        matches!(self, Self::Ipv4(_) | Self::Ipv6(_))
    }

    /// Returns the host as it appears in a URL authority (IPv6 bracketed).
    #[must_use]
    pub fn to_authority(&self) -> String {
        match self {
            Self::Domain(d) | Self::Ipv4(d) => d.clone(),
            Self::Ipv6(ip) => format!("[{ip}]"),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_authority())
    }
}

fn ipv4_octets(s: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Returns true if `s` is a dotted-quad IPv4 literal with octets 0-255.
///
/// Leading zeros are tolerated and read as decimal.
///
/// # Examples
///
/// ```
/// use opaque_uri::is_ipv4;
///
/// assert!(is_ipv4("192.168.0.1"));
/// assert!(is_ipv4("010.000.000.001"));
/// assert!(!is_ipv4("256.0.0.1"));
/// assert!(!is_ipv4("1.2.3"));
/// ```
#[must_use]
pub fn is_ipv4(s: &str) -> bool {
    ipv4_octets(s).is_some()
}

/// Counts the 16-bit groups in one side of an IPv6 literal.
fn ipv6_groups(part: &str, allow_ipv4_tail: bool) -> Option<usize> {
    if part.is_empty() {
        return Some(0);
    }
    let mut count = 0;
    let mut groups = part.split(':').peekable();
    while let Some(group) = groups.next() {
        let last = groups.peek().is_none();
        if last && allow_ipv4_tail && group.contains('.') {
            if !is_ipv4(group) {
                return None;
            }
            count += 2;
        } else if (1..=4).contains(&group.len()) && group.chars().all(is_hex_digit) {
            count += 1;
        } else {
            return None;
        }
    }
    Some(count)
}

/// Returns true if `s` is an IPv6 literal, bracketed or bare.
///
/// At most one `::` run is allowed, each group has 1-4 hex digits, and a
/// trailing embedded IPv4 counts as two groups. Without compression the
/// literal must have exactly 8 groups.
///
/// # Examples
///
/// ```
/// use opaque_uri::is_ipv6;
///
/// assert!(is_ipv6("::1"));
/// assert!(is_ipv6("[2001:db8::1]"));
/// assert!(is_ipv6("::ffff:192.0.2.1"));
/// assert!(!is_ipv6("1::2::3"));
/// assert!(!is_ipv6("1:2:3:4:5:6:7"));
/// ```
#[must_use]
pub fn is_ipv6(s: &str) -> bool {
    let s = match s.strip_prefix('[') {
        Some(rest) => match rest.strip_suffix(']') {
            Some(inner) => inner,
            None => return false,
        },
        None => s,
    };

    match s.split_once("::") {
        Some((head, tail)) => {
            if tail.contains("::") {
                return false;
            }
            match (ipv6_groups(head, false), ipv6_groups(tail, true)) {
                (Some(h), Some(t)) => h + t <= 7,
                _ => false,
            }
        }
        None => ipv6_groups(s, true) == Some(8),
    }
}

/// Renders a validated IPv6 literal in RFC 5952 form.
fn canonical_ipv6(s: &str) -> String {
    s.parse::<Ipv6Addr>()
        .map_or_else(|_| s.to_ascii_lowercase(), |ip| ip.to_string())
}

/// Checks a DNS name, optionally admitting non-ASCII label characters.
///
/// # Errors
///
/// Returns a short description of the first violated rule.
pub(crate) fn check_dns_name(domain: &str, allow_non_ascii: bool) -> Result<(), &'static str> {
    if domain.is_empty() {
        return Err("empty domain");
    }

    if domain.chars().count() > MAX_DNS_DOMAIN_LENGTH {
        return Err("domain exceeds 253 character limit");
    }

    for label in domain.split('.') {
        check_dns_label(label, allow_non_ascii)?;
    }

    Ok(())
}

fn check_dns_label(label: &str, allow_non_ascii: bool) -> Result<(), &'static str> {
    if label.is_empty() {
        return Err("empty label (consecutive dots or leading/trailing dot)");
    }

    if label.chars().count() > MAX_DNS_LABEL_LENGTH {
        return Err("label exceeds 63 character limit");
    }

    if !label
        .chars()
        .all(|c| is_ldh(c) || (allow_non_ascii && is_non_ascii(c)))
    {
        return Err("label contains invalid character");
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err("label cannot start or end with hyphen");
    }

    Ok(())
}

/// Returns true if `s` is a single LDH label of 1-63 characters.
#[must_use]
pub fn is_dns_label(s: &str) -> bool {
    check_dns_label(s, false).is_ok()
}

/// Returns true if `s` is an LDH DNS name of at most 253 characters.
///
/// # Examples
///
/// ```
/// use opaque_uri::is_dns_name;
///
/// assert!(is_dns_name("example.com"));
/// assert!(!is_dns_name("example..com"));
/// assert!(!is_dns_name("-example.com"));
/// assert!(!is_dns_name("example.com."));
/// ```
#[must_use]
pub fn is_dns_name(s: &str) -> bool {
    check_dns_name(s, false).is_ok()
}

/// Why a port failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PortError {
    /// Empty or contains a non-digit
    Invalid,
    /// Numeric but above 65535
    OutOfRange,
}

/// Parses a decimal port in the range 0-65535.
pub(crate) fn parse_port(s: &str) -> Result<u16, PortError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortError::Invalid);
    }
    let trimmed = s.trim_start_matches('0');
    if trimmed.len() > 5 {
        return Err(PortError::OutOfRange);
    }
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse::<u16>().map_err(|_| PortError::OutOfRange)
}
