//! Validator for `blob:` URLs.
//!
//! # Grammar Reference
//!
//! ```abnf
//! blob-url = "blob:" origin "/" uuid [ "?" query ] [ "#" fragment ]
//! origin   = "null" / ( "http" / "https" ) "://" host [ ":" port ]
//! uuid     = 8HEXDIG "-" 4HEXDIG "-" 4HEXDIG "-" 4HEXDIG "-" 12HEXDIG
//! ```
//!
//! The origin and UUID are separated at the last `/`. Query and fragment
//! are only accepted when the policy allows them.

use std::fmt;

use uuid::{Uuid, Variant};

use crate::component::{ComponentError, ComponentKind};
use crate::constants::{BLOB_SCHEME, DEFAULT_MAX_URL_LENGTH};
use crate::error::{BlobReason, ConfigError, ValidationError};
use crate::host::{Host, PortError, parse_port};
use crate::precheck::precheck_str;
use crate::validator::{SchemeValidator, log_acceptance, log_rejection, split_off, strip_scheme};

/// Hyphen offsets in the 8-4-4-4-12 layout.
const UUID_HYPHENS: [usize; 4] = [8, 13, 18, 23];
const UUID_LENGTH: usize = 36;

/// Policy for [`BlobValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlobConfig {
    /// Maximum total length in UTF-16 code units.
    ///
    /// Default: 2048
    pub max_length: usize,

    /// Whether `blob:null/<uuid>` is accepted.
    ///
    /// Default: true
    pub allow_null_origin: bool,

    /// Accept any 8-4-4-4-12 hex UUID, skipping RFC 4122 version and
    /// variant checks.
    ///
    /// Default: false
    pub allow_non_rfc4122_uuid: bool,

    /// Whether a trailing `?query` or `#fragment` is accepted.
    ///
    /// Default: false
    pub allow_query_fragment: bool,

    /// Whether IPv4/IPv6 literal hosts are accepted in the origin.
    ///
    /// Default: true
    pub allow_ip_hosts: bool,

    /// Drop `:80` on http and `:443` on https origins in the canonical form.
    ///
    /// Default: true
    pub strip_default_port: bool,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_URL_LENGTH,
            allow_null_origin: true,
            allow_non_rfc4122_uuid: false,
            allow_query_fragment: false,
            allow_ip_hosts: true,
            strip_default_port: true,
        }
    }
}

impl BlobConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum total length.
    #[must_use]
    pub const fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    /// Enables or disables null origins.
    #[must_use]
    pub const fn with_allow_null_origin(mut self, allow: bool) -> Self {
        self.allow_null_origin = allow;
        self
    }

    /// Enables or disables non-RFC 4122 UUIDs.
    #[must_use]
    pub const fn with_allow_non_rfc4122_uuid(mut self, allow: bool) -> Self {
        self.allow_non_rfc4122_uuid = allow;
        self
    }

    /// Enables or disables a trailing query or fragment.
    #[must_use]
    pub const fn with_allow_query_fragment(mut self, allow: bool) -> Self {
        self.allow_query_fragment = allow;
        self
    }

    /// Enables or disables IP literal hosts.
    #[must_use]
    pub const fn with_allow_ip_hosts(mut self, allow: bool) -> Self {
        self.allow_ip_hosts = allow;
        self
    }

    /// Enables or disables default-port stripping.
    #[must_use]
    pub const fn with_strip_default_port(mut self, strip: bool) -> Self {
        self.strip_default_port = strip;
        self
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `max_length` is zero.
    pub const fn check(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_length",
            });
        }
        Ok(())
    }
}

/// The origin that created a blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BlobOrigin {
    /// An opaque origin, spelled `null`
    Null,
    /// A scheme/host/port tuple origin
    Tuple {
        /// `http` or `https`, lower-cased
        scheme: String,
        /// The validated host
        host: Host,
        /// The explicit port, if present after default-port stripping
        port: Option<u16>,
    },
}

impl BlobOrigin {
    /// Returns true for the opaque `null` origin.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for BlobOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Tuple { scheme, host, port } => {
                write!(f, "{scheme}://{host}")?;
                if let Some(port) = port {
                    write!(f, ":{port}")?;
                }
                Ok(())
            }
        }
    }
}

/// A validated `blob:` URL.
///
/// # Examples
///
/// ```
/// use opaque_uri::{BlobValidator, SchemeValidator};
///
/// let url = BlobValidator::default()
///     .validate("blob:https://example.com/550E8400-E29B-41D4-A716-446655440000")
///     .unwrap();
/// assert_eq!(url.origin().to_string(), "https://example.com");
/// assert_eq!(url.uuid(), "550e8400-e29b-41d4-a716-446655440000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BlobUrl {
    origin: BlobOrigin,
    uuid: String,
    query: Option<String>,
    fragment: Option<String>,
    canonical: String,
}

impl BlobUrl {
    /// Returns the origin.
    #[must_use]
    pub const fn origin(&self) -> &BlobOrigin {
        &self.origin
    }

    /// Returns the lower-cased UUID.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Returns the query, if present and allowed.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the fragment, if present and allowed.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for BlobUrl {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

/// Validator for `blob:` URLs.
#[derive(Debug, Clone)]
pub struct BlobValidator {
    config: BlobConfig,
}

impl Default for BlobValidator {
    fn default() -> Self {
        Self::new(BlobConfig::default())
    }
}

impl BlobValidator {
    /// Creates a validator.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is inconsistent. Use
    /// [`BlobValidator::try_new`] for fallible construction.
    #[must_use]
    pub fn new(config: BlobConfig) -> Self {
        Self::try_new(config).expect("valid blob: configuration")
    }

    /// Creates a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is inconsistent.
    pub fn try_new(config: BlobConfig) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BlobConfig {
        &self.config
    }

    fn validate_inner(&self, candidate: &str) -> Result<BlobUrl, ValidationError<BlobReason>> {
        precheck_str(candidate, self.config.max_length, Self::ALLOWS_SPACE)
            .map_err(ValidationError::lift)?;

        let rest = strip_scheme(candidate, BLOB_SCHEME)
            .ok_or(ValidationError::new(BlobReason::MissingScheme))?;

        if !self.config.allow_query_fragment && rest.contains(['?', '#']) {
            return Err(ValidationError::new(BlobReason::QueryOrFragmentNotAllowed));
        }
        let (rest, fragment) = split_off(rest, '#');
        let (body, query) = split_off(rest, '?');

        let slash = body
            .rfind('/')
            .ok_or(ValidationError::new(BlobReason::MissingUuid))?;
        let (raw_origin, raw_uuid) = (&body[..slash], &body[slash + 1..]);

        let origin = self.parse_origin(raw_origin)?;
        let uuid = self.check_uuid(raw_uuid)?;

        if let Some(query) = query {
            ComponentKind::Query
                .check(query)
                .map_err(|e| component_error(e, BlobReason::InvalidQuery))?;
        }
        if let Some(fragment) = fragment {
            ComponentKind::Fragment
                .check(fragment)
                .map_err(|e| component_error(e, BlobReason::InvalidFragment))?;
        }

        let mut canonical = format!("{BLOB_SCHEME}:{origin}/{uuid}");
        if let Some(query) = query {
            canonical.push('?');
            canonical.push_str(query);
        }
        if let Some(fragment) = fragment {
            canonical.push('#');
            canonical.push_str(fragment);
        }

        Ok(BlobUrl {
            origin,
            uuid,
            query: query.map(str::to_string),
            fragment: fragment.map(str::to_string),
            canonical,
        })
    }

    fn parse_origin(&self, raw: &str) -> Result<BlobOrigin, ValidationError<BlobReason>> {
        if raw.is_empty() {
            return Err(ValidationError::new(BlobReason::EmptyOrigin));
        }

        if raw.eq_ignore_ascii_case("null") {
            if !self.config.allow_null_origin {
                return Err(ValidationError::new(BlobReason::NullOriginNotAllowed));
            }
            return Ok(BlobOrigin::Null);
        }

        let (scheme, authority) = raw.split_once("://").ok_or_else(|| {
            ValidationError::with_detail(BlobReason::UnsupportedOriginScheme, raw)
        })?;
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ValidationError::with_detail(
                BlobReason::UnsupportedOriginScheme,
                scheme,
            ));
        }

        if authority.contains('/') {
            return Err(ValidationError::new(BlobReason::OriginHasPath));
        }
        if authority.contains('@') {
            return Err(ValidationError::new(BlobReason::OriginHasUserinfo));
        }

        let (raw_host, raw_port) = split_host_port(authority);
        if raw_host.is_empty() {
            return Err(ValidationError::new(BlobReason::EmptyHost));
        }

        let host = Host::parse(raw_host)
            .ok_or_else(|| ValidationError::with_detail(BlobReason::InvalidHost, raw_host))?;
        if host.is_ip() && !self.config.allow_ip_hosts {
            return Err(ValidationError::with_detail(
                BlobReason::IpHostNotAllowed,
                raw_host,
            ));
        }

        let port = match raw_port {
            Some(raw_port) => Some(parse_port(raw_port).map_err(|e| {
                let reason = match e {
                    PortError::Invalid => BlobReason::InvalidPort,
                    PortError::OutOfRange => BlobReason::PortOutOfRange,
                };
                ValidationError::with_detail(reason, raw_port)
            })?),
            None => None,
        };
        let port =
            port.filter(|&p| !(self.config.strip_default_port && is_default_port(&scheme, p)));

        Ok(BlobOrigin::Tuple { scheme, host, port })
    }

    fn check_uuid(&self, raw: &str) -> Result<String, ValidationError<BlobReason>> {
        let pattern_error = || ValidationError::with_detail(BlobReason::InvalidUuidPattern, raw);

        if !matches_uuid_pattern(raw) {
            return Err(pattern_error());
        }
        let uuid = Uuid::try_parse(raw).map_err(|_| pattern_error())?;

        if !self.config.allow_non_rfc4122_uuid {
            let version = uuid.get_version_num();
            if !(1..=5).contains(&version) {
                return Err(ValidationError::with_detail(
                    BlobReason::InvalidUuidVersion,
                    format!("version {version}"),
                ));
            }
            if uuid.get_variant() != Variant::RFC4122 {
                return Err(ValidationError::with_detail(
                    BlobReason::InvalidUuidVariant,
                    raw,
                ));
            }
        }

        Ok(uuid.hyphenated().to_string())
    }
}

impl SchemeValidator for BlobValidator {
    type Output = BlobUrl;
    type Reason = BlobReason;

    const SCHEME: &'static str = BLOB_SCHEME;

    fn max_length(&self) -> usize {
        self.config.max_length
    }

    fn validate(&self, candidate: &str) -> Result<BlobUrl, ValidationError<BlobReason>> {
        self.validate_inner(candidate)
            .map_err(|e| log_rejection(BLOB_SCHEME, e))
            .inspect(|url| log_acceptance(BLOB_SCHEME, url))
    }
}

/// Checks the 8-4-4-4-12 hex layout without accepting braced, URN or
/// simple forms.
fn matches_uuid_pattern(s: &str) -> bool {
    s.len() == UUID_LENGTH
        && s.bytes().enumerate().all(|(i, b)| {
            if UUID_HYPHENS.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("http", 80) | ("https", 443))
}

/// Splits `host[:port]`, keeping bracketed IPv6 literals intact.
fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    if authority.starts_with('[') {
        if let Some(close) = authority.find(']') {
            let (host, rest) = authority.split_at(close + 1);
            return match rest.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None if rest.is_empty() => (host, None),
                // Trailing junk after the bracket makes the host invalid.
                None => (authority, None),
            };
        }
        return (authority, None);
    }
    match authority.rfind(':') {
        Some(idx) => (&authority[..idx], Some(&authority[idx + 1..])),
        None => (authority, None),
    }
}

fn component_error(err: ComponentError, invalid: BlobReason) -> ValidationError<BlobReason> {
    let reason = match err {
        ComponentError::InvalidChar { .. } => invalid,
        ComponentError::MalformedPercent { .. } => BlobReason::MalformedPercentEncoding,
    };
    ValidationError::with_detail(reason, err.detail())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn reason(validator: &BlobValidator, input: &str) -> BlobReason {
        validator.validate(input).unwrap_err().reason
    }

    #[test]
    fn https_origin() {
        let url = BlobValidator::default()
            .validate(&format!("blob:https://example.com/{UUID}"))
            .unwrap();
        assert_eq!(url.uuid(), UUID);
        assert_eq!(url.origin().to_string(), "https://example.com");
        assert_eq!(url.canonical(), format!("blob:https://example.com/{UUID}"));
    }

    #[test]
    fn uuid_is_lowercased() {
        let url = BlobValidator::default()
            .validate(&format!("blob:https://example.com/{}", UUID.to_uppercase()))
            .unwrap();
        assert_eq!(url.uuid(), UUID);
    }

    #[test]
    fn null_origin() {
        let url = BlobValidator::default()
            .validate(&format!("blob:null/{UUID}"))
            .unwrap();
        assert!(url.origin().is_null());

        let strict = BlobValidator::new(BlobConfig::new().with_allow_null_origin(false));
        assert_eq!(
            reason(&strict, &format!("blob:null/{UUID}")),
            BlobReason::NullOriginNotAllowed
        );
    }

    #[test]
    fn bad_uuid_pattern() {
        let validator = BlobValidator::default();
        assert_eq!(
            reason(&validator, "blob:null/not-a-uuid"),
            BlobReason::InvalidUuidPattern
        );
        assert_eq!(
            reason(&validator, "blob:null/550e8400e29b41d4a716446655440000"),
            BlobReason::InvalidUuidPattern
        );
        assert_eq!(
            reason(&validator, "blob:null/{550e8400-e29b-41d4-a716-44665544000}"),
            BlobReason::InvalidUuidPattern
        );
    }

    #[test]
    fn uuid_version_and_variant() {
        let validator = BlobValidator::default();
        assert_eq!(
            reason(&validator, "blob:null/550e8400-e29b-71d4-a716-446655440000"),
            BlobReason::InvalidUuidVersion
        );
        assert_eq!(
            reason(&validator, "blob:null/00000000-0000-0000-0000-000000000000"),
            BlobReason::InvalidUuidVersion
        );
        assert_eq!(
            reason(&validator, "blob:null/550e8400-e29b-41d4-c716-446655440000"),
            BlobReason::InvalidUuidVariant
        );

        let relaxed = BlobValidator::new(BlobConfig::new().with_allow_non_rfc4122_uuid(true));
        assert!(relaxed.is_valid("blob:null/550e8400-e29b-71d4-c716-446655440000"));
    }

    #[test]
    fn origin_ports() {
        let validator = BlobValidator::default();
        let url = validator
            .validate(&format!("blob:http://Example.COM:8080/{UUID}"))
            .unwrap();
        assert_eq!(url.origin().to_string(), "http://example.com:8080");

        let url = validator
            .validate(&format!("blob:https://example.com:443/{UUID}"))
            .unwrap();
        assert_eq!(url.origin().to_string(), "https://example.com");

        assert_eq!(
            reason(&validator, &format!("blob:https://example.com:65536/{UUID}")),
            BlobReason::PortOutOfRange
        );
        assert_eq!(
            reason(&validator, &format!("blob:https://example.com:/{UUID}")),
            BlobReason::InvalidPort
        );
    }

    #[test]
    fn ip_hosts() {
        let validator = BlobValidator::default();
        let url = validator
            .validate(&format!("blob:http://[::1]:3000/{UUID}"))
            .unwrap();
        assert_eq!(url.origin().to_string(), "http://[::1]:3000");
        assert!(validator.is_valid(&format!("blob:http://127.0.0.1/{UUID}")));

        let no_ip = BlobValidator::new(BlobConfig::new().with_allow_ip_hosts(false));
        assert_eq!(
            reason(&no_ip, &format!("blob:http://127.0.0.1/{UUID}")),
            BlobReason::IpHostNotAllowed
        );
    }

    #[test]
    fn origin_shape() {
        let validator = BlobValidator::default();
        assert_eq!(
            reason(&validator, &format!("blob:ftp://example.com/{UUID}")),
            BlobReason::UnsupportedOriginScheme
        );
        assert_eq!(
            reason(&validator, &format!("blob:example.com/{UUID}")),
            BlobReason::UnsupportedOriginScheme
        );
        assert_eq!(
            reason(&validator, &format!("blob:https://example.com/path/{UUID}")),
            BlobReason::OriginHasPath
        );
        assert_eq!(
            reason(&validator, &format!("blob:https://user@example.com/{UUID}")),
            BlobReason::OriginHasUserinfo
        );
        assert_eq!(
            reason(&validator, &format!("blob:https:///{UUID}")),
            BlobReason::EmptyHost
        );
        assert_eq!(
            reason(&validator, &format!("blob:https://:80/{UUID}")),
            BlobReason::EmptyHost
        );
        assert_eq!(
            reason(&validator, &format!("blob:https://exa_mple.com/{UUID}")),
            BlobReason::InvalidHost
        );
        assert_eq!(reason(&validator, &format!("blob:/{UUID}")), BlobReason::EmptyOrigin);
        assert_eq!(reason(&validator, "blob:null"), BlobReason::MissingUuid);
    }

    #[test]
    fn query_and_fragment_policy() {
        let validator = BlobValidator::default();
        assert_eq!(
            reason(&validator, &format!("blob:null/{UUID}#frag")),
            BlobReason::QueryOrFragmentNotAllowed
        );

        let relaxed = BlobValidator::new(BlobConfig::new().with_allow_query_fragment(true));
        let url = relaxed
            .validate(&format!("blob:null/{UUID}?a=1#frag"))
            .unwrap();
        assert_eq!(url.query(), Some("a=1"));
        assert_eq!(url.fragment(), Some("frag"));
        assert_eq!(url.canonical(), format!("blob:null/{UUID}?a=1#frag"));
        assert_eq!(
            reason(&relaxed, &format!("blob:null/{UUID}#a%zz")),
            BlobReason::MalformedPercentEncoding
        );
    }

    #[test]
    fn split_host_port_cases() {
        assert_eq!(split_host_port("a.com"), ("a.com", None));
        assert_eq!(split_host_port("a.com:1"), ("a.com", Some("1")));
        assert_eq!(split_host_port("[::1]"), ("[::1]", None));
        assert_eq!(split_host_port("[::1]:8"), ("[::1]", Some("8")));
        assert_eq!(split_host_port("[::1]x"), ("[::1]x", None));
    }
}
