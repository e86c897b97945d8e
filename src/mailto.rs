//! Validator for `mailto:` URLs (RFC 6068).
//!
//! # Grammar Reference
//!
//! ```abnf
//! mailto     = "mailto:" [ to ] [ "?" hfields ]
//! to         = addr-spec *( "," addr-spec )
//! addr-spec  = local-part [ "@" domain ]
//! local-part = dot-atom / quoted-string
//! domain     = dns-name / "[" ipv4 "]" / "[IPv6:" ipv6 "]"
//! hfields    = hfield *( "&" hfield )
//! hfield     = hname "=" hvalue
//! ```
//!
//! The to-part is percent-decoded before it is split into recipients, so
//! an encoded comma only separates recipients outside a quoted local-part.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::chars::{is_atext, is_qtext};
use crate::constants::{
    DEFAULT_MAILTO_HEADERS, DEFAULT_MAX_RECIPIENTS, DEFAULT_MAX_URL_LENGTH, MAILTO_SCHEME,
    MAX_ADDRESS_LENGTH, MAX_LOCAL_PART_LENGTH,
};
use crate::error::{ConfigError, MailtoReason, ValidationError};
use crate::host::{check_dns_name, is_ipv4, is_ipv6};
use crate::percent::{
    MAILTO_ADDRESS_SET, MAILTO_HEADER_SET, check_percent_encoding, percent_decode_ascii,
    percent_encode_latin1,
};
use crate::precheck::precheck_str;
use crate::validator::{SchemeValidator, log_acceptance, log_rejection, strip_scheme};

/// Headers whose values are address lists.
const ADDRESS_HEADERS: [&str; 3] = ["to", "cc", "bcc"];

/// Policy for [`MailtoValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MailtoConfig {
    /// Maximum total length in UTF-16 code units.
    ///
    /// Default: 2048
    pub max_length: usize,

    /// Maximum number of addresses in one list.
    ///
    /// Default: 64
    pub max_recipients: usize,

    /// Maximum local-part length.
    ///
    /// Default: 64
    pub max_local_part_length: usize,

    /// Maximum length of a whole addr-spec.
    ///
    /// Default: 254
    pub max_address_length: usize,

    /// Accept a recipient without `@domain`.
    ///
    /// Default: false
    pub allow_local_only_recipient: bool,

    /// Accept any syntactically valid header name instead of the allow-list.
    ///
    /// Default: true
    pub allow_unknown_headers: bool,

    /// Header names accepted when `allow_unknown_headers` is off.
    ///
    /// Default: `to`, `cc`, `bcc`, `subject`, `body`, `in-reply-to`,
    /// `reply-to`, `from`
    pub allowed_headers: Vec<String>,

    /// Accept CR and LF in a decoded `body` value.
    ///
    /// Default: false
    pub allow_crlf_in_body: bool,

    /// Accept non-ASCII characters in domain labels.
    ///
    /// Default: true
    pub allow_unicode_domain: bool,

    /// Check addresses carried in `to`, `cc` and `bcc` header values.
    ///
    /// Default: true
    pub validate_header_addresses: bool,
}

impl Default for MailtoConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_URL_LENGTH,
            max_recipients: DEFAULT_MAX_RECIPIENTS,
            max_local_part_length: MAX_LOCAL_PART_LENGTH,
            max_address_length: MAX_ADDRESS_LENGTH,
            allow_local_only_recipient: false,
            allow_unknown_headers: true,
            allowed_headers: DEFAULT_MAILTO_HEADERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            allow_crlf_in_body: false,
            allow_unicode_domain: true,
            validate_header_addresses: true,
        }
    }
}

impl MailtoConfig {
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

    /// Sets the maximum number of recipients per list.
    #[must_use]
    pub const fn with_max_recipients(mut self, max: usize) -> Self {
        self.max_recipients = max;
        self
    }

    /// Sets the maximum local-part length.
    #[must_use]
    pub const fn with_max_local_part_length(mut self, max: usize) -> Self {
        self.max_local_part_length = max;
        self
    }

    /// Sets the maximum addr-spec length.
    #[must_use]
    pub const fn with_max_address_length(mut self, max: usize) -> Self {
        self.max_address_length = max;
        self
    }

    /// Enables or disables recipients without a domain.
    #[must_use]
    pub const fn with_allow_local_only_recipient(mut self, allow: bool) -> Self {
        self.allow_local_only_recipient = allow;
        self
    }

    /// Enables or disables header names outside the allow-list.
    #[must_use]
    pub const fn with_allow_unknown_headers(mut self, allow: bool) -> Self {
        self.allow_unknown_headers = allow;
        self
    }

    /// Replaces the header allow-list.
    #[must_use]
    pub fn with_allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables CR/LF in the body.
    #[must_use]
    pub const fn with_allow_crlf_in_body(mut self, allow: bool) -> Self {
        self.allow_crlf_in_body = allow;
        self
    }

    /// Enables or disables non-ASCII domain labels.
    #[must_use]
    pub const fn with_allow_unicode_domain(mut self, allow: bool) -> Self {
        self.allow_unicode_domain = allow;
        self
    }

    /// Enables or disables address checks inside headers.
    #[must_use]
    pub const fn with_validate_header_addresses(mut self, validate: bool) -> Self {
        self.validate_header_addresses = validate;
        self
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a limit is zero, the local-part limit
    /// exceeds the address limit, the allow-list is empty while
    /// `allow_unknown_headers` is off, or an entry is not a header name.
    pub fn check(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_length", self.max_length),
            ("max_recipients", self.max_recipients),
            ("max_local_part_length", self.max_local_part_length),
            ("max_address_length", self.max_address_length),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLimit { field });
            }
        }
        if self.max_local_part_length > self.max_address_length {
            return Err(ConfigError::Inconsistent {
                reason: "max_local_part_length exceeds max_address_length",
            });
        }
        if !self.allow_unknown_headers && self.allowed_headers.is_empty() {
            return Err(ConfigError::EmptyAllowList {
                field: "allowed_headers",
            });
        }
        if let Some(entry) = self.allowed_headers.iter().find(|h| !is_header_name(h)) {
            return Err(ConfigError::InvalidAllowListEntry {
                field: "allowed_headers",
                entry: entry.clone(),
            });
        }
        Ok(())
    }
}

fn is_header_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// One validated addr-spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Address {
    local_part: String,
    domain: Option<String>,
}

impl Address {
    /// Returns the decoded local-part, with quotes if it was quoted.
    #[must_use]
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    /// Returns the domain, lower-cased unless it is a literal.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns true if the local-part is a quoted-string.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.local_part.starts_with('"')
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.local_part)?;
        if let Some(domain) = &self.domain {
            write!(f, "@{domain}")?;
        }
        Ok(())
    }
}

/// Decoded header fields, keyed by lower-cased name.
///
/// Repeated names keep every value in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MailtoHeaders {
    fields: BTreeMap<String, Vec<String>>,
}

impl MailtoHeaders {
    /// Returns the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[][..], Vec::as_slice)
    }

    /// Returns true if there are no header fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over names and their values, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    fn push(&mut self, name: String, value: String) {
        self.fields.entry(name).or_default().push(value);
    }
}

/// A validated `mailto:` URL.
///
/// # Examples
///
/// ```
/// use opaque_uri::{MailtoValidator, SchemeValidator};
///
/// let url = MailtoValidator::default()
///     .validate("mailto:a@example.com,b@example.com?subject=Hi")
///     .unwrap();
/// assert_eq!(url.recipients().len(), 2);
/// assert_eq!(url.headers().get("subject"), Some("Hi"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MailtoUrl {
    recipients: Vec<Address>,
    headers: MailtoHeaders,
    canonical: String,
}

impl MailtoUrl {
    /// Returns the recipients from the to-part.
    #[must_use]
    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    /// Returns the decoded header fields.
    #[must_use]
    pub const fn headers(&self) -> &MailtoHeaders {
        &self.headers
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for MailtoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for MailtoUrl {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

/// Validator for `mailto:` URLs.
#[derive(Debug, Clone)]
pub struct MailtoValidator {
    config: MailtoConfig,
    allowed: BTreeSet<String>,
}

impl Default for MailtoValidator {
    fn default() -> Self {
        Self::new(MailtoConfig::default())
    }
}

impl MailtoValidator {
    /// Creates a validator.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is inconsistent. Use
    /// [`MailtoValidator::try_new`] for fallible construction.
    #[must_use]
    pub fn new(config: MailtoConfig) -> Self {
        Self::try_new(config).expect("valid mailto: configuration")
    }

    /// Creates a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is inconsistent.
    pub fn try_new(config: MailtoConfig) -> Result<Self, ConfigError> {
        config.check()?;
        let allowed = config
            .allowed_headers
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        Ok(Self { config, allowed })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MailtoConfig {
        &self.config
    }

    fn validate_inner(&self, candidate: &str) -> Result<MailtoUrl, ValidationError<MailtoReason>> {
        precheck_str(candidate, self.config.max_length, Self::ALLOWS_SPACE)
            .map_err(ValidationError::lift)?;

        let rest = strip_scheme(candidate, MAILTO_SCHEME)
            .ok_or(ValidationError::new(MailtoReason::MissingScheme))?;

        if rest.contains('#') {
            return Err(ValidationError::new(MailtoReason::FragmentNotAllowed));
        }

        let (to, hfields) = match rest.split_once('?') {
            Some((to, hfields)) => (to, (!hfields.is_empty()).then_some(hfields)),
            None => (rest, None),
        };
        if to.is_empty() && hfields.is_none() {
            return Err(ValidationError::new(MailtoReason::EmptyMailto));
        }

        let recipients = if to.is_empty() {
            Vec::new()
        } else {
            check_percent_encoding(to).map_err(malformed_percent)?;
            self.parse_address_list(&percent_decode_ascii(to))?
        };

        let headers = match hfields {
            Some(hfields) => self.parse_hfields(hfields)?,
            None => MailtoHeaders::default(),
        };

        let canonical = render(&recipients, &headers);

        Ok(MailtoUrl {
            recipients,
            headers,
            canonical,
        })
    }

    /// Splits a decoded address list on commas outside quoted local-parts
    /// and checks each addr-spec.
    fn parse_address_list(
        &self,
        decoded: &str,
    ) -> Result<Vec<Address>, ValidationError<MailtoReason>> {
        if let Some((position, c)) = decoded
            .chars()
            .enumerate()
            .find(|(_, c)| c.is_ascii_control())
        {
            return Err(ValidationError::with_detail(
                MailtoReason::ControlInAddress,
                format!("U+{:04X} at position {position}", u32::from(c)),
            ));
        }

        let parts = split_recipients(decoded)?;
        if parts.len() > self.config.max_recipients {
            return Err(ValidationError::with_detail(
                MailtoReason::TooManyRecipients,
                format!(
                    "{} recipients exceed maximum {}",
                    parts.len(),
                    self.config.max_recipients
                ),
            ));
        }

        parts
            .into_iter()
            .map(|part| self.parse_addr_spec(part))
            .collect()
    }

    fn parse_addr_spec(&self, spec: &str) -> Result<Address, ValidationError<MailtoReason>> {
        if spec.is_empty() {
            return Err(ValidationError::new(MailtoReason::EmptyRecipient));
        }

        let len = spec.encode_utf16().count();
        if len > self.config.max_address_length {
            return Err(ValidationError::with_detail(
                MailtoReason::AddressTooLong,
                format!("length {len}"),
            ));
        }

        let (local_part, domain) = if spec.starts_with('"') {
            let end = quoted_local_part_end(spec)?;
            let (local, rest) = spec.split_at(end);
            match rest.strip_prefix('@') {
                Some(domain) => (local, Some(domain)),
                None if rest.is_empty() => (local, None),
                None => {
                    return Err(ValidationError::with_detail(
                        MailtoReason::TrailingAfterQuote,
                        rest,
                    ));
                }
            }
        } else {
            match spec.split_once('@') {
                Some((local, domain)) => (local, Some(domain)),
                None => (spec, None),
            }
        };

        if local_part.is_empty() {
            return Err(ValidationError::new(MailtoReason::EmptyLocalPart));
        }
        let local_len = local_part.encode_utf16().count();
        if local_len > self.config.max_local_part_length {
            return Err(ValidationError::with_detail(
                MailtoReason::LocalPartTooLong,
                format!("length {local_len}"),
            ));
        }
        if !local_part.starts_with('"') && !is_dot_atom(local_part) {
            return Err(ValidationError::with_detail(
                MailtoReason::InvalidLocalPart,
                local_part,
            ));
        }

        let domain = match domain {
            Some(domain) => Some(self.check_domain(domain)?),
            None if self.config.allow_local_only_recipient => None,
            None => {
                return Err(ValidationError::with_detail(
                    MailtoReason::MissingDomain,
                    local_part,
                ));
            }
        };

        Ok(Address {
            local_part: local_part.to_string(),
            domain,
        })
    }

    fn check_domain(&self, domain: &str) -> Result<String, ValidationError<MailtoReason>> {
        if domain.is_empty() {
            return Err(ValidationError::new(MailtoReason::EmptyDomain));
        }

        if let Some(literal) = domain.strip_prefix('[') {
            let valid = literal.strip_suffix(']').is_some_and(|inner| {
                if is_ipv4(inner) {
                    return true;
                }
                inner
                    .get(..5)
                    .filter(|tag| tag.eq_ignore_ascii_case("IPv6:"))
                    .is_some_and(|_| is_ipv6(&inner[5..]))
            });
            if !valid {
                return Err(ValidationError::with_detail(
                    MailtoReason::InvalidDomainLiteral,
                    domain,
                ));
            }
            return Ok(domain.to_string());
        }

        check_dns_name(domain, self.config.allow_unicode_domain)
            .map_err(|why| ValidationError::with_detail(MailtoReason::InvalidDomain, why))?;
        Ok(domain.to_ascii_lowercase())
    }

    fn parse_hfields(&self, hfields: &str) -> Result<MailtoHeaders, ValidationError<MailtoReason>> {
        let mut headers = MailtoHeaders::default();

        for field in hfields.split('&') {
            if field.is_empty() {
                return Err(ValidationError::new(MailtoReason::EmptyHeader));
            }
            let (name, value) = field.split_once('=').ok_or_else(|| {
                ValidationError::with_detail(MailtoReason::MissingHeaderValue, field)
            })?;

            if !is_header_name(name) {
                return Err(ValidationError::with_detail(
                    MailtoReason::InvalidHeaderName,
                    name,
                ));
            }
            let name = name.to_ascii_lowercase();
            if !self.config.allow_unknown_headers && !self.allowed.contains(&name) {
                return Err(ValidationError::with_detail(
                    MailtoReason::HeaderNotAllowed,
                    name,
                ));
            }

            check_percent_encoding(value).map_err(malformed_percent)?;
            let decoded = percent_decode_ascii(value);

            let crlf_ok = self.config.allow_crlf_in_body && name == "body";
            if let Some(c) = decoded
                .chars()
                .find(|&c| c.is_ascii_control() && !(crlf_ok && matches!(c, '\r' | '\n')))
            {
                return Err(ValidationError::with_detail(
                    MailtoReason::ControlInHeader,
                    format!("U+{:04X} in '{name}'", u32::from(c)),
                ));
            }

            if self.config.validate_header_addresses
                && ADDRESS_HEADERS.contains(&name.as_str())
                && !decoded.is_empty()
            {
                self.parse_address_list(&decoded).map_err(|inner| {
                    ValidationError::with_detail(
                        MailtoReason::InvalidHeaderAddress,
                        format!("{name}: {}", inner.reason),
                    )
                })?;
            }

            headers.push(name, decoded);
        }

        Ok(headers)
    }
}

impl SchemeValidator for MailtoValidator {
    type Output = MailtoUrl;
    type Reason = MailtoReason;

    const SCHEME: &'static str = MAILTO_SCHEME;

    fn max_length(&self) -> usize {
        self.config.max_length
    }

    fn validate(&self, candidate: &str) -> Result<MailtoUrl, ValidationError<MailtoReason>> {
        self.validate_inner(candidate)
            .map_err(|e| log_rejection(MAILTO_SCHEME, e))
            .inspect(|url| log_acceptance(MAILTO_SCHEME, url))
    }
}

/// Splits on commas outside quoted-strings, honouring backslash escapes.
fn split_recipients(decoded: &str) -> Result<Vec<&str>, ValidationError<MailtoReason>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in decoded.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
        } else if c == '"' {
            in_quote = true;
        } else if c == ',' {
            parts.push(&decoded[start..i]);
            start = i + 1;
        }
    }

    if escaped {
        return Err(ValidationError::new(MailtoReason::DanglingEscape));
    }
    if in_quote {
        return Err(ValidationError::new(MailtoReason::UnterminatedQuotedString));
    }
    parts.push(&decoded[start..]);
    Ok(parts)
}

/// Returns the byte offset just past the closing quote of a quoted local-part.
fn quoted_local_part_end(spec: &str) -> Result<usize, ValidationError<MailtoReason>> {
    let mut chars = spec.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok(i + 1),
            '\\' => match chars.next() {
                Some((_, escaped)) if escaped == '\t' || (' '..='~').contains(&escaped) => {}
                Some((j, escaped)) => {
                    return Err(ValidationError::with_detail(
                        MailtoReason::InvalidQuotedLocalPart,
                        format!("invalid escape '{escaped}' at offset {j}"),
                    ));
                }
                None => return Err(ValidationError::new(MailtoReason::DanglingEscape)),
            },
            c if c == ' ' || is_qtext(c) => {}
            c => {
                return Err(ValidationError::with_detail(
                    MailtoReason::InvalidQuotedLocalPart,
                    format!("character '{c}' at offset {i}"),
                ));
            }
        }
    }
    Err(ValidationError::new(MailtoReason::UnterminatedQuotedString))
}

/// `1*atext *( "." 1*atext )`
fn is_dot_atom(s: &str) -> bool {
    s.split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

fn malformed_percent(offset: usize) -> ValidationError<MailtoReason> {
    ValidationError::with_detail(
        MailtoReason::MalformedPercentEncoding,
        format!("malformed '%' at offset {offset}"),
    )
}

fn render(recipients: &[Address], headers: &MailtoHeaders) -> String {
    let to = recipients
        .iter()
        .map(|addr| percent_encode_latin1(&addr.to_string(), MAILTO_ADDRESS_SET))
        .collect::<Vec<_>>()
        .join(",");

    let mut out = format!("{MAILTO_SCHEME}:{to}");
    let mut separator = '?';
    for (name, values) in headers.iter() {
        for value in values {
            out.push(separator);
            out.push_str(name);
            out.push('=');
            out.push_str(&percent_encode_latin1(value, MAILTO_HEADER_SET));
            separator = '&';
        }
    }
    out
}
