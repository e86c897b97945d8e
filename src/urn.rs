//! Validator for `urn:` URLs (RFC 8141).
//!
//! # Grammar Reference
//!
//! ```abnf
//! namestring  = "urn:" NID ":" NSS [ "?+" r-component ] [ "?=" q-component ] [ "#" f-component ]
//! NID         = alphanum 0*30( alphanum / "-" )
//! NSS         = pchar *( pchar / "/" )
//! r-component = 1*( pchar / "/" / "?" )
//! q-component = 1*( pchar / "/" / "?" )
//! ```
//!
//! The fragment is split off first since it ends the whole name. The NSS
//! ends at the first `?`, which must open a `?+` or `?=` marker. Each
//! marker may appear once and `?+` must come before `?=`.

use std::fmt;

use crate::component::{ComponentError, ComponentKind};
use crate::constants::{DEFAULT_MAX_URL_LENGTH, MAX_NID_LENGTH, URN_SCHEME};
use crate::error::{ConfigError, UrnReason, ValidationError};
use crate::precheck::precheck_str;
use crate::validator::{SchemeValidator, log_acceptance, log_rejection, strip_scheme};

/// Policy for [`UrnValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UrnConfig {
    /// Maximum total length in UTF-16 code units.
    ///
    /// Default: 2048
    pub max_length: usize,

    /// Maximum namespace identifier length.
    ///
    /// Default: 31
    pub max_nid_length: usize,

    /// Whether a `?+` r-component is accepted.
    ///
    /// Default: true
    pub allow_r_component: bool,

    /// Whether a `?=` q-component is accepted.
    ///
    /// Default: true
    pub allow_q_component: bool,

    /// Whether a `#` f-component is accepted.
    ///
    /// Default: true
    pub allow_f_component: bool,
}

impl Default for UrnConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_URL_LENGTH,
            max_nid_length: MAX_NID_LENGTH,
            allow_r_component: true,
            allow_q_component: true,
            allow_f_component: true,
        }
    }
}

impl UrnConfig {
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

    /// Sets the maximum NID length.
    #[must_use]
    pub const fn with_max_nid_length(mut self, max: usize) -> Self {
        self.max_nid_length = max;
        self
    }

    /// Enables or disables r-components.
    #[must_use]
    pub const fn with_allow_r_component(mut self, allow: bool) -> Self {
        self.allow_r_component = allow;
        self
    }

    /// Enables or disables q-components.
    #[must_use]
    pub const fn with_allow_q_component(mut self, allow: bool) -> Self {
        self.allow_q_component = allow;
        self
    }

    /// Enables or disables f-components.
    #[must_use]
    pub const fn with_allow_f_component(mut self, allow: bool) -> Self {
        self.allow_f_component = allow;
        self
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a limit is zero.
    pub const fn check(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_length",
            });
        }
        if self.max_nid_length == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_nid_length",
            });
        }
        Ok(())
    }
}

/// A validated `urn:` URL.
///
/// # Examples
///
/// ```
/// use opaque_uri::{SchemeValidator, UrnValidator};
///
/// let urn = UrnValidator::default()
///     .validate("URN:IETF:rfc:3986?=lang=en")
///     .unwrap();
/// assert_eq!(urn.nid(), "ietf");
/// assert_eq!(urn.nss(), "rfc:3986");
/// assert_eq!(urn.q_component(), Some("lang=en"));
/// assert_eq!(urn.assigned_name(), "urn:ietf:rfc:3986");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UrnUrl {
    nid: String,
    nss: String,
    r_component: Option<String>,
    q_component: Option<String>,
    f_component: Option<String>,
    canonical: String,
}

impl UrnUrl {
    /// Returns the lower-cased namespace identifier.
    #[must_use]
    pub fn nid(&self) -> &str {
        &self.nid
    }

    /// Returns the namespace-specific string, verbatim.
    #[must_use]
    pub fn nss(&self) -> &str {
        &self.nss
    }

    /// Returns the r-component.
    #[must_use]
    pub fn r_component(&self) -> Option<&str> {
        self.r_component.as_deref()
    }

    /// Returns the q-component.
    #[must_use]
    pub fn q_component(&self) -> Option<&str> {
        self.q_component.as_deref()
    }

    /// Returns the f-component. An empty fragment after `#` is `Some("")`.
    #[must_use]
    pub fn f_component(&self) -> Option<&str> {
        self.f_component.as_deref()
    }

    /// Returns `urn:<nid>:<nss>`, the part that decides URN equivalence.
    #[must_use]
    pub fn assigned_name(&self) -> String {
        format!("{URN_SCHEME}:{}:{}", self.nid, self.nss)
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for UrnUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for UrnUrl {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Resolution,
    Query,
}

/// Validator for `urn:` URLs.
#[derive(Debug, Clone)]
pub struct UrnValidator {
    config: UrnConfig,
}

impl Default for UrnValidator {
    fn default() -> Self {
        Self::new(UrnConfig::default())
    }
}

impl UrnValidator {
    /// Creates a validator.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is inconsistent. Use
    /// [`UrnValidator::try_new`] for fallible construction.
    #[must_use]
    pub fn new(config: UrnConfig) -> Self {
        Self::try_new(config).expect("valid urn: configuration")
    }

    /// Creates a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is inconsistent.
    pub fn try_new(config: UrnConfig) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &UrnConfig {
        &self.config
    }

    fn validate_inner(&self, candidate: &str) -> Result<UrnUrl, ValidationError<UrnReason>> {
        precheck_str(candidate, self.config.max_length, Self::ALLOWS_SPACE)
            .map_err(ValidationError::lift)?;

        let rest = strip_scheme(candidate, URN_SCHEME)
            .ok_or(ValidationError::new(UrnReason::MissingScheme))?;

        let (rest, f_component) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (rest, None),
        };

        let (raw_nid, after_nid) = match rest.split_once(':') {
            Some((nid, after)) => (nid, Some(after)),
            None => (rest, None),
        };
        let nid = self.check_nid(raw_nid)?;

        let after_nid = after_nid.ok_or(ValidationError::new(UrnReason::MissingNss))?;
        let (nss, components) = match after_nid.find('?') {
            Some(idx) => after_nid.split_at(idx),
            None => (after_nid, ""),
        };
        check_nss(nss)?;

        let (r_component, q_component) = self.check_components(components)?;

        if let Some(fragment) = f_component {
            if !self.config.allow_f_component {
                return Err(ValidationError::new(UrnReason::FComponentNotAllowed));
            }
            ComponentKind::Fragment
                .check(fragment)
                .map_err(|e| component_error(e, UrnReason::InvalidFComponent))?;
        }

        let mut canonical = format!("{URN_SCHEME}:{nid}:{nss}");
        if let Some(r) = r_component {
            canonical.push_str("?+");
            canonical.push_str(r);
        }
        if let Some(q) = q_component {
            canonical.push_str("?=");
            canonical.push_str(q);
        }
        if let Some(fragment) = f_component {
            canonical.push('#');
            canonical.push_str(fragment);
        }

        Ok(UrnUrl {
            nid,
            nss: nss.to_string(),
            r_component: r_component.map(str::to_string),
            q_component: q_component.map(str::to_string),
            f_component: f_component.map(str::to_string),
            canonical,
        })
    }

    fn check_nid(&self, nid: &str) -> Result<String, ValidationError<UrnReason>> {
        if nid.is_empty() {
            return Err(ValidationError::new(UrnReason::MissingNid));
        }
        let len = nid.chars().count();
        if len > self.config.max_nid_length {
            return Err(ValidationError::with_detail(
                UrnReason::NidTooLong,
                format!("length {len}"),
            ));
        }
        let mut chars = nid.chars();
        let starts_alnum = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
        if !starts_alnum || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError::with_detail(UrnReason::InvalidNid, nid));
        }
        Ok(nid.to_ascii_lowercase())
    }

    /// Splits `?+r?=q` on its markers and checks each component.
    fn check_components<'a>(
        &self,
        components: &'a str,
    ) -> Result<(Option<&'a str>, Option<&'a str>), ValidationError<UrnReason>> {
        let mut r_component = None;
        let mut q_component = None;

        for (marker, body) in split_markers(components)? {
            match marker {
                Marker::Resolution => {
                    if r_component.is_some() {
                        return Err(ValidationError::new(UrnReason::DuplicateRComponent));
                    }
                    if q_component.is_some() {
                        return Err(ValidationError::new(UrnReason::ComponentOrder));
                    }
                    if !self.config.allow_r_component {
                        return Err(ValidationError::new(UrnReason::RComponentNotAllowed));
                    }
                    if body.is_empty() {
                        return Err(ValidationError::new(UrnReason::EmptyRComponent));
                    }
                    ComponentKind::Query
                        .check(body)
                        .map_err(|e| component_error(e, UrnReason::InvalidRComponent))?;
                    r_component = Some(body);
                }
                Marker::Query => {
                    if q_component.is_some() {
                        return Err(ValidationError::new(UrnReason::DuplicateQComponent));
                    }
                    if !self.config.allow_q_component {
                        return Err(ValidationError::new(UrnReason::QComponentNotAllowed));
                    }
                    if body.is_empty() {
                        return Err(ValidationError::new(UrnReason::EmptyQComponent));
                    }
                    ComponentKind::Query
                        .check(body)
                        .map_err(|e| component_error(e, UrnReason::InvalidQComponent))?;
                    q_component = Some(body);
                }
            }
        }

        Ok((r_component, q_component))
    }
}

impl SchemeValidator for UrnValidator {
    type Output = UrnUrl;
    type Reason = UrnReason;

    const SCHEME: &'static str = URN_SCHEME;

    fn max_length(&self) -> usize {
        self.config.max_length
    }

    fn validate(&self, candidate: &str) -> Result<UrnUrl, ValidationError<UrnReason>> {
        self.validate_inner(candidate)
            .map_err(|e| log_rejection(URN_SCHEME, e))
            .inspect(|url| log_acceptance(URN_SCHEME, url))
    }
}

fn check_nss(nss: &str) -> Result<(), ValidationError<UrnReason>> {
    if nss.is_empty() {
        return Err(ValidationError::new(UrnReason::MissingNss));
    }
    if nss.starts_with('/') {
        return Err(ValidationError::new(UrnReason::NssLeadingSlash));
    }
    ComponentKind::Path
        .check(nss)
        .map_err(|e| component_error(e, UrnReason::InvalidNss))
}

/// Cuts the component tail at each `?+` / `?=` marker. The tail must be
/// empty or start with a marker.
fn split_markers(tail: &str) -> Result<Vec<(Marker, &str)>, ValidationError<UrnReason>> {
    let marker_at = |i: usize| match tail.as_bytes().get(i..i + 2) {
        Some(b"?+") => Some(Marker::Resolution),
        Some(b"?=") => Some(Marker::Query),
        _ => None,
    };

    if tail.is_empty() {
        return Ok(Vec::new());
    }
    let Some(mut marker) = marker_at(0) else {
        return Err(ValidationError::with_detail(
            UrnReason::InvalidComponentMarker,
            tail.chars().take(2).collect::<String>(),
        ));
    };

    let mut segments = Vec::new();
    let mut start = 2;
    let mut i = 2;
    while i < tail.len() {
        if let Some(next) = marker_at(i) {
            segments.push((marker, &tail[start..i]));
            marker = next;
            start = i + 2;
            i += 2;
        } else {
            i += 1;
        }
    }
    segments.push((marker, &tail[start..]));
    Ok(segments)
}

fn component_error(err: ComponentError, invalid: UrnReason) -> ValidationError<UrnReason> {
    let reason = match err {
        ComponentError::InvalidChar { .. } => invalid,
        ComponentError::MalformedPercent { .. } => UrnReason::MalformedPercentEncoding,
    };
    ValidationError::with_detail(reason, err.detail())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(validator: &UrnValidator, input: &str) -> UrnReason {
        validator.validate(input).unwrap_err().reason
    }

    #[test]
    fn simple_urn() {
        let urn = UrnValidator::default().validate("urn:ietf:rfc:3986").unwrap();
        assert_eq!(urn.nid(), "ietf");
        assert_eq!(urn.nss(), "rfc:3986");
        assert!(urn.r_component().is_none());
        assert!(urn.q_component().is_none());
        assert!(urn.f_component().is_none());
        assert_eq!(urn.canonical(), "urn:ietf:rfc:3986");
    }

    #[test]
    fn duplicate_q_component() {
        let err = UrnValidator::default()
            .validate("urn:ietf:rfc:3986?=q1?=q2")
            .unwrap_err();
        assert_eq!(err.reason, UrnReason::DuplicateQComponent);
        assert_eq!(err.reason.as_str(), "duplicate q-component");
    }

    #[test]
    fn all_components() {
        let urn = UrnValidator::default()
            .validate("urn:example:a/b?+res?x=1?=q=2#frag")
            .unwrap();
        assert_eq!(urn.r_component(), Some("res?x=1"));
        assert_eq!(urn.q_component(), Some("q=2"));
        assert_eq!(urn.f_component(), Some("frag"));
        assert_eq!(urn.canonical(), "urn:example:a/b?+res?x=1?=q=2#frag");
    }

    #[test]
    fn nid_is_lowercased_nss_is_not() {
        let urn = UrnValidator::default().validate("urn:ISBN:0-486-27557-4X").unwrap();
        assert_eq!(urn.nid(), "isbn");
        assert_eq!(urn.canonical(), "urn:isbn:0-486-27557-4X");
        assert_eq!(urn.assigned_name(), "urn:isbn:0-486-27557-4X");
    }

    #[test]
    fn nid_rules() {
        let validator = UrnValidator::default();
        assert_eq!(reason(&validator, "urn::x"), UrnReason::MissingNid);
        assert_eq!(reason(&validator, "urn:-abc:x"), UrnReason::InvalidNid);
        assert_eq!(reason(&validator, "urn:a_b:x"), UrnReason::InvalidNid);
        let long = format!("urn:{}:x", "a".repeat(32));
        assert_eq!(reason(&validator, &long), UrnReason::NidTooLong);
        let max = format!("urn:{}:x", "a".repeat(31));
        assert!(validator.is_valid(&max));
    }

    #[test]
    fn nss_rules() {
        let validator = UrnValidator::default();
        assert_eq!(reason(&validator, "urn:isbn"), UrnReason::MissingNss);
        assert_eq!(reason(&validator, "urn:isbn:"), UrnReason::MissingNss);
        assert_eq!(reason(&validator, "urn:isbn:?=q"), UrnReason::MissingNss);
        assert_eq!(reason(&validator, "urn:isbn:/x"), UrnReason::NssLeadingSlash);
        assert_eq!(reason(&validator, "urn:isbn:a^b"), UrnReason::InvalidNss);
        assert_eq!(
            reason(&validator, "urn:isbn:a%2"),
            UrnReason::MalformedPercentEncoding
        );
    }

    #[test]
    fn component_markers() {
        let validator = UrnValidator::default();
        assert_eq!(reason(&validator, "urn:a:b?x"), UrnReason::InvalidComponentMarker);
        assert_eq!(reason(&validator, "urn:a:b?"), UrnReason::InvalidComponentMarker);
        assert_eq!(reason(&validator, "urn:a:b?+"), UrnReason::EmptyRComponent);
        assert_eq!(reason(&validator, "urn:a:b?=#f"), UrnReason::EmptyQComponent);
        assert_eq!(reason(&validator, "urn:a:b?+r1?+r2"), UrnReason::DuplicateRComponent);
        assert_eq!(reason(&validator, "urn:a:b?=q?+r"), UrnReason::ComponentOrder);
        assert_eq!(reason(&validator, "urn:a:b?+r^"), UrnReason::InvalidRComponent);
        assert_eq!(reason(&validator, "urn:a:b?=q^"), UrnReason::InvalidQComponent);
        assert_eq!(reason(&validator, "urn:a:b#f^"), UrnReason::InvalidFComponent);
    }

    #[test]
    fn component_policy() {
        let validator = UrnValidator::new(
            UrnConfig::new()
                .with_allow_r_component(false)
                .with_allow_q_component(false)
                .with_allow_f_component(false),
        );
        assert!(validator.is_valid("urn:a:b"));
        assert_eq!(reason(&validator, "urn:a:b?+r"), UrnReason::RComponentNotAllowed);
        assert_eq!(reason(&validator, "urn:a:b?=q"), UrnReason::QComponentNotAllowed);
        assert_eq!(reason(&validator, "urn:a:b#f"), UrnReason::FComponentNotAllowed);
    }

    #[test]
    fn empty_fragment_is_kept() {
        let urn = UrnValidator::default().validate("urn:a:b#").unwrap();
        assert_eq!(urn.f_component(), Some(""));
        assert_eq!(urn.canonical(), "urn:a:b#");
    }

    #[test]
    fn split_markers_cases() {
        assert!(split_markers("").unwrap().is_empty());
        assert_eq!(
            split_markers("?+a?=b").unwrap(),
            [(Marker::Resolution, "a"), (Marker::Query, "b")]
        );
        assert_eq!(split_markers("?=a?b").unwrap(), [(Marker::Query, "a?b")]);
    }
}
