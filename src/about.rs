//! Validator for `about:` URLs.
//!
//! # Grammar Reference
//!
//! ```abnf
//! about-url = "about:" [ "//" ] identity [ path ] [ "?" query ] [ "#" fragment ]
//! identity  = 1*( unreserved / pct-encoded )
//! path      = "/" *( pchar / "/" )
//! ```
//!
//! The scheme and identity match case-insensitively; the identity is
//! compared after percent-decoding.

use std::collections::BTreeSet;
use std::fmt;

use crate::chars::is_unreserved;
use crate::component::{ComponentError, ComponentKind};
use crate::constants::{
    ABOUT_SCHEME, DEFAULT_ABOUT_IDENTITIES, DEFAULT_MAX_ABOUT_IDENTITY_LENGTH,
    DEFAULT_MAX_URL_LENGTH,
};
use crate::error::{AboutReason, ConfigError, ValidationError};
use crate::percent::{check_percent_encoding, percent_decode_ascii};
use crate::precheck::precheck_str;
use crate::validator::{SchemeValidator, log_acceptance, log_rejection, split_off, strip_scheme};

/// Policy for [`AboutValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AboutConfig {
    /// Maximum total length in UTF-16 code units.
    ///
    /// Default: 2048
    pub max_length: usize,

    /// Maximum identity length before decoding.
    ///
    /// Default: 64
    pub max_identity_length: usize,

    /// Whether `about://blank` is accepted as a spelling of `about:blank`.
    ///
    /// Default: true
    pub allow_about_slash_slash: bool,

    /// Accept any syntactically valid identity instead of the allow-list.
    ///
    /// Default: false
    pub allow_any_identity: bool,

    /// Identities accepted when `allow_any_identity` is off.
    ///
    /// Default: `blank`, `srcdoc`
    pub allowed_identities: Vec<String>,

    /// Whether a `?query` tail is accepted.
    ///
    /// Default: true
    pub allow_query: bool,

    /// Whether a `#fragment` tail is accepted.
    ///
    /// Default: true
    pub allow_fragment: bool,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_URL_LENGTH,
            max_identity_length: DEFAULT_MAX_ABOUT_IDENTITY_LENGTH,
            allow_about_slash_slash: true,
            allow_any_identity: false,
            allowed_identities: DEFAULT_ABOUT_IDENTITIES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            allow_query: true,
            allow_fragment: true,
        }
    }
}

impl AboutConfig {
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

    /// Sets the maximum identity length.
    #[must_use]
    pub const fn with_max_identity_length(mut self, max: usize) -> Self {
        self.max_identity_length = max;
        self
    }

    /// Enables or disables the `about://` form.
    #[must_use]
    pub const fn with_allow_about_slash_slash(mut self, allow: bool) -> Self {
        self.allow_about_slash_slash = allow;
        self
    }

    /// Enables or disables accepting any valid identity.
    #[must_use]
    pub const fn with_allow_any_identity(mut self, allow: bool) -> Self {
        self.allow_any_identity = allow;
        self
    }

    /// Replaces the identity allow-list.
    #[must_use]
    pub fn with_allowed_identities<I, S>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_identities = identities.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables the query tail.
    #[must_use]
    pub const fn with_allow_query(mut self, allow: bool) -> Self {
        self.allow_query = allow;
        self
    }

    /// Enables or disables the fragment tail.
    #[must_use]
    pub const fn with_allow_fragment(mut self, allow: bool) -> Self {
        self.allow_fragment = allow;
        self
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a limit is zero, the allow-list is empty
    /// while `allow_any_identity` is off, or an allow-list entry is not a
    /// valid identity.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_length",
            });
        }
        if self.max_identity_length == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_identity_length",
            });
        }
        if !self.allow_any_identity && self.allowed_identities.is_empty() {
            return Err(ConfigError::EmptyAllowList {
                field: "allowed_identities",
            });
        }
        for entry in &self.allowed_identities {
            if !is_identity_syntax(entry) {
                return Err(ConfigError::InvalidAllowListEntry {
                    field: "allowed_identities",
                    entry: entry.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_identity_syntax(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| is_unreserved(c) || c == '%')
        && check_percent_encoding(s).is_ok()
}

/// A validated `about:` URL.
///
/// # Examples
///
/// ```
/// use opaque_uri::{AboutValidator, SchemeValidator};
///
/// let validator = AboutValidator::default();
/// let url = validator.validate("about:blank").unwrap();
/// assert_eq!(url.identity(), "blank");
/// assert!(url.query().is_none());
/// assert!(url.fragment().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AboutUrl {
    identity: String,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
    slash_slash: bool,
    canonical: String,
}

impl AboutUrl {
    /// Returns the decoded, lower-cased identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the path tail including its leading `/`, if present.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the query without the leading `?`, if present and non-empty.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the fragment without the leading `#`, if present and non-empty.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns true if the input used the `about://` spelling.
    #[must_use]
    pub const fn used_slash_slash(&self) -> bool {
        self.slash_slash
    }

    /// Returns the canonical form: `about:` + lower-cased identity + tail.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for AboutUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for AboutUrl {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

/// Validator for `about:` URLs.
#[derive(Debug, Clone)]
pub struct AboutValidator {
    config: AboutConfig,
    allowed: BTreeSet<String>,
}

impl Default for AboutValidator {
    fn default() -> Self {
        Self::new(AboutConfig::default())
    }
}

impl AboutValidator {
    /// Creates a validator.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is inconsistent. Use
    /// [`AboutValidator::try_new`] for fallible construction.
    #[must_use]
    pub fn new(config: AboutConfig) -> Self {
        Self::try_new(config).expect("valid about: configuration")
    }

    /// Creates a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is inconsistent.
    pub fn try_new(config: AboutConfig) -> Result<Self, ConfigError> {
        config.check()?;
        let allowed = config
            .allowed_identities
            .iter()
            .map(|entry| percent_decode_ascii(entry).to_ascii_lowercase())
            .collect();
        Ok(Self { config, allowed })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &AboutConfig {
        &self.config
    }

    fn validate_inner(&self, candidate: &str) -> Result<AboutUrl, ValidationError<AboutReason>> {
        precheck_str(candidate, self.config.max_length, Self::ALLOWS_SPACE)
            .map_err(ValidationError::lift)?;

        let mut rest = strip_scheme(candidate, ABOUT_SCHEME)
            .ok_or(ValidationError::new(AboutReason::MissingScheme))?;

        let slash_slash = rest.starts_with("//");
        if slash_slash {
            if !self.config.allow_about_slash_slash {
                return Err(ValidationError::new(AboutReason::SlashSlashNotAllowed));
            }
            rest = &rest[2..];
        }

        let (rest, fragment) = split_off(rest, '#');
        let (rest, query) = split_off(rest, '?');
        let (raw_identity, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], Some(&rest[idx..])),
            None => (rest, None),
        };

        let identity = self.check_identity(raw_identity)?;

        if let Some(path) = path {
            ComponentKind::Path
                .check(path)
                .map_err(|e| component_error(e, AboutReason::InvalidPath))?;
        }

        if let Some(query) = query {
            if !self.config.allow_query {
                return Err(ValidationError::new(AboutReason::QueryNotAllowed));
            }
            ComponentKind::Query
                .check(query)
                .map_err(|e| component_error(e, AboutReason::InvalidQuery))?;
        }

        if let Some(fragment) = fragment {
            if !self.config.allow_fragment {
                return Err(ValidationError::new(AboutReason::FragmentNotAllowed));
            }
            ComponentKind::Fragment
                .check(fragment)
                .map_err(|e| component_error(e, AboutReason::InvalidFragment))?;
        }

        let mut canonical = format!("{ABOUT_SCHEME}:{}", raw_identity.to_ascii_lowercase());
        if let Some(path) = path {
            canonical.push_str(path);
        }
        if let Some(query) = query {
            canonical.push('?');
            canonical.push_str(query);
        }
        if let Some(fragment) = fragment {
            canonical.push('#');
            canonical.push_str(fragment);
        }

        Ok(AboutUrl {
            identity,
            path: path.map(str::to_string),
            query: query.map(str::to_string),
            fragment: fragment.map(str::to_string),
            slash_slash,
            canonical,
        })
    }

    fn check_identity(&self, raw: &str) -> Result<String, ValidationError<AboutReason>> {
        if raw.is_empty() {
            return Err(ValidationError::new(AboutReason::EmptyIdentity));
        }

        let len = raw.chars().count();
        if len > self.config.max_identity_length {
            return Err(ValidationError::with_detail(
                AboutReason::IdentityTooLong,
                format!("length {len} exceeds maximum {}", self.config.max_identity_length),
            ));
        }

        if let Some((position, c)) = raw
            .chars()
            .enumerate()
            .find(|&(_, c)| !is_unreserved(c) && c != '%')
        {
            return Err(ValidationError::with_detail(
                AboutReason::InvalidIdentityChar,
                format!("character '{c}' at position {position}"),
            ));
        }

        check_percent_encoding(raw).map_err(|offset| {
            ValidationError::with_detail(
                AboutReason::MalformedPercentEncoding,
                format!("malformed '%' at offset {offset}"),
            )
        })?;

        let identity = percent_decode_ascii(raw).to_ascii_lowercase();
        if !self.config.allow_any_identity && !self.allowed.contains(&identity) {
            return Err(ValidationError::with_detail(
                AboutReason::IdentityNotAllowed,
                identity,
            ));
        }

        Ok(identity)
    }
}

impl SchemeValidator for AboutValidator {
    type Output = AboutUrl;
    type Reason = AboutReason;

    const SCHEME: &'static str = ABOUT_SCHEME;

    fn max_length(&self) -> usize {
        self.config.max_length
    }

    fn validate(&self, candidate: &str) -> Result<AboutUrl, ValidationError<AboutReason>> {
        self.validate_inner(candidate)
            .map_err(|e| log_rejection(ABOUT_SCHEME, e))
            .inspect(|url| log_acceptance(ABOUT_SCHEME, url))
    }
}

fn component_error(err: ComponentError, invalid: AboutReason) -> ValidationError<AboutReason> {
    let reason = match err {
        ComponentError::InvalidChar { .. } => invalid,
        ComponentError::MalformedPercent { .. } => AboutReason::MalformedPercentEncoding,
    };
    ValidationError::with_detail(reason, err.detail())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrecheckReason;

    fn any_identity() -> AboutValidator {
        AboutValidator::new(AboutConfig::new().with_allow_any_identity(true))
    }

    fn reason(validator: &AboutValidator, input: &str) -> AboutReason {
        validator.validate(input).unwrap_err().reason
    }

    #[test]
    fn blank_is_valid() {
        let url = AboutValidator::default().validate("about:blank").unwrap();
        assert_eq!(url.identity(), "blank");
        assert!(url.path().is_none());
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
        assert_eq!(url.canonical(), "about:blank");
    }

    #[test]
    fn srcdoc_is_valid_by_default() {
        assert!(AboutValidator::default().is_valid("about:srcdoc"));
    }

    #[test]
    fn fragment_is_extracted() {
        let url = any_identity().validate("about:config#network").unwrap();
        assert_eq!(url.identity(), "config");
        assert_eq!(url.fragment(), Some("network"));
    }

    #[test]
    fn slash_slash_is_policy_gated() {
        let url = AboutValidator::default().validate("about://blank").unwrap();
        assert!(url.used_slash_slash());
        assert_eq!(url.canonical(), "about:blank");

        let strict =
            AboutValidator::new(AboutConfig::new().with_allow_about_slash_slash(false));
        assert_eq!(
            reason(&strict, "about://blank"),
            AboutReason::SlashSlashNotAllowed
        );
    }

    #[test]
    fn unknown_identity_is_rejected_by_default() {
        let err = AboutValidator::default().validate("about:unknown").unwrap_err();
        assert_eq!(err.reason, AboutReason::IdentityNotAllowed);
        assert_eq!(err.reason.as_str(), "identity not in allowed_identities_arr");
    }

    #[test]
    fn identity_matches_case_insensitively_after_decoding() {
        let url = AboutValidator::default().validate("ABOUT:%42lank").unwrap();
        assert_eq!(url.identity(), "blank");
        assert_eq!(url.canonical(), "about:%42lank");
    }

    #[test]
    fn identity_folds_only_ascii_case() {
        let validator = any_identity();
        let url = validator.validate("about:Caf%C3%89").unwrap();
        assert_eq!(url.identity(), "caf\u{c3}\u{89}");
        assert_eq!(url.canonical(), "about:caf%c3%89");
        assert_eq!(validator.validate(url.canonical()).unwrap(), url);
    }

    #[test]
    fn empty_identity() {
        let validator = any_identity();
        assert_eq!(reason(&validator, "about:"), AboutReason::EmptyIdentity);
        assert_eq!(reason(&validator, "about:#x"), AboutReason::EmptyIdentity);
        assert_eq!(reason(&validator, "about:/path"), AboutReason::EmptyIdentity);
    }

    #[test]
    fn identity_characters() {
        let validator = any_identity();
        assert_eq!(
            reason(&validator, "about:bl@nk"),
            AboutReason::InvalidIdentityChar
        );
        assert_eq!(
            reason(&validator, "about:blank%2"),
            AboutReason::MalformedPercentEncoding
        );
    }

    #[test]
    fn identity_length() {
        let validator = AboutValidator::new(
            AboutConfig::new()
                .with_allow_any_identity(true)
                .with_max_identity_length(4),
        );
        assert!(validator.is_valid("about:abcd"));
        assert_eq!(
            reason(&validator, "about:abcde"),
            AboutReason::IdentityTooLong
        );
    }

    #[test]
    fn tail_components() {
        let url = any_identity()
            .validate("about:Reader/view?url=x%20y#top")
            .unwrap();
        assert_eq!(url.identity(), "reader");
        assert_eq!(url.path(), Some("/view"));
        assert_eq!(url.query(), Some("url=x%20y"));
        assert_eq!(url.fragment(), Some("top"));
        assert_eq!(url.canonical(), "about:reader/view?url=x%20y#top");
    }

    #[test]
    fn tail_errors() {
        let validator = any_identity();
        assert_eq!(reason(&validator, "about:a/<"), AboutReason::InvalidPath);
        assert_eq!(reason(&validator, "about:a?<"), AboutReason::InvalidQuery);
        assert_eq!(reason(&validator, "about:a#<"), AboutReason::InvalidFragment);
        assert_eq!(
            reason(&validator, "about:a#%"),
            AboutReason::MalformedPercentEncoding
        );
    }

    #[test]
    fn query_and_fragment_policy() {
        let validator = AboutValidator::new(
            AboutConfig::new()
                .with_allow_query(false)
                .with_allow_fragment(false),
        );
        assert_eq!(reason(&validator, "about:blank?x"), AboutReason::QueryNotAllowed);
        assert_eq!(
            reason(&validator, "about:blank#x"),
            AboutReason::FragmentNotAllowed
        );
    }

    #[test]
    fn empty_tails_are_stripped() {
        let url = AboutValidator::default().validate("about:blank?#").unwrap();
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
        assert_eq!(url.canonical(), "about:blank");
    }

    #[test]
    fn wrong_scheme() {
        assert_eq!(
            reason(&AboutValidator::default(), "abut:blank"),
            AboutReason::MissingScheme
        );
    }

    #[test]
    fn precheck_runs_first() {
        let validator = AboutValidator::default();
        assert_eq!(
            reason(&validator, "about:bl ank"),
            AboutReason::Precheck(PrecheckReason::Space)
        );
        let units: Vec<u16> = "about:blank"
            .encode_utf16()
            .chain(std::iter::once(0xD800))
            .collect();
        assert_eq!(
            validator.validate_utf16(&units).unwrap_err().reason,
            AboutReason::Precheck(PrecheckReason::LoneHighSurrogate)
        );
    }

    #[test]
    fn config_rejects_empty_allow_list() {
        let config = AboutConfig::new().with_allowed_identities(Vec::<String>::new());
        assert!(matches!(
            AboutValidator::try_new(config),
            Err(ConfigError::EmptyAllowList { .. })
        ));
    }

    #[test]
    fn config_rejects_invalid_entry() {
        let config = AboutConfig::new().with_allowed_identities(["bad entry"]);
        assert!(matches!(
            AboutValidator::try_new(config),
            Err(ConfigError::InvalidAllowListEntry { .. })
        ));
    }

    #[test]
    fn custom_allow_list() {
        let validator =
            AboutValidator::new(AboutConfig::new().with_allowed_identities(["Config"]));
        assert!(validator.is_valid("about:config"));
        assert!(!validator.is_valid("about:blank"));
    }
}
