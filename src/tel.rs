//! Validator for `tel:` URLs (RFC 3966).
//!
//! # Grammar Reference
//!
//! ```abnf
//! telephone-uri = "tel:" ( global-number / local-number ) *( ";" par )
//! global-number = "+" *phonedigit DIGIT *phonedigit
//! local-number  = *phonedigit-hex ( HEXDIG / "*" / "#" ) *phonedigit-hex
//! par           = name [ "=" value ]
//! ```
//!
//! Visual separators (space, `-`, `.`, tab, parentheses) may appear
//! between digits. Parentheses do not nest, must enclose a digit, and
//! act as boundaries for the no-adjacent-separators rule. A bare space
//! passes the precheck but is only accepted in the number itself; in
//! parameters it must be written as `%20`.
//!
//! The canonical form drops visual separators and sorts parameters by name.

use std::collections::BTreeMap;
use std::fmt;

use crate::chars::{is_sub_delim, is_unreserved};
use crate::component::ComponentKind;
use crate::constants::{
    DEFAULT_MAX_LOCAL_DIGITS, DEFAULT_MAX_TEL_LENGTH, MAX_E164_DIGITS, TEL_SCHEME,
};
use crate::error::{ConfigError, TelReason, ValidationError};
use crate::host::check_dns_name;
use crate::percent::{check_percent_encoding, percent_decode_ascii};
use crate::precheck::precheck_str;
use crate::validator::{SchemeValidator, log_acceptance, log_rejection, strip_scheme};

const EXT: &str = "ext";
const ISUB: &str = "isub";
const PHONE_CONTEXT: &str = "phone-context";
const TSP: &str = "tsp";

/// How a domain-name `phone-context` value is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PhoneContextDomainMode {
    /// LDH labels only, as in a DNS host name
    #[default]
    Strict,
    /// Any non-empty RFC 3986 reg-name
    Relaxed,
}

/// Policy for [`TelValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TelConfig {
    /// Maximum total length in UTF-16 code units.
    ///
    /// Default: 512
    pub max_length: usize,

    /// Maximum digits in a global number.
    ///
    /// Default: 15 (E.164)
    pub max_global_digits: usize,

    /// Maximum digits in a local number.
    ///
    /// Default: 64
    pub max_local_digits: usize,

    /// Reject a local number that has no `phone-context` parameter.
    ///
    /// Default: true
    pub require_phone_context_for_local: bool,

    /// Accept parameters other than `ext`, `isub`, `phone-context` and `tsp`.
    ///
    /// Default: true
    pub allow_unknown_params: bool,

    /// Accept `*`, `#` and `A`-`D` in `ext` and `tsp` values.
    ///
    /// Default: false
    pub allow_dtmf_in_ext: bool,

    /// Grammar for domain-name `phone-context` values.
    ///
    /// Default: [`PhoneContextDomainMode::Strict`]
    pub phone_context_domain_mode: PhoneContextDomainMode,
}

impl Default for TelConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_TEL_LENGTH,
            max_global_digits: MAX_E164_DIGITS,
            max_local_digits: DEFAULT_MAX_LOCAL_DIGITS,
            require_phone_context_for_local: true,
            allow_unknown_params: true,
            allow_dtmf_in_ext: false,
            phone_context_domain_mode: PhoneContextDomainMode::Strict,
        }
    }
}

impl TelConfig {
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

    /// Sets the maximum global digit count.
    #[must_use]
    pub const fn with_max_global_digits(mut self, max: usize) -> Self {
        self.max_global_digits = max;
        self
    }

    /// Sets the maximum local digit count.
    #[must_use]
    pub const fn with_max_local_digits(mut self, max: usize) -> Self {
        self.max_local_digits = max;
        self
    }

    /// Requires or waives `phone-context` on local numbers.
    #[must_use]
    pub const fn with_require_phone_context_for_local(mut self, require: bool) -> Self {
        self.require_phone_context_for_local = require;
        self
    }

    /// Enables or disables unknown parameters.
    #[must_use]
    pub const fn with_allow_unknown_params(mut self, allow: bool) -> Self {
        self.allow_unknown_params = allow;
        self
    }

    /// Enables or disables DTMF characters in `ext` and `tsp`.
    #[must_use]
    pub const fn with_allow_dtmf_in_ext(mut self, allow: bool) -> Self {
        self.allow_dtmf_in_ext = allow;
        self
    }

    /// Sets the `phone-context` domain grammar.
    #[must_use]
    pub const fn with_phone_context_domain_mode(mut self, mode: PhoneContextDomainMode) -> Self {
        self.phone_context_domain_mode = mode;
        self
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a limit is zero.
    pub fn check(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_length", self.max_length),
            ("max_global_digits", self.max_global_digits),
            ("max_local_digits", self.max_local_digits),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLimit { field });
            }
        }
        Ok(())
    }
}

/// A validated `tel:` URL.
///
/// # Examples
///
/// ```
/// use opaque_uri::{SchemeValidator, TelValidator};
///
/// let url = TelValidator::default()
///     .validate("tel:+1-555-123-4567;ext=123")
///     .unwrap();
/// assert!(url.is_global());
/// assert_eq!(url.number(), "+15551234567");
/// assert_eq!(url.ext(), Some("123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TelUrl {
    number: String,
    is_global: bool,
    params: BTreeMap<String, Option<String>>,
    canonical: String,
}

impl TelUrl {
    /// Returns the number without visual separators, with `+` if global.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns true for a global (`+`) number.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.is_global
    }

    /// Returns the decoded value of a parameter by lower-case name.
    ///
    /// A parameter present without a value yields `Some("")`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(|value| value.as_deref().unwrap_or(""))
    }

    /// Iterates over parameters sorted by name.
    pub fn params(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Returns the extension.
    #[must_use]
    pub fn ext(&self) -> Option<&str> {
        self.param(EXT)
    }

    /// Returns the ISDN subaddress.
    #[must_use]
    pub fn isub(&self) -> Option<&str> {
        self.param(ISUB)
    }

    /// Returns the phone context.
    #[must_use]
    pub fn phone_context(&self) -> Option<&str> {
        self.param(PHONE_CONTEXT)
    }

    /// Returns the `tsp` value.
    #[must_use]
    pub fn tsp(&self) -> Option<&str> {
        self.param(TSP)
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for TelUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for TelUrl {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

/// A parameter after checking: decoded value for the record, canonical
/// spelling for the normalized form.
struct Param {
    value: Option<String>,
    canonical: Option<String>,
}

/// Validator for `tel:` URLs.
#[derive(Debug, Clone)]
pub struct TelValidator {
    config: TelConfig,
}

impl Default for TelValidator {
    fn default() -> Self {
        Self::new(TelConfig::default())
    }
}

impl TelValidator {
    /// Creates a validator.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is inconsistent. Use
    /// [`TelValidator::try_new`] for fallible construction.
    #[must_use]
    pub fn new(config: TelConfig) -> Self {
        Self::try_new(config).expect("valid tel: configuration")
    }

    /// Creates a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is inconsistent.
    pub fn try_new(config: TelConfig) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TelConfig {
        &self.config
    }

    fn validate_inner(&self, candidate: &str) -> Result<TelUrl, ValidationError<TelReason>> {
        precheck_str(candidate, self.config.max_length, Self::ALLOWS_SPACE)
            .map_err(ValidationError::lift)?;

        let rest = strip_scheme(candidate, TEL_SCHEME)
            .ok_or(ValidationError::new(TelReason::MissingScheme))?;

        let (raw_number, raw_params) = match rest.split_once(';') {
            Some((number, params)) => (number, Some(params)),
            None => (rest, None),
        };
        if raw_number.is_empty() {
            return Err(ValidationError::new(TelReason::EmptyNumber));
        }

        check_percent_encoding(raw_number).map_err(malformed_percent)?;
        let decoded = percent_decode_ascii(raw_number);
        let (is_global, body) = match decoded.strip_prefix('+') {
            Some(body) => (true, body),
            None => (false, decoded.as_str()),
        };

        let digits = scan_number(body, is_global)?;
        let limit = if is_global {
            self.config.max_global_digits
        } else {
            self.config.max_local_digits
        };
        if digits.len() > limit {
            let reason = if is_global {
                TelReason::TooManyGlobalDigits
            } else {
                TelReason::TooManyLocalDigits
            };
            return Err(ValidationError::with_detail(
                reason,
                format!("{} digits exceed maximum {limit}", digits.len()),
            ));
        }

        let mut params = BTreeMap::new();
        if let Some(raw_params) = raw_params {
            for raw in raw_params.split(';') {
                let (name, param) = self.parse_param(raw, is_global)?;
                if params.contains_key(&name) {
                    return Err(ValidationError::with_detail(
                        TelReason::DuplicateParameter,
                        name,
                    ));
                }
                params.insert(name, param);
            }
        }

        if !is_global
            && self.config.require_phone_context_for_local
            && !params.contains_key(PHONE_CONTEXT)
        {
            return Err(ValidationError::new(TelReason::MissingPhoneContext));
        }

        let number = if is_global {
            format!("+{digits}")
        } else {
            digits
        };

        let mut canonical = format!("{TEL_SCHEME}:{number}");
        for (name, param) in &params {
            canonical.push(';');
            canonical.push_str(name);
            if let Some(value) = &param.canonical {
                canonical.push('=');
                canonical.push_str(value);
            }
        }

        Ok(TelUrl {
            number,
            is_global,
            params: params
                .into_iter()
                .map(|(name, param)| (name, param.value))
                .collect(),
            canonical,
        })
    }

    fn parse_param(
        &self,
        raw: &str,
        is_global: bool,
    ) -> Result<(String, Param), ValidationError<TelReason>> {
        if raw.is_empty() {
            return Err(ValidationError::new(TelReason::EmptyParameter));
        }

        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (raw, None),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError::with_detail(
                TelReason::InvalidParameterName,
                name,
            ));
        }
        let name = name.to_ascii_lowercase();

        let param = match name.as_str() {
            EXT => {
                let value = require_value(value, &name)?;
                let decoded = decode(value)?;
                if !self.is_dtmf_string(&decoded, false) {
                    return Err(ValidationError::with_detail(
                        TelReason::InvalidExtension,
                        value,
                    ));
                }
                Param {
                    canonical: Some(decoded.to_ascii_uppercase()),
                    value: Some(decoded),
                }
            }
            TSP => {
                let value = require_value(value, &name)?;
                let decoded = decode(value)?;
                if value.contains(' ') || !self.is_dtmf_string(&decoded, true) {
                    return Err(ValidationError::with_detail(TelReason::InvalidTsp, value));
                }
                Param {
                    canonical: Some(value.to_string()),
                    value: Some(decoded),
                }
            }
            ISUB => {
                let value = require_value(value, &name)?;
                if value.is_empty() || ComponentKind::Query.check(value).is_err() {
                    return Err(ValidationError::with_detail(
                        TelReason::InvalidIsdnSubaddress,
                        value,
                    ));
                }
                Param {
                    canonical: Some(value.to_string()),
                    value: Some(percent_decode_ascii(value)),
                }
            }
            PHONE_CONTEXT => {
                let value = require_value(value, &name)?;
                if is_global {
                    return Err(ValidationError::new(TelReason::PhoneContextOnGlobal));
                }
                let canonical = self.check_phone_context(value)?;
                Param {
                    canonical: Some(canonical),
                    value: Some(percent_decode_ascii(value)),
                }
            }
            _ => {
                if !self.config.allow_unknown_params {
                    return Err(ValidationError::with_detail(
                        TelReason::UnknownParameter,
                        name,
                    ));
                }
                match value {
                    Some(value) => {
                        if value.is_empty()
                            || !value.chars().all(|c| c == '%' || is_paramchar(c))
                        {
                            return Err(ValidationError::with_detail(
                                TelReason::InvalidParameterValue,
                                value,
                            ));
                        }
                        Param {
                            canonical: Some(value.to_string()),
                            value: Some(decode(value)?),
                        }
                    }
                    None => Param {
                        value: None,
                        canonical: None,
                    },
                }
            }
        };

        Ok((name, param))
    }

    /// Digits plus, when enabled, `*`, `#` and `A`-`D`. With `separators`
    /// a visual separator may sit between two digits.
    fn is_dtmf_string(&self, value: &str, separators: bool) -> bool {
        let mut prev_digit = false;
        let mut any = false;
        for c in value.chars() {
            let is_digit = c.is_ascii_digit()
                || (self.config.allow_dtmf_in_ext
                    && matches!(c.to_ascii_uppercase(), '*' | '#' | 'A'..='D'));
            if is_digit {
                prev_digit = true;
                any = true;
            } else if separators && matches!(c, '-' | '.' | ' ') && prev_digit {
                prev_digit = false;
            } else {
                return false;
            }
        }
        any && prev_digit
    }

    /// Checks a `phone-context` value and returns its canonical spelling.
    fn check_phone_context(&self, value: &str) -> Result<String, ValidationError<TelReason>> {
        let invalid = || ValidationError::with_detail(TelReason::InvalidPhoneContext, value);

        if value.contains(' ') {
            return Err(invalid());
        }
        check_percent_encoding(value).map_err(|_| invalid())?;

        if value.starts_with('+') {
            let decoded = percent_decode_ascii(value);
            let digits = scan_number(&decoded[1..], true).map_err(|_| invalid())?;
            if digits.len() > self.config.max_global_digits {
                return Err(invalid());
            }
            return Ok(format!("+{digits}"));
        }

        let valid = match self.config.phone_context_domain_mode {
            PhoneContextDomainMode::Strict => check_dns_name(value, false).is_ok(),
            PhoneContextDomainMode::Relaxed => {
                !value.is_empty()
                    && value
                        .chars()
                        .all(|c| c == '%' || is_unreserved(c) || is_sub_delim(c))
            }
        };
        if !valid {
            return Err(invalid());
        }
        Ok(value.to_ascii_lowercase())
    }
}

impl SchemeValidator for TelValidator {
    type Output = TelUrl;
    type Reason = TelReason;

    const SCHEME: &'static str = TEL_SCHEME;
    const ALLOWS_SPACE: bool = true;

    fn max_length(&self) -> usize {
        self.config.max_length
    }

    fn validate(&self, candidate: &str) -> Result<TelUrl, ValidationError<TelReason>> {
        self.validate_inner(candidate)
            .map_err(|e| log_rejection(TEL_SCHEME, e))
            .inspect(|url| log_acceptance(TEL_SCHEME, url))
    }
}

const fn is_visual_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '.' | '\t')
}

/// Walks a decoded number body (after any `+`), enforcing separator and
/// parenthesis rules, and returns the dial digits with separators removed.
fn scan_number(body: &str, is_global: bool) -> Result<String, ValidationError<TelReason>> {
    let mut digits = String::with_capacity(body.len());
    let mut in_paren = false;
    let mut paren_digits = 0usize;
    let mut prev_separator = false;
    let mut last_separator = false;

    for (position, c) in body.chars().enumerate() {
        let at = || format!("'{c}' at position {position}");
        last_separator = false;

        match c {
            '0'..='9' => {
                digits.push(c);
                paren_digits += 1;
                prev_separator = false;
            }
            '*' | '#' | 'A'..='F' | 'a'..='f' => {
                if is_global {
                    return Err(ValidationError::with_detail(
                        TelReason::GlobalNumberNotDigits,
                        at(),
                    ));
                }
                digits.push(c.to_ascii_uppercase());
                paren_digits += 1;
                prev_separator = false;
            }
            '(' => {
                if in_paren {
                    return Err(ValidationError::with_detail(TelReason::NestedParenthesis, at()));
                }
                in_paren = true;
                paren_digits = 0;
                prev_separator = false;
            }
            ')' => {
                if !in_paren {
                    return Err(ValidationError::with_detail(
                        TelReason::UnmatchedCloseParenthesis,
                        at(),
                    ));
                }
                if paren_digits == 0 {
                    return Err(ValidationError::with_detail(TelReason::EmptyParentheses, at()));
                }
                in_paren = false;
                prev_separator = false;
            }
            c if is_visual_separator(c) => {
                if position == 0 {
                    return Err(ValidationError::with_detail(TelReason::LeadingSeparator, at()));
                }
                if prev_separator {
                    return Err(ValidationError::with_detail(TelReason::AdjacentSeparators, at()));
                }
                prev_separator = true;
                last_separator = true;
            }
            _ => {
                return Err(ValidationError::with_detail(TelReason::InvalidNumberChar, at()));
            }
        }
    }

    if in_paren {
        return Err(ValidationError::new(TelReason::UnclosedParenthesis));
    }
    if last_separator {
        return Err(ValidationError::new(TelReason::TrailingSeparator));
    }
    if digits.is_empty() {
        return Err(ValidationError::new(TelReason::NoDigits));
    }
    Ok(digits)
}

/// RFC 3966 `paramchar`, percent triplets excluded.
const fn is_paramchar(c: char) -> bool {
    is_unreserved(c) || matches!(c, '[' | ']' | '/' | ':' | '&' | '+' | '$')
}

fn require_value<'a>(
    value: Option<&'a str>,
    name: &str,
) -> Result<&'a str, ValidationError<TelReason>> {
    value.ok_or_else(|| ValidationError::with_detail(TelReason::MissingParameterValue, name))
}

fn decode(value: &str) -> Result<String, ValidationError<TelReason>> {
    check_percent_encoding(value).map_err(malformed_percent)?;
    Ok(percent_decode_ascii(value))
}

fn malformed_percent(offset: usize) -> ValidationError<TelReason> {
    ValidationError::with_detail(
        TelReason::MalformedPercentEncoding,
        format!("malformed '%' at offset {offset}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(validator: &TelValidator, input: &str) -> TelReason {
        validator.validate(input).unwrap_err().reason
    }

    #[test]
    fn global_with_extension() {
        let url = TelValidator::default()
            .validate("tel:+15551234567;ext=123")
            .unwrap();
        assert!(url.is_global());
        assert_eq!(url.number(), "+15551234567");
        assert_eq!(url.ext(), Some("123"));
        assert_eq!(url.canonical(), "tel:+15551234567;ext=123");
    }

    #[test]
    fn local_requires_phone_context() {
        let validator = TelValidator::default();
        let err = validator.validate("tel:5551234567").unwrap_err();
        assert_eq!(err.reason, TelReason::MissingPhoneContext);
        assert_eq!(
            err.reason.as_str(),
            "local number requires phone-context parameter"
        );

        let url = validator
            .validate("tel:555-1234;phone-context=Example.COM")
            .unwrap();
        assert!(!url.is_global());
        assert_eq!(url.number(), "5551234");
        assert_eq!(url.phone_context(), Some("Example.COM"));
        assert_eq!(url.canonical(), "tel:5551234;phone-context=example.com");

        let relaxed =
            TelValidator::new(TelConfig::new().with_require_phone_context_for_local(false));
        assert!(relaxed.is_valid("tel:5551234567"));
    }

    #[test]
    fn visual_separators() {
        let validator = TelValidator::default();
        let url = validator.validate("tel:+1-(555)-123.4567").unwrap();
        assert_eq!(url.number(), "+15551234567");
        assert!(validator.is_valid("tel:+1%20555%20123"));

        let cases = [
            ("tel:+1--5", TelReason::AdjacentSeparators),
            ("tel:+1((5))", TelReason::NestedParenthesis),
            ("tel:+1)5", TelReason::UnmatchedCloseParenthesis),
            ("tel:+1()5", TelReason::EmptyParentheses),
            ("tel:+1(5", TelReason::UnclosedParenthesis),
            ("tel:+-15", TelReason::LeadingSeparator),
            ("tel:+15-", TelReason::TrailingSeparator),
        ];
        for (input, expected) in cases {
            assert_eq!(reason(&validator, input), expected, "{input}");
        }
    }

    #[test]
    fn spaces_separate_digits_only() {
        let validator = TelValidator::default();
        let url = validator.validate("tel:+1 555 123 4567").unwrap();
        assert_eq!(url.number(), "+15551234567");
        assert_eq!(url.canonical(), "tel:+15551234567");
        assert!(validator.is_valid("tel:+1 (555) 123-4567;ext=89"));

        let cases = [
            ("tel:+1  555", TelReason::AdjacentSeparators),
            ("tel:+ 1", TelReason::LeadingSeparator),
            ("tel:+15 ", TelReason::TrailingSeparator),
            ("tel:+1;ext =1", TelReason::InvalidParameterName),
            ("tel:+1;ext=1 2", TelReason::InvalidExtension),
            ("tel:+1;tsp=1 2", TelReason::InvalidTsp),
            ("tel:+1;isub=a b", TelReason::InvalidIsdnSubaddress),
            ("tel:+1;x=a b", TelReason::InvalidParameterValue),
            ("tel:1234;phone-context=+1 555", TelReason::InvalidPhoneContext),
            ("tel:1234;phone-context=example .com", TelReason::InvalidPhoneContext),
        ];
        for (input, expected) in cases {
            assert_eq!(reason(&validator, input), expected, "{input}");
        }

        assert!(validator.is_valid("tel:+1;tsp=1%202"));
        assert!(validator.is_valid("tel:1234;phone-context=+1%20555"));
    }

    #[test]
    fn number_characters() {
        let validator = TelValidator::default();
        assert_eq!(reason(&validator, "tel:+1A"), TelReason::GlobalNumberNotDigits);
        assert_eq!(reason(&validator, "tel:+1*2"), TelReason::GlobalNumberNotDigits);
        assert_eq!(reason(&validator, "tel:+1x"), TelReason::InvalidNumberChar);
        assert_eq!(reason(&validator, "tel:+"), TelReason::NoDigits);
        assert_eq!(reason(&validator, "tel:;ext=1"), TelReason::EmptyNumber);
        assert_eq!(reason(&validator, "tel:+1%2"), TelReason::MalformedPercentEncoding);
        assert_eq!(reason(&validator, "phone:+1"), TelReason::MissingScheme);

        let url = validator
            .validate("tel:*12#a;phone-context=+1")
            .unwrap();
        assert_eq!(url.number(), "*12#A");
    }

    #[test]
    fn digit_limits() {
        let validator = TelValidator::default();
        assert!(validator.is_valid("tel:+123456789012345"));
        assert_eq!(
            reason(&validator, "tel:+1234567890123456"),
            TelReason::TooManyGlobalDigits
        );
        let local = format!("tel:{};phone-context=+1", "1".repeat(65));
        assert_eq!(reason(&validator, &local), TelReason::TooManyLocalDigits);
    }

    #[test]
    fn parameters() {
        let validator = TelValidator::default();
        let url = validator
            .validate("tel:+15551234567;TSP=1-2;isub=abc;x-foo=bar;flag")
            .unwrap();
        assert_eq!(url.tsp(), Some("1-2"));
        assert_eq!(url.isub(), Some("abc"));
        assert_eq!(url.param("x-foo"), Some("bar"));
        assert_eq!(url.param("flag"), Some(""));
        assert_eq!(
            url.canonical(),
            "tel:+15551234567;flag;isub=abc;tsp=1-2;x-foo=bar"
        );

        let cases = [
            ("tel:+1;;ext=1", TelReason::EmptyParameter),
            ("tel:+1;e_xt=1", TelReason::InvalidParameterName),
            ("tel:+1;ext=1;EXT=2", TelReason::DuplicateParameter),
            ("tel:+1;ext", TelReason::MissingParameterValue),
            ("tel:+1;ext=12a", TelReason::InvalidExtension),
            ("tel:+1;ext=", TelReason::InvalidExtension),
            ("tel:+1;tsp=1--2", TelReason::InvalidTsp),
            ("tel:+1;tsp=-1", TelReason::InvalidTsp),
            ("tel:+1;isub=a^b", TelReason::InvalidIsdnSubaddress),
            ("tel:+1;x=a=b", TelReason::InvalidParameterValue),
            ("tel:+1;phone-context=+1", TelReason::PhoneContextOnGlobal),
        ];
        for (input, expected) in cases {
            assert_eq!(reason(&validator, input), expected, "{input}");
        }
    }

    #[test]
    fn dtmf_extension_policy() {
        let validator = TelValidator::default();
        assert_eq!(reason(&validator, "tel:+1;ext=12*"), TelReason::InvalidExtension);

        let dtmf = TelValidator::new(TelConfig::new().with_allow_dtmf_in_ext(true));
        let url = dtmf.validate("tel:+1;ext=12*#d").unwrap();
        assert_eq!(url.ext(), Some("12*#d"));
        assert_eq!(url.canonical(), "tel:+1;ext=12*#D");
        assert_eq!(reason(&dtmf, "tel:+1;ext=12e"), TelReason::InvalidExtension);
    }

    #[test]
    fn unknown_parameter_policy() {
        let strict = TelValidator::new(TelConfig::new().with_allow_unknown_params(false));
        assert!(strict.is_valid("tel:+1;ext=2"));
        assert_eq!(reason(&strict, "tel:+1;foo=bar"), TelReason::UnknownParameter);
    }

    #[test]
    fn phone_context_values() {
        let validator = TelValidator::default();
        let url = validator
            .validate("tel:1234;phone-context=+1-555")
            .unwrap();
        assert_eq!(url.canonical(), "tel:1234;phone-context=+1555");
        assert_eq!(
            reason(&validator, "tel:1234;phone-context=ex_ample.com"),
            TelReason::InvalidPhoneContext
        );
        assert_eq!(
            reason(&validator, "tel:1234;phone-context=+"),
            TelReason::InvalidPhoneContext
        );

        let relaxed = TelValidator::new(
            TelConfig::new().with_phone_context_domain_mode(PhoneContextDomainMode::Relaxed),
        );
        assert!(relaxed.is_valid("tel:1234;phone-context=ex_ample.com"));
        assert_eq!(
            reason(&relaxed, "tel:1234;phone-context=a/b"),
            TelReason::InvalidPhoneContext
        );
    }

    #[test]
    fn canonical_is_stable() {
        let validator = TelValidator::default();
        let url = validator
            .validate("tel:+1-555-123;isub=x%20y;ext=9")
            .unwrap();
        let again = validator.validate(url.canonical()).unwrap();
        assert_eq!(again.canonical(), url.canonical());
    }
}
