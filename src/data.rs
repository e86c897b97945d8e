//! Validator for `data:` URLs (RFC 2397).
//!
//! # Grammar Reference
//!
//! ```abnf
//! data-url  = "data:" [ mediatype ] *( ";" parameter ) [ ";base64" ] "," data [ "#" fragment ]
//! mediatype = token "/" token
//! parameter = token "=" ( token / quoted-string )
//! ```
//!
//! The header ends at the first comma outside a quoted-string. A missing
//! media type means `text/plain`, whose charset defaults to `us-ascii`.
//!
//! The normalized form lists the media type, then `charset`, then the
//! remaining parameters in their original order, then the `base64` marker.

use std::collections::BTreeSet;
use std::fmt;

use crate::chars::is_token;
use crate::component::{ComponentError, ComponentKind};
use crate::constants::{DATA_SCHEME, DEFAULT_MAX_DATA_HEADER_LENGTH, DEFAULT_MAX_DATA_URL_LENGTH};
use crate::error::{ConfigError, DataReason, ValidationError};
use crate::percent::{check_percent_encoding, percent_decode_ascii};
use crate::precheck::precheck_str;
use crate::validator::{SchemeValidator, log_acceptance, log_rejection, strip_scheme};

const DEFAULT_MEDIA_TYPE: &str = "text/plain";
const DEFAULT_CHARSET: &str = "us-ascii";
const BASE64_MARKER: &str = "base64";

/// Policy for [`DataValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DataConfig {
    /// Maximum total length in UTF-16 code units.
    ///
    /// Default: 2 MiB (2097152)
    pub max_length: usize,

    /// Maximum length of the header (everything between `data:` and the
    /// separating comma).
    ///
    /// Default: 1024
    pub max_header_length: usize,

    /// Require canonical base64: no percent-escapes, no whitespace, length
    /// a multiple of 4.
    ///
    /// Default: true
    pub strict_base64: bool,

    /// Accept raw spaces in a non-base64 payload.
    ///
    /// Default: false
    pub allow_whitespace_in_payload: bool,

    /// Accept a trailing `#fragment`.
    ///
    /// Default: true
    pub allow_fragment: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_DATA_URL_LENGTH,
            max_header_length: DEFAULT_MAX_DATA_HEADER_LENGTH,
            strict_base64: true,
            allow_whitespace_in_payload: false,
            allow_fragment: true,
        }
    }
}

impl DataConfig {
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

    /// Sets the maximum header length.
    #[must_use]
    pub const fn with_max_header_length(mut self, max: usize) -> Self {
        self.max_header_length = max;
        self
    }

    /// Enables or disables strict base64.
    #[must_use]
    pub const fn with_strict_base64(mut self, strict: bool) -> Self {
        self.strict_base64 = strict;
        self
    }

    /// Enables or disables whitespace in non-base64 payloads.
    #[must_use]
    pub const fn with_allow_whitespace_in_payload(mut self, allow: bool) -> Self {
        self.allow_whitespace_in_payload = allow;
        self
    }

    /// Enables or disables fragments.
    #[must_use]
    pub const fn with_allow_fragment(mut self, allow: bool) -> Self {
        self.allow_fragment = allow;
        self
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a limit is zero or the header limit
    /// exceeds the total limit.
    pub const fn check(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_length",
            });
        }
        if self.max_header_length == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_header_length",
            });
        }
        if self.max_header_length > self.max_length {
            return Err(ConfigError::Inconsistent {
                reason: "max_header_length exceeds max_length",
            });
        }
        Ok(())
    }
}

/// A validated `data:` URL.
///
/// # Examples
///
/// ```
/// use opaque_uri::{DataValidator, SchemeValidator};
///
/// let url = DataValidator::default()
///     .validate("data:text/html;foo=bar;charset=UTF-8,%3Cp%3E")
///     .unwrap();
/// assert_eq!(url.media_type(), "text/html");
/// assert_eq!(url.charset(), Some("utf-8"));
/// assert_eq!(url.canonical(), "data:text/html;charset=utf-8;foo=bar,%3Cp%3E");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataUrl {
    media_type: String,
    charset: Option<String>,
    parameters: Vec<(String, String)>,
    is_base64: bool,
    payload: String,
    fragment: Option<String>,
    canonical: String,
}

impl DataUrl {
    /// Returns the lower-cased `type/subtype`, `text/plain` when omitted.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the lower-cased charset, defaulted for `text/plain`.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Returns the parameters other than `charset`, unquoted, in order.
    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Returns the value of a parameter by lower-case name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        if name == "charset" {
            return self.charset();
        }
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the `base64` marker was present.
    #[must_use]
    pub const fn is_base64(&self) -> bool {
        self.is_base64
    }

    /// Returns the payload exactly as written.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns the fragment, if present.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns the normalized form.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for DataUrl {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

/// Parsed header of a `data:` URL.
struct Header {
    media_type: String,
    charset: Option<String>,
    parameters: Vec<(String, String)>,
    is_base64: bool,
}

/// Validator for `data:` URLs.
#[derive(Debug, Clone)]
pub struct DataValidator {
    config: DataConfig,
}

impl Default for DataValidator {
    fn default() -> Self {
        Self::new(DataConfig::default())
    }
}

impl DataValidator {
    /// Creates a validator.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is inconsistent. Use
    /// [`DataValidator::try_new`] for fallible construction.
    #[must_use]
    pub fn new(config: DataConfig) -> Self {
        Self::try_new(config).expect("valid data: configuration")
    }

    /// Creates a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is inconsistent.
    pub fn try_new(config: DataConfig) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DataConfig {
        &self.config
    }

    fn validate_inner(&self, candidate: &str) -> Result<DataUrl, ValidationError<DataReason>> {
        precheck_str(candidate, self.config.max_length, Self::ALLOWS_SPACE)
            .map_err(ValidationError::lift)?;

        let rest = strip_scheme(candidate, DATA_SCHEME)
            .ok_or(ValidationError::new(DataReason::MissingScheme))?;

        let comma = find_header_end(rest)?;
        let (raw_header, body) = (&rest[..comma], &rest[comma + 1..]);

        let header_len = raw_header.encode_utf16().count();
        if header_len > self.config.max_header_length {
            return Err(ValidationError::with_detail(
                DataReason::HeaderTooLong,
                format!(
                    "header length {header_len} exceeds maximum {}",
                    self.config.max_header_length
                ),
            ));
        }

        let header = parse_header(raw_header)?;

        let (payload, fragment) = match body.split_once('#') {
            Some(_) if !self.config.allow_fragment => {
                return Err(ValidationError::new(DataReason::FragmentNotAllowed));
            }
            Some((payload, fragment)) => (payload, (!fragment.is_empty()).then_some(fragment)),
            None => (body, None),
        };

        if header.is_base64 {
            self.check_base64(payload)?;
        } else {
            self.check_text_payload(payload)?;
        }

        if let Some(fragment) = fragment {
            ComponentKind::Fragment
                .check(fragment)
                .map_err(component_error)?;
        }

        let canonical = render(&header, payload, fragment);

        Ok(DataUrl {
            media_type: header.media_type,
            charset: header.charset,
            parameters: header.parameters,
            is_base64: header.is_base64,
            payload: payload.to_string(),
            fragment: fragment.map(str::to_string),
            canonical,
        })
    }

    fn check_base64(&self, payload: &str) -> Result<(), ValidationError<DataReason>> {
        if self.config.strict_base64 {
            check_base64_alphabet(payload)?;
            if payload.len() % 4 != 0 {
                return Err(ValidationError::with_detail(
                    DataReason::Base64Length,
                    format!("length {}", payload.len()),
                ));
            }
            return Ok(());
        }

        check_percent_encoding(payload).map_err(|offset| {
            ValidationError::with_detail(
                DataReason::MalformedPercentEncoding,
                format!("malformed '%' at offset {offset}"),
            )
        })?;
        let decoded: String = percent_decode_ascii(payload)
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        check_base64_alphabet(&decoded)?;
        if decoded.len() % 4 == 1 {
            return Err(ValidationError::with_detail(
                DataReason::Base64Truncated,
                format!("length {}", decoded.len()),
            ));
        }
        Ok(())
    }

    fn check_text_payload(&self, payload: &str) -> Result<(), ValidationError<DataReason>> {
        check_percent_encoding(payload).map_err(|offset| {
            ValidationError::with_detail(
                DataReason::MalformedPercentEncoding,
                format!("malformed '%' at offset {offset}"),
            )
        })?;
        if !self.config.allow_whitespace_in_payload {
            if let Some(offset) = payload.find(' ') {
                return Err(ValidationError::with_detail(
                    DataReason::WhitespaceInPayload,
                    format!("space at offset {offset}"),
                ));
            }
        }
        Ok(())
    }
}

impl SchemeValidator for DataValidator {
    type Output = DataUrl;
    type Reason = DataReason;

    const SCHEME: &'static str = DATA_SCHEME;
    const ALLOWS_SPACE: bool = true;

    fn max_length(&self) -> usize {
        self.config.max_length
    }

    fn validate(&self, candidate: &str) -> Result<DataUrl, ValidationError<DataReason>> {
        self.validate_inner(candidate)
            .map_err(|e| log_rejection(DATA_SCHEME, e))
            .inspect(|url| log_acceptance(DATA_SCHEME, url))
    }
}

/// Finds the comma that ends the header, skipping quoted-strings.
fn find_header_end(rest: &str) -> Result<usize, ValidationError<DataReason>> {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '"' => in_quote = true,
            ',' => return Ok(i),
            _ => {}
        }
    }
    if in_quote {
        Err(ValidationError::new(DataReason::UnterminatedQuotedString))
    } else {
        Err(ValidationError::new(DataReason::MissingComma))
    }
}

/// Splits a header on `;` outside quoted-strings. The header is known to
/// have balanced quotes.
fn split_parameters(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
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
        } else if c == ';' {
            parts.push(&header[start..i]);
            start = i + 1;
        }
    }
    parts.push(&header[start..]);
    parts
}

fn parse_header(raw: &str) -> Result<Header, ValidationError<DataReason>> {
    let segments = split_parameters(raw);
    let (raw_media_type, params) = segments
        .split_first()
        .map_or(("", &[][..]), |(first, rest)| (*first, rest));

    let media_type = if raw_media_type.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        match raw_media_type.split_once('/') {
            Some((kind, subtype)) if is_token(kind) && is_token(subtype) => {
                raw_media_type.to_ascii_lowercase()
            }
            _ => {
                return Err(ValidationError::with_detail(
                    DataReason::InvalidMediaType,
                    raw_media_type,
                ));
            }
        }
    };

    let mut charset = None;
    let mut parameters = Vec::new();
    let mut seen = BTreeSet::new();
    let mut is_base64 = false;

    for (index, param) in params.iter().enumerate() {
        if param.is_empty() {
            return Err(ValidationError::new(DataReason::EmptyParameter));
        }

        if param.eq_ignore_ascii_case(BASE64_MARKER) {
            if index + 1 != params.len() {
                return Err(ValidationError::new(DataReason::MisplacedBase64));
            }
            is_base64 = true;
            continue;
        }

        let (name, value) = param.split_once('=').ok_or_else(|| {
            ValidationError::with_detail(DataReason::MissingParameterValue, *param)
        })?;
        if !is_token(name) {
            return Err(ValidationError::with_detail(
                DataReason::InvalidParameterName,
                name,
            ));
        }
        let name = name.to_ascii_lowercase();
        let value = parse_parameter_value(value)
            .ok_or_else(|| ValidationError::with_detail(DataReason::InvalidParameterValue, value))?;

        if !seen.insert(name.clone()) {
            return Err(ValidationError::with_detail(
                DataReason::DuplicateParameter,
                name,
            ));
        }

        if name == "charset" {
            charset = Some(value.to_ascii_lowercase());
        } else {
            parameters.push((name, value));
        }
    }

    if charset.is_none() && media_type == DEFAULT_MEDIA_TYPE {
        charset = Some(DEFAULT_CHARSET.to_string());
    }

    Ok(Header {
        media_type,
        charset,
        parameters,
        is_base64,
    })
}

/// Parses a token or a quoted-string, returning the unquoted value.
fn parse_parameter_value(value: &str) -> Option<String> {
    let Some(inner) = value.strip_prefix('"') else {
        return is_token(value).then(|| value.to_string());
    };
    let inner = inner.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().filter(|&c| is_quoted_pair_char(c))?;
                out.push(escaped);
            }
            '"' => return None,
            c if is_qdtext(c) => out.push(c),
            _ => return None,
        }
    }
    Some(out)
}

/// RFC 9110 `qdtext` plus `obs-text`, minus the quote and backslash.
const fn is_qdtext(c: char) -> bool {
    matches!(c, '\t' | ' ' | '!' | '#'..='[' | ']'..='~' | '\u{80}'..='\u{ff}')
}

/// Characters allowed after a backslash in a quoted-string.
const fn is_quoted_pair_char(c: char) -> bool {
    is_qdtext(c) || matches!(c, '"' | '\\')
}

/// Checks base64 characters and trailing `=` padding.
fn check_base64_alphabet(payload: &str) -> Result<(), ValidationError<DataReason>> {
    let mut padding = 0usize;
    for (i, c) in payload.char_indices() {
        match c {
            '=' => padding += 1,
            c if c.is_ascii_alphanumeric() || c == '+' || c == '/' => {
                if padding > 0 {
                    return Err(ValidationError::with_detail(
                        DataReason::MisplacedBase64Padding,
                        format!("data after padding at offset {i}"),
                    ));
                }
            }
            c => {
                return Err(ValidationError::with_detail(
                    DataReason::InvalidBase64Char,
                    format!("character '{c}' at offset {i}"),
                ));
            }
        }
    }
    if padding > 2 {
        return Err(ValidationError::with_detail(
            DataReason::TooMuchBase64Padding,
            format!("{padding} padding characters"),
        ));
    }
    Ok(())
}

fn render_value(value: &str) -> String {
    if is_token(value) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn render(header: &Header, payload: &str, fragment: Option<&str>) -> String {
    let mut out = format!("{DATA_SCHEME}:{}", header.media_type);
    if let Some(charset) = &header.charset {
        out.push_str(";charset=");
        out.push_str(&render_value(charset));
    }
    for (name, value) in &header.parameters {
        out.push(';');
        out.push_str(name);
        out.push('=');
        out.push_str(&render_value(value));
    }
    if header.is_base64 {
        out.push(';');
        out.push_str(BASE64_MARKER);
    }
    out.push(',');
    out.push_str(payload);
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

fn component_error(err: ComponentError) -> ValidationError<DataReason> {
    let reason = match err {
        ComponentError::InvalidChar { .. } => DataReason::InvalidFragment,
        ComponentError::MalformedPercent { .. } => DataReason::MalformedPercentEncoding,
    };
    ValidationError::with_detail(reason, err.detail())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(validator: &DataValidator, input: &str) -> DataReason {
        validator.validate(input).unwrap_err().reason
    }

    #[test]
    fn base64_payload() {
        let url = DataValidator::default()
            .validate("data:text/plain;base64,AAAA")
            .unwrap();
        assert!(url.is_base64());
        assert_eq!(url.payload(), "AAAA");
        assert_eq!(url.canonical(), "data:text/plain;charset=us-ascii;base64,AAAA");
    }

    #[test]
    fn base64_length() {
        let validator = DataValidator::default();
        let err = validator.validate("data:text/plain;base64,AAA").unwrap_err();
        assert_eq!(err.reason, DataReason::Base64Length);
        assert_eq!(err.reason.as_str(), "base64 length must be a multiple of 4");
    }

    #[test]
    fn base64_padding() {
        let validator = DataValidator::default();
        assert!(validator.is_valid("data:;base64,AA=="));
        assert!(validator.is_valid("data:;base64,"));
        assert_eq!(
            reason(&validator, "data:;base64,AA=A"),
            DataReason::MisplacedBase64Padding
        );
        assert_eq!(
            reason(&validator, "data:;base64,A==="),
            DataReason::TooMuchBase64Padding
        );
        assert_eq!(
            reason(&validator, "data:;base64,AA%3D"),
            DataReason::InvalidBase64Char
        );
        assert_eq!(
            reason(&validator, "data:;base64,AA AA"),
            DataReason::InvalidBase64Char
        );
    }

    #[test]
    fn lenient_base64() {
        let validator = DataValidator::new(DataConfig::new().with_strict_base64(false));
        assert!(validator.is_valid("data:;base64,AA%3D%3D"));
        assert!(validator.is_valid("data:;base64,AA AA"));
        assert!(validator.is_valid("data:;base64,AAA"));
        assert_eq!(
            reason(&validator, "data:;base64,AAAAA"),
            DataReason::Base64Truncated
        );
        assert_eq!(
            reason(&validator, "data:;base64,AA%3"),
            DataReason::MalformedPercentEncoding
        );
    }

    #[test]
    fn defaults_media_type_and_charset() {
        let url = DataValidator::default().validate("data:,hello").unwrap();
        assert_eq!(url.media_type(), "text/plain");
        assert_eq!(url.charset(), Some("us-ascii"));
        assert!(!url.is_base64());
        assert_eq!(url.canonical(), "data:text/plain;charset=us-ascii,hello");

        let url = DataValidator::default().validate("data:image/png,x").unwrap();
        assert_eq!(url.charset(), None);
    }

    #[test]
    fn parameters_are_reordered() {
        let url = DataValidator::default()
            .validate("data:Text/HTML;Foo=bar;CHARSET=\"UTF-8\";base64,PGI+")
            .unwrap();
        assert_eq!(url.media_type(), "text/html");
        assert_eq!(url.parameter("foo"), Some("bar"));
        assert_eq!(url.charset(), Some("utf-8"));
        assert_eq!(url.canonical(), "data:text/html;charset=utf-8;foo=bar;base64,PGI+");
    }

    #[test]
    fn quoted_values() {
        let validator = DataValidator::default();
        let url = validator
            .validate("data:text/plain;name=\"a, b;c\",x")
            .unwrap();
        assert_eq!(url.parameter("name"), Some("a, b;c"));
        assert_eq!(url.payload(), "x");
        assert_eq!(url.canonical(), "data:text/plain;charset=us-ascii;name=\"a, b;c\",x");

        let url = validator
            .validate("data:text/plain;q=\"say \\\"hi\\\"\",x")
            .unwrap();
        assert_eq!(url.parameter("q"), Some("say \"hi\""));
        assert!(validator.is_valid(url.canonical()));

        assert_eq!(
            reason(&validator, "data:text/plain;name=\"abc,x"),
            DataReason::UnterminatedQuotedString
        );
    }

    #[test]
    fn quoted_pair_is_limited_to_qdtext() {
        let validator = DataValidator::default();
        let url = validator.validate("data:text/plain;a=\"\\x\\\u{e9}\",x").unwrap();
        assert_eq!(url.parameter("a"), Some("x\u{e9}"));
        assert_eq!(validator.validate(url.canonical()).unwrap(), url);

        assert_eq!(
            reason(&validator, "data:text/plain;a=\"\\\u{100}\",x"),
            DataReason::InvalidParameterValue
        );
        assert_eq!(
            reason(&validator, "data:text/plain;a=\"\\\u{7f}\",x"),
            DataReason::Precheck(crate::error::PrecheckReason::ControlCharacter)
        );
    }

    #[test]
    fn header_errors() {
        let validator = DataValidator::default();
        let cases = [
            ("data:text/plain", DataReason::MissingComma),
            ("data:text,x", DataReason::InvalidMediaType),
            ("data:text/plain;;a=b,x", DataReason::EmptyParameter),
            ("data:text/plain;a,x", DataReason::MissingParameterValue),
            ("data:text/plain;a@b=c,x", DataReason::InvalidParameterName),
            ("data:text/plain;a=b c,x", DataReason::InvalidParameterValue),
            ("data:text/plain;a=b;A=c,x", DataReason::DuplicateParameter),
            ("data:text/plain;base64;a=b,x", DataReason::MisplacedBase64),
            ("dat:,x", DataReason::MissingScheme),
        ];
        for (input, expected) in cases {
            assert_eq!(reason(&validator, input), expected, "{input}");
        }
    }

    #[test]
    fn header_length() {
        let validator = DataValidator::new(DataConfig::new().with_max_header_length(10));
        assert!(validator.is_valid("data:text/plain,x"));
        assert_eq!(
            reason(&validator, "data:text/plain;a=b,x"),
            DataReason::HeaderTooLong
        );
    }

    #[test]
    fn text_payload() {
        let validator = DataValidator::default();
        assert!(validator.is_valid("data:,a%20b"));
        assert_eq!(reason(&validator, "data:,a%2"), DataReason::MalformedPercentEncoding);
        assert_eq!(reason(&validator, "data:,a b"), DataReason::WhitespaceInPayload);
        assert_eq!(
            reason(&validator, "data:,a\tb"),
            DataReason::Precheck(crate::error::PrecheckReason::ControlCharacter)
        );

        let relaxed = DataValidator::new(DataConfig::new().with_allow_whitespace_in_payload(true));
        assert!(relaxed.is_valid("data:,a b"));
    }

    #[test]
    fn fragments() {
        let validator = DataValidator::default();
        let url = validator.validate("data:,hello#frag").unwrap();
        assert_eq!(url.payload(), "hello");
        assert_eq!(url.fragment(), Some("frag"));
        assert_eq!(url.canonical(), "data:text/plain;charset=us-ascii,hello#frag");
        assert_eq!(reason(&validator, "data:,x#a^b"), DataReason::InvalidFragment);

        let strict = DataValidator::new(DataConfig::new().with_allow_fragment(false));
        assert_eq!(reason(&strict, "data:,x#frag"), DataReason::FragmentNotAllowed);
    }

    #[test]
    fn config_check() {
        assert!(DataValidator::try_new(DataConfig::new().with_max_header_length(0)).is_err());
        assert!(
            DataValidator::try_new(DataConfig::new().with_max_length(10).with_max_header_length(20))
                .is_err()
        );
    }
}
