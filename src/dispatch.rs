//! Routing a candidate URL to the validator for its scheme.

use std::fmt;

use crate::about::{AboutUrl, AboutValidator};
use crate::blob::{BlobUrl, BlobValidator};
use crate::data::{DataUrl, DataValidator};
use crate::error::{
    AboutReason, BlobReason, DataReason, MailtoReason, TelReason, UrnReason, ValidationError,
};
use crate::mailto::{MailtoUrl, MailtoValidator};
use crate::tel::{TelUrl, TelValidator};
use crate::urn::{UrnUrl, UrnValidator};
use crate::validator::SchemeValidator;

/// Longest scheme name handled here (`mailto`).
const MAX_SCHEME_NAME: usize = 6;

/// One of the six supported schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Scheme {
    /// `about:`
    About,
    /// `blob:`
    Blob,
    /// `data:`
    Data,
    /// `mailto:`
    Mailto,
    /// `tel:`
    Tel,
    /// `urn:`
    Urn,
}

impl Scheme {
    /// Every supported scheme.
    pub const ALL: [Self; 6] = [
        Self::About,
        Self::Blob,
        Self::Data,
        Self::Mailto,
        Self::Tel,
        Self::Urn,
    ];

    /// Returns the lower-case scheme name without `:`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::About => AboutValidator::SCHEME,
            Self::Blob => BlobValidator::SCHEME,
            Self::Data => DataValidator::SCHEME,
            Self::Mailto => MailtoValidator::SCHEME,
            Self::Tel => TelValidator::SCHEME,
            Self::Urn => UrnValidator::SCHEME,
        }
    }

    /// Looks up a scheme by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.as_str().eq_ignore_ascii_case(name))
    }

    /// Detects the scheme of a candidate from its prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_uri::Scheme;
    ///
    /// assert_eq!(Scheme::detect("MailTo:a@example.com"), Some(Scheme::Mailto));
    /// assert_eq!(Scheme::detect("https://example.com"), None);
    /// assert_eq!(Scheme::detect("urn"), None);
    /// ```
    #[must_use]
    pub fn detect(candidate: &str) -> Option<Self> {
        let (name, _) = candidate.split_once(':')?;
        Self::from_name(name)
    }

    /// Detects the scheme of a candidate given as UTF-16 code units.
    #[must_use]
    pub fn detect_utf16(units: &[u16]) -> Option<Self> {
        let colon = units
            .iter()
            .take(MAX_SCHEME_NAME + 1)
            .position(|&unit| unit == u16::from(b':'))?;
        let name = units[..colon]
            .iter()
            .map(|&unit| u8::try_from(unit).ok().filter(u8::is_ascii).map(char::from))
            .collect::<Option<String>>()?;
        Self::from_name(&name)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted URL of any supported scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "scheme", rename_all = "lowercase"))]
pub enum ValidatedUrl {
    /// An `about:` URL
    About(AboutUrl),
    /// A `blob:` URL
    Blob(BlobUrl),
    /// A `data:` URL
    Data(DataUrl),
    /// A `mailto:` URL
    Mailto(MailtoUrl),
    /// A `tel:` URL
    Tel(TelUrl),
    /// A `urn:` URL
    Urn(UrnUrl),
}

impl ValidatedUrl {
    /// Returns the scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        match self {
            Self::About(_) => Scheme::About,
            Self::Blob(_) => Scheme::Blob,
            Self::Data(_) => Scheme::Data,
            Self::Mailto(_) => Scheme::Mailto,
            Self::Tel(_) => Scheme::Tel,
            Self::Urn(_) => Scheme::Urn,
        }
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn canonical(&self) -> &str {
        match self {
            Self::About(url) => url.canonical(),
            Self::Blob(url) => url.canonical(),
            Self::Data(url) => url.canonical(),
            Self::Mailto(url) => url.canonical(),
            Self::Tel(url) => url.canonical(),
            Self::Urn(url) => url.canonical(),
        }
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

impl AsRef<str> for ValidatedUrl {
    fn as_ref(&self) -> &str {
        self.canonical()
    }
}

/// A rejection from any supported scheme, or an unsupported scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyRejection {
    /// The candidate does not start with a supported `scheme:`
    UnknownScheme,
    /// Rejected by the `about:` validator
    About(ValidationError<AboutReason>),
    /// Rejected by the `blob:` validator
    Blob(ValidationError<BlobReason>),
    /// Rejected by the `data:` validator
    Data(ValidationError<DataReason>),
    /// Rejected by the `mailto:` validator
    Mailto(ValidationError<MailtoReason>),
    /// Rejected by the `tel:` validator
    Tel(ValidationError<TelReason>),
    /// Rejected by the `urn:` validator
    Urn(ValidationError<UrnReason>),
}

impl AnyRejection {
    /// Returns the scheme whose validator rejected the candidate.
    #[must_use]
    pub const fn scheme(&self) -> Option<Scheme> {
        match self {
            Self::UnknownScheme => None,
            Self::About(_) => Some(Scheme::About),
            Self::Blob(_) => Some(Scheme::Blob),
            Self::Data(_) => Some(Scheme::Data),
            Self::Mailto(_) => Some(Scheme::Mailto),
            Self::Tel(_) => Some(Scheme::Tel),
            Self::Urn(_) => Some(Scheme::Urn),
        }
    }

    /// Returns the stable reason string.
    #[must_use]
    pub fn reason_str(&self) -> &'static str {
        match self {
            Self::UnknownScheme => "unknown scheme",
            Self::About(e) => e.reason.as_str(),
            Self::Blob(e) => e.reason.as_str(),
            Self::Data(e) => e.reason.as_str(),
            Self::Mailto(e) => e.reason.as_str(),
            Self::Tel(e) => e.reason.as_str(),
            Self::Urn(e) => e.reason.as_str(),
        }
    }

    /// Returns the detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::UnknownScheme => None,
            Self::About(e) => e.detail(),
            Self::Blob(e) => e.detail(),
            Self::Data(e) => e.detail(),
            Self::Mailto(e) => e.detail(),
            Self::Tel(e) => e.detail(),
            Self::Urn(e) => e.detail(),
        }
    }
}

impl fmt::Display for AnyRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {detail}", self.reason_str()),
            None => f.write_str(self.reason_str()),
        }
    }
}

impl std::error::Error for AnyRejection {}

/// One validator per supported scheme, picked by the candidate's prefix.
///
/// # Examples
///
/// ```
/// use opaque_uri::{Scheme, Validators};
///
/// let validators = Validators::default();
/// let url = validators.validate("tel:+15551234567").unwrap();
/// assert_eq!(url.scheme(), Scheme::Tel);
///
/// let err = validators.validate("gopher://example.com").unwrap_err();
/// assert_eq!(err.reason_str(), "unknown scheme");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validators {
    about: AboutValidator,
    blob: BlobValidator,
    data: DataValidator,
    mailto: MailtoValidator,
    tel: TelValidator,
    urn: UrnValidator,
}

impl Validators {
    /// Creates a dispatcher with every validator at its default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the `about:` validator.
    #[must_use]
    pub fn with_about(mut self, validator: AboutValidator) -> Self {
        self.about = validator;
        self
    }

    /// Replaces the `blob:` validator.
    #[must_use]
    pub fn with_blob(mut self, validator: BlobValidator) -> Self {
        self.blob = validator;
        self
    }

    /// Replaces the `data:` validator.
    #[must_use]
    pub fn with_data(mut self, validator: DataValidator) -> Self {
        self.data = validator;
        self
    }

    /// Replaces the `mailto:` validator.
    #[must_use]
    pub fn with_mailto(mut self, validator: MailtoValidator) -> Self {
        self.mailto = validator;
        self
    }

    /// Replaces the `tel:` validator.
    #[must_use]
    pub fn with_tel(mut self, validator: TelValidator) -> Self {
        self.tel = validator;
        self
    }

    /// Replaces the `urn:` validator.
    #[must_use]
    pub fn with_urn(mut self, validator: UrnValidator) -> Self {
        self.urn = validator;
        self
    }

    /// Validates a candidate with the validator for its scheme.
    ///
    /// # Errors
    ///
    /// Returns [`AnyRejection::UnknownScheme`] if no supported scheme
    /// matches, otherwise the selected validator's rejection.
    pub fn validate(&self, candidate: &str) -> Result<ValidatedUrl, AnyRejection> {
        let scheme = Scheme::detect(candidate).ok_or(AnyRejection::UnknownScheme)?;
        tracing::trace!(scheme = scheme.as_str(), "dispatching candidate URL");
        match scheme {
            Scheme::About => self
                .about
                .validate(candidate)
                .map(ValidatedUrl::About)
                .map_err(AnyRejection::About),
            Scheme::Blob => self
                .blob
                .validate(candidate)
                .map(ValidatedUrl::Blob)
                .map_err(AnyRejection::Blob),
            Scheme::Data => self
                .data
                .validate(candidate)
                .map(ValidatedUrl::Data)
                .map_err(AnyRejection::Data),
            Scheme::Mailto => self
                .mailto
                .validate(candidate)
                .map(ValidatedUrl::Mailto)
                .map_err(AnyRejection::Mailto),
            Scheme::Tel => self
                .tel
                .validate(candidate)
                .map(ValidatedUrl::Tel)
                .map_err(AnyRejection::Tel),
            Scheme::Urn => self
                .urn
                .validate(candidate)
                .map(ValidatedUrl::Urn)
                .map_err(AnyRejection::Urn),
        }
    }

    /// Validates a candidate given as UTF-16 code units.
    ///
    /// # Errors
    ///
    /// Returns [`AnyRejection::UnknownScheme`] if no supported scheme
    /// matches, otherwise the selected validator's rejection.
    pub fn validate_utf16(&self, units: &[u16]) -> Result<ValidatedUrl, AnyRejection> {
        let scheme = Scheme::detect_utf16(units).ok_or(AnyRejection::UnknownScheme)?;
        match scheme {
            Scheme::About => self
                .about
                .validate_utf16(units)
                .map(ValidatedUrl::About)
                .map_err(AnyRejection::About),
            Scheme::Blob => self
                .blob
                .validate_utf16(units)
                .map(ValidatedUrl::Blob)
                .map_err(AnyRejection::Blob),
            Scheme::Data => self
                .data
                .validate_utf16(units)
                .map(ValidatedUrl::Data)
                .map_err(AnyRejection::Data),
            Scheme::Mailto => self
                .mailto
                .validate_utf16(units)
                .map(ValidatedUrl::Mailto)
                .map_err(AnyRejection::Mailto),
            Scheme::Tel => self
                .tel
                .validate_utf16(units)
                .map(ValidatedUrl::Tel)
                .map_err(AnyRejection::Tel),
            Scheme::Urn => self
                .urn
                .validate_utf16(units)
                .map(ValidatedUrl::Urn)
                .map_err(AnyRejection::Urn),
        }
    }

    /// Returns true if the candidate is accepted by its scheme's validator.
    #[must_use]
    pub fn is_valid(&self, candidate: &str) -> bool {
        self.validate(candidate).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrecheckReason;

    #[test]
    fn detect_each_scheme() {
        for scheme in Scheme::ALL {
            let candidate = format!("{}:x", scheme.as_str().to_uppercase());
            assert_eq!(Scheme::detect(&candidate), Some(scheme));
        }
        assert_eq!(Scheme::detect(""), None);
        assert_eq!(Scheme::detect("http:x"), None);
    }

    #[test]
    fn detect_utf16_prefix() {
        let units: Vec<u16> = "Blob:null/x".encode_utf16().collect();
        assert_eq!(Scheme::detect_utf16(&units), Some(Scheme::Blob));
        assert_eq!(Scheme::detect_utf16(&[0xD800, u16::from(b':')]), None);
        let long: Vec<u16> = "mailtox:".encode_utf16().collect();
        assert_eq!(Scheme::detect_utf16(&long), None);
    }

    #[test]
    fn routes_to_each_validator() {
        let validators = Validators::new();
        for (candidate, scheme) in [
            ("about:blank", Scheme::About),
            ("blob:null/550e8400-e29b-41d4-a716-446655440000", Scheme::Blob),
            ("data:,x", Scheme::Data),
            ("mailto:a@example.com", Scheme::Mailto),
            ("tel:+1", Scheme::Tel),
            ("urn:a:b", Scheme::Urn),
        ] {
            let url = validators.validate(candidate).unwrap();
            assert_eq!(url.scheme(), scheme);
        }
    }

    #[test]
    fn rejection_keeps_scheme() {
        let err = Validators::new().validate("urn:a:b?=1?=2").unwrap_err();
        assert_eq!(err.scheme(), Some(Scheme::Urn));
        assert_eq!(err.reason_str(), "duplicate q-component");
        assert_eq!(
            err,
            AnyRejection::Urn(ValidationError::new(UrnReason::DuplicateQComponent))
        );
    }

    #[test]
    fn utf16_surrogates_are_rejected() {
        let mut units: Vec<u16> = "tel:+1".encode_utf16().collect();
        units.push(0xDC00);
        let err = Validators::new().validate_utf16(&units).unwrap_err();
        assert_eq!(
            err,
            AnyRejection::Tel(ValidationError::with_detail(
                TelReason::Precheck(PrecheckReason::LoneLowSurrogate),
                "at code unit 6"
            ))
        );
    }

    #[test]
    fn custom_validator() {
        let about =
            AboutValidator::new(crate::about::AboutConfig::new().with_allow_any_identity(true));
        let validators = Validators::new().with_about(about);
        assert!(validators.is_valid("about:config"));
        assert!(!Validators::new().is_valid("about:config"));
    }
}
