//! Flat validation results.
//!
//! A [`ValidationReport`] carries `is_valid`, the reason on failure, and
//! the scheme's fields on success. With the `serde` feature it serializes
//! to a single flat JSON object.

use std::collections::BTreeMap;

use crate::about::AboutUrl;
use crate::blob::BlobUrl;
use crate::data::DataUrl;
use crate::dispatch::{AnyRejection, ValidatedUrl};
use crate::error::{Reason, ValidationError};
use crate::mailto::MailtoUrl;
use crate::tel::TelUrl;
use crate::urn::UrnUrl;

/// A field value in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// A string
    Text(String),
    /// A boolean
    Flag(bool),
    /// An ordered list of strings
    List(Vec<String>),
    /// Names mapped to one or more values
    Multimap(BTreeMap<String, Vec<String>>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Scheme records that can describe themselves as report fields.
pub trait ReportFields {
    /// Returns the fields present on the record.
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue>;
}

/// Collects fields, skipping absent optional ones.
#[derive(Default)]
struct Fields(BTreeMap<&'static str, FieldValue>);

impl Fields {
    fn put(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.0.insert(name, value.into());
        self
    }

    fn put_opt(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.put(name, value),
            None => self,
        }
    }
}

impl ReportFields for AboutUrl {
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue> {
        Fields::default()
            .put("identity", self.identity())
            .put_opt("path", self.path())
            .put_opt("query", self.query())
            .put_opt("fragment", self.fragment())
            .put("canonical", self.canonical())
            .0
    }
}

impl ReportFields for BlobUrl {
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue> {
        Fields::default()
            .put("origin", self.origin().to_string())
            .put("uuid", self.uuid())
            .put_opt("query", self.query())
            .put_opt("fragment", self.fragment())
            .put("canonical", self.canonical())
            .0
    }
}

impl ReportFields for DataUrl {
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue> {
        let parameters = self
            .parameters()
            .iter()
            .map(|(name, value)| (name.clone(), vec![value.clone()]))
            .collect();
        Fields::default()
            .put("media_type", self.media_type())
            .put_opt("charset", self.charset())
            .put("parameters", FieldValue::Multimap(parameters))
            .put("is_base64", self.is_base64())
            .put_opt("fragment", self.fragment())
            .put("canonical", self.canonical())
            .0
    }
}

impl ReportFields for MailtoUrl {
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue> {
        let recipients = self.recipients().iter().map(ToString::to_string).collect();
        let headers = self
            .headers()
            .iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect();
        Fields::default()
            .put("recipients", FieldValue::List(recipients))
            .put("headers", FieldValue::Multimap(headers))
            .put("canonical", self.canonical())
            .0
    }
}

impl ReportFields for TelUrl {
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue> {
        let params = self
            .params()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.map(str::to_string).into_iter().collect::<Vec<_>>(),
                )
            })
            .collect();
        Fields::default()
            .put("number", self.number())
            .put("is_global", self.is_global())
            .put("params", FieldValue::Multimap(params))
            .put_opt("ext", self.ext())
            .put_opt("phone_context", self.phone_context())
            .put("canonical", self.canonical())
            .0
    }
}

impl ReportFields for UrnUrl {
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue> {
        Fields::default()
            .put("nid", self.nid())
            .put("nss", self.nss())
            .put_opt("r_component", self.r_component())
            .put_opt("q_component", self.q_component())
            .put_opt("f_component", self.f_component())
            .put("canonical", self.canonical())
            .0
    }
}

impl ReportFields for ValidatedUrl {
    fn report_fields(&self) -> BTreeMap<&'static str, FieldValue> {
        let mut fields = match self {
            Self::About(url) => url.report_fields(),
            Self::Blob(url) => url.report_fields(),
            Self::Data(url) => url.report_fields(),
            Self::Mailto(url) => url.report_fields(),
            Self::Tel(url) => url.report_fields(),
            Self::Urn(url) => url.report_fields(),
        };
        fields.insert("scheme", self.scheme().as_str().into());
        fields
    }
}

/// The outcome of one validation as a flat record.
///
/// # Examples
///
/// ```
/// use opaque_uri::{SchemeValidator, TelValidator, ValidationReport};
///
/// let report = TelValidator::default().report("tel:5551234567");
/// assert!(!report.is_valid);
/// assert_eq!(report.reason, Some("local number requires phone-context parameter"));
/// assert!(report.fields.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationReport {
    /// Whether the candidate was accepted
    pub is_valid: bool,
    /// The stable reason string, present iff rejected
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub reason: Option<&'static str>,
    /// Detail about the rejection, if any
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub detail: Option<String>,
    /// Scheme fields, present iff accepted
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: BTreeMap<&'static str, FieldValue>,
}

impl ValidationReport {
    /// Builds a report for an accepted record.
    #[must_use]
    pub fn accepted(record: &impl ReportFields) -> Self {
        Self {
            is_valid: true,
            reason: None,
            detail: None,
            fields: record.report_fields(),
        }
    }

    /// Builds a report for a rejection.
    #[must_use]
    pub fn rejected(reason: &'static str, detail: Option<&str>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
            detail: detail.map(str::to_string),
            fields: BTreeMap::new(),
        }
    }
}

impl<T: ReportFields, R: Reason> From<&Result<T, ValidationError<R>>> for ValidationReport {
    fn from(result: &Result<T, ValidationError<R>>) -> Self {
        match result {
            Ok(record) => Self::accepted(record),
            Err(err) => Self::rejected(err.reason.as_str(), err.detail()),
        }
    }
}

impl From<&Result<ValidatedUrl, AnyRejection>> for ValidationReport {
    fn from(result: &Result<ValidatedUrl, AnyRejection>) -> Self {
        match result {
            Ok(url) => Self::accepted(url),
            Err(err) => Self::rejected(err.reason_str(), err.detail()),
        }
    }
}
