//! The validation pipeline shared by every scheme.
//!
//! Each scheme runs the same stages in the same order: precheck, scheme
//! prefix, component split, per-component grammar, canonical form. The
//! first failing stage decides the reason.

use std::fmt;

use crate::error::{PrecheckReason, Reason, ValidationError};
use crate::precheck::precheck_utf16;
use crate::report::{ReportFields, ValidationReport};

/// A validator for one URL scheme.
pub trait SchemeValidator {
    /// Record produced for an accepted URL.
    type Output;
    /// Closed set of rejection reasons for this scheme.
    type Reason: Reason + From<PrecheckReason>;

    /// Lower-case scheme name without the trailing `:`.
    const SCHEME: &'static str;

    /// Whether the precheck lets a bare space through to the grammar.
    const ALLOWS_SPACE: bool = false;

    /// Maximum accepted length in UTF-16 code units.
    fn max_length(&self) -> usize;

    /// Validates a candidate URL.
    ///
    /// # Errors
    ///
    /// Returns the first grammar or policy rule the candidate violates.
    fn validate(&self, candidate: &str) -> Result<Self::Output, ValidationError<Self::Reason>>;

    /// Validates a candidate given as raw UTF-16 code units.
    ///
    /// Unpaired surrogates are rejected by the precheck before any
    /// scheme-specific rule runs.
    ///
    /// # Errors
    ///
    /// Returns the first rule the candidate violates.
    fn validate_utf16(&self, units: &[u16]) -> Result<Self::Output, ValidationError<Self::Reason>> {
        precheck_utf16(units, self.max_length(), Self::ALLOWS_SPACE)
            .map_err(ValidationError::lift)?;
        let candidate = String::from_utf16(units)
            .map_err(|_| ValidationError::new(PrecheckReason::LoneHighSurrogate).lift())?;
        self.validate(&candidate)
    }

    /// Returns true if the candidate is accepted.
    fn is_valid(&self, candidate: &str) -> bool {
        self.validate(candidate).is_ok()
    }

    /// Validates a candidate and flattens the outcome into a report.
    fn report(&self, candidate: &str) -> ValidationReport
    where
        Self::Output: ReportFields,
    {
        ValidationReport::from(&self.validate(candidate))
    }
}

/// Strips a case-insensitive `scheme:` prefix.
pub(crate) fn strip_scheme<'a>(candidate: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix_len = scheme.len() + 1;
    let name = candidate.get(..prefix_len)?.strip_suffix(':')?;
    name.eq_ignore_ascii_case(scheme)
        .then(|| &candidate[prefix_len..])
}

/// Splits at the first `delimiter`; an empty tail counts as absent.
pub(crate) fn split_off(input: &str, delimiter: char) -> (&str, Option<&str>) {
    match input.find(delimiter) {
        Some(idx) => {
            let tail = &input[idx + delimiter.len_utf8()..];
            (&input[..idx], (!tail.is_empty()).then_some(tail))
        }
        None => (input, None),
    }
}

/// Logs a rejection and hands the error back.
pub(crate) fn log_rejection<R: Reason>(
    scheme: &'static str,
    err: ValidationError<R>,
) -> ValidationError<R> {
    tracing::debug!(
        scheme,
        reason = err.reason.as_str(),
        detail = err.detail.as_deref(),
        "rejected candidate URL"
    );
    err
}

/// Logs an acceptance with its canonical form.
pub(crate) fn log_acceptance(scheme: &'static str, canonical: &impl fmt::Display) {
    tracing::trace!(scheme, canonical = %canonical, "accepted candidate URL");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_scheme_is_case_insensitive() {
        assert_eq!(strip_scheme("URN:isbn:1", "urn"), Some("isbn:1"));
        assert_eq!(strip_scheme("urn:", "urn"), Some(""));
    }

    #[test]
    fn strip_scheme_requires_colon() {
        assert_eq!(strip_scheme("urnx:isbn", "urn"), None);
        assert_eq!(strip_scheme("urn", "urn"), None);
        assert_eq!(strip_scheme("ur", "urn"), None);
    }

    #[test]
    fn split_off_drops_empty_tail() {
        assert_eq!(split_off("a#b", '#'), ("a", Some("b")));
        assert_eq!(split_off("a#", '#'), ("a", None));
        assert_eq!(split_off("a", '#'), ("a", None));
        assert_eq!(split_off("a?b?c", '?'), ("a", Some("b?c")));
    }

    #[test]
    fn strip_scheme_handles_multibyte_prefix() {
        assert_eq!(strip_scheme("ü:x", "urn"), None);
        assert_eq!(strip_scheme("tél:1", "tel"), None);
        assert_eq!(strip_scheme("abü:", "urn"), None);
    }
}
