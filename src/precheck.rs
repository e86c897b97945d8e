//! Input admission checks run before any scheme grammar.
//!
//! Candidates are treated as UTF-16 code unit sequences so that unpaired
//! surrogates can be detected. A `&str` can never hold one, but the same
//! scanner serves [`crate::SchemeValidator::validate_utf16`].

use crate::error::{PrecheckReason, ValidationError};

const SPACE: u16 = 0x20;
const DEL: u16 = 0x7F;

const fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

const fn is_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

/// Scans code units for forbidden content.
///
/// Rejects C0 controls and DEL unconditionally, a bare space unless
/// `allow_space` is set, and unpaired surrogates. The first offending unit
/// determines the reason.
///
/// # Errors
///
/// Returns the reason for the first forbidden unit, with its index.
pub fn scan_forbidden<I>(units: I, allow_space: bool) -> Result<(), ValidationError<PrecheckReason>>
where
    I: IntoIterator<Item = u16>,
{
    let mut units = units.into_iter().enumerate().peekable();
    while let Some((i, unit)) = units.next() {
        let reason = if unit < SPACE || unit == DEL {
            PrecheckReason::ControlCharacter
        } else if unit == SPACE && !allow_space {
            PrecheckReason::Space
        } else if is_high_surrogate(unit) {
            if units.peek().is_some_and(|&(_, next)| is_low_surrogate(next)) {
                units.next();
                continue;
            }
            PrecheckReason::LoneHighSurrogate
        } else if is_low_surrogate(unit) {
            PrecheckReason::LoneLowSurrogate
        } else {
            continue;
        };
        return Err(ValidationError::with_detail(reason, format!("at code unit {i}")));
    }
    Ok(())
}

/// Number of UTF-16 code units needed to encode `s`.
pub(crate) fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

fn check_length(len: usize, max: usize) -> Result<(), ValidationError<PrecheckReason>> {
    if len == 0 {
        return Err(ValidationError::new(PrecheckReason::Empty));
    }
    if len > max {
        return Err(ValidationError::with_detail(
            PrecheckReason::TooLong,
            format!("length {len} exceeds maximum {max}"),
        ));
    }
    Ok(())
}

/// Runs the full precheck over a string slice.
pub(crate) fn precheck_str(
    s: &str,
    max_length: usize,
    allow_space: bool,
) -> Result<(), ValidationError<PrecheckReason>> {
    // UTF-8 length bounds the UTF-16 length from above.
    let len = if s.len() <= max_length {
        s.len()
    } else {
        utf16_len(s)
    };
    check_length(len, max_length)?;
    scan_forbidden(s.encode_utf16(), allow_space)
}

/// Runs the full precheck over raw UTF-16 code units.
pub(crate) fn precheck_utf16(
    units: &[u16],
    max_length: usize,
    allow_space: bool,
) -> Result<(), ValidationError<PrecheckReason>> {
    check_length(units.len(), max_length)?;
    scan_forbidden(units.iter().copied(), allow_space)
}
