//! Lenient checker for generic URI path, query and fragment components.

use crate::chars::is_pchar;
use crate::percent::check_percent_encoding;

/// Which generic component is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComponentKind {
    /// `*( pchar / "/" )`
    Path,
    /// `*( pchar / "/" / "?" )`
    Query,
    /// `*( pchar / "/" / "?" )`
    Fragment,
}

/// Why a component was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComponentError {
    /// Character outside the component's set, at the given char position
    InvalidChar {
        /// The offending character
        char: char,
        /// Char position within the component
        position: usize,
    },
    /// Malformed `%` at the given byte offset
    MalformedPercent {
        /// Byte offset within the component
        offset: usize,
    },
}

impl ComponentError {
    /// Short detail for a rejection message.
    pub(crate) fn detail(self) -> String {
        match self {
            Self::InvalidChar { char, position } => {
                format!("character '{char}' at position {position}")
            }
            Self::MalformedPercent { offset } => format!("malformed '%' at offset {offset}"),
        }
    }
}

impl ComponentKind {
    /// Returns true if the character is valid for this component.
    pub(crate) const fn is_valid_char(self, c: char) -> bool {
        match self {
            Self::Path => is_pchar(c) || c == '/',
            Self::Query | Self::Fragment => is_pchar(c) || matches!(c, '/' | '?'),
        }
    }

    /// Checks characters and percent-encoding of a component.
    pub(crate) fn check(self, input: &str) -> Result<(), ComponentError> {
        for (position, c) in input.chars().enumerate() {
            if c != '%' && !self.is_valid_char(c) {
                return Err(ComponentError::InvalidChar { char: c, position });
            }
        }
        check_percent_encoding(input).map_err(|offset| ComponentError::MalformedPercent { offset })
    }
}
