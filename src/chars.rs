//! Character-class predicates shared by the scheme grammars.
//!
//! All predicates are ASCII-only; callers that accept non-ASCII code
//! points check for them explicitly.

/// `ALPHA / DIGIT / "-" / "." / "_" / "~"` (RFC 3986).
#[must_use]
pub const fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// `"!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="` (RFC 3986).
#[must_use]
pub const fn is_sub_delim(c: char) -> bool {
    matches!(
        c,
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
    )
}

/// `unreserved / sub-delims / ":" / "@"`; percent triplets are checked separately.
#[must_use]
pub const fn is_pchar(c: char) -> bool {
    is_unreserved(c) || is_sub_delim(c) || matches!(c, ':' | '@')
}

/// HTTP token character (RFC 9110 `tchar`).
#[must_use]
pub const fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '.'
                | '^'
                | '_'
                | '`'
                | '|'
                | '~'
        )
}

/// Returns true if `s` is a non-empty run of [`is_tchar`] characters.
#[must_use]
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

/// RFC 5322 `atext`.
#[must_use]
pub const fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

/// RFC 5322 `qtext`: printable ASCII except `"` and `\`.
#[must_use]
pub const fn is_qtext(c: char) -> bool {
    matches!(c, '!' | '#'..='[' | ']'..='~')
}

/// `0-9 / A-F / a-f`.
#[must_use]
pub const fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Letter, digit or hyphen.
#[must_use]
pub const fn is_ldh(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// A code point outside ASCII. Decoded `%80`..`%FF` bytes land here as
/// `U+0080`..`U+00FF`, whatever their meaning as Unicode.
#[must_use]
pub const fn is_non_ascii(c: char) -> bool {
    !c.is_ascii()
}
