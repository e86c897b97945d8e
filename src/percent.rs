//! Percent-encoding checks, decoding and re-encoding.
//!
//! Decoding is byte-oriented: each `%XX` triplet becomes the single code
//! point `U+00XX`. Multi-byte UTF-8 sequences are not reassembled.

use percent_encoding::{AsciiSet, CONTROLS, percent_encode};

/// Characters percent-encoded when an address is written back into a
/// `mailto:` URL.
pub(crate) const MAILTO_ADDRESS_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b',')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters percent-encoded when a header value is written back into a
/// `mailto:` URL.
pub(crate) const MAILTO_HEADER_SET: &AsciiSet = &MAILTO_ADDRESS_SET.add(b'=');

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decodes the triplet starting at `i` (which must hold `%`).
fn triplet(bytes: &[u8], i: usize) -> Option<u8> {
    let hi = hex_value(*bytes.get(i + 1)?)?;
    let lo = hex_value(*bytes.get(i + 2)?)?;
    Some((hi << 4) | lo)
}

/// Checks that every `%` in `s` starts a `%XX` hex triplet.
///
/// # Errors
///
/// Returns the byte offset of the first malformed `%`.
pub fn check_percent_encoding(s: &str) -> Result<(), usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if triplet(bytes, i).is_none() {
                return Err(i);
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Returns true if every `%` in `s` is followed by two hex digits.
///
/// A trailing `%`, a truncated `%X` and a non-hex pair are all malformed.
/// The decoded byte is not inspected.
///
/// # Examples
///
/// ```
/// use opaque_uri::well_formed_percent_encoding;
///
/// assert!(well_formed_percent_encoding("a%20b"));
/// assert!(!well_formed_percent_encoding("a%2"));
/// assert!(!well_formed_percent_encoding("a%zz"));
/// ```
#[must_use]
pub fn well_formed_percent_encoding(s: &str) -> bool {
    check_percent_encoding(s).is_ok()
}

/// Replaces each `%XX` triplet with the code point `U+00XX`.
///
/// Characters outside triplets, including a malformed `%`, are copied
/// unchanged. Decoded bytes above `0x7F` map to Latin-1 code points.
///
/// # Examples
///
/// ```
/// use opaque_uri::percent_decode_ascii;
///
/// assert_eq!(percent_decode_ascii("a%20b"), "a b");
/// assert_eq!(percent_decode_ascii("%E9"), "\u{e9}");
/// ```
#[must_use]
pub fn percent_decode_ascii(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(byte) = triplet(bytes, i) {
                out.push_str(&s[start..i]);
                out.push(char::from(byte));
                i += 3;
                start = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&s[start..]);
    out
}

/// Re-encodes text produced by [`percent_decode_ascii`].
///
/// Code points up to `U+00FF` are written as the single byte they came
/// from, escaped if the byte is in `set` or non-ASCII. Code points above
/// `U+00FF` cannot have come from a triplet and are written unescaped, so
/// decoding the result yields the input again.
#[must_use]
pub(crate) fn percent_encode_latin1(s: &str, set: &'static AsciiSet) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(byte) => out.extend(percent_encode(&[byte], set)),
            Err(_) => out.push(c),
        }
    }
    out
}
