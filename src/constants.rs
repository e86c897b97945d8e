//! Constants shared by the scheme validators.
//!
//! Lengths are counted in UTF-16 code units, the unit the validators use
//! for admission control.

/// Scheme name for `about:` URLs.
pub const ABOUT_SCHEME: &str = "about";

/// Scheme name for `blob:` URLs.
pub const BLOB_SCHEME: &str = "blob";

/// Scheme name for `data:` URLs.
pub const DATA_SCHEME: &str = "data";

/// Scheme name for `mailto:` URLs.
pub const MAILTO_SCHEME: &str = "mailto";

/// Scheme name for `tel:` URLs.
pub const TEL_SCHEME: &str = "tel";

/// Scheme name for `urn:` URLs.
pub const URN_SCHEME: &str = "urn";

/// Default maximum total length for most schemes.
pub const DEFAULT_MAX_URL_LENGTH: usize = 2048;

/// Default maximum total length of a `data:` URL (2 MiB of code units).
pub const DEFAULT_MAX_DATA_URL_LENGTH: usize = 2 * 1024 * 1024;

/// Default maximum length of a `data:` header (media type and parameters).
pub const DEFAULT_MAX_DATA_HEADER_LENGTH: usize = 1024;

/// Default maximum total length of a `tel:` URL.
pub const DEFAULT_MAX_TEL_LENGTH: usize = 512;

/// Default maximum length of an `about:` identity.
pub const DEFAULT_MAX_ABOUT_IDENTITY_LENGTH: usize = 64;

/// Maximum number of digits in an E.164 number.
pub const MAX_E164_DIGITS: usize = 15;

/// Default maximum number of dial characters in a local telephone number.
pub const DEFAULT_MAX_LOCAL_DIGITS: usize = 64;

/// Maximum length of a mailbox local-part (RFC 5321).
pub const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Maximum length of a forward-path address (RFC 5321).
pub const MAX_ADDRESS_LENGTH: usize = 254;

/// Default maximum number of recipients in a `mailto:` URL.
pub const DEFAULT_MAX_RECIPIENTS: usize = 64;

/// Maximum length of a URN namespace identifier.
pub const MAX_NID_LENGTH: usize = 31;

/// DNS label maximum length.
pub const MAX_DNS_LABEL_LENGTH: usize = 63;

/// DNS domain maximum length.
pub const MAX_DNS_DOMAIN_LENGTH: usize = 253;

/// Identities accepted by the default `about:` configuration.
pub const DEFAULT_ABOUT_IDENTITIES: &[&str] = &["blank", "srcdoc"];

/// Header names accepted by the default `mailto:` configuration.
pub const DEFAULT_MAILTO_HEADERS: &[&str] = &[
    "to",
    "cc",
    "bcc",
    "subject",
    "body",
    "in-reply-to",
    "reply-to",
    "from",
];
