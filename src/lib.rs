//! Validators for opaque and non-hierarchical URL schemes.
//!
//! This crate accepts or rejects candidate `about:`, `blob:`, `data:`,
//! `mailto:`, `tel:` and `urn:` URLs. An accepted URL yields a typed record
//! with its components and a canonical string form. A rejected URL yields
//! exactly one stable reason.
//!
//! # Quick Start
//!
//! ```rust
//! use opaque_uri::{MailtoReason, MailtoValidator, SchemeValidator};
//!
//! let validator = MailtoValidator::default();
//!
//! let url = validator.validate("mailto:Someone@Example.COM?subject=Hi").unwrap();
//! assert_eq!(url.recipients()[0].domain(), Some("example.com"));
//! assert_eq!(url.headers().get("subject"), Some("Hi"));
//! assert_eq!(url.canonical(), "mailto:Someone@example.com?subject=Hi");
//!
//! let err = validator.validate("mailto:user@example.com#frag").unwrap_err();
//! assert_eq!(err.reason, MailtoReason::FragmentNotAllowed);
//! ```
//!
//! # Dispatch
//!
//! [`Validators`] holds one validator per scheme and routes a candidate by
//! its scheme prefix:
//!
//! ```rust
//! use opaque_uri::{Scheme, Validators};
//!
//! let validators = Validators::new();
//! let url = validators.validate("URN:IETF:rfc:3986").unwrap();
//! assert_eq!(url.scheme(), Scheme::Urn);
//! assert_eq!(url.canonical(), "urn:ietf:rfc:3986");
//! assert!(!validators.is_valid("http://example.com/"));
//! ```
//!
//! # Pipeline
//!
//! Every scheme runs the same stages in order and stops at the first
//! failure:
//!
//! 1. Precheck: empty input, length, control characters, bare spaces and
//!    unpaired surrogates
//! 2. Scheme prefix, matched ASCII case-insensitively
//! 3. Component split
//! 4. Per-component grammar and policy
//! 5. Canonical form
//!
//! Lengths are counted in UTF-16 code units so results agree with
//! browser-side callers. [`SchemeValidator::validate_utf16`] accepts raw
//! code units, which is the only way an unpaired surrogate can reach the
//! validator.
//!
//! # Default Limits
//!
//! | Scheme | Max Length |
//! |--------|------------|
//! | `about:`, `blob:`, `mailto:`, `urn:` | 2048 |
//! | `data:` | 2 MiB (header 1024) |
//! | `tel:` | 512 |
//!
//! # Features
//!
//! - `serde`: `Serialize` for records, reasons, errors and
//!   [`ValidationReport`]

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod about;
mod blob;
pub mod chars;
mod component;
mod constants;
mod data;
mod dispatch;
mod error;
mod host;
mod mailto;
mod percent;
mod precheck;
pub mod prelude;
mod report;
mod tel;
mod urn;
mod validator;

pub use about::{AboutConfig, AboutUrl, AboutValidator};
pub use blob::{BlobConfig, BlobOrigin, BlobUrl, BlobValidator};
pub use constants::{
    ABOUT_SCHEME, BLOB_SCHEME, DATA_SCHEME, DEFAULT_ABOUT_IDENTITIES, DEFAULT_MAILTO_HEADERS,
    DEFAULT_MAX_ABOUT_IDENTITY_LENGTH, DEFAULT_MAX_DATA_HEADER_LENGTH, DEFAULT_MAX_DATA_URL_LENGTH,
    DEFAULT_MAX_LOCAL_DIGITS, DEFAULT_MAX_RECIPIENTS, DEFAULT_MAX_TEL_LENGTH,
    DEFAULT_MAX_URL_LENGTH, MAILTO_SCHEME, MAX_ADDRESS_LENGTH, MAX_DNS_DOMAIN_LENGTH,
    MAX_DNS_LABEL_LENGTH, MAX_E164_DIGITS, MAX_LOCAL_PART_LENGTH, MAX_NID_LENGTH, TEL_SCHEME,
    URN_SCHEME,
};
pub use data::{DataConfig, DataUrl, DataValidator};
pub use dispatch::{AnyRejection, Scheme, ValidatedUrl, Validators};
pub use error::{
    AboutReason, BlobReason, ConfigError, DataReason, MailtoReason, PrecheckReason, Reason,
    TelReason, UrnReason, ValidationError,
};
pub use host::{Host, is_dns_label, is_dns_name, is_ipv4, is_ipv6};
pub use mailto::{Address, MailtoConfig, MailtoHeaders, MailtoUrl, MailtoValidator};
pub use percent::{check_percent_encoding, percent_decode_ascii, well_formed_percent_encoding};
pub use precheck::scan_forbidden;
pub use report::{FieldValue, ReportFields, ValidationReport};
pub use tel::{PhoneContextDomainMode, TelConfig, TelUrl, TelValidator};
pub use urn::{UrnConfig, UrnUrl, UrnValidator};
pub use validator::SchemeValidator;
