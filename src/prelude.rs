//! Convenient re-exports for glob imports.
//!
//! This module provides a single import for the validators, their
//! configurations and records, and the error types:
//!
//! ```rust
//! use opaque_uri::prelude::*;
//!
//! let url = UrnValidator::default().validate("urn:isbn:0451450523").unwrap();
//! assert_eq!(url.nid(), "isbn");
//! ```
//!
//! Character-class predicates and host helpers are left out; import them
//! from the crate root when needed.

pub use crate::{
    // Validators
    AboutValidator, BlobValidator, DataValidator, MailtoValidator, SchemeValidator, TelValidator,
    UrnValidator, Validators,
    // Configuration
    AboutConfig, BlobConfig, DataConfig, MailtoConfig, PhoneContextDomainMode, TelConfig,
    UrnConfig,
    // Records
    AboutUrl, Address, BlobOrigin, BlobUrl, DataUrl, MailtoHeaders, MailtoUrl, Scheme, TelUrl,
    UrnUrl, ValidatedUrl, ValidationReport,
    // Errors
    AboutReason, AnyRejection, BlobReason, ConfigError, DataReason, MailtoReason, PrecheckReason,
    Reason, TelReason, UrnReason, ValidationError,
};
