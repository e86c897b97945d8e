//! Reason codes and error types for URL validation.
//!
//! Every rejection carries exactly one reason drawn from a closed,
//! per-scheme enumeration. The string form of each reason is stable and
//! safe to match on.

use std::fmt;

/// A stable, matchable rejection reason.
pub trait Reason: Copy + Eq + fmt::Debug + fmt::Display {
    /// Returns the stable string form of the reason.
    fn as_str(&self) -> &'static str;
}

/// Reasons produced by the shared precheck that runs before any
/// scheme-specific grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecheckReason {
    /// The candidate is empty
    Empty,
    /// The candidate exceeds the configured maximum length
    TooLong,
    /// An ASCII C0 control or DEL was found
    ControlCharacter,
    /// A bare space was found where the grammar does not permit one
    Space,
    /// A high surrogate not followed by a low surrogate
    LoneHighSurrogate,
    /// A low surrogate not preceded by a high surrogate
    LoneLowSurrogate,
}

impl PrecheckReason {
    /// Returns the stable string form of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty input",
            Self::TooLong => "input exceeds maximum length",
            Self::ControlCharacter => "control character in input",
            Self::Space => "space character in input",
            Self::LoneHighSurrogate => "unpaired high surrogate",
            Self::LoneLowSurrogate => "unpaired low surrogate",
        }
    }
}

impl Reason for PrecheckReason {
    fn as_str(&self) -> &'static str {
        Self::as_str(self)
    }
}

impl fmt::Display for PrecheckReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PrecheckReason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Declares a per-scheme reason enum that embeds [`PrecheckReason`].
macro_rules! reason_codes {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            /// Rejected by the shared precheck
            Precheck(PrecheckReason),
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $name {
            /// Returns the stable string form of the reason.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    Self::Precheck(reason) => reason.as_str(),
                    $( Self::$variant => $text, )*
                }
            }
        }

        impl Reason for $name {
            fn as_str(&self) -> &'static str {
                Self::as_str(self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<PrecheckReason> for $name {
            fn from(reason: PrecheckReason) -> Self {
                Self::Precheck(reason)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

reason_codes! {
    /// Reasons an `about:` URL is rejected.
    AboutReason {
        /// Input does not start with `about:`
        MissingScheme => "missing about: scheme",
        /// The `about://` form is disabled by policy
        SlashSlashNotAllowed => "about:// form not allowed",
        /// Nothing follows the scheme
        EmptyIdentity => "empty identity",
        /// Identity longer than the configured maximum
        IdentityTooLong => "identity exceeds maximum length",
        /// Identity contains a character outside unreserved / pct-encoded
        InvalidIdentityChar => "invalid character in identity",
        /// A `%` not followed by two hex digits
        MalformedPercentEncoding => "malformed percent-encoding",
        /// Identity is not in the configured allow-list
        IdentityNotAllowed => "identity not in allowed_identities_arr",
        /// Path contains a disallowed character
        InvalidPath => "invalid character in path",
        /// Query contains a disallowed character
        InvalidQuery => "invalid character in query",
        /// Query present but disabled by policy
        QueryNotAllowed => "query not allowed",
        /// Fragment contains a disallowed character
        InvalidFragment => "invalid character in fragment",
        /// Fragment present but disabled by policy
        FragmentNotAllowed => "fragment not allowed",
    }
}

reason_codes! {
    /// Reasons a `blob:` URL is rejected.
    BlobReason {
        /// Input does not start with `blob:`
        MissingScheme => "missing blob: scheme",
        /// Query or fragment present but disabled by policy
        QueryOrFragmentNotAllowed => "query or fragment not allowed",
        /// Query contains a disallowed character
        InvalidQuery => "invalid character in query",
        /// Fragment contains a disallowed character
        InvalidFragment => "invalid character in fragment",
        /// A `%` not followed by two hex digits
        MalformedPercentEncoding => "malformed percent-encoding",
        /// No `/` separates the origin from the UUID
        MissingUuid => "missing uuid separator",
        /// Nothing before the UUID separator
        EmptyOrigin => "empty origin",
        /// Origin is `null` but null origins are disabled by policy
        NullOriginNotAllowed => "null origin not allowed",
        /// Origin scheme is neither `http` nor `https`
        UnsupportedOriginScheme => "origin scheme must be http or https",
        /// Origin authority contains `@`
        OriginHasUserinfo => "origin must not contain userinfo",
        /// Origin contains a path after the authority
        OriginHasPath => "origin must not contain a path",
        /// Origin authority has no host
        EmptyHost => "empty host",
        /// Host is not a DNS name, IPv4 literal or IPv6 literal
        InvalidHost => "invalid host",
        /// Host is an IP literal but IP hosts are disabled by policy
        IpHostNotAllowed => "ip host not allowed",
        /// Port is empty or not numeric
        InvalidPort => "invalid port",
        /// Port is numeric but above 65535
        PortOutOfRange => "port out of range",
        /// UUID does not have the 8-4-4-4-12 hex layout
        InvalidUuidPattern => "uuid does not match 8-4-4-4-12 hex pattern",
        /// UUID version nibble outside 1-5
        InvalidUuidVersion => "uuid version must be 1-5",
        /// UUID variant nibble outside 8, 9, a, b
        InvalidUuidVariant => "uuid variant must be 8, 9, a, or b",
    }
}

reason_codes! {
    /// Reasons a `data:` URL is rejected.
    DataReason {
        /// Input does not start with `data:`
        MissingScheme => "missing data: scheme",
        /// No unquoted `,` separates the header from the payload
        MissingComma => "missing comma separator",
        /// Header longer than the configured maximum
        HeaderTooLong => "header exceeds maximum length",
        /// A quoted parameter value is not closed
        UnterminatedQuotedString => "unterminated quoted-string",
        /// Media type is not `type/subtype` with token parts
        InvalidMediaType => "invalid media type",
        /// Two consecutive `;` or a trailing `;`
        EmptyParameter => "empty parameter",
        /// Parameter lacks `=`
        MissingParameterValue => "parameter missing '='",
        /// Parameter name is not a token
        InvalidParameterName => "invalid parameter name",
        /// Parameter value is neither a token nor a quoted-string
        InvalidParameterValue => "invalid parameter value",
        /// Parameter name repeated
        DuplicateParameter => "duplicate parameter",
        /// `base64` marker is not the last parameter
        MisplacedBase64 => "base64 marker must be the last parameter",
        /// A `%` not followed by two hex digits
        MalformedPercentEncoding => "malformed percent-encoding",
        /// Base64 payload contains a character outside the alphabet
        InvalidBase64Char => "invalid base64 character",
        /// `=` padding followed by a non-padding character
        MisplacedBase64Padding => "base64 padding must be trailing",
        /// More than two `=` padding characters
        TooMuchBase64Padding => "base64 padding exceeds two characters",
        /// Strict base64 payload length is not a multiple of 4
        Base64Length => "base64 length must be a multiple of 4",
        /// Relaxed base64 payload has an impossible length
        Base64Truncated => "base64 length is impossible",
        /// Payload contains whitespace but policy forbids it
        WhitespaceInPayload => "whitespace in payload",
        /// Fragment contains a disallowed character
        InvalidFragment => "invalid character in fragment",
        /// Fragment present but disabled by policy
        FragmentNotAllowed => "fragment not allowed",
    }
}

reason_codes! {
    /// Reasons a `mailto:` URL is rejected.
    MailtoReason {
        /// Input does not start with `mailto:`
        MissingScheme => "missing mailto: scheme",
        /// Neither recipients nor header fields are present
        EmptyMailto => "empty mailto URL",
        /// `#` found; mailto URLs carry no fragment
        FragmentNotAllowed => "fragment not allowed",
        /// A `%` not followed by two hex digits
        MalformedPercentEncoding => "malformed percent-encoding",
        /// Decoded address contains a control character
        ControlInAddress => "control character in address",
        /// Quoted local-part never closes
        UnterminatedQuotedString => "unterminated quoted local-part",
        /// Backslash at the end of a quoted local-part
        DanglingEscape => "dangling escape in quoted local-part",
        /// Empty entry in the recipient list
        EmptyRecipient => "empty recipient",
        /// More recipients than the configured maximum
        TooManyRecipients => "too many recipients",
        /// Address longer than the configured maximum
        AddressTooLong => "address exceeds 254 chars",
        /// Nothing before `@`
        EmptyLocalPart => "empty local-part",
        /// Local-part longer than the configured maximum
        LocalPartTooLong => "local-part exceeds 64 chars",
        /// Dot-atom local-part is malformed
        InvalidLocalPart => "invalid dot-atom local-part",
        /// Quoted local-part contains a character outside qtext
        InvalidQuotedLocalPart => "invalid character in quoted local-part",
        /// Text between the closing quote and `@`
        TrailingAfterQuote => "unexpected text after quoted local-part",
        /// No `@domain` and local-only recipients are disabled
        MissingDomain => "missing domain",
        /// `@` with nothing after it
        EmptyDomain => "empty domain",
        /// Domain is not a valid DNS name
        InvalidDomain => "invalid domain",
        /// Bracketed domain literal is malformed
        InvalidDomainLiteral => "invalid domain literal",
        /// Empty entry between `&` separators
        EmptyHeader => "empty header field",
        /// Header field lacks `=`
        MissingHeaderValue => "header field missing '='",
        /// Header name is empty or outside `[A-Za-z0-9-]`
        InvalidHeaderName => "invalid header name",
        /// Header name is not in the allow-list
        HeaderNotAllowed => "header not allowed",
        /// Decoded header name or value contains CR, LF or another control
        ControlInHeader => "control character in header field",
        /// Address inside a `to`/`cc`/`bcc` header value is invalid
        InvalidHeaderAddress => "invalid address in header field",
    }
}

reason_codes! {
    /// Reasons a `tel:` URL is rejected.
    TelReason {
        /// Input does not start with `tel:`
        MissingScheme => "missing tel: scheme",
        /// Nothing before the first parameter
        EmptyNumber => "empty number",
        /// A `%` not followed by two hex digits
        MalformedPercentEncoding => "malformed percent-encoding",
        /// Number contains a character outside its grammar
        InvalidNumberChar => "invalid character in number",
        /// Global number contains a non-digit dial character
        GlobalNumberNotDigits => "global number must contain only digits",
        /// Number has no dial characters at all
        NoDigits => "number contains no digits",
        /// Global number exceeds the E.164 limit
        TooManyGlobalDigits => "global number exceeds 15 digits",
        /// Local number exceeds the configured limit
        TooManyLocalDigits => "local number exceeds 64 digits",
        /// `(` inside an open parenthesis
        NestedParenthesis => "nested parenthesis",
        /// `)` without a matching `(`
        UnmatchedCloseParenthesis => "unmatched closing parenthesis",
        /// Parenthesis pair with no digit inside
        EmptyParentheses => "parentheses must contain a digit",
        /// `(` never closed
        UnclosedParenthesis => "unclosed parenthesis",
        /// Two non-parenthesis separators next to each other
        AdjacentSeparators => "adjacent visual separators",
        /// Number starts with a non-parenthesis separator
        LeadingSeparator => "number starts with a visual separator",
        /// Number ends with a non-parenthesis separator
        TrailingSeparator => "number ends with a visual separator",
        /// Two consecutive `;` or a trailing `;`
        EmptyParameter => "empty parameter",
        /// Parameter name outside `[a-z0-9-]`
        InvalidParameterName => "invalid parameter name",
        /// Parameter value contains a disallowed character
        InvalidParameterValue => "invalid parameter value",
        /// Parameter name repeated
        DuplicateParameter => "duplicate parameter",
        /// Parameter name not recognized and unknown names are disabled
        UnknownParameter => "unknown parameter",
        /// Known parameter given without a value
        MissingParameterValue => "parameter requires a value",
        /// `ext` value is malformed
        InvalidExtension => "invalid ext value",
        /// `isub` value is malformed
        InvalidIsdnSubaddress => "invalid isub value",
        /// `tsp` value is malformed
        InvalidTsp => "invalid tsp value",
        /// `phone-context` is neither a global number nor a domain
        InvalidPhoneContext => "invalid phone-context value",
        /// `phone-context` given on a global number
        PhoneContextOnGlobal => "phone-context not allowed on global number",
        /// Local number without `phone-context`
        MissingPhoneContext => "local number requires phone-context parameter",
    }
}

reason_codes! {
    /// Reasons a `urn:` URL is rejected.
    UrnReason {
        /// Input does not start with `urn:`
        MissingScheme => "missing urn: scheme",
        /// No namespace identifier before the second `:`
        MissingNid => "missing namespace identifier",
        /// Namespace identifier longer than the configured maximum
        NidTooLong => "namespace identifier exceeds 31 chars",
        /// Namespace identifier is not alnum followed by alnum/hyphen
        InvalidNid => "invalid namespace identifier",
        /// Nothing after the namespace identifier
        MissingNss => "missing namespace-specific string",
        /// Namespace-specific string contains a disallowed character
        InvalidNss => "invalid character in namespace-specific string",
        /// Namespace-specific string starts with `/`
        NssLeadingSlash => "namespace-specific string must not start with '/'",
        /// A `%` not followed by two hex digits
        MalformedPercentEncoding => "malformed percent-encoding",
        /// `?` followed by something other than `+` or `=`
        InvalidComponentMarker => "invalid component marker",
        /// `?+` with nothing after it
        EmptyRComponent => "empty r-component",
        /// `?=` with nothing after it
        EmptyQComponent => "empty q-component",
        /// r-component contains a disallowed character
        InvalidRComponent => "invalid character in r-component",
        /// q-component contains a disallowed character
        InvalidQComponent => "invalid character in q-component",
        /// f-component contains a disallowed character
        InvalidFComponent => "invalid character in f-component",
        /// Second `?+` marker
        DuplicateRComponent => "duplicate r-component",
        /// Second `?=` marker
        DuplicateQComponent => "duplicate q-component",
        /// `?+` after `?=`
        ComponentOrder => "r-component must precede q-component",
        /// r-component present but disabled by policy
        RComponentNotAllowed => "r-component not allowed",
        /// q-component present but disabled by policy
        QComponentNotAllowed => "q-component not allowed",
        /// f-component present but disabled by policy
        FComponentNotAllowed => "f-component not allowed",
    }
}

/// A rejected candidate URL.
///
/// Carries exactly one reason (the first rule violated) and, where useful,
/// a short detail such as the offending position or the measured length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError<R> {
    /// The rule that was violated
    pub reason: R,
    /// Scheme-specific detail about the violation
    pub detail: Option<String>,
}

impl<R: Reason> ValidationError<R> {
    /// Creates an error without detail.
    #[must_use]
    pub const fn new(reason: R) -> Self {
        Self {
            reason,
            detail: None,
        }
    }

    /// Creates an error with a detail string.
    #[must_use]
    pub fn with_detail(reason: R, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: Some(detail.into()),
        }
    }

    /// Returns the reason.
    #[must_use]
    pub const fn reason(&self) -> R {
        self.reason
    }

    /// Returns the detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Re-labels the error with a wider reason type, keeping the detail.
    pub(crate) fn lift<S: Reason + From<R>>(self) -> ValidationError<S> {
        ValidationError {
            reason: S::from(self.reason),
            detail: self.detail,
        }
    }
}

impl<R: Reason> From<R> for ValidationError<R> {
    fn from(reason: R) -> Self {
        Self::new(reason)
    }
}

impl<R: Reason> fmt::Display for ValidationError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

impl<R: Reason> std::error::Error for ValidationError<R> {}

#[cfg(feature = "serde")]
impl<R: Reason> serde::Serialize for ValidationError<R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ValidationError", 2)?;
        state.serialize_field("reason", self.reason.as_str())?;
        state.serialize_field("detail", &self.detail)?;
        state.end()
    }
}

/// Errors for inconsistent validator configuration.
///
/// These are programmer errors, reported when a validator is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A length limit is zero
    ZeroLimit {
        /// Name of the offending field
        field: &'static str,
    },
    /// An allow-list is empty while the matching "accept any" switch is off
    EmptyAllowList {
        /// Name of the offending field
        field: &'static str,
    },
    /// An allow-list entry is not itself syntactically valid
    InvalidAllowListEntry {
        /// Name of the offending field
        field: &'static str,
        /// The rejected entry
        entry: String,
    },
    /// Two limits contradict each other
    Inconsistent {
        /// Description of the contradiction
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLimit { field } => write!(f, "limit '{field}' must be greater than zero"),
            Self::EmptyAllowList { field } => {
                write!(f, "allow-list '{field}' is empty and nothing else is accepted")
            }
            Self::InvalidAllowListEntry { field, entry } => {
                write!(f, "allow-list '{field}' contains invalid entry '{entry}'")
            }
            Self::Inconsistent { reason } => write!(f, "inconsistent configuration: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
