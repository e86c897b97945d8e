//! End-to-end scenarios for each scheme and the dispatcher.

use opaque_uri::{
    AboutConfig, AboutReason, AboutValidator, AnyRejection, BlobOrigin, BlobReason,
    BlobValidator, DataReason, DataValidator, Host, MailtoReason, MailtoValidator, Scheme,
    SchemeValidator, TelReason, TelValidator, UrnReason, UrnValidator, ValidatedUrl, Validators,
};

mod about {
    use super::*;

    #[test]
    fn blank_has_no_tails() {
        let url = AboutValidator::default().validate("about:blank").unwrap();
        assert_eq!(url.identity(), "blank");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(url.to_string(), "about:blank");
    }

    #[test]
    fn config_with_fragment() {
        let validator = AboutValidator::new(AboutConfig::new().with_allow_any_identity(true));
        let url = validator.validate("about:config#network").unwrap();
        assert_eq!(url.identity(), "config");
        assert_eq!(url.fragment(), Some("network"));
    }

    #[test]
    fn slash_slash_follows_policy() {
        assert!(AboutValidator::default().is_valid("about://blank"));

        let strict = AboutValidator::new(AboutConfig::new().with_allow_about_slash_slash(false));
        let err = strict.validate("about://blank").unwrap_err();
        assert_eq!(err.reason, AboutReason::SlashSlashNotAllowed);
    }

    #[test]
    fn unknown_identity() {
        let err = AboutValidator::default().validate("about:unknown").unwrap_err();
        assert_eq!(err.reason, AboutReason::IdentityNotAllowed);
        assert_eq!(err.reason.as_str(), "identity not in allowed_identities_arr");
    }
}

mod blob {
    use super::*;

    #[test]
    fn https_origin_and_uuid() {
        let url = BlobValidator::default()
            .validate("blob:https://example.com/550E8400-E29B-41D4-A716-446655440000")
            .unwrap();
        assert_eq!(url.uuid(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(
            url.origin(),
            &BlobOrigin::Tuple {
                scheme: "https".into(),
                host: Host::Domain("example.com".into()),
                port: None,
            }
        );
        assert_eq!(
            url.canonical(),
            "blob:https://example.com/550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn null_origin_with_bad_uuid() {
        let err = BlobValidator::default()
            .validate("blob:null/not-a-uuid")
            .unwrap_err();
        assert_eq!(err.reason, BlobReason::InvalidUuidPattern);
        assert_eq!(err.reason.as_str(), "uuid does not match 8-4-4-4-12 hex pattern");
    }
}

mod data {
    use super::*;

    #[test]
    fn base64_payload() {
        let url = DataValidator::default()
            .validate("data:text/plain;base64,AAAA")
            .unwrap();
        assert!(url.is_base64());
        assert_eq!(url.media_type(), "text/plain");
        assert_eq!(url.payload(), "AAAA");
    }

    #[test]
    fn truncated_base64() {
        let err = DataValidator::default()
            .validate("data:text/plain;base64,AAA")
            .unwrap_err();
        assert_eq!(err.reason, DataReason::Base64Length);
        assert_eq!(err.reason.as_str(), "base64 length must be a multiple of 4");
    }
}

mod mailto {
    use super::*;

    #[test]
    fn two_recipients_and_subject() {
        let url = MailtoValidator::default()
            .validate("mailto:a@example.com,b@example.com?subject=Hi")
            .unwrap();
        assert_eq!(url.recipients().len(), 2);
        assert_eq!(url.recipients()[1].local_part(), "b");
        assert_eq!(url.headers().get_all("subject"), ["Hi"]);
        assert_eq!(url.headers().len(), 1);
    }

    #[test]
    fn unterminated_quoted_local_part() {
        let err = MailtoValidator::default()
            .validate("mailto:\"unterminated@example.com")
            .unwrap_err();
        assert_eq!(err.reason, MailtoReason::UnterminatedQuotedString);
    }

    #[test]
    fn utf8_subject_round_trips() {
        let input = "mailto:a@example.com?subject=caf%C3%A9%20%E2%80%94%20menu";
        let url = MailtoValidator::default().validate(input).unwrap();
        assert_eq!(url.canonical(), input);
    }
}

mod tel {
    use super::*;

    #[test]
    fn global_number_with_extension() {
        let url = TelValidator::default()
            .validate("tel:+15551234567;ext=123")
            .unwrap();
        assert!(url.is_global());
        assert_eq!(url.number(), "+15551234567");
        assert_eq!(url.ext(), Some("123"));
    }

    #[test]
    fn spaced_number() {
        let url = TelValidator::default()
            .validate("tel:+1 555 123 4567")
            .unwrap();
        assert_eq!(url.number(), "+15551234567");
        assert!(Validators::new().is_valid("tel:+1 555 123 4567"));
    }

    #[test]
    fn local_number_needs_context() {
        let err = TelValidator::default()
            .validate("tel:5551234567")
            .unwrap_err();
        assert_eq!(err.reason, TelReason::MissingPhoneContext);
        assert_eq!(
            err.reason.as_str(),
            "local number requires phone-context parameter"
        );
    }
}

mod urn {
    use super::*;

    #[test]
    fn rfc_reference() {
        let url = UrnValidator::default().validate("urn:ietf:rfc:3986").unwrap();
        assert_eq!(url.nid(), "ietf");
        assert_eq!(url.nss(), "rfc:3986");
        assert_eq!(url.assigned_name(), "urn:ietf:rfc:3986");
    }

    #[test]
    fn duplicate_q_component() {
        let err = UrnValidator::default()
            .validate("urn:ietf:rfc:3986?=q1?=q2")
            .unwrap_err();
        assert_eq!(err.reason, UrnReason::DuplicateQComponent);
        assert_eq!(err.reason.as_str(), "duplicate q-component");
    }
}

mod dispatch {
    use super::*;

    #[test]
    fn routes_each_scheme() {
        let validators = Validators::new();
        let cases = [
            ("about:blank", Scheme::About),
            (
                "blob:null/550e8400-e29b-41d4-a716-446655440000",
                Scheme::Blob,
            ),
            ("data:,hello", Scheme::Data),
            ("mailto:a@example.com", Scheme::Mailto),
            ("tel:+15551234567", Scheme::Tel),
            ("urn:isbn:0451450523", Scheme::Urn),
        ];
        for (input, scheme) in cases {
            let url = validators.validate(input).unwrap();
            assert_eq!(url.scheme(), scheme, "{input}");
        }
    }

    #[test]
    fn unknown_scheme() {
        let err = Validators::new()
            .validate("https://example.com/")
            .unwrap_err();
        assert_eq!(err, AnyRejection::UnknownScheme);
        assert_eq!(err.scheme(), None);
    }

    #[test]
    fn rejection_keeps_scheme_reason() {
        let err = Validators::new().validate("tel:5551234567").unwrap_err();
        assert_eq!(err.scheme(), Some(Scheme::Tel));
        assert_eq!(
            err.reason_str(),
            "local number requires phone-context parameter"
        );
    }

    #[test]
    fn record_matches_scheme_validator() {
        let via_dispatch = Validators::new().validate("URN:ISBN:0451450523").unwrap();
        let direct = UrnValidator::default().validate("URN:ISBN:0451450523").unwrap();
        assert_eq!(via_dispatch, ValidatedUrl::Urn(direct));
    }
}

#[cfg(feature = "serde")]
mod serde_json_shape {
    use super::*;
    use opaque_uri::{TelConfig, UrnConfig};
    use serde_json::{Value, json};

    #[test]
    fn accepted_report_is_flat() {
        let report = TelValidator::default().report("tel:+15551234567;ext=123");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["is_valid"], json!(true));
        assert_eq!(value["number"], json!("+15551234567"));
        assert_eq!(value["is_global"], json!(true));
        assert_eq!(value["ext"], json!("123"));
        assert_eq!(value["params"], json!({ "ext": ["123"] }));
        assert!(value.get("reason").is_none());
    }

    #[test]
    fn rejected_report_carries_reason() {
        let report = DataValidator::default().report("data:text/plain;base64,AAA");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["is_valid"], json!(false));
        assert_eq!(
            value["reason"],
            json!("base64 length must be a multiple of 4")
        );
        assert!(value.get("media_type").is_none());
    }

    #[test]
    fn validated_url_is_tagged_by_scheme() {
        let url = Validators::new().validate("urn:ietf:rfc:3986").unwrap();
        let value = serde_json::to_value(&url).unwrap();
        assert_eq!(value["scheme"], json!("urn"));
        assert_eq!(value["nid"], json!("ietf"));
        assert_eq!(value["r_component"], Value::Null);
    }

    #[test]
    fn error_serializes_reason_string() {
        let err = UrnValidator::default().validate("urn:ietf").unwrap_err();
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["reason"], json!(err.reason.as_str()));
    }

    #[test]
    fn config_loads_with_defaults() {
        let config: TelConfig = serde_json::from_str(
            r#"{
                "require_phone_context_for_local": false,
                "phone_context_domain_mode": "relaxed"
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_length, 512);
        assert!(TelValidator::new(config).is_valid("tel:5551234567"));

        let config: UrnConfig = serde_json::from_str(r#"{ "allow_f_component": false }"#).unwrap();
        let err = UrnValidator::new(config)
            .validate("urn:ietf:rfc:3986#section")
            .unwrap_err();
        assert_eq!(err.reason, UrnReason::FComponentNotAllowed);
    }
}
