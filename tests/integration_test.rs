//! Integration tests for certscope
//!
//! Exercises the public API end to end with in-memory template objects and
//! a fake search collaborator in place of a domain controller.

use certscope::{
    analyze_template_properties, decode, decode_interval, enumerate, enumerate_templates,
    enumerate_with, AttributeValue, DecodedValue, RawAttributeSet, RawValue, TemplateError,
    TemplateSearch, ANALYSIS_ERROR,
};

/// Raw attributes of a default "User" template as an AD CS forest ships it
fn user_template() -> RawAttributeSet {
    RawAttributeSet::new()
        .with("cn", RawValue::Text("User".into()))
        .with("displayName", RawValue::Text("User".into()))
        .with(
            "distinguishedName",
            RawValue::Text(
                "CN=User,CN=Certificate Templates,CN=Public Key Services,CN=Services,CN=Configuration,DC=corp,DC=local"
                    .into(),
            ),
        )
        .with("flags", RawValue::Integer(66106))
        .with("msPKI-Enrollment-Flag", RawValue::Integer(41))
        .with("msPKI-Certificate-Name-Flag", RawValue::Integer(-1_509_949_440))
        .with("msPKI-Private-Key-Flag", RawValue::Integer(16))
        .with(
            "pKIExtendedKeyUsage",
            RawValue::List(vec![
                "1.3.6.1.4.1.311.10.3.4".into(),
                "1.3.6.1.5.5.7.3.4".into(),
                "1.3.6.1.5.5.7.3.2".into(),
            ]),
        )
        .with("pKIKeyUsage", RawValue::Bytes(vec![0xa0, 0x00]))
        .with(
            "pKIExpirationPeriod",
            RawValue::Bytes(vec![0x00, 0x40, 0x39, 0x87, 0x2e, 0xe1, 0xfe, 0xff]),
        )
        .with("pKIMaxIssuingDepth", RawValue::Integer(0))
        .with("revision", RawValue::Integer(3))
}

#[cfg(test)]
mod enumeration_tests {
    use super::*;

    struct FakeDirectory {
        templates: Vec<RawAttributeSet>,
    }

    impl TemplateSearch for FakeDirectory {
        fn search_templates(&mut self, _container_dn: &str) -> anyhow::Result<Vec<RawAttributeSet>> {
            Ok(self.templates.clone())
        }
    }

    struct UnreachableDirectory;

    impl TemplateSearch for UnreachableDirectory {
        fn search_templates(&mut self, _container_dn: &str) -> anyhow::Result<Vec<RawAttributeSet>> {
            anyhow::bail!("Server unavailable")
        }
    }

    #[test]
    fn test_empty_batch_is_not_an_error() {
        assert!(enumerate(&[]).is_empty());

        let mut directory = FakeDirectory { templates: vec![] };
        let records = enumerate_templates(&mut directory, "DC=corp,DC=local").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_search_failure_is_fatal_and_wrapped() {
        let err = enumerate_templates(&mut UnreachableDirectory, "DC=corp,DC=local").unwrap_err();
        assert!(matches!(err, TemplateError::Enumeration(_)));
        assert_eq!(err.to_string(), "Failed to enumerate templates: Server unavailable");
    }

    #[test]
    fn test_user_template_record() {
        let records = enumerate(&[user_template()]);
        assert_eq!(records.len(), 1);
        let record = &records[0];

        assert_eq!(record.name(), "User");
        assert_eq!(record.display_name(), "User");
        assert!(record.distinguished_name().starts_with("CN=User,CN=Certificate Templates"));

        let attr = |name: &str| record.attribute(name).cloned();
        assert_eq!(
            attr("msPKI-Enrollment-Flag"),
            Some(AttributeValue::Text(
                "41 (INCLUDE_SYMMETRIC_ALGORITHMS, PUBLISH_TO_DS, AUTO_ENROLLMENT)".into()
            ))
        );
        assert_eq!(
            attr("pKIKeyUsage"),
            Some(AttributeValue::Text("a0 (Digital Signature, Key Encipherment)".into()))
        );
        assert_eq!(
            attr("pKIMaxIssuingDepth"),
            Some(AttributeValue::Text("0 (End Entity Certificate)".into()))
        );
        assert_eq!(attr("revision"), Some(AttributeValue::Text("Template Revision: 3".into())));
        assert_eq!(attr("pKIExpirationPeriod"), Some(AttributeValue::Text("58493.2 years".into())));

        let ekus = record.attribute("pKIExtendedKeyUsage").and_then(|v| v.as_list()).unwrap();
        assert_eq!(ekus[0], "1.3.6.1.4.1.311.10.3.4 (Encrypting File System)");
        assert_eq!(ekus[2], "1.3.6.1.5.5.7.3.2 (Client Authentication)");

        assert_eq!(attr("Auto_Enrollment"), Some(AttributeValue::Flag(true)));
        assert_eq!(attr("Publish_To_DS"), Some(AttributeValue::Flag(true)));
        assert_eq!(attr("Include_Symmetric_Algorithms"), Some(AttributeValue::Flag(true)));
        assert_eq!(attr("Exportable_Key"), Some(AttributeValue::Flag(true)));
        assert_eq!(attr("Add_Template_Name"), Some(AttributeValue::Flag(true)));
        assert_eq!(attr("Enrollee_Supplies_Subject"), Some(AttributeValue::Flag(false)));
        assert_eq!(attr("Is_CA"), Some(AttributeValue::Flag(false)));
        assert!(record.attribute(ANALYSIS_ERROR).is_none());
    }

    #[test]
    fn test_missing_display_name_falls_back_to_name() {
        let raw = RawAttributeSet::new().with("cn", RawValue::Text("WebServer".into()));
        let records = enumerate(&[raw]);
        assert_eq!(records[0].display_name(), "WebServer");
        assert_eq!(records[0].distinguished_name(), "N/A");
    }

    #[test]
    fn test_one_broken_template_does_not_stop_the_batch() {
        let broken = RawAttributeSet::new()
            .with("cn", RawValue::Text("Broken".into()))
            .with("msPKI-Enrollment-Flag", RawValue::Integer(0x22));
        let records = enumerate_with(&[user_template(), broken, user_template()], |raw| {
            if raw.get("cn") == Some(&RawValue::Text("Broken".into())) {
                return Err(TemplateError::Internal("flag words unreadable".into()));
            }
            Ok(analyze_template_properties(raw))
        });
        assert_eq!(records.len(), 3);

        let broken = &records[1];
        assert_eq!(broken.name(), "Broken");
        let reason = broken.attribute(ANALYSIS_ERROR).and_then(|v| v.as_text()).unwrap();
        assert!(reason.starts_with("Analysis failed: "));
        assert!(broken.attributes().iter().all(|(_, value)| value.as_flag().is_none()));
        // decoded attributes are still present
        assert!(broken.attribute("msPKI-Enrollment-Flag").is_some());

        assert!(records[2].attribute(ANALYSIS_ERROR).is_none());
    }

    #[test]
    fn test_flag_word_wider_than_32_bits() {
        let raw = RawAttributeSet::new()
            .with("cn", RawValue::Text("Wide".into()))
            .with("flags", RawValue::Integer((1 << 33) | 0x80));
        let records = enumerate(&[raw]);
        assert_eq!(records[0].attribute("Is_CA"), Some(&AttributeValue::Flag(true)));
        assert!(records[0].attribute(ANALYSIS_ERROR).is_none());
    }

    #[test]
    fn test_enrollment_flag_0x22() {
        let raw = RawAttributeSet::new().with("msPKI-Enrollment-Flag", RawValue::Integer(0x22));
        let props = analyze_template_properties(&raw);
        assert!(props.auto_enrollment);
        assert!(props.requires_manager_approval);
        assert!(!props.user_interaction_required);
        assert!(!props.publish_to_ds);
        assert!(!props.domain_auth_not_required);
        assert!(!props.allow_enroll_on_behalf_of);
        assert!(!props.include_symmetric_algorithms);
    }
}

#[cfg(test)]
mod decoder_tests {
    use super::*;

    #[test]
    fn test_private_key_flag_unknown_bits() {
        let decoded = decode("msPKI-Private-Key-Flag", &RawValue::Integer(0x4000_0000));
        assert!(decoded.as_text().unwrap().contains("UNKNOWN_FLAGS(0x40000000)"));

        // the same bit on another bitfield is dropped silently
        let decoded = decode("msPKI-Enrollment-Flag", &RawValue::Integer(0x4000_0000));
        assert_eq!(decoded.as_text(), Some("1073741824 (None)"));
    }

    #[test]
    fn test_max_issuing_depth() {
        let depth = |value| decode("pKIMaxIssuingDepth", &RawValue::Integer(value));
        assert!(depth(0).as_text().unwrap().contains("End Entity Certificate"));
        assert!(depth(-1).as_text().unwrap().contains("Unlimited - Root CA"));
        assert!(depth(5).as_text().unwrap().contains("Intermediate CA - 5 levels deep"));
    }

    #[test]
    fn test_interval_thresholds() {
        assert_eq!(decode_interval(&[0; 8]), "Never");
        let ticks: u64 = 10_000_000 * 90_000;
        assert_eq!(decode_interval(&ticks.to_le_bytes()), "1.0 days");
        assert_eq!(decode_interval(&[1, 2, 3]), "010203");
    }

    #[test]
    fn test_unknown_attributes_pass_through() {
        assert_eq!(
            decode("description", &RawValue::Text("Smart card logon".into())),
            DecodedValue::Text("Smart card logon".into())
        );
        assert_eq!(
            decode("objectClass", &RawValue::List(vec!["top".into(), "pKICertificateTemplate".into()])),
            DecodedValue::List(vec!["top".into(), "pKICertificateTemplate".into()])
        );
        assert_eq!(
            decode("objectGUID", &RawValue::Bytes(vec![0xca, 0xfe])),
            DecodedValue::Text("cafe".into())
        );
    }
}
