//! Certificate template attribute decoder
//!
//! Turns one raw directory attribute into its annotated display form.
//! Dispatch is a fixed table keyed on the exact (case-sensitive) schema
//! attribute name; anything without a rule, or whose raw type does not
//! match its rule, passes through as plain text.
//!
//! | Attribute | Rendering |
//! |-----------|-----------|
//! | `flags`, `msPKI-*-Flag`, `instanceType` | `"<value> (<bit names or None>)"` |
//! | `pKIExtendedKeyUsage` | one `"<oid> (<name>)"` entry per OID |
//! | `pKIDefaultKeySpec` | `"<value> (<key spec>)"` |
//! | `pKIMaxIssuingDepth` | `"<value> (<CA depth meaning>)"` |
//! | `pKIKeyUsage` | `"<first byte hex> (<usages or None>)"` |
//! | `pKIExpirationPeriod`, `pKIOverlapPeriod` | FILETIME interval |

use crate::common_types::{to_hex, DecodedValue, RawValue};
use crate::filetime::decode_interval;
use crate::flag_tables::{
    eku_name, key_spec_label, FlagTable, CERTIFICATE_NAME_FLAGS, ENROLLMENT_FLAGS,
    INSTANCE_TYPES, KEY_USAGES, PRIVATE_KEY_FLAGS, TEMPLATE_FLAGS,
};

/// Decoding rule for one attribute
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Named bits; unrecognized bits are dropped
    Bitfield(FlagTable),
    /// Named bits plus an `UNKNOWN_FLAGS(0x..)` entry for leftovers
    BitfieldWithUnknown(FlagTable),
    ExtendedKeyUsage,
    KeySpec,
    MaxIssuingDepth,
    KeyUsage,
    Interval,
    KeySize,
    /// Label prefix for any raw type
    Labelled(&'static str),
    /// Label prefix for integers only
    LabelledInteger(&'static str),
}

const RULES: &[(&str, Rule)] = &[
    ("flags", Rule::Bitfield(TEMPLATE_FLAGS)),
    ("msPKI-Enrollment-Flag", Rule::Bitfield(ENROLLMENT_FLAGS)),
    ("msPKI-Certificate-Name-Flag", Rule::Bitfield(CERTIFICATE_NAME_FLAGS)),
    ("msPKI-Private-Key-Flag", Rule::BitfieldWithUnknown(PRIVATE_KEY_FLAGS)),
    ("pKIExtendedKeyUsage", Rule::ExtendedKeyUsage),
    ("instanceType", Rule::Bitfield(INSTANCE_TYPES)),
    ("pKIDefaultKeySpec", Rule::KeySpec),
    ("pKIMaxIssuingDepth", Rule::MaxIssuingDepth),
    ("pKIKeyUsage", Rule::KeyUsage),
    ("pKIExpirationPeriod", Rule::Interval),
    ("pKIOverlapPeriod", Rule::Interval),
    ("msPKI-Minimal-Key-Size", Rule::KeySize),
    ("msPKI-Template-Schema-Version", Rule::Labelled("Schema Version")),
    ("msPKI-Template-Minor-Revision", Rule::Labelled("Minor Revision")),
    ("revision", Rule::LabelledInteger("Template Revision")),
    ("uSNChanged", Rule::LabelledInteger("USN")),
    ("uSNCreated", Rule::LabelledInteger("USN")),
];

fn rule_for(attribute_name: &str) -> Option<Rule> {
    RULES
        .iter()
        .find(|(name, _)| *name == attribute_name)
        .map(|(_, rule)| *rule)
}

/// Decodes a single attribute value for display. Never fails.
pub fn decode(attribute_name: &str, raw_value: &RawValue) -> DecodedValue {
    rule_for(attribute_name)
        .and_then(|rule| apply(rule, raw_value))
        .unwrap_or_else(|| passthrough(raw_value))
}

/// Returns `None` when the raw type does not fit the rule.
fn apply(rule: Rule, raw_value: &RawValue) -> Option<DecodedValue> {
    let decoded = match (rule, raw_value) {
        (Rule::Bitfield(table), RawValue::Integer(value)) => {
            render_bitfield(*value, table, false)
        }
        (Rule::BitfieldWithUnknown(table), RawValue::Integer(value)) => {
            render_bitfield(*value, table, true)
        }
        (Rule::ExtendedKeyUsage, RawValue::List(oids)) => {
            return Some(DecodedValue::List(
                oids.iter().map(|oid| annotate_oid(oid)).collect(),
            ));
        }
        (Rule::KeySpec, RawValue::Integer(value)) => {
            format!("{} ({})", value, key_spec_label(*value))
        }
        (Rule::MaxIssuingDepth, RawValue::Integer(value)) => render_issuing_depth(*value),
        (Rule::KeyUsage, RawValue::Bytes(bytes)) => render_key_usage(bytes),
        (Rule::Interval, RawValue::Bytes(bytes)) => decode_interval(bytes),
        (Rule::KeySize, RawValue::Integer(value)) => format!("{} bits", value),
        (Rule::Labelled(label), value) => format!("{}: {}", label, value),
        (Rule::LabelledInteger(label), RawValue::Integer(value)) => {
            format!("{}: {}", label, value)
        }
        _ => return None,
    };
    Some(DecodedValue::Text(decoded))
}

/// Plain rendering for attributes without a rule
fn passthrough(raw_value: &RawValue) -> DecodedValue {
    match raw_value {
        RawValue::Text(s) => DecodedValue::Text(s.clone()),
        RawValue::List(values) => DecodedValue::List(values.clone()),
        RawValue::Integer(value) => DecodedValue::Text(value.to_string()),
        RawValue::Bytes(bytes) => DecodedValue::Text(to_hex(bytes)),
    }
}

/// Reinterprets a directory integer as a 32-bit flag word.
///
/// AD returns INTEGER syntax signed, so bit 31 arrives as a negative
/// number. Values wider than 32 bits keep their full pattern.
pub(crate) fn flag_bits(value: i64) -> u64 {
    if value < 0 && value >= i64::from(i32::MIN) {
        u64::from(value as i32 as u32)
    } else {
        value as u64
    }
}

/// Names of the table bits set in `bits`, in table order
pub(crate) fn bit_names(bits: u64, table: FlagTable) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(mask, _)| bits & u64::from(*mask) != 0)
        .map(|(_, name)| *name)
        .collect()
}

fn render_bitfield(value: i64, table: FlagTable, report_unknown: bool) -> String {
    let bits = flag_bits(value);
    let mut names: Vec<String> = bit_names(bits, table)
        .into_iter()
        .map(str::to_string)
        .collect();

    if report_unknown {
        let known = table.iter().fold(0u64, |acc, (mask, _)| acc | u64::from(*mask));
        let remaining = bits & !known;
        if remaining != 0 {
            names.push(format!("UNKNOWN_FLAGS(0x{:x})", remaining));
        }
    }

    format!("{} ({})", value, join_or_none(&names))
}

fn join_or_none<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names
            .iter()
            .map(|name| name.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn annotate_oid(oid: &str) -> String {
    match eku_name(oid) {
        Some(name) => format!("{} ({})", oid, name),
        None => oid.to_string(),
    }
}

fn render_issuing_depth(value: i64) -> String {
    match value {
        0 => format!("{} (End Entity Certificate)", value),
        -1 => format!("{} (Unlimited - Root CA)", value),
        depth => format!("{} (Intermediate CA - {} levels deep)", value, depth),
    }
}

fn render_key_usage(bytes: &[u8]) -> String {
    match bytes.first() {
        Some(&usage) => {
            let usages: Vec<&str> = KEY_USAGES
                .iter()
                .filter(|(bit, _)| usage & bit != 0)
                .map(|(_, name)| *name)
                .collect();
            format!("{:02x} ({})", usage, join_or_none(&usages))
        }
        None => format!("Binary: {}", to_hex(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(attribute: &str, value: RawValue) -> String {
        match decode(attribute, &value) {
            DecodedValue::Text(s) => s,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_template_flags() {
        assert_eq!(
            text("flags", RawValue::Integer(0x20 | 0x200)),
            "544 (AUTO_ENROLLMENT, ADD_TEMPLATE_NAME)"
        );
        assert_eq!(text("flags", RawValue::Integer(0)), "0 (None)");
    }

    #[test]
    fn test_enrollment_flags_drop_unknown_bits() {
        assert_eq!(
            text("msPKI-Enrollment-Flag", RawValue::Integer(0x4000_0000 | 0x2)),
            "1073741826 (PEND_ALL_REQUESTS)"
        );
    }

    #[test]
    fn test_certificate_name_flag_sign_bit() {
        // SUBJECT_REQUIRE_DIRECTORY_PATH arrives as a negative INTEGER
        assert_eq!(
            text("msPKI-Certificate-Name-Flag", RawValue::Integer(-2_147_483_648)),
            "-2147483648 (SUBJECT_REQUIRE_DIRECTORY_PATH)"
        );
        assert_eq!(
            text("msPKI-Certificate-Name-Flag", RawValue::Integer(1)),
            "1 (ENROLLEE_SUPPLIES_SUBJECT)"
        );
    }

    #[test]
    fn test_private_key_flag_reports_unknown_bits() {
        assert_eq!(
            text("msPKI-Private-Key-Flag", RawValue::Integer(0x4000_0000)),
            "1073741824 (UNKNOWN_FLAGS(0x40000000))"
        );
        assert_eq!(
            text("msPKI-Private-Key-Flag", RawValue::Integer(0x0101_0010)),
            "16842768 (EXPORTABLE_KEY, UNKNOWN_FLAGS(0x1010000))"
        );
        assert_eq!(text("msPKI-Private-Key-Flag", RawValue::Integer(0)), "0 (None)");
    }

    #[test]
    fn test_extended_key_usage() {
        let decoded = decode(
            "pKIExtendedKeyUsage",
            &RawValue::List(vec![
                "1.3.6.1.5.5.7.3.2".into(),
                "1.2.3.4.5".into(),
                "1.3.6.1.4.1.311.10.3.4".into(),
            ]),
        );
        assert_eq!(
            decoded,
            DecodedValue::List(vec![
                "1.3.6.1.5.5.7.3.2 (Client Authentication)".into(),
                "1.2.3.4.5".into(),
                "1.3.6.1.4.1.311.10.3.4 (Encrypting File System)".into(),
            ])
        );
    }

    #[test]
    fn test_instance_type() {
        assert_eq!(text("instanceType", RawValue::Integer(4)), "4 (IT_NC_REPLICA)");
        assert_eq!(
            text("instanceType", RawValue::Integer(5)),
            "5 (IT_WRITE, IT_NC_REPLICA)"
        );
        assert_eq!(text("instanceType", RawValue::Integer(32)), "32 (None)");
    }

    #[test]
    fn test_default_key_spec() {
        assert_eq!(
            text("pKIDefaultKeySpec", RawValue::Integer(1)),
            "1 (AT_KEYEXCHANGE (RSA key exchange))"
        );
        assert_eq!(text("pKIDefaultKeySpec", RawValue::Integer(7)), "7 (Unknown)");
    }

    #[test]
    fn test_max_issuing_depth() {
        assert!(text("pKIMaxIssuingDepth", RawValue::Integer(0)).contains("End Entity Certificate"));
        assert!(text("pKIMaxIssuingDepth", RawValue::Integer(-1)).contains("Unlimited - Root CA"));
        assert_eq!(
            text("pKIMaxIssuingDepth", RawValue::Integer(5)),
            "5 (Intermediate CA - 5 levels deep)"
        );
    }

    #[test]
    fn test_key_usage() {
        assert_eq!(
            text("pKIKeyUsage", RawValue::Bytes(vec![0xa0, 0x00])),
            "a0 (Digital Signature, Key Encipherment)"
        );
        assert_eq!(text("pKIKeyUsage", RawValue::Bytes(vec![0x00])), "00 (None)");
        assert_eq!(text("pKIKeyUsage", RawValue::Bytes(vec![])), "Binary: ");
    }

    #[test]
    fn test_periods() {
        let one_year = ((31_536_000u64 + 86_400) * 10_000_000).to_le_bytes();
        assert_eq!(
            text("pKIExpirationPeriod", RawValue::Bytes(one_year.to_vec())),
            "1.0 years"
        );
        let negated = (-(31_536_000i64 + 86_400) * 10_000_000).to_le_bytes();
        assert_eq!(
            text("pKIExpirationPeriod", RawValue::Bytes(negated.to_vec())),
            "58493.2 years"
        );
        assert_eq!(
            text("pKIOverlapPeriod", RawValue::Bytes(vec![0; 8])),
            "Never"
        );
        assert_eq!(
            text("pKIOverlapPeriod", RawValue::Bytes(vec![0xde, 0xad, 0x01])),
            "dead01"
        );
    }

    #[test]
    fn test_labelled_values() {
        assert_eq!(text("msPKI-Minimal-Key-Size", RawValue::Integer(2048)), "2048 bits");
        assert_eq!(
            text("msPKI-Template-Schema-Version", RawValue::Integer(2)),
            "Schema Version: 2"
        );
        assert_eq!(
            text("msPKI-Template-Minor-Revision", RawValue::Text("3".into())),
            "Minor Revision: 3"
        );
        assert_eq!(text("revision", RawValue::Integer(100)), "Template Revision: 100");
        assert_eq!(text("uSNChanged", RawValue::Integer(12345)), "USN: 12345");
        assert_eq!(text("uSNCreated", RawValue::Integer(99)), "USN: 99");
    }

    #[test]
    fn test_type_mismatch_falls_back_to_plain_form() {
        assert_eq!(text("flags", RawValue::Text("abc".into())), "abc");
        assert_eq!(text("revision", RawValue::Text("100".into())), "100");
        assert_eq!(text("pKIKeyUsage", RawValue::Text("x".into())), "x");
        assert_eq!(text("pKIExpirationPeriod", RawValue::Integer(7)), "7");
        assert_eq!(
            decode("pKIExtendedKeyUsage", &RawValue::Text("1.3.6.1.5.5.7.3.2".into())),
            DecodedValue::Text("1.3.6.1.5.5.7.3.2".into())
        );
    }

    #[test]
    fn test_unknown_attributes_pass_through() {
        assert_eq!(
            decode("cn", &RawValue::Text("User".into())),
            DecodedValue::Text("User".into())
        );
        let list = RawValue::List(vec!["top".into(), "pKICertificateTemplate".into()]);
        assert_eq!(
            decode("objectClass", &list),
            DecodedValue::List(vec!["top".into(), "pKICertificateTemplate".into()])
        );
        assert_eq!(decode("whatever", &RawValue::Integer(-5)), DecodedValue::Text("-5".into()));
        assert_eq!(
            decode("objectGUID", &RawValue::Bytes(vec![0xab, 0xcd])),
            DecodedValue::Text("abcd".into())
        );
    }

    #[test]
    fn test_attribute_names_are_case_sensitive() {
        assert_eq!(text("Flags", RawValue::Integer(0x40)), "64");
    }

    #[test]
    fn test_flag_bits() {
        assert_eq!(flag_bits(-1), 0xffff_ffff);
        assert_eq!(flag_bits(0x20), 0x20);
        assert_eq!(flag_bits(1 << 40), 1 << 40);
    }
}
