//! LDAP Helper Utilities
//!
//! Typing of ldap3 search results into [`RawAttributeSet`]s. ldap3 hands
//! back every value as a string (or as bytes when it is not valid UTF-8),
//! so the template schema's integer, binary and multi-valued attributes
//! are recovered here from a fixed attribute list.

use ldap3::SearchEntry;

use crate::common_types::{to_hex, RawAttributeSet, RawValue};

/// Certificate template attribute names
pub mod attrs {
    // Identity attributes
    pub const CN: &str = "cn";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const DISTINGUISHED_NAME: &str = "distinguishedName";
    pub const OBJECT_CLASS: &str = "objectClass";
    pub const OBJECT_GUID: &str = "objectGUID";
    pub const NT_SECURITY_DESCRIPTOR: &str = "nTSecurityDescriptor";

    // Flag words
    pub const FLAGS: &str = "flags";
    pub const PKI_ENROLLMENT_FLAG: &str = "msPKI-Enrollment-Flag";
    pub const PKI_CERTIFICATE_NAME_FLAG: &str = "msPKI-Certificate-Name-Flag";
    pub const PKI_PRIVATE_KEY_FLAG: &str = "msPKI-Private-Key-Flag";

    // Other integer attributes
    pub const INSTANCE_TYPE: &str = "instanceType";
    pub const PKI_DEFAULT_KEY_SPEC: &str = "pKIDefaultKeySpec";
    pub const PKI_MAX_ISSUING_DEPTH: &str = "pKIMaxIssuingDepth";
    pub const PKI_MINIMAL_KEY_SIZE: &str = "msPKI-Minimal-Key-Size";
    pub const PKI_TEMPLATE_SCHEMA_VERSION: &str = "msPKI-Template-Schema-Version";
    pub const PKI_TEMPLATE_MINOR_REVISION: &str = "msPKI-Template-Minor-Revision";
    pub const PKI_RA_SIGNATURE: &str = "msPKI-RA-Signature";
    pub const REVISION: &str = "revision";
    pub const USN_CHANGED: &str = "uSNChanged";
    pub const USN_CREATED: &str = "uSNCreated";

    // Binary attributes
    pub const PKI_KEY_USAGE: &str = "pKIKeyUsage";
    pub const PKI_EXPIRATION_PERIOD: &str = "pKIExpirationPeriod";
    pub const PKI_OVERLAP_PERIOD: &str = "pKIOverlapPeriod";

    // Multi-valued attributes
    pub const PKI_EXTENDED_KEY_USAGE: &str = "pKIExtendedKeyUsage";
    pub const PKI_CRITICAL_EXTENSIONS: &str = "pKICriticalExtensions";
    pub const PKI_DEFAULT_CSPS: &str = "pKIDefaultCSPs";
    pub const PKI_CERTIFICATE_APPLICATION_POLICY: &str = "msPKI-Certificate-Application-Policy";
    pub const PKI_RA_APPLICATION_POLICIES: &str = "msPKI-RA-Application-Policies";
    pub const PKI_CERTIFICATE_POLICY: &str = "msPKI-Certificate-Policy";
    pub const PKI_RA_POLICIES: &str = "msPKI-RA-Policies";
}

/// Attributes with INTEGER syntax
const INTEGER_ATTRS: &[&str] = &[
    attrs::FLAGS,
    attrs::PKI_ENROLLMENT_FLAG,
    attrs::PKI_CERTIFICATE_NAME_FLAG,
    attrs::PKI_PRIVATE_KEY_FLAG,
    attrs::INSTANCE_TYPE,
    attrs::PKI_DEFAULT_KEY_SPEC,
    attrs::PKI_MAX_ISSUING_DEPTH,
    attrs::PKI_MINIMAL_KEY_SIZE,
    attrs::PKI_TEMPLATE_SCHEMA_VERSION,
    attrs::PKI_TEMPLATE_MINOR_REVISION,
    attrs::PKI_RA_SIGNATURE,
    attrs::REVISION,
    attrs::USN_CHANGED,
    attrs::USN_CREATED,
];

/// Attributes with octet-string syntax
const BINARY_ATTRS: &[&str] = &[
    attrs::PKI_KEY_USAGE,
    attrs::PKI_EXPIRATION_PERIOD,
    attrs::PKI_OVERLAP_PERIOD,
    attrs::OBJECT_GUID,
    attrs::NT_SECURITY_DESCRIPTOR,
];

/// Attributes that are always presented as lists, even with one value
const MULTI_VALUED_ATTRS: &[&str] = &[
    attrs::PKI_EXTENDED_KEY_USAGE,
    attrs::PKI_CRITICAL_EXTENSIONS,
    attrs::PKI_DEFAULT_CSPS,
    attrs::PKI_CERTIFICATE_APPLICATION_POLICY,
    attrs::PKI_RA_APPLICATION_POLICIES,
    attrs::PKI_CERTIFICATE_POLICY,
    attrs::PKI_RA_POLICIES,
    attrs::OBJECT_CLASS,
];

/// Extension trait turning an ldap3 entry into a typed attribute set
pub trait TemplateEntryExt {
    /// All attributes of the entry, typed and sorted by name
    fn to_raw_attribute_set(&self) -> RawAttributeSet;
}

impl TemplateEntryExt for SearchEntry {
    fn to_raw_attribute_set(&self) -> RawAttributeSet {
        let mut names: Vec<&str> = self
            .attrs
            .keys()
            .chain(self.bin_attrs.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();

        names
            .into_iter()
            .filter_map(|name| typed_value(self, name).map(|value| (name, value)))
            .collect()
    }
}

fn typed_value(entry: &SearchEntry, name: &str) -> Option<RawValue> {
    let text = entry.attrs.get(name).filter(|values| !values.is_empty());
    let binary = entry.bin_attrs.get(name).filter(|values| !values.is_empty());

    if BINARY_ATTRS.contains(&name) {
        // short octet strings that happen to be valid UTF-8 land in `attrs`
        let bytes = match (binary, text) {
            (Some(values), _) => values[0].clone(),
            (None, Some(values)) => values[0].as_bytes().to_vec(),
            (None, None) => return None,
        };
        return Some(RawValue::Bytes(bytes));
    }

    match (text, binary) {
        (Some(values), _) => Some(text_value(name, values)),
        (None, Some(values)) if values.len() == 1 => Some(RawValue::Bytes(values[0].clone())),
        (None, Some(values)) => Some(RawValue::List(
            values.iter().map(|v| to_hex(v)).collect(),
        )),
        (None, None) => None,
    }
}

fn text_value(name: &str, values: &[String]) -> RawValue {
    if MULTI_VALUED_ATTRS.contains(&name) || values.len() > 1 {
        return RawValue::List(values.to_vec());
    }
    let value = &values[0];
    if INTEGER_ATTRS.contains(&name) {
        if let Ok(parsed) = value.trim().parse::<i64>() {
            return RawValue::Integer(parsed);
        }
    }
    RawValue::Text(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn create_test_entry(
        attrs: Vec<(&str, Vec<&str>)>,
        bin_attrs: Vec<(&str, Vec<Vec<u8>>)>,
    ) -> SearchEntry {
        let mut attr_map = HashMap::new();
        for (key, values) in attrs {
            attr_map.insert(key.to_string(), values.into_iter().map(|s| s.to_string()).collect());
        }
        let mut bin_map = HashMap::new();
        for (key, values) in bin_attrs {
            bin_map.insert(key.to_string(), values);
        }
        SearchEntry {
            dn: "CN=User,CN=Certificate Templates,CN=Public Key Services,CN=Services,CN=Configuration,DC=example,DC=com".to_string(),
            attrs: attr_map,
            bin_attrs: bin_map,
        }
    }

    #[test]
    fn test_integer_attributes_are_parsed() {
        let entry = create_test_entry(
            vec![
                ("msPKI-Enrollment-Flag", vec!["41"]),
                ("msPKI-Certificate-Name-Flag", vec!["-2113929216"]),
                ("revision", vec!["not-a-number"]),
            ],
            vec![],
        );
        let raw = entry.to_raw_attribute_set();
        assert_eq!(raw.get("msPKI-Enrollment-Flag"), Some(&RawValue::Integer(41)));
        assert_eq!(
            raw.get("msPKI-Certificate-Name-Flag"),
            Some(&RawValue::Integer(-2_113_929_216))
        );
        assert_eq!(raw.get("revision"), Some(&RawValue::Text("not-a-number".into())));
    }

    #[test]
    fn test_binary_attributes_from_either_map() {
        let entry = create_test_entry(
            vec![("pKIKeyUsage", vec![" \u{0}"])],
            vec![("pKIExpirationPeriod", vec![vec![0x00, 0x40, 0x39, 0x87, 0x0e, 0xc8, 0xff, 0xff]])],
        );
        let raw = entry.to_raw_attribute_set();
        assert_eq!(raw.get("pKIKeyUsage"), Some(&RawValue::Bytes(vec![0x20, 0x00])));
        assert_eq!(
            raw.get("pKIExpirationPeriod"),
            Some(&RawValue::Bytes(vec![0x00, 0x40, 0x39, 0x87, 0x0e, 0xc8, 0xff, 0xff]))
        );
    }

    #[test]
    fn test_multi_valued_attributes_are_lists() {
        let entry = create_test_entry(
            vec![
                ("pKIExtendedKeyUsage", vec!["1.3.6.1.5.5.7.3.2"]),
                ("pKIDefaultCSPs", vec!["1,Microsoft Enhanced Cryptographic Provider v1.0", "2,Microsoft Base Cryptographic Provider v1.0"]),
                ("cn", vec!["User"]),
            ],
            vec![],
        );
        let raw = entry.to_raw_attribute_set();
        assert_eq!(
            raw.get("pKIExtendedKeyUsage"),
            Some(&RawValue::List(vec!["1.3.6.1.5.5.7.3.2".into()]))
        );
        assert!(matches!(raw.get("pKIDefaultCSPs"), Some(RawValue::List(values)) if values.len() == 2));
        assert_eq!(raw.get("cn"), Some(&RawValue::Text("User".into())));
    }

    #[test]
    fn test_attributes_are_sorted_by_name() {
        let entry = create_test_entry(
            vec![("revision", vec!["100"]), ("cn", vec!["User"]), ("flags", vec!["66106"])],
            vec![("objectGUID", vec![vec![1, 2, 3]])],
        );
        let raw = entry.to_raw_attribute_set();
        let keys: Vec<&str> = raw.keys().collect();
        assert_eq!(keys, vec!["cn", "flags", "objectGUID", "revision"]);
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let entry = create_test_entry(vec![("description", vec![])], vec![]);
        assert!(entry.to_raw_attribute_set().is_empty());
    }
}
