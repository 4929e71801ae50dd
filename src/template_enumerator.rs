//! Certificate template enumeration
//!
//! Builds one [`TemplateRecord`] per raw template object: identity fields,
//! every attribute decoded for display, and the derived security
//! properties merged on top. A failure confined to one record never stops
//! the rest of the batch; only a failed search is fatal.

use tracing::{debug, info, warn};

use crate::attribute_decoder::decode;
use crate::common_types::{AttributeMap, AttributeValue, RawAttributeSet, TemplateRecord};
use crate::errors::{Result, TemplateError};
use crate::ldap_helpers::attrs;
use crate::security_analysis::{analyze_template_properties, SecurityProperties, ANALYSIS_ERROR};

/// LDAP filter selecting certificate template objects
pub const TEMPLATE_FILTER: &str = "(objectClass=pKICertificateTemplate)";

pub const UNKNOWN_TEMPLATE: &str = "Unknown Template";
pub const MISSING_DN: &str = "N/A";

/// Distinguished name of the forest's certificate template container
pub fn templates_container_dn(base_dn: &str) -> String {
    format!(
        "CN=Certificate Templates,CN=Public Key Services,CN=Services,CN=Configuration,{}",
        base_dn
    )
}

/// Source of raw template objects.
///
/// Implementations run the subtree search for [`TEMPLATE_FILTER`] under
/// `container_dn` and return every attribute of every match.
pub trait TemplateSearch {
    fn search_templates(&mut self, container_dn: &str) -> anyhow::Result<Vec<RawAttributeSet>>;
}

/// Searches the template container and decodes the results.
///
/// A search failure is returned as [`TemplateError::Enumeration`].
pub fn enumerate_templates<S>(search: &mut S, base_dn: &str) -> Result<Vec<TemplateRecord>>
where
    S: TemplateSearch + ?Sized,
{
    let container_dn = templates_container_dn(base_dn);
    info!("Enumerating certificate templates under {}", container_dn);

    let raw_sets = search
        .search_templates(&container_dn)
        .map_err(TemplateError::enumeration)?;

    Ok(enumerate(&raw_sets))
}

/// Decodes a batch of raw template objects, preserving input order.
pub fn enumerate(raw_sets: &[RawAttributeSet]) -> Vec<TemplateRecord> {
    enumerate_with(raw_sets, derive_properties)
}

/// Like [`enumerate`], with the security property derivation supplied by
/// the caller. A derivation error lands in that record's `Analysis_Error`.
pub fn enumerate_with<F>(raw_sets: &[RawAttributeSet], derive: F) -> Vec<TemplateRecord>
where
    F: Fn(&RawAttributeSet) -> Result<SecurityProperties>,
{
    let records: Vec<TemplateRecord> = raw_sets
        .iter()
        .map(|raw| build_record_with(raw, &derive))
        .collect();
    info!("Decoded {} certificate templates", records.len());
    records
}

/// Decodes one raw template object.
pub fn build_record(raw: &RawAttributeSet) -> TemplateRecord {
    build_record_with(raw, derive_properties)
}

fn derive_properties(raw: &RawAttributeSet) -> Result<SecurityProperties> {
    Ok(analyze_template_properties(raw))
}

/// Decodes one raw template object using `derive` for the property catalogue.
pub fn build_record_with<F>(raw: &RawAttributeSet, derive: F) -> TemplateRecord
where
    F: FnOnce(&RawAttributeSet) -> Result<SecurityProperties>,
{
    let name = identity(raw, attrs::CN).unwrap_or_else(|| UNKNOWN_TEMPLATE.to_string());
    let display_name = identity(raw, attrs::DISPLAY_NAME).unwrap_or_else(|| name.clone());
    let distinguished_name =
        identity(raw, attrs::DISTINGUISHED_NAME).unwrap_or_else(|| MISSING_DN.to_string());

    let mut attributes: AttributeMap<AttributeValue> = raw
        .iter()
        .map(|(attribute, value)| (attribute, AttributeValue::from(decode(attribute, value))))
        .collect();

    match derive(raw) {
        Ok(properties) => {
            for (key, value) in properties.entries() {
                attributes.insert(key, AttributeValue::Flag(value));
            }
        }
        Err(e) => {
            warn!("Security analysis failed for template {}: {}", name, e);
            attributes.insert(
                ANALYSIS_ERROR,
                AttributeValue::Text(format!("Analysis failed: {}", e)),
            );
        }
    }

    debug!("Template {} decoded with {} attributes", name, attributes.len());
    TemplateRecord::new(name, display_name, distinguished_name, attributes)
}

fn identity(raw: &RawAttributeSet, attribute: &str) -> Option<String> {
    raw.get(attribute).and_then(|value| value.identity_text())
}
