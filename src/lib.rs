//! certscope
//!
//! Enumerates Active Directory Certificate Services certificate templates,
//! decodes their attributes into readable form and flags the enrollment
//! settings that matter for misconfiguration triage.

pub mod ad_client;
pub mod attribute_decoder;
pub mod common_types;
pub mod config;
pub mod errors;
pub mod filetime;
pub mod flag_tables;
pub mod ldap_helpers;
pub mod ldap_timeout;
pub mod report;
pub mod secure_types;
pub mod security_analysis;
pub mod template_enumerator;

pub use ad_client::TemplateSession;
pub use attribute_decoder::decode;
pub use common_types::{
    AttributeMap, AttributeValue, DecodedValue, RawAttributeSet, RawValue, TemplateRecord,
};
pub use errors::{Result, TemplateError};
pub use filetime::decode_interval;
pub use security_analysis::{analyze_template_properties, SecurityProperties, ANALYSIS_ERROR};
pub use template_enumerator::{enumerate, enumerate_templates, enumerate_with, TemplateSearch};
