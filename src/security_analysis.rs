//! Template security property derivation
//!
//! Maps the four raw flag words of a certificate template onto a fixed
//! catalogue of named booleans used for risk triage. Each property reads
//! exactly one bit of exactly one flag attribute, always from the raw
//! integer and never from its decoded rendering.
//!
//! | Property | Attribute | Bit |
//! |----------|-----------|-----|
//! | Requires_Manager_Approval | msPKI-Enrollment-Flag | 0x2 |
//! | Auto_Enrollment | msPKI-Enrollment-Flag | 0x20 |
//! | User_Interaction_Required | msPKI-Enrollment-Flag | 0x100 |
//! | Publish_To_DS | msPKI-Enrollment-Flag | 0x8 |
//! | Domain_Auth_Not_Required | msPKI-Enrollment-Flag | 0x80 |
//! | Allow_Enroll_On_Behalf_Of | msPKI-Enrollment-Flag | 0x800 |
//! | Include_Symmetric_Algorithms | msPKI-Enrollment-Flag | 0x1 |
//! | Enrollee_Supplies_Subject | msPKI-Certificate-Name-Flag | 0x1 |
//! | Enrollee_Supplies_Subject_Alt_Name | msPKI-Certificate-Name-Flag | 0x10000 |
//! | Add_Email | msPKI-Certificate-Name-Flag | 0x2 |
//! | Exportable_Key | msPKI-Private-Key-Flag | 0x10 |
//! | Require_Private_Key_Archival | msPKI-Private-Key-Flag | 0x1 |
//! | Strong_Key_Protection_Required | msPKI-Private-Key-Flag | 0x20 |
//! | Machine_Type | flags | 0x40 |
//! | Is_CA | flags | 0x80 |
//! | Add_Template_Name | flags | 0x200 |

use serde::Serialize;

use crate::common_types::{RawAttributeSet, RawValue};
use crate::flag_tables::{
    certificate_name_flags, enrollment_flags, private_key_flags, template_flags,
};
use crate::ldap_helpers::attrs;

/// Attribute key used when the catalogue could not be derived
pub const ANALYSIS_ERROR: &str = "Analysis_Error";

/// Raw flag words of one template, reinterpreted as unsigned 32-bit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TemplateFlagWords {
    pub enrollment: u32,
    pub certificate_name: u32,
    pub private_key: u32,
    pub template: u32,
}

impl TemplateFlagWords {
    /// Reads the four flag attributes from a raw attribute set.
    ///
    /// A missing or non-integer attribute counts as 0.
    pub fn from_attributes(raw: &RawAttributeSet) -> Self {
        Self {
            enrollment: flag_word(raw, attrs::PKI_ENROLLMENT_FLAG),
            certificate_name: flag_word(raw, attrs::PKI_CERTIFICATE_NAME_FLAG),
            private_key: flag_word(raw, attrs::PKI_PRIVATE_KEY_FLAG),
            template: flag_word(raw, attrs::FLAGS),
        }
    }
}

/// Low 32 bits of the stored integer. Signed INTEGER syntax returns bit 31
/// as a negative number, and the truncation keeps that bit in place.
fn flag_word(raw: &RawAttributeSet, attribute: &str) -> u32 {
    match raw.get(attribute) {
        Some(RawValue::Integer(value)) => *value as u32,
        _ => 0,
    }
}

/// Derived security properties of one certificate template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityProperties {
    pub requires_manager_approval: bool,
    pub auto_enrollment: bool,
    pub user_interaction_required: bool,
    pub publish_to_ds: bool,
    pub domain_auth_not_required: bool,
    pub allow_enroll_on_behalf_of: bool,
    pub include_symmetric_algorithms: bool,
    pub enrollee_supplies_subject: bool,
    pub enrollee_supplies_subject_alt_name: bool,
    pub add_email: bool,
    pub exportable_key: bool,
    pub require_private_key_archival: bool,
    pub strong_key_protection_required: bool,
    pub machine_type: bool,
    pub is_ca: bool,
    pub add_template_name: bool,
}

impl SecurityProperties {
    pub fn from_flags(flags: &TemplateFlagWords) -> Self {
        let enrollment = flags.enrollment;
        let name = flags.certificate_name;
        let key = flags.private_key;
        let template = flags.template;

        Self {
            requires_manager_approval: (enrollment & enrollment_flags::PEND_ALL_REQUESTS) != 0,
            auto_enrollment: (enrollment & enrollment_flags::AUTO_ENROLLMENT) != 0,
            user_interaction_required: (enrollment & enrollment_flags::USER_INTERACTION_REQUIRED) != 0,
            publish_to_ds: (enrollment & enrollment_flags::PUBLISH_TO_DS) != 0,
            domain_auth_not_required: (enrollment & enrollment_flags::DOMAIN_AUTHENTICATION_NOT_REQUIRED) != 0,
            allow_enroll_on_behalf_of: (enrollment & enrollment_flags::ALLOW_ENROLL_ON_BEHALF_OF) != 0,
            include_symmetric_algorithms: (enrollment & enrollment_flags::INCLUDE_SYMMETRIC_ALGORITHMS) != 0,
            enrollee_supplies_subject: (name & certificate_name_flags::ENROLLEE_SUPPLIES_SUBJECT) != 0,
            enrollee_supplies_subject_alt_name: (name & certificate_name_flags::ENROLLEE_SUPPLIES_SUBJECT_ALT_NAME) != 0,
            add_email: (name & certificate_name_flags::ADD_EMAIL) != 0,
            exportable_key: (key & private_key_flags::EXPORTABLE_KEY) != 0,
            require_private_key_archival: (key & private_key_flags::REQUIRE_PRIVATE_KEY_ARCHIVAL) != 0,
            strong_key_protection_required: (key & private_key_flags::STRONG_KEY_PROTECTION_REQUIRED) != 0,
            machine_type: (template & template_flags::MACHINE_TYPE) != 0,
            is_ca: (template & template_flags::IS_CA) != 0,
            add_template_name: (template & template_flags::ADD_TEMPLATE_NAME) != 0,
        }
    }

    /// Catalogue entries as (attribute key, value), in catalogue order
    pub fn entries(&self) -> [(&'static str, bool); 16] {
        [
            ("Requires_Manager_Approval", self.requires_manager_approval),
            ("Auto_Enrollment", self.auto_enrollment),
            ("User_Interaction_Required", self.user_interaction_required),
            ("Publish_To_DS", self.publish_to_ds),
            ("Domain_Auth_Not_Required", self.domain_auth_not_required),
            ("Allow_Enroll_On_Behalf_Of", self.allow_enroll_on_behalf_of),
            ("Include_Symmetric_Algorithms", self.include_symmetric_algorithms),
            ("Enrollee_Supplies_Subject", self.enrollee_supplies_subject),
            (
                "Enrollee_Supplies_Subject_Alt_Name",
                self.enrollee_supplies_subject_alt_name,
            ),
            ("Add_Email", self.add_email),
            ("Exportable_Key", self.exportable_key),
            ("Require_Private_Key_Archival", self.require_private_key_archival),
            ("Strong_Key_Protection_Required", self.strong_key_protection_required),
            ("Machine_Type", self.machine_type),
            ("Is_CA", self.is_ca),
            ("Add_Template_Name", self.add_template_name),
        ]
    }
}

/// Extracts the flag words and derives the property catalogue
pub fn analyze_template_properties(raw: &RawAttributeSet) -> SecurityProperties {
    SecurityProperties::from_flags(&TemplateFlagWords::from_attributes(raw))
}
