//! Certificate template constant tables
//!
//! Bit and value names for the AD CS template schema (MS-CRTD). Each
//! bitfield table lists its named bits in display order; decoding walks
//! the table front to back.

/// Ordered (mask, name) pairs for one 32-bit flag attribute
pub type FlagTable = &'static [(u32, &'static str)];

/// `flags` attribute bits
pub mod template_flags {
    pub const ADD_EMAIL: u32 = 0x0000_0002;
    pub const PUBLISH_TO_DS: u32 = 0x0000_0008;
    pub const EXPORTABLE_KEY: u32 = 0x0000_0010;
    pub const AUTO_ENROLLMENT: u32 = 0x0000_0020;
    pub const MACHINE_TYPE: u32 = 0x0000_0040;
    pub const IS_CA: u32 = 0x0000_0080;
    pub const ADD_TEMPLATE_NAME: u32 = 0x0000_0200;
    pub const IS_CROSS_CA: u32 = 0x0000_0800;
    pub const DO_NOT_PERSIST_IN_DB: u32 = 0x0000_1000;
    pub const IS_DEFAULT: u32 = 0x0001_0000;
    pub const IS_MODIFIED: u32 = 0x0002_0000;
}

/// `msPKI-Enrollment-Flag` bits
pub mod enrollment_flags {
    pub const INCLUDE_SYMMETRIC_ALGORITHMS: u32 = 0x0000_0001;
    pub const PEND_ALL_REQUESTS: u32 = 0x0000_0002;
    pub const PUBLISH_TO_KRA_CONTAINER: u32 = 0x0000_0004;
    pub const PUBLISH_TO_DS: u32 = 0x0000_0008;
    pub const AUTO_ENROLLMENT_CHECK_USER_DS_CERTIFICATE: u32 = 0x0000_0010;
    pub const AUTO_ENROLLMENT: u32 = 0x0000_0020;
    pub const PREVIOUS_APPROVAL_VALIDATE_REENROLLMENT: u32 = 0x0000_0040;
    pub const DOMAIN_AUTHENTICATION_NOT_REQUIRED: u32 = 0x0000_0080;
    pub const USER_INTERACTION_REQUIRED: u32 = 0x0000_0100;
    pub const ADD_TEMPLATE_NAME: u32 = 0x0000_0200;
    pub const REMOVE_INVALID_CERTIFICATE_FROM_PERSONAL_STORE: u32 = 0x0000_0400;
    pub const ALLOW_ENROLL_ON_BEHALF_OF: u32 = 0x0000_0800;
    pub const ADD_OCSP_NOCHECK: u32 = 0x0000_1000;
    pub const ENABLE_KEY_REUSE_ON_NT_TOKEN_KEYSET_STORAGE_FULL: u32 = 0x0000_2000;
    pub const NOREVOCATIONINFOINISSUEDCERTS: u32 = 0x0000_4000;
    pub const INCLUDE_BASIC_CONSTRAINTS_FOR_EE_CERTS: u32 = 0x0000_8000;
    pub const ALLOW_PREVIOUS_APPROVAL_KEYBASEDRENEWAL_VALIDATE_REENROLLMENT: u32 = 0x0001_0000;
    pub const ISSUANCE_POLICIES_FROM_REQUEST: u32 = 0x0002_0000;
    pub const SKIP_AUTO_RENEWAL: u32 = 0x0004_0000;
    pub const NO_SECURITY_EXTENSION: u32 = 0x0008_0000;
}

/// `msPKI-Certificate-Name-Flag` bits
pub mod certificate_name_flags {
    pub const ENROLLEE_SUPPLIES_SUBJECT: u32 = 0x0000_0001;
    pub const ADD_EMAIL: u32 = 0x0000_0002;
    pub const ADD_OBJ_GUID: u32 = 0x0000_0004;
    pub const OLD_CERT_SUPPLIES_SUBJECT_AND_ALT_NAME: u32 = 0x0000_0008;
    pub const ADD_DIRECTORY_PATH: u32 = 0x0000_0100;
    pub const ENROLLEE_SUPPLIES_SUBJECT_ALT_NAME: u32 = 0x0001_0000;
    pub const SUBJECT_ALT_REQUIRE_DOMAIN_DNS: u32 = 0x0040_0000;
    pub const SUBJECT_ALT_REQUIRE_SPN: u32 = 0x0080_0000;
    pub const SUBJECT_ALT_REQUIRE_DIRECTORY_GUID: u32 = 0x0100_0000;
    pub const SUBJECT_ALT_REQUIRE_UPN: u32 = 0x0200_0000;
    pub const SUBJECT_ALT_REQUIRE_EMAIL: u32 = 0x0400_0000;
    pub const SUBJECT_ALT_REQUIRE_DNS: u32 = 0x0800_0000;
    pub const SUBJECT_REQUIRE_DNS_AS_CN: u32 = 0x1000_0000;
    pub const SUBJECT_REQUIRE_EMAIL: u32 = 0x2000_0000;
    pub const SUBJECT_REQUIRE_COMMON_NAME: u32 = 0x4000_0000;
    pub const SUBJECT_REQUIRE_DIRECTORY_PATH: u32 = 0x8000_0000;
}

/// `msPKI-Private-Key-Flag` bits
pub mod private_key_flags {
    pub const REQUIRE_PRIVATE_KEY_ARCHIVAL: u32 = 0x0000_0001;
    pub const EXPORTABLE_KEY: u32 = 0x0000_0010;
    pub const STRONG_KEY_PROTECTION_REQUIRED: u32 = 0x0000_0020;
    pub const REQUIRE_ALTERNATE_SIGNATURE_ALGORITHM: u32 = 0x0000_0040;
    pub const REQUIRE_SAME_KEY_RENEWAL: u32 = 0x0000_0080;
    pub const USE_LEGACY_PROVIDER: u32 = 0x0000_0100;
    pub const EK_TRUST_ON_USE: u32 = 0x0000_0200;
    pub const EK_VALIDATE_CERT: u32 = 0x0000_0400;
    pub const EK_VALIDATE_KEY: u32 = 0x0000_0800;
    pub const ATTEST_PREFERRED: u32 = 0x0000_1000;
    pub const ATTEST_REQUIRED: u32 = 0x0000_2000;
    pub const ATTESTATION_WITHOUT_POLICY: u32 = 0x0000_4000;
    pub const HELLO_LOGON_KEY: u32 = 0x0020_0000;
}

pub const TEMPLATE_FLAGS: FlagTable = {
    use template_flags::*;
    &[
        (ADD_EMAIL, "ADD_EMAIL"),
        (PUBLISH_TO_DS, "PUBLISH_TO_DS"),
        (EXPORTABLE_KEY, "EXPORTABLE_KEY"),
        (AUTO_ENROLLMENT, "AUTO_ENROLLMENT"),
        (MACHINE_TYPE, "MACHINE_TYPE"),
        (IS_CA, "IS_CA"),
        (ADD_TEMPLATE_NAME, "ADD_TEMPLATE_NAME"),
        (IS_CROSS_CA, "IS_CROSS_CA"),
        (DO_NOT_PERSIST_IN_DB, "DO_NOT_PERSIST_IN_DB"),
        (IS_DEFAULT, "IS_DEFAULT"),
        (IS_MODIFIED, "IS_MODIFIED"),
    ]
};

pub const ENROLLMENT_FLAGS: FlagTable = {
    use enrollment_flags::*;
    &[
        (INCLUDE_SYMMETRIC_ALGORITHMS, "INCLUDE_SYMMETRIC_ALGORITHMS"),
        (PEND_ALL_REQUESTS, "PEND_ALL_REQUESTS"),
        (PUBLISH_TO_KRA_CONTAINER, "PUBLISH_TO_KRA_CONTAINER"),
        (PUBLISH_TO_DS, "PUBLISH_TO_DS"),
        (AUTO_ENROLLMENT_CHECK_USER_DS_CERTIFICATE, "AUTO_ENROLLMENT_CHECK_USER_DS_CERTIFICATE"),
        (AUTO_ENROLLMENT, "AUTO_ENROLLMENT"),
        (PREVIOUS_APPROVAL_VALIDATE_REENROLLMENT, "PREVIOUS_APPROVAL_VALIDATE_REENROLLMENT"),
        (DOMAIN_AUTHENTICATION_NOT_REQUIRED, "DOMAIN_AUTHENTICATION_NOT_REQUIRED"),
        (USER_INTERACTION_REQUIRED, "USER_INTERACTION_REQUIRED"),
        (ADD_TEMPLATE_NAME, "ADD_TEMPLATE_NAME"),
        (REMOVE_INVALID_CERTIFICATE_FROM_PERSONAL_STORE, "REMOVE_INVALID_CERTIFICATE_FROM_PERSONAL_STORE"),
        (ALLOW_ENROLL_ON_BEHALF_OF, "ALLOW_ENROLL_ON_BEHALF_OF"),
        (ADD_OCSP_NOCHECK, "ADD_OCSP_NOCHECK"),
        (ENABLE_KEY_REUSE_ON_NT_TOKEN_KEYSET_STORAGE_FULL, "ENABLE_KEY_REUSE_ON_NT_TOKEN_KEYSET_STORAGE_FULL"),
        (NOREVOCATIONINFOINISSUEDCERTS, "NOREVOCATIONINFOINISSUEDCERTS"),
        (INCLUDE_BASIC_CONSTRAINTS_FOR_EE_CERTS, "INCLUDE_BASIC_CONSTRAINTS_FOR_EE_CERTS"),
        (
            ALLOW_PREVIOUS_APPROVAL_KEYBASEDRENEWAL_VALIDATE_REENROLLMENT,
            "ALLOW_PREVIOUS_APPROVAL_KEYBASEDRENEWAL_VALIDATE_REENROLLMENT",
        ),
        (ISSUANCE_POLICIES_FROM_REQUEST, "ISSUANCE_POLICIES_FROM_REQUEST"),
        (SKIP_AUTO_RENEWAL, "SKIP_AUTO_RENEWAL"),
        (NO_SECURITY_EXTENSION, "NO_SECURITY_EXTENSION"),
    ]
};

pub const CERTIFICATE_NAME_FLAGS: FlagTable = {
    use certificate_name_flags::*;
    &[
        (ENROLLEE_SUPPLIES_SUBJECT, "ENROLLEE_SUPPLIES_SUBJECT"),
        (ADD_EMAIL, "ADD_EMAIL"),
        (ADD_OBJ_GUID, "ADD_OBJ_GUID"),
        (OLD_CERT_SUPPLIES_SUBJECT_AND_ALT_NAME, "OLD_CERT_SUPPLIES_SUBJECT_AND_ALT_NAME"),
        (ADD_DIRECTORY_PATH, "ADD_DIRECTORY_PATH"),
        (ENROLLEE_SUPPLIES_SUBJECT_ALT_NAME, "ENROLLEE_SUPPLIES_SUBJECT_ALT_NAME"),
        (SUBJECT_ALT_REQUIRE_DOMAIN_DNS, "SUBJECT_ALT_REQUIRE_DOMAIN_DNS"),
        (SUBJECT_ALT_REQUIRE_SPN, "SUBJECT_ALT_REQUIRE_SPN"),
        (SUBJECT_ALT_REQUIRE_DIRECTORY_GUID, "SUBJECT_ALT_REQUIRE_DIRECTORY_GUID"),
        (SUBJECT_ALT_REQUIRE_UPN, "SUBJECT_ALT_REQUIRE_UPN"),
        (SUBJECT_ALT_REQUIRE_EMAIL, "SUBJECT_ALT_REQUIRE_EMAIL"),
        (SUBJECT_ALT_REQUIRE_DNS, "SUBJECT_ALT_REQUIRE_DNS"),
        (SUBJECT_REQUIRE_DNS_AS_CN, "SUBJECT_REQUIRE_DNS_AS_CN"),
        (SUBJECT_REQUIRE_EMAIL, "SUBJECT_REQUIRE_EMAIL"),
        (SUBJECT_REQUIRE_COMMON_NAME, "SUBJECT_REQUIRE_COMMON_NAME"),
        (SUBJECT_REQUIRE_DIRECTORY_PATH, "SUBJECT_REQUIRE_DIRECTORY_PATH"),
    ]
};

pub const PRIVATE_KEY_FLAGS: FlagTable = {
    use private_key_flags::*;
    &[
        (REQUIRE_PRIVATE_KEY_ARCHIVAL, "REQUIRE_PRIVATE_KEY_ARCHIVAL"),
        (EXPORTABLE_KEY, "EXPORTABLE_KEY"),
        (STRONG_KEY_PROTECTION_REQUIRED, "STRONG_KEY_PROTECTION_REQUIRED"),
        (REQUIRE_ALTERNATE_SIGNATURE_ALGORITHM, "REQUIRE_ALTERNATE_SIGNATURE_ALGORITHM"),
        (REQUIRE_SAME_KEY_RENEWAL, "REQUIRE_SAME_KEY_RENEWAL"),
        (USE_LEGACY_PROVIDER, "USE_LEGACY_PROVIDER"),
        (EK_TRUST_ON_USE, "EK_TRUST_ON_USE"),
        (EK_VALIDATE_CERT, "EK_VALIDATE_CERT"),
        (EK_VALIDATE_KEY, "EK_VALIDATE_KEY"),
        (ATTEST_PREFERRED, "ATTEST_PREFERRED"),
        (ATTEST_REQUIRED, "ATTEST_REQUIRED"),
        (ATTESTATION_WITHOUT_POLICY, "ATTESTATION_WITHOUT_POLICY"),
        (HELLO_LOGON_KEY, "HELLO_LOGON_KEY"),
    ]
};

/// `instanceType` bits
pub const INSTANCE_TYPES: FlagTable = &[
    (1, "IT_WRITE"),
    (2, "IT_NC_HEAD"),
    (4, "IT_NC_REPLICA"),
    (8, "IT_NC_COMING"),
    (16, "IT_NC_GOING"),
];

/// First byte of `pKIKeyUsage`, most significant bit first
pub const KEY_USAGES: &[(u8, &str)] = &[
    (0x80, "Digital Signature"),
    (0x40, "Non Repudiation"),
    (0x20, "Key Encipherment"),
    (0x10, "Data Encipherment"),
    (0x08, "Key Agreement"),
    (0x04, "Key Cert Sign"),
    (0x02, "CRL Sign"),
    (0x01, "Encipher Only"),
];

/// `pKIDefaultKeySpec` label
pub fn key_spec_label(value: i64) -> &'static str {
    match value {
        1 => "AT_KEYEXCHANGE (RSA key exchange)",
        2 => "AT_SIGNATURE (RSA signature)",
        3 => "AT_KEYEXCHANGE | AT_SIGNATURE",
        _ => "Unknown",
    }
}

/// Extended key usage / application policy OIDs
pub const EKU_NAMES: &[(&str, &str)] = &[
    ("1.3.6.1.5.5.7.3.1", "Server Authentication"),
    ("1.3.6.1.5.5.7.3.2", "Client Authentication"),
    ("1.3.6.1.5.5.7.3.3", "Code Signing"),
    ("1.3.6.1.5.5.7.3.4", "Secure Email"),
    ("1.3.6.1.5.5.7.3.5", "IP security end system"),
    ("1.3.6.1.5.5.7.3.6", "IP security tunnel termination"),
    ("1.3.6.1.5.5.7.3.7", "IP security use"),
    ("1.3.6.1.5.5.7.3.8", "Time Stamping"),
    ("1.3.6.1.5.5.7.3.9", "OCSP Signing"),
    ("1.3.6.1.5.5.8.2.2", "IP security IKE intermediate"),
    ("1.3.6.1.5.2.3.4", "PKINIT Client Authentication"),
    ("1.3.6.1.5.2.3.5", "KDC Authentication"),
    ("2.5.29.37.0", "Any Purpose"),
    ("2.23.133.8.1", "Endorsement Key Certificate"),
    ("2.23.133.8.2", "Platform Certificate"),
    ("2.23.133.8.3", "Attestation Identity Key Certificate"),
    ("1.3.6.1.4.1.311.2.6.1", "SpcRelaxedPEMarkerCheck"),
    ("1.3.6.1.4.1.311.2.6.2", "SpcEncryptedDigestRetryCount"),
    ("1.3.6.1.4.1.311.10.3.1", "Microsoft Trust List Signing"),
    ("1.3.6.1.4.1.311.10.3.2", "Microsoft Time Stamping"),
    ("1.3.6.1.4.1.311.10.3.4", "Encrypting File System"),
    ("1.3.6.1.4.1.311.10.3.4.1", "File Recovery"),
    ("1.3.6.1.4.1.311.10.3.5", "Windows Hardware Driver Verification"),
    ("1.3.6.1.4.1.311.10.3.5.1", "Windows Hardware Driver Attested Verification"),
    ("1.3.6.1.4.1.311.10.3.6", "Windows System Component Verification"),
    ("1.3.6.1.4.1.311.10.3.7", "OEM Windows System Component Verification"),
    ("1.3.6.1.4.1.311.10.3.8", "Embedded Windows System Component Verification"),
    ("1.3.6.1.4.1.311.10.3.9", "Root List Signer"),
    ("1.3.6.1.4.1.311.10.3.10", "Qualified Subordination"),
    ("1.3.6.1.4.1.311.10.3.11", "Key Recovery"),
    ("1.3.6.1.4.1.311.10.3.12", "Document Signing"),
    ("1.3.6.1.4.1.311.10.3.13", "Lifetime Signing"),
    ("1.3.6.1.4.1.311.10.3.19", "Revoked List Signer"),
    ("1.3.6.1.4.1.311.10.3.20", "Windows Kits Component"),
    ("1.3.6.1.4.1.311.10.3.21", "Windows RT Verification"),
    ("1.3.6.1.4.1.311.10.3.22", "Protected Process Light Verification"),
    ("1.3.6.1.4.1.311.10.3.23", "Windows TCB Component"),
    ("1.3.6.1.4.1.311.10.3.24", "Protected Process Verification"),
    ("1.3.6.1.4.1.311.10.3.25", "Windows Third Party Application Component"),
    ("1.3.6.1.4.1.311.10.3.26", "Windows Software Extension Verification"),
    ("1.3.6.1.4.1.311.10.3.27", "Preview Build Signing"),
    ("1.3.6.1.4.1.311.10.3.30", "Disallowed List"),
    ("1.3.6.1.4.1.311.10.3.39", "Windows Hardware Driver Extended Verification"),
    ("1.3.6.1.4.1.311.10.5.1", "Digital Rights"),
    ("1.3.6.1.4.1.311.10.6.1", "Key Pack Licenses"),
    ("1.3.6.1.4.1.311.10.6.2", "License Server Verification"),
    ("1.3.6.1.4.1.311.20.1", "CTL Usage"),
    ("1.3.6.1.4.1.311.20.2.1", "Certificate Request Agent"),
    ("1.3.6.1.4.1.311.20.2.2", "Smart Card Logon"),
    ("1.3.6.1.4.1.311.21.5", "Private Key Archival"),
    ("1.3.6.1.4.1.311.21.6", "Key Recovery Agent"),
    ("1.3.6.1.4.1.311.21.19", "Directory Service Email Replication"),
    ("1.3.6.1.4.1.311.61.1.1", "Kernel Mode Code Signing"),
    ("1.3.6.1.4.1.311.61.4.1", "Early Launch Antimalware Driver"),
    ("1.3.6.1.4.1.311.61.5.1", "HAL Extension"),
    ("1.3.6.1.4.1.311.64.1.1", "Server Trust"),
    ("1.3.6.1.4.1.311.76.3.1", "Windows Store"),
    ("1.3.6.1.4.1.311.76.5.1", "Dynamic Code Generator"),
    ("1.3.6.1.4.1.311.76.6.1", "Windows Update"),
    ("1.3.6.1.4.1.311.76.8.1", "Microsoft Publisher"),
    ("1.3.6.1.4.1.311.80.1", "Document Encryption"),
];

/// Friendly name for an EKU OID
pub fn eku_name(oid: &str) -> Option<&'static str> {
    EKU_NAMES
        .iter()
        .find(|(known, _)| *known == oid)
        .map(|(_, name)| *name)
}
