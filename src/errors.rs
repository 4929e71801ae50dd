//! Error handling module
//!
//! Structured error types for connecting to the directory, searching the
//! certificate template container and analyzing template flags.
//!
//! Per-attribute decode failures never reach this type: the decoder always
//! falls back to a plain rendering instead.

use thiserror::Error;

/// Main error type for template enumeration
#[derive(Error, Debug)]
pub enum TemplateError {
    /// LDAP connection error
    #[error("LDAP connection failed: {0}")]
    Connection(String),

    /// Bind / credential error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// LDAP query/search error
    #[error("LDAP query failed: {0}")]
    Search(String),

    /// The template search as a whole failed
    #[error("Failed to enumerate templates: {0}")]
    Enumeration(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TemplateError {
    /// Wraps the underlying cause of a failed template search.
    pub fn enumeration(cause: impl std::fmt::Display) -> Self {
        TemplateError::Enumeration(cause.to_string())
    }
}

impl From<ldap3::LdapError> for TemplateError {
    fn from(err: ldap3::LdapError) -> Self {
        match err {
            ldap3::LdapError::LdapResult { result } => {
                match result.rc {
                    // 8 = Stronger authentication required (LDAP signing)
                    8 => TemplateError::Auth(format!(
                        "Stronger authentication required: {}",
                        result.text
                    )),
                    // 49 = Invalid credentials
                    49 => TemplateError::Auth(format!(
                        "Invalid credentials: {}",
                        result.text
                    )),
                    // 32 = No such object
                    32 => TemplateError::Search(format!(
                        "Object not found: {}",
                        result.text
                    )),
                    // 50 = Insufficient access rights
                    50 => TemplateError::Search(format!(
                        "Insufficient access rights: {}",
                        result.text
                    )),
                    // 51 = Busy
                    51 => TemplateError::Timeout(format!(
                        "Server is busy: {}",
                        result.text
                    )),
                    // 52 = Unavailable
                    52 => TemplateError::Connection(format!(
                        "Server unavailable: {}",
                        result.text
                    )),
                    // 53 = Unwilling to perform
                    53 => TemplateError::Search(format!(
                        "Server unwilling to perform operation: {}",
                        result.text
                    )),
                    _ => TemplateError::Search(format!(
                        "LDAP error code {}: {}",
                        result.rc, result.text
                    )),
                }
            }
            ldap3::LdapError::EndOfStream => {
                TemplateError::Connection("Connection closed unexpectedly".to_string())
            }
            ldap3::LdapError::Io { source } => {
                TemplateError::Connection(format!("I/O error: {}", source))
            }
            ldap3::LdapError::Timeout { elapsed: _ } => {
                TemplateError::Timeout("LDAP operation timed out".to_string())
            }
            _ => TemplateError::Search(format!("LDAP error: {}", err)),
        }
    }
}

impl From<anyhow::Error> for TemplateError {
    fn from(err: anyhow::Error) -> Self {
        TemplateError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Connection(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::Connection("test".to_string());
        assert_eq!(err.to_string(), "LDAP connection failed: test");

        let err = TemplateError::Auth("bad password".to_string());
        assert_eq!(err.to_string(), "Authentication failed: bad password");

        let err = TemplateError::enumeration("no such object");
        assert_eq!(err.to_string(), "Failed to enumerate templates: no such object");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: TemplateError = io_err.into();
        assert!(matches!(err, TemplateError::Connection(_)));
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: TemplateError = anyhow_err.into();
        assert!(matches!(err, TemplateError::Internal(_)));
    }

    #[test]
    fn test_ldap_end_of_stream_conversion() {
        let err: TemplateError = ldap3::LdapError::EndOfStream.into();
        assert!(matches!(err, TemplateError::Connection(_)));
    }
}
