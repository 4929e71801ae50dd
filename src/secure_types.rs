//! Secure Types Module
//!
//! Credential storage that zeroes the secret from memory when dropped and
//! never prints it through `Debug` or `Display`.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that zeroes its contents when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(s: String) -> Self {
        Self { inner: s }
    }

    /// Temporarily exposes the secret.
    ///
    /// # Security
    /// Use the returned slice immediately; do not copy or store it.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString([REDACTED])")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Domain account used to bind to the directory.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    domain: String,
    username: String,
    password: SecureString,
}

impl Credentials {
    pub fn new(domain: String, username: String, password: String) -> Self {
        Self {
            domain,
            username,
            password: SecureString::new(password),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Temporarily exposes the password for the bind request.
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Name presented in the bind.
    ///
    /// Down-level `DOMAIN\user` form, unless the username is already
    /// qualified as `DOMAIN\user` or a UPN.
    pub fn bind_identity(&self) -> String {
        if self.username.contains('\\') || self.username.contains('@') {
            self.username.clone()
        } else {
            format!("{}\\{}", self.domain, self.username)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() || self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials(user: {}, password: [REDACTED])", self.bind_identity())
    }
}
