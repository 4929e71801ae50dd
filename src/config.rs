//! Command-line configuration
//!
//! Connection settings, timeouts and output options, parsed with clap and
//! validated into the settings the directory client consumes.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::errors::{Result, TemplateError};
use crate::ldap_timeout::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SEARCH_TIMEOUT};
use crate::secure_types::Credentials;

/// Standard LDAP port
pub const LDAP_PORT: u16 = 389;

/// LDAP over TLS port
pub const LDAPS_PORT: u16 = 636;

/// Output format of the template report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented tree, one node per template
    Text,
    /// JSON array of template records
    Json,
}

/// How the session authenticates to the domain controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AuthMethod {
    /// SASL NTLM bind
    #[default]
    Ntlm,
    /// LDAP simple bind with the qualified account name
    Simple,
}

/// Enumerate and decode AD CS certificate templates
#[derive(Parser, Debug)]
#[command(name = "certscope", version, about)]
pub struct Cli {
    /// Domain controller host name or IP address
    #[arg(long, value_name = "HOST")]
    pub host: String,

    /// Domain name (e.g. corp.local); also the NetBIOS prefix of the bind name
    #[arg(short, long, value_name = "DOMAIN")]
    pub domain: String,

    /// Account name, plain or as DOMAIN\user or user@domain
    #[arg(short, long, value_name = "USER")]
    pub username: String,

    /// Account password
    #[arg(short, long, env = "CERTSCOPE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Bind mechanism
    #[arg(long, value_enum, default_value = "ntlm")]
    pub auth: AuthMethod,

    /// Connect over LDAPS directly instead of trying plain LDAP first
    #[arg(long)]
    pub ldaps: bool,

    /// Base naming context; discovered from the RootDSE when omitted
    #[arg(long, value_name = "DN")]
    pub base_dn: Option<String>,

    /// Connect and bind timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    pub connect_timeout: u64,

    /// Template search timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_SEARCH_TIMEOUT.as_secs())]
    pub search_timeout: u64,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log filter (e.g. info, debug, certscope=trace); RUST_LOG takes precedence
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Settings for one directory session
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub credentials: Credentials,
    pub auth: AuthMethod,
    pub force_ldaps: bool,
    pub base_dn: Option<String>,
    pub connect_timeout: Duration,
    pub search_timeout: Duration,
}

impl ConnectionConfig {
    /// Host with any URL scheme and port removed
    fn bare_host(&self) -> &str {
        let host = self
            .host
            .trim()
            .trim_start_matches("ldaps://")
            .trim_start_matches("ldap://")
            .trim_end_matches('/');
        match host.rsplit_once(':') {
            // leave bare IPv6 addresses alone
            Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok() => name,
            _ => host,
        }
    }

    pub fn ldap_url(&self) -> String {
        format!("ldap://{}:{}", self.bare_host(), LDAP_PORT)
    }

    pub fn ldaps_url(&self) -> String {
        format!("ldaps://{}:{}", self.bare_host(), LDAPS_PORT)
    }

    /// `DC=` components of the domain name, used when neither an explicit
    /// base DN nor the RootDSE provides one
    pub fn derived_base_dn(&self) -> String {
        domain_to_base_dn(self.credentials.domain())
    }
}

/// Converts `corp.example.com` into `DC=corp,DC=example,DC=com`.
pub fn domain_to_base_dn(domain: &str) -> String {
    domain
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| format!("DC={}", part))
        .collect::<Vec<_>>()
        .join(",")
}

/// Validated application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub format: OutputFormat,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let config = Self {
            connection: ConnectionConfig {
                host: cli.host,
                credentials: Credentials::new(cli.domain, cli.username, cli.password),
                auth: cli.auth,
                force_ldaps: cli.ldaps,
                base_dn: cli.base_dn.filter(|dn| !dn.trim().is_empty()),
                connect_timeout: Duration::from_secs(cli.connect_timeout),
                search_timeout: Duration::from_secs(cli.search_timeout),
            },
            format: cli.format,
            log_level: cli.log_level,
            log_file: cli.log_file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let connection = &self.connection;
        if connection.host.trim().is_empty() {
            return Err(TemplateError::Config("host must not be empty".to_string()));
        }
        if connection.credentials.domain().trim().is_empty() {
            return Err(TemplateError::Config("domain must not be empty".to_string()));
        }
        if connection.credentials.username().trim().is_empty() {
            return Err(TemplateError::Config("username must not be empty".to_string()));
        }
        if connection.credentials.password().is_empty() {
            return Err(TemplateError::Config("password must not be empty".to_string()));
        }
        if connection.connect_timeout.is_zero() || connection.search_timeout.is_zero() {
            return Err(TemplateError::Config("timeouts must be at least 1 second".to_string()));
        }
        Ok(())
    }
}
