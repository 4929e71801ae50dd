//! Directory client
//!
//! Opens an authenticated ldap3 session against a domain controller,
//! resolves the base naming context and runs the certificate template
//! search on behalf of the enumerator.

use std::time::Duration;

use anyhow::bail;
use ldap3::{LdapConn, LdapResult, Scope, SearchEntry};
use tracing::{debug, error, info, warn};

use crate::common_types::{RawAttributeSet, TemplateRecord};
use crate::config::ConnectionConfig;
use crate::errors::{Result, TemplateError};
use crate::ldap_helpers::TemplateEntryExt;
use crate::ldap_timeout::{
    ldap_bind_with_timeout, ldap_connect_with_timeout, ldap_unbind_with_timeout,
    run_blocking_with_timeout,
};
use crate::template_enumerator::{enumerate_templates, TemplateSearch, TEMPLATE_FILTER};

/// sizeLimitExceeded: the server returned only part of the result set
const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;

/// strongerAuthRequired: the DC enforces LDAP signing on port 389
const RC_STRONGER_AUTH_REQUIRED: u32 = 8;

const UNBIND_TIMEOUT: Duration = Duration::from_secs(5);

/// An authenticated session bound to one domain controller
pub struct TemplateSession {
    ldap: LdapConn,
    url: String,
    base_dn: String,
}

impl TemplateSession {
    /// Connects, binds and resolves the base naming context.
    ///
    /// Plain LDAP is tried first unless LDAPS is forced. A bind refused
    /// with strongerAuthRequired is retried once over LDAPS.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let (ldap, url) = if config.force_ldaps {
            let url = config.ldaps_url();
            (bind_checked(&url, config).await?, url)
        } else {
            let url = config.ldap_url();
            let (ldap, result) = open_and_bind(&url, config).await?;
            if result.rc == RC_STRONGER_AUTH_REQUIRED {
                warn!("{} requires LDAP signing, retrying over LDAPS", url);
                ldap_unbind_with_timeout(ldap, UNBIND_TIMEOUT).await;
                let url = config.ldaps_url();
                (bind_checked(&url, config).await?, url)
            } else {
                (check_bind(ldap, result, &url)?, url)
            }
        };

        info!(
            "Authenticated to {} as {} ({:?})",
            url,
            config.credentials.bind_identity(),
            config.auth
        );

        let (ldap, base_dn) = match &config.base_dn {
            Some(base_dn) => (ldap, base_dn.clone()),
            None => {
                let (ldap, discovered) = read_naming_context(ldap, config.connect_timeout).await?;
                let base_dn = discovered.unwrap_or_else(|| {
                    let derived = config.derived_base_dn();
                    warn!("RootDSE did not name a naming context, using {}", derived);
                    derived
                });
                (ldap, base_dn)
            }
        };
        debug!("Base naming context: {}", base_dn);

        Ok(Self { ldap, url, base_dn })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Searches and decodes every template, then unbinds.
    ///
    /// The search and decoding run on the blocking pool, bounded by
    /// `search_timeout`.
    pub async fn enumerate(self, search_timeout: Duration) -> Result<Vec<TemplateRecord>> {
        let (session, records) =
            run_blocking_with_timeout("Template search", search_timeout, move || {
                let mut session = self;
                let base_dn = session.base_dn.clone();
                let records = enumerate_templates(&mut session, &base_dn);
                (session, records)
            })
            .await
            .map_err(blocking_error)?;

        ldap_unbind_with_timeout(session.ldap, UNBIND_TIMEOUT).await;
        records
    }
}

impl TemplateSearch for TemplateSession {
    fn search_templates(&mut self, container_dn: &str) -> anyhow::Result<Vec<RawAttributeSet>> {
        debug!("Searching {} for {}", container_dn, TEMPLATE_FILTER);
        let result = self
            .ldap
            .search(container_dn, Scope::Subtree, TEMPLATE_FILTER, vec!["*"])?;

        let entries = match result.1.rc {
            0 => result.0,
            RC_SIZE_LIMIT_EXCEEDED => {
                warn!(
                    "Size limit exceeded under {}, continuing with {} templates",
                    container_dn,
                    result.0.len()
                );
                result.0
            }
            rc => {
                error!("Template search under {} failed: rc={} {}", container_dn, rc, result.1.text);
                bail!("rc={} {}", rc, result.1.text);
            }
        };

        Ok(entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).to_raw_attribute_set())
            .collect())
    }
}

async fn open_and_bind(url: &str, config: &ConnectionConfig) -> Result<(LdapConn, LdapResult)> {
    info!("Connecting to {}", url);
    let ldap = ldap_connect_with_timeout(url, config.connect_timeout)
        .await
        .map_err(transport_error)?;

    let credentials = &config.credentials;
    debug!("Binding to {} with {:?} authentication", url, config.auth);
    ldap_bind_with_timeout(
        ldap,
        config.auth,
        &credentials.bind_identity(),
        credentials.password(),
        config.connect_timeout,
    )
    .await
    .map_err(transport_error)
}

async fn bind_checked(url: &str, config: &ConnectionConfig) -> Result<LdapConn> {
    let (ldap, result) = open_and_bind(url, config).await?;
    check_bind(ldap, result, url)
}

fn check_bind(ldap: LdapConn, result: LdapResult, url: &str) -> Result<LdapConn> {
    if let Err(e) = result.success() {
        error!("Bind to {} failed: {}", url, e);
        return Err(e.into());
    }
    Ok(ldap)
}

/// Reads `defaultNamingContext`, falling back to the first `namingContexts`
/// value. A RootDSE that cannot be read yields `None`.
async fn read_naming_context(
    ldap: LdapConn,
    limit: Duration,
) -> Result<(LdapConn, Option<String>)> {
    run_blocking_with_timeout("RootDSE read", limit, move || {
        let mut ldap = ldap;
        let discovered = ldap
            .search(
                "",
                Scope::Base,
                "(objectClass=*)",
                vec!["defaultNamingContext", "namingContexts"],
            )
            .and_then(|result| result.success())
            .map(|(entries, _)| {
                entries
                    .into_iter()
                    .next()
                    .map(SearchEntry::construct)
                    .and_then(|entry| naming_context(&entry))
            })
            .unwrap_or_else(|e| {
                warn!("RootDSE read failed: {}", e);
                None
            });
        (ldap, discovered)
    })
    .await
    .map_err(blocking_error)
}

fn naming_context(root_dse: &SearchEntry) -> Option<String> {
    first_value(root_dse, "defaultNamingContext")
        .or_else(|| first_value(root_dse, "namingContexts"))
}

fn first_value(entry: &SearchEntry, attribute: &str) -> Option<String> {
    entry
        .attrs
        .get(attribute)
        .and_then(|values| values.iter().find(|v| !v.is_empty()))
        .cloned()
}

fn transport_error(e: anyhow::Error) -> TemplateError {
    let message = e.to_string();
    if message.contains("timeout") {
        TemplateError::Timeout(message)
    } else {
        TemplateError::Connection(message)
    }
}

fn blocking_error(e: anyhow::Error) -> TemplateError {
    let message = e.to_string();
    if message.contains("timeout") {
        TemplateError::Timeout(message)
    } else {
        TemplateError::Internal(message)
    }
}
