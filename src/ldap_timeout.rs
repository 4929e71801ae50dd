//! Timeout wrappers for synchronous LDAP operations
//!
//! ldap3's `LdapConn` is blocking and can hang indefinitely on an
//! unreachable or slow server. These helpers move the blocking work onto
//! tokio's blocking pool and bound it with a timeout.

use anyhow::{anyhow, Result};
use ldap3::{LdapConn, LdapConnSettings, LdapResult};
use std::time::Duration;
use tokio::time::timeout;
use zeroize::Zeroizing;
use tracing::{debug, error};

use crate::config::AuthMethod;

/// Default connection timeout (15 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default search timeout (30 seconds)
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a blocking closure on the blocking pool with a timeout.
///
/// `operation` names the work in error messages. A closure still running
/// when the timeout fires is left to finish on its own thread.
pub async fn run_blocking_with_timeout<T, F>(
    operation: &str,
    limit: Duration,
    work: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    debug!("{}: starting (timeout: {}s)", operation, limit.as_secs());

    match timeout(limit, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(anyhow!("{}: task join error: {}", operation, e)),
        Err(_) => {
            error!("{}: timed out after {}s", operation, limit.as_secs());
            Err(anyhow!(
                "{} timeout: did not complete within {} seconds",
                operation,
                limit.as_secs()
            ))
        }
    }
}

/// Opens an LDAP connection with a timeout.
///
/// TLS certificate verification is disabled so that LDAPS works against
/// domain controllers with internal CA certificates.
pub async fn ldap_connect_with_timeout(url: &str, connect_timeout: Duration) -> Result<LdapConn> {
    let url = url.to_string();

    run_blocking_with_timeout("LDAP connect", connect_timeout, move || {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(connect_timeout)
            .set_no_tls_verify(true);
        LdapConn::with_settings(settings, &url)
    })
    .await?
    .map_err(|e| anyhow!("LDAP connection failed: {}", e))
}

/// Binds with the chosen mechanism under a timeout.
///
/// Returns the connection together with the bind result so that the
/// caller can inspect the result code (e.g. strongerAuthRequired).
pub async fn ldap_bind_with_timeout(
    ldap: LdapConn,
    method: AuthMethod,
    bind_name: &str,
    password: &str,
    bind_timeout: Duration,
) -> Result<(LdapConn, LdapResult)> {
    let bind_name = Zeroizing::new(bind_name.to_string());
    let password = Zeroizing::new(password.to_string());
    debug!("LDAP bind as {} using {:?}", bind_name.as_str(), method);

    run_blocking_with_timeout("LDAP bind", bind_timeout, move || {
        let mut ldap = ldap;
        let result = match method {
            AuthMethod::Ntlm => ldap.sasl_ntlm_bind(&bind_name, &password)?,
            AuthMethod::Simple => ldap.simple_bind(&bind_name, &password)?,
        };
        Ok::<_, ldap3::LdapError>((ldap, result))
    })
    .await?
    .map_err(|e| anyhow!("LDAP bind failed: {}", e))
}

/// Unbinds with a timeout. Failures are not reported: the connection is
/// dropped either way.
pub async fn ldap_unbind_with_timeout(ldap: LdapConn, unbind_timeout: Duration) {
    let result = run_blocking_with_timeout("LDAP unbind", unbind_timeout, move || {
        let mut ldap = ldap;
        ldap.unbind()
    })
    .await;

    match result {
        Ok(Ok(())) => debug!("LDAP unbind complete"),
        Ok(Err(e)) => debug!("LDAP unbind failed: {}", e),
        Err(e) => debug!("LDAP unbind failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        let value = run_blocking_with_timeout("sum", Duration::from_secs(5), || 2 + 2)
            .await
            .unwrap();
        assert_eq!(value, 4);
    }

    #[tokio::test]
    async fn test_run_blocking_times_out() {
        let err = run_blocking_with_timeout("sleepy", Duration::from_millis(10), || {
            std::thread::sleep(Duration::from_millis(500));
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("sleepy timeout"));
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_fails() {
        // port 1 on localhost is not an LDAP server
        let result = ldap_connect_with_timeout("ldap://127.0.0.1:1", Duration::from_secs(5)).await;
        assert!(result.is_err());
    }
}
