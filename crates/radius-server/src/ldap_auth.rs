//! LDAP/Active Directory external authenticator.
//!
//! Authenticates a user by binding against the directory with the user's
//! own credentials. A bind rejected by the server is an authentication
//! failure; a transport failure is logged and also treated as a failure,
//! since the verdict cannot be trusted either way.

use crate::backend::ExternalAuthenticator;
use crate::config::LdapSettings;
use ldap3::{LdapConnAsync, LdapConnSettings};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum LdapError {
    #[error("LDAP connection error: {0}")]
    Connection(String),
    #[error("LDAP bind rejected")]
    BindRejected,
}

pub struct LdapAuthenticator {
    settings: LdapSettings,
    timeout: Duration,
}

impl LdapAuthenticator {
    pub fn new(settings: LdapSettings) -> Self {
        LdapAuthenticator {
            settings,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The bind DN for a user: `user@domain` when a domain is configured,
    /// the bare user name otherwise.
    fn bind_name(&self, user_name: &str) -> String {
        if self.settings.domain_name.is_empty() {
            user_name.to_string()
        } else {
            format!("{}@{}", user_name, self.settings.domain_name)
        }
    }

    async fn try_bind(&self, user_name: &str, password: &str) -> Result<(), LdapError> {
        let conn_settings = LdapConnSettings::new().set_conn_timeout(self.timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(conn_settings, &self.settings.path)
            .await
            .map_err(|e| LdapError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                error!("LDAP connection driver error: {}", e);
            }
        });

        let bind_name = self.bind_name(user_name);
        debug!(bind_name = %bind_name, url = %self.settings.path, "Attempting LDAP bind");

        let outcome = ldap
            .simple_bind(&bind_name, password)
            .await
            .map_err(|e| LdapError::Connection(e.to_string()))?;
        let _ = ldap.unbind().await;

        match outcome.success() {
            Ok(_) => Ok(()),
            Err(_) => Err(LdapError::BindRejected),
        }
    }
}

impl ExternalAuthenticator for LdapAuthenticator {
    fn authenticate(&self, user_name: &str, password: &str) -> bool {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                match self.try_bind(user_name, password).await {
                    Ok(()) => {
                        debug!(username = %user_name, "LDAP authentication successful");
                        true
                    }
                    Err(LdapError::BindRejected) => {
                        debug!(username = %user_name, "LDAP bind rejected");
                        false
                    }
                    Err(e) => {
                        warn!(username = %user_name, error = %e, "LDAP authentication unavailable");
                        false
                    }
                }
            })
        })
    }
}
