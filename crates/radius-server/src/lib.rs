//! RADIUS server
//!
//! UDP dispatch loops (authentication and accounting) on top of the
//! `radius-proto` codec, with pluggable collaborator back-ends for
//! credentials, external authentication, and per-NAS shared secrets.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_server::{MemoryCredentialStore, RadiusServer, ServerConfig};
//! use radius_server::{Config, NasSettings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.nas_settings.insert(
//!         "127.0.0.1".to_string(),
//!         NasSettings { secret_key: "s3cr3t".to_string() },
//!     );
//!
//!     let mut store = MemoryCredentialStore::new();
//!     store.add_user("alice", "hunter2");
//!
//!     let server_config = ServerConfig::new(
//!         config.auth_addr()?,
//!         config.acct_addr()?,
//!         Arc::new(config.secret_table()?),
//!     )
//!     .with_credential_store(Arc::new(store));
//!
//!     let server = RadiusServer::bind(server_config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod ldap_auth;
pub mod server;
pub mod sql_auth;

pub use backend::{CredentialStore, ExternalAuthenticator, MemoryCredentialStore, SecretResolver};
pub use config::{Config, ConfigError, DatabaseSettings, LdapSettings, NasSettings, NasTable, User};
pub use ldap_auth::LdapAuthenticator;
pub use server::{RadiusServer, ServerConfig, ServerError};
pub use sql_auth::SqlCredentialStore;
