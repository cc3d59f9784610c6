//! Collaborator contracts the server dispatches to.
//!
//! All three traits are synchronous and object-safe; implementations
//! backed by async I/O (LDAP, SQL) bridge internally and may block, so
//! the server only calls them from spawned per-datagram tasks.

use std::collections::HashMap;
use std::net::IpAddr;

/// Clear-text password lookup for a user name.
pub trait CredentialStore: Send + Sync {
    /// `None` means the user is unknown.
    fn password_for(&self, user_name: &str) -> Option<String>;
}

/// Accept/reject verdict from an external authority (e.g. an LDAP bind).
pub trait ExternalAuthenticator: Send + Sync {
    fn authenticate(&self, user_name: &str, password: &str) -> bool;
}

/// Shared-secret lookup for the source address of a datagram.
pub trait SecretResolver: Send + Sync {
    /// `None` means the client is unknown and its datagrams are dropped.
    fn secret_for(&self, client_addr: IpAddr) -> Option<String>;
}

/// In-memory credential store seeded from the configuration's user list.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: HashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        MemoryCredentialStore::default()
    }

    pub fn add_user(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users.insert(username.into(), password.into());
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn password_for(&self, user_name: &str) -> Option<String> {
        self.users.get(user_name).cloned()
    }
}
