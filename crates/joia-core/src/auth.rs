//! # Authentication State
//!
//! Token pair handling and the signed-in user.

use crate::account::Address;
use crate::storage::{KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a shopper is sent when their session is gone
pub const LOGIN_PATH: &str = "/login";

/// Landing page for staff after login
pub const ADMIN_HOME_PATH: &str = "/admin/dashboard";

/// Response of `POST /token/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response of `POST /token/refresh/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
}

/// Login form body; the API expects the email under `username`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Normalizes the email (trimmed, lower-cased)
    pub fn new(email: &str, password: impl Into<String>) -> Self {
        Self {
            username: email.trim().to_lowercase(),
            password: password.into(),
        }
    }
}

/// Profile served by `GET /users/me/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl User {
    /// Full name, falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Page a user lands on after logging in
pub fn landing_path(user: Option<&User>) -> &'static str {
    match user {
        Some(u) if u.is_staff => ADMIN_HOME_PATH,
        _ => "/",
    }
}

/// Bearer token pair kept in client storage
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore + Send + Sync>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Store both tokens after a login
    pub fn save_pair(&self, pair: &TokenPair) {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access);
        self.store.set(REFRESH_TOKEN_KEY, &pair.refresh);
    }

    /// Replace the access token after a refresh
    pub fn save_access(&self, access: &str) {
        self.store.set(ACCESS_TOKEN_KEY, access);
    }

    /// Forget both tokens
    pub fn clear(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
    }

    /// Check if an access token is present
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Snapshot of both tokens, if both are present
    pub fn pair(&self) -> Option<TokenPair> {
        Some(TokenPair {
            access: self.access_token()?,
            refresh: self.refresh_token()?,
        })
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn user(is_staff: bool) -> User {
        User {
            id: 1,
            username: "ana@joia.com".into(),
            email: "ana@joia.com".into(),
            first_name: "Ana".into(),
            last_name: "Souza".into(),
            is_staff,
            cpf: None,
            phone: None,
            addresses: Vec::new(),
        }
    }

    #[test]
    fn test_credentials_normalize_email() {
        let creds = Credentials::new("  Ana@Joia.COM ", "Secret1!");
        assert_eq!(creds.username, "ana@joia.com");
    }

    #[test]
    fn test_landing_path() {
        assert_eq!(landing_path(Some(&user(true))), "/admin/dashboard");
        assert_eq!(landing_path(Some(&user(false))), "/");
        assert_eq!(landing_path(None), "/");
    }

    #[test]
    fn test_display_name() {
        let mut u = user(false);
        assert_eq!(u.display_name(), "Ana Souza");
        u.first_name.clear();
        u.last_name.clear();
        assert_eq!(u.display_name(), "ana@joia.com");
    }

    #[test]
    fn test_token_store_lifecycle() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        assert!(!tokens.is_authenticated());

        tokens.save_pair(&TokenPair {
            access: "a1".into(),
            refresh: "r1".into(),
        });
        assert_eq!(tokens.access_token().as_deref(), Some("a1"));

        tokens.save_access("a2");
        assert_eq!(
            tokens.pair(),
            Some(TokenPair {
                access: "a2".into(),
                refresh: "r1".into()
            })
        );

        tokens.clear();
        assert!(tokens.access_token().is_none());
        assert!(tokens.refresh_token().is_none());
    }
}
