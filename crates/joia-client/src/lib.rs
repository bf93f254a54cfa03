//! # joia-client
//!
//! Typed client for the Joia store REST API.
//!
//! All traffic goes through [`ApiClient`], which attaches the stored bearer
//! token and performs the one-shot refresh on `401`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use joia_client::{ApiClient, ApiConfig};
//! use joia_core::{Credentials, MemoryStore, TokenStore};
//! use std::sync::Arc;
//!
//! let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
//! let client = ApiClient::new(ApiConfig::from_env()?, tokens)?;
//!
//! let user = client.login(&Credentials::new("ana@joia.com", "Joia2024!")).await?;
//! let offers = client.offers().await;
//! ```

pub mod account;
pub mod admin;
pub mod catalog;
pub mod config;
pub mod http;
pub mod orders;

// Re-exports
pub use account::AuthSession;
pub use admin::{ImageUpload, ProductForm};
pub use config::ApiConfig;
pub use http::{build_http_client, ApiClient, ApiRequest, FormPart, RequestBody};
