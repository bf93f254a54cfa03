//! # Shopper Session
//!
//! The server-side stand-in for browser storage. The cart, the drawer flag
//! and the token pair live in the shopper's `tower-sessions` session under
//! the same keys the browser would use.

use crate::state::AppState;
use joia_client::ApiClient;
use joia_core::{Cart, MemoryStore, ShopError, ShopResult, TokenPair, TokenStore};
use joia_core::storage::CART_KEY;
use std::ops::Deref;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::debug;

/// Session cookie name
pub const SESSION_COOKIE: &str = "joia_session";

/// Session key for the token pair
pub const TOKENS_KEY: &str = "tokens";

/// Session key for the cart drawer flag
pub const CART_OPEN_KEY: &str = "cart_open";

fn storage_error(err: tower_sessions::session::Error) -> ShopError {
    ShopError::Storage(err.to_string())
}

/// The cart plus its drawer state
pub async fn load_cart(session: &Session) -> ShopResult<Cart> {
    let stored = session
        .get::<Cart>(CART_KEY)
        .await
        .map_err(storage_error)?
        .unwrap_or_default();
    let mut cart = Cart::from_items(stored.into_items());

    let open = session
        .get::<bool>(CART_OPEN_KEY)
        .await
        .map_err(storage_error)?
        .unwrap_or(false);
    if open != cart.is_open() {
        cart.toggle();
    }
    Ok(cart)
}

/// Persist the cart lines and the drawer state
pub async fn save_cart(session: &Session, cart: &Cart) -> ShopResult<()> {
    session
        .insert(CART_KEY, cart)
        .await
        .map_err(storage_error)?;
    session
        .insert(CART_OPEN_KEY, cart.is_open())
        .await
        .map_err(storage_error)
}

/// An [`ApiClient`] bound to one shopper's tokens.
///
/// Tokens are copied out of the session into a scratch store; call
/// [`SessionApi::finish`] after the API work so a refreshed or cleared
/// token pair is written back.
pub struct SessionApi {
    client: ApiClient,
    session: Session,
    initial: Option<TokenPair>,
}

impl SessionApi {
    pub async fn open(state: &AppState, session: Session) -> ShopResult<Self> {
        let initial = session
            .get::<TokenPair>(TOKENS_KEY)
            .await
            .map_err(storage_error)?;

        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        if let Some(pair) = &initial {
            tokens.save_pair(pair);
        }

        let client =
            ApiClient::with_http_client(state.http.clone(), state.config.api.clone(), tokens);
        Ok(Self {
            client,
            session,
            initial,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Write tokens back to the session, then hand back the API result
    pub async fn finish<T>(&self, result: ShopResult<T>) -> ShopResult<T> {
        self.sync_tokens().await?;
        result
    }

    async fn sync_tokens(&self) -> ShopResult<()> {
        match self.client.tokens().pair() {
            Some(pair) if self.initial.as_ref() != Some(&pair) => {
                debug!("Storing updated token pair in session");
                self.session
                    .insert(TOKENS_KEY, &pair)
                    .await
                    .map_err(storage_error)
            }
            Some(_) => Ok(()),
            None if self.initial.is_some() => {
                debug!("Removing token pair from session");
                self.session
                    .remove::<TokenPair>(TOKENS_KEY)
                    .await
                    .map(|_| ())
                    .map_err(storage_error)
            }
            None => Ok(()),
        }
    }
}

impl Deref for SessionApi {
    type Target = ApiClient;

    fn deref(&self) -> &ApiClient {
        &self.client
    }
}
