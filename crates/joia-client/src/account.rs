//! # Account
//!
//! Login, profile, registration, addresses and phone verification.

use crate::http::{ApiClient, ApiRequest};
use joia_core::{
    Address, Credentials, NewAddress, RegisterRequest, ShopError, ShopResult, SmsRequest,
    SmsVerification, TokenPair, User,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

impl ApiClient {
    /// `POST /token/` then `GET /users/me/`.
    ///
    /// The token pair is stored before the profile is fetched, so a failed
    /// profile read still leaves the shopper signed in.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> ShopResult<Option<User>> {
        let req = ApiRequest::post("/token/").with_json(credentials)?;
        let response = self.send_anonymous(&req).await.map_err(|e| match e {
            ShopError::Unauthorized(_) | ShopError::Api { status: 400, .. } => {
                ShopError::InvalidCredentials
            }
            other => other,
        })?;
        let pair: TokenPair = response
            .json()
            .await
            .map_err(|e| ShopError::Serialization(format!("Failed to parse token pair: {}", e)))?;
        self.tokens().save_pair(&pair);
        info!("Logged in");

        match self.me().await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Logged in but profile unavailable: {}", e);
                Ok(None)
            }
        }
    }

    /// `GET /users/me/`
    pub async fn me(&self) -> ShopResult<User> {
        self.get_json("/users/me/", &[]).await
    }

    /// Forget the token pair; there is no server-side logout
    pub fn logout(&self) {
        self.tokens().clear();
        info!("Logged out");
    }

    /// `POST /register/`
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> ShopResult<()> {
        let req = ApiRequest::post("/register/").with_json(request)?;
        self.send_anonymous(&req).await?;
        info!("Account created");
        Ok(())
    }

    /// `GET /addresses/`
    pub async fn addresses(&self) -> ShopResult<Vec<Address>> {
        self.get_json("/addresses/", &[]).await
    }

    /// `POST /addresses/`
    pub async fn create_address(&self, address: &NewAddress) -> ShopResult<Address> {
        address.validate()?;
        self.post_json("/addresses/", address).await
    }

    /// `DELETE /addresses/{id}/`
    pub async fn delete_address(&self, id: u64) -> ShopResult<()> {
        self.delete(&format!("/addresses/{}/", id)).await
    }

    /// `POST /send-sms/`
    #[instrument(skip(self))]
    pub async fn send_sms(&self, request: &SmsRequest) -> ShopResult<Value> {
        self.post_json("/send-sms/", request).await
    }

    /// `POST /verify-sms/`
    #[instrument(skip(self))]
    pub async fn verify_sms(&self, verification: &SmsVerification) -> ShopResult<Value> {
        self.post_json("/verify-sms/", verification).await
    }
}

/// Sign-in state recovered when a page loads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    /// A token is held
    pub authenticated: bool,

    /// Profile, when it could be read
    pub user: Option<User>,
}

impl AuthSession {
    /// Rebuild the session from stored tokens.
    ///
    /// No token means anonymous. A profile read that fails for any reason
    /// other than an expired session keeps the tokens.
    pub async fn restore(client: &ApiClient) -> Self {
        if !client.tokens().is_authenticated() {
            return Self::default();
        }

        match client.me().await {
            Ok(user) => Self {
                authenticated: true,
                user: Some(user),
            },
            Err(ShopError::SessionExpired) => Self::default(),
            Err(e) => {
                warn!("Could not load profile: {}", e);
                Self {
                    authenticated: client.tokens().is_authenticated(),
                    user: None,
                }
            }
        }
    }

    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_staff)
    }
}
