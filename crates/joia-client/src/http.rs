//! # HTTP Client
//!
//! The single gateway to the store API.
//!
//! Every request carries the stored bearer token. When the API answers
//! `401`, the client makes one refresh call with the refresh token, stores
//! the new access token and replays the original request exactly once.
//! If the refresh itself fails both tokens are dropped and the caller gets
//! [`ShopError::SessionExpired`], which the presentation layer turns into a
//! redirect to the login page. There are no other retries.

use crate::config::ApiConfig;
use joia_core::{RefreshedToken, ShopError, ShopResult, TokenStore};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Path of the token refresh endpoint
pub const REFRESH_PATH: &str = "/token/refresh/";

// ============================================================================
// Request Description
// ============================================================================

/// A multipart form field.
///
/// Kept as owned data so the same form can be rebuilt when a request is
/// replayed after a token refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// A replayable description of one API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Builder: append query parameters
    pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Builder: JSON body
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> ShopResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Builder: multipart body
    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }
}

// ============================================================================
// API Error Body
// ============================================================================

#[derive(Debug, Deserialize)]
struct DetailBody {
    detail: String,
}

/// Pull a readable message out of an error response.
///
/// The API answers either `{"detail": "..."}` or a map of field names to
/// lists of messages; the first message found wins.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<DetailBody>(body) {
        return parsed.detail;
    }
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(body)
    {
        let first = fields.iter().find_map(|(field, value)| match value {
            serde_json::Value::Array(list) => list
                .first()
                .and_then(|m| m.as_str())
                .map(|m| format!("{}: {}", field, m)),
            serde_json::Value::String(m) => Some(format!("{}: {}", field, m)),
            _ => None,
        });
        if let Some(message) = first {
            return message;
        }
    }
    format!("HTTP {}", status.as_u16())
}

// ============================================================================
// Client
// ============================================================================

/// Store API client with bearer token refresh
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a client with its own connection pool
    pub fn new(config: ApiConfig, tokens: TokenStore) -> ShopResult<Self> {
        let http = build_http_client(&config)?;
        Ok(Self::with_http_client(http, config, tokens))
    }

    /// Create a client sharing an existing connection pool
    pub fn with_http_client(http: Client, config: ApiConfig, tokens: TokenStore) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Send a request through the refresh interceptor
    #[instrument(skip(self, req), fields(method = %req.method, path = %req.path))]
    pub async fn send(&self, req: &ApiRequest) -> ShopResult<Response> {
        let response = self.dispatch(req, self.tokens.access_token()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        let Some(refresh) = self.tokens.refresh_token() else {
            debug!("401 with no refresh token");
            return check_status(response).await;
        };

        match self.refresh_access(&refresh).await {
            Ok(access) => {
                self.tokens.save_access(&access);
                info!("Access token refreshed, replaying request");
                let retried = self.dispatch(req, Some(access)).await?;
                check_status(retried).await
            }
            Err(e) => {
                warn!("Token refresh failed, clearing session: {}", e);
                self.tokens.clear();
                Err(ShopError::SessionExpired)
            }
        }
    }

    /// Send a request without the bearer token or refresh handling
    pub async fn send_anonymous(&self, req: &ApiRequest) -> ShopResult<Response> {
        let response = self.dispatch(req, None).await?;
        check_status(response).await
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ShopResult<T> {
        let req = ApiRequest::get(path).with_query(query.iter().map(|(k, v)| (*k, v.clone())));
        decode(self.send(&req).await?).await
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ShopResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = ApiRequest::post(path).with_json(body)?;
        decode(self.send(&req).await?).await
    }

    /// POST a multipart form and decode the JSON answer
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> ShopResult<T> {
        let req = ApiRequest::post(path).with_multipart(parts);
        decode(self.send(&req).await?).await
    }

    /// PATCH a multipart form and decode the JSON answer
    pub async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> ShopResult<T> {
        let req = ApiRequest::patch(path).with_multipart(parts);
        decode(self.send(&req).await?).await
    }

    /// DELETE a resource
    pub async fn delete(&self, path: &str) -> ShopResult<()> {
        self.send(&ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Exchange the refresh token for a new access token
    async fn refresh_access(&self, refresh: &str) -> ShopResult<String> {
        let req = ApiRequest::post(REFRESH_PATH)
            .with_json(&serde_json::json!({ "refresh": refresh }))?;
        let response = self.send_anonymous(&req).await?;
        let token: RefreshedToken = decode(response).await?;
        Ok(token.access)
    }

    async fn dispatch(&self, req: &ApiRequest, bearer: Option<String>) -> ShopResult<Response> {
        let url = self.config.endpoint(&req.path);
        let mut request = self.http.request(req.method.clone(), &url);

        if !req.query.is_empty() {
            request = request.query(&req.query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request = match &req.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(parts) => request.multipart(build_form(parts)?),
        };

        debug!("{} {}", req.method, url);

        request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ShopError::Network(e.to_string())
        })
    }
}

/// Build the shared `reqwest` client
pub fn build_http_client(config: &ApiConfig) -> ShopResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

fn build_form(parts: &[FormPart]) -> ShopResult<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let file = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(content_type)
                    .map_err(|e| {
                        ShopError::InvalidRequest(format!("Invalid content type {}: {}", content_type, e))
                    })?;
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

async fn check_status(response: Response) -> ShopResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    warn!("API error: status={}, message={}", status, message);

    if status == StatusCode::UNAUTHORIZED {
        return Err(ShopError::Unauthorized(message));
    }
    Err(ShopError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> ShopResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ShopError::Network(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| {
        ShopError::Serialization(format!("Failed to parse API response: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_detail() {
        let msg = error_message(StatusCode::FORBIDDEN, r#"{"detail": "Sem permissão."}"#);
        assert_eq!(msg, "Sem permissão.");
    }

    #[test]
    fn test_error_message_field_errors() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"email": ["Já existe um usuário com este email."]}"#,
        );
        assert_eq!(msg, "email: Já existe um usuário com este email.");
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "<html>"), "HTTP 502");
    }

    #[test]
    fn test_request_spec_builders() {
        let req = ApiRequest::get("/products/")
            .with_query([("category__slug", "aneis")])
            .with_query(vec![("search".to_string(), "ouro".to_string())]);
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.body, RequestBody::Empty);

        let req = ApiRequest::post("/orders/")
            .with_json(&serde_json::json!({"total": "10.00"}))
            .unwrap();
        assert!(matches!(req.body, RequestBody::Json(_)));
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let parts = vec![FormPart::file("uploaded_images", "a.jpg", "not a mime", vec![1, 2])];
        assert!(build_form(&parts).is_err());
        let ok = vec![
            FormPart::text("name", "Anel"),
            FormPart::file("uploaded_images", "a.jpg", "image/jpeg", vec![1, 2]),
        ];
        assert!(build_form(&ok).is_ok());
    }
}
