//! Login, logout, registration and phone verification.

use crate::error::{shop_error_to_response, ApiError};
use crate::session::SessionApi;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use joia_core::auth::LOGIN_PATH;
use joia_core::{landing_path, Credentials, Registration, SmsRequest, SmsVerification, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: Option<User>,
    pub redirect: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RedirectResponse {
    pub message: String,
    pub redirect: String,
}

#[derive(Debug, Deserialize)]
pub struct SmsSendRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct SmsVerifyRequest {
    pub phone: String,
    pub code: String,
}

/// Sign in; staff land on the admin dashboard, shoppers on the home page
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let credentials = Credentials::new(&request.email, request.password);
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let result = api.login(&credentials).await;
    let user = api.finish(result).await.map_err(shop_error_to_response)?;

    let redirect = landing_path(user.as_ref()).to_string();
    info!("Login ok, redirecting to {}", redirect);
    Ok(Json(LoginResponse { user, redirect }))
}

/// Drop the token pair from the session
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<RedirectResponse>, ApiError> {
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    api.logout();
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    Ok(Json(RedirectResponse {
        message: "Sessão encerrada.".to_string(),
        redirect: LOGIN_PATH.to_string(),
    }))
}

/// Create an account; the shopper is sent to the login page afterwards
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<Registration>,
) -> Result<(StatusCode, Json<RedirectResponse>), ApiError> {
    let payload = form.into_payload().map_err(shop_error_to_response)?;

    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let result = api.register(&payload).await;
    api.finish(result).await.map_err(shop_error_to_response)?;

    Ok((
        StatusCode::CREATED,
        Json(RedirectResponse {
            message: "Conta criada com sucesso! Faça login.".to_string(),
            redirect: LOGIN_PATH.to_string(),
        }),
    ))
}

/// Send a verification code by SMS
pub async fn sms_send(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SmsSendRequest>,
) -> Result<Json<Value>, ApiError> {
    let sms = SmsRequest::new(&request.phone).map_err(shop_error_to_response)?;
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let result = api.send_sms(&sms).await;
    api.finish(result)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

/// Check the code the shopper typed
pub async fn sms_verify(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SmsVerifyRequest>,
) -> Result<Json<Value>, ApiError> {
    let verification =
        SmsVerification::new(&request.phone, &request.code).map_err(shop_error_to_response)?;
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let result = api.verify_sms(&verification).await;
    api.finish(result)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}
