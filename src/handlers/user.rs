//! User account handlers: register, login, and the caller's own profile.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationError};

use super::{AppState, Endpoint};
use crate::db::StoreError;
use crate::error::{AppError, AppResult};
use crate::iam::hash_password;
use crate::middleware::CurrentUser;
use crate::models::Credential;
use crate::routes::Route;

pub const REGISTER_PATH: &str = "/api/user/register";
pub const LOGIN_PATH: &str = "/api/user/login";
pub const ME_PATH: &str = "/api/user/me";

pub fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::new(Route::public(Method::POST, REGISTER_PATH), post(register)),
        Endpoint::new(Route::public(Method::POST, LOGIN_PATH), post(login)),
        Endpoint::new(Route::protected(Method::GET, ME_PATH), get(me)),
    ]
}

#[derive(Deserialize, Validate)]
pub struct CredentialRequest {
    #[validate(length(min = 1, max = 255))]
    pub login: String,
    #[validate(custom(function = "validate_password_bytes"))]
    pub password: String,
}

/// bcrypt only reads the first 72 bytes, so longer passwords would collide.
const MAX_PASSWORD_BYTES: usize = 72;

fn validate_password_bytes(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_length"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub login: String,
    pub created_at: String,
}

fn credential_from(payload: Result<Json<CredentialRequest>, JsonRejection>) -> AppResult<Credential> {
    let invalid = || AppError::Validation("invalid request params".to_string());
    let Json(body) = payload.map_err(|_| invalid())?;
    body.validate().map_err(|_| invalid())?;
    Ok(Credential {
        login: body.login,
        password: body.password,
    })
}

/// Empty JSON body with the session token in the `Authorization` header.
fn with_token(token: &str) -> AppResult<Response> {
    let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(([(AUTHORIZATION, value)], Json(json!({}))).into_response())
}

/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialRequest>, JsonRejection>,
) -> AppResult<Response> {
    let credential = credential_from(payload)?;
    let password_hash = hash_password(&credential.password).await?;

    let user = state
        .identities()
        .create(&credential.login, &password_hash)
        .await
        .map_err(|e| match e {
            StoreError::Conflict => AppError::Conflict("user already exists".to_string()),
            other => AppError::Store(other),
        })?;

    let token = state.iam().login(&user).await?;
    with_token(&token)
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialRequest>, JsonRejection>,
) -> AppResult<Response> {
    let credential = credential_from(payload)?;
    let user = state.iam().authenticate(&credential).await?;
    let token = state.iam().login(&user).await?;
    with_token(&token)
}

/// GET /api/user/me
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MeResponse>> {
    let id = current_user.account_id()?;
    let user = state
        .identities()
        .find_by_id(id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound,
            other => AppError::Store(other),
        })?;

    Ok(Json(MeResponse {
        id: user.id,
        login: user.login,
        created_at: user.created_at.to_rfc3339(),
    }))
}
