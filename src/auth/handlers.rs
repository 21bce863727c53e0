use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::{AuthAccount, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::{ApiError, ApiResult},
    state::AppState,
    users::dto::AccountResponse,
    users::repo_types::{Account, NewAccount},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/user/profile", get(get_profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    if payload.name.is_empty() {
        return Err(ApiError::MissingField("name"));
    }
    if payload.email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::MissingField("password"));
    }

    if Account::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let account = Account::create(
        &state.db,
        NewAccount {
            name: &payload.name,
            email: &payload.email,
            password_hash: &hash,
            role: "user",
            department: "",
            phone: "",
        },
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(account.id, &account.email)?;

    info!(account_id = account.id, email = %account.email, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            account: account.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if payload.email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::MissingField("password"));
    }

    // Unknown email and wrong password take the same exit so the response
    // cannot be used to enumerate accounts.
    let account = match Account::find_by_email(&state.db, &payload.email).await? {
        Some(a) => a,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &account.password_hash) {
        warn!(account_id = account.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(account.id, &account.email)?;

    info!(account_id = account.id, email = %account.email, "login succeeded");
    Ok(Json(AuthResponse {
        account: account.into(),
        token,
    }))
}

/// The token may outlive the account; a deleted account is a 404 even with
/// a valid token.
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthAccount,
) -> ApiResult<Json<AccountResponse>> {
    let account = Account::find_by_id(&state.db, auth.account_id)
        .await?
        .ok_or(ApiError::NotFound("account"))?;

    Ok(Json(AccountResponse {
        account: account.into(),
    }))
}
