use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthAccount,
    auth::password::hash_password,
    error::{ApiError, ApiResult},
    state::AppState,
    users::dto::{
        AccountBody, AccountListResponse, AccountResponse, CreateAccountRequest,
        UpdateAccountRequest,
    },
    users::repo_types::{Account, AccountChanges, NewAccount},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_accounts).post(create_account))
        .route("/users/:id", put(update_account).delete(delete_account))
}

#[instrument(skip(state, _auth))]
pub async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthAccount,
) -> ApiResult<Json<AccountListResponse>> {
    let accounts = Account::list(&state.db)
        .await?
        .into_iter()
        .map(AccountBody::from)
        .collect();
    Ok(Json(AccountListResponse { accounts }))
}

#[instrument(skip(state, auth, payload))]
pub async fn create_account(
    State(state): State<AppState>,
    auth: AuthAccount,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    if payload.name.is_empty() {
        return Err(ApiError::MissingField("name"));
    }
    if payload.email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::MissingField("password"));
    }

    // Pre-check; the unique constraint still backstops racing creates.
    if Account::find_by_email(&state.db, &payload.email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let account = Account::create(
        &state.db,
        NewAccount {
            name: &payload.name,
            email: &payload.email,
            password_hash: &hash,
            role: payload.role.as_deref().unwrap_or("user"),
            department: payload.department.as_deref().unwrap_or(""),
            phone: payload.phone.as_deref().unwrap_or(""),
        },
    )
    .await?;

    info!(account_id = account.id, created_by = auth.account_id, "account created");
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            account: account.into(),
        }),
    ))
}

#[instrument(skip(state, auth, payload))]
pub async fn update_account(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    if payload.name.is_empty() {
        return Err(ApiError::MissingField("name"));
    }
    if payload.email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }

    if Account::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("account"));
    }

    // Updating to an email held by a different account is a conflict;
    // keeping the current email is fine.
    if let Some(existing) = Account::find_by_email(&state.db, &payload.email).await? {
        if existing.id != id {
            return Err(ApiError::DuplicateEmail);
        }
    }

    let new_hash = match payload.password.as_deref() {
        Some(p) if !p.is_empty() => Some(hash_password(p)?),
        _ => None,
    };

    let account = Account::update(
        &state.db,
        id,
        AccountChanges {
            name: &payload.name,
            email: &payload.email,
            password_hash: new_hash.as_deref(),
            role: payload.role.as_deref().unwrap_or("user"),
            department: payload.department.as_deref().unwrap_or(""),
            phone: payload.phone.as_deref().unwrap_or(""),
        },
    )
    .await?;

    info!(account_id = id, updated_by = auth.account_id, "account updated");
    Ok(Json(AccountResponse {
        account: account.into(),
    }))
}

#[instrument(skip(state, auth))]
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let removed = Account::delete(&state.db, id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("account"));
    }
    info!(account_id = id, deleted_by = auth.account_id, "account deleted");
    Ok(Json(json!({})))
}
