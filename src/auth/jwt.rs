use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// Tokens expire exactly 24 hours after issuance; expired tokens require a
/// fresh login.
const TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);

/// JWT payload: account identity plus issue/expiry timestamps. Tokens are
/// stateless and cannot be revoked before `exp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, account_id: i64, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(TOKEN_TTL.as_secs() as i64);
        let claims = Claims {
            sub: account_id,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        // Default validation checks the HS256 signature and exp. Expiry is
        // a hard boundary: a token is invalid at exp, not exp plus leeway.
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(account_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Verified identity attached to a guarded request.
#[derive(Debug)]
pub struct AuthAccount {
    pub account_id: i64,
    pub email: String,
}

/// Access guard: extracts the bearer token from the Authorization header.
/// A missing or non-Bearer header is 401; a token that fails verification
/// (bad signature, malformed, expired) is 403. No role check happens here;
/// any valid token passes.
#[async_trait]
impl<S> FromRequestParts<S> for AuthAccount
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "token rejected");
                return Err(ApiError::Forbidden);
            }
        };

        Ok(AuthAccount {
            account_id: claims.sub,
            email: claims.email,
        })
    }
}
