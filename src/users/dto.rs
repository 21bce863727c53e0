use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo_types::Account;

/// Public shape of an account. Built from `Account` by dropping the hash.
#[derive(Debug, Serialize)]
pub struct AccountBody {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub phone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Account> for AccountBody {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            department: account.department,
            phone: account.phone,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Body for POST /users. Required strings default to empty so a missing
/// field and an empty field both fail validation the same way.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Body for PUT /users/:id. An absent or empty password keeps the stored
/// hash; absent role/department/phone reset to their defaults.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub password: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account: AccountBody,
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountBody>,
}
