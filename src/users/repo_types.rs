use sqlx::FromRow;
use time::OffsetDateTime;

/// Account row in the users table. Deliberately not Serialize: the stored
/// hash must never reach a response body, so handlers go through
/// `dto::AccountBody` instead.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub department: String,
    pub phone: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields for an insert; the store assigns id and timestamps.
#[derive(Debug)]
pub struct NewAccount<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub department: &'a str,
    pub phone: &'a str,
}

/// Fields for an update. `password_hash` is None when the stored hash
/// should be kept.
#[derive(Debug)]
pub struct AccountChanges<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: &'a str,
    pub department: &'a str,
    pub phone: &'a str,
}
