use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::users::repo_types::{Account, AccountChanges, NewAccount};

impl Account {
    /// Exact-match lookup; serves both login and email uniqueness checks.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> sqlx::Result<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, department, phone, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> sqlx::Result<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, department, phone, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Inserts a new account. The UNIQUE constraint on email surfaces as a
    /// database error when a racing writer got there first.
    pub async fn create(db: &SqlitePool, new: NewAccount<'_>) -> sqlx::Result<Account> {
        let now = OffsetDateTime::now_utc();
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (name, email, password_hash, role, department, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, email, password_hash, role, department, phone, created_at, updated_at
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role)
        .bind(new.department)
        .bind(new.phone)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
    }

    /// Overwrites the mutable fields and refreshes updated_at. The stored
    /// password hash is kept unless a replacement is supplied.
    pub async fn update(
        db: &SqlitePool,
        id: i64,
        changes: AccountChanges<'_>,
    ) -> sqlx::Result<Account> {
        let now = OffsetDateTime::now_utc();
        match changes.password_hash {
            Some(hash) => {
                sqlx::query_as::<_, Account>(
                    r#"
                    UPDATE users
                    SET name = ?, email = ?, password_hash = ?, role = ?, department = ?, phone = ?, updated_at = ?
                    WHERE id = ?
                    RETURNING id, name, email, password_hash, role, department, phone, created_at, updated_at
                    "#,
                )
                .bind(changes.name)
                .bind(changes.email)
                .bind(hash)
                .bind(changes.role)
                .bind(changes.department)
                .bind(changes.phone)
                .bind(now)
                .bind(id)
                .fetch_one(db)
                .await
            }
            None => {
                sqlx::query_as::<_, Account>(
                    r#"
                    UPDATE users
                    SET name = ?, email = ?, role = ?, department = ?, phone = ?, updated_at = ?
                    WHERE id = ?
                    RETURNING id, name, email, password_hash, role, department, phone, created_at, updated_at
                    "#,
                )
                .bind(changes.name)
                .bind(changes.email)
                .bind(changes.role)
                .bind(changes.department)
                .bind(changes.phone)
                .bind(now)
                .bind(id)
                .fetch_one(db)
                .await
            }
        }
    }

    /// Hard delete; reports how many rows went away so callers can detect
    /// a missing id.
    pub async fn delete(db: &SqlitePool, id: i64) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Newest accounts first.
    pub async fn list(db: &SqlitePool) -> sqlx::Result<Vec<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, department, phone, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await
    }
}
