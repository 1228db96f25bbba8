use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::errors::StoreError;
use crate::auth::repo_types::{NewUser, User, UserRow};

/// Persistence boundary for user records.
///
/// `insert` must reject a duplicate email atomically and report it as
/// [`StoreError::ConstraintViolation`]; callers rely on that, not on a
/// prior `find_by_email`, for uniqueness.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, new_user: NewUser<'_>) -> Result<User, StoreError>;
}

/// Postgres-backed store over the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("users_email_key").to_string();
            return StoreError::ConstraintViolation(constraint);
        }
    }
    StoreError::Database(err)
}

fn into_user(row: UserRow) -> Result<User, StoreError> {
    User::try_from(row).map_err(|e| StoreError::Unavailable(e.to_string()))
}

#[async_trait]
impl UserStore for PgUserStore {
    /// Find a user by (already normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    /// Create a new user with hashed password.
    async fn insert(&self, new_user: NewUser<'_>) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.password_hash.as_str())
        .bind(new_user.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;
        into_user(row)
    }
}
