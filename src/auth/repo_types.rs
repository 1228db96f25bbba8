use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::{Role, UnknownRole, UserProjection};
use crate::auth::password::HashedCredential;

/// User record as the store keeps it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: HashedCredential, // Debug output is redacted
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn projection(&self) -> UserProjection {
        UserProjection {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

impl From<User> for UserProjection {
    fn from(user: User) -> Self {
        UserProjection {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Fields supplied on insert; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a HashedCredential,
    pub role: Role,
}

/// Raw `users` row.
#[derive(FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownRole;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: HashedCredential::new(row.password_hash),
            role: row.role.parse()?,
            created_at: row.created_at,
        })
    }
}
