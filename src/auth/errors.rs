use thiserror::Error;

/// Failures surfaced by a [`UserStore`](crate::auth::repo::UserStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write would break a declared invariant, e.g. the unique email index.
    #[error("constraint violated: {0}")]
    ConstraintViolation(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    DuplicateUser,
    /// Unknown email and wrong password both land here, with no payload.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("stored credential is unusable: {0}")]
    Verification(String),
    #[error("persistence failure: {0}")]
    Persistence(#[source] StoreError),
}

impl AuthError {
    /// Server-side faults, as opposed to outcomes the caller caused.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Hashing(_) | AuthError::Verification(_) | AuthError::Persistence(_)
        )
    }
}
