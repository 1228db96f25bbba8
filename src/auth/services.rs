use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::auth::{
    dto::{normalize_email, LoginRequest, RegisterRequest, UserProjection},
    errors::{AuthError, StoreError},
    password::PasswordHasher,
    repo::UserStore,
    repo_types::NewUser,
};

/// Creates user records with unique emails.
#[derive(Clone)]
pub struct UserRegistrar {
    hasher: PasswordHasher,
    users: Arc<dyn UserStore>,
}

impl UserRegistrar {
    pub fn new(hasher: PasswordHasher, users: Arc<dyn UserStore>) -> Self {
        Self { hasher, users }
    }

    #[instrument(skip_all, fields(email = %normalize_email(&req.email)))]
    pub async fn register(&self, req: RegisterRequest) -> Result<UserProjection, AuthError> {
        let email = normalize_email(&req.email);

        // Fast path only; the insert below is what enforces uniqueness.
        match self.users.find_by_email(&email).await {
            Ok(Some(_)) => {
                error!(email = %email, "email already registered");
                return Err(AuthError::DuplicateUser);
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "find_by_email failed");
                return Err(AuthError::Persistence(e));
            }
        }

        let password_hash = self.hasher.hash(&req.password).await.map_err(|e| {
            error!(error = %e, "hash_password failed");
            e
        })?;

        let new_user = NewUser {
            name: req.name.trim(),
            email: &email,
            password_hash: &password_hash,
            role: req.role.unwrap_or_default(),
        };
        let user = match self.users.insert(new_user).await {
            Ok(u) => u,
            Err(StoreError::ConstraintViolation(constraint)) => {
                error!(email = %email, constraint = %constraint, "email already registered");
                return Err(AuthError::DuplicateUser);
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                return Err(AuthError::Persistence(e));
            }
        };

        info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
        Ok(user.into())
    }
}

/// Checks login credentials against stored records. Never writes.
#[derive(Clone)]
pub struct Authenticator {
    hasher: PasswordHasher,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(hasher: PasswordHasher, users: Arc<dyn UserStore>) -> Self {
        Self { hasher, users }
    }

    #[instrument(skip_all, fields(email = %normalize_email(&req.email)))]
    pub async fn authenticate(&self, req: LoginRequest) -> Result<UserProjection, AuthError> {
        let email = normalize_email(&req.email);

        let user = match self.users.find_by_email(&email).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                self.hasher.verify_decoy(&req.password).await;
                warn!(email = %email, "login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "find_by_email failed");
                return Err(AuthError::Persistence(e));
            }
        };

        let ok = match self.hasher.verify(&req.password, &user.password_hash).await {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, user_id = %user.id, "stored credential could not be verified");
                return Err(e);
            }
        };

        if !ok {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(email = %user.email, "user logged in");
        Ok(user.into())
    }
}
