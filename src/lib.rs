//! Credential management: Argon2 password storage, registration with
//! unique emails, and login authentication over a pluggable user store.

pub mod auth;
pub mod config;
pub mod state;
pub mod telemetry;

pub use auth::{
    AuthError, Authenticator, HashedCredential, LoginRequest, PasswordHasher, RegisterRequest,
    Role, StoreError, UserProjection, UserRegistrar, UserStore,
};
