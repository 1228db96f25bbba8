pub mod dto;
pub mod errors;
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use dto::{normalize_email, LoginRequest, RegisterRequest, Role, UserProjection};
pub use errors::{AuthError, StoreError};
pub use password::{HashedCredential, PasswordHasher};
pub use repo::{PgUserStore, UserStore};
pub use services::{Authenticator, UserRegistrar};
