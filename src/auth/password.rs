use std::fmt;
use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::auth::errors::AuthError;

/// PHC-formatted Argon2 hash. Salt and cost parameters travel inside the string.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedCredential(<redacted>)")
    }
}

/// Argon2id hashing and verification.
///
/// New hashes use the configured params. Verification reads the params
/// embedded in the stored hash, so raising the cost never locks out
/// existing users.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    decoy: Arc<OnceLock<HashedCredential>>,
}

impl PasswordHasher {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            decoy: Arc::new(OnceLock::new()),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash_blocking(&self, plain: &str) -> Result<HashedCredential, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AuthError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(HashedCredential(hash))
    }

    /// `Ok(false)` means the password is wrong; `Err` means the stored value is unusable.
    pub fn verify_blocking(&self, plain: &str, stored: &HashedCredential) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored.as_str()).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            AuthError::Verification(e.to_string())
        })?;
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "argon2 verify_password error");
                Err(AuthError::Verification(e.to_string()))
            }
        }
    }

    /// Hashes on the blocking pool so slow Argon2 runs don't stall the runtime.
    pub async fn hash(&self, plain: &str) -> Result<HashedCredential, AuthError> {
        let hasher = self.clone();
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&plain))
            .await
            .map_err(|e| {
                error!(error = %e, "hash worker failed");
                AuthError::Hashing(e.to_string())
            })?
    }

    pub async fn verify(&self, plain: &str, stored: &HashedCredential) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let plain = plain.to_owned();
        let stored = stored.clone();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&plain, &stored))
            .await
            .map_err(|e| {
                error!(error = %e, "verify worker failed");
                AuthError::Verification(e.to_string())
            })?
    }

    /// Burns one verification against a throwaway hash. Used when the account
    /// doesn't exist so both login failure paths cost the same.
    pub(crate) async fn verify_decoy(&self, plain: &str) {
        let hasher = self.clone();
        let plain = plain.to_owned();
        let _ = tokio::task::spawn_blocking(move || {
            let decoy = match hasher.decoy.get() {
                Some(h) => h.clone(),
                None => match hasher.hash_blocking("authcore-decoy-credential") {
                    Ok(h) => hasher.decoy.get_or_init(|| h).clone(),
                    Err(_) => return,
                },
            };
            let _ = hasher.verify_blocking(&plain, &decoy);
        })
        .await;
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(Params::new(1024, 1, 1, None).expect("valid test params"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = cheap_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash_blocking(password).expect("hashing should succeed");
        assert!(hasher.verify_blocking(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = cheap_hasher();
        let hash = hasher
            .hash_blocking("correct-horse-battery-staple")
            .expect("hashing should succeed");
        assert!(!hasher
            .verify_blocking("wrong-password", &hash)
            .expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let hasher = cheap_hasher();
        let a = hasher.hash_blocking("secret123").expect("hash a");
        let b = hasher.hash_blocking("secret123").expect("hash b");
        assert_ne!(a, b);
        assert!(hasher.verify_blocking("secret123", &a).unwrap());
        assert!(hasher.verify_blocking("secret123", &b).unwrap());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_blocking("plaintext-marker").unwrap();
        assert!(!hash.as_str().contains("plaintext-marker"));
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert_eq!(format!("{:?}", hash), "HashedCredential(<redacted>)");
    }

    #[test]
    fn empty_and_unicode_passwords_hash() {
        let hasher = cheap_hasher();
        for pw in ["", "пароль-密码-🔑"] {
            let hash = hasher.hash_blocking(pw).expect("content never fails hashing");
            assert!(hasher.verify_blocking(pw, &hash).unwrap());
        }
    }

    #[test]
    fn verify_accepts_hashes_from_other_cost_settings() {
        let old = PasswordHasher::new(Params::new(512, 1, 1, None).unwrap());
        let new = PasswordHasher::new(Params::new(2048, 2, 1, None).unwrap());
        let hash = old.hash_blocking("legacy-pass").unwrap();
        assert!(new.verify_blocking("legacy-pass", &hash).unwrap());
        assert!(!new.verify_blocking("other-pass", &hash).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let hasher = cheap_hasher();
        let err = hasher
            .verify_blocking("anything", &HashedCredential::new("not-a-valid-hash"))
            .unwrap_err();
        assert!(matches!(err, AuthError::Verification(_)));
    }

    #[test]
    fn verify_errors_on_unsupported_algorithm() {
        let hasher = cheap_hasher();
        let stored = HashedCredential::new("$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA");
        let err = hasher.verify_blocking("anything", &stored).unwrap_err();
        assert!(matches!(err, AuthError::Verification(_)));
    }

    #[tokio::test]
    async fn async_hash_and_verify() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("async-pass").await.expect("hash");
        assert!(hasher.verify("async-pass", &hash).await.expect("verify"));
        assert!(!hasher.verify("nope", &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn decoy_verification_initializes_once() {
        let hasher = cheap_hasher();
        hasher.verify_decoy("x").await;
        let first = hasher.decoy.get().cloned().expect("decoy cached");
        hasher.verify_decoy("y").await;
        assert_eq!(hasher.decoy.get(), Some(&first));
    }
}
