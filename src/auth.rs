//! Collaborator interfaces consumed by the transfer engine
//!
//! - [`Actor`]: the verified `(email, role)` supplied by the identity/session
//!   layer. The engine trusts it completely and performs no authentication.
//! - [`CredentialVerifier`]: PIN check for cash-in / cash-out. The engine only
//!   ever sees the boolean outcome.
//! - [`PinVault`]: argon2 implementation of the verifier, holding PHC hashes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt;
use thiserror::Error;

use crate::account::Role;
use crate::core_types::Email;

fn normalize_email(email: &str) -> Email {
    email.trim().to_lowercase()
}

/// Authenticated caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub email: Email,
    pub role: Role,
}

impl Actor {
    pub fn new(email: impl Into<Email>, role: Role) -> Self {
        Self {
            email: normalize_email(&email.into()),
            role,
        }
    }

    pub fn admin(email: impl Into<Email>) -> Self {
        Self::new(email, Role::Admin)
    }

    pub fn agent(email: impl Into<Email>) -> Self {
        Self::new(email, Role::Agent)
    }

    pub fn user(email: impl Into<Email>) -> Self {
        Self::new(email, Role::User)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.email, self.role)
    }
}

/// Credential collaborator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("PIN must be 4-6 digits")]
    InvalidPin,

    #[error("Hashing failed: {0}")]
    Hashing(String),

    #[error("Credential service unavailable: {0}")]
    Unavailable(String),
}

/// PIN verification for PIN-gated operations
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` for a wrong PIN or an account with no PIN enrolled
    async fn verify_pin(&self, account: &str, pin: &str) -> Result<bool, CredentialError>;
}

/// Argon2 PIN store keyed by account email
#[derive(Debug, Default)]
pub struct PinVault {
    hashes: DashMap<Email, String>,
}

impl PinVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(pin: &str) -> Result<(), CredentialError> {
        if (4..=6).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(CredentialError::InvalidPin)
        }
    }

    /// Hash and store (or replace) the PIN for `account`
    pub fn enroll(&self, account: &str, pin: &str) -> Result<(), CredentialError> {
        Self::validate(pin)?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();
        self.hashes.insert(normalize_email(account), hash);
        Ok(())
    }

    pub fn is_enrolled(&self, account: &str) -> bool {
        self.hashes.contains_key(&normalize_email(account))
    }
}

#[async_trait]
impl CredentialVerifier for PinVault {
    async fn verify_pin(&self, account: &str, pin: &str) -> Result<bool, CredentialError> {
        let Some(stored) = self
            .hashes
            .get(&normalize_email(account))
            .map(|h| h.value().clone())
        else {
            return Ok(false);
        };
        let parsed = PasswordHash::new(&stored)
            .map_err(|e| CredentialError::Hashing(format!("Invalid hash format: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_normalizes_email() {
        let actor = Actor::user("  Alice@Example.com ");
        assert_eq!(actor.email, "alice@example.com");
        assert_eq!(actor.role, Role::User);
        assert_eq!(actor.to_string(), "alice@example.com(user)");
    }

    #[tokio::test]
    async fn test_pin_vault_verify() {
        let vault = PinVault::new();
        vault.enroll("agent@x.com", "12345").unwrap();
        assert!(vault.is_enrolled("agent@x.com"));

        assert!(vault.verify_pin("agent@x.com", "12345").await.unwrap());
        assert!(!vault.verify_pin("agent@x.com", "54321").await.unwrap());
        assert!(!vault.verify_pin("other@x.com", "12345").await.unwrap());
    }

    #[tokio::test]
    async fn test_pin_vault_lookup_normalizes_key() {
        let vault = PinVault::new();
        vault.enroll(" Agent@X.com", "4321").unwrap();
        assert!(vault.is_enrolled("agent@x.com"));
        assert!(vault.is_enrolled("AGENT@x.com "));
        assert!(vault.verify_pin("Agent@X.COM", "4321").await.unwrap());
    }

    #[test]
    fn test_pin_format() {
        let vault = PinVault::new();
        assert_eq!(vault.enroll("a@x.com", "12"), Err(CredentialError::InvalidPin));
        assert_eq!(vault.enroll("a@x.com", "12ab"), Err(CredentialError::InvalidPin));
        assert_eq!(vault.enroll("a@x.com", "1234567"), Err(CredentialError::InvalidPin));
        assert!(vault.enroll("a@x.com", "1234").is_ok());
    }

    #[tokio::test]
    async fn test_reenroll_replaces() {
        let vault = PinVault::new();
        vault.enroll("a@x.com", "1111").unwrap();
        vault.enroll("a@x.com", "2222").unwrap();
        assert!(!vault.verify_pin("a@x.com", "1111").await.unwrap());
        assert!(vault.verify_pin("a@x.com", "2222").await.unwrap());
    }
}
