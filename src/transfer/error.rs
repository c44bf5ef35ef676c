//! Transfer Error Types
//!
//! Every rejection carries a stable machine-readable [`code`](TransferError::code)
//! and belongs to exactly one [`ErrorKind`]. Only infrastructure failures are
//! fatal; everything else is a business rejection returned before any write.

use thiserror::Error;

use crate::account::Role;
use crate::auth::CredentialError;
use crate::requests::RequestId;
use crate::store::{Precondition, StoreError, UniqueKey};

/// Rejection taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StateConflict,
    InsufficientFunds,
    CredentialMismatch,
    ConcurrencyConflict,
    Infrastructure,
}

/// Transfer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Amount would cause overflow")]
    Overflow,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Counterparty Errors ===
    #[error("Recipient not found")]
    InvalidRecipient,

    #[error("Recipient is not a user account")]
    RecipientNotUser,

    #[error("Recipient account is not active")]
    RecipientInactive,

    #[error("Cannot send money to yourself")]
    SelfTransfer,

    #[error("Target user not found or not an active user")]
    InvalidUser,

    #[error("Target agent not found or not an active agent")]
    InvalidAgent,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    // === Actor Errors ===
    #[error("Operation requires the {0} role")]
    Forbidden(Role),

    #[error("Actor account is not active")]
    ActorInactive,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("PIN mismatch")]
    PinMismatch,

    // === Registration Errors ===
    #[error("An account with this {0} already exists")]
    Duplicate(UniqueKey),

    // === Request Queue Errors ===
    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Request does not match: {0}")]
    RequestMismatch(String),

    #[error("Invalid state transition: {0}")]
    StateConflict(String),

    // === System Errors ===
    #[error("Concurrent update conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Credential service unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Internal system error: {0}")]
    Internal(String),
}

impl TransferError {
    /// Reason code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "invalid-amount",
            TransferError::Overflow => "overflow",
            TransferError::InvalidInput(_) => "invalid-input",
            TransferError::InvalidRecipient => "invalid-recipient",
            TransferError::RecipientNotUser => "recipient-not-user",
            TransferError::RecipientInactive => "recipient-inactive",
            TransferError::SelfTransfer => "self-transfer",
            TransferError::InvalidUser => "invalid-user",
            TransferError::InvalidAgent => "invalid-agent",
            TransferError::AccountNotFound(_) => "account-not-found",
            TransferError::Forbidden(_) => "forbidden",
            TransferError::ActorInactive => "actor-inactive",
            TransferError::InsufficientBalance => "insufficient-balance",
            TransferError::PinMismatch => "pin-mismatch",
            TransferError::Duplicate(UniqueKey::Email) => "duplicate-email",
            TransferError::Duplicate(UniqueKey::Mobile) => "duplicate-mobile",
            TransferError::Duplicate(UniqueKey::Nid) => "duplicate-nid",
            TransferError::Duplicate(UniqueKey::Admin) => "duplicate-admin",
            TransferError::RequestNotFound(_) => "request-not-found",
            TransferError::RequestMismatch(_) => "request-mismatch",
            TransferError::StateConflict(_) => "state-conflict",
            TransferError::ConcurrencyConflict(_) => "concurrency-conflict",
            TransferError::StorageUnavailable(_) => "storage-unavailable",
            TransferError::CredentialUnavailable(_) => "credential-unavailable",
            TransferError::Internal(_) => "internal-error",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidAmount
            | TransferError::Overflow
            | TransferError::InvalidInput(_) => ErrorKind::Validation,
            TransferError::InvalidRecipient
            | TransferError::InvalidUser
            | TransferError::InvalidAgent
            | TransferError::AccountNotFound(_)
            | TransferError::RequestNotFound(_) => ErrorKind::NotFound,
            TransferError::RecipientNotUser
            | TransferError::RecipientInactive
            | TransferError::SelfTransfer
            | TransferError::Forbidden(_)
            | TransferError::ActorInactive
            | TransferError::Duplicate(_)
            | TransferError::RequestMismatch(_)
            | TransferError::StateConflict(_) => ErrorKind::StateConflict,
            TransferError::InsufficientBalance => ErrorKind::InsufficientFunds,
            TransferError::PinMismatch => ErrorKind::CredentialMismatch,
            TransferError::ConcurrencyConflict(_) => ErrorKind::ConcurrencyConflict,
            TransferError::StorageUnavailable(_)
            | TransferError::CredentialUnavailable(_)
            | TransferError::Internal(_) => ErrorKind::Infrastructure,
        }
    }

    /// The caller may retry the same call unchanged
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ConcurrencyConflict
    }

    /// Infrastructure failure rather than a business rejection
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

impl From<StoreError> for TransferError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::PreconditionFailed(Precondition::Funds { .. })
            | StoreError::NegativeBalance(_) => TransferError::InsufficientBalance,
            StoreError::PreconditionFailed(p @ Precondition::Standing { .. }) => {
                TransferError::StateConflict(format!("{} no longer holds", p))
            }
            StoreError::Duplicate(key) => TransferError::Duplicate(key),
            StoreError::AccountNotFound(email) => TransferError::AccountNotFound(email),
            StoreError::RequestNotFound(id) => TransferError::RequestNotFound(id),
            StoreError::RequestState { id, actual, .. } => {
                TransferError::StateConflict(format!("request {} is already {}", id, actual))
            }
            StoreError::Conflict(msg) => TransferError::ConcurrencyConflict(msg),
            StoreError::Overflow(_) => TransferError::Overflow,
            StoreError::Corrupt(msg) => TransferError::Internal(msg),
            StoreError::Unavailable(msg) => TransferError::StorageUnavailable(msg),
        }
    }
}

impl From<CredentialError> for TransferError {
    fn from(e: CredentialError) -> Self {
        match e {
            // A malformed PIN can never match
            CredentialError::InvalidPin => TransferError::PinMismatch,
            CredentialError::Hashing(msg) => TransferError::Internal(msg),
            CredentialError::Unavailable(msg) => TransferError::CredentialUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::RequestStatus;

    #[test]
    fn test_error_codes() {
        assert_eq!(TransferError::InvalidRecipient.code(), "invalid-recipient");
        assert_eq!(TransferError::InvalidUser.code(), "invalid-user");
        assert_eq!(TransferError::InsufficientBalance.code(), "insufficient-balance");
        assert_eq!(TransferError::PinMismatch.code(), "pin-mismatch");
        assert_eq!(
            TransferError::Duplicate(UniqueKey::Mobile).code(),
            "duplicate-mobile"
        );
        assert_eq!(
            TransferError::StateConflict("x".into()).code(),
            "state-conflict"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(TransferError::InvalidAmount.kind(), ErrorKind::Validation);
        assert_eq!(TransferError::InvalidAgent.kind(), ErrorKind::NotFound);
        assert_eq!(TransferError::SelfTransfer.kind(), ErrorKind::StateConflict);
        assert_eq!(
            TransferError::InsufficientBalance.kind(),
            ErrorKind::InsufficientFunds
        );
        assert_eq!(TransferError::PinMismatch.kind(), ErrorKind::CredentialMismatch);
    }

    #[test]
    fn test_retryable_and_fatal() {
        let conflict = TransferError::ConcurrencyConflict("deadlock".into());
        assert!(conflict.is_retryable());
        assert!(!conflict.is_fatal());

        let outage = TransferError::StorageUnavailable("down".into());
        assert!(outage.is_fatal());
        assert!(!outage.is_retryable());

        assert!(!TransferError::InsufficientBalance.is_retryable());
        assert!(!TransferError::InsufficientBalance.is_fatal());
    }

    #[test]
    fn test_from_store_error() {
        let funds = StoreError::PreconditionFailed(Precondition::Funds {
            email: "a@x.com".into(),
            required: 10,
        });
        assert_eq!(
            TransferError::from(funds),
            TransferError::InsufficientBalance
        );
        assert_eq!(
            TransferError::from(StoreError::NegativeBalance("a@x.com".into())),
            TransferError::InsufficientBalance
        );

        let id = RequestId::new();
        let err = TransferError::from(StoreError::RequestState {
            id,
            expected: RequestStatus::Pending,
            actual: RequestStatus::Approved,
        });
        assert_eq!(err.code(), "state-conflict");

        assert!(TransferError::from(StoreError::Conflict("40001".into())).is_retryable());
        assert!(TransferError::from(StoreError::Unavailable("io".into())).is_fatal());
    }

    #[test]
    fn test_from_credential_error() {
        assert_eq!(
            TransferError::from(CredentialError::InvalidPin),
            TransferError::PinMismatch
        );
        assert!(TransferError::from(CredentialError::Unavailable("x".into())).is_fatal());
    }
}
