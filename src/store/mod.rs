//! Account Store contract
//!
//! The store is the only shared mutable state of the ledger. Everything the
//! transfer engine writes goes through a single primitive, [`AccountStore::commit`],
//! which applies a [`CommitPlan`] atomically:
//!
//! 1. every [`Precondition`] is re-evaluated against the *current* stored
//!    state (commit time, not the engine's earlier read),
//! 2. every resulting `balance` / `income` must stay non-negative,
//! 3. an optional request transition must still find the expected status,
//! 4. then all deltas, inserts and the ledger entry are written together,
//!    or nothing is.
//!
//! A plain read-then-unconditionally-increment sequence is never used.
//!
//! # Implementations
//! - [`MemoryStore`]: single critical section over in-process maps
//! - [`PgStore`]: PostgreSQL transaction with `SELECT … FOR UPDATE` row locks
//!   taken in email order, preconditions checked after the locks are held

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::account::{Account, AccountFilter, AccountStatus, Role};
use crate::core_types::{Email, Units};
use crate::ledger::{HistoryQuery, Transaction};
use crate::requests::{FloatRequest, RequestId, RequestKind, RequestStatus, RequestTransition};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Point-lookup key: every account is reachable by each of its unique fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKey<'a> {
    Email(&'a str),
    Mobile(&'a str),
    Nid(&'a str),
}

/// Unique account field, reported on duplicate inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Email,
    Mobile,
    Nid,
    /// Only one admin account may exist
    Admin,
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UniqueKey::Email => "email",
            UniqueKey::Mobile => "mobile",
            UniqueKey::Nid => "nid",
            UniqueKey::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

/// Condition the stored state must satisfy at commit time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// `balance >= required`
    Funds { email: Email, required: Units },
    /// Role and status are still what the admissibility check saw
    Standing {
        email: Email,
        role: Role,
        status: AccountStatus,
    },
}

impl Precondition {
    pub fn email(&self) -> &str {
        match self {
            Precondition::Funds { email, .. } | Precondition::Standing { email, .. } => email,
        }
    }

    /// Evaluate against a stored account
    pub fn holds(&self, account: &Account) -> bool {
        match self {
            Precondition::Funds { required, .. } => account.balance >= *required,
            Precondition::Standing { role, status, .. } => account.has_standing(*role, *status),
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::Funds { email, required } => {
                write!(f, "{} balance >= {}", email, required)
            }
            Precondition::Standing {
                email,
                role,
                status,
            } => write!(f, "{} is {} {}", email, status, role),
        }
    }
}

/// Signed change to one account's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceDelta {
    pub balance: Units,
    pub income: Units,
    pub system_balance: Units,
}

impl BalanceDelta {
    fn merge(&mut self, other: BalanceDelta) -> Option<()> {
        self.balance = self.balance.checked_add(other.balance)?;
        self.income = self.income.checked_add(other.income)?;
        self.system_balance = self.system_balance.checked_add(other.system_balance)?;
        Some(())
    }

    /// Apply to an account copy; `None` on overflow
    pub fn apply(&self, account: &Account) -> Option<Account> {
        let mut next = account.clone();
        next.balance = next.balance.checked_add(self.balance)?;
        next.income = next.income.checked_add(self.income)?;
        next.system_balance = next.system_balance.checked_add(self.system_balance)?;
        Some(next)
    }
}

/// Everything one operation writes, applied atomically by [`AccountStore::commit`]
#[derive(Debug, Clone, Default)]
pub struct CommitPlan {
    pub preconditions: Vec<Precondition>,
    deltas: Vec<(Email, BalanceDelta)>,
    pub new_account: Option<Account>,
    pub new_request: Option<FloatRequest>,
    pub request_transition: Option<RequestTransition>,
    pub transaction: Option<Transaction>,
}

impl CommitPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    pub fn require_funds(self, email: &str, required: Units) -> Self {
        self.require(Precondition::Funds {
            email: email.to_string(),
            required,
        })
    }

    pub fn require_standing(self, account: &Account) -> Self {
        self.require(Precondition::Standing {
            email: account.email.clone(),
            role: account.role,
            status: account.status,
        })
    }

    pub fn delta(mut self, email: &str, delta: BalanceDelta) -> Self {
        self.deltas.push((email.to_string(), delta));
        self
    }

    /// Change `balance` by `amount` (negative debits)
    pub fn balance(self, email: &str, amount: Units) -> Self {
        self.delta(
            email,
            BalanceDelta {
                balance: amount,
                ..Default::default()
            },
        )
    }

    pub fn income(self, email: &str, amount: Units) -> Self {
        self.delta(
            email,
            BalanceDelta {
                income: amount,
                ..Default::default()
            },
        )
    }

    pub fn system_balance(self, email: &str, amount: Units) -> Self {
        self.delta(
            email,
            BalanceDelta {
                system_balance: amount,
                ..Default::default()
            },
        )
    }

    pub fn insert_account(mut self, account: Account) -> Self {
        self.new_account = Some(account);
        self
    }

    pub fn insert_request(mut self, request: FloatRequest) -> Self {
        self.new_request = Some(request);
        self
    }

    pub fn transition(mut self, transition: RequestTransition) -> Self {
        self.request_transition = Some(transition);
        self
    }

    pub fn record(mut self, transaction: Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    /// Deltas folded per account, in email order (the lock order)
    pub fn merged_deltas(&self) -> Result<BTreeMap<Email, BalanceDelta>, StoreError> {
        let mut merged: BTreeMap<Email, BalanceDelta> = BTreeMap::new();
        for (email, delta) in &self.deltas {
            merged
                .entry(email.clone())
                .or_default()
                .merge(*delta)
                .ok_or_else(|| StoreError::Overflow(email.clone()))?;
        }
        Ok(merged)
    }

    /// Every existing account the plan reads or writes, sorted and deduplicated
    pub fn touched_accounts(&self) -> Vec<Email> {
        let mut emails: Vec<Email> = self
            .preconditions
            .iter()
            .map(|p| p.email().to_string())
            .chain(self.deltas.iter().map(|(e, _)| e.clone()))
            .collect();
        emails.sort();
        emails.dedup();
        emails
    }
}

/// Store errors
///
/// `Unavailable` is the only infrastructure failure; everything else is a
/// business outcome the engine maps to a typed rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Precondition failed: {0}")]
    PreconditionFailed(Precondition),

    #[error("Balance of {0} would become negative")]
    NegativeBalance(Email),

    #[error("Duplicate {0}")]
    Duplicate(UniqueKey),

    #[error("Account not found: {0}")]
    AccountNotFound(Email),

    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Request {id} is {actual}, expected {expected}")]
    RequestState {
        id: RequestId,
        expected: RequestStatus,
        actual: RequestStatus,
    },

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Arithmetic overflow on {0}")]
    Overflow(Email),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable keyed store for accounts, float requests and the ledger
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    async fn find_account(&self, key: AccountKey<'_>) -> Result<Option<Account>, StoreError>;

    /// The single well-known admin account
    async fn find_admin(&self) -> Result<Option<Account>, StoreError>;

    async fn list_accounts(&self, filter: AccountFilter) -> Result<Vec<Account>, StoreError>;

    /// Atomic CAS on account status
    ///
    /// Returns true if the status was one of `expected` and is now `next`.
    async fn set_status_if(
        &self,
        email: &str,
        expected: &[AccountStatus],
        next: AccountStatus,
    ) -> Result<bool, StoreError>;

    async fn find_request(&self, id: RequestId) -> Result<Option<FloatRequest>, StoreError>;

    async fn list_requests(
        &self,
        kind: Option<RequestKind>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<FloatRequest>, StoreError>;

    /// Ledger entries, newest first
    async fn transactions(&self, query: &HistoryQuery) -> Result<Vec<Transaction>, StoreError>;

    /// Apply a plan atomically (see module docs)
    async fn commit(&self, plan: CommitPlan) -> Result<(), StoreError>;
}
