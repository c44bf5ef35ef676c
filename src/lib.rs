//! EasyCash - Mobile-Money Ledger Core
//!
//! Balance-transfer and fee-settlement engine for user / agent / admin
//! accounts.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier and amount aliases
//! - [`account`] - Account records and identity validation
//! - [`fee`] - Fee policy (basis points, round-half-up)
//! - [`ledger`] - Append-only transaction ledger and `TrxId` generation
//! - [`requests`] - Float request queue (money / withdraw requests)
//! - [`store`] - Account store contract, in-memory and PostgreSQL stores
//! - [`auth`] - Actor identity and PIN verification collaborators
//! - [`transfer`] - Transfer engine
//! - [`db`] - PostgreSQL connection pool
//! - [`config`] / [`logging`] - Runtime configuration and tracing setup

// Core types - must be first!
pub mod core_types;

pub mod account;
pub mod auth;
pub mod config;
pub mod db;
pub mod fee;
pub mod ledger;
pub mod logging;
pub mod requests;
pub mod store;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountFilter, AccountStatus, NewAccount, Role};
pub use auth::{Actor, CredentialVerifier, PinVault};
pub use core_types::{Amount, Email, Units};
pub use fee::{FeeQuote, FeeSchedule};
pub use ledger::{Transaction, TransactionKind, TrxId};
pub use requests::{FloatRequest, RequestId, RequestKind, RequestStatus};
pub use store::{AccountStore, CommitPlan, MemoryStore, PgStore, StoreError};
pub use transfer::{EngineConfig, TransferEngine, TransferError};
