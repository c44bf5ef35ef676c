//! Transfer Engine
//!
//! Balance-moving operations and the float request workflow.
//!
//! # Operations
//!
//! | operation                | actor | fee           | ledger entry        |
//! |--------------------------|-------|---------------|---------------------|
//! | send-money               | user  | 5 if ≥ 100    | send-money          |
//! | cash-in (PIN)            | agent | none          | cash-in             |
//! | cash-out (PIN)           | user  | 1.5%          | cash-out            |
//! | request-money            | agent | -             | -                   |
//! | withdraw-request         | agent | -             | -                   |
//! | approve-money-request    | admin | -             | float-approval      |
//! | approve-withdraw-request | admin | -             | withdrawal-approval |
//!
//! # Safety Invariants
//!
//! 1. **Checked at commit**: balance sufficiency and participant standing are
//!    re-evaluated by the store under its lock, never trusted from the read
//! 2. **All or nothing**: balances, request transition and ledger entry are
//!    one commit
//! 3. **No retries**: conflicts are reported as `concurrency-conflict` and the
//!    caller decides

pub mod engine;
pub mod error;
pub mod types;


// Re-exports for convenience
pub use engine::{EngineConfig, TransferEngine, TransferResult};
pub use error::{ErrorKind, TransferError};
pub use types::{
    ApproveMoneyRequest, ApproveWithdrawRequest, BalanceView, CashInRequest, CashOutRequest,
    RequestReceipt, SendMoneyRequest, SystemSummary, TransferReceipt,
};
