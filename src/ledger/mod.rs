//! Transaction Ledger
//!
//! Append-only log of completed balance-affecting operations. An entry is
//! written exactly once, inside the same atomic commit as the balance
//! mutations of its operation (see [`crate::store::CommitPlan`]), and is never
//! updated or deleted afterwards.
//!
//! # Entry semantics per kind
//!
//! | kind                | amount              | charge | from   | to     |
//! |---------------------|---------------------|--------|--------|--------|
//! | send-money          | principal           | fee    | sender | user   |
//! | cash-in             | principal           | 0      | agent  | user   |
//! | cash-out            | principal (no fee)  | fee    | user   | agent  |
//! | float-approval      | top-up amount       | 0      | admin  | agent  |
//! | withdrawal-approval | withdrawn amount    | 0      | agent  | admin  |

pub mod trx_id;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::{Amount, Email};

pub use trx_id::{LedgerClock, TrxId};

/// Default cap on self-service history queries
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Ledger entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(i16)]
pub enum TransactionKind {
    SendMoney = 1,
    CashIn = 2,
    CashOut = 3,
    FloatApproval = 4,
    WithdrawalApproval = 5,
}

impl TransactionKind {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionKind::SendMoney),
            2 => Some(TransactionKind::CashIn),
            3 => Some(TransactionKind::CashOut),
            4 => Some(TransactionKind::FloatApproval),
            5 => Some(TransactionKind::WithdrawalApproval),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::SendMoney => "send-money",
            TransactionKind::CashIn => "cash-in",
            TransactionKind::CashOut => "cash-out",
            TransactionKind::FloatApproval => "float-approval",
            TransactionKind::WithdrawalApproval => "withdrawal-approval",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub trx_id: TrxId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub charge: Amount,
    pub from: Email,
    pub to: Email,
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Build a new entry; the identifier is derived from `date`
    pub fn new(
        kind: TransactionKind,
        amount: Amount,
        charge: Amount,
        from: impl Into<Email>,
        to: impl Into<Email>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            trx_id: TrxId::generate(date),
            kind,
            amount,
            charge,
            from: from.into(),
            to: to.into(),
            date,
        }
    }

    /// True if `email` is the sender or the receiver
    #[inline]
    pub fn involves(&self, email: &str) -> bool {
        self.from == email || self.to == email
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trx[{}] {} {} -> {} amount={} charge={}",
            self.trx_id, self.kind, self.from, self.to, self.amount, self.charge
        )
    }
}

/// Ledger read query: participant filter plus optional result cap.
///
/// Results are always newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub participant: Option<Email>,
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// Self-service view: one participant, bounded
    pub fn own(email: impl Into<Email>, limit: usize) -> Self {
        Self {
            participant: Some(email.into()),
            limit: Some(limit),
        }
    }

    /// Administrative audit: unbounded, optionally filtered
    pub fn audit(participant: Option<Email>) -> Self {
        Self {
            participant,
            limit: None,
        }
    }

    pub fn matches(&self, trx: &Transaction) -> bool {
        self.participant.as_deref().is_none_or(|p| trx.involves(p))
    }

    /// Apply the query to an in-memory slice of entries
    pub fn select<'a>(&self, entries: impl IntoIterator<Item = &'a Transaction>) -> Vec<Transaction> {
        let mut out: Vec<Transaction> = entries
            .into_iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}
