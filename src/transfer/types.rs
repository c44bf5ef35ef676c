//! Operation requests and receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountStatus, Role};
use crate::core_types::{Amount, Email, Units};
use crate::ledger::{Transaction, TransactionKind, TrxId};
use crate::requests::{FloatRequest, RequestId, RequestKind, RequestStatus};

/// send-money input
#[derive(Debug, Clone, Deserialize)]
pub struct SendMoneyRequest {
    pub recipient_mobile: String,
    pub amount: Amount,
}

/// cash-in input (actor is the agent)
#[derive(Debug, Clone, Deserialize)]
pub struct CashInRequest {
    pub user_mobile: String,
    pub amount: Amount,
    pub pin: String,
}

/// cash-out input (actor is the user)
#[derive(Debug, Clone, Deserialize)]
pub struct CashOutRequest {
    pub agent_mobile: String,
    pub amount: Amount,
    pub pin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveMoneyRequest {
    pub request_id: RequestId,
    pub agent_email: Email,
}

/// Admin approval of a withdraw-request
///
/// `amount` is optional; when present it must equal the stored request amount.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveWithdrawRequest {
    pub request_id: RequestId,
    pub agent_email: Email,
    #[serde(default)]
    pub amount: Option<Amount>,
}

/// Success payload of every balance-moving operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub trx_id: TrxId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub charge: Amount,
    pub from: Email,
    pub to: Email,
    pub date: DateTime<Utc>,
}

impl From<Transaction> for TransferReceipt {
    fn from(trx: Transaction) -> Self {
        Self {
            trx_id: trx.trx_id,
            kind: trx.kind,
            amount: trx.amount,
            charge: trx.charge,
            from: trx.from,
            to: trx.to,
            date: trx.date,
        }
    }
}

/// Success payload of request-money / withdraw-request / reject-request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestReceipt {
    pub request_id: RequestId,
    pub kind: RequestKind,
    pub requested_by: Email,
    pub amount: Option<Amount>,
    pub status: RequestStatus,
}

impl From<&FloatRequest> for RequestReceipt {
    fn from(r: &FloatRequest) -> Self {
        Self {
            request_id: r.request_id,
            kind: r.kind,
            requested_by: r.requested_by.clone(),
            amount: r.amount,
            status: r.status,
        }
    }
}

/// Self-service balance view (no identity documents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub balance: Units,
    pub income: Units,
}

impl From<&Account> for BalanceView {
    fn from(a: &Account) -> Self {
        Self {
            email: a.email.clone(),
            name: a.name.clone(),
            role: a.role,
            status: a.status,
            balance: a.balance,
            income: a.income,
        }
    }
}

/// Admin dashboard totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemSummary {
    pub admin_balance: Units,
    pub system_balance: Units,
    pub total_user_balance: Units,
    pub total_agent_balance: Units,
    pub total_agent_income: Units,
    pub users: usize,
    pub agents: usize,
    pub pending_agents: usize,
}
