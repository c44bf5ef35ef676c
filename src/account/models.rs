//! Data models for ledger accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::{Email, Units};

/// Account role
///
/// IDs are the SMALLINT values stored in `accounts_tb.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Role {
    /// The single system account: collects fees, tracks float
    Admin = 1,
    /// Cash-in / cash-out point, earns commission on cash-out
    Agent = 2,
    /// Retail customer
    User = 3,
}

impl Role {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Agent),
            3 => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account status
///
/// Meaning is role-dependent: agents start `Pending` until an admin approves
/// them, users start `Active`, any non-admin account can become `Blocked`.
/// `Approved` is accepted when decoding stored rows but only `Active`
/// accounts pass admissibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum AccountStatus {
    Pending = 0,
    Active = 1,
    Blocked = 2,
    Rejected = 3,
    Approved = 4,
}

impl AccountStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(AccountStatus::Pending),
            1 => Some(AccountStatus::Active),
            2 => Some(AccountStatus::Blocked),
            3 => Some(AccountStatus::Rejected),
            4 => Some(AccountStatus::Approved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
            AccountStatus::Rejected => "rejected",
            AccountStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger account
///
/// Accounts are never deleted; they are archived through `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: Email,
    pub mobile: String,
    pub nid: String,
    pub name: String,
    pub role: Role,
    pub status: AccountStatus,
    /// Spendable balance, never negative
    pub balance: Units,
    /// Cumulative cash-out commission (agents only)
    pub income: Units,
    /// Net float injected into the system (admin only)
    pub system_balance: Units,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Role and status match in one check
    #[inline]
    pub fn has_standing(&self, role: Role, status: AccountStatus) -> bool {
        self.role == role && self.status == status
    }
}

/// Registration input for [`crate::transfer::TransferEngine::open_account`]
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub mobile: String,
    pub nid: String,
    pub name: String,
    pub role: Role,
}

/// Filtered multi-record lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

impl AccountFilter {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            status: None,
        }
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, account: &Account) -> bool {
        self.role.is_none_or(|r| r == account.role)
            && self.status.is_none_or(|s| s == account.status)
    }
}
