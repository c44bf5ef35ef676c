//! Float request queue
//!
//! Agent-to-admin requests: a money-request asks for a standard float top-up,
//! a withdraw-request asks to cash a given amount back out of the system.
//!
//! # State Machine
//!
//! ```text
//! PENDING → APPROVED   (terminal, balance mutation + ledger entry)
//!    ↓
//! REJECTED             (terminal, no mutation)
//! ```
//!
//! The approval transition is applied inside the same atomic commit as its
//! balance mutation and only succeeds while the stored status is still
//! `PENDING`, so a request can never be approved twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core_types::{Amount, Email};

/// Request ID - ULID-based unique identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for RequestId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(i16)]
pub enum RequestKind {
    /// Float top-up (fixed amount)
    Money = 1,
    /// Agent withdrawal (requested amount)
    Withdraw = 2,
}

impl RequestKind {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(RequestKind::Money),
            2 => Some(RequestKind::Withdraw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Money => "money-request",
            RequestKind::Withdraw => "withdraw-request",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request status
///
/// Terminal states: APPROVED (10), REJECTED (-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum RequestStatus {
    Pending = 0,
    Approved = 10,
    Rejected = -10,
}

impl RequestStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Allowed transitions of the request state machine
    #[inline]
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }

    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(RequestStatus::Pending),
            10 => Some(RequestStatus::Approved),
            -10 => Some(RequestStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Float or withdraw request record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatRequest {
    pub request_id: RequestId,
    pub kind: RequestKind,
    pub requested_by: Email,
    /// Requested amount; `None` for money-requests (fixed top-up)
    pub amount: Option<Amount>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl FloatRequest {
    /// New pending money-request
    pub fn money(requested_by: impl Into<Email>) -> Self {
        Self::pending(RequestKind::Money, requested_by.into(), None)
    }

    /// New pending withdraw-request
    pub fn withdraw(requested_by: impl Into<Email>, amount: Amount) -> Self {
        Self::pending(RequestKind::Withdraw, requested_by.into(), Some(amount))
    }

    fn pending(kind: RequestKind, requested_by: Email, amount: Option<Amount>) -> Self {
        Self {
            request_id: RequestId::new(),
            kind,
            requested_by,
            amount,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }
}

impl fmt::Display for FloatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Request[{}] {} by={} amount={:?} status={}",
            self.request_id, self.kind, self.requested_by, self.amount, self.status
        )
    }
}

/// Guarded status change applied atomically with a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTransition {
    pub request_id: RequestId,
    pub from: RequestStatus,
    pub to: RequestStatus,
}

impl RequestTransition {
    pub fn approve(request_id: RequestId) -> Self {
        Self {
            request_id,
            from: RequestStatus::Pending,
            to: RequestStatus::Approved,
        }
    }

    pub fn reject(request_id: RequestId) -> Self {
        Self {
            request_id,
            from: RequestStatus::Pending,
            to: RequestStatus::Rejected,
        }
    }

    /// Whether a request currently in `current` may take this transition
    pub fn allows(&self, current: RequestStatus) -> bool {
        current == self.from && current.can_transition_to(self.to)
    }
}
