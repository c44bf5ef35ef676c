//! Transaction identifiers and creation timestamps

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Salt bytes mixed into every identifier
const SALT_LEN: usize = 16;

/// Digest bytes kept in the identifier (32 hex chars)
const ID_LEN: usize = 16;

/// Unguessable transaction identifier
///
/// `hex(sha256(salt || timestamp_micros))[..32]` with a fresh random salt per
/// call. Uniqueness comes from the salt, so two entries stamped with the same
/// microsecond still get distinct ids. Ids are not sequential and cannot be
/// enumerated from the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrxId(String);

impl TrxId {
    /// Derive a new identifier for an entry created at `date`
    pub fn generate(date: DateTime<Utc>) -> Self {
        let salt: [u8; SALT_LEN] = rand::random();
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(date.timestamp_micros().to_be_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..ID_LEN]))
    }

    /// Wrap a stored identifier (no validation beyond non-empty)
    pub fn from_stored(id: String) -> Option<Self> {
        if id.is_empty() { None } else { Some(Self(id)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for TrxId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Strictly increasing creation timestamps (microsecond resolution)
///
/// Two calls never return the same instant, even within one microsecond or
/// across a backwards wall-clock step.
#[derive(Debug, Default)]
pub struct LedgerClock {
    last_micros: AtomicI64,
}

impl LedgerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> DateTime<Utc> {
        let mut last = self.last_micros.load(Ordering::Acquire);
        loop {
            let now = Utc::now().timestamp_micros();
            let candidate = now.max(last + 1);
            match self.last_micros.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return DateTime::from_timestamp_micros(candidate).unwrap_or_else(Utc::now);
                }
                Err(actual) => last = actual,
            }
        }
    }
}
