//! In-memory account store
//!
//! All state lives behind one mutex; `commit` validates the whole plan and
//! then applies it inside a single critical section, which gives the same
//! all-or-nothing, checked-at-commit-time semantics as the PostgreSQL store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::error;

use super::{AccountKey, AccountStore, CommitPlan, StoreError, UniqueKey};
use crate::account::{Account, AccountFilter, AccountStatus, Role};
use crate::core_types::Email;
use crate::ledger::{HistoryQuery, Transaction, TrxId};
use crate::requests::{FloatRequest, RequestId, RequestKind, RequestStatus};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Email, Account>,
    by_mobile: HashMap<String, Email>,
    by_nid: HashMap<String, Email>,
    requests: HashMap<RequestId, FloatRequest>,
    ledger: Vec<Transaction>,
    trx_ids: HashSet<TrxId>,
}

impl State {
    fn resolve(&self, key: AccountKey<'_>) -> Option<&Account> {
        match key {
            AccountKey::Email(email) => self.accounts.get(email),
            AccountKey::Mobile(mobile) => self
                .by_mobile
                .get(mobile)
                .and_then(|e| self.accounts.get(e)),
            AccountKey::Nid(nid) => self.by_nid.get(nid).and_then(|e| self.accounts.get(e)),
        }
    }

    fn check_unique(&self, account: &Account) -> Result<(), StoreError> {
        if self.accounts.contains_key(&account.email) {
            return Err(StoreError::Duplicate(UniqueKey::Email));
        }
        if self.by_mobile.contains_key(&account.mobile) {
            return Err(StoreError::Duplicate(UniqueKey::Mobile));
        }
        if self.by_nid.contains_key(&account.nid) {
            return Err(StoreError::Duplicate(UniqueKey::Nid));
        }
        if account.role == Role::Admin && self.accounts.values().any(|a| a.is_admin()) {
            return Err(StoreError::Duplicate(UniqueKey::Admin));
        }
        Ok(())
    }

    /// Validate the plan and stage every account write; no mutation here
    fn stage(&self, plan: &CommitPlan) -> Result<Vec<Account>, StoreError> {
        for precondition in &plan.preconditions {
            let account = self
                .accounts
                .get(precondition.email())
                .ok_or_else(|| StoreError::AccountNotFound(precondition.email().to_string()))?;
            if !precondition.holds(account) {
                return Err(StoreError::PreconditionFailed(precondition.clone()));
            }
        }

        if let Some(account) = &plan.new_account {
            self.check_unique(account)?;
        }

        if let Some(request) = &plan.new_request
            && self.requests.contains_key(&request.request_id)
        {
            return Err(StoreError::Conflict(format!(
                "request id {} already exists",
                request.request_id
            )));
        }

        if let Some(t) = &plan.request_transition {
            let current = self
                .requests
                .get(&t.request_id)
                .ok_or(StoreError::RequestNotFound(t.request_id))?;
            if !t.allows(current.status) {
                return Err(StoreError::RequestState {
                    id: t.request_id,
                    expected: t.from,
                    actual: current.status,
                });
            }
        }

        if let Some(trx) = &plan.transaction
            && self.trx_ids.contains(&trx.trx_id)
        {
            return Err(StoreError::Conflict(format!(
                "transaction id {} already exists",
                trx.trx_id
            )));
        }

        let mut staged = Vec::new();
        for (email, delta) in plan.merged_deltas()? {
            let current = self
                .accounts
                .get(&email)
                .ok_or_else(|| StoreError::AccountNotFound(email.clone()))?;
            let next = delta
                .apply(current)
                .ok_or_else(|| StoreError::Overflow(email.clone()))?;
            if next.balance < 0 || next.income < 0 {
                return Err(StoreError::NegativeBalance(email));
            }
            staged.push(next);
        }
        Ok(staged)
    }

    fn apply(&mut self, plan: CommitPlan, staged: Vec<Account>) {
        for account in staged {
            self.accounts.insert(account.email.clone(), account);
        }
        if let Some(account) = plan.new_account {
            self.by_mobile
                .insert(account.mobile.clone(), account.email.clone());
            self.by_nid.insert(account.nid.clone(), account.email.clone());
            self.accounts.insert(account.email.clone(), account);
        }
        if let Some(request) = plan.new_request {
            self.requests.insert(request.request_id, request);
        }
        if let Some(t) = plan.request_transition
            && let Some(request) = self.requests.get_mut(&t.request_id)
        {
            request.status = t.to;
            request.resolved_at = Some(Utc::now());
        }
        if let Some(trx) = plan.transaction {
            self.trx_ids.insert(trx.trx_id.clone());
            self.ledger.push(trx);
        }
    }
}

/// In-process store, used by tests and by the binary when no PostgreSQL URL
/// is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of ledger entries written so far
    pub fn ledger_len(&self) -> usize {
        self.state.lock().map(|s| s.ledger.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        self.state.lock().map_err(|_| {
            error!("Memory store mutex poisoned");
            StoreError::Unavailable("memory store poisoned".to_string())
        })
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_account(&self, key: AccountKey<'_>) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.resolve(key).cloned())
    }

    async fn find_admin(&self) -> Result<Option<Account>, StoreError> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|a| a.is_admin())
            .cloned())
    }

    async fn list_accounts(&self, filter: AccountFilter) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self
            .lock()?
            .accounts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(accounts)
    }

    async fn set_status_if(
        &self,
        email: &str,
        expected: &[AccountStatus],
        next: AccountStatus,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state.accounts.get_mut(email) {
            Some(account) if expected.contains(&account.status) => {
                account.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<FloatRequest>, StoreError> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    async fn list_requests(
        &self,
        kind: Option<RequestKind>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<FloatRequest>, StoreError> {
        let mut requests: Vec<FloatRequest> = self
            .lock()?
            .requests
            .values()
            .filter(|r| kind.is_none_or(|k| r.kind == k) && status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.request_id);
        Ok(requests)
    }

    async fn transactions(&self, query: &HistoryQuery) -> Result<Vec<Transaction>, StoreError> {
        Ok(query.select(&self.lock()?.ledger))
    }

    async fn commit(&self, plan: CommitPlan) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let staged = state.stage(&plan)?;
        state.apply(plan, staged);
        Ok(())
    }
}
