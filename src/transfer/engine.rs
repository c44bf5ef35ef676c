//! Transfer Engine
//!
//! One entry point per operation. Each call reads the participants, runs the
//! admissibility checks, builds a [`CommitPlan`] and hands it to the store.
//! The checks done here only produce early, precise rejections; correctness
//! under concurrency comes from the preconditions carried in the plan, which
//! the store re-evaluates at commit time.
//!
//! The admin account is resolved once per operation and mutated through the
//! same plan as every other participant.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::TransferError;
use super::types::{
    ApproveMoneyRequest, ApproveWithdrawRequest, BalanceView, CashInRequest, CashOutRequest,
    RequestReceipt, SendMoneyRequest, SystemSummary, TransferReceipt,
};
use crate::account::{
    Account, AccountFilter, AccountStatus, EmailAddress, MobileNumber, NationalId, NewAccount,
    Role,
};
use crate::auth::{Actor, CredentialVerifier};
use crate::config::{AdminSeed, AppConfig, FloatConfig};
use crate::core_types::{Amount, Units, to_units};
use crate::fee::{FeeQuote, FeeSchedule};
use crate::ledger::{DEFAULT_HISTORY_LIMIT, HistoryQuery, LedgerClock, Transaction, TransactionKind};
use crate::requests::{FloatRequest, RequestId, RequestKind, RequestStatus, RequestTransition};
use crate::store::{AccountKey, AccountStore, CommitPlan, Precondition, StoreError, UniqueKey};

pub type TransferResult<T> = Result<T, TransferError>;

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub fees: FeeSchedule,
    pub float: FloatConfig,
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            float: FloatConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fees: config.fees,
            float: config.float,
            history_limit: config.ledger.history_limit,
        }
    }
}

/// Transfer Engine - orchestrates admissibility, fee settlement and ledger append
pub struct TransferEngine {
    store: Arc<dyn AccountStore>,
    credentials: Arc<dyn CredentialVerifier>,
    config: EngineConfig,
    clock: LedgerClock,
}

fn units(amount: Amount) -> TransferResult<Units> {
    to_units(amount).ok_or(TransferError::Overflow)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl TransferEngine {
    pub fn new(
        store: Arc<dyn AccountStore>,
        credentials: Arc<dyn CredentialVerifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            config,
            clock: LedgerClock::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Shared checks
    // ========================================================================

    /// Load the actor's account and require `role` + active status
    async fn authorize(&self, actor: &Actor, role: Role) -> TransferResult<Account> {
        if actor.role != role {
            debug!(actor = %actor, required = %role, "Actor lacks role");
            return Err(TransferError::Forbidden(role));
        }
        let account = self
            .store
            .find_account(AccountKey::Email(&actor.email))
            .await?
            .ok_or_else(|| TransferError::AccountNotFound(actor.email.clone()))?;
        if account.role != role {
            return Err(TransferError::Forbidden(role));
        }
        if !account.is_active() {
            debug!(actor = %actor, status = %account.status, "Actor account not active");
            return Err(TransferError::ActorInactive);
        }
        Ok(account)
    }

    async fn admin(&self) -> TransferResult<Account> {
        self.store.find_admin().await?.ok_or_else(|| {
            error!("Admin account missing");
            TransferError::Internal("admin account not provisioned".to_string())
        })
    }

    async fn find_by_mobile(&self, mobile: &str) -> TransferResult<Option<Account>> {
        let Ok(mobile) = MobileNumber::new(mobile) else {
            return Ok(None);
        };
        Ok(self
            .store
            .find_account(AccountKey::Mobile(mobile.as_str()))
            .await?)
    }

    fn quote(&self, kind: TransactionKind, amount: Amount) -> TransferResult<FeeQuote> {
        if amount == 0 {
            return Err(TransferError::InvalidAmount);
        }
        self.config
            .fees
            .quote(kind, amount)
            .ok_or(TransferError::Overflow)
    }

    async fn verify_pin(&self, actor: &Actor, pin: &str) -> TransferResult<()> {
        if self.credentials.verify_pin(&actor.email, pin).await? {
            Ok(())
        } else {
            debug!(actor = %actor, "PIN mismatch");
            Err(TransferError::PinMismatch)
        }
    }

    fn require_balance(account: &Account, required: Units) -> TransferResult<()> {
        if account.balance < required {
            debug!(
                account = %account.email,
                balance = account.balance,
                required,
                "Insufficient balance"
            );
            return Err(TransferError::InsufficientBalance);
        }
        Ok(())
    }

    /// Commit a plan, translating store failures into rejections
    ///
    /// A failed standing precondition on `actor` becomes `ActorInactive`; on
    /// `counterparty.0` it becomes `counterparty.1`.
    async fn commit(
        &self,
        op: &'static str,
        plan: CommitPlan,
        actor: &str,
        counterparty: Option<(&str, TransferError)>,
    ) -> TransferResult<()> {
        let Err(err) = self.store.commit(plan).await else {
            return Ok(());
        };
        match &err {
            StoreError::Unavailable(_) => error!(op, actor, error = %err, "Store unavailable"),
            StoreError::Conflict(_) => warn!(op, actor, error = %err, "Lost concurrent update"),
            _ => debug!(op, actor, error = %err, "Commit rejected"),
        }
        if let StoreError::PreconditionFailed(Precondition::Standing { email, .. }) = &err {
            if email == actor {
                return Err(TransferError::ActorInactive);
            }
            if let Some((who, rejection)) = counterparty
                && who == email
            {
                return Err(rejection);
            }
        }
        Err(err.into())
    }

    // ========================================================================
    // Balance-moving operations
    // ========================================================================

    /// send-money: user → active user by mobile number
    pub async fn send_money(
        &self,
        actor: &Actor,
        req: SendMoneyRequest,
    ) -> TransferResult<TransferReceipt> {
        let sender = self.authorize(actor, Role::User).await?;
        let quote = self.quote(TransactionKind::SendMoney, req.amount)?;

        let recipient = self
            .find_by_mobile(&req.recipient_mobile)
            .await?
            .ok_or(TransferError::InvalidRecipient)?;
        if recipient.email == sender.email {
            return Err(TransferError::SelfTransfer);
        }
        if recipient.role != Role::User {
            return Err(TransferError::RecipientNotUser);
        }
        if !recipient.is_active() {
            return Err(TransferError::RecipientInactive);
        }

        let total = units(quote.debit_total())?;
        Self::require_balance(&sender, total)?;
        let admin = self.admin().await?;

        let trx = Transaction::new(
            TransactionKind::SendMoney,
            quote.principal,
            quote.fee,
            &sender.email,
            &recipient.email,
            self.clock.next(),
        );
        let plan = CommitPlan::new()
            .require_standing(&sender)
            .require_standing(&recipient)
            .require_funds(&sender.email, total)
            .balance(&sender.email, -total)
            .balance(&recipient.email, units(quote.principal)?)
            .balance(&admin.email, units(quote.admin_share)?)
            .system_balance(&admin.email, quote.system_delta)
            .record(trx.clone());

        self.commit(
            "send-money",
            plan,
            &sender.email,
            Some((&recipient.email, TransferError::RecipientInactive)),
        )
        .await?;

        info!(
            trx_id = %trx.trx_id,
            actor = %sender.email,
            to = %recipient.email,
            amount = quote.principal,
            fee = quote.fee,
            "send-money committed"
        );
        Ok(trx.into())
    }

    /// cash-in: agent → active user, PIN-gated, no fee
    pub async fn cash_in(&self, actor: &Actor, req: CashInRequest) -> TransferResult<TransferReceipt> {
        let agent = self.authorize(actor, Role::Agent).await?;
        let quote = self.quote(TransactionKind::CashIn, req.amount)?;

        let user = self
            .find_by_mobile(&req.user_mobile)
            .await?
            .filter(|a| a.has_standing(Role::User, AccountStatus::Active))
            .ok_or(TransferError::InvalidUser)?;

        self.verify_pin(actor, &req.pin).await?;

        let total = units(quote.debit_total())?;
        Self::require_balance(&agent, total)?;
        let admin = self.admin().await?;

        let trx = Transaction::new(
            TransactionKind::CashIn,
            quote.principal,
            quote.fee,
            &agent.email,
            &user.email,
            self.clock.next(),
        );
        let plan = CommitPlan::new()
            .require_standing(&agent)
            .require_standing(&user)
            .require_funds(&agent.email, total)
            .balance(&agent.email, -total)
            .balance(&user.email, units(quote.principal)?)
            .system_balance(&admin.email, quote.system_delta)
            .record(trx.clone());

        self.commit(
            "cash-in",
            plan,
            &agent.email,
            Some((&user.email, TransferError::InvalidUser)),
        )
        .await?;

        info!(
            trx_id = %trx.trx_id,
            actor = %agent.email,
            to = %user.email,
            amount = quote.principal,
            "cash-in committed"
        );
        Ok(trx.into())
    }

    /// cash-out: user → active agent, PIN-gated, fee split agent/admin
    pub async fn cash_out(
        &self,
        actor: &Actor,
        req: CashOutRequest,
    ) -> TransferResult<TransferReceipt> {
        let user = self.authorize(actor, Role::User).await?;
        let quote = self.quote(TransactionKind::CashOut, req.amount)?;

        let agent = self
            .find_by_mobile(&req.agent_mobile)
            .await?
            .filter(|a| a.has_standing(Role::Agent, AccountStatus::Active))
            .ok_or(TransferError::InvalidAgent)?;

        self.verify_pin(actor, &req.pin).await?;

        let total = units(quote.debit_total())?;
        Self::require_balance(&user, total)?;
        let admin = self.admin().await?;

        let agent_credit = quote
            .principal
            .checked_add(quote.agent_share)
            .ok_or(TransferError::Overflow)?;
        let trx = Transaction::new(
            TransactionKind::CashOut,
            quote.principal,
            quote.fee,
            &user.email,
            &agent.email,
            self.clock.next(),
        );
        let plan = CommitPlan::new()
            .require_standing(&user)
            .require_standing(&agent)
            .require_funds(&user.email, total)
            .balance(&user.email, -total)
            .balance(&agent.email, units(agent_credit)?)
            .income(&agent.email, units(quote.agent_share)?)
            .balance(&admin.email, units(quote.admin_share)?)
            .system_balance(&admin.email, quote.system_delta)
            .record(trx.clone());

        self.commit(
            "cash-out",
            plan,
            &user.email,
            Some((&agent.email, TransferError::InvalidAgent)),
        )
        .await?;

        info!(
            trx_id = %trx.trx_id,
            actor = %user.email,
            to = %agent.email,
            amount = quote.principal,
            fee = quote.fee,
            agent_share = quote.agent_share,
            "cash-out committed"
        );
        Ok(trx.into())
    }

    // ========================================================================
    // Request queue
    // ========================================================================

    /// request-money: agent asks for a standard float top-up
    pub async fn request_money(&self, actor: &Actor) -> TransferResult<RequestReceipt> {
        let agent = self.authorize(actor, Role::Agent).await?;
        let request = FloatRequest::money(&agent.email);
        let receipt = RequestReceipt::from(&request);

        let plan = CommitPlan::new()
            .require_standing(&agent)
            .insert_request(request);
        self.commit("request-money", plan, &agent.email, None)
            .await?;

        info!(request_id = %receipt.request_id, actor = %agent.email, "money-request created");
        Ok(receipt)
    }

    /// withdraw-request: agent asks to withdraw `amount` from its balance
    pub async fn withdraw_request(
        &self,
        actor: &Actor,
        amount: Amount,
    ) -> TransferResult<RequestReceipt> {
        let agent = self.authorize(actor, Role::Agent).await?;
        if amount == 0 {
            return Err(TransferError::InvalidAmount);
        }
        let required = units(amount)?;
        Self::require_balance(&agent, required)?;

        let request = FloatRequest::withdraw(&agent.email, amount);
        let receipt = RequestReceipt::from(&request);
        let plan = CommitPlan::new()
            .require_standing(&agent)
            .require_funds(&agent.email, required)
            .insert_request(request);
        self.commit("withdraw-request", plan, &agent.email, None)
            .await?;

        info!(
            request_id = %receipt.request_id,
            actor = %agent.email,
            amount,
            "withdraw-request created"
        );
        Ok(receipt)
    }

    /// Load a pending request of `kind` raised by `agent_email`
    async fn pending_request(
        &self,
        id: RequestId,
        kind: RequestKind,
        agent_email: &str,
    ) -> TransferResult<FloatRequest> {
        let request = self
            .store
            .find_request(id)
            .await?
            .ok_or(TransferError::RequestNotFound(id))?;
        if request.kind != kind {
            return Err(TransferError::RequestMismatch(format!(
                "{} is a {}",
                id, request.kind
            )));
        }
        if request.requested_by != agent_email {
            return Err(TransferError::RequestMismatch(format!(
                "{} was not raised by {}",
                id, agent_email
            )));
        }
        if request.status.is_terminal() {
            debug!(request_id = %id, status = %request.status, "Request already resolved");
            return Err(TransferError::StateConflict(format!(
                "request {} is already {}",
                id, request.status
            )));
        }
        Ok(request)
    }

    async fn requesting_agent(&self, email: &str) -> TransferResult<Account> {
        let agent = self
            .store
            .find_account(AccountKey::Email(email))
            .await?
            .ok_or_else(|| TransferError::AccountNotFound(email.to_string()))?;
        if agent.role != Role::Agent {
            return Err(TransferError::InvalidAgent);
        }
        Ok(agent)
    }

    /// approve-money-request: credit the standard top-up, pending → approved
    pub async fn approve_money_request(
        &self,
        actor: &Actor,
        req: ApproveMoneyRequest,
    ) -> TransferResult<TransferReceipt> {
        let admin = self.authorize(actor, Role::Admin).await?;
        let agent_email = normalize_email(&req.agent_email);
        self.pending_request(req.request_id, RequestKind::Money, &agent_email)
            .await?;
        let agent = self.requesting_agent(&agent_email).await?;
        if !agent.is_active() {
            return Err(TransferError::InvalidAgent);
        }

        let quote = self
            .config
            .fees
            .quote(TransactionKind::FloatApproval, 0)
            .ok_or(TransferError::Overflow)?;
        let trx = Transaction::new(
            TransactionKind::FloatApproval,
            quote.principal,
            0,
            &admin.email,
            &agent.email,
            self.clock.next(),
        );
        let plan = CommitPlan::new()
            .require_standing(&admin)
            .require_standing(&agent)
            .transition(RequestTransition::approve(req.request_id))
            .balance(&agent.email, units(quote.principal)?)
            .system_balance(&admin.email, quote.system_delta)
            .record(trx.clone());

        self.commit(
            "approve-money-request",
            plan,
            &admin.email,
            Some((&agent.email, TransferError::InvalidAgent)),
        )
        .await?;

        info!(
            trx_id = %trx.trx_id,
            request_id = %req.request_id,
            agent = %agent.email,
            amount = quote.principal,
            "money-request approved"
        );
        Ok(trx.into())
    }

    /// approve-withdraw-request: debit the stored amount, pending → approved
    ///
    /// The agent's balance is re-validated at commit time.
    pub async fn approve_withdraw_request(
        &self,
        actor: &Actor,
        req: ApproveWithdrawRequest,
    ) -> TransferResult<TransferReceipt> {
        let admin = self.authorize(actor, Role::Admin).await?;
        let agent_email = normalize_email(&req.agent_email);
        let request = self
            .pending_request(req.request_id, RequestKind::Withdraw, &agent_email)
            .await?;
        let amount = request.amount.ok_or_else(|| {
            TransferError::Internal(format!("withdraw request {} has no amount", request.request_id))
        })?;
        if let Some(supplied) = req.amount
            && supplied != amount
        {
            return Err(TransferError::RequestMismatch(format!(
                "amount {} does not match requested {}",
                supplied, amount
            )));
        }
        let agent = self.requesting_agent(&agent_email).await?;

        let quote = self.quote(TransactionKind::WithdrawalApproval, amount)?;
        let debit = units(quote.principal)?;
        Self::require_balance(&agent, debit)?;

        let trx = Transaction::new(
            TransactionKind::WithdrawalApproval,
            quote.principal,
            0,
            &agent.email,
            &admin.email,
            self.clock.next(),
        );
        let plan = CommitPlan::new()
            .require_standing(&admin)
            .require_standing(&agent)
            .require_funds(&agent.email, debit)
            .transition(RequestTransition::approve(req.request_id))
            .balance(&agent.email, -debit)
            .system_balance(&admin.email, quote.system_delta)
            .record(trx.clone());

        self.commit(
            "approve-withdraw-request",
            plan,
            &admin.email,
            Some((&agent.email, TransferError::InvalidAgent)),
        )
        .await?;

        info!(
            trx_id = %trx.trx_id,
            request_id = %req.request_id,
            agent = %agent.email,
            amount,
            "withdraw-request approved"
        );
        Ok(trx.into())
    }

    /// pending → rejected, no balance mutation
    pub async fn reject_request(
        &self,
        actor: &Actor,
        request_id: RequestId,
    ) -> TransferResult<RequestReceipt> {
        let admin = self.authorize(actor, Role::Admin).await?;
        let mut request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(TransferError::RequestNotFound(request_id))?;
        if request.status.is_terminal() {
            return Err(TransferError::StateConflict(format!(
                "request {} is already {}",
                request_id, request.status
            )));
        }

        let plan = CommitPlan::new()
            .require_standing(&admin)
            .transition(RequestTransition::reject(request_id));
        self.commit("reject-request", plan, &admin.email, None)
            .await?;

        request.status = RequestStatus::Rejected;
        request.resolved_at = Some(Utc::now());
        info!(request_id = %request_id, agent = %request.requested_by, "request rejected");
        Ok(RequestReceipt::from(&request))
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Register a user or agent, funding the starter balance from the admin float
    pub async fn open_account(&self, new: NewAccount) -> TransferResult<Account> {
        let invalid = |e: crate::account::ValidationError| TransferError::InvalidInput(e.to_string());
        let email = EmailAddress::new(&new.email).map_err(invalid)?;
        let mobile = MobileNumber::new(&new.mobile).map_err(invalid)?;
        let nid = NationalId::new(&new.nid).map_err(invalid)?;
        let name = new.name.trim();
        if name.is_empty() {
            return Err(TransferError::InvalidInput("name must not be empty".to_string()));
        }

        let (status, starter) = match new.role {
            Role::User => (AccountStatus::Active, self.config.float.user_starter),
            Role::Agent => (AccountStatus::Pending, self.config.float.agent_starter),
            Role::Admin => {
                return Err(TransferError::InvalidInput(
                    "admin accounts cannot be registered".to_string(),
                ));
            }
        };

        for (key, unique) in [
            (AccountKey::Email(email.as_str()), UniqueKey::Email),
            (AccountKey::Mobile(mobile.as_str()), UniqueKey::Mobile),
            (AccountKey::Nid(nid.as_str()), UniqueKey::Nid),
        ] {
            if self.store.find_account(key).await?.is_some() {
                debug!(email = %email, key = %unique, "Duplicate registration");
                return Err(TransferError::Duplicate(unique));
            }
        }

        let admin = self.admin().await?;
        let starter = units(starter)?;
        let account = Account {
            email: email.into_string(),
            mobile: mobile.into_string(),
            nid: nid.into_string(),
            name: name.to_string(),
            role: new.role,
            status,
            balance: starter,
            income: 0,
            system_balance: 0,
            created_at: Utc::now(),
        };
        let plan = CommitPlan::new()
            .insert_account(account.clone())
            .system_balance(&admin.email, -starter);
        self.commit("open-account", plan, &account.email, None)
            .await?;

        info!(
            email = %account.email,
            role = %account.role,
            status = %account.status,
            starter,
            "account opened"
        );
        Ok(account)
    }

    /// Create the admin account from `seed` unless one already exists
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> TransferResult<Account> {
        if let Some(admin) = self.store.find_admin().await? {
            debug!(email = %admin.email, "Admin account present");
            return Ok(admin);
        }

        let invalid = |e: crate::account::ValidationError| TransferError::InvalidInput(e.to_string());
        let account = Account {
            email: EmailAddress::new(&seed.email).map_err(invalid)?.into_string(),
            mobile: MobileNumber::new(&seed.mobile).map_err(invalid)?.into_string(),
            nid: NationalId::new(&seed.nid).map_err(invalid)?.into_string(),
            name: seed.name.trim().to_string(),
            role: Role::Admin,
            status: AccountStatus::Active,
            balance: 0,
            income: 0,
            system_balance: units(seed.system_balance)?,
            created_at: Utc::now(),
        };

        match self
            .store
            .commit(CommitPlan::new().insert_account(account.clone()))
            .await
        {
            Ok(()) => {
                info!(email = %account.email, "Admin account provisioned");
                Ok(account)
            }
            // Another process seeded it first
            Err(StoreError::Duplicate(UniqueKey::Admin)) => self.admin().await,
            Err(e) => Err(e.into()),
        }
    }

    async fn set_status(
        &self,
        actor: &Actor,
        email: &str,
        expected: &[AccountStatus],
        next: AccountStatus,
        role: Option<Role>,
    ) -> TransferResult<Account> {
        self.authorize(actor, Role::Admin).await?;
        let email = normalize_email(email);
        let target = self
            .store
            .find_account(AccountKey::Email(&email))
            .await?
            .ok_or_else(|| TransferError::AccountNotFound(email.clone()))?;
        if target.is_admin() {
            return Err(TransferError::StateConflict(
                "admin account status is fixed".to_string(),
            ));
        }
        if let Some(role) = role
            && target.role != role
        {
            return Err(TransferError::StateConflict(format!(
                "{} is a {}, not a {}",
                email, target.role, role
            )));
        }

        if !self.store.set_status_if(&email, expected, next).await? {
            debug!(email = %email, next = %next, "Status transition refused");
            return Err(TransferError::StateConflict(format!(
                "{} cannot move to {}",
                email, next
            )));
        }
        info!(actor = %actor.email, email = %email, status = %next, "account status changed");
        Ok(Account {
            status: next,
            ..target
        })
    }

    /// pending agent → active
    pub async fn approve_agent(&self, actor: &Actor, email: &str) -> TransferResult<Account> {
        self.set_status(
            actor,
            email,
            &[AccountStatus::Pending],
            AccountStatus::Active,
            Some(Role::Agent),
        )
        .await
    }

    /// pending agent → rejected
    pub async fn reject_agent(&self, actor: &Actor, email: &str) -> TransferResult<Account> {
        self.set_status(
            actor,
            email,
            &[AccountStatus::Pending],
            AccountStatus::Rejected,
            Some(Role::Agent),
        )
        .await
    }

    /// active → blocked
    ///
    /// Only active accounts qualify; pending agents go through
    /// `approve_agent` / `reject_agent` instead.
    pub async fn block_account(&self, actor: &Actor, email: &str) -> TransferResult<Account> {
        self.set_status(
            actor,
            email,
            &[AccountStatus::Active],
            AccountStatus::Blocked,
            None,
        )
        .await
    }

    /// blocked → active
    pub async fn unblock_account(&self, actor: &Actor, email: &str) -> TransferResult<Account> {
        self.set_status(
            actor,
            email,
            &[AccountStatus::Blocked],
            AccountStatus::Active,
            None,
        )
        .await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn balance(&self, actor: &Actor) -> TransferResult<BalanceView> {
        let account = self
            .store
            .find_account(AccountKey::Email(&actor.email))
            .await?
            .ok_or_else(|| TransferError::AccountNotFound(actor.email.clone()))?;
        Ok(BalanceView::from(&account))
    }

    /// Own ledger entries, newest first, capped at `history_limit`
    pub async fn history(&self, actor: &Actor) -> TransferResult<Vec<Transaction>> {
        let query = HistoryQuery::own(actor.email.clone(), self.config.history_limit);
        Ok(self.store.transactions(&query).await?)
    }

    /// Full ledger, optionally narrowed to one participant
    pub async fn audit(
        &self,
        actor: &Actor,
        participant: Option<&str>,
    ) -> TransferResult<Vec<Transaction>> {
        self.authorize(actor, Role::Admin).await?;
        let query = HistoryQuery::audit(participant.map(normalize_email));
        Ok(self.store.transactions(&query).await?)
    }

    pub async fn list_accounts(
        &self,
        actor: &Actor,
        filter: AccountFilter,
    ) -> TransferResult<Vec<Account>> {
        self.authorize(actor, Role::Admin).await?;
        Ok(self.store.list_accounts(filter).await?)
    }

    pub async fn list_requests(
        &self,
        actor: &Actor,
        kind: Option<RequestKind>,
        status: Option<RequestStatus>,
    ) -> TransferResult<Vec<FloatRequest>> {
        self.authorize(actor, Role::Admin).await?;
        Ok(self.store.list_requests(kind, status).await?)
    }

    pub async fn system_summary(&self, actor: &Actor) -> TransferResult<SystemSummary> {
        self.authorize(actor, Role::Admin).await?;
        let accounts = self.store.list_accounts(AccountFilter::default()).await?;

        let mut summary = SystemSummary::default();
        for account in &accounts {
            match account.role {
                Role::Admin => {
                    summary.admin_balance = account.balance;
                    summary.system_balance = account.system_balance;
                }
                Role::Agent => {
                    summary.agents += 1;
                    summary.total_agent_balance += account.balance;
                    summary.total_agent_income += account.income;
                    if account.status == AccountStatus::Pending {
                        summary.pending_agents += 1;
                    }
                }
                Role::User => {
                    summary.users += 1;
                    summary.total_user_balance += account.balance;
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_from_app_config() {
        let mut app = AppConfig::default();
        app.ledger.history_limit = 7;
        app.fees.send_money_fee = 9;
        let config = EngineConfig::from(&app);
        assert_eq!(config.history_limit, 7);
        assert_eq!(config.fees.send_money_fee, 9);
        assert_eq!(config.float, FloatConfig::default());
    }

    #[test]
    fn test_units_overflow() {
        assert_eq!(units(10), Ok(10));
        assert_eq!(units(u64::MAX), Err(TransferError::Overflow));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Agent@X.com "), "agent@x.com");
    }
}
