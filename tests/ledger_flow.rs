//! End-to-end ledger flow through the public API
//!
//! Registers accounts, moves money with every operation kind and checks the
//! books balance at the end. Uses the real argon2 `PinVault`.

use std::sync::Arc;

use easy_cash::config::AdminSeed;
use easy_cash::transfer::{
    ApproveMoneyRequest, ApproveWithdrawRequest, CashInRequest, CashOutRequest, SendMoneyRequest,
};
use easy_cash::{
    AccountFilter, AccountStatus, AccountStore, Actor, EngineConfig, MemoryStore, NewAccount,
    PinVault, Role, TransactionKind, TransferEngine,
};

fn new_account(tag: &str, n: u64, role: Role) -> NewAccount {
    NewAccount {
        email: format!("{tag}@flow.test"),
        mobile: format!("+15550000{:03}", n),
        nid: format!("{}", 8_000_000_000u64 + n),
        name: tag.to_string(),
        role,
    }
}

#[tokio::test]
async fn test_full_ledger_flow() {
    let store = Arc::new(MemoryStore::new());
    let vault = Arc::new(PinVault::new());
    let engine = TransferEngine::new(store.clone(), vault.clone(), EngineConfig::default());

    let seed = AdminSeed {
        system_balance: 1_000_000,
        ..AdminSeed::default()
    };
    let admin = Actor::admin(engine.ensure_admin(&seed).await.unwrap().email);

    let alice = engine
        .open_account(new_account("alice", 1, Role::User))
        .await
        .unwrap();
    let bob = engine
        .open_account(new_account("bob", 2, Role::User))
        .await
        .unwrap();
    let agent = engine
        .open_account(new_account("agent", 3, Role::Agent))
        .await
        .unwrap();
    assert_eq!(agent.status, AccountStatus::Pending);
    engine.approve_agent(&admin, &agent.email).await.unwrap();

    vault.enroll(&alice.email, "1111").unwrap();
    vault.enroll(&agent.email, "2222").unwrap();

    let alice_actor = Actor::user(&alice.email);
    let agent_actor = Actor::agent(&agent.email);

    // agent 100000 -> alice 40 + 1000
    let receipt = engine
        .cash_in(
            &agent_actor,
            CashInRequest {
                user_mobile: alice.mobile.clone(),
                amount: 1_000,
                pin: "2222".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(receipt.kind, TransactionKind::CashIn);

    // alice 1040 -> bob 150, fee 5
    engine
        .send_money(
            &alice_actor,
            SendMoneyRequest {
                recipient_mobile: bob.mobile.clone(),
                amount: 150,
            },
        )
        .await
        .unwrap();

    // alice 885 -> agent 200, fee 3
    let receipt = engine
        .cash_out(
            &alice_actor,
            CashOutRequest {
                agent_mobile: agent.mobile.clone(),
                amount: 200,
                pin: "1111".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(receipt.charge, 3);

    // Wrong PIN never reaches the store
    let err = engine
        .cash_out(
            &alice_actor,
            CashOutRequest {
                agent_mobile: agent.mobile.clone(),
                amount: 200,
                pin: "0000".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "pin-mismatch");

    let topup = engine.request_money(&agent_actor).await.unwrap();
    engine
        .approve_money_request(
            &admin,
            ApproveMoneyRequest {
                request_id: topup.request_id,
                agent_email: agent.email.clone(),
            },
        )
        .await
        .unwrap();

    let withdraw = engine.withdraw_request(&agent_actor, 50_000).await.unwrap();
    engine
        .approve_withdraw_request(
            &admin,
            ApproveWithdrawRequest {
                request_id: withdraw.request_id,
                agent_email: agent.email.clone(),
                amount: Some(50_000),
            },
        )
        .await
        .unwrap();

    let alice_view = engine.balance(&alice_actor).await.unwrap();
    assert_eq!(alice_view.balance, 40 + 1_000 - 155 - 203);
    let bob_view = engine.balance(&Actor::user(&bob.email)).await.unwrap();
    assert_eq!(bob_view.balance, 40 + 150);
    let agent_view = engine.balance(&agent_actor).await.unwrap();
    assert_eq!(agent_view.balance, 100_000 - 1_000 + 202 + 100_000 - 50_000);
    assert_eq!(agent_view.income, 2);

    let summary = engine.system_summary(&admin).await.unwrap();
    assert_eq!(summary.admin_balance, 5 + 1);
    // seed - starters + cash-in + send + cash-out + top-up - withdraw
    assert_eq!(
        summary.system_balance,
        1_000_000 - 100_080 + 1_000 + 155 + 203 + 100_000 - 50_000
    );

    let history = engine.history(&alice_actor).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, TransactionKind::CashOut);
    assert_eq!(history[2].kind, TransactionKind::CashIn);

    let audit = engine.audit(&admin, None).await.unwrap();
    assert_eq!(audit.len(), 5);

    let total: i64 = store
        .list_accounts(AccountFilter::default())
        .await
        .unwrap()
        .iter()
        .map(|a| a.balance)
        .sum();
    // starters + top-up - withdraw
    assert_eq!(total, 100_080 + 100_000 - 50_000);
}
