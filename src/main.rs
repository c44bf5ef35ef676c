//! EasyCash operator binary
//!
//! ```text
//! easy_cash [--env dev] [--migrate] [--audit [--participant EMAIL]]
//!           [--balances] [--requests] [--summary]
//! ```
//!
//! Loads `config/<env>.yaml`, opens the configured store (PostgreSQL when
//! `postgres_url` is set, in-memory otherwise), provisions the admin account
//! and prints the requested reports as JSON on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use easy_cash::account::AccountFilter;
use easy_cash::auth::{Actor, PinVault};
use easy_cash::config::AppConfig;
use easy_cash::db::Database;
use easy_cash::store::{AccountStore, MemoryStore, PgStore, schema};
use easy_cash::transfer::{EngineConfig, TransferEngine};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_participant() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--participant" && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn has_flag(flag: &str) -> bool {
    std::env::args().any(|a| a == flag)
}

fn print_json<T: Serialize>(label: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", label))?;
    println!("{}", json);
    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn AccountStore>> {
    let Some(url) = config.postgres_url.as_deref() else {
        tracing::warn!("No postgres_url configured, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let db = Database::connect(url, config.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.health_check().await.context("PostgreSQL health check failed")?;
    if has_flag("--migrate") {
        schema::migrate(db.pool())
            .await
            .context("Schema migration failed")?;
    }
    Ok(Arc::new(PgStore::new(db.pool().clone())))
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = easy_cash::logging::init_logging(&app_config);

    tracing::info!(
        build = env!("EASY_CASH_BUILD"),
        "Starting EasyCash ledger in {} mode",
        env
    );

    let store = open_store(&app_config).await?;
    tracing::info!(store = store.name(), "Account store ready");

    let engine = TransferEngine::new(
        store,
        Arc::new(PinVault::new()),
        EngineConfig::from(&app_config),
    );
    let admin = engine
        .ensure_admin(&app_config.admin)
        .await
        .context("Failed to provision admin account")?;
    let admin = Actor::admin(admin.email);

    if has_flag("--audit") {
        let participant = get_participant();
        let entries = engine.audit(&admin, participant.as_deref()).await?;
        tracing::info!(entries = entries.len(), "Audit dump");
        print_json("audit", &entries)?;
    }

    if has_flag("--balances") {
        let accounts = engine
            .list_accounts(&admin, AccountFilter::default())
            .await?;
        print_json("balances", &accounts)?;
    }

    if has_flag("--requests") {
        let requests = engine.list_requests(&admin, None, None).await?;
        print_json("requests", &requests)?;
    }

    if has_flag("--summary") {
        let summary = engine.system_summary(&admin).await?;
        print_json("summary", &summary)?;
    }

    tracing::info!("Done");
    Ok(())
}
