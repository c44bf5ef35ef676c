//! PostgreSQL schema for the account store

use sqlx::PgPool;

pub const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts_tb (
    email           TEXT PRIMARY KEY,
    mobile          TEXT NOT NULL UNIQUE,
    nid             TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    role            SMALLINT NOT NULL,
    status          SMALLINT NOT NULL,
    balance         BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0),
    income          BIGINT NOT NULL DEFAULT 0 CHECK (income >= 0),
    system_balance  BIGINT NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// At most one admin row
pub const CREATE_SINGLE_ADMIN_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS accounts_single_admin_idx
    ON accounts_tb (role) WHERE role = 1
"#;

pub const CREATE_FLOAT_REQUESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS float_requests_tb (
    request_id      TEXT PRIMARY KEY,
    kind            SMALLINT NOT NULL,
    requested_by    TEXT NOT NULL REFERENCES accounts_tb (email),
    amount          BIGINT,
    status          SMALLINT NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    resolved_at     TIMESTAMPTZ
)
"#;

pub const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions_tb (
    trx_id          TEXT PRIMARY KEY,
    kind            SMALLINT NOT NULL,
    amount          BIGINT NOT NULL,
    charge          BIGINT NOT NULL DEFAULT 0,
    from_account    TEXT NOT NULL,
    to_account      TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL
)
"#;

pub const CREATE_TRANSACTIONS_FROM_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS transactions_from_idx
    ON transactions_tb (from_account, created_at DESC)
"#;

pub const CREATE_TRANSACTIONS_TO_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS transactions_to_idx
    ON transactions_tb (to_account, created_at DESC)
"#;

/// Statements in dependency order
pub const MIGRATIONS: [(&str, &str); 6] = [
    ("accounts_tb", CREATE_ACCOUNTS_TABLE),
    ("accounts_single_admin_idx", CREATE_SINGLE_ADMIN_INDEX),
    ("float_requests_tb", CREATE_FLOAT_REQUESTS_TABLE),
    ("transactions_tb", CREATE_TRANSACTIONS_TABLE),
    ("transactions_from_idx", CREATE_TRANSACTIONS_FROM_INDEX),
    ("transactions_to_idx", CREATE_TRANSACTIONS_TO_INDEX),
];

/// Create tables and indexes if missing (idempotent)
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Applying account store schema...");
    for (name, ddl) in MIGRATIONS {
        sqlx::query(ddl).execute(pool).await.inspect_err(|e| {
            tracing::error!(object = name, error = %e, "Schema statement failed");
        })?;
    }
    tracing::info!("Account store schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent_ddl() {
        for (name, ddl) in MIGRATIONS {
            assert!(ddl.contains("IF NOT EXISTS"), "{name} must be idempotent");
        }
    }

    #[test]
    fn test_balance_check_constraint() {
        assert!(CREATE_ACCOUNTS_TABLE.contains("CHECK (balance >= 0)"));
    }
}
