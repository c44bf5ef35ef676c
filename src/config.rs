use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::core_types::Amount;
use crate::fee::{DEFAULT_FLOAT_TOP_UP, FeeSchedule};
use crate::ledger::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// PostgreSQL connection URL; in-memory store when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub fees: FeeSchedule,
    #[serde(default)]
    pub float: FloatConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub admin: AdminSeed,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "easy_cash.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            postgres_url: None,
            max_connections: default_max_connections(),
            fees: FeeSchedule::default(),
            float: FloatConfig::default(),
            ledger: LedgerConfig::default(),
            admin: AdminSeed::default(),
        }
    }
}

/// Starter balances granted at registration, drawn from the admin float
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FloatConfig {
    pub user_starter: Amount,
    pub agent_starter: Amount,
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            user_starter: 40,
            agent_starter: DEFAULT_FLOAT_TOP_UP,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Cap on self-service history queries
    pub history_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// The single admin account created on first start
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AdminSeed {
    pub email: String,
    pub mobile: String,
    pub nid: String,
    pub name: String,
    /// Opening float reserve
    pub system_balance: Amount,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            email: "admin@easycash.local".to_string(),
            mobile: "+8801700000000".to_string(),
            nid: "1000000000".to_string(),
            name: "System Admin".to_string(),
            system_balance: 0,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config: {}", config_path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context("Failed to parse config yaml")?;
        config.fees.validate().map_err(anyhow::Error::msg)?;
        if config.ledger.history_limit == 0 {
            anyhow::bail!("ledger.history_limit must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
log_level: debug
log_dir: ./logs
log_file: test.log
use_json: false
rotation: never
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.postgres_url.is_none());
        assert_eq!(config.fees, FeeSchedule::default());
        assert_eq!(config.float.user_starter, 40);
        assert_eq!(config.float.agent_starter, 100_000);
        assert_eq!(config.ledger.history_limit, 100);
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn test_fee_overrides() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: test.log
use_json: true
rotation: daily
fees:
  send_money_fee: 10
admin:
  email: root@bank.test
  mobile: "+15550000000"
  nid: "9999999999"
  name: Root
  system_balance: 1000000
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.fees.send_money_fee, 10);
        assert_eq!(config.fees.cash_out_rate_bps, 150);
        assert_eq!(config.admin.email, "root@bank.test");
        assert_eq!(config.admin.system_balance, 1_000_000);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: test.log
use_json: false
rotation: daily
float:
  user_starter: 25
admin:
  system_balance: 500
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.float.user_starter, 25);
        assert_eq!(config.float.agent_starter, DEFAULT_FLOAT_TOP_UP);
        assert_eq!(config.admin.system_balance, 500);
        assert_eq!(config.admin.email, AdminSeed::default().email);
    }

    #[test]
    fn test_invalid_fee_split_rejected() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: test.log
use_json: false
rotation: daily
fees:
  cash_out_rate_bps: 100
  cash_out_agent_bps: 150
"#;
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(AppConfig::load("does-not-exist").is_err());
    }
}
