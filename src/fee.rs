//! Fee policy
//!
//! Pure mapping from operation kind + principal to a fee and its settlement
//! split. Percentage rates use basis points (10^4 precision: 150 = 1.50%) and
//! fractional units are resolved with round-half-up in `u128`.

use serde::{Deserialize, Serialize};

use crate::core_types::{Amount, Units};
use crate::ledger::TransactionKind;

/// Basis point precision (10^4 = 100%)
pub const BPS_PRECISION: u64 = 10_000;

/// Flat send-money fee
pub const DEFAULT_SEND_MONEY_FEE: Amount = 5;

/// Send-money principal at or above which the flat fee applies
pub const DEFAULT_SEND_MONEY_THRESHOLD: Amount = 100;

/// Cash-out fee rate (150 = 1.50%)
pub const DEFAULT_CASH_OUT_RATE_BPS: u64 = 150;

/// Servicing agent's share of the cash-out fee (100 = 1.00% of principal)
pub const DEFAULT_CASH_OUT_AGENT_BPS: u64 = 100;

/// Fixed float injected by an approved money-request
pub const DEFAULT_FLOAT_TOP_UP: Amount = 100_000;

/// `amount * bps / 10^4`, rounded half-up.
///
/// # Example
/// ```
/// use easy_cash::fee::bps_of;
/// assert_eq!(bps_of(200, 150), Some(3)); // 1.5% of 200
/// assert_eq!(bps_of(50, 150), Some(1));  // 0.75 rounds up
/// assert_eq!(bps_of(30, 150), Some(0));  // 0.45 rounds down
/// ```
///
/// `None` when the result does not fit in an `Amount` (only possible for
/// rates above 100%).
#[inline]
pub fn bps_of(amount: Amount, bps: u64) -> Option<Amount> {
    let scaled = amount as u128 * bps as u128;
    let half = (BPS_PRECISION / 2) as u128;
    Amount::try_from((scaled + half) / BPS_PRECISION as u128).ok()
}

/// Fee settlement for one operation
///
/// `agent_share + admin_share == fee` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub kind: TransactionKind,
    pub principal: Amount,
    pub fee: Amount,
    /// Credited to the servicing agent's balance and income
    pub agent_share: Amount,
    /// Credited to the admin balance
    pub admin_share: Amount,
    /// Signed movement of the admin `system_balance`
    pub system_delta: Units,
}

impl FeeQuote {
    /// Total the paying account must hold: principal plus fee.
    ///
    /// Zero for float approval, which debits nobody.
    pub fn debit_total(&self) -> Amount {
        match self.kind {
            TransactionKind::FloatApproval => 0,
            _ => self.principal + self.fee,
        }
    }
}

/// Configurable fee schedule; defaults are the production tariff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub send_money_fee: Amount,
    pub send_money_threshold: Amount,
    pub cash_out_rate_bps: u64,
    pub cash_out_agent_bps: u64,
    pub float_top_up: Amount,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            send_money_fee: DEFAULT_SEND_MONEY_FEE,
            send_money_threshold: DEFAULT_SEND_MONEY_THRESHOLD,
            cash_out_rate_bps: DEFAULT_CASH_OUT_RATE_BPS,
            cash_out_agent_bps: DEFAULT_CASH_OUT_AGENT_BPS,
            float_top_up: DEFAULT_FLOAT_TOP_UP,
        }
    }
}

impl FeeSchedule {
    /// Reject schedules whose agent share exceeds the whole cash-out fee
    pub fn validate(&self) -> Result<(), String> {
        if self.cash_out_agent_bps > self.cash_out_rate_bps {
            return Err(format!(
                "cash_out_agent_bps ({}) exceeds cash_out_rate_bps ({})",
                self.cash_out_agent_bps, self.cash_out_rate_bps
            ));
        }
        if self.cash_out_rate_bps > BPS_PRECISION {
            return Err(format!(
                "cash_out_rate_bps ({}) exceeds 100%",
                self.cash_out_rate_bps
            ));
        }
        Ok(())
    }

    /// Quote the fee and settlement for `principal`.
    ///
    /// For `FloatApproval` the principal is ignored and the configured top-up
    /// is used. Returns `None` if any total would overflow stored units.
    pub fn quote(&self, kind: TransactionKind, principal: Amount) -> Option<FeeQuote> {
        let (principal, fee, agent_share) = match kind {
            TransactionKind::SendMoney => {
                let fee = if principal >= self.send_money_threshold {
                    self.send_money_fee
                } else {
                    0
                };
                (principal, fee, 0)
            }
            TransactionKind::CashIn => (principal, 0, 0),
            TransactionKind::CashOut => {
                let fee = bps_of(principal, self.cash_out_rate_bps)?;
                let agent_share = bps_of(principal, self.cash_out_agent_bps)?.min(fee);
                (principal, fee, agent_share)
            }
            TransactionKind::FloatApproval => (self.float_top_up, 0, 0),
            TransactionKind::WithdrawalApproval => (principal, 0, 0),
        };

        let gross = Units::try_from(principal.checked_add(fee)?).ok()?;
        let system_delta = match kind {
            TransactionKind::WithdrawalApproval => -gross,
            _ => gross,
        };

        Some(FeeQuote {
            kind,
            principal,
            fee,
            agent_share,
            admin_share: fee - agent_share,
            system_delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_rounding() {
        assert_eq!(bps_of(200, 150), Some(3));
        assert_eq!(bps_of(200, 100), Some(2));
        // 1.5% of 101 = 1.515 -> 2
        assert_eq!(bps_of(101, 150), Some(2));
        // 1.5% of 100 = 1.5 -> 2 (half rounds up)
        assert_eq!(bps_of(100, 150), Some(2));
        // 1.5% of 99 = 1.485 -> 1
        assert_eq!(bps_of(99, 150), Some(1));
        assert_eq!(bps_of(0, 150), Some(0));
    }

    #[test]
    fn test_bps_no_overflow() {
        let large: Amount = 10_000_000_000_000_000_000;
        assert_eq!(bps_of(large, 150), Some(150_000_000_000_000_000));
    }

    #[test]
    fn test_bps_above_full_rate_is_checked() {
        assert_eq!(bps_of(100, 20_000), Some(200));
        assert_eq!(bps_of(Amount::MAX, 20_000), None);

        // Schedule set directly, bypassing validate()
        let fees = FeeSchedule {
            cash_out_rate_bps: 20_000,
            ..FeeSchedule::default()
        };
        assert!(fees.quote(TransactionKind::CashOut, Amount::MAX).is_none());
    }

    #[test]
    fn test_send_money_threshold() {
        let fees = FeeSchedule::default();
        let q = fees.quote(TransactionKind::SendMoney, 150).unwrap();
        assert_eq!(q.fee, 5);
        assert_eq!(q.admin_share, 5);
        assert_eq!(q.agent_share, 0);
        assert_eq!(q.system_delta, 155);
        assert_eq!(q.debit_total(), 155);

        let q = fees.quote(TransactionKind::SendMoney, 100).unwrap();
        assert_eq!(q.fee, 5);

        let q = fees.quote(TransactionKind::SendMoney, 99).unwrap();
        assert_eq!(q.fee, 0);
        assert_eq!(q.system_delta, 99);
    }

    #[test]
    fn test_cash_in_free() {
        let q = FeeSchedule::default()
            .quote(TransactionKind::CashIn, 5000)
            .unwrap();
        assert_eq!(q.fee, 0);
        assert_eq!(q.system_delta, 5000);
        assert_eq!(q.debit_total(), 5000);
    }

    #[test]
    fn test_cash_out_split() {
        let q = FeeSchedule::default()
            .quote(TransactionKind::CashOut, 200)
            .unwrap();
        assert_eq!(q.fee, 3);
        assert_eq!(q.agent_share, 2);
        assert_eq!(q.admin_share, 1);
        assert_eq!(q.system_delta, 203);
        assert_eq!(q.debit_total(), 203);
    }

    #[test]
    fn test_cash_out_split_sums_to_fee() {
        let fees = FeeSchedule::default();
        for principal in [1, 33, 50, 67, 99, 100, 101, 149, 999, 12_345] {
            let q = fees.quote(TransactionKind::CashOut, principal).unwrap();
            assert_eq!(q.agent_share + q.admin_share, q.fee, "principal {principal}");
        }
    }

    #[test]
    fn test_float_and_withdrawal() {
        let fees = FeeSchedule::default();
        let q = fees.quote(TransactionKind::FloatApproval, 0).unwrap();
        assert_eq!(q.principal, 100_000);
        assert_eq!(q.system_delta, 100_000);
        assert_eq!(q.debit_total(), 0);

        let q = fees.quote(TransactionKind::WithdrawalApproval, 7_000).unwrap();
        assert_eq!(q.fee, 0);
        assert_eq!(q.system_delta, -7_000);
        assert_eq!(q.debit_total(), 7_000);
    }

    #[test]
    fn test_quote_overflow() {
        let fees = FeeSchedule::default();
        assert!(fees.quote(TransactionKind::SendMoney, u64::MAX).is_none());
        assert!(fees.quote(TransactionKind::CashIn, i64::MAX as u64 + 1).is_none());
    }

    #[test]
    fn test_validate() {
        assert!(FeeSchedule::default().validate().is_ok());
        let bad = FeeSchedule {
            cash_out_agent_bps: 200,
            ..FeeSchedule::default()
        };
        assert!(bad.validate().is_err());
    }
}
