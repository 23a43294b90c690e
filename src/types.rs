//! Core data types for the sweeper

use crate::error::SweepError;
use crate::gas_policy::compute_gas_cost;
use alloy::primitives::utils::{format_ether, format_units};
use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use std::fmt;

/// A fully priced native transfer, built only when it leaves a positive amount to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    pub to: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
}

impl TransferPlan {
    pub fn gas_cost(&self) -> U256 {
        compute_gas_cost(self.gas_limit, self.gas_price)
    }
}

/// What the chain client reports back after broadcasting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentTransaction {
    pub hash: TxHash,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedSweep {
    pub tx_hash: TxHash,
    pub nonce: u64,
    pub plan: TransferPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ZeroBalance,
    BelowGasCost { balance: U256, gas_cost: U256 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ZeroBalance => write!(f, "balance is zero"),
            SkipReason::BelowGasCost { balance, gas_cost } => write!(
                f,
                "balance too low to cover gas (balance={}, gas_cost={} gwei)",
                format_ether(*balance),
                format_gwei(*gas_cost)
            ),
        }
    }
}

/// Result of one sweep attempt. Informational only: logged, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Skipped(SkipReason),
    Submitted(SubmittedSweep),
    Failed(SweepError),
}

impl SweepOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, SweepOutcome::Skipped(_))
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, SweepOutcome::Submitted(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SweepOutcome::Failed(_))
    }
}

/// Serializable summary of an outcome, printed by the `once` command
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub account: Address,
    pub status: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_wei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price_wei: Option<String>,
    pub observed_at: String,
}

impl SweepReport {
    pub fn new(account: Address, outcome: &SweepOutcome) -> Self {
        let mut report = Self {
            account,
            status: "",
            detail: String::new(),
            tx_hash: None,
            nonce: None,
            amount_wei: None,
            gas_price_wei: None,
            observed_at: chrono::Utc::now().to_rfc3339(),
        };

        match outcome {
            SweepOutcome::Skipped(reason) => {
                report.status = "skipped";
                report.detail = reason.to_string();
            }
            SweepOutcome::Submitted(sweep) => {
                report.status = "submitted";
                report.detail = format!(
                    "swept {} to {}",
                    format_ether(sweep.plan.value),
                    sweep.plan.to
                );
                report.tx_hash = Some(sweep.tx_hash);
                report.nonce = Some(sweep.nonce);
                report.amount_wei = Some(sweep.plan.value.to_string());
                report.gas_price_wei = Some(sweep.plan.gas_price.to_string());
            }
            SweepOutcome::Failed(err) => {
                report.status = "failed";
                report.detail = err.to_string();
            }
        }

        report
    }
}

/// Counters returned by the block monitor once its feed closes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub blocks_seen: u64,
    pub submitted: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl MonitorStats {
    pub fn record(&mut self, outcome: &SweepOutcome) {
        match outcome {
            SweepOutcome::Skipped(_) => self.skipped += 1,
            SweepOutcome::Submitted(_) => self.submitted += 1,
            SweepOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub fn format_gwei(wei: impl Into<U256>) -> String {
    let wei = wei.into();
    format_units(wei, "gwei").unwrap_or_else(|_| format!("{wei} wei"))
}
