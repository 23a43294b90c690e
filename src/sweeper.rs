//! Sweep Controller
//!
//! Runs one sweep attempt: reads the balance, prices gas, decides whether a transfer
//! is worth it and submits it. Failures end the attempt but never escape it.
use crate::chain_client::{Account, ChainClient};
use crate::error::Result;
use crate::gas_policy::{plan_transfer, GasQuote};
use crate::types::{format_gwei, SkipReason, SubmittedSweep, SweepOutcome};
use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct SweepController<C: ChainClient> {
    client: Arc<C>,
    receiver: Address,
    /// Held for the whole attempt so submissions never overlap
    in_flight: Mutex<()>,
}

impl<C: ChainClient> SweepController<C> {
    pub fn new(client: Arc<C>, receiver: Address) -> Self {
        Self {
            client,
            receiver,
            in_flight: Mutex::new(()),
        }
    }

    pub fn receiver(&self) -> Address {
        self.receiver
    }

    /// Attempt to drain `account` into the receiver. Always returns an outcome.
    pub async fn sweep(&self, account: &Account) -> SweepOutcome {
        let _guard = self.in_flight.lock().await;

        let outcome = match self.try_sweep(account).await {
            Ok(outcome) => outcome,
            Err(e) => SweepOutcome::Failed(e),
        };

        match &outcome {
            SweepOutcome::Skipped(reason) => info!("Skipping sweep: {}", reason),
            SweepOutcome::Submitted(sweep) => info!(
                "Sent tx with nonce {} sweeping {} at gas price {} gwei: {}",
                sweep.nonce,
                format_ether(sweep.plan.value),
                format_gwei(U256::from(sweep.plan.gas_price)),
                sweep.tx_hash
            ),
            SweepOutcome::Failed(e) if e.is_submission() => warn!("Error sending tx: {}", e),
            SweepOutcome::Failed(e) => warn!("Sweep attempt failed: {}", e),
        }

        outcome
    }

    async fn try_sweep(&self, account: &Account) -> Result<SweepOutcome> {
        let balance = self.client.get_balance(account.address()).await?;
        if balance.is_zero() {
            return Ok(SweepOutcome::Skipped(SkipReason::ZeroBalance));
        }

        let quote = GasQuote::new(self.client.get_gas_price().await?);
        if quote.is_capped() {
            debug!(
                "Recommended gas price {} gwei capped to {} gwei",
                format_gwei(U256::from(quote.recommended)),
                format_gwei(U256::from(quote.capped))
            );
        }

        let Some(plan) = plan_transfer(self.receiver, balance, &quote) else {
            return Ok(SweepOutcome::Skipped(SkipReason::BelowGasCost {
                balance,
                gas_cost: quote.transfer_cost(),
            }));
        };

        info!("Sweeping {} to {}", format_ether(plan.value), self.receiver);

        let sent = self.client.send_transaction(account, &plan).await?;

        Ok(SweepOutcome::Submitted(SubmittedSweep {
            tx_hash: sent.hash,
            nonce: sent.nonce,
            plan,
        }))
    }
}
