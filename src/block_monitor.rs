//! Block Monitor
//!
//! Drives sweeps from block notifications, one attempt per block, each awaited before the next.

use crate::chain_client::{Account, ChainClient};
use crate::sweeper::SweepController;
use crate::types::MonitorStats;
use alloy::primitives::BlockNumber;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

pub struct BlockMonitor<C: ChainClient> {
    controller: Arc<SweepController<C>>,
    account: Arc<Account>,
}

impl<C: ChainClient> BlockMonitor<C> {
    pub fn new(controller: Arc<SweepController<C>>, account: Arc<Account>) -> Self {
        Self {
            controller,
            account,
        }
    }

    /// Consume block notifications until the feed closes.
    pub async fn run(&self, mut blocks: mpsc::Receiver<BlockNumber>) -> MonitorStats {
        let mut stats = MonitorStats::default();

        info!(
            "Listening for new blocks (account {}, receiver {})",
            self.account.address(),
            self.controller.receiver()
        );

        while let Some(block) = blocks.recv().await {
            info!("New block {}", block);
            stats.blocks_seen += 1;

            let outcome = self.controller.sweep(&self.account).await;
            stats.record(&outcome);
        }

        info!(
            "Block feed closed after {} blocks ({} submitted, {} skipped, {} failed)",
            stats.blocks_seen, stats.submitted, stats.skipped, stats.failed
        );

        stats
    }
}
