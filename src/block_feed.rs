//! Block Feed
//!
//! Turns the node's new-block events into a channel of block numbers. Websocket
//! endpoints use `eth_subscribe`; anything else is polled with `eth_blockNumber`.

use crate::chain_client::BoxedProvider;
use crate::config::FeedSettings;
use crate::error::{Result, SweepError};
use alloy::primitives::BlockNumber;
use alloy::providers::Provider;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Past this many blocks a polling catch-up only reports the new head
pub const MAX_CATCH_UP_BLOCKS: u64 = 1000;

/// Upper bound for the resubscription delay
pub const MAX_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    Subscribe,
    Poll,
}

impl FeedMode {
    pub fn for_url(rpc_url: &str) -> Self {
        let url = rpc_url.trim().to_ascii_lowercase();
        if url.starts_with("ws://") || url.starts_with("wss://") {
            FeedMode::Subscribe
        } else {
            FeedMode::Poll
        }
    }
}

/// Block numbers a poll should report, given the last one reported and the current head.
pub fn blocks_to_emit(last_emitted: Option<BlockNumber>, head: BlockNumber) -> Vec<BlockNumber> {
    match last_emitted {
        None => vec![head],
        Some(last) if head <= last => Vec::new(),
        Some(last) if head - last > MAX_CATCH_UP_BLOCKS => vec![head],
        Some(last) => (last + 1..=head).collect(),
    }
}

pub fn next_backoff(current: Duration) -> Duration {
    current.saturating_mul(2).min(MAX_RESUBSCRIBE_DELAY)
}

/// Delay before the next resubscription. Consecutive attempts that delivered
/// nothing back off; an attempt that delivered blocks resets to `base`.
pub fn resubscribe_wait(previous: Option<Duration>, delivered: u64, base: Duration) -> Duration {
    match previous {
        Some(previous) if delivered == 0 => next_backoff(previous),
        _ => base,
    }
}

pub struct BlockFeed {
    provider: BoxedProvider,
    mode: FeedMode,
    settings: FeedSettings,
}

impl BlockFeed {
    pub fn new(provider: BoxedProvider, mode: FeedMode, settings: FeedSettings) -> Self {
        Self {
            provider,
            mode,
            settings,
        }
    }

    /// Start feeding in the background. The channel closes when the feed gives up.
    pub fn spawn(self) -> mpsc::Receiver<BlockNumber> {
        let (tx, rx) = mpsc::channel(self.settings.capacity.max(1));
        tokio::spawn(self.run(tx));
        rx
    }

    async fn run(self, tx: mpsc::Sender<BlockNumber>) {
        let mut backoff: Option<Duration> = None;

        loop {
            let mut delivered = 0u64;
            let result = match self.mode {
                FeedMode::Subscribe => self.stream_heads(&tx, &mut delivered).await,
                FeedMode::Poll => self.poll_heads(&tx, &mut delivered).await,
            };

            if tx.is_closed() {
                debug!("Block feed receiver dropped");
                return;
            }

            match result {
                Ok(()) => warn!("Block feed ended after {} blocks", delivered),
                Err(e) => warn!("{}", e),
            }

            let Some(base) = self.settings.resubscribe_delay else {
                warn!("Resubscription disabled, closing block feed");
                return;
            };

            let wait = resubscribe_wait(backoff, delivered, base);
            backoff = Some(wait);

            info!("Resubscribing to new blocks in {}ms", wait.as_millis());
            sleep(wait).await;
        }
    }

    async fn stream_heads(
        &self,
        tx: &mpsc::Sender<BlockNumber>,
        delivered: &mut u64,
    ) -> Result<()> {
        let sub = self
            .provider
            .subscribe_blocks()
            .await
            .map_err(|e| SweepError::Subscription(e.to_string()))?;

        info!("Subscribed to new block headers");
        let mut stream = sub.into_stream();

        while let Some(header) = stream.next().await {
            let number = header.number;
            if tx.send(number).await.is_err() {
                return Ok(());
            }
            *delivered += 1;
        }

        Ok(())
    }

    async fn poll_heads(
        &self,
        tx: &mpsc::Sender<BlockNumber>,
        delivered: &mut u64,
    ) -> Result<()> {
        info!(
            "Polling for new blocks every {}ms",
            self.settings.poll_interval.as_millis()
        );

        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_emitted: Option<BlockNumber> = None;

        loop {
            ticker.tick().await;

            let head = match self.provider.get_block_number().await {
                Ok(head) => head,
                Err(e) => {
                    warn!("Block number poll failed: {}", e);
                    continue;
                }
            };

            if let Some(last) = last_emitted.filter(|last| head > *last + MAX_CATCH_UP_BLOCKS) {
                warn!(
                    "Head jumped from {} to {}, skipping intermediate blocks",
                    last, head
                );
            }

            for number in blocks_to_emit(last_emitted, head) {
                if tx.send(number).await.is_err() {
                    return Ok(());
                }
                last_emitted = Some(number);
                *delivered += 1;
            }
        }
    }
}
