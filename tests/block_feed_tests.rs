mod common;

use alloy::primitives::U256;
use alloy::providers::ProviderBuilder;
use common::{gwei, receiver, test_account, StubChainClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use zero_gas_sweeper::block_feed::{
    blocks_to_emit, next_backoff, resubscribe_wait, BlockFeed, FeedMode, MAX_CATCH_UP_BLOCKS,
    MAX_RESUBSCRIBE_DELAY,
};
use zero_gas_sweeper::block_monitor::BlockMonitor;
use zero_gas_sweeper::chain_client::BoxedProvider;
use zero_gas_sweeper::config::FeedSettings;
use zero_gas_sweeper::sweeper::SweepController;
use zero_gas_sweeper::types::MonitorStats;

/// Nothing listens on port 1, and plain http cannot carry subscriptions
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

async fn create_test_feed(mode: FeedMode, settings: FeedSettings) -> BlockFeed {
    let provider: BoxedProvider = ProviderBuilder::new()
        .on_builtin(DEAD_ENDPOINT)
        .await
        .unwrap();
    BlockFeed::new(provider, mode, settings)
}

#[test]
fn test_feed_mode_from_url() {
    assert_eq!(FeedMode::for_url("ws://localhost:8546"), FeedMode::Subscribe);
    assert_eq!(FeedMode::for_url("WSS://bsc.example.org/ws"), FeedMode::Subscribe);
    assert_eq!(FeedMode::for_url("http://localhost:8545"), FeedMode::Poll);
    assert_eq!(FeedMode::for_url("https://bsc-dataseed.example.org"), FeedMode::Poll);
}

#[test]
fn test_first_poll_reports_only_head() {
    assert_eq!(blocks_to_emit(None, 1234), vec![1234]);
}

#[test]
fn test_poll_catches_up_every_block() {
    assert_eq!(blocks_to_emit(Some(10), 11), vec![11]);
    assert_eq!(blocks_to_emit(Some(10), 14), vec![11, 12, 13, 14]);
}

#[test]
fn test_poll_ignores_stale_heads() {
    assert!(blocks_to_emit(Some(10), 10).is_empty());
    assert!(blocks_to_emit(Some(10), 7).is_empty());
}

#[test]
fn test_poll_skips_large_jumps() {
    assert_eq!(
        blocks_to_emit(Some(10), 10 + MAX_CATCH_UP_BLOCKS).len() as u64,
        MAX_CATCH_UP_BLOCKS
    );
    assert_eq!(
        blocks_to_emit(Some(10), 11 + MAX_CATCH_UP_BLOCKS),
        vec![11 + MAX_CATCH_UP_BLOCKS]
    );
}

#[test]
fn test_backoff_doubles_up_to_limit() {
    assert_eq!(next_backoff(Duration::from_millis(500)), Duration::from_secs(1));
    assert_eq!(next_backoff(Duration::from_secs(40)), MAX_RESUBSCRIBE_DELAY);
    assert_eq!(next_backoff(MAX_RESUBSCRIBE_DELAY), MAX_RESUBSCRIBE_DELAY);
}

#[test]
fn test_resubscribe_wait_backs_off_then_resets() {
    let base = Duration::from_secs(1);

    // first retry waits the base delay
    let first = resubscribe_wait(None, 0, base);
    assert_eq!(first, base);

    // consecutive empty attempts double
    let second = resubscribe_wait(Some(first), 0, base);
    let third = resubscribe_wait(Some(second), 0, base);
    assert_eq!(second, Duration::from_secs(2));
    assert_eq!(third, Duration::from_secs(4));

    // an attempt that delivered blocks starts over
    assert_eq!(resubscribe_wait(Some(third), 5, base), base);
}

#[tokio::test]
async fn test_feed_closes_without_resubscribe() {
    let feed = create_test_feed(FeedMode::Subscribe, FeedSettings::default()).await;
    let mut blocks = feed.spawn();

    let next = timeout(Duration::from_secs(5), blocks.recv()).await;
    assert_eq!(next, Ok(None));
}

#[tokio::test]
async fn test_monitor_returns_when_feed_closes() {
    let client = Arc::new(StubChainClient::new(U256::ZERO, gwei(3)));
    let controller = Arc::new(SweepController::new(client.clone(), receiver()));
    let monitor = BlockMonitor::new(controller, Arc::new(test_account()));

    let feed = create_test_feed(FeedMode::Subscribe, FeedSettings::default()).await;
    let stats = timeout(Duration::from_secs(5), monitor.run(feed.spawn()))
        .await
        .unwrap();

    assert_eq!(stats, MonitorStats::default());
    assert_eq!(client.send_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_feed_stays_open_while_resubscribing() {
    let settings = FeedSettings {
        resubscribe_delay: Some(Duration::from_secs(1)),
        ..FeedSettings::default()
    };
    let feed = create_test_feed(FeedMode::Subscribe, settings).await;
    let mut blocks = feed.spawn();

    // Every attempt fails; the retries span several backoff steps of virtual time.
    let next = timeout(Duration::from_secs(120), blocks.recv()).await;
    assert!(next.is_err(), "feed closed while resubscription was enabled");
}

#[tokio::test]
async fn test_failed_polls_do_not_close_feed() {
    let settings = FeedSettings {
        poll_interval: Duration::from_millis(10),
        ..FeedSettings::default()
    };
    let feed = create_test_feed(FeedMode::Poll, settings).await;
    let mut blocks = feed.spawn();

    let next = timeout(Duration::from_millis(300), blocks.recv()).await;
    assert!(next.is_err(), "polling stopped after a failed request");
}
