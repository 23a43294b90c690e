//! Zero-Gas Wallet Sweeper
//!
//! Watches new blocks and, on each one, moves the native balance of a compromised
//! wallet to a safe receiver before anyone else can.
pub mod block_feed;
pub mod block_monitor;
pub mod chain_client;
pub mod config;
pub mod error;
pub mod gas_policy;
pub mod sweeper;
pub mod types;
