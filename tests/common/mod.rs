#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use zero_gas_sweeper::chain_client::{Account, ChainClient};
use zero_gas_sweeper::error::{Result, SweepError};
use zero_gas_sweeper::types::{SentTransaction, TransferPlan};

/// Well-known development key (first anvil/hardhat account)
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const RECEIVER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub fn test_account() -> Account {
    Account::from_private_key(TEST_KEY).unwrap()
}

pub fn receiver() -> Address {
    RECEIVER.parse().unwrap()
}

pub fn gwei(n: u128) -> u128 {
    n * 1_000_000_000
}

/// In-memory chain client that records what the sweeper asked for
#[derive(Default)]
pub struct StubChainClient {
    pub balance: Mutex<U256>,
    pub gas_price: u128,
    pub fail_balance: bool,
    pub fail_gas_price: bool,
    pub fail_send: bool,
    pub send_delay: Option<Duration>,
    pub balance_calls: AtomicUsize,
    pub gas_price_calls: AtomicUsize,
    pub sent: Mutex<Vec<TransferPlan>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl StubChainClient {
    pub fn new(balance: U256, gas_price: u128) -> Self {
        Self {
            balance: Mutex::new(balance),
            gas_price,
            ..Default::default()
        }
    }

    pub fn failing_send(balance: U256, gas_price: u128) -> Self {
        Self {
            fail_send: true,
            ..Self::new(balance, gas_price)
        }
    }

    pub fn sent(&self) -> Vec<TransferPlan> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainClient for StubChainClient {
    async fn get_balance(&self, _address: Address) -> Result<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance {
            return Err(SweepError::BalanceQuery("connection refused".to_string()));
        }
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_gas_price(&self) -> Result<u128> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gas_price {
            return Err(SweepError::GasPriceQuery("rate limited".to_string()));
        }
        Ok(self.gas_price)
    }

    async fn send_transaction(
        &self,
        _from: &Account,
        plan: &TransferPlan,
    ) -> Result<SentTransaction> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }

        let nonce = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(*plan);
            sent.len() as u64 - 1
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_send {
            return Err(SweepError::TransactionSend("nonce too low".to_string()));
        }

        Ok(SentTransaction {
            hash: B256::with_last_byte(nonce as u8 + 1),
            nonce,
        })
    }
}
