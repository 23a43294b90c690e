//! Chain Client
//!
//! The seam between sweep logic and the blockchain node. `AlloyChainClient` talks
//! JSON-RPC over http or websocket; tests swap in their own `ChainClient`.

use crate::error::{ConfigError, Result, SweepError};
use crate::types::{SentTransaction, TransferPlan};
use alloy::eips::BlockId;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::BoxTransport;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::OnceCell;
use tracing::debug;

pub type BoxedProvider = RootProvider<BoxTransport>;

/// The monitored wallet: its address and the key that signs for it
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
}

impl Account {
    pub fn from_private_key(key: &str) -> std::result::Result<Self, ConfigError> {
        let clean = key.trim();
        let clean = clean.strip_prefix("0x").unwrap_or(clean);
        let signer: PrivateKeySigner = clean
            .parse()
            .map_err(|e| ConfigError::InvalidPrivateKey(format!("{e}")))?;
        Ok(Self::from_signer(signer))
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        let wallet = EthereumWallet::from(signer.clone());
        Self { signer, wallet }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_balance(&self, address: Address) -> Result<U256>;

    async fn get_gas_price(&self) -> Result<u128>;

    async fn send_transaction(
        &self,
        from: &Account,
        plan: &TransferPlan,
    ) -> Result<SentTransaction>;
}

/// JSON-RPC client backed by alloy
pub struct AlloyChainClient {
    provider: BoxedProvider,
    /// Read on the first submission, so an unreachable node does not stop startup
    chain_id: OnceCell<u64>,
}

impl AlloyChainClient {
    /// Builds the transport for `rpc_url` (http(s) or ws(s)). Http endpoints are
    /// not contacted until the first request.
    pub async fn connect(rpc_url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .on_builtin(rpc_url)
            .await
            .map_err(|e| SweepError::Connection(format!("{rpc_url}: {e}")))?;

        Ok(Self {
            provider,
            chain_id: OnceCell::new(),
        })
    }

    pub fn provider(&self) -> &BoxedProvider {
        &self.provider
    }

    /// Chain id if a submission has already fetched it
    pub fn known_chain_id(&self) -> Option<u64> {
        self.chain_id.get().copied()
    }

    async fn chain_id(&self) -> Result<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id = self
                    .provider
                    .get_chain_id()
                    .await
                    .map_err(|e| SweepError::Connection(format!("eth_chainId: {e}")))?;
                debug!("Connected to chain {}", chain_id);
                Ok(chain_id)
            })
            .await
            .copied()
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| SweepError::BalanceQuery(e.to_string()))
    }

    async fn get_gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| SweepError::GasPriceQuery(e.to_string()))
    }

    async fn send_transaction(
        &self,
        from: &Account,
        plan: &TransferPlan,
    ) -> Result<SentTransaction> {
        let chain_id = self.chain_id().await?;
        let nonce = self
            .provider
            .get_transaction_count(from.address())
            .block_id(BlockId::pending())
            .await
            .map_err(|e| SweepError::NonceQuery(e.to_string()))?;

        // Legacy transaction: only gas_price is set, no EIP-1559 fee fields.
        let tx = TransactionRequest::default()
            .with_from(from.address())
            .with_to(plan.to)
            .with_value(plan.value)
            .with_gas_limit(plan.gas_limit)
            .with_gas_price(plan.gas_price)
            .with_nonce(nonce)
            .with_chain_id(chain_id);

        let envelope = tx
            .build(from.wallet())
            .await
            .map_err(|e| SweepError::TransactionBuild(e.to_string()))?;

        let pending = self
            .provider
            .send_tx_envelope(envelope)
            .await
            .map_err(|e| SweepError::TransactionSend(e.to_string()))?;

        Ok(SentTransaction {
            hash: *pending.tx_hash(),
            nonce,
        })
    }
}
