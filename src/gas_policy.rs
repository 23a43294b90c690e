//! Gas Policy
//!
//! Decides what a sweep may pay for gas and whether a balance is worth sweeping at that price.
use crate::types::TransferPlan;
use alloy::primitives::{Address, U256};

/// Highest gas price a sweep will ever pay: 10 gwei
pub const GAS_PRICE_CAP_WEI: u128 = 10_000_000_000;

/// Gas used by a plain native transfer
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

pub fn cap_gas_price(recommended: u128) -> u128 {
    recommended.min(GAS_PRICE_CAP_WEI)
}

pub fn compute_gas_cost(gas_limit: u64, gas_price: u128) -> U256 {
    U256::from(gas_limit) * U256::from(gas_price)
}

/// Network-recommended gas price together with the price we are willing to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    pub recommended: u128,
    pub capped: u128,
}

impl GasQuote {
    pub fn new(recommended: u128) -> Self {
        Self {
            recommended,
            capped: cap_gas_price(recommended),
        }
    }

    pub fn is_capped(&self) -> bool {
        self.capped < self.recommended
    }

    /// Cost of a plain transfer at the capped price
    pub fn transfer_cost(&self) -> U256 {
        compute_gas_cost(TRANSFER_GAS_LIMIT, self.capped)
    }
}

/// Returns a plan sending everything above the gas cost, or `None` when the
/// balance does not strictly exceed that cost.
pub fn plan_transfer(receiver: Address, balance: U256, quote: &GasQuote) -> Option<TransferPlan> {
    let gas_cost = quote.transfer_cost();
    if balance <= gas_cost {
        return None;
    }

    Some(TransferPlan {
        to: receiver,
        value: balance - gas_cost,
        gas_limit: TRANSFER_GAS_LIMIT,
        gas_price: quote.capped,
    })
}
