//! Gas planning.
//!
//! Turns the declared [`GasConfig`] into the gas limit and fee mode of one
//! submission. The plan is derived from the declared config every time, so
//! repeated submissions never compound a multiplier.

use crate::{chain::L1Chain, TxError};
use alloy_rpc_types::TransactionRequest;
use config::GasConfig;
use eyre::WrapErr;
use tracing::{debug, warn};

/// Fee mode of a planned transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fees {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    /// Filled from the node's fee estimate at submission
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPlan {
    /// 0 means the submitter estimates the limit itself
    pub gas_limit: u64,
    pub fees: Fees,
    /// Node's gas price when fees are left to the network
    pub suggested_gas_price: Option<u128>,
    /// An explicit limit made the multiplier a no-op
    pub multiplier_ignored: bool,
}

pub struct GasPlanner<'a, C> {
    chain: &'a C,
    config: &'a GasConfig,
}

impl<'a, C> GasPlanner<'a, C>
where
    C: L1Chain,
{
    pub const fn new(chain: &'a C, config: &'a GasConfig) -> Self {
        Self { chain, config }
    }

    /// Resolve the plan for `tx`. Simulates `tx` at most once.
    pub async fn resolve(&self, tx: &TransactionRequest) -> eyre::Result<GasPlan> {
        let config = self.config;
        config.validate()?;

        let mut multiplier_ignored = false;
        let gas_limit = if let Some(limit) = config.explicit_gas_limit() {
            if config.gas_multiplier != 1.0 {
                warn!(
                    gas_limit = limit,
                    gas_multiplier = config.gas_multiplier,
                    "Explicit gas limit given, ignoring gas multiplier"
                );
                multiplier_ignored = true;
            }
            limit
        } else if config.gas_multiplier > 1.0 {
            let estimate = self
                .chain
                .simulate(tx)
                .await
                .wrap_err("failed to simulate transaction")?;
            let scaled = (estimate as f64 * config.gas_multiplier).floor() as u64;
            debug!(estimate, gas_multiplier = config.gas_multiplier, gas_limit = scaled, "Scaled gas estimate");
            scaled
        } else {
            0
        };

        let mut suggested_gas_price = None;
        let fees = match (config.gas_price, config.max_fee_per_gas, config.max_priority_fee_per_gas) {
            (Some(gas_price), _, _) => Fees::Legacy { gas_price },
            (None, Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) => Fees::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            },
            _ => {
                let price = self.chain.gas_price().await?;
                debug!(gas_price = price, "Network gas price");
                check_cap("network gas price", price, config.max_gas_price)?;
                suggested_gas_price = Some(price);
                Fees::Network
            }
        };

        match fees {
            Fees::Legacy { gas_price } => check_cap("gas price", gas_price, config.max_gas_price)?,
            Fees::Eip1559 {
                max_fee_per_gas, ..
            } => check_cap("max fee per gas", max_fee_per_gas, config.max_gas_price)?,
            Fees::Network => {}
        }

        Ok(GasPlan {
            gas_limit,
            fees,
            suggested_gas_price,
            multiplier_ignored,
        })
    }
}

pub(crate) fn check_cap(field: &'static str, value: u128, cap: Option<u128>) -> Result<(), TxError> {
    match cap {
        Some(cap) if value > cap => Err(TxError::SafetyCapExceeded { field, value, cap }),
        _ => Ok(()),
    }
}
