//! Transaction submission.
//!
//! Completes a portal call into a signed transaction (nonce, chain id, gas
//! limit, fees), broadcasts it and waits for confirmation, or renders a
//! preview in dry-run mode.

use crate::{
    chain::{L1Chain, TxStatus},
    confirm::ConfirmationWaiter,
    gas::{check_cap, Fees, GasPlan, GasPlanner},
    TxError,
};
use alloy_primitives::{hex, utils::format_ether, Address, TxKind, U256};
use alloy_rpc_types::TransactionRequest;
use client::SignerFn;
use config::GasConfig;
use eyre::WrapErr;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Hex characters of call data shown in a preview.
const PREVIEW_DATA_CHARS: usize = 128;

/// Result of a submission.
#[derive(Debug, Clone)]
pub enum Submission {
    Confirmed(TxStatus),
    DryRun(TxPreview),
}

/// A fully planned transaction that was not broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxPreview {
    pub action: String,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u128>,
    /// Node's gas price when fees were left to the network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_gas_price: Option<u128>,
    /// The gas multiplier had no effect because the limit was explicit
    pub multiplier_ignored: bool,
    /// gas limit × (gas price or max fee), in wei
    pub max_cost_wei: U256,
    pub max_cost_eth: String,
    pub data: String,
}

impl TxPreview {
    fn new(action: &str, request: &TransactionRequest, plan: &GasPlan) -> Self {
        let gas_limit = request.gas.unwrap_or_default();
        let price = request.gas_price.or(request.max_fee_per_gas).unwrap_or_default();
        let max_cost_wei = U256::from(gas_limit) * U256::from(price);

        let calldata = request.input.input().map(hex::encode).unwrap_or_default();
        let data = if calldata.len() > PREVIEW_DATA_CHARS {
            format!("0x{}...", &calldata[..PREVIEW_DATA_CHARS])
        } else {
            format!("0x{}", calldata)
        };

        Self {
            action: action.to_string(),
            from: request.from.unwrap_or_default(),
            to: call_target(request),
            value: request.value.unwrap_or_default(),
            chain_id: request.chain_id.unwrap_or_default(),
            nonce: request.nonce.unwrap_or_default(),
            gas_limit,
            gas_price: request.gas_price,
            max_fee_per_gas: request.max_fee_per_gas,
            max_priority_fee_per_gas: request.max_priority_fee_per_gas,
            suggested_gas_price: plan.suggested_gas_price,
            multiplier_ignored: plan.multiplier_ignored,
            max_cost_wei,
            max_cost_eth: format_ether(max_cost_wei),
            data,
        }
    }
}

impl fmt::Display for TxPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dry run: {} (not broadcast)", self.action)?;
        writeln!(f, "  from:        {}", self.from)?;
        match self.to {
            Some(to) => writeln!(f, "  to:          {}", to)?,
            None => writeln!(f, "  to:          (contract creation)")?,
        }
        writeln!(f, "  value:       {} wei", self.value)?;
        writeln!(f, "  chain id:    {}", self.chain_id)?;
        writeln!(f, "  nonce:       {}", self.nonce)?;
        writeln!(f, "  gas limit:   {}", self.gas_limit)?;
        if let Some(gas_price) = self.gas_price {
            writeln!(f, "  gas price:   {} wei", gas_price)?;
        }
        if let Some(max_fee) = self.max_fee_per_gas {
            writeln!(f, "  max fee:     {} wei", max_fee)?;
        }
        if let Some(tip) = self.max_priority_fee_per_gas {
            writeln!(f, "  priority:    {} wei", tip)?;
        }
        if let Some(suggested) = self.suggested_gas_price {
            writeln!(f, "  node price:  {} wei", suggested)?;
        }
        if self.multiplier_ignored {
            writeln!(f, "  note:        gas multiplier ignored, explicit gas limit given")?;
        }
        writeln!(f, "  max cost:    {} ETH", self.max_cost_eth)?;
        write!(f, "  data:        {}", self.data)
    }
}

/// Signs and submits transactions for one account.
pub struct Submitter<C> {
    chain: C,
    signer: SignerFn,
    from: Address,
    gas: GasConfig,
    waiter: ConfirmationWaiter,
    dry_run: bool,
}

impl<C> Submitter<C>
where
    C: L1Chain,
{
    pub fn new(
        chain: C,
        signer: SignerFn,
        from: Address,
        gas: GasConfig,
        waiter: ConfirmationWaiter,
    ) -> Self {
        Self {
            chain,
            signer,
            from,
            gas,
            waiter,
            dry_run: false,
        }
    }

    /// Plan and preview instead of broadcasting.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Account transactions are sent from; also the proof submitter.
    pub const fn from(&self) -> Address {
        self.from
    }

    pub const fn chain(&self) -> &C {
        &self.chain
    }

    /// Complete `request`, then sign, send and confirm it (or preview it).
    pub async fn submit(&self, action: &str, mut request: TransactionRequest) -> eyre::Result<Submission> {
        request.from = Some(self.from);

        // Planned from the declared config every time
        let plan = GasPlanner::new(&self.chain, &self.gas).resolve(&request).await?;

        request.chain_id = Some(self.chain.chain_id().await?);
        request.nonce = Some(self.chain.pending_nonce(self.from).await?);

        match plan.fees {
            Fees::Legacy { gas_price } => request.gas_price = Some(gas_price),
            Fees::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                request.max_fee_per_gas = Some(max_fee_per_gas);
                request.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            }
            Fees::Network => {
                let fees = self.chain.fee_estimate().await?;
                check_cap("estimated max fee per gas", fees.max_fee_per_gas, self.gas.max_gas_price)?;
                request.max_fee_per_gas = Some(fees.max_fee_per_gas);
                request.max_priority_fee_per_gas = Some(fees.max_priority_fee_per_gas);
            }
        }

        let gas_limit = if plan.gas_limit == 0 {
            self.chain
                .simulate(&request)
                .await
                .wrap_err("failed to estimate gas")?
        } else {
            plan.gas_limit
        };
        request.gas = Some(gas_limit);

        debug!(
            action,
            from = %self.from,
            nonce = ?request.nonce,
            gas_limit,
            gas_price = ?request.gas_price,
            max_fee_per_gas = ?request.max_fee_per_gas,
            max_priority_fee_per_gas = ?request.max_priority_fee_per_gas,
            "Planned transaction"
        );

        if self.dry_run {
            let preview = TxPreview::new(action, &request, &plan);
            info!(action, gas_limit, max_cost_eth = %preview.max_cost_eth, "Dry run, not broadcasting");
            return Ok(Submission::DryRun(preview));
        }

        self.ensure_not_cancelled(action)?;
        let signed = (self.signer)(request)
            .await
            .wrap_err_with(|| format!("failed to sign {} transaction", action))?;
        // Device signing can take a while
        self.ensure_not_cancelled(action)?;
        let tx_hash = self.chain.send_raw(&signed).await?;

        info!(action, %tx_hash, "Transaction sent, waiting for confirmation");

        let status = self
            .waiter
            .wait_for_success(&self.chain, tx_hash)
            .await
            .wrap_err_with(|| format!("{} transaction {} not confirmed", action, tx_hash))?;

        info!(
            action,
            %tx_hash,
            block_number = status.block_number,
            gas_used = status.gas_used,
            "Transaction confirmed"
        );

        Ok(Submission::Confirmed(status))
    }

    fn ensure_not_cancelled(&self, action: &str) -> Result<(), TxError> {
        if self.waiter.is_cancelled() {
            return Err(TxError::Interrupted {
                action: action.to_string(),
            });
        }
        Ok(())
    }
}

/// Address a request calls, if any.
pub(crate) fn call_target(request: &TransactionRequest) -> Option<Address> {
    match request.to {
        Some(TxKind::Call(to)) => Some(to),
        _ => None,
    }
}
