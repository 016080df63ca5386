//! The L1 operations submission needs.

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use eyre::WrapErr;
use std::future::Future;

/// Fee suggestion from the node's EIP-1559 estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedFees {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxStatus {
    pub tx_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// L1 reads and writes used to plan, submit and confirm transactions.
pub trait L1Chain: Send + Sync {
    fn chain_id(&self) -> impl Future<Output = eyre::Result<u64>> + Send;

    fn pending_nonce(&self, address: Address) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Gas estimate from a non-broadcasting simulation.
    fn simulate(&self, tx: &TransactionRequest) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Node's suggested legacy gas price.
    fn gas_price(&self) -> impl Future<Output = eyre::Result<u128>> + Send;

    fn fee_estimate(&self) -> impl Future<Output = eyre::Result<SuggestedFees>> + Send;

    /// Broadcast an EIP-2718 encoded transaction.
    fn send_raw(&self, encoded: &Bytes) -> impl Future<Output = eyre::Result<TxHash>> + Send;

    /// Receipt status, `None` while the transaction is not mined.
    fn receipt(&self, tx_hash: TxHash) -> impl Future<Output = eyre::Result<Option<TxStatus>>> + Send;
}

/// [`L1Chain`] over a JSON-RPC provider.
#[derive(Debug, Clone)]
pub struct RpcChain<P> {
    provider: P,
}

impl<P> RpcChain<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> L1Chain for RpcChain<P>
where
    P: Provider + Clone,
{
    async fn chain_id(&self) -> eyre::Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .wrap_err("failed to get L1 chain id")
    }

    async fn pending_nonce(&self, address: Address) -> eyre::Result<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .wrap_err_with(|| format!("failed to get pending nonce for {}", address))
    }

    async fn simulate(&self, tx: &TransactionRequest) -> eyre::Result<u64> {
        self.provider
            .estimate_gas(tx.clone())
            .await
            .wrap_err("gas estimation failed")
    }

    async fn gas_price(&self) -> eyre::Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .wrap_err("failed to get gas price")
    }

    async fn fee_estimate(&self) -> eyre::Result<SuggestedFees> {
        let estimate = self
            .provider
            .estimate_eip1559_fees()
            .await
            .wrap_err("failed to estimate EIP-1559 fees")?;

        Ok(SuggestedFees {
            max_fee_per_gas: estimate.max_fee_per_gas,
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
        })
    }

    async fn send_raw(&self, encoded: &Bytes) -> eyre::Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(encoded)
            .await
            .wrap_err("failed to broadcast transaction")?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> eyre::Result<Option<TxStatus>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .wrap_err_with(|| format!("failed to get receipt for {}", tx_hash))?;

        Ok(receipt.map(|receipt| TxStatus {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }))
    }
}
