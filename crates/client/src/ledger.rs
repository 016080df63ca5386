//! Ledger hardware wallet factory.

use crate::{ClientError, DeviceSession, DeviceSigner};
use alloy_consensus::{SignableTransaction, TxEnvelope};
use alloy_network::{eip2718::Encodable2718, TransactionBuilder, TxSigner};
use alloy_primitives::{Address, Bytes, Signature};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_ledger::{HDPath, LedgerSigner};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

struct LedgerSession {
    signer: LedgerSigner,
    address: Address,
}

#[async_trait]
impl DeviceSession for LedgerSession {
    fn account(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, tx: TransactionRequest) -> Result<Bytes, ClientError> {
        let mut typed = tx
            .build_typed_tx()
            .map_err(|_| ClientError::Device("transaction request is incomplete".to_string()))?;

        let signature = TxSigner::sign_transaction(&self.signer, &mut typed)
            .await
            .map_err(|e| ClientError::Device(e.to_string()))?;

        let envelope: TxEnvelope = typed.into_signed(signature).into();
        let mut encoded = Vec::new();
        envelope.encode_2718(&mut encoded);
        Ok(Bytes::from(encoded))
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, ClientError> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| ClientError::Device(e.to_string()))
    }
}

/// Open the Ledger Ethereum app account at `hd_path`.
///
/// The device must be connected and unlocked with the Ethereum app open.
pub async fn open_ledger(hd_path: &str, chain_id: u64) -> Result<DeviceSigner, ClientError> {
    let signer = LedgerSigner::new(HDPath::Other(hd_path.to_string()), Some(chain_id))
        .await
        .map_err(|e| ClientError::Device(format!("failed to open Ledger: {}", e)))?;
    let address = Signer::address(&signer);

    info!(%address, hd_path, "Opened Ledger account");

    Ok(DeviceSigner::new(Arc::new(LedgerSession { signer, address })))
}
