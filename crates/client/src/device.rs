//! Hardware device signer.
//!
//! Device discovery (USB enumeration, waiting for the device) happens in a
//! factory such as [`crate::open_ledger`]; this module only sees an opened
//! session whose account is fixed.

use crate::{signer::bind_request, ClientError, SignerFn};
use alloy_primitives::{Address, Bytes, Signature};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use std::{fmt, sync::Arc};

/// An opened session on a hardware device.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Account the session was opened for.
    fn account(&self) -> Address;

    /// Sign a fully populated request, returning EIP-2718 bytes.
    async fn sign_transaction(&self, tx: TransactionRequest) -> Result<Bytes, ClientError>;

    /// Sign a message; the device applies the EIP-191 prefix.
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, ClientError>;
}

/// Signer backed by a [`DeviceSession`].
#[derive(Clone)]
pub struct DeviceSigner {
    session: Arc<dyn DeviceSession>,
    address: Address,
}

impl fmt::Debug for DeviceSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl DeviceSigner {
    /// Wrap an opened session. The address is captured now and never changes.
    pub fn new(session: Arc<dyn DeviceSession>) -> Self {
        let address = session.account();
        Self { session, address }
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    pub fn signer_fn(&self, chain_id: u64) -> SignerFn {
        let session = self.session.clone();
        let address = self.address;

        Arc::new(move |tx: TransactionRequest| {
            let session = session.clone();
            Box::pin(async move {
                let tx = bind_request(tx, address, chain_id)?;
                Ok(session.sign_transaction(tx).await?)
            })
        })
    }

    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, ClientError> {
        self.session.sign_message(message).await
    }
}
