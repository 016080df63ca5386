mod device;
#[cfg(feature = "ledger")]
mod ledger;
pub mod signer;

use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
pub use device::{DeviceSession, DeviceSigner};
#[cfg(feature = "ledger")]
pub use ledger::open_ledger;
pub use signer::{SignerSource, WithdrawalSigner};
use std::{future::Future, pin::Pin, sync::Arc};
use thiserror::Error;

/// A function that signs a fully populated transaction request and returns
/// EIP-2718 encoded bytes ready for `eth_sendRawTransaction`.
pub type SignerFn = Arc<
    dyn Fn(TransactionRequest) -> Pin<Box<dyn Future<Output = eyre::Result<Bytes>> + Send>>
        + Send
        + Sync,
>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Error deriving a key from a mnemonic
    #[error("Invalid mnemonic or derivation path: {0}")]
    InvalidMnemonic(String),

    /// No signing backend was selected
    #[error("no signer selected: pass exactly one of --private-key, --mnemonic or --ledger")]
    NoSigner,

    /// More than one signing backend was selected
    #[error("multiple signers selected ({0}): pass exactly one of --private-key, --mnemonic or --ledger")]
    MultipleSigners(String),

    /// The request names a sender this signer does not control
    #[error("not authorized to sign for {requested}, signer is {signer}")]
    Unauthorized { requested: Address, signer: Address },

    /// The request targets a chain the signing function is not bound to
    #[error("signing function is bound to chain {bound}, request is for chain {requested}")]
    WrongChain { requested: u64, bound: u64 },

    /// Error reported by a hardware device
    #[error("hardware device error: {0}")]
    Device(String),

    /// Binary was built without hardware device support
    #[error("hardware device support is not compiled in (rebuild with the `ledger` feature)")]
    DeviceUnsupported,

    /// Error signing a payload
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", rpc_url, e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}
