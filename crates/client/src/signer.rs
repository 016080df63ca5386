//! Signing backends behind one capability surface.
//!
//! Every backend can report its address, produce a chain-bound transaction
//! signing function, and sign arbitrary messages with the EIP-191 prefix.

use crate::{ClientError, DeviceSigner, SignerFn};
use alloy_consensus::TxEnvelope;
use alloy_network::{eip2718::Encodable2718, EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, Signature};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::SignerSync;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use std::{fmt, sync::Arc};

/// Default HD derivation path (first account of the standard Ethereum path).
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0/0";

/// The signing backend selected by the user.
#[derive(Clone, PartialEq, Eq)]
pub enum SignerSource {
    /// Hex encoded secp256k1 key, with or without `0x`
    PrivateKey(String),
    /// BIP-39 phrase and the HD path to derive
    Mnemonic { phrase: String, hd_path: String },
    /// Hardware device account at the HD path
    Device { hd_path: String },
}

impl fmt::Debug for SignerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateKey(_) => f.write_str("PrivateKey(<redacted>)"),
            Self::Mnemonic { hd_path, .. } => f
                .debug_struct("Mnemonic")
                .field("hd_path", hd_path)
                .finish_non_exhaustive(),
            Self::Device { hd_path } => f.debug_struct("Device").field("hd_path", hd_path).finish(),
        }
    }
}

impl SignerSource {
    /// Select the backend from user flags, requiring exactly one.
    ///
    /// Empty strings count as "not given".
    pub fn from_flags(
        private_key: Option<String>,
        mnemonic: Option<String>,
        ledger: bool,
        hd_path: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let private_key = private_key.filter(|key| !key.trim().is_empty());
        let mnemonic = mnemonic.filter(|phrase| !phrase.trim().is_empty());

        let selected: Vec<&str> = [
            private_key.as_ref().map(|_| "private key"),
            mnemonic.as_ref().map(|_| "mnemonic"),
            ledger.then_some("ledger"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if selected.len() > 1 {
            return Err(ClientError::MultipleSigners(selected.join(", ")));
        }

        let hd_path = hd_path.into();
        match (private_key, mnemonic) {
            (Some(key), None) => Ok(Self::PrivateKey(key)),
            (None, Some(phrase)) => Ok(Self::Mnemonic { phrase, hd_path }),
            _ if ledger => Ok(Self::Device { hd_path }),
            _ => Err(ClientError::NoSigner),
        }
    }
}

/// A ready-to-use signer.
#[derive(Debug, Clone)]
pub enum WithdrawalSigner {
    /// Raw or mnemonic-derived key held in memory
    Local(PrivateKeySigner),
    /// Account opened on a hardware device
    Device(DeviceSigner),
}

impl WithdrawalSigner {
    /// Open the selected backend.
    ///
    /// `chain_id` is only consulted by hardware devices, which bind to a chain
    /// when the session is opened.
    pub async fn open(source: SignerSource, chain_id: u64) -> Result<Self, ClientError> {
        match source {
            SignerSource::PrivateKey(key) => Self::from_private_key(&key),
            SignerSource::Mnemonic { phrase, hd_path } => Self::from_mnemonic(&phrase, &hd_path),
            #[cfg(feature = "ledger")]
            SignerSource::Device { hd_path } => {
                crate::open_ledger(&hd_path, chain_id).await.map(Self::Device)
            }
            #[cfg(not(feature = "ledger"))]
            SignerSource::Device { .. } => {
                let _ = chain_id;
                Err(ClientError::DeviceUnsupported)
            }
        }
    }

    pub fn from_private_key(private_key: &str) -> Result<Self, ClientError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;
        Ok(Self::Local(signer))
    }

    pub fn from_mnemonic(phrase: &str, hd_path: &str) -> Result<Self, ClientError> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase.trim())
            .derivation_path(hd_path)
            .map_err(|e| ClientError::InvalidMnemonic(format!("{}", e)))?
            .build()
            .map_err(|e| ClientError::InvalidMnemonic(format!("{}", e)))?;
        Ok(Self::Local(signer))
    }

    pub fn address(&self) -> Address {
        match self {
            Self::Local(signer) => signer.address(),
            Self::Device(device) => device.address(),
        }
    }

    /// Transaction signing function bound to `chain_id`.
    ///
    /// The request must be fully populated (nonce, gas, fees). Requests from
    /// another sender or for another chain are refused.
    pub fn signer_fn(&self, chain_id: u64) -> SignerFn {
        match self {
            Self::Local(signer) => {
                let address = signer.address();
                let wallet = EthereumWallet::from(signer.clone());

                Arc::new(move |tx: TransactionRequest| {
                    let wallet = wallet.clone();
                    Box::pin(async move {
                        let tx = bind_request(tx, address, chain_id)?;

                        // Build and sign the typed transaction
                        let tx_envelope: TxEnvelope = tx
                            .build(&wallet)
                            .await
                            .map_err(|e| eyre::eyre!("{}", e))?;

                        // Encode to EIP-2718 bytes
                        let mut encoded = Vec::new();
                        tx_envelope.encode_2718(&mut encoded);
                        Ok(Bytes::from(encoded))
                    })
                })
            }
            Self::Device(device) => device.signer_fn(chain_id),
        }
    }

    /// Sign `message` with the EIP-191 personal message prefix.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, ClientError> {
        match self {
            Self::Local(signer) => signer
                .sign_message_sync(message)
                .map_err(|e| ClientError::Signing(e.to_string())),
            Self::Device(device) => device.sign_message(message).await,
        }
    }
}

/// Stamp the signer and chain on a request, refusing foreign values.
pub(crate) fn bind_request(
    mut tx: TransactionRequest,
    signer: Address,
    chain_id: u64,
) -> Result<TransactionRequest, ClientError> {
    if let Some(requested) = tx.from.filter(|from| *from != signer) {
        return Err(ClientError::Unauthorized { requested, signer });
    }
    if let Some(requested) = tx.chain_id.filter(|id| *id != chain_id) {
        return Err(ClientError::WrongChain {
            requested,
            bound: chain_id,
        });
    }

    tx.from = Some(signer);
    tx.chain_id = Some(chain_id);
    Ok(tx)
}
