//! Configuration types for the withdrawer.
//!
//! This crate provides:
//! - Network profiles (presets and custom bundles)
//! - Contract addresses for the supported chains
//! - The user-declared gas policy and its validation

pub mod gas;
pub mod network;

pub use gas::GasConfig;
pub use network::{resolve_network, CustomNetwork, Network, NetworkProfile, ProofSystem};

use thiserror::Error;

/// Configuration problems, all detected before any chain I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown network `{0}` (expected one of op-mainnet, op-sepolia, base-mainnet, base-sepolia)")]
    UnknownNetwork(String),

    #[error("no network selected: pass a preset network or a complete custom network")]
    MissingNetwork,

    #[error("a preset network and a custom network were both given")]
    ConflictingNetwork,

    #[error("custom network is incomplete, missing: {}", missing.join(", "))]
    IncompleteCustomNetwork { missing: Vec<&'static str> },

    #[error("custom network names both an L2OutputOracle and a DisputeGameFactory")]
    AmbiguousProofSystem,

    #[error("failed to load network file {path}: {reason}")]
    NetworkFile { path: String, reason: String },

    #[error("legacy gas price cannot be combined with EIP-1559 fee fields")]
    ConflictingFeeModes,

    #[error("max fee per gas and max priority fee per gas must be set together")]
    IncompleteEip1559Fees,

    #[error("gas multiplier must be a finite number >= 1.0, got {0}")]
    InvalidGasMultiplier(f64),
}
