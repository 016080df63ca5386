//! Network configuration for withdrawals.
//!
//! Provides the L2 endpoint, the L1 portal and the verification strategy
//! contracts for the supported presets, plus an all-or-nothing custom bundle.

use crate::ConfigError;
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

/// How withdrawals are verified on L1 for a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "strategy")]
pub enum ProofSystem {
    /// Proven against outputs posted to the L2OutputOracle.
    OutputOracle { l2_output_oracle: Address },
    /// Proven against games created by the DisputeGameFactory.
    DisputeGame { dispute_game_factory: Address },
}

impl ProofSystem {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OutputOracle { .. } => "output-oracle",
            Self::DisputeGame { .. } => "dispute-game",
        }
    }
}

/// Everything needed to reach the contracts of one L2 network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Human readable name used in logs
    pub name: String,
    /// L2 RPC endpoint url
    pub l2_rpc_url: String,
    /// OptimismPortal (or OptimismPortal2) address on L1
    pub portal: Address,
    /// Verification strategy and its contract
    pub proof_system: ProofSystem,
}

/// Built-in network presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    OpMainnet,
    OpSepolia,
    BaseMainnet,
    BaseSepolia,
}

impl Network {
    pub const ALL: [Self; 4] = [
        Self::OpMainnet,
        Self::OpSepolia,
        Self::BaseMainnet,
        Self::BaseSepolia,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpMainnet => "op-mainnet",
            Self::OpSepolia => "op-sepolia",
            Self::BaseMainnet => "base-mainnet",
            Self::BaseSepolia => "base-sepolia",
        }
    }

    /// Resolve the preset into a full profile.
    pub fn profile(&self) -> NetworkProfile {
        let (l2_rpc_url, portal, dispute_game_factory) = match self {
            // https://docs.optimism.io/superchain/addresses
            Self::OpMainnet => (
                "https://mainnet.optimism.io",
                address!("0xbEb5Fc579115071764c7423A4f12eDde41f106Ed"),
                address!("0xe5965Ab5962eDc7477C8520243A95517CD252fA9"),
            ),
            Self::OpSepolia => (
                "https://sepolia.optimism.io",
                address!("0x16Fc5058F25648194471939df75CF27A2fdC48BC"),
                address!("0x05F9613aDB30026FFd634f38e5C4dFd30a197Fa1"),
            ),
            // https://docs.base.org/base-chain/network-information/base-contracts
            Self::BaseMainnet => (
                "https://mainnet.base.org",
                address!("0x49048044D57e1C92A77f79988d21Fa8fAF74E97e"),
                address!("0x43edB88C4B80fDD2AdFF2412A7BebF9dF42cB40e"),
            ),
            Self::BaseSepolia => (
                "https://sepolia.base.org",
                address!("0x49f53e41452C74589E85cA1677426Ba426459e85"),
                address!("0xd6E6dBf4F7EA0ac412fD8b65ED297e64BB7a06E1"),
            ),
        };

        NetworkProfile {
            name: self.as_str().to_string(),
            l2_rpc_url: l2_rpc_url.to_string(),
            portal,
            proof_system: ProofSystem::DisputeGame {
                dispute_game_factory,
            },
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|network| network.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownNetwork(s.to_string()))
    }
}

/// Custom network override bundle.
///
/// Either empty (use a preset) or complete for exactly one strategy: the L2
/// RPC, the portal, and the oracle or the factory. Missing fields are never
/// defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomNetwork {
    pub l2_rpc_url: Option<String>,
    pub portal: Option<Address>,
    pub l2_output_oracle: Option<Address>,
    pub dispute_game_factory: Option<Address>,
}

impl CustomNetwork {
    /// Load a custom network bundle from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::NetworkFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::NetworkFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub const fn is_empty(&self) -> bool {
        self.l2_rpc_url.is_none()
            && self.portal.is_none()
            && self.l2_output_oracle.is_none()
            && self.dispute_game_factory.is_none()
    }

    /// Validate the bundle into a profile.
    ///
    /// Returns `Ok(None)` when no override field is set.
    pub fn into_profile(self) -> Result<Option<NetworkProfile>, ConfigError> {
        if self.is_empty() {
            return Ok(None);
        }

        let proof_system = match (self.l2_output_oracle, self.dispute_game_factory) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousProofSystem),
            (Some(l2_output_oracle), None) => ProofSystem::OutputOracle { l2_output_oracle },
            (None, Some(dispute_game_factory)) => ProofSystem::DisputeGame {
                dispute_game_factory,
            },
            (None, None) => {
                return Err(ConfigError::IncompleteCustomNetwork {
                    missing: vec!["l2_output_oracle or dispute_game_factory"],
                })
            }
        };

        let mut missing = Vec::new();
        if self.l2_rpc_url.as_deref().is_none_or(str::is_empty) {
            missing.push("l2_rpc_url");
        }
        if self.portal.is_none() {
            missing.push("portal");
        }

        match (self.l2_rpc_url, self.portal) {
            (Some(l2_rpc_url), Some(portal)) if missing.is_empty() => Ok(Some(NetworkProfile {
                name: "custom".to_string(),
                l2_rpc_url,
                portal,
                proof_system,
            })),
            _ => Err(ConfigError::IncompleteCustomNetwork { missing }),
        }
    }
}

/// Pick the network profile from a preset or a custom bundle, never both.
pub fn resolve_network(
    preset: Option<Network>,
    custom: CustomNetwork,
) -> Result<NetworkProfile, ConfigError> {
    match (preset, custom.into_profile()?) {
        (Some(_), Some(_)) => Err(ConfigError::ConflictingNetwork),
        (Some(network), None) => Ok(network.profile()),
        (None, Some(profile)) => Ok(profile),
        (None, None) => Err(ConfigError::MissingNetwork),
    }
}
