//! Command line model and its resolution into typed configuration.

use alloy_primitives::{Address, TxHash};
use clap::{Parser, Subcommand};
use client::{signer::DEFAULT_HD_PATH, ClientError, SignerSource};
use config::{resolve_network, ConfigError, CustomNetwork, GasConfig, Network, NetworkProfile};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Parser)]
#[command(name = "withdrawer", version)]
#[command(about = "Prove and finalize an OP Stack L2→L1 ETH withdrawal, one step per run")]
pub struct Cli {
    /// L1 RPC endpoint url
    #[arg(long, env = "L1_RPC_URL")]
    pub l1_rpc: String,

    /// Preset network (op-mainnet, op-sepolia, base-mainnet, base-sepolia)
    #[arg(long)]
    pub network: Option<Network>,

    /// L2 RPC endpoint url of a custom network
    #[arg(long)]
    pub l2_rpc: Option<String>,

    /// L1 OptimismPortal address of a custom network
    #[arg(long)]
    pub portal_address: Option<Address>,

    /// L2OutputOracle address of a custom output-oracle network
    #[arg(long, conflicts_with = "dgf_address")]
    pub l2oo_address: Option<Address>,

    /// DisputeGameFactory address of a custom fault-proof network
    #[arg(long)]
    pub dgf_address: Option<Address>,

    /// TOML file describing a custom network
    #[arg(long, conflicts_with_all = ["l2_rpc", "portal_address", "l2oo_address", "dgf_address"])]
    pub network_file: Option<PathBuf>,

    /// Hash of the L2 transaction that initiated the withdrawal
    #[arg(long)]
    pub withdrawal: Option<TxHash>,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// BIP-39 mnemonic to derive the signing key from
    #[arg(long, env = "MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Sign with a Ledger hardware wallet
    #[arg(long)]
    pub ledger: bool,

    /// HD derivation path for --mnemonic and --ledger
    #[arg(long, default_value = DEFAULT_HD_PATH)]
    pub hd_path: String,

    /// Legacy gas price in wei
    #[arg(long)]
    pub gas_price: Option<u128>,

    /// EIP-1559 max fee per gas in wei
    #[arg(long)]
    pub max_fee_per_gas: Option<u128>,

    /// EIP-1559 max priority fee per gas in wei
    #[arg(long)]
    pub max_priority_fee_per_gas: Option<u128>,

    /// Explicit gas limit, skips estimation
    #[arg(long)]
    pub gas_limit: Option<u64>,

    /// Multiplier applied to the simulated gas estimate
    #[arg(long, default_value_t = 1.0)]
    pub gas_multiplier: f64,

    /// Refuse to send transactions priced above this (wei)
    #[arg(long)]
    pub max_gas_price: Option<u128>,

    /// Plan the transaction and print it without broadcasting
    #[arg(long)]
    pub dry_run: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// How long to wait for a submitted transaction to be mined
    #[arg(long, default_value_t = 300)]
    pub confirmation_timeout_secs: u64,

    /// Interval between receipt polls
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_secs: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Perform the next lifecycle transition (prove or finalize)
    #[default]
    Step,

    /// Report the lifecycle state without sending anything
    Status,

    /// Sign a message (EIP-191) with the selected signer
    SignMessage {
        /// Text to sign
        message: String,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Preset or custom network, never both.
    pub fn network_profile(&self) -> Result<NetworkProfile, ConfigError> {
        let custom = match &self.network_file {
            Some(path) => CustomNetwork::from_file(path)?,
            None => CustomNetwork {
                l2_rpc_url: self.l2_rpc.clone(),
                portal: self.portal_address,
                l2_output_oracle: self.l2oo_address,
                dispute_game_factory: self.dgf_address,
            },
        };

        resolve_network(self.network, custom)
    }

    pub fn gas_config(&self) -> Result<GasConfig, ConfigError> {
        let config = GasConfig {
            gas_price: self.gas_price,
            max_fee_per_gas: self.max_fee_per_gas,
            max_priority_fee_per_gas: self.max_priority_fee_per_gas,
            gas_limit: self.gas_limit,
            gas_multiplier: self.gas_multiplier,
            max_gas_price: self.max_gas_price,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn signer_source(&self) -> Result<SignerSource, ClientError> {
        SignerSource::from_flags(
            self.private_key.clone(),
            self.mnemonic.clone(),
            self.ledger,
            self.hd_path.as_str(),
        )
    }

    pub const fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
